//! Composition root: owns the queue and component cache for one CLI run

use crate::config::Config;
use anyhow::Result;
use loadkit_components::ComponentCache;
use loadkit_queue::ResourceQueue;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Stand-in for a loaded screen or module handle
#[derive(Debug)]
pub struct ComponentHandle {
    pub name: String,
    pub load_time: Duration,
}

pub struct App {
    pub config: Config,
    pub queue: ResourceQueue,
    pub components: ComponentCache<ComponentHandle>,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let queue = ResourceQueue::new(config.queue_config());
        let components = ComponentCache::with_disposer(
            config.component_config(),
            |key, handle: Arc<ComponentHandle>| {
                debug!(component = %key, name = %handle.name, "Unmounted component");
            },
        )?;

        Ok(Self {
            config,
            queue,
            components,
        })
    }
}

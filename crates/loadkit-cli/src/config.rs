use anyhow::Result;
use loadkit_cache::CacheConfig;
use loadkit_components::ComponentCacheConfig;
use loadkit_core::LoadkitError;
use loadkit_queue::QueueConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cache: CacheSection,
    pub queue: QueueSection,
    pub components: ComponentsSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    pub capacity: usize,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueSection {
    pub inter_item_delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentsSection {
    pub capacity: usize,
    pub estimated_entry_bytes: usize,
}

impl Default for CacheSection {
    fn default() -> Self {
        let defaults = CacheConfig::default();
        Self {
            capacity: defaults.capacity,
            enabled: defaults.enabled,
        }
    }
}

impl Default for QueueSection {
    fn default() -> Self {
        Self {
            inter_item_delay_ms: QueueConfig::default().inter_item_delay.as_millis() as u64,
        }
    }
}

impl Default for ComponentsSection {
    fn default() -> Self {
        let defaults = ComponentCacheConfig::default();
        Self {
            capacity: defaults.capacity,
            estimated_entry_bytes: defaults.estimated_entry_bytes,
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Reject values the libraries would refuse at construction time
    pub fn validate(&self) -> std::result::Result<(), LoadkitError> {
        if self.cache.capacity == 0 {
            return Err(LoadkitError::Config(
                "cache.capacity must be at least 1".to_string(),
            ));
        }
        if self.components.capacity == 0 {
            return Err(LoadkitError::Config(
                "components.capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new(self.cache.capacity).with_enabled(self.cache.enabled)
    }

    pub fn queue_config(&self) -> QueueConfig {
        QueueConfig::default()
            .with_inter_item_delay(Duration::from_millis(self.queue.inter_item_delay_ms))
    }

    pub fn component_config(&self) -> ComponentCacheConfig {
        ComponentCacheConfig::default()
            .with_capacity(self.components.capacity)
            .with_estimated_entry_bytes(self.components.estimated_entry_bytes)
    }
}

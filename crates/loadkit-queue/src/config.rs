//! Resource queue configuration

use std::time::Duration;

/// Configuration for a [`ResourceQueue`](crate::ResourceQueue)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueConfig {
    /// Pause inserted after every settled loader before the next one starts
    pub inter_item_delay: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            inter_item_delay: Duration::from_millis(100),
        }
    }
}

impl QueueConfig {
    /// Set the pause between consecutive loads
    pub fn with_inter_item_delay(mut self, delay: Duration) -> Self {
        self.inter_item_delay = delay;
        self
    }

    /// Configuration with no pause between loads
    pub fn without_delay() -> Self {
        Self::default().with_inter_item_delay(Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = QueueConfig::default();
        assert_eq!(config.inter_item_delay, Duration::from_millis(100));
    }

    #[test]
    fn test_without_delay() {
        assert_eq!(QueueConfig::without_delay().inter_item_delay, Duration::ZERO);
    }
}

//! Component cache configuration

/// Configuration for a [`ComponentCache`](crate::ComponentCache)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentCacheConfig {
    /// Maximum number of cached component handles
    pub capacity: usize,
    /// Flat per-entry size used for the memory estimate in stats
    pub estimated_entry_bytes: usize,
}

impl Default for ComponentCacheConfig {
    fn default() -> Self {
        Self {
            capacity: 64,
            estimated_entry_bytes: 1024, // ~1 KB per handle
        }
    }
}

impl ComponentCacheConfig {
    /// Set the maximum number of cached handles
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the per-entry size used by the memory estimate
    pub fn with_estimated_entry_bytes(mut self, bytes: usize) -> Self {
        self.estimated_entry_bytes = bytes;
        self
    }
}

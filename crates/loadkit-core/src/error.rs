use crate::loader::LoaderError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadkitError {
    #[error("Invalid capacity: {0} (capacity must be at least 1)")]
    InvalidCapacity(usize),

    #[error("Loader failed for '{id}': {source}")]
    LoaderFailed {
        id: String,
        #[source]
        source: LoaderError,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl LoadkitError {
    /// Wrap a loader failure with the identifier of the resource being loaded
    pub fn loader_failed(id: impl Into<String>, source: LoaderError) -> Self {
        LoadkitError::LoaderFailed {
            id: id.into(),
            source,
        }
    }

    /// Returns true if this error came from a caller-supplied loader
    pub fn is_loader_failure(&self) -> bool {
        matches!(self, LoadkitError::LoaderFailed { .. })
    }
}

pub type Result<T> = std::result::Result<T, LoadkitError>;

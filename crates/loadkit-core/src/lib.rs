pub mod error;
pub mod loader;

pub use error::{LoadkitError, Result};
pub use loader::{loader, BoxLoader, LoadFuture, LoaderError};

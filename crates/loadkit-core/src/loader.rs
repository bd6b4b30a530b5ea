//! Loader primitives shared by the resource queue and the component cache
//!
//! A loader is a caller-supplied asynchronous producer. The queue only cares
//! whether it settled successfully; the component cache keeps the value.

use futures::future::BoxFuture;
use std::future::Future;

/// Error type returned by loaders. Any `std::error::Error` converts into it,
/// as do `&str` and `String`.
pub type LoaderError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The future produced by a loader
pub type LoadFuture<T> = BoxFuture<'static, Result<T, LoaderError>>;

/// One-shot loader: invoked at most once, by whoever dequeues it
pub type BoxLoader<T> = Box<dyn FnOnce() -> LoadFuture<T> + Send + 'static>;

/// Box a closure returning a future into a [`BoxLoader`]
///
/// # Example
///
/// ```
/// use loadkit_core::{loader, BoxLoader};
///
/// let load: BoxLoader<u32> = loader(|| async { Ok(42) });
/// ```
pub fn loader<T, F, Fut>(f: F) -> BoxLoader<T>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, LoaderError>> + Send + 'static,
{
    Box::new(move || Box::pin(f()) as LoadFuture<T>)
}

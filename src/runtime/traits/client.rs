//! Trait for runtime clients that handle operation dispatch

use super::Runtime;
use crate::error::Result;

/// Trait for runtime clients that handle operation dispatch
///
/// A client is the "selected device context" every operation receives by
/// reference. Clients are created through [`ContextRegistry`](crate::runtime::ContextRegistry)
/// or directly from a device, never looked up from global state.
pub trait RuntimeClient<R: Runtime>: Clone + Send + Sync {
    /// Get the device this client operates on
    fn device(&self) -> &R::Device;

    /// Wait for all pending operations to complete
    ///
    /// Failures of previously launched asynchronous work surface here.
    fn synchronize(&self) -> Result<()>;
}

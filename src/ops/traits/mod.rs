//! Operation traits implemented by every runtime client.
//!
//! Implementations are in the backend-specific modules (cpu/, cuda/).

mod elementwise;
mod scatter;

pub use elementwise::ElementwiseOps;
pub use scatter::AtomicScatterOps;

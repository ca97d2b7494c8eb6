//! Runtime backends
//!
//! This module defines the runtime traits and provides the CPU backend
//! (always available) and the CUDA backend (`cuda` feature).
//!
//! # Architecture
//!
//! ```text
//! Runtime (backend identity, memory primitives)
//! ├── Device (identifies a specific GPU/CPU)
//! └── Client (dispatches operations, owns stream/queue)
//!
//! ContextRegistry<R> (explicit init / teardown of clients per device)
//! ```
//!
//! Operations never look up a global context: callers obtain a client, from
//! a [`ContextRegistry`] or [`Runtime::create_client`], and pass it by
//! reference.

mod registry;
mod traits;

pub mod cpu;

#[cfg(feature = "cuda")]
pub mod cuda;

pub use registry::ContextRegistry;
pub use traits::{Device, Runtime, RuntimeClient};

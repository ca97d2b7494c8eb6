//! CPU runtime implementation
//!
//! Host memory plays the role of device memory: a "device pointer" is a heap
//! address cast to `u64`. The CPU runtime is always available and serves as
//! the reference backend for every operation.
//!
//! # Atomic scatter
//!
//! The atomic scatter-accumulate kernel is executed with the same grid-stride
//! iteration a device would use. With the `rayon` feature, blocks run in
//! parallel and concurrent updates of one element go through hardware
//! compare-and-swap, including the word-level CAS used for 2-byte floats.

mod client;
mod device;
pub(crate) mod kernels;
mod runtime;

pub use client::CpuClient;
pub use device::CpuDevice;
pub use kernels::{atomic_add_f16, atomic_add_f32, atomic_add_f64, byte_perm};
pub use runtime::CpuRuntime;

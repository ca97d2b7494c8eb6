//! CUDA runtime implementation
//!
//! This module provides GPU execution via NVIDIA CUDA using cudarc.
//!
//! # Features
//!
//! - `CudaDevice` - An opened GPU: context, stream and compiled-kernel cache
//! - `CudaClient` - Dispatches operations on the device's stream
//! - `CudaRuntime` - Implements the generic Runtime trait
//!
//! Kernels are emitted as source by [`crate::kernel`], compiled with NVRTC
//! on first use and cached per device in a [`KernelCache`](crate::kernel::KernelCache).

mod client;
mod device;
pub(crate) mod launch;
mod runtime;

pub use client::CudaClient;
pub use device::CudaDevice;
pub use runtime::{CudaRuntime, is_cuda_available};

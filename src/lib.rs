//! # subtensor
//!
//! **Strided-view indexing and scatter updates for device-resident tensors.**
//!
//! subtensor resolves Python-style index expressions into zero-copy views,
//! applies set / accumulate updates through those views, and scatters rows
//! into a tensor by an index list. Repeated row indices are summed correctly
//! by a grid-parallel atomic kernel, including a compare-and-swap emulation
//! for half-precision elements.
//!
//! ## Operations
//!
//! - [`Subtensor`](index::Subtensor): `x[idx]`, a view (a copy for `x[()]`)
//! - [`IncSubtensor`](index::IncSubtensor): `x[idx] = y`, `x[idx] += y`
//! - [`AdvancedIncSubtensor1`](index::AdvancedIncSubtensor1): `x[ilist] = y`,
//!   `x[ilist] += y` over the leading axis
//!
//! ## Quick Start
//!
//! ```rust
//! use subtensor::prelude::*;
//!
//! let device = CpuDevice::new();
//! let client = CpuRuntime::create_client(&device)?;
//!
//! let x = Tensor::<CpuRuntime>::zeros(&[4, 3], DType::F32, &device);
//! let rows = x.view_of(&[SliceSpec::new(None, None, Some(-2)).into()])?;
//! assert_eq!(rows.shape(), &[2, 3]);
//!
//! let y = Tensor::<CpuRuntime>::from_slice(&[1.0f32, 2.0, 3.0], &[3], &device);
//! let ilist = Tensor::<CpuRuntime>::from_slice(&[3i64, -1, 0], &[3], &device);
//! let out = AdvancedIncSubtensor1::new(CombineMode::Accumulate).perform(&client, &x, &y, &ilist)?;
//! assert_eq!(&out.to_vec::<f32>()[9..], &[2.0f32, 4.0, 6.0]);
//! # Ok::<(), subtensor::error::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cpu` (default): CPU backend
//! - `rayon` (default): parallel CPU emulation of the atomic kernel grid
//! - `cuda`: NVIDIA CUDA backend (cudarc driver + NVRTC)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod dtype;
pub mod error;
pub mod index;
pub mod kernel;
pub mod ops;
pub mod runtime;
pub mod tensor;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::IndexingConfig;
    pub use crate::dtype::DType;
    pub use crate::error::{Error, Result};
    pub use crate::index::{
        AdvancedIncSubtensor1, AtomicScatter, CombineMode, IncSubtensor, IndexSpec, Indexable,
        ScatterStrategy, SliceSpec, Subtensor,
    };
    pub use crate::ops::{AtomicScatterOps, ElementwiseOps};
    pub use crate::runtime::cpu::{CpuClient, CpuDevice, CpuRuntime};
    pub use crate::runtime::{ContextRegistry, Device, Runtime, RuntimeClient};
    pub use crate::tensor::{Layout, Tensor};

    #[cfg(feature = "cuda")]
    pub use crate::runtime::cuda::{CudaClient, CudaDevice, CudaRuntime};
}

/// Default runtime based on enabled features
///
/// - With `cuda` feature: `CudaRuntime`
/// - Otherwise: `CpuRuntime`
#[cfg(feature = "cuda")]
pub type DefaultRuntime = runtime::cuda::CudaRuntime;

/// Default runtime based on enabled features
#[cfg(not(feature = "cuda"))]
pub type DefaultRuntime = runtime::cpu::CpuRuntime;

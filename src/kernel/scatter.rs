//! Launch planning for the atomic scatter-accumulate kernel
//!
//! Both backends go through [`AtomicScatterPlan`]: it rejects operand
//! configurations the kernel does not cover, fixes the launch geometry, and
//! lays out the 16 kernel arguments. The CUDA backend pushes those arguments
//! to the compiled kernel; the CPU backend runs the same grid on the host.

use super::builder::{KernelArg, KernelLaunchDescriptor, LaunchDims};
use super::emit::{KernelEmitting, VECTOR_ADD_FAST, VectorAddFast};
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Upper bound on threads per block (one thread per destination column)
pub const MAX_THREADS_PER_BLOCK: usize = 256;

/// Upper bound on blocks per grid (one block per index entry)
pub const MAX_BLOCKS: usize = 4096;

/// Argument values for `k_vector_add_fast`
///
/// Strides are in elements, offsets in bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VectorAddFastArgs {
    /// Destination rows
    pub num_rows_x: u64,
    /// Destination columns
    pub num_cols_x: u64,
    /// Destination strides
    pub strides_x: [i64; 2],
    /// Destination buffer
    pub x: u64,
    /// Destination byte offset
    pub offset_x: u64,
    /// Source rows
    pub num_rows_y: u64,
    /// Source columns
    pub num_cols_y: u64,
    /// Source strides, zero on broadcast axes
    pub strides_y: [i64; 2],
    /// Source buffer
    pub y: u64,
    /// Source byte offset
    pub offset_y: u64,
    /// Number of index entries
    pub num_indices: u64,
    /// Index stride
    pub stride_indices: i64,
    /// Index buffer
    pub indices: u64,
    /// Index byte offset
    pub offset_indices: u64,
}

impl VectorAddFastArgs {
    /// Arguments in kernel parameter order
    pub fn to_kernel_args(&self) -> Vec<KernelArg> {
        vec![
            KernelArg::Size(self.num_rows_x),
            KernelArg::Size(self.num_cols_x),
            KernelArg::SSize(self.strides_x[0]),
            KernelArg::SSize(self.strides_x[1]),
            KernelArg::Buffer(self.x),
            KernelArg::Size(self.offset_x),
            KernelArg::Size(self.num_rows_y),
            KernelArg::Size(self.num_cols_y),
            KernelArg::SSize(self.strides_y[0]),
            KernelArg::SSize(self.strides_y[1]),
            KernelArg::Buffer(self.y),
            KernelArg::Size(self.offset_y),
            KernelArg::Size(self.num_indices),
            KernelArg::SSize(self.stride_indices),
            KernelArg::Buffer(self.indices),
            KernelArg::Size(self.offset_indices),
        ]
    }
}

/// Validated launch of the atomic scatter kernel
#[derive(Clone, Debug)]
pub struct AtomicScatterPlan {
    /// Kernel configuration
    pub emitter: VectorAddFast,
    /// Blocks per grid
    pub grid: LaunchDims,
    /// Threads per block
    pub block: LaunchDims,
    /// Argument values
    pub args: VectorAddFastArgs,
}

impl AtomicScatterPlan {
    /// Plan `x[indices[i], :] += y[i, :]` for rank-2 `x` and `y`
    ///
    /// `y` may broadcast along either axis through a unit extent. Any other
    /// configuration is rejected with a fallback-eligible error.
    pub fn new<R: Runtime>(x: &Tensor<R>, y: &Tensor<R>, indices: &Tensor<R>) -> Result<Self> {
        if x.ndim() != 2 || y.ndim() != 2 {
            return Err(Error::unsupported_configuration(format!(
                "{} needs rank-2 operands, got x rank {} and y rank {}",
                VECTOR_ADD_FAST,
                x.ndim(),
                y.ndim()
            )));
        }
        if indices.ndim() != 1 {
            return Err(Error::unsupported_configuration(format!(
                "{} needs a vector of indices, got rank {}",
                VECTOR_ADD_FAST,
                indices.ndim()
            )));
        }

        let emitter = VectorAddFast::new(x.dtype(), y.dtype(), indices.dtype());
        emitter.validate()?;

        let (rows_x, cols_x) = (x.shape()[0], x.shape()[1]);
        let (rows_y, cols_y) = (y.shape()[0], y.shape()[1]);
        let n = indices.shape()[0];

        if cols_y != cols_x && cols_y != 1 {
            return Err(Error::unsupported_configuration(format!(
                "source has {} columns, destination has {}",
                cols_y, cols_x
            )));
        }
        if rows_y != n && rows_y != 1 {
            return Err(Error::unsupported_configuration(format!(
                "source has {} rows for {} indices",
                rows_y, n
            )));
        }

        let x_item = x.dtype().size_in_bytes();
        let y_item = y.dtype().size_in_bytes();
        let ind_item = indices.dtype().size_in_bytes();

        let args = VectorAddFastArgs {
            num_rows_x: rows_x as u64,
            num_cols_x: cols_x as u64,
            strides_x: [x.strides()[0] as i64, x.strides()[1] as i64],
            x: x.storage().ptr(),
            offset_x: (x.layout().offset() * x_item) as u64,
            num_rows_y: rows_y as u64,
            num_cols_y: cols_y as u64,
            strides_y: [
                if rows_y == 1 { 0 } else { y.strides()[0] as i64 },
                if cols_y == 1 { 0 } else { y.strides()[1] as i64 },
            ],
            y: y.storage().ptr(),
            offset_y: (y.layout().offset() * y_item) as u64,
            num_indices: n as u64,
            stride_indices: indices.strides()[0] as i64,
            indices: indices.storage().ptr(),
            offset_indices: (indices.layout().offset() * ind_item) as u64,
        };

        Ok(Self {
            emitter,
            grid: LaunchDims::linear(n.min(MAX_BLOCKS) as u32),
            block: LaunchDims::linear(cols_x.min(MAX_THREADS_PER_BLOCK) as u32),
            args,
        })
    }

    /// Whether the launch would do nothing (no indices or no columns)
    pub fn is_empty(&self) -> bool {
        self.grid.x == 0 || self.block.x == 0
    }

    /// Kernel descriptor with this plan's launch geometry
    pub fn descriptor(&self) -> Result<KernelLaunchDescriptor> {
        let desc = self
            .emitter
            .kernels()?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Internal(format!("{} emitted no kernel", VECTOR_ADD_FAST)))?;
        Ok(desc.with_launch(self.grid, self.block))
    }
}

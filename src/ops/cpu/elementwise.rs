//! CPU implementation of elementwise update operations.

use crate::dispatch_dtype;
use crate::error::Result;
use crate::kernel::InplaceOp;
use crate::ops::ElementwiseOps;
use crate::ops::common::{add_via_assign, inplace_source};
use crate::runtime::cpu::{CpuClient, CpuRuntime, kernels};
use crate::tensor::Tensor;

/// ElementwiseOps implementation for CPU runtime.
impl ElementwiseOps<CpuRuntime> for CpuClient {
    fn add(&self, a: &Tensor<CpuRuntime>, b: &Tensor<CpuRuntime>) -> Result<Tensor<CpuRuntime>> {
        add_via_assign(self, a, b)
    }

    fn add_assign(
        &self,
        dst: &Tensor<CpuRuntime>,
        src: &Tensor<CpuRuntime>,
        broadcast: bool,
    ) -> Result<()> {
        let src = inplace_source(dst, src, broadcast)?;
        if dst.numel() == 0 {
            return Ok(());
        }

        let dst_ptr = dst.data_ptr();
        let src_ptr = src.data_ptr();

        dispatch_dtype!(dst.dtype(), T => {
            unsafe {
                kernels::inplace_strided_kernel::<T>(
                    InplaceOp::Add,
                    dst_ptr as *mut T,
                    src_ptr as *const T,
                    dst.shape(),
                    dst.strides(),
                    src.strides(),
                );
            }
            Ok(())
        }, "add_assign")
    }

    fn assign(&self, dst: &Tensor<CpuRuntime>, src: &Tensor<CpuRuntime>) -> Result<()> {
        let src = inplace_source(dst, src, true)?;
        if dst.numel() == 0 {
            return Ok(());
        }

        unsafe {
            kernels::assign_bits_kernel(
                dst.dtype().size_in_bytes(),
                dst.data_ptr(),
                src.data_ptr(),
                dst.shape(),
                dst.strides(),
                src.strides(),
            )
        }
    }
}

//! CUDA implementation of elementwise update operations.

use crate::error::Result;
use crate::kernel::InplaceOp;
use crate::ops::ElementwiseOps;
use crate::ops::common::{add_via_assign, inplace_source};
use crate::runtime::cuda::launch::launch_inplace;
use crate::runtime::cuda::{CudaClient, CudaRuntime};
use crate::tensor::Tensor;

impl CudaClient {
    fn inplace(
        &self,
        op: InplaceOp,
        dst: &Tensor<CudaRuntime>,
        src: &Tensor<CudaRuntime>,
    ) -> Result<()> {
        let item = dst.dtype().size_in_bytes() as u64;
        unsafe {
            launch_inplace(
                &self.device,
                op,
                dst.dtype(),
                dst.storage().ptr(),
                dst.layout().offset() as u64 * item,
                dst.layout(),
                src.storage().ptr(),
                src.layout().offset() as u64 * item,
                src.strides(),
            )
        }
    }
}

/// ElementwiseOps implementation for CUDA runtime.
impl ElementwiseOps<CudaRuntime> for CudaClient {
    fn add(
        &self,
        a: &Tensor<CudaRuntime>,
        b: &Tensor<CudaRuntime>,
    ) -> Result<Tensor<CudaRuntime>> {
        add_via_assign(self, a, b)
    }

    fn add_assign(
        &self,
        dst: &Tensor<CudaRuntime>,
        src: &Tensor<CudaRuntime>,
        broadcast: bool,
    ) -> Result<()> {
        let src = inplace_source(dst, src, broadcast)?;
        self.inplace(InplaceOp::Add, dst, &src)
    }

    fn assign(&self, dst: &Tensor<CudaRuntime>, src: &Tensor<CudaRuntime>) -> Result<()> {
        let src = inplace_source(dst, src, true)?;
        self.inplace(InplaceOp::Assign, dst, &src)
    }
}

//! CUDA implementation of the atomic scatter-accumulate.

use crate::config::IndexingConfig;
use crate::error::{Error, Result};
use crate::kernel::{AtomicScatterPlan, VECTOR_ADD_FAST};
use crate::ops::AtomicScatterOps;
use crate::runtime::cuda::launch::{function_for, launch};
use crate::runtime::cuda::{CudaClient, CudaRuntime};
use crate::tensor::Tensor;

/// AtomicScatterOps implementation for CUDA runtime.
impl AtomicScatterOps<CudaRuntime> for CudaClient {
    fn atomic_capability(&self) -> Option<(u32, u32)> {
        Some(self.capability)
    }

    fn scatter_add_atomic(
        &self,
        x: &Tensor<CudaRuntime>,
        y: &Tensor<CudaRuntime>,
        indices: &Tensor<CudaRuntime>,
        config: &IndexingConfig,
    ) -> Result<()> {
        let plan = AtomicScatterPlan::new(x, y, indices)?;
        if plan.is_empty() {
            return Ok(());
        }

        let func = function_for(&self.device, &plan.emitter)?;
        let desc = plan.descriptor()?;
        log::debug!(
            "cuda:{}: {} grid={} block={}",
            self.device.index(),
            VECTOR_ADD_FAST,
            plan.grid.x,
            plan.block.x
        );

        unsafe { launch(&self.device, &func, &desc, &plan.args.to_kernel_args())? };

        if config.sync_after_launch {
            self.device
                .stream()
                .synchronize()
                .map_err(|e| Error::kernel(VECTOR_ADD_FAST, e.to_string()))?;
        }
        Ok(())
    }
}

//! CPU implementation of the atomic scatter-accumulate.

use crate::config::IndexingConfig;
use crate::error::Result;
use crate::kernel::AtomicScatterPlan;
use crate::ops::AtomicScatterOps;
use crate::runtime::RuntimeClient;
use crate::runtime::cpu::{CpuClient, CpuRuntime, kernels};
use crate::tensor::Tensor;

/// AtomicScatterOps implementation for CPU runtime.
impl AtomicScatterOps<CpuRuntime> for CpuClient {
    fn atomic_capability(&self) -> Option<(u32, u32)> {
        None
    }

    fn scatter_add_atomic(
        &self,
        x: &Tensor<CpuRuntime>,
        y: &Tensor<CpuRuntime>,
        indices: &Tensor<CpuRuntime>,
        config: &IndexingConfig,
    ) -> Result<()> {
        let plan = AtomicScatterPlan::new(x, y, indices)?;
        if plan.is_empty() {
            return Ok(());
        }

        log::debug!(
            "cpu: {} grid={} block={} dtype={}",
            crate::kernel::VECTOR_ADD_FAST,
            plan.grid.x,
            plan.block.x,
            plan.emitter.dtype_x
        );

        // Every tensor holds a live host allocation covering its layout
        unsafe { kernels::launch_vector_add_fast(&plan)? };

        if config.sync_after_launch {
            self.synchronize()?;
        }
        Ok(())
    }
}

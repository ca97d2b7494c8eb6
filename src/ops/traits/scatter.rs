//! Atomic scatter-accumulate trait.

use crate::config::IndexingConfig;
use crate::error::Result;
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Grid-parallel `x[indices[i], :] += y[i, :]` with atomic adds.
///
/// Duplicate indices are summed correctly in any execution order. The
/// operands must satisfy [`AtomicScatterPlan`](crate::kernel::AtomicScatterPlan):
/// rank-2 `x` and `y` of an atomic-capable float dtype, `y` broadcasting
/// along unit axes, and a vector of in-range integer indices.
pub trait AtomicScatterOps<R: Runtime> {
    /// Compute capability `(major, minor)` of the device
    ///
    /// `None` means the backend has no capability levels (host atomics).
    fn atomic_capability(&self) -> Option<(u32, u32)>;

    /// Scatter-accumulate `y` into the rows of `x` selected by `indices`
    ///
    /// # Errors
    /// Fallback-eligible errors (`UnsupportedDType`, `UnsupportedConfiguration`)
    /// when the operands do not fit the kernel; `Kernel` when a launch or,
    /// with `config.sync_after_launch`, its execution fails.
    fn scatter_add_atomic(
        &self,
        x: &Tensor<R>,
        y: &Tensor<R>,
        indices: &Tensor<R>,
        config: &IndexingConfig,
    ) -> Result<()>;
}

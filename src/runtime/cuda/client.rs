//! CUDA Client implementation

use super::CudaRuntime;
use super::device::CudaDevice;
use crate::error::Result;
use crate::runtime::RuntimeClient;

/// CUDA Runtime Client
///
/// All operations launch on the device's stream, so they execute in issue
/// order.
#[derive(Clone, Debug)]
pub struct CudaClient {
    pub(crate) device: CudaDevice,
    pub(crate) capability: (u32, u32),
}

impl CudaClient {
    /// Client for an opened device
    pub fn new(device: CudaDevice) -> Result<Self> {
        let capability = device.compute_capability()?;
        log::debug!(
            "cuda:{}: compute capability {}.{}",
            device.index(),
            capability.0,
            capability.1
        );
        Ok(Self { device, capability })
    }

    /// Compute capability `(major, minor)`
    pub fn compute_capability(&self) -> (u32, u32) {
        self.capability
    }
}

impl RuntimeClient<CudaRuntime> for CudaClient {
    fn device(&self) -> &CudaDevice {
        &self.device
    }

    fn synchronize(&self) -> Result<()> {
        self.device.stream().synchronize()?;
        Ok(())
    }
}

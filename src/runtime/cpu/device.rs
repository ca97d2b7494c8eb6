//! The host as a device

use crate::runtime::Device;

/// Host memory standing in for device memory
///
/// There is a single host device, ordinal 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuDevice;

impl CpuDevice {
    /// The host device
    pub fn new() -> Self {
        Self
    }
}

impl Device for CpuDevice {
    fn id(&self) -> usize {
        0
    }

    fn name(&self) -> String {
        "host".to_string()
    }
}

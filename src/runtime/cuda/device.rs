//! CUDA Device implementation

use crate::error::Result;
use crate::kernel::KernelCache;
use crate::runtime::Device;
use cudarc::driver::safe::{CudaContext, CudaFunction, CudaStream};
use cudarc::driver::sys::CUdevice_attribute;
use std::fmt;
use std::sync::Arc;

struct DeviceInner {
    index: usize,
    context: Arc<CudaContext>,
    stream: Arc<CudaStream>,
    kernels: KernelCache<CudaFunction>,
}

/// An opened CUDA GPU
///
/// Cloning is cheap; clones share the context, the stream every operation
/// launches on, and the cache of compiled kernels.
#[derive(Clone)]
pub struct CudaDevice {
    inner: Arc<DeviceInner>,
}

impl CudaDevice {
    /// Open GPU `index`: retain its primary context and create a stream
    pub fn open(index: usize) -> Result<Self> {
        let context = CudaContext::new(index)?;
        let stream = context.new_stream()?;
        Ok(Self {
            inner: Arc::new(DeviceInner {
                index,
                context,
                stream,
                kernels: KernelCache::new(),
            }),
        })
    }

    /// Device ordinal
    pub fn index(&self) -> usize {
        self.inner.index
    }

    /// CUDA context of this device
    #[inline]
    pub fn context(&self) -> &Arc<CudaContext> {
        &self.inner.context
    }

    /// Stream on which all kernels and copies are issued
    #[inline]
    pub fn stream(&self) -> &Arc<CudaStream> {
        &self.inner.stream
    }

    /// Compiled kernels of this device
    pub(crate) fn kernels(&self) -> &KernelCache<CudaFunction> {
        &self.inner.kernels
    }

    /// Get the compute capability of this CUDA device
    ///
    /// Returns (major, minor) version numbers (e.g., (8, 6) for sm_86)
    pub fn compute_capability(&self) -> Result<(u32, u32)> {
        let major = self
            .context()
            .attribute(CUdevice_attribute::CU_DEVICE_ATTRIBUTE_COMPUTE_CAPABILITY_MAJOR)?;
        let minor = self
            .context()
            .attribute(CUdevice_attribute::CU_DEVICE_ATTRIBUTE_COMPUTE_CAPABILITY_MINOR)?;
        Ok((major as u32, minor as u32))
    }
}

impl Device for CudaDevice {
    fn id(&self) -> usize {
        self.inner.index
    }

    fn name(&self) -> String {
        format!("cuda:{}", self.inner.index)
    }
}

impl fmt::Debug for CudaDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CudaDevice")
            .field("index", &self.inner.index)
            .field("kernels", &self.inner.kernels.len())
            .finish_non_exhaustive()
    }
}

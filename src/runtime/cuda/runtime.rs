//! CUDA runtime implementation

use super::client::CudaClient;
use super::device::CudaDevice;
use super::launch::{bits_dtype, launch_inplace};
use crate::error::{Error, Result};
use crate::kernel::InplaceOp;
use crate::runtime::Runtime;
use crate::tensor::Layout;
use cudarc::driver::sys::{self, CUresult};
use std::ffi::c_void;

/// CUDA Runtime adapter
///
/// Implements the generic Runtime trait for CUDA backend.
/// Uses cudarc for direct GPU control.
#[derive(Clone, Debug, Default)]
pub struct CudaRuntime;

#[inline]
fn check(result: CUresult, what: impl FnOnce() -> String) -> Result<()> {
    if result == CUresult::CUDA_SUCCESS {
        Ok(())
    } else {
        Err(Error::Backend(format!("{} ({:?})", what(), result)))
    }
}

impl Runtime for CudaRuntime {
    type Device = CudaDevice;
    type Client = CudaClient;

    fn name() -> &'static str {
        "cuda"
    }

    fn open_device(index: usize) -> Result<Self::Device> {
        CudaDevice::open(index)
    }

    fn create_client(device: &Self::Device) -> Result<Self::Client> {
        CudaClient::new(device.clone())
    }

    /// Allocate zero-filled GPU memory on the device stream.
    ///
    /// Returns `Err(OutOfMemory)` if CUDA memory allocation fails.
    fn allocate(size_bytes: usize, device: &Self::Device) -> Result<u64> {
        if size_bytes == 0 {
            return Ok(0);
        }

        device.context().bind_to_thread()?;
        let stream = device.stream().cu_stream();
        // Whole 4-byte words, so the half-precision CAS never leaves the allocation
        let rounded = size_bytes.next_multiple_of(4);

        unsafe {
            let mut ptr: u64 = 0;
            let mut result = sys::cuMemAllocAsync(&mut ptr, rounded, stream);
            if result != CUresult::CUDA_SUCCESS {
                // Flush pending stream-ordered frees, then retry once
                device.stream().synchronize()?;
                result = sys::cuMemAllocAsync(&mut ptr, rounded, stream);
            }
            if result != CUresult::CUDA_SUCCESS {
                return Err(Error::OutOfMemory { size: size_bytes });
            }

            check(sys::cuMemsetD8Async(ptr, 0, rounded, stream), || {
                format!("zero-filling {} bytes", rounded)
            })?;
            Ok(ptr)
        }
    }

    fn deallocate(ptr: u64, _size_bytes: usize, device: &Self::Device) {
        if ptr == 0 {
            return;
        }
        if device.context().bind_to_thread().is_err() {
            // Context already gone; the driver reclaims its memory
            return;
        }

        let result = unsafe { sys::cuMemFreeAsync(ptr, device.stream().cu_stream()) };
        if result != CUresult::CUDA_SUCCESS {
            log::warn!("cuda:{}: cuMemFreeAsync(0x{:x}) failed: {:?}", device.index(), ptr, result);
        }
    }

    fn copy_to_device(src: &[u8], dst: u64, device: &Self::Device) -> Result<()> {
        if src.is_empty() || dst == 0 {
            return Ok(());
        }

        device.context().bind_to_thread()?;
        unsafe {
            check(
                sys::cuMemcpyHtoDAsync_v2(
                    dst,
                    src.as_ptr() as *const c_void,
                    src.len(),
                    device.stream().cu_stream(),
                ),
                || format!("host-to-device copy of {} bytes", src.len()),
            )?;
        }
        // The host slice may be dropped as soon as we return
        device.stream().synchronize()?;
        Ok(())
    }

    fn copy_from_device(src: u64, dst: &mut [u8], device: &Self::Device) -> Result<()> {
        if dst.is_empty() || src == 0 {
            return Ok(());
        }

        device.context().bind_to_thread()?;
        unsafe {
            check(
                sys::cuMemcpyDtoHAsync_v2(
                    dst.as_mut_ptr() as *mut c_void,
                    src,
                    dst.len(),
                    device.stream().cu_stream(),
                ),
                || format!("device-to-host copy of {} bytes", dst.len()),
            )?;
        }
        device.stream().synchronize()?;
        Ok(())
    }

    fn copy_strided(
        src_handle: u64,
        src_byte_offset: usize,
        dst_handle: u64,
        shape: &[usize],
        strides: &[isize],
        elem_size: usize,
        device: &Self::Device,
    ) -> Result<()> {
        if src_handle == 0 || dst_handle == 0 {
            return Ok(());
        }

        let dtype = bits_dtype(elem_size)?;
        let dst_layout = Layout::contiguous(shape);
        unsafe {
            launch_inplace(
                device,
                InplaceOp::Assign,
                dtype,
                dst_handle,
                0,
                &dst_layout,
                src_handle,
                src_byte_offset as u64,
                strides,
            )
        }
    }
}

/// Check if a CUDA device can be opened on this system
pub fn is_cuda_available() -> bool {
    CudaRuntime::open_device(0).is_ok()
}

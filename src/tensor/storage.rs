//! Reference-counted device buffers

use crate::dtype::{DType, Element};
use crate::error::Result;
use crate::runtime::Runtime;
use std::sync::Arc;

/// A device buffer shared by an array and every view of it
///
/// Cloning bumps a reference count. The buffer is released through
/// [`Runtime::deallocate`] when the last array or view holding it drops.
pub struct Storage<R: Runtime> {
    inner: Arc<Buffer<R>>,
}

struct Buffer<R: Runtime> {
    /// Device address (a host pointer on the CPU runtime)
    ptr: u64,
    /// Element count
    len: usize,
    dtype: DType,
    device: R::Device,
}

impl<R: Runtime> Storage<R> {
    /// Zero-filled buffer of `len` elements
    pub fn new(len: usize, dtype: DType, device: &R::Device) -> Result<Self> {
        let ptr = R::allocate(len * dtype.size_in_bytes(), device)?;
        Ok(Self::wrap(ptr, len, dtype, device))
    }

    /// Buffer holding a copy of `data`
    pub fn from_slice<T: Element>(data: &[T], device: &R::Device) -> Result<Self> {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let ptr = R::allocate(bytes.len(), device)?;
        // Wrap before copying so a failed copy still frees the allocation
        let storage = Self::wrap(ptr, data.len(), T::DTYPE, device);
        R::copy_to_device(bytes, ptr, device)?;
        Ok(storage)
    }

    fn wrap(ptr: u64, len: usize, dtype: DType, device: &R::Device) -> Self {
        Self {
            inner: Arc::new(Buffer {
                ptr,
                len,
                dtype,
                device: device.clone(),
            }),
        }
    }

    /// Device address of the first element
    #[inline]
    pub fn ptr(&self) -> u64 {
        self.inner.ptr
    }

    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len
    }

    /// Whether the buffer holds no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.len == 0
    }

    /// Element type
    #[inline]
    pub fn dtype(&self) -> DType {
        self.inner.dtype
    }

    /// Device the buffer lives on
    #[inline]
    pub fn device(&self) -> &R::Device {
        &self.inner.device
    }

    /// Requested size in bytes (before any allocator rounding)
    #[inline]
    pub fn size_in_bytes(&self) -> usize {
        self.inner.len * self.inner.dtype.size_in_bytes()
    }

    /// Whether `self` and `other` are the same buffer
    #[inline]
    pub fn same_buffer(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<R: Runtime> Clone for Storage<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Runtime> Drop for Buffer<R> {
    fn drop(&mut self) {
        if self.ptr != 0 {
            R::deallocate(self.ptr, self.len * self.dtype.size_in_bytes(), &self.device);
        }
    }
}

impl<R: Runtime> std::fmt::Debug for Storage<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("ptr", &format_args!("0x{:x}", self.inner.ptr))
            .field("len", &self.inner.len)
            .field("dtype", &self.inner.dtype)
            .field("views", &Arc::strong_count(&self.inner))
            .finish()
    }
}

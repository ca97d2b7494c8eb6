//! Memory and device management for a backend

use crate::error::Result;

/// A backend: where buffers live and how bytes move in and out of them
///
/// Everything is static dispatch. Buffers are addressed by raw `u64` device
/// addresses so that any number of views can point into one allocation at
/// different offsets. Every allocation is zero-filled and its size is
/// rounded up to a whole 4-byte word, which the f16 atomic add relies on.
///
/// ```
/// use subtensor::prelude::*;
///
/// let device = CpuRuntime::open_device(0)?;
/// let ptr = CpuRuntime::allocate(6, &device)?;
/// CpuRuntime::copy_to_device(&[1, 2, 3, 4, 5, 6], ptr, &device)?;
/// let mut back = [0u8; 8];
/// CpuRuntime::copy_from_device(ptr, &mut back, &device)?;
/// assert_eq!(back, [1, 2, 3, 4, 5, 6, 0, 0]);
/// CpuRuntime::deallocate(ptr, 6, &device);
/// # Ok::<(), subtensor::error::Error>(())
/// ```
pub trait Runtime: Clone + Send + Sync + 'static {
    /// Device identifier type
    type Device: super::Device;

    /// Client for dispatching operations
    type Client: super::RuntimeClient<Self>;

    /// Human-readable name of this runtime
    fn name() -> &'static str;

    /// Open the device with the given ordinal
    fn open_device(index: usize) -> Result<Self::Device>;

    /// Create a client bound to a device
    fn create_client(device: &Self::Device) -> Result<Self::Client>;

    /// Allocate `size_bytes` of zero-filled device memory
    ///
    /// A zero-byte request returns address 0 without allocating.
    fn allocate(size_bytes: usize, device: &Self::Device) -> Result<u64>;

    /// Deallocate device memory
    fn deallocate(ptr: u64, size_bytes: usize, device: &Self::Device);

    /// Copy data from host to device
    fn copy_to_device(src: &[u8], dst: u64, device: &Self::Device) -> Result<()>;

    /// Copy data from device to host
    fn copy_from_device(src: u64, dst: &mut [u8], device: &Self::Device) -> Result<()>;

    /// Gather a strided view into a contiguous buffer
    ///
    /// This is how a view becomes an independent array. Negative strides
    /// walk backwards from `src_byte_offset`.
    ///
    /// # Parameters
    /// - `src_handle`: Source buffer pointer
    /// - `src_byte_offset`: Byte offset of the view's first element
    /// - `dst_handle`: Destination buffer pointer
    /// - `shape`: Shape of the view (empty for a scalar, which copies one element)
    /// - `strides`: Strides of the view (in elements, not bytes)
    /// - `elem_size`: Size of each element in bytes
    fn copy_strided(
        src_handle: u64,
        src_byte_offset: usize,
        dst_handle: u64,
        shape: &[usize],
        strides: &[isize],
        elem_size: usize,
        device: &Self::Device,
    ) -> Result<()>;
}

//! Arrays and views over shared device buffers

use super::{ArrayDescriptor, Layout, Storage};
use crate::dtype::{DType, Element};
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use std::fmt;

/// N-dimensional array stored on a compute device
///
/// `Tensor` consists of:
/// - **Storage**: Reference-counted device memory
/// - **Layout**: Shape, strides, and offset defining the view into storage
///
/// # Zero-Copy Views
///
/// Indexing, `reshape`, `squeeze` and `broadcast_to` create new tensors that
/// share the same underlying storage. Writing through a view is visible
/// through every other tensor on that storage; use [`Tensor::copy`] to get an
/// independent buffer.
///
/// # Example
///
/// ```
/// use subtensor::prelude::*;
///
/// let device = CpuDevice::new();
/// let a = Tensor::<CpuRuntime>::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[2, 2], &device);
/// let row = a.view_of(&[IndexSpec::Integer(1)])?;
/// assert!(row.shares_storage(&a));
/// assert_eq!(row.to_vec::<f32>(), vec![3.0, 4.0]);
/// # Ok::<(), subtensor::error::Error>(())
/// ```
pub struct Tensor<R: Runtime> {
    /// Device memory
    storage: Storage<R>,
    /// Shape, strides, offset
    layout: Layout,
}

impl<R: Runtime> Tensor<R> {
    /// Create a tensor from storage and layout
    pub fn from_parts(storage: Storage<R>, layout: Layout) -> Self {
        Self { storage, layout }
    }

    /// Create a tensor from a slice of data
    ///
    /// # Panics
    ///
    /// Panics if `data.len()` does not equal the product of the `shape` dimensions.
    /// For a fallible alternative, use [`Self::try_from_slice`].
    pub fn from_slice<T: Element>(data: &[T], shape: &[usize], device: &R::Device) -> Self {
        Self::try_from_slice(data, shape, device).expect("Tensor::from_slice failed")
    }

    /// Create a tensor from a slice of data (fallible version)
    ///
    /// Returns an error if `data.len()` does not equal the product of the `shape` dimensions,
    /// or if memory allocation fails.
    pub fn try_from_slice<T: Element>(
        data: &[T],
        shape: &[usize],
        device: &R::Device,
    ) -> Result<Self> {
        let expected_len: usize = shape.iter().product();
        if data.len() != expected_len {
            return Err(Error::ShapeMismatch {
                expected: shape.to_vec(),
                got: vec![data.len()],
            });
        }

        let storage = Storage::from_slice(data, device)?;
        Ok(Self::from_parts(storage, Layout::contiguous(shape)))
    }

    /// Create a tensor filled with zeros
    pub fn zeros(shape: &[usize], dtype: DType, device: &R::Device) -> Self {
        Self::try_zeros(shape, dtype, device).expect("Tensor::zeros failed")
    }

    /// Create a tensor filled with zeros (fallible version)
    ///
    /// Every runtime hands out zero-filled allocations.
    pub fn try_zeros(shape: &[usize], dtype: DType, device: &R::Device) -> Result<Self> {
        let len: usize = shape.iter().product();
        let storage = Storage::new(len, dtype, device)?;
        Ok(Self::from_parts(storage, Layout::contiguous(shape)))
    }

    // ===== Accessors =====

    /// Get the storage
    #[inline]
    pub fn storage(&self) -> &Storage<R> {
        &self.storage
    }

    /// Get the layout
    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Get the shape
    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.layout.shape()
    }

    /// Get the strides (in elements)
    #[inline]
    pub fn strides(&self) -> &[isize] {
        self.layout.strides()
    }

    /// Get the number of dimensions (rank)
    #[inline]
    pub fn ndim(&self) -> usize {
        self.layout.ndim()
    }

    /// Get the total number of elements
    #[inline]
    pub fn numel(&self) -> usize {
        self.layout.elem_count()
    }

    /// Get the element type
    #[inline]
    pub fn dtype(&self) -> DType {
        self.storage.dtype()
    }

    /// Get the device
    #[inline]
    pub fn device(&self) -> &R::Device {
        self.storage.device()
    }

    /// Check if the tensor is contiguous in memory
    #[inline]
    pub fn is_contiguous(&self) -> bool {
        self.layout.is_contiguous()
    }

    /// Check if this is a scalar (0-dimensional tensor)
    #[inline]
    pub fn is_scalar(&self) -> bool {
        self.layout.is_scalar()
    }

    /// Whether this tensor and `other` read and write the same buffer
    #[inline]
    pub fn shares_storage(&self, other: &Self) -> bool {
        self.storage.same_buffer(&other.storage)
    }

    /// Device pointer of the first element of this view
    #[inline]
    pub fn data_ptr(&self) -> u64 {
        self.storage.ptr() + (self.layout.offset() * self.dtype().size_in_bytes()) as u64
    }

    /// Boundary descriptor of this view (byte strides, byte offset)
    pub fn descriptor(&self) -> ArrayDescriptor {
        ArrayDescriptor::of(self)
    }

    // ===== View Operations (Zero-Copy) =====

    /// New tensor sharing this tensor's storage under another layout
    pub(crate) fn with_layout(&self, layout: Layout) -> Self {
        Self {
            storage: self.storage.clone(),
            layout,
        }
    }

    /// Reshape to a new shape (zero-copy, requires a contiguous tensor)
    pub fn reshape(&self, shape: &[usize]) -> Result<Self> {
        let new_layout = self
            .layout
            .reshape(shape)
            .ok_or_else(|| Error::shape_mismatch(shape, self.shape()))?;
        Ok(self.with_layout(new_layout))
    }

    /// Remove dimensions of size 1
    pub fn squeeze(&self, dim: Option<usize>) -> Self {
        self.with_layout(self.layout.squeeze(dim))
    }

    /// Prepend unit dimensions up to `ndim` dimensions
    pub fn left_pad(&self, ndim: usize) -> Result<Self> {
        let new_layout = self.layout.left_pad(ndim).ok_or_else(|| {
            Error::dimension(format!(
                "cannot pad tensor with {} dimensions to {}",
                self.ndim(),
                ndim
            ))
        })?;
        Ok(self.with_layout(new_layout))
    }

    /// Broadcast to a target shape (zero-copy)
    pub fn broadcast_to(&self, shape: &[usize]) -> Result<Self> {
        let new_layout = self
            .layout
            .broadcast_to(shape)
            .ok_or_else(|| Error::broadcast(self.shape(), shape))?;
        Ok(self.with_layout(new_layout))
    }

    // ===== Copies =====

    /// Deep copy into a fresh contiguous buffer
    ///
    /// The result never shares storage with `self`.
    pub fn copy(&self) -> Result<Self> {
        let dtype = self.dtype();
        let device = self.storage.device();
        let new_storage = Storage::new(self.numel(), dtype, device)?;

        if self.numel() > 0 {
            let elem_size = dtype.size_in_bytes();
            R::copy_strided(
                self.storage.ptr(),
                self.layout.offset() * elem_size,
                new_storage.ptr(),
                self.shape(),
                self.strides(),
                elem_size,
                device,
            )?;
        }

        Ok(Self::from_parts(new_storage, Layout::contiguous(self.shape())))
    }

    /// `self` if already contiguous from the start of its buffer, else a copy
    pub fn try_contiguous(&self) -> Result<Self> {
        if self.is_contiguous() {
            Ok(self.clone())
        } else {
            self.copy()
        }
    }

    // ===== Data Access =====

    /// Copy tensor data to a Vec on the host, in row-major order
    ///
    /// Non-contiguous views are gathered first.
    pub fn to_vec<T: bytemuck::Pod>(&self) -> Vec<T> {
        self.try_to_vec().expect("Tensor::to_vec failed")
    }

    /// Copy tensor data to a Vec on the host (fallible version)
    pub fn try_to_vec<T: bytemuck::Pod>(&self) -> Result<Vec<T>> {
        if std::mem::size_of::<T>() != self.dtype().size_in_bytes() {
            return Err(Error::Internal(format!(
                "to_vec element size {} does not match dtype {}",
                std::mem::size_of::<T>(),
                self.dtype()
            )));
        }

        let tensor = self.try_contiguous()?;

        // Allocate with correct alignment for T, then cast to bytes for copy.
        let mut result = vec![T::zeroed(); tensor.numel()];
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut result);
        R::copy_from_device(tensor.data_ptr(), bytes, tensor.storage.device())?;
        Ok(result)
    }

    /// Extract the scalar value from a single-element tensor
    pub fn item<T: bytemuck::Pod>(&self) -> Result<T> {
        if self.numel() != 1 {
            return Err(Error::ShapeMismatch {
                expected: vec![1],
                got: self.shape().to_vec(),
            });
        }
        if std::mem::size_of::<T>() != self.dtype().size_in_bytes() {
            return Err(Error::Internal(format!(
                "item element size {} does not match dtype {}",
                std::mem::size_of::<T>(),
                self.dtype()
            )));
        }

        // A single element sits at the view offset whatever the strides are
        let mut result = T::zeroed();
        let bytes: &mut [u8] = bytemuck::bytes_of_mut(&mut result);
        R::copy_from_device(self.data_ptr(), bytes, self.storage.device())?;
        Ok(result)
    }
}

impl<R: Runtime> Clone for Tensor<R> {
    /// Clone creates a new tensor sharing the same storage (zero-copy)
    fn clone(&self) -> Self {
        self.with_layout(self.layout.clone())
    }
}

impl<R: Runtime> fmt::Debug for Tensor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape())
            .field("strides", &self.strides())
            .field("offset", &self.layout.offset())
            .field("dtype", &self.dtype())
            .finish()
    }
}

impl<R: Runtime> fmt::Display for Tensor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tensor({:?}, dtype={})", self.shape(), self.dtype())
    }
}

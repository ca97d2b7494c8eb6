//! Boundary description of a tensor view

use super::Tensor;
use crate::dtype::DType;
use crate::runtime::{Device, Runtime};

/// Flat description of a tensor view for code outside this crate
///
/// Unlike [`Layout`](super::Layout), strides and offset are expressed in
/// bytes. A view and its source report the same `buffer_handle`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArrayDescriptor {
    /// Device pointer of the shared buffer
    pub buffer_handle: u64,
    /// Stable dtype code (see [`DType::code`])
    pub dtype_code: u8,
    /// Element size in bytes
    pub item_size: usize,
    /// Number of dimensions
    pub rank: usize,
    /// Extent of each dimension
    pub shape: Vec<usize>,
    /// Signed byte stride of each dimension
    pub strides: Vec<isize>,
    /// Byte offset of the first element from `buffer_handle`
    pub offset_bytes: usize,
    /// Id of the device holding the buffer
    pub device_id: usize,
}

impl ArrayDescriptor {
    /// Describe a tensor view
    pub fn of<R: Runtime>(tensor: &Tensor<R>) -> Self {
        let item_size = tensor.dtype().size_in_bytes();
        Self {
            buffer_handle: tensor.storage().ptr(),
            dtype_code: tensor.dtype().code(),
            item_size,
            rank: tensor.ndim(),
            shape: tensor.shape().to_vec(),
            strides: tensor
                .strides()
                .iter()
                .map(|&s| s * item_size as isize)
                .collect(),
            offset_bytes: tensor.layout().offset() * item_size,
            device_id: tensor.device().id(),
        }
    }

    /// Whether the descriptor's dtype code matches `dtype`
    pub fn is_dtype(&self, dtype: DType) -> bool {
        self.dtype_code == dtype.code()
    }
}

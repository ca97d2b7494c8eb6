//! Basic indexing on tensors

use super::normalize::normalize_indices;
use super::types::IndexSpec;
use crate::error::Result;
use crate::runtime::Runtime;
use crate::tensor::Tensor;

impl<R: Runtime> Tensor<R> {
    /// View selected by `specs`, sharing this tensor's storage
    ///
    /// Integer entries drop their axis, slices keep it with a scaled stride,
    /// `NewAxis` inserts a unit axis, and axes past the end of `specs` are
    /// taken whole. An empty list yields a view of the whole tensor.
    ///
    /// # Example
    ///
    /// ```
    /// use subtensor::prelude::*;
    ///
    /// let device = CpuDevice::new();
    /// let x = Tensor::<CpuRuntime>::from_slice(&[0i32, 1, 2, 3, 4, 5], &[2, 3], &device);
    /// let col = x.view_of(&[IndexSpec::Slice(SliceSpec::full()), IndexSpec::Integer(-1)])?;
    /// assert_eq!(col.shape(), &[2]);
    /// assert_eq!(col.to_vec::<i32>(), vec![2, 5]);
    /// # Ok::<(), subtensor::error::Error>(())
    /// ```
    pub fn view_of(&self, specs: &[IndexSpec]) -> Result<Self> {
        let axes = normalize_indices(self.shape(), specs)?;
        let layout = self.layout().subview(&axes)?;
        Ok(self.with_layout(layout))
    }

    /// Basic indexing
    ///
    /// Same as [`Self::view_of`], except that an empty index list returns an
    /// independent copy rather than a view.
    pub fn index(&self, specs: &[IndexSpec]) -> Result<Self> {
        if specs.is_empty() {
            return self.copy();
        }
        self.view_of(specs)
    }
}

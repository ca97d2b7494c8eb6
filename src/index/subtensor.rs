//! Plain indexing operation

use super::capability::Indexable;
use super::types::IndexSpec;
use crate::error::Result;
use crate::runtime::Runtime;
use crate::tensor::Tensor;
use std::fmt;

/// `x[idx_list]` as a reusable operation
///
/// The result is a view sharing `x`'s storage, except for an empty index
/// list, which yields an independent copy.
///
/// # Example
///
/// ```
/// use subtensor::prelude::*;
///
/// let device = CpuDevice::new();
/// let x = Tensor::<CpuRuntime>::from_slice(&[0.0f32, 1.0, 2.0, 3.0, 4.0, 5.0], &[2, 3], &device);
///
/// let op = Subtensor::new(vec![IndexSpec::Integer(1), SliceSpec::reversed().into()]);
/// let row = op.perform(&x)?;
/// assert_eq!(row.to_vec::<f32>(), vec![5.0, 4.0, 3.0]);
/// # Ok::<(), subtensor::error::Error>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Subtensor {
    idx_list: Vec<IndexSpec>,
}

impl Subtensor {
    /// Operation applying `idx_list`
    pub fn new(idx_list: Vec<IndexSpec>) -> Self {
        Self { idx_list }
    }

    /// Index `x`
    pub fn perform<R: Runtime>(&self, x: &Tensor<R>) -> Result<Tensor<R>> {
        x.index(&self.idx_list)
    }
}

impl Indexable for Subtensor {
    fn idx_list(&self) -> &[IndexSpec] {
        &self.idx_list
    }
}

impl fmt::Display for Subtensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Subtensor{{")?;
        for (i, idx) in self.idx_list.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", idx)?;
        }
        write!(f, "}}")
    }
}

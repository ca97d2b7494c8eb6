//! Per-axis index specifications

use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use crate::tensor::Tensor;
use std::fmt;

/// A slice whose bounds and step may each be omitted
///
/// Omitted fields take their defaults during normalization, which depend on
/// the sign of the step (see [`normalize_slice`](super::normalize_slice)).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SliceSpec {
    /// First position, or `None` for the start of the traversal
    pub start: Option<isize>,
    /// One past the last position, or `None` for the end of the traversal
    pub stop: Option<isize>,
    /// Step, or `None` for 1
    pub step: Option<isize>,
}

impl SliceSpec {
    /// Slice with explicit optional fields
    pub const fn new(start: Option<isize>, stop: Option<isize>, step: Option<isize>) -> Self {
        Self { start, stop, step }
    }

    /// The whole axis (`:`)
    pub const fn full() -> Self {
        Self::new(None, None, None)
    }

    /// `start:stop`
    pub const fn range(start: isize, stop: isize) -> Self {
        Self::new(Some(start), Some(stop), None)
    }

    /// The whole axis walked backwards (`::-1`)
    pub const fn reversed() -> Self {
        Self::new(None, None, Some(-1))
    }
}

/// Index applied to one axis
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IndexSpec {
    /// Select one position; the axis disappears from the result
    Integer(i64),
    /// Select a strided range; the axis stays
    Slice(SliceSpec),
    /// Integer resolved at run time from a scalar tensor
    RuntimeScalar(i64),
    /// Insert a unit axis without consuming one
    NewAxis,
}

impl IndexSpec {
    /// Integer index read from a single-element integer tensor
    pub fn from_scalar_tensor<R: Runtime>(tensor: &Tensor<R>) -> Result<Self> {
        let dtype = tensor.dtype();
        if !dtype.is_int() {
            return Err(Error::dimension(format!(
                "runtime index must be an integer scalar, got {}",
                dtype
            )));
        }
        if tensor.numel() != 1 {
            return Err(Error::dimension(format!(
                "runtime index must hold one element, got shape {:?}",
                tensor.shape()
            )));
        }
        let value = crate::dispatch_int_dtype!(dtype, T => {
            tensor.item::<T>().map(|i| i.to_i64().unwrap_or(i64::MAX))
        }, "runtime index")?;
        Ok(Self::RuntimeScalar(value))
    }

    /// Whether this entry consumes an axis of the indexed tensor
    pub fn consumes_axis(&self) -> bool {
        !matches!(self, Self::NewAxis)
    }
}

impl fmt::Display for SliceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(start) = self.start {
            write!(f, "{}", start)?;
        }
        write!(f, ":")?;
        if let Some(stop) = self.stop {
            write!(f, "{}", stop)?;
        }
        if let Some(step) = self.step {
            write!(f, ":{}", step)?;
        }
        Ok(())
    }
}

impl fmt::Display for IndexSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) | Self::RuntimeScalar(i) => write!(f, "{}", i),
            Self::Slice(s) => write!(f, "{}", s),
            Self::NewAxis => write!(f, "newaxis"),
        }
    }
}

impl From<SliceSpec> for IndexSpec {
    fn from(slice: SliceSpec) -> Self {
        Self::Slice(slice)
    }
}

impl From<i64> for IndexSpec {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

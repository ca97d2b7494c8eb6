//! Error types for subtensor

use crate::dtype::DType;
use thiserror::Error;

/// Result type alias using subtensor's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while indexing or updating tensors
#[derive(Error, Debug)]
pub enum Error {
    /// A slice on some axis cannot be normalized (zero step)
    #[error("Invalid slice on axis {axis}: {reason}")]
    InvalidSlice {
        /// Axis the slice was applied to
        axis: usize,
        /// Why the slice was rejected
        reason: &'static str,
    },

    /// The index list does not fit the tensor it is applied to
    #[error("Index error: {reason}")]
    Index {
        /// Description of the mismatch
        reason: String,
    },

    /// Index out of bounds
    #[error("Index {index} out of bounds for dimension of size {size}")]
    IndexOutOfBounds {
        /// The invalid index, before wrapping
        index: i64,
        /// Size of the dimension
        size: usize,
    },

    /// DType mismatch between operands
    #[error("DType mismatch: {lhs:?} vs {rhs:?}")]
    DTypeMismatch {
        /// Destination dtype
        lhs: DType,
        /// Source dtype
        rhs: DType,
    },

    /// Operand ranks or extents do not fit the operation
    #[error("Dimension error: {reason}")]
    Dimension {
        /// Description of the offending dimension
        reason: String,
    },

    /// Unsupported dtype for an operation
    #[error("Unsupported dtype {dtype:?} for operation '{op}'")]
    UnsupportedDType {
        /// The unsupported dtype
        dtype: DType,
        /// The operation name
        op: &'static str,
    },

    /// An accelerated path was requested for a case it does not cover
    #[error("Unsupported configuration: {reason}")]
    UnsupportedConfiguration {
        /// Which precondition failed
        reason: String,
    },

    /// Shape mismatch in an operation
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape
        expected: Vec<usize>,
        /// Actual shape
        got: Vec<usize>,
    },

    /// Shapes cannot be broadcast together
    #[error("Cannot broadcast shapes {lhs:?} and {rhs:?}")]
    BroadcastError {
        /// Left-hand side shape
        lhs: Vec<usize>,
        /// Right-hand side shape
        rhs: Vec<usize>,
    },

    /// Out of memory
    #[error("Out of memory: failed to allocate {size} bytes")]
    OutOfMemory {
        /// Requested size in bytes
        size: usize,
    },

    /// A device kernel failed to launch or execute
    #[error("Kernel '{name}' failed: {reason}")]
    Kernel {
        /// Kernel entry name
        name: String,
        /// Driver-reported failure
        reason: String,
    },

    /// Backend-specific error
    #[error("Backend error: {0}")]
    Backend(String),

    /// CUDA-specific error
    #[cfg(feature = "cuda")]
    #[error("CUDA error: {0}")]
    Cuda(#[from] cudarc::driver::DriverError),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an index error
    pub fn index(reason: impl Into<String>) -> Self {
        Self::Index {
            reason: reason.into(),
        }
    }

    /// Create a dimension error
    pub fn dimension(reason: impl Into<String>) -> Self {
        Self::Dimension {
            reason: reason.into(),
        }
    }

    /// Create an unsupported configuration error
    pub fn unsupported_configuration(reason: impl Into<String>) -> Self {
        Self::UnsupportedConfiguration {
            reason: reason.into(),
        }
    }

    /// Create a shape mismatch error
    pub fn shape_mismatch(expected: &[usize], got: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }

    /// Create a broadcast error
    pub fn broadcast(lhs: &[usize], rhs: &[usize]) -> Self {
        Self::BroadcastError {
            lhs: lhs.to_vec(),
            rhs: rhs.to_vec(),
        }
    }

    /// Create an unsupported dtype error
    pub fn unsupported_dtype(dtype: DType, op: &'static str) -> Self {
        Self::UnsupportedDType { dtype, op }
    }

    /// Create a kernel failure error
    pub fn kernel(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Kernel {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Whether an accelerated path may recover from this error by falling
    /// back to the sequential loop.
    ///
    /// Only eligibility failures qualify. Kernel and backend failures are fatal.
    pub fn is_fallback_eligible(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedDType { .. } | Self::UnsupportedConfiguration { .. }
        )
    }
}

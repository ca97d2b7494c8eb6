//! Capability traits composed by the indexing operations
//!
//! Each operation picks the capabilities it needs instead of inheriting
//! them: plain and incremental subtensors are [`Indexable`], and the atomic
//! scatter strategy is [`AtomicCapable`]. Kernel emission lives with the
//! emitters in [`crate::kernel::KernelEmitting`].

use super::types::IndexSpec;
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// An operation carrying a fixed per-axis index list
pub trait Indexable {
    /// The index list, one entry per indexed axis
    fn idx_list(&self) -> &[IndexSpec];

    /// View of `x` selected by [`Self::idx_list`]
    fn view<R: Runtime>(&self, x: &Tensor<R>) -> Result<Tensor<R>> {
        x.view_of(self.idx_list())
    }
}

/// A strategy that needs device atomics of a minimum capability
pub trait AtomicCapable {
    /// Lowest compute capability `(major, minor)` the strategy runs on
    fn min_capability(&self) -> (u32, u32);

    /// Check a device's capability against [`Self::min_capability`]
    ///
    /// `None` stands for a backend without capability levels, which always
    /// qualifies.
    fn check_capability(&self, capability: Option<(u32, u32)>) -> Result<()> {
        match capability {
            Some(cap) if cap < self.min_capability() => {
                let (major, minor) = self.min_capability();
                Err(Error::unsupported_configuration(format!(
                    "device capability {}.{} below required {}.{}",
                    cap.0, cap.1, major, minor
                )))
            }
            _ => Ok(()),
        }
    }
}

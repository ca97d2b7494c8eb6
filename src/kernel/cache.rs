//! Side table of compiled kernels keyed by configuration

use super::emit::InplaceOp;
use crate::dtype::DType;
use crate::error::Result;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Identity of an emitted kernel configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KernelKey {
    /// Atomic scatter-accumulate
    VectorAddFast {
        /// Destination dtype
        dtype_x: DType,
        /// Source dtype
        dtype_y: DType,
        /// Index dtype
        dtype_ind: DType,
    },
    /// Strided in-place elementwise update
    InplaceElemwise {
        /// Update applied
        op: InplaceOp,
        /// Operand dtype
        dtype: DType,
        /// Iteration rank
        ndim: usize,
    },
}

/// Thread-safe cache of compiled kernels, keyed by `(device, KernelKey)`
///
/// Values are whatever a backend produces when compiling a kernel (a loaded
/// function handle on CUDA). Entries live as long as the cache; operations
/// themselves never hold compiled state.
pub struct KernelCache<V> {
    entries: Mutex<HashMap<(usize, KernelKey), Arc<V>>>,
}

impl<V> KernelCache<V> {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Cached value for `key` on `device`, if any
    pub fn get(&self, device: usize, key: &KernelKey) -> Option<Arc<V>> {
        self.entries.lock().get(&(device, *key)).cloned()
    }

    /// Cached value for `key`, or the result of `build` stored under it
    ///
    /// `build` runs without the lock held, so two threads racing on the same
    /// key may both compile; the first insert wins and both get that value.
    /// A failing `build` caches nothing.
    pub fn get_or_try_insert<F>(&self, device: usize, key: KernelKey, build: F) -> Result<Arc<V>>
    where
        F: FnOnce() -> Result<V>,
    {
        if let Some(hit) = self.get(device, &key) {
            return Ok(hit);
        }

        log::debug!("kernel cache miss on device {}: {:?}", device, key);
        let value = Arc::new(build()?);
        let mut entries = self.entries.lock();
        Ok(entries.entry((device, key)).or_insert(value).clone())
    }

    /// Number of cached kernels
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drop every cached kernel
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl<V> Default for KernelCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

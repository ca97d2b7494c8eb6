//! Device identity

/// A device buffers can live on
///
/// Identity is the ordinal within the runtime: kernel caches and the
/// context registry key on it.
pub trait Device: Clone + Send + Sync + 'static {
    /// Ordinal of this device within its runtime
    fn id(&self) -> usize;

    /// Whether `other` is the same physical device
    fn is_same(&self, other: &Self) -> bool {
        self.id() == other.id()
    }

    /// Human-readable name, used in log and error messages
    fn name(&self) -> String {
        format!("device {}", self.id())
    }
}

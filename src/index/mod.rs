//! Strided-view indexing and indexed in-place updates
//!
//! ```text
//! IndexSpec list ── normalize_indices ──> AxisIndex list ── Layout::subview ──> view
//!                                                                               │
//!   Subtensor             x[idx]             ─────────────────────────────────┤
//!   IncSubtensor          x[idx] = y / += y  ── ElementwiseOps on the view ───┤
//!   AdvancedIncSubtensor1 x[ilist] = y / += y ── AtomicScatterOps or row loop ┘
//! ```
//!
//! Slice semantics follow Python: omitted bounds depend on the step's sign,
//! negative bounds wrap once, out-of-range bounds clamp, and a zero step is
//! an error.

mod capability;
mod combine;
mod normalize;
mod scatter;
mod subtensor;
mod types;
mod view;

pub use capability::{AtomicCapable, Indexable};
pub use combine::{CombineMode, IncSubtensor};
pub use normalize::{AxisIndex, NormalizedSlice, normalize_index, normalize_indices, normalize_slice};
pub use scatter::{ATOMIC_MIN_CAPABILITY, AdvancedIncSubtensor1, AtomicScatter, ScatterStrategy};
pub use subtensor::Subtensor;
pub use types::{IndexSpec, SliceSpec};

//! Index normalization
//!
//! Resolves per-axis [`IndexSpec`]s against a concrete shape, producing
//! fully-resolved [`AxisIndex`] entries that [`Layout::subview`](crate::tensor::Layout::subview)
//! turns into a view.

use super::types::{IndexSpec, SliceSpec};
use crate::error::{Error, Result};

/// A slice with every field resolved
///
/// `step != 0`, and `stop >= start` whenever `step > 0`. For negative steps,
/// `start` and `stop` lie in `[-1, len - 1]`; `-1` is the "before the first
/// element" position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NormalizedSlice {
    /// First selected position (if any)
    pub start: isize,
    /// Exclusive end position
    pub stop: isize,
    /// Nonzero step
    pub step: isize,
}

impl NormalizedSlice {
    /// Number of selected positions, `ceil((stop - start) / step)` clamped at zero
    pub fn len(&self) -> usize {
        let span = if self.step > 0 {
            self.stop - self.start
        } else {
            self.start - self.stop
        };
        if span <= 0 {
            return 0;
        }
        // Unsigned so that steps near isize::MIN/MAX cannot overflow
        (span as usize - 1) / self.step.unsigned_abs() + 1
    }

    /// Whether the slice selects nothing
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Selected positions, in traversal order
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        // Every offset stays inside the span, so the products cannot overflow
        (0..self.len()).map(move |k| (self.start + k as isize * self.step) as usize)
    }
}

/// One source axis after normalization
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AxisIndex {
    /// Keep the axis, restricted to a slice
    Slice(NormalizedSlice),
    /// Fix the axis at one position and drop it
    Collapsed(usize),
    /// Insert a unit axis
    NewAxis,
}

impl AxisIndex {
    /// Whether this entry consumes an axis of the source
    pub fn consumes_axis(&self) -> bool {
        !matches!(self, Self::NewAxis)
    }
}

/// Resolve a slice against an axis of length `len`
///
/// 1. An omitted step is 1; a zero step is an error.
/// 2. An omitted start is `len - 1` for negative steps and `0` otherwise.
/// 3. An omitted stop is `-1` for negative steps and `len` otherwise.
/// 4. A present bound is wrapped once if negative (`+= len`), then clamped to
///    `[-1, len - 1]` for negative steps or `[0, len]` otherwise.
/// 5. With a positive step, `stop < start` becomes `stop = start`.
///
/// # Example
///
/// ```
/// use subtensor::index::{SliceSpec, normalize_slice};
/// let s = normalize_slice(5, &SliceSpec::reversed()).unwrap();
/// assert_eq!((s.start, s.stop, s.step), (4, -1, -1));
/// assert_eq!(s.indices().collect::<Vec<_>>(), vec![4, 3, 2, 1, 0]);
/// ```
pub fn normalize_slice(len: usize, spec: &SliceSpec) -> Result<NormalizedSlice> {
    normalize_slice_on_axis(0, len, spec)
}

fn normalize_slice_on_axis(axis: usize, len: usize, spec: &SliceSpec) -> Result<NormalizedSlice> {
    let len = len as isize;
    let step = spec.step.unwrap_or(1);
    if step == 0 {
        return Err(Error::InvalidSlice {
            axis,
            reason: "slice step cannot be zero",
        });
    }

    let start = match spec.start {
        Some(v) => clamp_bound(v, len, step),
        None if step < 0 => len - 1,
        None => 0,
    };
    let mut stop = match spec.stop {
        Some(v) => clamp_bound(v, len, step),
        None if step < 0 => -1,
        None => len,
    };

    if stop < start && step > 0 {
        stop = start;
    }

    Ok(NormalizedSlice { start, stop, step })
}

/// Wrap a negative bound once, then clamp it to the traversal range
#[inline]
fn clamp_bound(v: isize, len: isize, step: isize) -> isize {
    let v = if v < 0 { v + len } else { v };
    if v < 0 {
        if step < 0 { -1 } else { 0 }
    } else if v >= len {
        if step < 0 { len - 1 } else { len }
    } else {
        v
    }
}

/// Resolve an integer index against an axis of length `len`
///
/// Negative indices wrap once; the result must lie in `[0, len)`.
pub fn normalize_index(len: usize, i: i64) -> Result<usize> {
    let wrapped = if i < 0 { i + len as i64 } else { i };
    if wrapped < 0 || wrapped >= len as i64 {
        return Err(Error::IndexOutOfBounds {
            index: i,
            size: len,
        });
    }
    Ok(wrapped as usize)
}

/// Resolve a full index list against `shape`
///
/// Trailing axes without an entry are taken whole. More axis-consuming
/// entries than dimensions is an error.
pub fn normalize_indices(shape: &[usize], specs: &[IndexSpec]) -> Result<Vec<AxisIndex>> {
    let consumed = specs.iter().filter(|s| s.consumes_axis()).count();
    if consumed > shape.len() {
        return Err(Error::index(format!(
            "too many indices: {} for tensor with {} dimensions",
            consumed,
            shape.len()
        )));
    }

    let mut axes = Vec::with_capacity(specs.len() + shape.len() - consumed);
    let mut axis = 0;
    for spec in specs {
        let resolved = match *spec {
            IndexSpec::NewAxis => AxisIndex::NewAxis,
            IndexSpec::Integer(i) | IndexSpec::RuntimeScalar(i) => {
                AxisIndex::Collapsed(normalize_index(shape[axis], i)?)
            }
            IndexSpec::Slice(ref slice) => {
                AxisIndex::Slice(normalize_slice_on_axis(axis, shape[axis], slice)?)
            }
        };
        log::trace!("axis {}: {:?} -> {:?}", axis, spec, resolved);
        if resolved.consumes_axis() {
            axis += 1;
        }
        axes.push(resolved);
    }

    for &len in &shape[axis..] {
        axes.push(AxisIndex::Slice(NormalizedSlice {
            start: 0,
            stop: len as isize,
            step: 1,
        }));
    }

    Ok(axes)
}

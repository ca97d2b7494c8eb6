//! Layout: shape, strides, and offset for tensor memory layout

use crate::error::{Error, Result};
use crate::index::AxisIndex;
use smallvec::SmallVec;
use std::fmt;

/// Stack allocation threshold for dimensions
/// Most tensors have 4 or fewer dimensions, so we stack-allocate up to 4
const STACK_DIMS: usize = 4;

/// Shape type: dimensions of a tensor
pub type Shape = SmallVec<[usize; STACK_DIMS]>;

/// Strides type: element offsets between consecutive elements along each dimension
/// Signed to support negative-step slices
/// NOTE: Strides are in ELEMENTS, not bytes
pub type Strides = SmallVec<[isize; STACK_DIMS]>;

/// Layout describes the memory layout of a tensor
///
/// A tensor's elements live in a buffer, but not necessarily in row-major
/// order. The layout specifies how to compute the memory address of any
/// element given its indices.
///
/// Address of element at indices [i0, i1, ..., in]:
///   offset + i0 * strides[0] + i1 * strides[1] + ... + in * strides[n]
#[derive(Clone, PartialEq, Eq)]
pub struct Layout {
    /// Shape: size along each dimension
    shape: Shape,
    /// Strides: offset (in elements) between consecutive elements along each dimension
    strides: Strides,
    /// Offset: starting element index in the underlying storage
    offset: usize,
}

impl Layout {
    /// Create a new contiguous (row-major/C-order) layout from a shape
    ///
    /// # Example
    /// ```
    /// use subtensor::tensor::Layout;
    /// let layout = Layout::contiguous(&[2, 3, 4]);
    /// assert_eq!(layout.shape(), &[2, 3, 4]);
    /// assert_eq!(layout.strides(), &[12, 4, 1]);
    /// ```
    pub fn contiguous(shape: &[usize]) -> Self {
        let shape: Shape = shape.iter().copied().collect();
        let strides = Self::compute_contiguous_strides(&shape);
        Self {
            shape,
            strides,
            offset: 0,
        }
    }

    /// Create a layout with explicit shape, strides, and offset
    pub fn new(shape: Shape, strides: Strides, offset: usize) -> Self {
        debug_assert_eq!(shape.len(), strides.len());
        Self {
            shape,
            strides,
            offset,
        }
    }

    /// Create a scalar (0-dimensional) layout
    pub fn scalar() -> Self {
        Self {
            shape: SmallVec::new(),
            strides: SmallVec::new(),
            offset: 0,
        }
    }

    /// Compute contiguous strides for a given shape (row-major order)
    fn compute_contiguous_strides(shape: &[usize]) -> Strides {
        let mut strides: Strides = SmallVec::with_capacity(shape.len());
        let mut stride = 1isize;

        for &dim in shape.iter().rev() {
            strides.push(stride);
            stride *= dim as isize;
        }

        strides.reverse();
        strides
    }

    /// Get the shape
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Get the strides
    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    /// Get the offset
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of dimensions (rank)
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements
    #[inline]
    pub fn elem_count(&self) -> usize {
        self.shape.iter().product()
    }

    /// Check if the tensor is a scalar (0 dimensions)
    #[inline]
    pub fn is_scalar(&self) -> bool {
        self.shape.is_empty()
    }

    /// Check if memory is contiguous (row-major order) and starts at offset 0
    pub fn is_contiguous(&self) -> bool {
        if self.is_scalar() {
            return self.offset == 0;
        }

        let expected = Self::compute_contiguous_strides(&self.shape);
        self.strides == expected && self.offset == 0
    }

    /// Element offset into the buffer of the element at `indices`
    ///
    /// `None` if `indices` has the wrong length or is out of bounds.
    pub fn element_offset(&self, indices: &[usize]) -> Option<usize> {
        if indices.len() != self.ndim() {
            return None;
        }

        for (idx, &dim) in indices.iter().zip(self.shape.iter()) {
            if *idx >= dim {
                return None;
            }
        }

        let mut linear = self.offset as isize;
        for (&idx, &stride) in indices.iter().zip(self.strides.iter()) {
            linear += idx as isize * stride;
        }

        usize::try_from(linear).ok()
    }

    /// Smallest and largest element offsets reachable through this layout
    ///
    /// Returns `None` for layouts that select no elements.
    pub fn extent(&self) -> Option<(usize, usize)> {
        if self.elem_count() == 0 {
            return None;
        }
        let mut lo = self.offset as isize;
        let mut hi = self.offset as isize;
        for (&dim, &stride) in self.shape.iter().zip(self.strides.iter()) {
            let reach = (dim as isize - 1) * stride;
            if reach < 0 {
                lo += reach;
            } else {
                hi += reach;
            }
        }
        Some((lo.max(0) as usize, hi.max(0) as usize))
    }

    /// Build the view selected by one normalized entry per axis.
    ///
    /// `axes` must hold exactly one axis-consuming entry (`Slice` or
    /// `Collapsed`) per dimension of this layout; `NewAxis` entries insert a
    /// unit dimension without consuming one.
    ///
    /// - A slice `(start, stop, step)` keeps its axis with extent
    ///   `ceil((stop - start) / step)` (zero if the range is empty) and stride
    ///   `stride * step`, and moves the offset by `stride * start`.
    /// - A collapsed axis moves the offset by `stride * i` and is dropped.
    ///
    /// Empty slices leave the offset where it is, so the result never points
    /// before the start of the buffer.
    pub fn subview(&self, axes: &[AxisIndex]) -> Result<Self> {
        let consumed = axes.iter().filter(|a| a.consumes_axis()).count();
        if consumed != self.ndim() {
            return Err(Error::index(format!(
                "{} indices for tensor with {} dimensions",
                consumed,
                self.ndim()
            )));
        }

        let mut shape = Shape::with_capacity(axes.len());
        let mut strides = Strides::with_capacity(axes.len());
        let mut offset = self.offset as isize;
        let mut src_axis = 0;

        for entry in axes {
            match *entry {
                AxisIndex::NewAxis => {
                    shape.push(1);
                    strides.push(0);
                }
                AxisIndex::Collapsed(i) => {
                    let len = self.shape[src_axis];
                    if i >= len {
                        return Err(Error::IndexOutOfBounds {
                            index: i as i64,
                            size: len,
                        });
                    }
                    offset += self.strides[src_axis] * i as isize;
                    src_axis += 1;
                }
                AxisIndex::Slice(slice) => {
                    let len = self.shape[src_axis] as isize;
                    let stride = self.strides[src_axis];
                    let extent = slice.len();
                    if extent > 0 {
                        if slice.start < 0 || slice.start >= len {
                            return Err(Error::index(format!(
                                "slice start {} outside axis {} of length {}",
                                slice.start, src_axis, len
                            )));
                        }
                        offset += stride * slice.start;
                    }
                    // A huge step only ever selects one element; its stride is never walked
                    let view_stride = match stride.checked_mul(slice.step) {
                        Some(v) => v,
                        None if extent <= 1 => 0,
                        None => {
                            return Err(Error::Internal(format!(
                                "stride {} times step {} overflows on axis {}",
                                stride, slice.step, src_axis
                            )));
                        }
                    };
                    shape.push(extent);
                    strides.push(view_stride);
                    src_axis += 1;
                }
            }
        }

        let offset = usize::try_from(offset)
            .map_err(|_| Error::Internal(format!("negative view offset {}", offset)))?;

        Ok(Self {
            shape,
            strides,
            offset,
        })
    }

    /// Create a reshaped layout (if contiguous)
    ///
    /// Returns None if the tensor is not contiguous or shapes don't match
    pub fn reshape(&self, new_shape: &[usize]) -> Option<Self> {
        if !self.is_contiguous() {
            return None;
        }

        let new_count: usize = new_shape.iter().product();
        if new_count != self.elem_count() {
            return None;
        }

        Some(Self::contiguous(new_shape))
    }

    /// Create a squeezed layout (remove dimensions of size 1)
    ///
    /// With `Some(dim)`, only that dimension is removed, and only if it has
    /// size 1.
    pub fn squeeze(&self, dim: Option<usize>) -> Self {
        match dim {
            Some(idx) => {
                if idx < self.ndim() && self.shape[idx] == 1 {
                    let mut new_shape = self.shape.clone();
                    let mut new_strides = self.strides.clone();
                    new_shape.remove(idx);
                    new_strides.remove(idx);
                    return Self::new(new_shape, new_strides, self.offset);
                }
                self.clone()
            }
            None => {
                let mut new_shape = Shape::new();
                let mut new_strides = Strides::new();
                for (&s, &st) in self.shape.iter().zip(self.strides.iter()) {
                    if s != 1 {
                        new_shape.push(s);
                        new_strides.push(st);
                    }
                }
                Self::new(new_shape, new_strides, self.offset)
            }
        }
    }

    /// Prepend unit dimensions until the layout has `ndim` dimensions
    ///
    /// Returns None if the layout already has more dimensions.
    pub fn left_pad(&self, ndim: usize) -> Option<Self> {
        if ndim < self.ndim() {
            return None;
        }
        let pad = ndim - self.ndim();
        let mut new_shape = Shape::with_capacity(ndim);
        let mut new_strides = Strides::with_capacity(ndim);
        for _ in 0..pad {
            new_shape.push(1);
            new_strides.push(0);
        }
        new_shape.extend_from_slice(&self.shape);
        new_strides.extend_from_slice(&self.strides);
        Some(Self::new(new_shape, new_strides, self.offset))
    }

    /// Create a broadcast layout to a target shape
    ///
    /// Returns None if shapes are not broadcastable
    pub fn broadcast_to(&self, target: &[usize]) -> Option<Self> {
        if target.len() < self.ndim() {
            return None;
        }

        let mut new_shape = Shape::new();
        let mut new_strides = Strides::new();

        let pad = target.len() - self.ndim();
        for &t in &target[..pad] {
            new_shape.push(t);
            new_strides.push(0);
        }

        for ((&s, &st), &t) in self
            .shape
            .iter()
            .zip(self.strides.iter())
            .zip(&target[pad..])
        {
            if s == t {
                new_shape.push(t);
                new_strides.push(if s == 1 { 0 } else { st });
            } else if s == 1 {
                new_shape.push(t);
                new_strides.push(0);
            } else {
                return None;
            }
        }

        Some(Self::new(new_shape, new_strides, self.offset))
    }
}

impl fmt::Debug for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Layout {{ shape: {:?}, strides: {:?}, offset: {} }}",
            self.shape.as_slice(),
            self.strides.as_slice(),
            self.offset
        )
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.shape.as_slice())
    }
}

/// Compute the broadcast shape of two shapes
pub fn broadcast_shapes(a: &[usize], b: &[usize]) -> Option<Shape> {
    let max_ndim = a.len().max(b.len());
    let mut result = Shape::with_capacity(max_ndim);

    for i in 0..max_ndim {
        let a_dim = if i < a.len() { a[a.len() - 1 - i] } else { 1 };
        let b_dim = if i < b.len() { b[b.len() - 1 - i] } else { 1 };

        if a_dim == b_dim {
            result.push(a_dim);
        } else if a_dim == 1 {
            result.push(b_dim);
        } else if b_dim == 1 {
            result.push(a_dim);
        } else {
            return None;
        }
    }

    result.reverse();
    Some(result)
}

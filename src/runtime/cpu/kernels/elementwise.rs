//! Strided in-place elementwise kernels

use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::kernel::InplaceOp;

/// Apply `dst op= src` over a strided iteration space
///
/// `dst` and `src` point at the first element of their views; both are
/// walked in row-major order of `shape` through their own strides. A scalar
/// (`shape` empty) is updated once.
///
/// # Safety
/// - Every position reachable through `shape`/strides must be valid
/// - `dst` positions must be distinct unless `op` is idempotent for them
/// - `src` must not overlap `dst` unless both are the same view
pub unsafe fn inplace_strided_kernel<T: Element>(
    op: InplaceOp,
    dst: *mut T,
    src: *const T,
    shape: &[usize],
    dst_strides: &[isize],
    src_strides: &[isize],
) {
    let ndim = shape.len();
    let total = shape.iter().product::<usize>();

    if total == 0 {
        return;
    }

    // Incremental offsets avoid recomputing the full dot product per element
    let mut indices = vec![0usize; ndim];
    let mut d_idx = 0isize;
    let mut s_idx = 0isize;

    for _ in 0..total {
        let d = dst.offset(d_idx);
        let s = *src.offset(s_idx);
        *d = match op {
            InplaceOp::Add => (*d).accumulate(s),
            InplaceOp::Assign => s,
        };

        for dim in (0..ndim).rev() {
            indices[dim] += 1;
            d_idx += dst_strides[dim];
            s_idx += src_strides[dim];

            if indices[dim] < shape[dim] {
                break;
            }

            indices[dim] = 0;
            d_idx -= (shape[dim] as isize) * dst_strides[dim];
            s_idx -= (shape[dim] as isize) * src_strides[dim];
        }
    }
}

/// Strided assignment that moves raw element bits of any width
///
/// # Safety
/// Same as [`inplace_strided_kernel`], with `dst`/`src` addresses aligned
/// to `elem_size`.
pub unsafe fn assign_bits_kernel(
    elem_size: usize,
    dst: u64,
    src: u64,
    shape: &[usize],
    dst_strides: &[isize],
    src_strides: &[isize],
) -> Result<()> {
    macro_rules! assign_as {
        ($t:ty) => {
            inplace_strided_kernel::<$t>(
                InplaceOp::Assign,
                dst as *mut $t,
                src as *const $t,
                shape,
                dst_strides,
                src_strides,
            )
        };
    }

    match elem_size {
        1 => assign_as!(u8),
        2 => assign_as!(u16),
        4 => assign_as!(u32),
        8 => assign_as!(u64),
        other => {
            return Err(Error::Internal(format!(
                "no assignment kernel for {}-byte elements",
                other
            )));
        }
    }
    Ok(())
}

//! Validation shared by every backend's elementwise implementation

use super::traits::ElementwiseOps;
use crate::error::{Error, Result};
use crate::runtime::{Runtime, RuntimeClient};
use crate::tensor::{Tensor, broadcast_shapes};

/// Reject operands of differing dtype
#[inline]
pub(crate) fn ensure_same_dtype<R: Runtime>(a: &Tensor<R>, b: &Tensor<R>) -> Result<()> {
    if a.dtype() != b.dtype() {
        return Err(Error::DTypeMismatch {
            lhs: a.dtype(),
            rhs: b.dtype(),
        });
    }
    Ok(())
}

/// Source of an in-place update, laid out with exactly `dst`'s shape
///
/// Without `broadcast`, the shapes must already match. With it, `src` is
/// broadcast (zero-copy) to `dst`'s shape.
pub(crate) fn inplace_source<R: Runtime>(
    dst: &Tensor<R>,
    src: &Tensor<R>,
    broadcast: bool,
) -> Result<Tensor<R>> {
    ensure_same_dtype(dst, src)?;
    if src.shape() == dst.shape() {
        return Ok(src.clone());
    }
    if !broadcast {
        return Err(Error::shape_mismatch(dst.shape(), src.shape()));
    }
    src.broadcast_to(dst.shape())
}

/// Output shape of a broadcasting binary operation
pub(crate) fn binary_output_shape<R: Runtime>(
    a: &Tensor<R>,
    b: &Tensor<R>,
) -> Result<Vec<usize>> {
    ensure_same_dtype(a, b)?;
    broadcast_shapes(a.shape(), b.shape())
        .map(|s| s.to_vec())
        .ok_or_else(|| Error::broadcast(a.shape(), b.shape()))
}

/// Broadcasting `a + b` built from a zero-filled output, `assign` and `add_assign`
pub(crate) fn add_via_assign<R, C>(client: &C, a: &Tensor<R>, b: &Tensor<R>) -> Result<Tensor<R>>
where
    R: Runtime,
    C: ElementwiseOps<R> + RuntimeClient<R>,
{
    let out_shape = binary_output_shape(a, b)?;
    let out = Tensor::<R>::try_zeros(&out_shape, a.dtype(), client.device())?;
    client.assign(&out, a)?;
    client.add_assign(&out, b, true)?;
    Ok(out)
}

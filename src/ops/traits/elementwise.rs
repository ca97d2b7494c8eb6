//! Elementwise update operations trait.

use crate::error::Result;
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Elementwise operations used to combine a source into a destination view.
///
/// The `*_assign` methods write through `dst`, which is usually a view into a
/// larger tensor: every tensor sharing `dst`'s storage observes the update.
/// `dst` and `src` must not overlap unless they are the same view.
///
/// # Example
///
/// ```
/// use subtensor::prelude::*;
///
/// let device = CpuDevice::new();
/// let client = CpuRuntime::create_client(&device)?;
///
/// let x = Tensor::<CpuRuntime>::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[2, 2], &device);
/// let row = x.view_of(&[IndexSpec::Integer(0)])?;
/// let ones = Tensor::<CpuRuntime>::from_slice(&[1.0f32, 1.0], &[2], &device);
/// client.add_assign(&row, &ones, false)?;
/// assert_eq!(x.to_vec::<f32>(), vec![2.0, 3.0, 3.0, 4.0]);
/// # Ok::<(), subtensor::error::Error>(())
/// ```
pub trait ElementwiseOps<R: Runtime> {
    /// Elementwise `a + b` into a new contiguous tensor, with broadcasting
    ///
    /// # Errors
    /// `DTypeMismatch` for differing dtypes, `BroadcastError` for
    /// incompatible shapes.
    fn add(&self, a: &Tensor<R>, b: &Tensor<R>) -> Result<Tensor<R>>;

    /// In-place `dst += src`
    ///
    /// With `broadcast == false`, `src` must have exactly `dst`'s shape
    /// (`ShapeMismatch` otherwise). With `broadcast == true`, `src` is
    /// broadcast to `dst`'s shape.
    fn add_assign(&self, dst: &Tensor<R>, src: &Tensor<R>, broadcast: bool) -> Result<()>;

    /// In-place `dst = src`, broadcasting `src` to `dst`'s shape
    fn assign(&self, dst: &Tensor<R>, src: &Tensor<R>) -> Result<()>;
}

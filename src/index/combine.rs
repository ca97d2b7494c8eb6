//! In-place set / accumulate through a basic-index view

use super::capability::Indexable;
use super::types::IndexSpec;
use crate::error::{Error, Result};
use crate::ops::ElementwiseOps;
use crate::ops::common::ensure_same_dtype;
use crate::runtime::{Runtime, RuntimeClient};
use crate::tensor::Tensor;
use std::fmt;

/// How a source combines with the destination elements it lands on
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CombineMode {
    /// Overwrite: `x[idx] = y`
    Set,
    /// Add: `x[idx] += y`
    #[default]
    Accumulate,
}

impl CombineMode {
    /// Whether this is [`CombineMode::Set`]
    pub fn is_set(self) -> bool {
        matches!(self, Self::Set)
    }
}

impl fmt::Display for CombineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Set => write!(f, "set"),
            Self::Accumulate => write!(f, "inc"),
        }
    }
}

/// `x[idx_list] = y` or `x[idx_list] += y`
///
/// Without [`Self::inplace`], `x` is deep-copied first and left untouched.
/// With it, `x`'s storage is updated and the result aliases it.
///
/// # Example
///
/// ```
/// use subtensor::prelude::*;
///
/// let device = CpuDevice::new();
/// let client = CpuRuntime::create_client(&device)?;
/// let x = Tensor::<CpuRuntime>::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[2, 2], &device);
/// let y = Tensor::<CpuRuntime>::from_slice(&[10.0f32, 10.0], &[2], &device);
///
/// let op = IncSubtensor::new(vec![IndexSpec::Integer(0)], CombineMode::Accumulate);
/// let out = op.perform(&client, &x, &y)?;
/// assert_eq!(out.to_vec::<f32>(), vec![11.0, 12.0, 3.0, 4.0]);
/// assert_eq!(x.to_vec::<f32>(), vec![1.0, 2.0, 3.0, 4.0]);
/// # Ok::<(), subtensor::error::Error>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IncSubtensor {
    idx_list: Vec<IndexSpec>,
    mode: CombineMode,
    inplace: bool,
}

impl IncSubtensor {
    /// Out-of-place operation applying `mode` through `idx_list`
    pub fn new(idx_list: Vec<IndexSpec>, mode: CombineMode) -> Self {
        Self {
            idx_list,
            mode,
            inplace: false,
        }
    }

    /// Update the destination's storage instead of a copy
    pub fn inplace(mut self, inplace: bool) -> Self {
        self.inplace = inplace;
        self
    }

    /// Combine mode
    pub fn mode(&self) -> CombineMode {
        self.mode
    }

    /// Whether the destination is updated in place
    pub fn is_inplace(&self) -> bool {
        self.inplace
    }

    /// Apply the update, returning the updated destination
    ///
    /// # Errors
    /// - `DTypeMismatch` if `x` and `y` differ in dtype
    /// - indexing errors from the index list
    /// - `ShapeMismatch` when accumulating a differently shaped `y`
    /// - `BroadcastError` when setting a `y` that does not broadcast
    /// - `Dimension` when a scalar position receives more than one element
    pub fn perform<R, C>(&self, client: &C, x: &Tensor<R>, y: &Tensor<R>) -> Result<Tensor<R>>
    where
        R: Runtime,
        C: ElementwiseOps<R> + RuntimeClient<R>,
    {
        ensure_same_dtype(x, y)?;

        let out = if self.inplace { x.clone() } else { x.copy()? };
        let view = self.view(&out)?;

        if view.ndim() > 0 {
            match self.mode {
                CombineMode::Accumulate => client.add_assign(&view, y, false)?,
                CombineMode::Set => client.assign(&view, y)?,
            }
            return Ok(out);
        }

        if y.numel() != 1 {
            return Err(Error::dimension(format!(
                "cannot {} a source of shape {:?} into a single element",
                self.mode,
                y.shape()
            )));
        }
        let y = y.squeeze(None);
        match self.mode {
            CombineMode::Accumulate => {
                let sum = client.add(&view, &y)?;
                client.assign(&view, &sum)?;
            }
            CombineMode::Set => client.assign(&view, &y)?,
        }
        Ok(out)
    }
}

impl Indexable for IncSubtensor {
    fn idx_list(&self) -> &[IndexSpec] {
        &self.idx_list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::DType;
    use crate::index::SliceSpec;
    use crate::runtime::cpu::{CpuClient, CpuDevice, CpuRuntime};
    use half::f16;

    fn setup() -> (CpuClient, CpuDevice) {
        let device = CpuDevice::new();
        (CpuClient::new(device.clone()), device)
    }

    #[test]
    fn test_accumulate_copy_leaves_source() {
        let (client, device) = setup();
        let x = Tensor::<CpuRuntime>::from_slice(&[1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3], &device);
        let y = Tensor::<CpuRuntime>::from_slice(&[1.0f64, 1.0], &[2], &device);
        let op = IncSubtensor::new(
            vec![SliceSpec::full().into(), SliceSpec::range(1, 3).into()],
            CombineMode::Accumulate,
        );

        // [2, 2] view against [2] source: no broadcasting when accumulating
        assert!(matches!(
            op.perform(&client, &x, &y),
            Err(Error::ShapeMismatch { .. })
        ));

        let y = Tensor::<CpuRuntime>::from_slice(&[1.0f64, 1.0, 1.0, 1.0], &[2, 2], &device);
        let out = op.perform(&client, &x, &y).unwrap();
        assert!(!out.shares_storage(&x));
        assert_eq!(out.to_vec::<f64>(), vec![1.0, 3.0, 4.0, 4.0, 6.0, 7.0]);
        assert_eq!(x.to_vec::<f64>(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_set_broadcasts_inplace() {
        let (client, device) = setup();
        let x = Tensor::<CpuRuntime>::zeros(&[3, 2], DType::I32, &device);
        let y = Tensor::<CpuRuntime>::from_slice(&[7i32, 8], &[2], &device);
        let op = IncSubtensor::new(vec![SliceSpec::reversed().into()], CombineMode::Set).inplace(true);

        let out = op.perform(&client, &x, &y).unwrap();
        assert!(out.shares_storage(&x));
        assert_eq!(x.to_vec::<i32>(), vec![7, 8, 7, 8, 7, 8]);
    }

    #[test]
    fn test_scalar_position() {
        let (client, device) = setup();
        let x = Tensor::<CpuRuntime>::from_slice(&[f16::from_f32(1.5); 4], &[2, 2], &device);
        let y = Tensor::<CpuRuntime>::from_slice(&[f16::from_f32(2.0)], &[1, 1], &device);

        let inc = IncSubtensor::new(
            vec![IndexSpec::Integer(1), IndexSpec::Integer(-1)],
            CombineMode::Accumulate,
        );
        let out = inc.perform(&client, &x, &y).unwrap();
        let vals: Vec<f32> = out.to_vec::<f16>().iter().map(|v| v.to_f32()).collect();
        assert_eq!(vals, vec![1.5, 1.5, 1.5, 3.5]);

        let set = IncSubtensor::new(vec![IndexSpec::Integer(0), IndexSpec::Integer(0)], CombineMode::Set);
        let out = set.perform(&client, &out, &y).unwrap();
        assert_eq!(out.to_vec::<f16>()[0].to_f32(), 2.0);
    }

    #[test]
    fn test_scalar_position_rejects_vector_source() {
        let (client, device) = setup();
        let x = Tensor::<CpuRuntime>::zeros(&[3], DType::F32, &device);
        let y = Tensor::<CpuRuntime>::zeros(&[2], DType::F32, &device);
        let op = IncSubtensor::new(vec![IndexSpec::Integer(0)], CombineMode::Set);
        assert!(matches!(
            op.perform(&client, &x, &y),
            Err(Error::Dimension { .. })
        ));
    }

    #[test]
    fn test_dtype_mismatch() {
        let (client, device) = setup();
        let x = Tensor::<CpuRuntime>::zeros(&[3], DType::F32, &device);
        let y = Tensor::<CpuRuntime>::zeros(&[3], DType::F64, &device);
        let op = IncSubtensor::new(vec![], CombineMode::Accumulate);
        assert!(matches!(
            op.perform(&client, &x, &y),
            Err(Error::DTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_empty_index_list_covers_whole_tensor() {
        let (client, device) = setup();
        let x = Tensor::<CpuRuntime>::from_slice(&[1u16, 2, 3], &[3], &device);
        let y = Tensor::<CpuRuntime>::from_slice(&[1u16, 1, 1], &[3], &device);
        let op = IncSubtensor::new(vec![], CombineMode::Accumulate).inplace(true);
        op.perform(&client, &x, &y).unwrap();
        assert_eq!(x.to_vec::<u16>(), vec![2, 3, 4]);
    }
}

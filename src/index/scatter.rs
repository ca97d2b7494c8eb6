//! Row scatter: `x[ilist] = y` / `x[ilist] += y`
//!
//! ```text
//! AdvancedIncSubtensor1::perform
//!   ├── validate operands, copy x unless in place
//!   ├── resolve every index on the host (wrap once, bounds check)
//!   └── strategy
//!         ├── Atomic(AtomicScatter) ── eligible? ── client.scatter_add_atomic
//!         │                               └── UnsupportedDType / UnsupportedConfiguration
//!         │                                     └── fall through
//!         └── Sequential ── one row view at a time (add_assign / assign)
//! ```

use super::capability::AtomicCapable;
use super::combine::CombineMode;
use super::normalize::normalize_index;
use super::types::IndexSpec;
use crate::config::IndexingConfig;
use crate::dispatch_int_dtype;
use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::ops::common::ensure_same_dtype;
use crate::ops::{AtomicScatterOps, ElementwiseOps};
use crate::runtime::{Runtime, RuntimeClient};
use crate::tensor::Tensor;

/// Minimum compute capability for the atomic scatter kernel
pub const ATOMIC_MIN_CAPABILITY: (u32, u32) = (2, 0);

/// Grid-parallel scatter-accumulate through device atomics
///
/// Handles rank-2 `Accumulate` updates of f16, f32 and f64 destinations on
/// devices of at least [`ATOMIC_MIN_CAPABILITY`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AtomicScatter {
    min_capability: (u32, u32),
}

impl AtomicScatter {
    /// Strategy gated on [`ATOMIC_MIN_CAPABILITY`]
    pub fn new() -> Self {
        Self {
            min_capability: ATOMIC_MIN_CAPABILITY,
        }
    }

    /// Strategy gated on a custom minimum capability
    pub fn with_min_capability(major: u32, minor: u32) -> Self {
        Self {
            min_capability: (major, minor),
        }
    }

    /// Run the kernel, or report why it cannot handle these operands
    ///
    /// Any error for which [`Error::is_fallback_eligible`] holds is returned
    /// before `x` is touched.
    pub fn try_apply<R, C>(
        &self,
        client: &C,
        mode: CombineMode,
        x: &Tensor<R>,
        y: &Tensor<R>,
        ilist: &Tensor<R>,
        config: &IndexingConfig,
    ) -> Result<()>
    where
        R: Runtime,
        C: AtomicScatterOps<R>,
    {
        if mode.is_set() {
            return Err(Error::unsupported_configuration(
                "atomic scatter cannot set, only accumulate",
            ));
        }
        self.check_capability(client.atomic_capability())?;
        client.scatter_add_atomic(x, y, ilist, config)
    }
}

impl Default for AtomicScatter {
    fn default() -> Self {
        Self::new()
    }
}

impl AtomicCapable for AtomicScatter {
    fn min_capability(&self) -> (u32, u32) {
        self.min_capability
    }
}

/// How rows are updated
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScatterStrategy {
    /// Try the atomic kernel, falling back to [`ScatterStrategy::Sequential`]
    Atomic(AtomicScatter),
    /// Update one row view after another on the host
    Sequential,
}

impl ScatterStrategy {
    /// Default strategy for a combine mode
    pub fn for_mode(mode: CombineMode) -> Self {
        match mode {
            CombineMode::Accumulate => Self::Atomic(AtomicScatter::new()),
            CombineMode::Set => Self::Sequential,
        }
    }
}

/// `x[ilist] = y` or `x[ilist] += y` over the leading axis of `x`
///
/// `ilist` is a vector of integer row indices; duplicates are allowed. When
/// `y` has `x`'s rank and a leading extent other than 1, row `i` of `y`
/// goes to row `ilist[i]` of `x`. Otherwise `y` is broadcast to every
/// selected row.
///
/// When accumulating, every contribution to a repeated row is summed. When
/// setting, which contribution survives for a repeated row is unspecified.
///
/// # Example
///
/// ```
/// use subtensor::prelude::*;
///
/// let device = CpuDevice::new();
/// let client = CpuRuntime::create_client(&device)?;
/// let x = Tensor::<CpuRuntime>::zeros(&[3, 2], DType::F32, &device);
/// let y = Tensor::<CpuRuntime>::from_slice(&[1.0f32, 1.0, 1.0, 1.0], &[2, 2], &device);
/// let ilist = Tensor::<CpuRuntime>::from_slice(&[0i64, 0], &[2], &device);
///
/// let out = AdvancedIncSubtensor1::new(CombineMode::Accumulate).perform(&client, &x, &y, &ilist)?;
/// assert_eq!(out.to_vec::<f32>(), vec![2.0, 2.0, 0.0, 0.0, 0.0, 0.0]);
/// # Ok::<(), subtensor::error::Error>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AdvancedIncSubtensor1 {
    mode: CombineMode,
    inplace: bool,
    config: IndexingConfig,
    strategy: ScatterStrategy,
}

impl AdvancedIncSubtensor1 {
    /// Out-of-place scatter with the default strategy for `mode`
    pub fn new(mode: CombineMode) -> Self {
        Self {
            mode,
            inplace: false,
            config: IndexingConfig::default(),
            strategy: ScatterStrategy::for_mode(mode),
        }
    }

    /// Update the destination's storage instead of a copy
    pub fn inplace(mut self, inplace: bool) -> Self {
        self.inplace = inplace;
        self
    }

    /// Use `config` for kernel launches
    pub fn with_config(mut self, config: IndexingConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the update strategy
    pub fn with_strategy(mut self, strategy: ScatterStrategy) -> Self {
        self.strategy = strategy;
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

    /// Selected strategy
    pub fn strategy(&self) -> ScatterStrategy {
        self.strategy
    }

    /// Launch configuration
    pub fn config(&self) -> IndexingConfig {
        self.config
    }

    /// Apply the scatter, returning the updated destination
    ///
    /// # Errors
    /// - `DTypeMismatch` if `x` and `y` differ in dtype
    /// - `Dimension` for a non-integer or non-vector `ilist`, a scalar `x`,
    ///   a `y` of higher rank than `x`, or a row-count mismatch in the
    ///   one-to-one mapping
    /// - `IndexOutOfBounds` for an index outside `x`'s leading axis
    /// - `Kernel` if the atomic kernel fails to launch or run
    pub fn perform<R, C>(
        &self,
        client: &C,
        x: &Tensor<R>,
        y: &Tensor<R>,
        ilist: &Tensor<R>,
    ) -> Result<Tensor<R>>
    where
        R: Runtime,
        C: ElementwiseOps<R> + AtomicScatterOps<R> + RuntimeClient<R>,
    {
        validate_operands(x, y, ilist)?;

        let out = if self.inplace { x.clone() } else { x.copy()? };
        let rows = resolve_rows(ilist, out.shape()[0])?;
        if rows.is_empty() {
            return Ok(out);
        }

        if let ScatterStrategy::Atomic(atomic) = self.strategy {
            match atomic.try_apply(client, self.mode, &out, y, ilist, &self.config) {
                Ok(()) => {
                    log::debug!("scatter: atomic kernel over {} indices", rows.len());
                    return Ok(out);
                }
                Err(e) if e.is_fallback_eligible() => {
                    log::debug!("scatter: sequential fallback ({})", e);
                }
                Err(e) => return Err(e),
            }
        }

        self.apply_sequential(client, &out, y, &rows)?;
        Ok(out)
    }

    fn apply_sequential<R, C>(&self, client: &C, x: &Tensor<R>, y: &Tensor<R>, rows: &[usize]) -> Result<()>
    where
        R: Runtime,
        C: ElementwiseOps<R>,
    {
        let one_to_one = y.ndim() == x.ndim() && y.shape()[0] != 1;
        if one_to_one {
            if y.shape()[0] != rows.len() {
                return Err(Error::dimension(format!(
                    "source has {} rows for {} indices",
                    y.shape()[0],
                    rows.len()
                )));
            }
            for (j, &row) in rows.iter().enumerate() {
                let src = y.view_of(&[IndexSpec::Integer(j as i64)])?;
                self.update_row(client, x, &src, row)?;
            }
            return Ok(());
        }

        let src = if y.ndim() == x.ndim() {
            y.squeeze(Some(0))
        } else {
            y.left_pad(x.ndim() - 1)?
        };
        for &row in rows {
            self.update_row(client, x, &src, row)?;
        }
        Ok(())
    }

    fn update_row<R, C>(&self, client: &C, x: &Tensor<R>, src: &Tensor<R>, row: usize) -> Result<()>
    where
        R: Runtime,
        C: ElementwiseOps<R>,
    {
        let dst = x.view_of(&[IndexSpec::Integer(row as i64)])?;
        match self.mode {
            CombineMode::Accumulate => client.add_assign(&dst, src, true),
            CombineMode::Set => client.assign(&dst, src),
        }
    }
}

fn validate_operands<R: Runtime>(x: &Tensor<R>, y: &Tensor<R>, ilist: &Tensor<R>) -> Result<()> {
    ensure_same_dtype(x, y)?;
    if !ilist.dtype().is_int() {
        return Err(Error::dimension(format!(
            "index list must have an integer dtype, got {}",
            ilist.dtype()
        )));
    }
    if ilist.ndim() != 1 {
        return Err(Error::dimension(format!(
            "index list must be a vector, got rank {}",
            ilist.ndim()
        )));
    }
    if x.ndim() == 0 {
        return Err(Error::dimension("cannot index into a scalar"));
    }
    if y.ndim() > x.ndim() {
        return Err(Error::dimension(format!(
            "cannot scatter a rank-{} source into a rank-{} destination",
            y.ndim(),
            x.ndim()
        )));
    }
    Ok(())
}

/// Read `ilist` to the host and resolve each entry against `len` rows
///
/// Unsigned entries above `i64::MAX` saturate, so they are reported out of
/// bounds rather than wrapped.
fn resolve_rows<R: Runtime>(ilist: &Tensor<R>, len: usize) -> Result<Vec<usize>> {
    let raw: Vec<i64> = dispatch_int_dtype!(ilist.dtype(), T => {
        ilist
            .try_to_vec::<T>()
            .map(|v| v.into_iter().map(|i| i.to_i64().unwrap_or(i64::MAX)).collect())
    }, "scatter indices")?;
    raw.into_iter().map(|i| normalize_index(len, i)).collect()
}

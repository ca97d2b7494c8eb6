//! Host execution of the atomic scatter-accumulate kernel
//!
//! Mirrors the device kernel: block `b` handles index entries
//! `b, b + gridDim, ...` and thread `t` handles columns `t, t + blockDim, ...`.
//! Blocks run concurrently with the `rayon` feature, so duplicate indices
//! really race and rely on the atomic adds.

use super::atomic::AtomicAddElement;
use crate::dtype::{DType, Element};
use crate::error::{Error, Result};
use crate::kernel::{AtomicScatterPlan, VECTOR_ADD_FAST, VectorAddFastArgs};
use half::f16;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Run `k_vector_add_fast` for a validated plan
///
/// # Safety
/// The buffers named by `plan.args` must be live host allocations covering
/// every position the plan addresses, and all indices must already be
/// known to lie in `[-rows, rows)`.
pub unsafe fn launch_vector_add_fast(plan: &AtomicScatterPlan) -> Result<()> {
    if plan.is_empty() {
        return Ok(());
    }

    let emitter = &plan.emitter;
    match emitter.dtype_x {
        DType::F32 => launch_typed::<f32>(plan, emitter.dtype_ind),
        DType::F64 => launch_typed::<f64>(plan, emitter.dtype_ind),
        DType::F16 => launch_typed::<f16>(plan, emitter.dtype_ind),
        other => Err(Error::unsupported_dtype(other, VECTOR_ADD_FAST)),
    }
}

unsafe fn launch_typed<T: AtomicAddElement>(plan: &AtomicScatterPlan, dtype_ind: DType) -> Result<()> {
    crate::dispatch_int_dtype!(dtype_ind, I => {
        run_grid::<T, I>(plan);
        Ok(())
    }, VECTOR_ADD_FAST)
}

unsafe fn run_grid<T: AtomicAddElement, I: Element>(plan: &AtomicScatterPlan) {
    let args = plan.args;
    let blocks = plan.grid.x as u64;
    let threads = plan.block.x as u64;

    #[cfg(feature = "rayon")]
    {
        (0..blocks).into_par_iter().for_each(|block| unsafe {
            run_block::<T, I>(&args, block, blocks, threads);
        });
    }

    #[cfg(not(feature = "rayon"))]
    for block in 0..blocks {
        run_block::<T, I>(&args, block, blocks, threads);
    }
}

/// One block of the grid, with its threads run in turn
unsafe fn run_block<T: AtomicAddElement, I: Element>(
    args: &VectorAddFastArgs,
    block: u64,
    grid_dim: u64,
    block_dim: u64,
) {
    let x = (args.x + args.offset_x) as *mut T;
    let y = (args.y + args.offset_y) as *const T;
    let indices = (args.indices + args.offset_indices) as *const I;
    let [sx0, sx1] = args.strides_x;
    let [sy0, sy1] = args.strides_y;

    let mut i = block;
    while i < args.num_indices {
        let raw = *indices.offset((i as i64 * args.stride_indices) as isize);
        // Indices were bounds-checked by the caller; one that does not fit
        // an i64 cannot name a row
        let Some(mut x_row) = raw.to_i64() else {
            i += grid_dim;
            continue;
        };
        if x_row < 0 {
            x_row += args.num_rows_x as i64;
        }
        let y_row = i as i64;

        for thread in 0..block_dim {
            let mut j = thread;
            while j < args.num_cols_x {
                let dst = x.offset((x_row * sx0 + j as i64 * sx1) as isize);
                let val = *y.offset((y_row * sy0 + j as i64 * sy1) as isize);
                T::atomic_add(dst, val);
                j += block_dim;
            }
        }

        i += grid_dim;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::cpu::{CpuDevice, CpuRuntime};
    use crate::tensor::Tensor;

    #[test]
    fn test_duplicate_rows_accumulate() {
        let device = CpuDevice::new();
        let x = Tensor::<CpuRuntime>::zeros(&[3, 2], DType::F32, &device);
        let y = Tensor::<CpuRuntime>::from_slice(&[1.0f32, 1.0, 1.0, 1.0], &[2, 2], &device);
        let ind = Tensor::<CpuRuntime>::from_slice(&[0i64, 0], &[2], &device);

        let plan = AtomicScatterPlan::new(&x, &y, &ind).unwrap();
        unsafe { launch_vector_add_fast(&plan).unwrap() };
        assert_eq!(x.to_vec::<f32>(), vec![2.0, 2.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_negative_indices_and_broadcast_source() {
        let device = CpuDevice::new();
        let x = Tensor::<CpuRuntime>::zeros(&[4, 3], DType::F64, &device);
        let y = Tensor::<CpuRuntime>::from_slice(&[1.0f64, 2.0, 3.0], &[1, 3], &device);
        let ind = Tensor::<CpuRuntime>::from_slice(&[-1i32, 1, -1], &[3], &device);

        let plan = AtomicScatterPlan::new(&x, &y, &ind).unwrap();
        unsafe { launch_vector_add_fast(&plan).unwrap() };
        assert_eq!(
            x.to_vec::<f64>(),
            vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 2.0, 4.0, 6.0]
        );
    }

    #[test]
    fn test_grid_stride_beyond_limits() {
        // More indices than blocks and more columns than threads
        let device = CpuDevice::new();
        let rows = 3;
        let cols = 300;
        let n = 5000;
        let x = Tensor::<CpuRuntime>::zeros(&[rows, cols], DType::F32, &device);
        let y = Tensor::<CpuRuntime>::from_slice(&[1.0f32], &[1, 1], &device);
        let idx: Vec<u16> = (0..n).map(|i| (i % rows) as u16).collect();
        let ind = Tensor::<CpuRuntime>::from_slice(&idx, &[n], &device);

        let plan = AtomicScatterPlan::new(&x, &y, &ind).unwrap();
        assert_eq!(plan.grid.x, 4096);
        assert_eq!(plan.block.x, 256);
        unsafe { launch_vector_add_fast(&plan).unwrap() };

        let out = x.to_vec::<f32>();
        for r in 0..rows {
            let expected = ((n - r + rows - 1) / rows) as f32;
            assert!(out[r * cols..(r + 1) * cols].iter().all(|&v| v == expected));
        }
    }

    #[test]
    fn test_half_odd_length_row() {
        let device = CpuDevice::new();
        let x = Tensor::<CpuRuntime>::zeros(&[3, 1], DType::F16, &device);
        let y = Tensor::<CpuRuntime>::from_slice(&[f16::from_f32(0.5)], &[1, 1], &device);
        let ind = Tensor::<CpuRuntime>::from_slice(&[2i64, 2, 2, 0], &[4], &device);

        let plan = AtomicScatterPlan::new(&x, &y, &ind).unwrap();
        unsafe { launch_vector_add_fast(&plan).unwrap() };
        let out: Vec<f32> = x.to_vec::<f16>().iter().map(|v| v.to_f32()).collect();
        assert_eq!(out, vec![0.5, 0.0, 1.5]);
    }
}

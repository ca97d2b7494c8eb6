//! Common test utilities
#![allow(dead_code)]

use subtensor::index::{IndexSpec, SliceSpec, normalize_index, normalize_slice};
use subtensor::runtime::Runtime;
use subtensor::runtime::cpu::{CpuClient, CpuDevice, CpuRuntime};
#[cfg(feature = "cuda")]
use subtensor::runtime::cuda::{CudaClient, CudaDevice, CudaRuntime};

/// Create a CPU client and device for testing
pub fn create_cpu_client() -> (CpuClient, CpuDevice) {
    let device = CpuDevice::new();
    let client = CpuRuntime::create_client(&device).unwrap();
    (client, device)
}

/// Create a CUDA client and device, returning None if CUDA is unavailable
#[cfg(feature = "cuda")]
pub fn create_cuda_client() -> Option<(CudaClient, CudaDevice)> {
    let device = CudaRuntime::open_device(0).ok()?;
    let client = CudaRuntime::create_client(&device).ok()?;
    Some((client, device))
}

/// Assert two f64 slices are close within tolerance
///
/// Uses the formula: |a - b| <= atol + rtol * |b|
pub fn assert_allclose_f64(a: &[f64], b: &[f64], rtol: f64, atol: f64, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// Assert two f32 slices are close within tolerance
pub fn assert_allclose_f32(a: &[f32], b: &[f32], rtol: f32, atol: f32, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// `0.0, 1.0, ...` as f32
pub fn arange_f32(n: usize) -> Vec<f32> {
    (0..n).map(|i| i as f32).collect()
}

/// Row-major strides (in elements) of a contiguous `shape`
pub fn contiguous_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; shape.len()];
    for i in (0..shape.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }
    strides
}

/// Positions `lst[start:stop:step]` picks from a list of `len` items
///
/// Walks from the resolved start toward the resolved stop one step at a
/// time. Panics on a zero step.
pub fn python_slice(
    len: usize,
    start: Option<isize>,
    stop: Option<isize>,
    step: Option<isize>,
) -> Vec<usize> {
    let len = len as i64;
    let step = step.unwrap_or(1) as i64;
    assert_ne!(step, 0);

    let resolve = |v: Option<isize>, default: i64| -> i64 {
        match v {
            None => default,
            Some(v) => {
                let v = v as i64;
                let v = if v < 0 { v + len } else { v };
                if step > 0 {
                    v.clamp(0, len)
                } else {
                    v.clamp(-1, len - 1)
                }
            }
        }
    };

    let mut picked = Vec::new();
    if step > 0 {
        let (mut i, end) = (resolve(start, 0), resolve(stop, len));
        while i < end {
            picked.push(i as usize);
            i += step;
        }
    } else {
        let (mut i, end) = (resolve(start, len - 1), resolve(stop, -1));
        while i > end {
            picked.push(i as usize);
            i += step;
        }
    }
    picked
}

/// Positions the normalizer selects for the same slice
pub fn normalized_positions(
    len: usize,
    start: Option<isize>,
    stop: Option<isize>,
    step: Option<isize>,
) -> Vec<usize> {
    let spec = SliceSpec::new(start, stop, step);
    normalize_slice(len, &spec).unwrap().indices().collect()
}

/// Elements of contiguous `data` with `shape` selected by `specs`
///
/// Enumerates the selected source positions per axis and walks their
/// cartesian product without building any view. Returns the result shape
/// and its elements in row-major order.
pub fn reference_index<T: Copy>(
    data: &[T],
    shape: &[usize],
    specs: &[IndexSpec],
) -> (Vec<usize>, Vec<T>) {
    let strides = contiguous_strides(shape);
    // selected source positions, one list per source axis
    let mut picks: Vec<Vec<usize>> = Vec::new();
    let mut out_shape = Vec::new();
    let mut axis = 0;

    for spec in specs {
        match *spec {
            IndexSpec::NewAxis => out_shape.push(1),
            IndexSpec::Integer(i) | IndexSpec::RuntimeScalar(i) => {
                picks.push(vec![normalize_index(shape[axis], i).unwrap()]);
                axis += 1;
            }
            IndexSpec::Slice(s) => {
                let picked = python_slice(shape[axis], s.start, s.stop, s.step);
                out_shape.push(picked.len());
                picks.push(picked);
                axis += 1;
            }
        }
    }
    for &len in &shape[axis..] {
        picks.push((0..len).collect());
        out_shape.push(len);
    }

    let mut out = Vec::new();
    if picks.iter().any(|p| p.is_empty()) {
        return (out_shape, out);
    }

    let mut counters = vec![0usize; picks.len()];
    loop {
        let flat: usize = counters
            .iter()
            .zip(&picks)
            .zip(&strides)
            .map(|((&c, picked), &st)| picked[c] * st)
            .sum();
        out.push(data[flat]);

        let mut k = picks.len();
        loop {
            if k == 0 {
                return (out_shape, out);
            }
            k -= 1;
            counters[k] += 1;
            if counters[k] < picks[k].len() {
                break;
            }
            counters[k] = 0;
        }
    }
}

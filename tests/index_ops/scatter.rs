//! AdvancedIncSubtensor1 tests

use crate::common::{assert_allclose_f32, assert_allclose_f64, create_cpu_client};
use half::f16;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use subtensor::prelude::*;

fn strategies(mode: CombineMode) -> [AdvancedIncSubtensor1; 2] {
    [
        AdvancedIncSubtensor1::new(mode),
        AdvancedIncSubtensor1::new(mode).with_strategy(ScatterStrategy::Sequential),
    ]
}

#[test]
fn test_scatter_accumulate_duplicates() {
    let (client, device) = create_cpu_client();
    let y = Tensor::<CpuRuntime>::from_slice(&[1.0f32, 1.0, 1.0, 1.0], &[2, 2], &device);
    let ilist = Tensor::<CpuRuntime>::from_slice(&[0i64, 0], &[2], &device);

    for op in strategies(CombineMode::Accumulate) {
        let x = Tensor::<CpuRuntime>::zeros(&[3, 2], DType::F32, &device);
        let out = op.perform(&client, &x, &y, &ilist).unwrap();
        assert_eq!(out.to_vec::<f32>(), vec![2.0, 2.0, 0.0, 0.0, 0.0, 0.0]);
    }
}

#[test]
fn test_scatter_set_duplicates_membership() {
    let (client, device) = create_cpu_client();
    let y = Tensor::<CpuRuntime>::from_slice(&[1.0f32, 1.0, 2.0, 2.0], &[2, 2], &device);
    let ilist = Tensor::<CpuRuntime>::from_slice(&[0i64, 0], &[2], &device);

    for op in strategies(CombineMode::Set) {
        let x = Tensor::<CpuRuntime>::zeros(&[3, 2], DType::F32, &device);
        let out = op.perform(&client, &x, &y, &ilist).unwrap().to_vec::<f32>();
        assert!(
            out[..2] == [1.0, 1.0] || out[..2] == [2.0, 2.0],
            "row 0 is neither source row: {:?}",
            &out[..2]
        );
        assert_eq!(&out[2..], &[0.0; 4]);
    }
}

#[test]
fn test_scatter_random_against_reference() {
    let mut rng = StdRng::seed_from_u64(1234);
    let (client, device) = create_cpu_client();

    for _ in 0..40 {
        let rows = rng.random_range(1..12);
        let cols = rng.random_range(1..300);
        let n = rng.random_range(0..40);

        let base: Vec<f64> = (0..rows * cols).map(|_| rng.random_range(-1.0..1.0)).collect();
        let src: Vec<f64> = (0..n * cols).map(|_| rng.random_range(-1.0..1.0)).collect();
        let idx: Vec<i64> = (0..n)
            .map(|_| rng.random_range(-(rows as i64)..rows as i64))
            .collect();

        let mut expected = base.clone();
        for (j, &i) in idx.iter().enumerate() {
            let r = if i < 0 { i + rows as i64 } else { i } as usize;
            for c in 0..cols {
                expected[r * cols + c] += src[j * cols + c];
            }
        }

        let x = Tensor::<CpuRuntime>::from_slice(&base, &[rows, cols], &device);
        let y = Tensor::<CpuRuntime>::from_slice(&src, &[n, cols], &device);
        let ilist = Tensor::<CpuRuntime>::from_slice(&idx, &[n], &device);

        for op in strategies(CombineMode::Accumulate) {
            let out = op.perform(&client, &x, &y, &ilist).unwrap();
            assert_allclose_f64(
                &out.to_vec::<f64>(),
                &expected,
                1e-12,
                1e-12,
                &format!("{:?} rows={rows} cols={cols} n={n}", op.strategy()),
            );
        }
        assert_eq!(x.to_vec::<f64>(), base);
    }
}

#[test]
fn test_scatter_broadcast_row_source() {
    let (client, device) = create_cpu_client();
    let y = Tensor::<CpuRuntime>::from_slice(&[1.0f32, 2.0, 3.0], &[1, 3], &device);
    let ilist = Tensor::<CpuRuntime>::from_slice(&[2u32, 0, 2], &[3], &device);

    for op in strategies(CombineMode::Accumulate) {
        let x = Tensor::<CpuRuntime>::zeros(&[3, 3], DType::F32, &device);
        let out = op.perform(&client, &x, &y, &ilist).unwrap();
        assert_allclose_f32(
            &out.to_vec::<f32>(),
            &[1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 2.0, 4.0, 6.0],
            0.0,
            0.0,
            "broadcast row",
        );
    }
}

#[test]
fn test_scatter_into_strided_destination() {
    let (client, device) = create_cpu_client();
    let y = Tensor::<CpuRuntime>::from_slice(&[1.0f32; 6], &[2, 3], &device);
    let ilist = Tensor::<CpuRuntime>::from_slice(&[0i64, 3], &[2], &device);

    let mut expected = vec![0.0f32; 24];
    for c in [0, 2, 4] {
        expected[c] = 1.0; // view row 3 is base row 0
        expected[18 + c] = 1.0; // view row 0 is base row 3
    }

    for op in strategies(CombineMode::Accumulate) {
        let base = Tensor::<CpuRuntime>::zeros(&[4, 6], DType::F32, &device);
        // Every other column, rows reversed: a non-contiguous [4, 3] destination
        let x = base
            .view_of(&[
                SliceSpec::reversed().into(),
                SliceSpec::new(None, None, Some(2)).into(),
            ])
            .unwrap();
        assert_eq!(x.shape(), &[4, 3]);

        op.inplace(true).perform(&client, &x, &y, &ilist).unwrap();
        assert_eq!(base.to_vec::<f32>(), expected, "{:?}", op.strategy());
    }
}

#[test]
fn test_scatter_inplace_vs_copy() {
    let (client, device) = create_cpu_client();
    let y = Tensor::<CpuRuntime>::from_slice(&[5.0f64, 5.0], &[1, 2], &device);
    let ilist = Tensor::<CpuRuntime>::from_slice(&[1i64], &[1], &device);

    let x = Tensor::<CpuRuntime>::zeros(&[2, 2], DType::F64, &device);
    let out = AdvancedIncSubtensor1::new(CombineMode::Accumulate)
        .perform(&client, &x, &y, &ilist)
        .unwrap();
    assert_eq!(x.to_vec::<f64>(), vec![0.0; 4]);
    assert_eq!(out.to_vec::<f64>(), vec![0.0, 0.0, 5.0, 5.0]);

    let alias = x.clone();
    AdvancedIncSubtensor1::new(CombineMode::Accumulate)
        .inplace(true)
        .perform(&client, &x, &y, &ilist)
        .unwrap();
    assert_eq!(alias.to_vec::<f64>(), vec![0.0, 0.0, 5.0, 5.0]);
}

#[test]
fn test_scatter_half_many_duplicates() {
    let (client, device) = create_cpu_client();
    let n = 1000;
    // Odd width: the last element shares its word with the allocation tail
    let x = Tensor::<CpuRuntime>::zeros(&[2, 3], DType::F16, &device);
    let y = Tensor::<CpuRuntime>::from_slice(&[f16::from_f32(0.25); 3], &[1, 3], &device);
    let ilist = Tensor::<CpuRuntime>::from_slice(&vec![1i32; n], &[n], &device);

    let out = AdvancedIncSubtensor1::new(CombineMode::Accumulate)
        .with_config(IndexingConfig::new().with_sync_after_launch(true))
        .perform(&client, &x, &y, &ilist)
        .unwrap();
    let vals: Vec<f32> = out.to_vec::<f16>().iter().map(|v| v.to_f32()).collect();
    assert_eq!(vals, vec![0.0, 0.0, 0.0, 250.0, 250.0, 250.0]);
}

#[test]
fn test_scatter_set_matrix_rows() {
    let (client, device) = create_cpu_client();
    let x = Tensor::<CpuRuntime>::zeros(&[4, 2], DType::I32, &device);
    let y = Tensor::<CpuRuntime>::from_slice(&[1i32, 2, 3, 4], &[2, 2], &device);
    let ilist = Tensor::<CpuRuntime>::from_slice(&[3i8, -4], &[2], &device);

    let out = AdvancedIncSubtensor1::new(CombineMode::Set)
        .perform(&client, &x, &y, &ilist)
        .unwrap();
    assert_eq!(out.to_vec::<i32>(), vec![3, 4, 0, 0, 0, 0, 1, 2]);
}

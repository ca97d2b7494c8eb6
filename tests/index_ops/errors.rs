//! Error reporting across the indexing operations

use crate::common::create_cpu_client;
use subtensor::prelude::*;

fn matrix(device: &CpuDevice) -> Tensor<CpuRuntime> {
    let data: Vec<f32> = (0..12).map(|i| i as f32).collect();
    Tensor::<CpuRuntime>::from_slice(&data, &[3, 4], device)
}

#[test]
fn test_subtensor_errors() {
    let (_, device) = create_cpu_client();
    let x = matrix(&device);

    let zero_step = Subtensor::new(vec![
        IndexSpec::Integer(0),
        SliceSpec::new(None, None, Some(0)).into(),
    ]);
    assert!(matches!(
        zero_step.perform(&x),
        Err(Error::InvalidSlice { axis: 1, .. })
    ));

    let too_many = Subtensor::new(vec![IndexSpec::Integer(0), IndexSpec::Integer(0), IndexSpec::Integer(0)]);
    assert!(matches!(too_many.perform(&x), Err(Error::Index { .. })));

    let oob = Subtensor::new(vec![IndexSpec::Integer(-4)]);
    assert!(matches!(
        oob.perform(&x),
        Err(Error::IndexOutOfBounds { index: -4, size: 3 })
    ));

    // NewAxis entries do not count against the rank
    let newaxes = Subtensor::new(vec![
        IndexSpec::NewAxis,
        IndexSpec::Integer(0),
        IndexSpec::NewAxis,
        IndexSpec::Integer(0),
    ]);
    assert_eq!(newaxes.perform(&x).unwrap().shape(), &[1, 1]);
}

#[test]
fn test_inc_subtensor_errors() {
    let (client, device) = create_cpu_client();
    let x = matrix(&device);

    let rows = IncSubtensor::new(vec![SliceSpec::range(0, 2).into()], CombineMode::Accumulate);

    // Accumulation does not broadcast
    let row = Tensor::<CpuRuntime>::from_slice(&[1.0f32; 4], &[4], &device);
    assert!(matches!(
        rows.perform(&client, &x, &row),
        Err(Error::ShapeMismatch { .. })
    ));

    // Setting broadcasts, but only compatible shapes
    let bad = Tensor::<CpuRuntime>::from_slice(&[1.0f32; 3], &[3], &device);
    let set_rows = IncSubtensor::new(vec![SliceSpec::range(0, 2).into()], CombineMode::Set);
    assert!(matches!(
        set_rows.perform(&client, &x, &bad),
        Err(Error::BroadcastError { .. })
    ));
    assert!(set_rows.perform(&client, &x, &row).is_ok());

    let other = Tensor::<CpuRuntime>::from_slice(&[1.0f64; 8], &[2, 4], &device);
    assert!(matches!(
        rows.perform(&client, &x, &other),
        Err(Error::DTypeMismatch { .. })
    ));

    // A scalar destination needs exactly one source element
    let elem = IncSubtensor::new(vec![IndexSpec::Integer(1), IndexSpec::Integer(1)], CombineMode::Accumulate);
    let pair = Tensor::<CpuRuntime>::from_slice(&[1.0f32, 2.0], &[2], &device);
    assert!(matches!(
        elem.perform(&client, &x, &pair),
        Err(Error::Dimension { .. })
    ));
}

#[test]
fn test_scatter_validation_order() {
    let (client, device) = create_cpu_client();
    let x = matrix(&device);
    let op = AdvancedIncSubtensor1::new(CombineMode::Accumulate);

    let y64 = Tensor::<CpuRuntime>::from_slice(&[1.0f64; 4], &[1, 4], &device);
    let float_idx = Tensor::<CpuRuntime>::from_slice(&[0.0f32], &[1], &device);
    // dtype mismatch wins over a float index list
    assert!(matches!(
        op.perform(&client, &x, &y64, &float_idx),
        Err(Error::DTypeMismatch { .. })
    ));

    let y = Tensor::<CpuRuntime>::from_slice(&[1.0f32; 4], &[1, 4], &device);
    assert!(matches!(
        op.perform(&client, &x, &y, &float_idx),
        Err(Error::Dimension { .. })
    ));

    let idx_matrix = Tensor::<CpuRuntime>::from_slice(&[0i64, 1], &[1, 2], &device);
    assert!(matches!(
        op.perform(&client, &x, &y, &idx_matrix),
        Err(Error::Dimension { .. })
    ));

    let idx = Tensor::<CpuRuntime>::from_slice(&[0i64], &[1], &device);
    let scalar = Tensor::<CpuRuntime>::from_slice(&[1.0f32], &[], &device);
    assert!(matches!(
        op.perform(&client, &scalar, &scalar, &idx),
        Err(Error::Dimension { .. })
    ));

    let y3 = Tensor::<CpuRuntime>::from_slice(&[1.0f32; 4], &[1, 1, 4], &device);
    assert!(matches!(
        op.perform(&client, &x, &y3, &idx),
        Err(Error::Dimension { .. })
    ));
}

#[test]
fn test_scatter_row_errors_leave_destination_untouched() {
    let (client, device) = create_cpu_client();
    let x = matrix(&device);
    let before = x.to_vec::<f32>();
    let y = Tensor::<CpuRuntime>::from_slice(&[1.0f32; 8], &[2, 4], &device);

    for strategy in [
        ScatterStrategy::Atomic(AtomicScatter::new()),
        ScatterStrategy::Sequential,
    ] {
        let op = AdvancedIncSubtensor1::new(CombineMode::Accumulate)
            .inplace(true)
            .with_strategy(strategy);

        // The bad entry is last: nothing may be applied before it is found
        let oob = Tensor::<CpuRuntime>::from_slice(&[0i64, 3], &[2], &device);
        assert!(matches!(
            op.perform(&client, &x, &y, &oob),
            Err(Error::IndexOutOfBounds { index: 3, size: 3 })
        ));
        let neg = Tensor::<CpuRuntime>::from_slice(&[0i64, -4], &[2], &device);
        assert!(matches!(
            op.perform(&client, &x, &y, &neg),
            Err(Error::IndexOutOfBounds { index: -4, size: 3 })
        ));
        assert_eq!(x.to_vec::<f32>(), before);
    }
}

#[test]
fn test_scatter_huge_unsigned_index_is_out_of_bounds() {
    let (client, device) = create_cpu_client();
    let y = Tensor::<CpuRuntime>::from_slice(&[1.0f32, 1.0], &[1, 2], &device);
    let idx = Tensor::<CpuRuntime>::from_slice(&[u64::MAX], &[1], &device);

    for strategy in [
        ScatterStrategy::Atomic(AtomicScatter::new()),
        ScatterStrategy::Sequential,
    ] {
        let x = Tensor::<CpuRuntime>::zeros(&[3, 2], DType::F32, &device);
        let err = AdvancedIncSubtensor1::new(CombineMode::Accumulate)
            .inplace(true)
            .with_strategy(strategy)
            .perform(&client, &x, &y, &idx)
            .unwrap_err();
        assert!(matches!(err, Error::IndexOutOfBounds { size: 3, .. }));
        assert_eq!(x.to_vec::<f32>(), vec![0.0; 6]);
    }

    // One past i64::MAX also must not wrap to a valid row
    let idx = Tensor::<CpuRuntime>::from_slice(&[1u64 << 63], &[1], &device);
    let x = Tensor::<CpuRuntime>::zeros(&[3, 2], DType::F32, &device);
    assert!(matches!(
        AdvancedIncSubtensor1::new(CombineMode::Set).perform(&client, &x, &y, &idx),
        Err(Error::IndexOutOfBounds { .. })
    ));
}

#[test]
fn test_scatter_row_count_mismatch() {
    let (client, device) = create_cpu_client();
    let x = matrix(&device);
    let y = Tensor::<CpuRuntime>::from_slice(&[1.0f32; 8], &[2, 4], &device);
    let idx = Tensor::<CpuRuntime>::from_slice(&[0i64, 1, 2], &[3], &device);

    // The atomic path declines the mismatch; the sequential path reports it
    let err = AdvancedIncSubtensor1::new(CombineMode::Accumulate)
        .perform(&client, &x, &y, &idx)
        .unwrap_err();
    assert!(matches!(err, Error::Dimension { .. }));
    assert!(!err.is_fallback_eligible());
}

#[test]
fn test_fallback_errors_never_surface() {
    let (client, device) = create_cpu_client();

    // Integer destination: the kernel has no atomic add for it
    let x = Tensor::<CpuRuntime>::zeros(&[2, 2], DType::I32, &device);
    let y = Tensor::<CpuRuntime>::from_slice(&[1i32, 2], &[2], &device);
    let idx = Tensor::<CpuRuntime>::from_slice(&[1i64, 1], &[2], &device);
    let out = AdvancedIncSubtensor1::new(CombineMode::Accumulate)
        .perform(&client, &x, &y, &idx)
        .unwrap();
    assert_eq!(out.to_vec::<i32>(), vec![0, 0, 2, 4]);

    // Rank 3: outside the kernel's geometry
    let x = Tensor::<CpuRuntime>::zeros(&[2, 2, 2], DType::F32, &device);
    let y = Tensor::<CpuRuntime>::from_slice(&[1.0f32; 4], &[2, 2], &device);
    let out = AdvancedIncSubtensor1::new(CombineMode::Accumulate)
        .perform(&client, &x, &y, &idx)
        .unwrap();
    assert_eq!(out.to_vec::<f32>(), vec![0.0, 0.0, 0.0, 0.0, 2.0, 2.0, 2.0, 2.0]);

    // Setting never takes the atomic kernel
    let x = Tensor::<CpuRuntime>::zeros(&[2, 2], DType::F32, &device);
    let y = Tensor::<CpuRuntime>::from_slice(&[3.0f32, 4.0], &[1, 2], &device);
    let out = AdvancedIncSubtensor1::new(CombineMode::Set)
        .with_strategy(ScatterStrategy::Atomic(AtomicScatter::new()))
        .perform(&client, &x, &y, &idx)
        .unwrap();
    assert_eq!(out.to_vec::<f32>(), vec![0.0, 0.0, 3.0, 4.0]);
}

//! IncSubtensor tests

use crate::common::{assert_allclose_f32, create_cpu_client};
use half::f16;
use subtensor::prelude::*;

#[test]
fn test_inc_subtensor_copy_never_mutates_source() {
    let (client, device) = create_cpu_client();
    let original = vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
    let x = Tensor::<CpuRuntime>::from_slice(&original, &[3, 2], &device);
    let y = Tensor::<CpuRuntime>::from_slice(&[10.0f32, 20.0, 30.0, 40.0], &[2, 2], &device);

    for mode in [CombineMode::Set, CombineMode::Accumulate] {
        let op = IncSubtensor::new(vec![SliceSpec::new(None, None, Some(2)).into()], mode);
        let out = op.perform(&client, &x, &y).unwrap();
        assert!(!out.shares_storage(&x));
        assert_eq!(x.to_vec::<f32>(), original, "{mode}");
    }
}

#[test]
fn test_inc_subtensor_inplace_aliases() {
    let (client, device) = create_cpu_client();
    let x = Tensor::<CpuRuntime>::from_slice(&[1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0], &[3, 2], &device);
    let alias = x.clone();
    let y = Tensor::<CpuRuntime>::from_slice(&[10.0f32, 20.0, 30.0, 40.0], &[2, 2], &device);

    let op = IncSubtensor::new(vec![SliceSpec::new(None, None, Some(2)).into()], CombineMode::Accumulate)
        .inplace(true);
    let out = op.perform(&client, &x, &y).unwrap();
    assert!(out.shares_storage(&x));
    assert_allclose_f32(
        &alias.to_vec::<f32>(),
        &[11.0, 22.0, 3.0, 4.0, 35.0, 46.0],
        0.0,
        0.0,
        "in-place accumulate",
    );
}

#[test]
fn test_inc_subtensor_reversed_set() {
    let (client, device) = create_cpu_client();
    let x = Tensor::<CpuRuntime>::zeros(&[5], DType::I16, &device);
    let y = Tensor::<CpuRuntime>::from_slice(&[1i16, 2, 3, 4, 5], &[5], &device);
    let out = IncSubtensor::new(vec![SliceSpec::reversed().into()], CombineMode::Set)
        .perform(&client, &x, &y)
        .unwrap();
    assert_eq!(out.to_vec::<i16>(), vec![5, 4, 3, 2, 1]);
}

#[test]
fn test_inc_subtensor_scalar_accumulate_half() {
    let (client, device) = create_cpu_client();
    let x = Tensor::<CpuRuntime>::from_slice(&[f16::from_f32(0.25); 3], &[3], &device);
    let y = Tensor::<CpuRuntime>::from_slice(&[f16::from_f32(0.5)], &[], &device);

    let op = IncSubtensor::new(vec![IndexSpec::Integer(-1)], CombineMode::Accumulate).inplace(true);
    op.perform(&client, &x, &y).unwrap();
    op.perform(&client, &x, &y).unwrap();
    let vals: Vec<f32> = x.to_vec::<f16>().iter().map(|v| v.to_f32()).collect();
    assert_eq!(vals, vec![0.25, 0.25, 1.25]);
}

#[test]
fn test_inc_subtensor_through_registry_client() {
    let registry = ContextRegistry::<CpuRuntime>::new();
    let client = registry.init(0).unwrap();
    let device = client.device().clone();

    let x = Tensor::<CpuRuntime>::zeros(&[2, 2], DType::F64, &device);
    let y = Tensor::<CpuRuntime>::from_slice(&[3.0f64], &[], &device);
    let out = IncSubtensor::new(vec![IndexSpec::Integer(1), IndexSpec::Integer(0)], CombineMode::Set)
        .perform(&client, &x, &y)
        .unwrap();
    assert_eq!(out.to_vec::<f64>(), vec![0.0, 0.0, 3.0, 0.0]);

    assert!(registry.teardown(0).unwrap());
    // Clients handed out earlier stay usable
    let doubled = IncSubtensor::new(vec![], CombineMode::Accumulate)
        .perform(&client, &out, &out)
        .unwrap();
    assert_eq!(doubled.to_vec::<f64>(), vec![0.0, 0.0, 6.0, 0.0]);
}

#[test]
fn test_inc_subtensor_integer_accumulate_wraps() {
    let (client, device) = create_cpu_client();
    let x = Tensor::<CpuRuntime>::from_slice(&[127i8, 0, -128, 5], &[2, 2], &device);
    let y = Tensor::<CpuRuntime>::from_slice(&[1i8, 1, -1, 1], &[2, 2], &device);

    let out = IncSubtensor::new(vec![], CombineMode::Accumulate)
        .perform(&client, &x, &y)
        .unwrap();
    assert_eq!(out.to_vec::<i8>(), vec![-128, 1, 127, 6]);

    // Scatter of the same rows through the sequential path
    let ilist = Tensor::<CpuRuntime>::from_slice(&[0i64, 1], &[2], &device);
    let out = AdvancedIncSubtensor1::new(CombineMode::Accumulate)
        .perform(&client, &x, &y, &ilist)
        .unwrap();
    assert_eq!(out.to_vec::<i8>(), vec![-128, 1, 127, 6]);
}

//! Subtensor tests

use crate::common::create_cpu_client;
use subtensor::prelude::*;

#[test]
fn test_subtensor_view_reflects_later_writes() {
    let (client, device) = create_cpu_client();
    let x = Tensor::<CpuRuntime>::from_slice(&[0i32; 6], &[2, 3], &device);
    let col = Subtensor::new(vec![SliceSpec::full().into(), IndexSpec::Integer(2)])
        .perform(&x)
        .unwrap();

    let ones = Tensor::<CpuRuntime>::from_slice(&[1i32; 6], &[2, 3], &device);
    client.add_assign(&x, &ones, false).unwrap();
    assert_eq!(col.to_vec::<i32>(), vec![1, 1]);
}

#[test]
fn test_subtensor_runtime_scalar_index() {
    let (_client, device) = create_cpu_client();
    let x = Tensor::<CpuRuntime>::from_slice(&[10i64, 20, 30, 40], &[4], &device);
    let i = Tensor::<CpuRuntime>::from_slice(&[-2i32], &[], &device);

    let op = Subtensor::new(vec![IndexSpec::from_scalar_tensor(&i).unwrap()]);
    let v = op.perform(&x).unwrap();
    assert!(v.is_scalar());
    assert_eq!(v.item::<i64>().unwrap(), 30);
}

#[test]
fn test_subtensor_empty_list_copies() {
    let (_client, device) = create_cpu_client();
    let x = Tensor::<CpuRuntime>::from_slice(&[1.0f64, 2.0], &[2], &device);
    let c = Subtensor::new(vec![]).perform(&x).unwrap();
    assert!(!c.shares_storage(&x));
    assert_eq!(c.to_vec::<f64>(), vec![1.0, 2.0]);
}

#[test]
fn test_subtensor_newaxis_and_negative_step() {
    let (_client, device) = create_cpu_client();
    let x = Tensor::<CpuRuntime>::from_slice(&[0u8, 1, 2, 3, 4, 5], &[2, 3], &device);
    let v = Subtensor::new(vec![
        IndexSpec::NewAxis,
        SliceSpec::reversed().into(),
        SliceSpec::new(Some(-1), Some(0), Some(-1)).into(),
    ])
    .perform(&x)
    .unwrap();
    assert_eq!(v.shape(), &[1, 2, 2]);
    assert_eq!(v.to_vec::<u8>(), vec![5, 4, 2, 1]);
}

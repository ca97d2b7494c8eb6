//! CUDA implementation of tensor operations.

pub mod elementwise;
pub mod scatter;

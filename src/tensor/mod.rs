//! Tensor types
//!
//! This module provides the core `Tensor` type, an n-dimensional view over
//! reference-counted device memory, together with its `Layout` and the
//! `ArrayDescriptor` form handed to code outside this crate.

mod core;
mod descriptor;
mod layout;
mod storage;

pub use core::Tensor;
pub use descriptor::ArrayDescriptor;
pub use layout::{Layout, Shape, Strides, broadcast_shapes};
pub use storage::Storage;

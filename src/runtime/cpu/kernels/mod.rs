//! CPU kernel implementations
//!
//! Low-level host kernels. They are generic over `T: Element` and operate on
//! raw pointers; callers validate shapes and dtypes first.

#![allow(unsafe_op_in_unsafe_fn)] // Kernels are already marked unsafe, inner unsafe is redundant

pub mod atomic;
pub mod elementwise;
pub mod scatter;

pub use atomic::{atomic_add_f16, atomic_add_f32, atomic_add_f64, byte_perm};
pub use elementwise::{assign_bits_kernel, inplace_strided_kernel};
pub use scatter::launch_vector_add_fast;

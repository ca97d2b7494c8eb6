//! DType dispatch utilities
//!
//! This module provides the `dispatch_dtype!` and `dispatch_int_dtype!`
//! macros for runtime type dispatch. Backends use them to convert from the
//! `DType` enum to a concrete element type before calling a typed kernel.
//!
//! # Usage
//!
//! ```ignore
//! fn my_operation(dtype: DType) -> Result<()> {
//!     dispatch_dtype!(dtype, T => {
//!         // T is now a concrete type (f32, f64, i32, etc.)
//!         let size = std::mem::size_of::<T>();
//!         Ok(())
//!     }, "my_operation")
//! }
//! ```
//!
//! ## Supported Types
//!
//! - `F64` -> `f64`, `F32` -> `f32`
//! - `F16` -> `half::f16`, `BF16` -> `half::bf16`
//! - `I64`..`I8` -> `i64`..`i8`, `U64`..`U8` -> `u64`..`u8`
//! - `Bool` -> Returns `UnsupportedDType` error

/// Macro for runtime dtype dispatch to typed operations.
///
/// Executes `$body` with `$T` bound to the Rust type of `$dtype`. The body
/// must evaluate to a `Result`; `Bool` short-circuits with `UnsupportedDType`.
#[macro_export]
macro_rules! dispatch_dtype {
    ($dtype:expr, $T:ident => $body:block, $error_op:expr) => {
        match $dtype {
            $crate::dtype::DType::F64 => {
                type $T = f64;
                $body
            }
            $crate::dtype::DType::F32 => {
                type $T = f32;
                $body
            }
            $crate::dtype::DType::F16 => {
                type $T = half::f16;
                $body
            }
            $crate::dtype::DType::BF16 => {
                type $T = half::bf16;
                $body
            }
            other => $crate::dispatch_int_dtype!(other, $T => $body, $error_op),
        }
    };
}

/// Macro for runtime dispatch over the integer dtypes only.
///
/// Used where a tensor must hold row indices. Any non-integer dtype yields
/// `UnsupportedDType`.
#[macro_export]
macro_rules! dispatch_int_dtype {
    ($dtype:expr, $T:ident => $body:block, $error_op:expr) => {
        match $dtype {
            $crate::dtype::DType::I64 => {
                type $T = i64;
                $body
            }
            $crate::dtype::DType::I32 => {
                type $T = i32;
                $body
            }
            $crate::dtype::DType::I16 => {
                type $T = i16;
                $body
            }
            $crate::dtype::DType::I8 => {
                type $T = i8;
                $body
            }
            $crate::dtype::DType::U64 => {
                type $T = u64;
                $body
            }
            $crate::dtype::DType::U32 => {
                type $T = u32;
                $body
            }
            $crate::dtype::DType::U16 => {
                type $T = u16;
                $body
            }
            $crate::dtype::DType::U8 => {
                type $T = u8;
                $body
            }
            other => Err($crate::error::Error::UnsupportedDType {
                dtype: other,
                op: $error_op,
            }),
        }
    };
}

//! Element trait for mapping Rust types to DType

use super::DType;
use bytemuck::{Pod, Zeroable};

/// Trait for types that can be elements of a tensor
///
/// This trait connects Rust's type system to the runtime dtype system.
/// It is implemented for the primitive numeric types and for `half::f16`
/// and `half::bf16`.
///
/// `bool` does not implement `Pod`; boolean tensors are stored as `u8`.
pub trait Element: Copy + Send + Sync + Pod + Zeroable + 'static {
    /// The corresponding DType for this Rust type
    const DTYPE: DType;

    /// Addition as the accumulate kernels apply it
    ///
    /// Integers wrap on overflow; floats follow IEEE rounding.
    fn accumulate(self, other: Self) -> Self;

    /// Convert to i64, truncating floating point values
    ///
    /// Used to read row indices on the host. `None` for values that do not
    /// fit, which only happens for `u64` above `i64::MAX`.
    fn to_i64(self) -> Option<i64>;
}

macro_rules! impl_element_int {
    ($($t:ty => $dtype:ident),* $(,)?) => {
        $(
            impl Element for $t {
                const DTYPE: DType = DType::$dtype;

                #[inline]
                fn accumulate(self, other: Self) -> Self {
                    self.wrapping_add(other)
                }

                #[inline]
                fn to_i64(self) -> Option<i64> {
                    i64::try_from(self).ok()
                }
            }
        )*
    };
}

impl_element_int!(
    i64 => I64,
    i32 => I32,
    i16 => I16,
    i8 => I8,
    u64 => U64,
    u32 => U32,
    u16 => U16,
    u8 => U8,
);

macro_rules! impl_element_float {
    ($($t:ty => $dtype:ident, $to_f32:expr),* $(,)?) => {
        $(
            impl Element for $t {
                const DTYPE: DType = DType::$dtype;

                #[inline]
                fn accumulate(self, other: Self) -> Self {
                    self + other
                }

                #[inline]
                fn to_i64(self) -> Option<i64> {
                    Some(($to_f32)(self) as i64)
                }
            }
        )*
    };
}

impl_element_float!(
    f64 => F64, |v: f64| v,
    f32 => F32, |v: f32| v,
);

// ============================================================================
// Half-precision floating point types
// ============================================================================

impl_element_float!(
    half::f16 => F16, half::f16::to_f32,
    half::bf16 => BF16, half::bf16::to_f32,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_dtype() {
        assert_eq!(f64::DTYPE, DType::F64);
        assert_eq!(f32::DTYPE, DType::F32);
        assert_eq!(half::f16::DTYPE, DType::F16);
        assert_eq!(i32::DTYPE, DType::I32);
        assert_eq!(u8::DTYPE, DType::U8);
    }

    #[test]
    fn test_accumulate_wraps_integers() {
        assert_eq!(127i8.accumulate(1), -128);
        assert_eq!(255u8.accumulate(2), 1);
        assert_eq!(i64::MAX.accumulate(1), i64::MIN);
        assert_eq!(1.5f32.accumulate(0.25), 1.75);
        assert_eq!(
            half::f16::from_f32(1.5).accumulate(half::f16::from_f32(0.5)),
            half::f16::from_f32(2.0)
        );
    }

    #[test]
    fn test_to_i64() {
        assert_eq!((-3i8).to_i64(), Some(-3));
        assert_eq!(u32::MAX.to_i64(), Some(u32::MAX as i64));
        assert_eq!((i64::MAX as u64).to_i64(), Some(i64::MAX));
        assert_eq!((i64::MAX as u64 + 1).to_i64(), None);
        assert_eq!(u64::MAX.to_i64(), None);
        assert_eq!(2.9f64.to_i64(), Some(2));
    }
}

//! Element type names used in generated kernel source

use crate::dtype::DType;
use crate::error::{Error, Result};

/// Mapping from [`DType`] to the C type name used inside generated kernels
///
/// Templates never spell concrete C types themselves; they ask the table.
/// Swapping the table (for a different compiler or naming convention)
/// changes every emitted kernel without touching the templates.
pub trait CTypeTable: Send + Sync {
    /// C type name for elements of `dtype`
    fn ctype(&self, dtype: DType) -> Result<&'static str>;

    /// Unsigned integer type name for the `size` kernel parameter kind
    fn size_type(&self) -> &'static str;

    /// Signed integer type name for the `ssize` kernel parameter kind
    fn ssize_type(&self) -> &'static str;

    /// Source text placed before every kernel (typedefs and macros)
    fn preamble(&self) -> String;
}

/// The `ga_*` naming used by the generated CUDA kernels
///
/// Compiles under NVRTC without any system headers: every type is a typedef
/// of a builtin C type. 2-byte floats travel as raw `unsigned short` bits and
/// are converted to `float` with inline PTX where arithmetic is needed.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultCTypes;

impl CTypeTable for DefaultCTypes {
    fn ctype(&self, dtype: DType) -> Result<&'static str> {
        Ok(match dtype {
            DType::F64 => "ga_double",
            DType::F32 => "ga_float",
            DType::F16 => "ga_half",
            DType::BF16 => "ga_bfloat",
            DType::I64 => "ga_long",
            DType::I32 => "ga_int",
            DType::I16 => "ga_short",
            DType::I8 => "ga_byte",
            DType::U64 => "ga_ulong",
            DType::U32 => "ga_uint",
            DType::U16 => "ga_ushort",
            DType::U8 => "ga_ubyte",
            DType::Bool => "ga_bool",
            #[allow(unreachable_patterns)]
            other => return Err(Error::unsupported_dtype(other, "ctype")),
        })
    }

    fn size_type(&self) -> &'static str {
        "ga_size"
    }

    fn ssize_type(&self) -> &'static str {
        "ga_ssize"
    }

    fn preamble(&self) -> String {
        String::from(
            r#"typedef unsigned long long ga_size;
typedef long long ga_ssize;
typedef signed char ga_byte;
typedef unsigned char ga_ubyte;
typedef unsigned char ga_bool;
typedef short ga_short;
typedef unsigned short ga_ushort;
typedef int ga_int;
typedef unsigned int ga_uint;
typedef long long ga_long;
typedef unsigned long long ga_ulong;
typedef float ga_float;
typedef double ga_double;
typedef unsigned short ga_half;
typedef unsigned short ga_bfloat;

#define KERNEL extern "C" __global__
#define GLOBAL_MEM
#define GID_0 blockIdx.x
#define GDIM_0 gridDim.x
#define LID_0 threadIdx.x
#define LDIM_0 blockDim.x

__device__ __forceinline__ float ga_half2float(ga_half h) {
  float f;
  asm("{ cvt.f32.f16 %0, %1; }\n" : "=f"(f) : "h"(h));
  return f;
}

__device__ __forceinline__ ga_half ga_float2half(float f) {
  ga_half h;
  asm("{ cvt.rn.f16.f32 %0, %1; }\n" : "=h"(h) : "f"(f));
  return h;
}

__device__ __forceinline__ float ga_bfloat2float(ga_bfloat b) {
  return __uint_as_float(((unsigned int)b) << 16);
}

__device__ __forceinline__ ga_bfloat ga_float2bfloat(float f) {
  unsigned int u = __float_as_uint(f);
  if ((u & 0x7f800000u) == 0x7f800000u && (u & 0x007fffffu) != 0u) {
    return (ga_bfloat)((u >> 16) | 0x0040u);
  }
  u += 0x7fffu + ((u >> 16) & 1u);
  return (ga_bfloat)(u >> 16);
}
"#,
        )
    }
}

/// Expression adding two values of `dtype` in kernel source
///
/// 2-byte floats are widened to `float`, summed, and rounded back.
pub(crate) fn add_expr(dtype: DType, a: &str, b: &str) -> Result<String> {
    match dtype {
        DType::F16 => Ok(format!(
            "ga_float2half(ga_half2float({a}) + ga_half2float({b}))"
        )),
        DType::BF16 => Ok(format!(
            "ga_float2bfloat(ga_bfloat2float({a}) + ga_bfloat2float({b}))"
        )),
        DType::Bool => Err(Error::unsupported_dtype(dtype, "add")),
        _ => Ok(format!("{a} + {b}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_names() {
        let table = DefaultCTypes;
        assert_eq!(table.ctype(DType::F32).unwrap(), "ga_float");
        assert_eq!(table.ctype(DType::F16).unwrap(), "ga_half");
        assert_eq!(table.ctype(DType::I64).unwrap(), "ga_long");
        assert_eq!(table.ctype(DType::U8).unwrap(), "ga_ubyte");
    }

    #[test]
    fn test_preamble_defines_every_type() {
        let table = DefaultCTypes;
        let preamble = table.preamble();
        for dtype in [
            DType::F64,
            DType::F32,
            DType::F16,
            DType::BF16,
            DType::I64,
            DType::I32,
            DType::I16,
            DType::I8,
            DType::U64,
            DType::U32,
            DType::U16,
            DType::U8,
            DType::Bool,
        ] {
            let name = table.ctype(dtype).unwrap();
            assert!(
                preamble.contains(&format!(" {name};")),
                "missing typedef for {name}"
            );
        }
    }

    #[test]
    fn test_add_expr() {
        assert_eq!(add_expr(DType::F32, "a", "b").unwrap(), "a + b");
        assert!(
            add_expr(DType::F16, "a", "b")
                .unwrap()
                .starts_with("ga_float2half(")
        );
        assert!(add_expr(DType::Bool, "a", "b").is_err());
    }
}

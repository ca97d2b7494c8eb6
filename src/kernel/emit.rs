//! Kernel emitters
//!
//! An emitter is a small value describing one kernel configuration. It is
//! built on demand from an operation's immutable settings and the operand
//! dtypes, turned into source through [`KernelBuilder`], and keyed into the
//! [`KernelCache`](super::KernelCache) by its [`KernelKey`].

use super::builder::{KernelBuilder, KernelFlags, KernelLaunchDescriptor, KernelParam};
use super::cache::KernelKey;
use super::ctype::{CTypeTable, DefaultCTypes, add_expr};
use crate::dtype::{DType, DTypeSet};
use crate::error::{Error, Result};

/// Capability of producing device kernels for a fixed configuration
pub trait KernelEmitting {
    /// Cache key identifying the emitted kernels
    fn kernel_key(&self) -> KernelKey;

    /// Emit the kernels using `ctypes` for element type names
    fn kernels_with(&self, ctypes: &dyn CTypeTable) -> Result<Vec<KernelLaunchDescriptor>>;

    /// Emit the kernels with the default `ga_*` type table
    fn kernels(&self) -> Result<Vec<KernelLaunchDescriptor>> {
        self.kernels_with(&DefaultCTypes)
    }
}

// ============================================================================
// Atomic scatter-accumulate
// ============================================================================

/// Entry point name of the atomic scatter kernel
pub const VECTOR_ADD_FAST: &str = "k_vector_add_fast";

/// CAS emulation of a 2-byte float atomic add on the containing 4-byte word.
///
/// May read and write the 2 bytes past the end of an array with an odd
/// number of elements; their value is written back unchanged.
const HALF_ATOMIC_ADD: &str = r#"
__device__ ga_half ga_atomic_add_half(ga_half *addr, ga_half val) {
  ga_uint *base = (ga_uint *)((ga_size)addr & ~(ga_size)3);
  ga_uint old, assumed, sum, new_;
  old = *base;
  do {
    assumed = old;
    sum = ga_float2half(
      ga_half2float(val) +
      ga_half2float((ga_half)__byte_perm(old, 0,
                    ((ga_size)addr & 2) ? 0x4432 : 0x4410)));
    new_ = __byte_perm(old, sum, ((ga_size)addr & 2) ? 0x5410 : 0x3254);
    old = atomicCAS(base, assumed, new_);
  } while (assumed != old);
  return (ga_half)__byte_perm(old, 0, ((ga_size)addr & 2) ? 0x4432 : 0x4410);
}
"#;

/// Double atomic add; native from sm_60, CAS on the bit pattern before that.
const DOUBLE_ATOMIC_ADD: &str = r#"
__device__ ga_double ga_atomic_add_double(ga_double *addr, ga_double val) {
#if __CUDA_ARCH__ >= 600
  return atomicAdd(addr, val);
#else
  unsigned long long *base = (unsigned long long *)addr;
  unsigned long long old = *base, assumed;
  do {
    assumed = old;
    old = atomicCAS(base, assumed,
                    __double_as_longlong(val + __longlong_as_double(assumed)));
  } while (assumed != old);
  return __longlong_as_double(old);
#endif
}
"#;

/// Emitter for `k_vector_add_fast`
///
/// `X[indices[i], j] += Y[i, j]` over a rank-2 destination, with blocks
/// striding over index entries and threads striding over columns. A
/// broadcast source is expressed through zero strides, so `Y` is always
/// addressed with row `i`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VectorAddFast {
    /// Destination element type
    pub dtype_x: DType,
    /// Source element type
    pub dtype_y: DType,
    /// Index element type, passed to the kernel unconverted
    pub dtype_ind: DType,
}

impl VectorAddFast {
    /// Emitter for the given operand dtypes
    pub fn new(dtype_x: DType, dtype_y: DType, dtype_ind: DType) -> Self {
        Self {
            dtype_x,
            dtype_y,
            dtype_ind,
        }
    }

    /// Check the dtypes this kernel can be emitted for
    pub fn validate(&self) -> Result<()> {
        if !DTypeSet::ATOMIC_ADD.contains(self.dtype_x) {
            return Err(Error::unsupported_dtype(self.dtype_x, VECTOR_ADD_FAST));
        }
        if self.dtype_y != self.dtype_x {
            return Err(Error::DTypeMismatch {
                lhs: self.dtype_x,
                rhs: self.dtype_y,
            });
        }
        if !self.dtype_ind.is_int() {
            return Err(Error::unsupported_dtype(self.dtype_ind, VECTOR_ADD_FAST));
        }
        Ok(())
    }

    fn atomic_add_fn(&self) -> &'static str {
        match self.dtype_x {
            DType::F16 => "ga_atomic_add_half",
            DType::F64 => "ga_atomic_add_double",
            _ => "atomicAdd",
        }
    }
}

impl KernelEmitting for VectorAddFast {
    fn kernel_key(&self) -> KernelKey {
        KernelKey::VectorAddFast {
            dtype_x: self.dtype_x,
            dtype_y: self.dtype_y,
            dtype_ind: self.dtype_ind,
        }
    }

    fn kernels_with(&self, ctypes: &dyn CTypeTable) -> Result<Vec<KernelLaunchDescriptor>> {
        self.validate()?;

        let type_x = ctypes.ctype(self.dtype_x)?;
        let type_y = ctypes.ctype(self.dtype_y)?;
        let type_ind = ctypes.ctype(self.dtype_ind)?;

        let body = format!(
            r#"  X = (GLOBAL_MEM {type_x} *)(((GLOBAL_MEM char *)X) + offset_X);
  Y = (GLOBAL_MEM const {type_y} *)(((GLOBAL_MEM const char *)Y) + offset_Y);
  indices_arr = (GLOBAL_MEM const {type_ind} *)(((GLOBAL_MEM const char *)indices_arr) + offset_indices_arr);
  for (ga_size i = GID_0; i < numIndices; i += GDIM_0) {{
    for (ga_size j = LID_0; j < numColsX; j += LDIM_0) {{
      ga_ssize x_row = (ga_ssize)indices_arr[(ga_ssize)i * stridesIndices];
      if (x_row < 0)
        x_row += (ga_ssize)numRowsX;
      ga_ssize y_row = (ga_ssize)i;
      {atomic}(&X[(x_row * stridesX0) + ((ga_ssize)j * stridesX1)],
               Y[(y_row * stridesY0) + ((ga_ssize)j * stridesY1)]);
    }}
  }}"#,
            atomic = self.atomic_add_fn(),
        );

        let mut builder = KernelBuilder::new(VECTOR_ADD_FAST, ctypes)
            .params([
                KernelParam::size("numRowsX"),
                KernelParam::size("numColsX"),
                KernelParam::ssize("stridesX0"),
                KernelParam::ssize("stridesX1"),
                KernelParam::buffer("X", self.dtype_x),
                KernelParam::size("offset_X"),
                KernelParam::size("numRowsY"),
                KernelParam::size("numColsY"),
                KernelParam::ssize("stridesY0"),
                KernelParam::ssize("stridesY1"),
                KernelParam::const_buffer("Y", self.dtype_y),
                KernelParam::size("offset_Y"),
                KernelParam::size("numIndices"),
                KernelParam::ssize("stridesIndices"),
                KernelParam::const_buffer("indices_arr", self.dtype_ind),
                KernelParam::size("offset_indices_arr"),
            ])
            .flags(KernelFlags::from_dtypes(&[
                self.dtype_x,
                self.dtype_y,
                self.dtype_ind,
            ]))
            .body(body);

        builder = match self.dtype_x {
            DType::F16 => builder.helper(HALF_ATOMIC_ADD),
            DType::F64 => builder.helper(DOUBLE_ATOMIC_ADD),
            _ => builder,
        };

        Ok(vec![builder.build()?])
    }
}

// ============================================================================
// Strided in-place elementwise
// ============================================================================

/// Update applied by an [`InplaceElemwise`] kernel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InplaceOp {
    /// `dst += src`
    Add,
    /// `dst = src`
    Assign,
}

impl InplaceOp {
    fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Assign => "assign",
        }
    }
}

/// Emitter for `dst op= src` over two strided views of the same shape
///
/// One kernel per `(op, dtype, ndim)`. Each thread decomposes a flat
/// row-major position into per-axis coordinates and addresses both operands
/// through their own strides, so broadcast (zero-stride) sources work as is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InplaceElemwise {
    /// Update to apply
    pub op: InplaceOp,
    /// Element type of both operands
    pub dtype: DType,
    /// Rank of the iteration space
    pub ndim: usize,
}

impl InplaceElemwise {
    /// Emitter for the given configuration
    pub fn new(op: InplaceOp, dtype: DType, ndim: usize) -> Self {
        Self { op, dtype, ndim }
    }

    /// Entry point name
    pub fn entry_name(&self) -> String {
        format!(
            "k_inplace_{}_{}_{}",
            self.op.name(),
            self.dtype.short_name(),
            self.ndim
        )
    }
}

impl KernelEmitting for InplaceElemwise {
    fn kernel_key(&self) -> KernelKey {
        KernelKey::InplaceElemwise {
            op: self.op,
            dtype: self.dtype,
            ndim: self.ndim,
        }
    }

    fn kernels_with(&self, ctypes: &dyn CTypeTable) -> Result<Vec<KernelLaunchDescriptor>> {
        let ctype = ctypes.ctype(self.dtype)?;
        let update = match self.op {
            InplaceOp::Add => add_expr(self.dtype, "dst[d]", "src[s]")?,
            InplaceOp::Assign => String::from("src[s]"),
        };

        let nd = self.ndim;
        let mut params = vec![KernelParam::size("n")];
        params.extend((0..nd).map(|k| KernelParam::size(format!("dim{k}"))));
        params.extend((0..nd).map(|k| KernelParam::ssize(format!("dst_s{k}"))));
        params.push(KernelParam::buffer("dst", self.dtype));
        params.push(KernelParam::size("dst_off"));
        params.extend((0..nd).map(|k| KernelParam::ssize(format!("src_s{k}"))));
        params.push(KernelParam::const_buffer("src", self.dtype));
        params.push(KernelParam::size("src_off"));

        let unravel: String = (0..nd)
            .rev()
            .map(|k| {
                format!(
                    r#"    {{
      ga_ssize p = (ga_ssize)(rem % dim{k});
      rem /= dim{k};
      d += p * dst_s{k};
      s += p * src_s{k};
    }}
"#
                )
            })
            .collect();
        let body = format!(
            r#"  dst = (GLOBAL_MEM {ctype} *)(((GLOBAL_MEM char *)dst) + dst_off);
  src = (GLOBAL_MEM const {ctype} *)(((GLOBAL_MEM const char *)src) + src_off);
  for (ga_size i = GID_0 * LDIM_0 + LID_0; i < n; i += LDIM_0 * GDIM_0) {{
    ga_size rem = i;
    ga_ssize d = 0, s = 0;
{unravel}    dst[d] = {update};
  }}"#
        );

        let desc = KernelBuilder::new(self.entry_name(), ctypes)
            .params(params)
            .flags(KernelFlags::from_dtypes(&[self.dtype]))
            .body(body)
            .build()?;
        Ok(vec![desc])
    }
}

//! Kernel source builder and launch descriptors
//!
//! A [`KernelBuilder`] turns a parameter list, a set of device helpers and a
//! body into complete kernel source. The same parameter list travels with the
//! source in the resulting [`KernelLaunchDescriptor`], so launchers can check
//! the arguments they push against what the kernel declares.

use super::ctype::CTypeTable;
use crate::dtype::{DType, DTypeSet};
use crate::error::{Error, Result};
use std::fmt::{self, Write as _};
use std::ops::BitOr;

// ============================================================================
// Parameters
// ============================================================================

/// Kind of a kernel parameter
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KernelParamType {
    /// Unsigned 64-bit extent or byte offset
    Size,
    /// Signed 64-bit stride
    SSize,
    /// Device buffer pointer
    Buffer,
}

/// One declared kernel parameter
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KernelParam {
    /// Parameter name in the kernel signature
    pub name: String,
    /// Parameter kind
    pub ty: KernelParamType,
    /// Element type for buffers
    pub elem: Option<DType>,
    /// Whether a buffer is only read
    pub read_only: bool,
}

impl KernelParam {
    /// Unsigned size parameter
    pub fn size(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: KernelParamType::Size,
            elem: None,
            read_only: true,
        }
    }

    /// Signed stride parameter
    pub fn ssize(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: KernelParamType::SSize,
            elem: None,
            read_only: true,
        }
    }

    /// Writable buffer of `elem`
    pub fn buffer(name: impl Into<String>, elem: DType) -> Self {
        Self {
            name: name.into(),
            ty: KernelParamType::Buffer,
            elem: Some(elem),
            read_only: false,
        }
    }

    /// Read-only buffer of `elem`
    pub fn const_buffer(name: impl Into<String>, elem: DType) -> Self {
        Self {
            read_only: true,
            ..Self::buffer(name, elem)
        }
    }

    fn render(&self, ctypes: &dyn CTypeTable) -> Result<String> {
        Ok(match self.ty {
            KernelParamType::Size => format!("const {} {}", ctypes.size_type(), self.name),
            KernelParamType::SSize => format!("const {} {}", ctypes.ssize_type(), self.name),
            KernelParamType::Buffer => {
                let elem = self.elem.ok_or_else(|| {
                    Error::Internal(format!("buffer parameter '{}' has no dtype", self.name))
                })?;
                let qualifier = if self.read_only { "const " } else { "" };
                format!(
                    "GLOBAL_MEM {}{} *{}",
                    qualifier,
                    ctypes.ctype(elem)?,
                    self.name
                )
            }
        })
    }
}

/// Concrete value for one kernel parameter
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KernelArg {
    /// Value for a `Size` parameter
    Size(u64),
    /// Value for an `SSize` parameter
    SSize(i64),
    /// Device pointer for a `Buffer` parameter
    Buffer(u64),
}

impl KernelArg {
    /// Parameter kind this value fills
    pub fn param_type(&self) -> KernelParamType {
        match self {
            Self::Size(_) => KernelParamType::Size,
            Self::SSize(_) => KernelParamType::SSize,
            Self::Buffer(_) => KernelParamType::Buffer,
        }
    }
}

// ============================================================================
// Flags and launch geometry
// ============================================================================

/// Compiler feature flags a kernel needs
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct KernelFlags {
    bits: u8,
}

impl KernelFlags {
    /// No special requirements
    pub const NONE: Self = Self { bits: 0 };
    /// Uses 8-byte floats
    pub const USE_DOUBLE: Self = Self { bits: 1 << 0 };
    /// Uses 2-byte floats
    pub const USE_HALF: Self = Self { bits: 1 << 1 };
    /// Uses 1- or 2-byte integers
    pub const USE_SMALL: Self = Self { bits: 1 << 2 };
    /// Uses complex numbers (no dtype sets this yet)
    pub const USE_COMPLEX: Self = Self { bits: 1 << 3 };

    /// Flags required by the element types a kernel touches
    pub fn from_dtypes(dtypes: &[DType]) -> Self {
        dtypes.iter().fold(Self::NONE, |flags, &dtype| {
            flags
                | match dtype {
                    DType::F64 => Self::USE_DOUBLE,
                    DType::F16 | DType::BF16 => Self::USE_HALF,
                    d if DTypeSet::SUB_WORD.contains(d) => Self::USE_SMALL,
                    _ => Self::NONE,
                }
        })
    }

    /// Whether every flag in `other` is set
    pub const fn contains(self, other: Self) -> bool {
        self.bits & other.bits == other.bits
    }

    /// Raw bit representation
    pub const fn bits(self) -> u8 {
        self.bits
    }
}

impl BitOr for KernelFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            bits: self.bits | rhs.bits,
        }
    }
}

impl fmt::Debug for KernelFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (Self::USE_DOUBLE, "USE_DOUBLE"),
            (Self::USE_HALF, "USE_HALF"),
            (Self::USE_SMALL, "USE_SMALL"),
            (Self::USE_COMPLEX, "USE_COMPLEX"),
        ];
        let set: Vec<&str> = names
            .iter()
            .filter(|(flag, _)| self.contains(*flag) && flag.bits != 0)
            .map(|(_, name)| *name)
            .collect();
        write!(f, "KernelFlags({})", set.join(" | "))
    }
}

/// Three-dimensional launch extent
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LaunchDims {
    /// Extent along x
    pub x: u32,
    /// Extent along y
    pub y: u32,
    /// Extent along z
    pub z: u32,
}

impl LaunchDims {
    /// One-dimensional extent
    pub const fn linear(x: u32) -> Self {
        Self { x, y: 1, z: 1 }
    }

    /// Total number of units
    pub const fn count(&self) -> u64 {
        self.x as u64 * self.y as u64 * self.z as u64
    }

    /// As a `(x, y, z)` tuple
    pub const fn as_tuple(&self) -> (u32, u32, u32) {
        (self.x, self.y, self.z)
    }
}

impl Default for LaunchDims {
    fn default() -> Self {
        Self::linear(1)
    }
}

// ============================================================================
// Descriptor
// ============================================================================

/// Kernel source plus everything needed to launch it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KernelLaunchDescriptor {
    /// Complete source text, preamble included
    pub source: String,
    /// Name of the `extern "C"` entry point
    pub entry_name: String,
    /// Declared parameters, in order
    pub params: Vec<KernelParam>,
    /// Compiler feature flags
    pub flags: KernelFlags,
    /// Threads per block
    pub block_dims: LaunchDims,
    /// Blocks per grid
    pub grid_dims: LaunchDims,
}

impl KernelLaunchDescriptor {
    /// Same kernel with a concrete launch geometry
    pub fn with_launch(mut self, grid_dims: LaunchDims, block_dims: LaunchDims) -> Self {
        self.grid_dims = grid_dims;
        self.block_dims = block_dims;
        self
    }

    /// Parameter kinds, in order
    pub fn param_types(&self) -> Vec<KernelParamType> {
        self.params.iter().map(|p| p.ty).collect()
    }

    /// Check that `args` fill the declared parameters one-to-one
    pub fn check_args(&self, args: &[KernelArg]) -> Result<()> {
        if args.len() != self.params.len() {
            return Err(Error::kernel(
                &self.entry_name,
                format!(
                    "expected {} arguments, got {}",
                    self.params.len(),
                    args.len()
                ),
            ));
        }
        for (param, arg) in self.params.iter().zip(args) {
            if param.ty != arg.param_type() {
                return Err(Error::kernel(
                    &self.entry_name,
                    format!(
                        "argument '{}' expects {:?}, got {:?}",
                        param.name, param.ty, arg
                    ),
                ));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Assembles kernel source from typed pieces
pub struct KernelBuilder<'a> {
    entry_name: String,
    ctypes: &'a dyn CTypeTable,
    params: Vec<KernelParam>,
    helpers: Vec<String>,
    body: String,
    flags: KernelFlags,
}

impl<'a> KernelBuilder<'a> {
    /// Start a kernel named `entry_name` using `ctypes` for type names
    pub fn new(entry_name: impl Into<String>, ctypes: &'a dyn CTypeTable) -> Self {
        Self {
            entry_name: entry_name.into(),
            ctypes,
            params: Vec::new(),
            helpers: Vec::new(),
            body: String::new(),
            flags: KernelFlags::NONE,
        }
    }

    /// Append a parameter
    pub fn param(mut self, param: KernelParam) -> Self {
        self.params.push(param);
        self
    }

    /// Append several parameters
    pub fn params(mut self, params: impl IntoIterator<Item = KernelParam>) -> Self {
        self.params.extend(params);
        self
    }

    /// Add a device helper emitted ahead of the kernel
    pub fn helper(mut self, code: impl Into<String>) -> Self {
        self.helpers.push(code.into());
        self
    }

    /// Set the kernel body (statements between the braces)
    pub fn body(mut self, code: impl Into<String>) -> Self {
        self.body = code.into();
        self
    }

    /// Add compiler feature flags
    pub fn flags(mut self, flags: KernelFlags) -> Self {
        self.flags = self.flags | flags;
        self
    }

    /// Type name of `dtype` in the builder's table
    pub fn ctype(&self, dtype: DType) -> Result<&'static str> {
        self.ctypes.ctype(dtype)
    }

    /// Render the source and produce a descriptor with a 1x1 launch
    pub fn build(self) -> Result<KernelLaunchDescriptor> {
        let mut source = self.ctypes.preamble();
        source.push('\n');
        for helper in &self.helpers {
            source.push_str(helper);
            source.push('\n');
        }

        let rendered: Vec<String> = self
            .params
            .iter()
            .map(|p| p.render(self.ctypes))
            .collect::<Result<_>>()?;

        // Writing into a String cannot fail
        let _ = write!(
            source,
            "KERNEL void {}(\n    {})\n{{\n{}\n}}\n",
            self.entry_name,
            rendered.join(",\n    "),
            self.body
        );

        Ok(KernelLaunchDescriptor {
            source,
            entry_name: self.entry_name,
            params: self.params,
            flags: self.flags,
            block_dims: LaunchDims::default(),
            grid_dims: LaunchDims::default(),
        })
    }
}

//! Device kernel emission
//!
//! Kernels are produced as source text plus a typed parameter list, never
//! assembled by string substitution at call sites:
//!
//! ```text
//! emitter (VectorAddFast, InplaceElemwise)
//!   └── KernelBuilder ── CTypeTable (dtype -> C type name, swappable)
//!         └── KernelLaunchDescriptor { source, entry_name, params, flags, dims }
//! ```
//!
//! Compiling and launching descriptors is up to the backend. Backends that
//! compile keep the results in a [`KernelCache`] keyed by [`KernelKey`].

mod builder;
mod cache;
mod ctype;
mod emit;
mod scatter;

pub use builder::{
    KernelArg, KernelBuilder, KernelFlags, KernelLaunchDescriptor, KernelParam, KernelParamType,
    LaunchDims,
};
pub use cache::{KernelCache, KernelKey};
pub use ctype::{CTypeTable, DefaultCTypes};
pub use emit::{InplaceElemwise, InplaceOp, KernelEmitting, VECTOR_ADD_FAST, VectorAddFast};
pub use scatter::{AtomicScatterPlan, MAX_BLOCKS, MAX_THREADS_PER_BLOCK, VectorAddFastArgs};

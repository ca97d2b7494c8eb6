//! Backend operations
//!
//! The indexing ops in [`crate::index`] never touch device memory directly.
//! They delegate every element update to traits implemented by each
//! runtime's client:
//!
//! ```text
//! RuntimeClient<R>
//!   ├── implements ElementwiseOps<R>
//!   │     ├── add         (broadcasting, fresh output)
//!   │     ├── add_assign  (in place, optional broadcast)
//!   │     └── assign      (in place, broadcasting)
//!   └── implements AtomicScatterOps<R>
//!         └── scatter_add_atomic (k_vector_add_fast)
//! ```
//!
//! # Implementing Operations for a New Backend
//!
//! 1. Implement [`ElementwiseOps`] for the client. Shape and dtype checks are
//!    shared by every backend:
//!    ```ignore
//!    impl ElementwiseOps<MyRuntime> for MyClient {
//!        fn add_assign(&self, dst: &Tensor<MyRuntime>, src: &Tensor<MyRuntime>, broadcast: bool) -> Result<()> {
//!            let src = inplace_source(dst, src, broadcast)?;
//!            // launch a strided in-place add over dst's layout
//!            Ok(())
//!        }
//!        // ...
//!    }
//!    ```
//! 2. Implement [`AtomicScatterOps`], building an
//!    [`AtomicScatterPlan`](crate::kernel::AtomicScatterPlan) and launching
//!    the kernel it describes.

mod cpu;
#[cfg(feature = "cuda")]
mod cuda;
mod dispatch;
pub(crate) mod common;
pub mod traits;

pub use traits::{AtomicScatterOps, ElementwiseOps};

//! Backend abstraction: a runtime owns memory, a device names where it
//! lives, a client is the handle operations run through

pub mod client;
pub mod device;
pub mod runtime;

pub use client::RuntimeClient;
pub use device::Device;
pub use runtime::Runtime;

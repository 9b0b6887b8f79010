// aclink/src/device/mod.rs

#[cfg(feature = "async")]
pub mod async_endpoint;
pub mod builder;
pub mod endpoint;
pub mod handle;

#[cfg(feature = "async")]
pub use async_endpoint::AsyncModuleEndpoint;
pub use builder::DeviceBuilder;
pub use endpoint::ModuleEndpoint;
pub use handle::Device;

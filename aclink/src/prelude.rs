// aclink/src/prelude.rs

pub use crate::config::LinkConfig;
pub use crate::device::{Device, DeviceBuilder, ModuleEndpoint};
pub use crate::link::LinkStatsSnapshot;
pub use crate::protocol::Frame;
pub use crate::transport::{FrameReader, FrameWriter, MockTransport, StreamTransport, Transport};
pub use crate::{CommandType, Error, ModuleId, Reply, Result, SequenceId};

#[cfg(feature = "async")]
pub use crate::device::AsyncModuleEndpoint;

// Re-export small utilities for convenience
pub use crate::utils::{default_reply_timeout, ms};

// aclink/src/device/builder.rs

use std::time::Duration;

use crate::config::LinkConfig;
use crate::device::handle::Device;
use crate::transport::{FrameReader, FrameWriter, Transport};
use crate::{Error, Result};

/// Helper to construct a Device with optional configuration.
#[derive(Default)]
pub struct DeviceBuilder {
    halves: Option<(Box<dyn FrameReader>, Box<dyn FrameWriter>)>,
    config: LinkConfig,
}

impl DeviceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provide the link (e.g. MockTransport, StreamTransport).
    pub fn with_transport<T: Transport>(mut self, transport: T) -> Self {
        let (reader, writer) = transport.split();
        self.halves = Some((Box::new(reader), Box::new(writer)));
        self
    }

    /// Provide the two halves of the link separately.
    pub fn with_halves(mut self, reader: Box<dyn FrameReader>, writer: Box<dyn FrameWriter>) -> Self {
        self.halves = Some((reader, writer));
        self
    }

    pub fn config(mut self, config: LinkConfig) -> Self {
        self.config = config;
        self
    }

    pub fn reply_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_reply_timeout(timeout);
        self
    }

    /// Start the link. Requires a transport; otherwise returns DeviceNotFound.
    pub fn build(self) -> Result<Device> {
        match self.halves {
            Some((reader, writer)) => Device::new(reader, writer, self.config),
            None => Err(Error::DeviceNotFound),
        }
    }
}

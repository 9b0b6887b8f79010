// aclink/src/device/handle.rs

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, warn};

use crate::config::LinkConfig;
use crate::device::endpoint::ModuleEndpoint;
use crate::link::{EndpointTable, LinkLock, LinkStatsSnapshot, ReceiveDispatcher};
use crate::transport::{FrameReader, FrameWriter, Transport};
use crate::types::ModuleId;
use crate::{Error, Result};

/// The host side of one attached reader: the shared link, its receive
/// dispatcher thread and one endpoint per hardware module.
pub struct Device {
    link: Arc<LinkLock>,
    endpoints: Vec<ModuleEndpoint>,
    dispatcher: Option<JoinHandle<()>>,
}

impl Device {
    /// Start the link over an already split transport.
    pub fn new(
        reader: Box<dyn FrameReader>,
        writer: Box<dyn FrameWriter>,
        config: LinkConfig,
    ) -> Result<Self> {
        let thread_name = config.dispatcher_name.clone();
        let link = Arc::new(LinkLock::new(writer, config));
        let (table, mailboxes) = EndpointTable::new();

        let endpoints = ModuleId::ALL
            .iter()
            .zip(mailboxes)
            .map(|(&id, rx)| ModuleEndpoint::new(id, link.clone(), rx))
            .collect();

        let dispatcher = ReceiveDispatcher::new(link.clone(), reader, table);
        let handle = thread::Builder::new()
            .name(thread_name)
            .spawn(move || dispatcher.run())
            .map_err(|e| Error::Task(format!("failed to spawn dispatcher: {}", e)))?;
        debug!("device link started");

        Ok(Self {
            link,
            endpoints,
            dispatcher: Some(handle),
        })
    }

    /// Split `transport` and start the link over it.
    pub fn with_transport<T: Transport>(transport: T, config: LinkConfig) -> Result<Self> {
        let (reader, writer) = transport.split();
        Self::new(Box::new(reader), Box::new(writer), config)
    }

    /// Endpoint for `module`.
    pub fn endpoint(&self, module: ModuleId) -> &ModuleEndpoint {
        &self.endpoints[module.index()]
    }

    pub fn endpoints(&self) -> &[ModuleEndpoint] {
        &self.endpoints
    }

    pub fn contact_card(&self) -> &ModuleEndpoint {
        self.endpoint(ModuleId::ContactCard)
    }

    pub fn contactless_card(&self) -> &ModuleEndpoint {
        self.endpoint(ModuleId::ContactlessCard)
    }

    pub fn mifare(&self) -> &ModuleEndpoint {
        self.endpoint(ModuleId::Mifare)
    }

    pub fn service_operations(&self) -> &ModuleEndpoint {
        self.endpoint(ModuleId::ServiceOperations)
    }

    pub fn nxp_ntag(&self) -> &ModuleEndpoint {
        self.endpoint(ModuleId::NxpNtag)
    }

    pub fn gui_operations(&self) -> &ModuleEndpoint {
        self.endpoint(ModuleId::GuiOperations)
    }

    pub fn config(&self) -> &LinkConfig {
        self.link.config()
    }

    pub fn stats(&self) -> LinkStatsSnapshot {
        self.link.stats().snapshot()
    }

    pub fn is_closed(&self) -> bool {
        self.link.is_closed()
    }

    /// Close the link and wait for the dispatcher to stop. Blocks until the
    /// transport's pending read returns.
    ///
    /// Transports with a [`FrameWriter::close`] hook (the mock) return at
    /// once. A [`StreamTransport`](crate::transport::StreamTransport) over a
    /// tty has no such hook, so this waits until the device side hangs up,
    /// possibly forever. Drop the `Device` instead in that case: drop closes
    /// the link without joining the dispatcher.
    pub fn shutdown(mut self) -> Result<()> {
        self.link.close();
        match self.dispatcher.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| Error::Task("dispatcher thread panicked".into())),
            None => Ok(()),
        }
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        // Don't join here: a transport without a close hook may keep the
        // dispatcher in its read indefinitely.
        self.link.close();
        if let Some(handle) = self.dispatcher.take() {
            if handle.is_finished() {
                let _ = handle.join();
            } else {
                warn!("dropping device while the dispatcher is still reading");
            }
        }
    }
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("link", &self.link)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

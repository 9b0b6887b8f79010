// aclink/src/device/async_endpoint.rs

#![cfg(feature = "async")]

use std::time::Duration;

use crate::device::endpoint::ModuleEndpoint;
use crate::types::{CommandType, ModuleId, Reply};
use crate::{Error, Result};

/// Async face of a [`ModuleEndpoint`]. Each call runs the blocking exchange
/// on tokio's blocking pool.
#[derive(Debug, Clone)]
pub struct AsyncModuleEndpoint {
    inner: ModuleEndpoint,
}

impl AsyncModuleEndpoint {
    pub fn new(inner: ModuleEndpoint) -> Self {
        Self { inner }
    }

    pub fn module_id(&self) -> ModuleId {
        self.inner.module_id()
    }

    pub async fn send(&self, payload: Vec<u8>, command_type: CommandType) -> Result<Reply> {
        let ep = self.inner.clone();
        tokio::task::spawn_blocking(move || ep.send(&payload, command_type))
            .await
            .map_err(|e| Error::Task(e.to_string()))?
    }

    pub async fn send_with_timeout(
        &self,
        payload: Vec<u8>,
        command_type: CommandType,
        timeout: Duration,
    ) -> Result<Reply> {
        let ep = self.inner.clone();
        tokio::task::spawn_blocking(move || ep.send_with_timeout(&payload, command_type, timeout))
            .await
            .map_err(|e| Error::Task(e.to_string()))?
    }
}

impl From<ModuleEndpoint> for AsyncModuleEndpoint {
    fn from(inner: ModuleEndpoint) -> Self {
        Self::new(inner)
    }
}

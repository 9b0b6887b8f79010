// aclink/src/device/endpoint.rs

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use log::{debug, trace, warn};

use crate::link::{Delivery, ExchangeGuard, ExchangeToken, LinkLock, Outcome};
use crate::protocol::{Frame, payload};
use crate::types::{CommandType, ModuleId, Reply};
use crate::utils::Deadline;
use crate::{Error, Result};

/// Client handle for one hardware subsystem.
///
/// Cloning is cheap; clones share the same mailbox, so calls through any of
/// them run one at a time. Calls on different endpoints are serialized by
/// the link itself.
#[derive(Clone)]
pub struct ModuleEndpoint {
    inner: Arc<EndpointInner>,
}

struct EndpointInner {
    module_id: ModuleId,
    link: Arc<LinkLock>,
    /// Also the per-endpoint "one call at a time" lock.
    mailbox: Mutex<Receiver<Delivery>>,
}

impl ModuleEndpoint {
    pub(crate) fn new(module_id: ModuleId, link: Arc<LinkLock>, mailbox: Receiver<Delivery>) -> Self {
        Self {
            inner: Arc::new(EndpointInner {
                module_id,
                link,
                mailbox: Mutex::new(mailbox),
            }),
        }
    }

    pub fn module_id(&self) -> ModuleId {
        self.inner.module_id
    }

    /// Send `payload` and wait for the correlated reply, using the link's
    /// default reply timeout.
    pub fn send(&self, payload: &[u8], command_type: CommandType) -> Result<Reply> {
        let timeout = self.inner.link.config().reply_timeout();
        self.send_with_timeout(payload, command_type, timeout)
    }

    /// Send a `Command` frame.
    pub fn send_command(&self, payload: &[u8]) -> Result<Reply> {
        self.send(payload, CommandType::Command)
    }

    /// Serialize `body` as JSON and send it as a `Command`.
    #[cfg(feature = "serde")]
    pub fn send_json<T: serde::Serialize + ?Sized>(&self, body: &T) -> Result<Reply> {
        let bytes = serde_json::to_vec(body)?;
        self.send_command(&bytes)
    }

    /// Send with an explicit deadline for the reply.
    ///
    /// The link is released on every exit path, unwinding included; an
    /// exchange that fails or times out never blocks later callers. Timeouts
    /// too large to represent wait until a far-future deadline instead.
    pub fn send_with_timeout(
        &self,
        payload: &[u8],
        command_type: CommandType,
        timeout: Duration,
    ) -> Result<Reply> {
        // Reject oversized payloads before a sequence id is spent on them.
        payload::check_len(payload.len())?;

        let mailbox = self
            .inner
            .mailbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let link = &self.inner.link;

        let exchange = ExchangeGuard::begin(link, self.module_id())?;
        let result = self.run_exchange(&mailbox, exchange.token(), payload, command_type, timeout);
        drop(exchange);

        if let Err(e) = &result {
            debug!("{} exchange failed: {}", self.module_id(), e);
        }
        result
    }

    fn run_exchange(
        &self,
        mailbox: &Receiver<Delivery>,
        token: &ExchangeToken,
        payload: &[u8],
        command_type: CommandType,
        timeout: Duration,
    ) -> Result<Reply> {
        let link = &self.inner.link;
        let sequence_id = link.next_sequence(token)?;
        let bytes = Frame::new(self.module_id(), command_type, sequence_id, payload).encode()?;
        link.transmit(token, &bytes)?;

        let max_extensions = link.config().max_pending_extensions;
        let mut extensions = 0u32;
        let mut deadline = Deadline::after(timeout);
        loop {
            let delivery = match mailbox.recv_timeout(deadline.remaining()) {
                Ok(d) => d,
                Err(RecvTimeoutError::Timeout) => {
                    link.stats().record_timeout();
                    warn!(
                        "{} exchange {} (seq {}) timed out",
                        self.module_id(),
                        token.id(),
                        sequence_id
                    );
                    return Err(Error::Timeout);
                }
                Err(RecvTimeoutError::Disconnected) => return Err(Error::LinkClosed),
            };
            if delivery.exchange != token.id() {
                trace!(
                    "{} discarding late delivery for exchange {}",
                    self.module_id(),
                    delivery.exchange
                );
                continue;
            }
            match delivery.outcome {
                Outcome::Reply(reply) => return Ok(reply),
                Outcome::Failed(e) => return Err(e),
                Outcome::Pending => {
                    if extensions < max_extensions {
                        extensions += 1;
                        deadline.extend(timeout);
                        debug!(
                            "{} exchange {} pending, deadline extended ({}/{})",
                            self.module_id(),
                            token.id(),
                            extensions,
                            max_extensions
                        );
                    }
                }
            }
        }
    }
}

impl std::fmt::Debug for ModuleEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleEndpoint")
            .field("module_id", &self.inner.module_id)
            .finish()
    }
}

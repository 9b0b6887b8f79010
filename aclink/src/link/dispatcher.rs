// aclink/src/link/dispatcher.rs

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};

use log::{debug, error, trace, warn};

use crate::link::exchange::{ExchangeId, LinkLock, Outcome, Routing};
use crate::protocol::Frame;
use crate::transport::FrameReader;
use crate::types::ModuleId;
use crate::utils::HexDump;
use crate::Error;

/// Message from the dispatcher to one endpoint's mailbox.
#[derive(Debug)]
pub struct Delivery {
    pub exchange: ExchangeId,
    pub outcome: Outcome,
}

/// One mailbox per module, indexed by [`ModuleId::index`].
#[derive(Debug)]
pub struct EndpointTable {
    mailboxes: Vec<Sender<Delivery>>,
}

impl EndpointTable {
    /// Create the table and the receiving ends, in [`ModuleId::ALL`] order.
    pub fn new() -> (Self, Vec<Receiver<Delivery>>) {
        let (mailboxes, receivers): (Vec<_>, Vec<_>) =
            ModuleId::ALL.iter().map(|_| mpsc::channel()).unzip();
        (Self { mailboxes }, receivers)
    }

    pub fn route(&self, routing: Routing) {
        if let Routing::Deliver {
            holder,
            exchange,
            outcome,
        } = routing
        {
            if self.mailboxes[holder.index()]
                .send(Delivery { exchange, outcome })
                .is_err()
            {
                debug!("{} endpoint is gone; delivery for exchange {} dropped", holder, exchange);
            }
        }
    }
}

/// Single receive loop: reads frames, validates them and routes each to
/// the endpoint holding the link.
pub struct ReceiveDispatcher<R: FrameReader> {
    link: Arc<LinkLock>,
    reader: R,
    table: EndpointTable,
}

impl<R: FrameReader> ReceiveDispatcher<R> {
    pub fn new(link: Arc<LinkLock>, reader: R, table: EndpointTable) -> Self {
        Self {
            link,
            reader,
            table,
        }
    }

    /// Run until the transport shuts down or the link is closed.
    pub fn run(mut self) {
        debug!("receive dispatcher started");
        while self.step() {}
        debug!("receive dispatcher stopped");
    }

    /// Process one read. Returns false once the loop must stop.
    pub fn step(&mut self) -> bool {
        match self.reader.read_frame() {
            Ok(bytes) => {
                self.handle_frame(&bytes);
                !self.link.is_closed()
            }
            Err(Error::Timeout) => !self.link.is_closed(),
            Err(Error::LinkClosed) => {
                debug!("transport closed");
                self.shutdown(Error::LinkClosed);
                false
            }
            Err(e) => {
                error!("transport read failed: {}", e);
                self.shutdown(e);
                false
            }
        }
    }

    fn handle_frame(&self, bytes: &[u8]) {
        let stats = self.link.stats();
        stats.record_received();
        match Frame::decode(bytes) {
            Ok(frame) => {
                trace!(
                    "received seq {} from {} ({:?})",
                    frame.sequence_id, frame.module_id, frame.command_type
                );
                self.table.route(self.link.correlate(frame));
            }
            Err(e) => {
                if matches!(e, Error::ChecksumMismatch { .. }) {
                    stats.record_checksum_error();
                } else {
                    stats.record_malformed();
                }
                warn!("discarding corrupted frame ({}): {}", e, HexDump(bytes));
                let routing = self.link.fail_in_flight(Error::ChecksumError { cause: Box::new(e) });
                self.table.route(routing);
            }
        }
    }

    // Close before routing so the failed caller cannot start another
    // exchange on a link that is about to go away.
    fn shutdown(&self, err: Error) {
        let routing = self.link.fail_in_flight(err);
        self.link.close();
        self.table.route(routing);
    }
}

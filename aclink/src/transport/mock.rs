// aclink/src/transport/mock.rs

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, warn};

use crate::protocol::Frame;
use crate::transport::traits::{FrameReader, FrameWriter, Transport};
use crate::{Error, Result};

enum Inbound {
    Frame(Vec<u8>),
    Close,
}

/// In-memory link for tests and simulations. Records every frame the host
/// writes and hands the host whatever frames are pushed as replies.
pub struct MockTransport {
    handle: MockLink,
    inbound_rx: Receiver<Inbound>,
    outbound_tx: Sender<Vec<u8>>,
}

/// Device-side control of a [`MockTransport`]. Cheap to clone.
#[derive(Clone)]
pub struct MockLink {
    inbound_tx: Sender<Inbound>,
    outbound_rx: Arc<Mutex<Receiver<Vec<u8>>>>,
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
    write_failures: Arc<AtomicUsize>,
}

pub struct MockReader {
    inbound_rx: Receiver<Inbound>,
}

pub struct MockWriter {
    handle: MockLink,
    outbound_tx: Sender<Vec<u8>>,
}

impl MockTransport {
    pub fn new() -> Self {
        let (inbound_tx, inbound_rx) = mpsc::channel();
        let (outbound_tx, outbound_rx) = mpsc::channel();
        Self {
            handle: MockLink {
                inbound_tx,
                outbound_rx: Arc::new(Mutex::new(outbound_rx)),
                sent: Arc::new(Mutex::new(Vec::new())),
                write_failures: Arc::new(AtomicUsize::new(0)),
            },
            inbound_rx,
            outbound_tx,
        }
    }

    pub fn handle(&self) -> MockLink {
        self.handle.clone()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MockTransport {
    type Reader = MockReader;
    type Writer = MockWriter;

    fn split(self) -> (MockReader, MockWriter) {
        (
            MockReader {
                inbound_rx: self.inbound_rx,
            },
            MockWriter {
                handle: self.handle,
                outbound_tx: self.outbound_tx,
            },
        )
    }
}

impl MockLink {
    /// Queue raw bytes for the host's reader.
    pub fn push_reply(&self, frame: Vec<u8>) {
        let _ = self.inbound_tx.send(Inbound::Frame(frame));
    }

    /// Encode and queue a reply frame.
    pub fn push_frame(&self, frame: &Frame) -> Result<()> {
        self.push_reply(frame.encode()?);
        Ok(())
    }

    /// Shut the link down: the reader reports `LinkClosed`.
    pub fn close(&self) {
        let _ = self.inbound_tx.send(Inbound::Close);
    }

    /// Every frame written so far, oldest first.
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Wait up to `timeout` for the next frame the host writes.
    pub fn next_sent(&self, timeout: Duration) -> Option<Vec<u8>> {
        let rx = self
            .outbound_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        rx.recv_timeout(timeout).ok()
    }

    /// Make the next `n` writes fail with a transport error.
    pub fn fail_next_writes(&self, n: usize) {
        self.write_failures.store(n, Ordering::SeqCst);
    }
}

impl FrameReader for MockReader {
    fn read_frame(&mut self) -> Result<Vec<u8>> {
        match self.inbound_rx.recv() {
            Ok(Inbound::Frame(bytes)) => Ok(bytes),
            Ok(Inbound::Close) | Err(_) => Err(Error::LinkClosed),
        }
    }
}

impl FrameWriter for MockWriter {
    fn write(&mut self, frame: &[u8]) -> Result<()> {
        let injected = self
            .handle
            .write_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(Error::Transport("injected write failure".into()));
        }
        self.handle
            .sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(frame.to_vec());
        // The device side may not be listening; the log above still counts.
        let _ = self.outbound_tx.send(frame.to_vec());
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.handle.close();
        Ok(())
    }
}

/// Simulated reader device: answers every host frame through a responder
/// closure on its own thread. The responder returns the raw frames to send
/// back (zero, one, or several).
pub struct MockDevice {
    thread: Option<JoinHandle<()>>,
}

impl MockDevice {
    pub fn spawn<F>(link: MockLink, mut responder: F) -> Self
    where
        F: FnMut(&Frame) -> Vec<Vec<u8>> + Send + 'static,
    {
        let thread = thread::spawn(move || {
            loop {
                let bytes = {
                    let rx = link
                        .outbound_rx
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner);
                    match rx.recv_timeout(Duration::from_millis(50)) {
                        Ok(bytes) => bytes,
                        Err(RecvTimeoutError::Timeout) => continue,
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                };
                match Frame::decode(&bytes) {
                    Ok(request) => {
                        for reply in responder(&request) {
                            link.push_reply(reply);
                        }
                    }
                    Err(e) => warn!("mock device ignoring undecodable frame: {}", e),
                }
            }
            debug!("mock device stopped");
        });
        Self {
            thread: Some(thread),
        }
    }

    /// Wait for the device thread to finish (after the host writer is gone).
    pub fn join(mut self) {
        if let Some(t) = self.thread.take() {
            let _ = t.join();
        }
    }
}

// aclink/src/transport/usb/mod.rs

#![cfg(feature = "usb")]

use std::sync::Arc;
use std::time::Duration;

use log::{debug, trace, warn};
use rusb::{Context, DeviceHandle, UsbContext};

use crate::constants::{FRAME_HEADER_LEN, FRAME_MAGIC};
use crate::protocol::frame_len;
use crate::transport::traits::{FrameReader, FrameWriter, Transport};
use crate::utils::HexDump;
use crate::{Error, Result};

mod descriptor;
pub use descriptor::{BulkEndpoints, find_bulk_endpoints};

const WRITE_ATTEMPTS: u64 = 3;
const BULK_CHUNK: usize = 512;

/// Reader attached over USB bulk endpoints.
pub struct UsbTransport {
    handle: Arc<DeviceHandle<Context>>,
    endpoints: BulkEndpoints,
    timeout_ms: u64,
}

impl UsbTransport {
    /// Open the first device matching `vendor_id`/`product_id` and claim its
    /// bulk data interface.
    pub fn open(vendor_id: u16, product_id: u16) -> Result<Self> {
        let ctx = Context::new()?;
        for device in ctx.devices()?.iter() {
            let dd = device.device_descriptor()?;
            if dd.vendor_id() != vendor_id || dd.product_id() != product_id {
                continue;
            }
            let endpoints = find_bulk_endpoints(&device).ok_or(Error::DeviceNotFound)?;
            let handle = device.open()?;

            // The kernel's CDC driver usually owns the interface; detach it
            // so we can claim it, and let claim_interface report failures.
            if let Ok(true) = handle.kernel_driver_active(endpoints.interface) {
                let _ = handle.detach_kernel_driver(endpoints.interface);
            }
            handle.claim_interface(endpoints.interface)?;
            debug!(
                "opened usb reader {:04x}:{:04x} (if {}, in {:#04x}, out {:#04x})",
                vendor_id, product_id, endpoints.interface, endpoints.in_ep, endpoints.out_ep
            );

            return Ok(Self {
                handle: Arc::new(handle),
                endpoints,
                timeout_ms: 1000,
            });
        }

        Err(Error::DeviceNotFound)
    }

    /// Per-transfer USB timeout. Reads that time out are reported as
    /// `Error::Timeout` and simply retried by the dispatcher.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

impl Transport for UsbTransport {
    type Reader = UsbReader;
    type Writer = UsbWriter;

    fn split(self) -> (UsbReader, UsbWriter) {
        let timeout = Duration::from_millis(self.timeout_ms);
        (
            UsbReader {
                handle: self.handle.clone(),
                in_ep: self.endpoints.in_ep,
                timeout,
                pending: Vec::new(),
            },
            UsbWriter {
                handle: self.handle,
                out_ep: self.endpoints.out_ep,
                timeout,
            },
        )
    }
}

pub struct UsbReader {
    handle: Arc<DeviceHandle<Context>>,
    in_ep: u8,
    timeout: Duration,
    /// Bytes received but not yet returned as a frame.
    pending: Vec<u8>,
}

impl UsbReader {
    /// Pop one complete frame off the front of `pending`, discarding any
    /// noise before the magic.
    fn take_frame(&mut self) -> Option<Vec<u8>> {
        let start = self
            .pending
            .windows(FRAME_MAGIC.len())
            .position(|w| w == FRAME_MAGIC);
        match start {
            Some(0) => {}
            Some(n) => {
                trace!("dropping {} byte(s) before frame magic", n);
                self.pending.drain(..n);
            }
            None => {
                // Keep a trailing 'A' that may begin the next magic.
                let keep = usize::from(self.pending.last() == Some(&FRAME_MAGIC[0]));
                let cut = self.pending.len() - keep;
                self.pending.drain(..cut);
                return None;
            }
        }
        if self.pending.len() < FRAME_HEADER_LEN {
            return None;
        }
        let total = frame_len(&self.pending[..FRAME_HEADER_LEN]).ok()?;
        if self.pending.len() < total {
            return None;
        }
        Some(self.pending.drain(..total).collect())
    }
}

impl FrameReader for UsbReader {
    fn read_frame(&mut self) -> Result<Vec<u8>> {
        loop {
            if let Some(frame) = self.take_frame() {
                trace!("usb read frame: {}", HexDump(&frame));
                return Ok(frame);
            }
            let mut buf = [0u8; BULK_CHUNK];
            match self.handle.read_bulk(self.in_ep, &mut buf, self.timeout) {
                Ok(n) => self.pending.extend_from_slice(&buf[..n]),
                Err(rusb::Error::Timeout) => return Err(Error::Timeout),
                Err(rusb::Error::NoDevice) => return Err(Error::LinkClosed),
                Err(rusb::Error::Pipe) => {
                    // Endpoint stalled: clear it and keep reading.
                    warn!("usb IN endpoint stalled; clearing halt");
                    self.handle.clear_halt(self.in_ep)?;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

pub struct UsbWriter {
    handle: Arc<DeviceHandle<Context>>,
    out_ep: u8,
    timeout: Duration,
}

impl FrameWriter for UsbWriter {
    fn write(&mut self, frame: &[u8]) -> Result<()> {
        // Retry a stalled endpoint a few times with a short backoff; give
        // up with the last rusb error.
        let mut last_err = None;
        for attempt in 1..=WRITE_ATTEMPTS {
            match self.handle.write_bulk(self.out_ep, frame, self.timeout) {
                Ok(n) if n == frame.len() => return Ok(()),
                Ok(n) => {
                    return Err(Error::Transport(format!(
                        "short usb write: {} of {} bytes",
                        n,
                        frame.len()
                    )));
                }
                Err(rusb::Error::NoDevice) => return Err(Error::LinkClosed),
                Err(e) => {
                    warn!("usb write attempt {} failed: {}", attempt, e);
                    last_err = Some(e);
                    let _ = self.handle.clear_halt(self.out_ep);
                    std::thread::sleep(Duration::from_millis(20 * attempt));
                }
            }
        }
        match last_err {
            Some(e) => Err(Error::Transport(e.to_string())),
            None => Err(Error::Timeout),
        }
    }
}

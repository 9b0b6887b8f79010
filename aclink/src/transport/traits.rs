// aclink/src/transport/traits.rs

use std::io::Read;

use log::trace;

use crate::Result;
use crate::constants::{FRAME_HEADER_LEN, FRAME_MAGIC};
use crate::protocol::frame_len;
use crate::utils::HexDump;

/// Outbound half of the physical link. Only the link's serializer writes,
/// so implementations need not be shareable.
pub trait FrameWriter: Send {
    /// Write one complete frame to the device.
    fn write(&mut self, frame: &[u8]) -> Result<()>;

    /// Tear the link down so the paired reader stops. Default: nothing to do.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Inbound half of the physical link, owned by the receive dispatcher.
pub trait FrameReader: Send {
    /// Block until the next complete frame arrives and return its bytes.
    ///
    /// `Error::Timeout` means nothing arrived yet and the caller may retry;
    /// `Error::LinkClosed` means nothing will ever arrive again.
    fn read_frame(&mut self) -> Result<Vec<u8>>;
}

/// A physical link that can be split into its two halves.
pub trait Transport {
    type Reader: FrameReader + 'static;
    type Writer: FrameWriter + 'static;

    fn split(self) -> (Self::Reader, Self::Writer);
}

impl<W: FrameWriter + ?Sized> FrameWriter for Box<W> {
    fn write(&mut self, frame: &[u8]) -> Result<()> {
        (**self).write(frame)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

impl<R: FrameReader + ?Sized> FrameReader for Box<R> {
    fn read_frame(&mut self) -> Result<Vec<u8>> {
        (**self).read_frame()
    }
}

/// Read one frame from a byte stream: hunt for the magic, read the rest of
/// the fixed header, then exactly `length + 1` more bytes.
///
/// Bytes preceding the magic are discarded, which lets the reader resync
/// after line noise.
pub fn read_frame_from<R: Read + ?Sized>(reader: &mut R) -> Result<Vec<u8>> {
    let mut header = [0u8; FRAME_HEADER_LEN];
    let mut skipped = 0usize;

    reader.read_exact(&mut header[..1])?;
    loop {
        if header[0] == FRAME_MAGIC[0] {
            reader.read_exact(&mut header[1..2])?;
            if header[1] == FRAME_MAGIC[1] {
                break;
            }
            skipped += 1;
            header[0] = header[1];
        } else {
            skipped += 1;
            reader.read_exact(&mut header[..1])?;
        }
    }
    if skipped > 0 {
        trace!("skipped {} byte(s) of noise before frame magic", skipped);
    }

    reader.read_exact(&mut header[2..])?;
    let total = frame_len(&header)?;

    let mut frame = Vec::with_capacity(total);
    frame.extend_from_slice(&header);
    frame.resize(total, 0);
    reader.read_exact(&mut frame[FRAME_HEADER_LEN..])?;
    trace!("read frame: {}", HexDump(&frame));
    Ok(frame)
}

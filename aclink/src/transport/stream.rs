// aclink/src/transport/stream.rs

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use log::{debug, trace};

use crate::{Error, Result};
use crate::transport::traits::{FrameReader, FrameWriter, Transport, read_frame_from};
use crate::utils::HexDump;

/// Link over any byte stream pair: a serial tty opened as a file, a pipe,
/// a TCP bridge to the reader.
pub struct StreamTransport<R, W> {
    reader: R,
    writer: W,
}

pub struct StreamReader<R> {
    inner: R,
}

pub struct StreamWriter<W> {
    inner: W,
}

impl<R, W> StreamTransport<R, W>
where
    R: Read + Send + 'static,
    W: Write + Send + 'static,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }
}

impl StreamTransport<File, File> {
    /// Open a character device (e.g. `/dev/ttyACM0`) for reading and
    /// writing. Line settings are left as the OS configured them.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::options().read(true).write(true).open(path)?;
        let reader = file.try_clone()?;
        debug!("opened stream transport on {}", path.display());
        Ok(Self::new(reader, file))
    }
}

impl<R, W> Transport for StreamTransport<R, W>
where
    R: Read + Send + 'static,
    W: Write + Send + 'static,
{
    type Reader = StreamReader<R>;
    type Writer = StreamWriter<W>;

    fn split(self) -> (StreamReader<R>, StreamWriter<W>) {
        (
            StreamReader { inner: self.reader },
            StreamWriter { inner: self.writer },
        )
    }
}

impl<R: Read + Send> FrameReader for StreamReader<R> {
    fn read_frame(&mut self) -> Result<Vec<u8>> {
        read_frame_from(&mut self.inner)
    }
}

impl<W: Write + Send> FrameWriter for StreamWriter<W> {
    fn write(&mut self, frame: &[u8]) -> Result<()> {
        trace!("stream write: {}", HexDump(frame));
        self.inner
            .write_all(frame)
            .and_then(|()| self.inner.flush())
            .map_err(|e| Error::Transport(format!("stream write failed: {}", e)))
    }
}

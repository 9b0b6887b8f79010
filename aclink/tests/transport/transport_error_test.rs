#[path = "../common/mod.rs"]
mod common;

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use aclink::{DeviceBuilder, Error, FrameReader, FrameWriter, MockTransport, Result, Transport};
use serial_test::serial;

#[test]
fn io_errors_map_to_link_errors() {
    let timeout: Error = io::Error::from(io::ErrorKind::TimedOut).into();
    assert!(matches!(timeout, Error::Timeout));
    let closed: Error = io::Error::from(io::ErrorKind::UnexpectedEof).into();
    assert!(matches!(closed, Error::LinkClosed));
    let other: Error = io::Error::other("boom").into();
    assert!(matches!(other, Error::Transport(_)));
}

/// Reader that idles a few times, then fails hard.
struct FlakyReader {
    idles: Arc<AtomicUsize>,
}

impl FrameReader for FlakyReader {
    fn read_frame(&mut self) -> Result<Vec<u8>> {
        std::thread::sleep(Duration::from_millis(5));
        if self.idles.fetch_add(1, Ordering::SeqCst) < 3 {
            Err(Error::Timeout)
        } else {
            Err(Error::Transport("cable unplugged".into()))
        }
    }
}

struct NullWriter;

impl FrameWriter for NullWriter {
    fn write(&mut self, _frame: &[u8]) -> Result<()> {
        Ok(())
    }
}

#[test]
#[serial]
fn read_timeouts_are_idle_but_read_failures_close_the_link() {
    common::init_logging();
    let idles = Arc::new(AtomicUsize::new(0));
    let device = DeviceBuilder::new()
        .with_halves(
            Box::new(FlakyReader {
                idles: idles.clone(),
            }),
            Box::new(NullWriter),
        )
        .reply_timeout(Duration::from_secs(2))
        .build()
        .unwrap();

    let err = device.contact_card().send_command(b"atr").unwrap_err();
    assert!(matches!(err, Error::Transport(_) | Error::LinkClosed));
    assert!(idles.load(Ordering::SeqCst) >= 4);
    assert!(device.is_closed());
    assert!(matches!(
        device.contact_card().send_command(b"atr"),
        Err(Error::LinkClosed)
    ));
    device.shutdown().unwrap();
}

/// Writer whose peer has hung up; counts the attempts.
struct HungUpWriter {
    attempts: Arc<AtomicUsize>,
}

impl FrameWriter for HungUpWriter {
    fn write(&mut self, _frame: &[u8]) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(io::Error::from(io::ErrorKind::BrokenPipe).into())
    }
}

#[test]
#[serial]
fn broken_pipe_write_is_transport_error_and_link_stays_open() {
    let attempts = Arc::new(AtomicUsize::new(0));
    // Keep the mock's writer half alive so its reader stays open.
    let (reader, mock_writer) = MockTransport::new().split();
    let device = DeviceBuilder::new()
        .with_halves(
            Box::new(reader),
            Box::new(HungUpWriter {
                attempts: attempts.clone(),
            }),
        )
        .build()
        .unwrap();

    let err = device.service_operations().send_command(b"{}").unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "got {:?}", err);
    assert!(!device.is_closed());

    let err = device.mifare().send_command(b"{}").unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
    assert_eq!(attempts.load(Ordering::SeqCst), 2);

    // Hanging up the reader side lets shutdown join the dispatcher.
    drop(mock_writer);
    device.shutdown().unwrap();
}

//! Test support helpers intended for use by unit and integration tests.
//!
//! These helpers centralize reply-frame construction and simulated-reader
//! setup so tests across the crate and tests/ directory can reuse them.

use crate::config::LinkConfig;
use crate::device::Device;
use crate::protocol::Frame;
use crate::transport::mock::{MockDevice, MockLink, MockTransport};
use crate::types::{CommandType, ModuleId, SequenceId};
use crate::Result;

/// Encode a device reply frame.
///
/// # Panics
///
/// If `payload` is too large to frame; a fixture like that is a broken test.
#[doc(hidden)]
pub fn reply_frame(
    module_id: ModuleId,
    command_type: CommandType,
    sequence_id: SequenceId,
    payload: &[u8],
) -> Vec<u8> {
    Frame::new(module_id, command_type, sequence_id, payload)
        .encode()
        .expect("reply fixture payload exceeds the frame limit")
}

/// Reply `Success` to `request`, echoing its payload.
#[doc(hidden)]
pub fn echo_success(request: &Frame) -> Vec<Vec<u8>> {
    vec![reply_frame(
        request.module_id,
        CommandType::Success,
        request.sequence_id,
        &request.payload,
    )]
}

/// Start a device over a fresh MockTransport with no simulated reader;
/// the returned link lets the test push replies by hand.
#[doc(hidden)]
pub fn mock_device(config: LinkConfig) -> Result<(Device, MockLink)> {
    let mock = MockTransport::new();
    let link = mock.handle();
    let device = Device::with_transport(mock, config)?;
    Ok((device, link))
}

/// Start a device whose simulated reader answers through `responder`.
#[doc(hidden)]
pub fn simulated_device<F>(config: LinkConfig, responder: F) -> Result<(Device, MockDevice, MockLink)>
where
    F: FnMut(&Frame) -> Vec<Vec<u8>> + Send + 'static,
{
    let mock = MockTransport::new();
    let link = mock.handle();
    let sim = MockDevice::spawn(mock.handle(), responder);
    let device = Device::with_transport(mock, config)?;
    Ok((device, sim, link))
}

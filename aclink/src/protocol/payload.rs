// aclink/src/protocol/payload.rs

//! Text encoding of frame payloads. The device exchanges payloads as
//! standard (padded) base64 so that frames stay printable.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::constants::{MAX_ENCODED_PAYLOAD_LEN, MAX_RAW_PAYLOAD_LEN};
use crate::{Error, Result};

/// Length of the base64 form of `raw_len` bytes.
pub const fn encoded_len(raw_len: usize) -> usize {
    raw_len.div_ceil(3) * 4
}

/// Reject payloads whose encoded form would overflow the length field.
pub fn check_len(raw_len: usize) -> Result<()> {
    if encoded_len(raw_len) > MAX_ENCODED_PAYLOAD_LEN {
        return Err(Error::PayloadTooLarge {
            max: MAX_RAW_PAYLOAD_LEN,
            actual: raw_len,
        });
    }
    Ok(())
}

pub fn encode(raw: &[u8]) -> Result<Vec<u8>> {
    check_len(raw.len())?;
    Ok(STANDARD.encode(raw).into_bytes())
}

pub fn decode(text: &[u8]) -> Result<Vec<u8>> {
    STANDARD
        .decode(text)
        .map_err(|e| Error::MalformedFrame(format!("payload is not base64: {}", e)))
}

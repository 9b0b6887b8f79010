// aclink/src/protocol/frame.rs

use crate::constants::{FRAME_HEADER_LEN, FRAME_MAGIC, FRAME_MIN_LEN};
use crate::protocol::checksum::checksum;
use crate::protocol::parser::{Header, ensure_len};
use crate::protocol::payload;
use crate::types::{CommandType, ModuleId, SequenceId};
use crate::{Error, Result};

/// One decoded wire frame. `payload` holds the raw bytes, not their text
/// encoding.
///
/// Format: [Magic "AC"(2)] [Len(1)] [Seq(1)] [Module(1)] [Type(1)] [Payload(Len)] [Checksum(1)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub sequence_id: SequenceId,
    pub module_id: ModuleId,
    pub command_type: CommandType,
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn new(
        module_id: ModuleId,
        command_type: CommandType,
        sequence_id: SequenceId,
        payload: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            sequence_id,
            module_id,
            command_type,
            payload: payload.into(),
        }
    }

    /// Encode into wire bytes.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let text = payload::encode(&self.payload)?;

        let mut out = Vec::with_capacity(FRAME_MIN_LEN + text.len());
        out.extend_from_slice(&FRAME_MAGIC);
        out.push(text.len() as u8);
        out.push(self.sequence_id.as_u8());
        out.push(self.module_id.as_u8());
        out.push(self.command_type.as_u8());
        out.extend_from_slice(&text);
        out.push(checksum(&out));
        Ok(out)
    }

    /// Decode and validate a complete wire frame.
    ///
    /// The checksum is checked first, over the whole buffer, so any
    /// corruption of the covered bytes reports `ChecksumMismatch` rather
    /// than whatever field it happened to land in. That includes most
    /// truncated frames, whose last byte is then not a checksum.
    ///
    /// # Errors
    ///
    /// In the order they are checked:
    ///
    /// - [`Error::InvalidLength`]: fewer than 7 bytes.
    /// - [`Error::ChecksumMismatch`]: the last byte does not balance the rest.
    /// - [`Error::MalformedFrame`]: the magic is not `"AC"`.
    /// - [`Error::UnknownModule`] / [`Error::UnknownCommandType`]: id bytes
    ///   out of range.
    /// - [`Error::InvalidLength`]: buffer size disagrees with the length byte.
    /// - [`Error::MalformedFrame`]: the payload is not valid base64.
    ///
    /// All of these satisfy [`Error::is_decode_error`].
    pub fn decode(frame: &[u8]) -> Result<Self> {
        ensure_len(frame, FRAME_MIN_LEN)?;

        let (&actual, body) = frame
            .split_last()
            .ok_or(Error::InvalidLength {
                expected: FRAME_MIN_LEN,
                actual: 0,
            })?;
        let expected = checksum(body);
        if actual != expected {
            return Err(Error::ChecksumMismatch { expected, actual });
        }

        let header = Header::parse(frame)?;
        let required_len = header.frame_len();
        if frame.len() != required_len {
            return Err(Error::InvalidLength {
                expected: required_len,
                actual: frame.len(),
            });
        }

        let text = &frame[FRAME_HEADER_LEN..FRAME_HEADER_LEN + header.length as usize];
        let payload = payload::decode(text)?;

        Ok(Self {
            sequence_id: header.sequence_id,
            module_id: header.module_id,
            command_type: header.command_type,
            payload,
        })
    }
}

// aclink/src/protocol/parser.rs

use crate::constants::{
    FRAME_HEADER_LEN, FRAME_MAGIC, FRAME_MIN_LEN, OFFSET_COMMAND_TYPE, OFFSET_LENGTH,
    OFFSET_MODULE, OFFSET_SEQUENCE,
};
use crate::types::{CommandType, ModuleId, SequenceId};
use crate::{Error, Result};

/// Ensure the slice has at least `min` bytes.
pub fn ensure_len(data: &[u8], min: usize) -> Result<()> {
    if data.len() < min {
        return Err(Error::InvalidLength {
            expected: min,
            actual: data.len(),
        });
    }
    Ok(())
}

/// Read a single byte at `idx` with bounds checking.
pub fn byte_at(data: &[u8], idx: usize) -> Result<u8> {
    ensure_len(data, idx + 1)?;
    Ok(data[idx])
}

/// Check the two magic bytes at the start of `data`.
pub fn expect_magic(data: &[u8]) -> Result<()> {
    ensure_len(data, FRAME_MAGIC.len())?;
    if data[..FRAME_MAGIC.len()] != FRAME_MAGIC {
        return Err(Error::MalformedFrame(format!(
            "invalid magic {:02x} {:02x}",
            data[0], data[1]
        )));
    }
    Ok(())
}

/// Parsed fixed-size header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub length: u8,
    pub sequence_id: SequenceId,
    pub module_id: ModuleId,
    pub command_type: CommandType,
}

impl Header {
    /// Parse the 6-byte header at the start of `data`.
    pub fn parse(data: &[u8]) -> Result<Self> {
        ensure_len(data, FRAME_HEADER_LEN)?;
        expect_magic(data)?;
        Ok(Self {
            length: byte_at(data, OFFSET_LENGTH)?,
            sequence_id: SequenceId::new(byte_at(data, OFFSET_SEQUENCE)?),
            module_id: ModuleId::try_from(byte_at(data, OFFSET_MODULE)?)?,
            command_type: CommandType::try_from(byte_at(data, OFFSET_COMMAND_TYPE)?)?,
        })
    }

    /// Total size of the frame this header starts.
    pub fn frame_len(&self) -> usize {
        FRAME_MIN_LEN + self.length as usize
    }
}

/// Total frame size implied by a header, looking only at magic and length.
/// Transports use this to find frame boundaries without validating ids.
pub fn frame_len(header: &[u8]) -> Result<usize> {
    expect_magic(header)?;
    let len = byte_at(header, OFFSET_LENGTH)?;
    Ok(FRAME_MIN_LEN + len as usize)
}

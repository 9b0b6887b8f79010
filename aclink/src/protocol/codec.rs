// aclink/src/protocol/codec.rs

//! Free-function face of the frame codec, in the argument order the link
//! uses.

use crate::Result;
use crate::types::{CommandType, ModuleId, SequenceId};

use super::Frame;

/// Encode a logical command into wire bytes.
pub fn encode(
    module_id: ModuleId,
    command_type: CommandType,
    sequence_id: SequenceId,
    payload: &[u8],
) -> Result<Vec<u8>> {
    Frame::new(module_id, command_type, sequence_id, payload).encode()
}

/// Decode and validate wire bytes into a [`Frame`].
pub fn decode(wire: &[u8]) -> Result<Frame> {
    Frame::decode(wire)
}

// aclink/src/constants.rs
//! Wire-level constants shared by the codec, the transports and the link.

/// Frame magic: ASCII "AC"
pub const FRAME_MAGIC: [u8; 2] = *b"AC";

/// Header size: magic(2) + length(1) + sequence(1) + module(1) + command type(1)
pub const FRAME_HEADER_LEN: usize = 6;

/// Trailing checksum byte
pub const FRAME_CHECKSUM_LEN: usize = 1;

/// Smallest well-formed frame (empty payload)
pub const FRAME_MIN_LEN: usize = FRAME_HEADER_LEN + FRAME_CHECKSUM_LEN;

/// The length field is one byte, so at most 255 text-encoded payload bytes
pub const MAX_ENCODED_PAYLOAD_LEN: usize = u8::MAX as usize;

/// Largest raw payload whose base64 form still fits the length field
/// (63 groups of 3 bytes -> 252 characters).
pub const MAX_RAW_PAYLOAD_LEN: usize = MAX_ENCODED_PAYLOAD_LEN / 4 * 3;

/// Largest frame on the wire
pub const FRAME_MAX_LEN: usize = FRAME_MIN_LEN + MAX_ENCODED_PAYLOAD_LEN;

/// Byte offsets inside the header
pub const OFFSET_LENGTH: usize = 2;
pub const OFFSET_SEQUENCE: usize = 3;
pub const OFFSET_MODULE: usize = 4;
pub const OFFSET_COMMAND_TYPE: usize = 5;

/// Number of recently abandoned sequence ids remembered so their late
/// replies can be told apart from genuinely out-of-order frames.
pub const RETIRED_SEQUENCE_WINDOW: usize = 16;

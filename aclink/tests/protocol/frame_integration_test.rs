#[path = "../common/mod.rs"]
mod common;

use aclink::protocol::{self, Frame, Header};
use aclink::{CommandType, Error, ModuleId, SequenceId};

#[test]
fn known_frames_decode() {
    let f = Frame::decode(&common::fixtures::empty_success_frame()).expect("frame decode");
    assert_eq!(f.module_id, ModuleId::ServiceOperations);
    assert_eq!(f.command_type, CommandType::Success);
    assert_eq!(f.sequence_id, common::fixtures::sample_sequence());
    assert!(f.payload.is_empty());

    let f = protocol::decode(&common::fixtures::braces_command_frame()).unwrap();
    assert_eq!(f.command_type, CommandType::Command);
    assert_eq!(f.payload, b"{}");
}

#[test]
fn encode_matches_known_bytes() {
    let bytes = protocol::encode(
        ModuleId::ServiceOperations,
        CommandType::Command,
        SequenceId::new(7),
        b"{}",
    )
    .unwrap();
    assert_eq!(bytes, common::fixtures::braces_command_frame());
}

#[test]
fn led_command_roundtrip() {
    let bytes = protocol::encode(
        ModuleId::ServiceOperations,
        CommandType::Command,
        common::fixtures::sample_sequence(),
        common::fixtures::led_payload(),
    )
    .unwrap();
    let header = Header::parse(&bytes).unwrap();
    assert_eq!(header.frame_len(), bytes.len());
    assert_eq!(protocol::frame_len(&bytes[..6]).unwrap(), bytes.len());

    let frame = protocol::decode(&bytes).unwrap();
    assert_eq!(frame.payload, common::fixtures::led_payload());
}

#[test]
fn trailing_zero_byte_is_rejected() {
    let mut bytes = common::fixtures::empty_success_frame();
    // A zero byte keeps the checksum valid over the longer buffer, so only
    // the length check can catch it.
    bytes.insert(bytes.len() - 1, 0x00);
    match Frame::decode(&bytes) {
        Err(Error::InvalidLength { expected, actual }) => {
            assert_eq!(expected, 7);
            assert_eq!(actual, 8);
        }
        other => panic!("expected invalid length, got {:?}", other),
    }
}

#[test]
fn short_and_truncated_buffers() {
    let frame = common::fixtures::braces_command_frame();

    match Frame::decode(&frame[..5]) {
        Err(Error::InvalidLength { expected, actual }) => {
            assert_eq!(expected, 7);
            assert_eq!(actual, 5);
        }
        other => panic!("expected invalid length, got {:?}", other),
    }

    // With the tail cut off the last byte is payload, not a checksum.
    for cut in 1..=2 {
        let err = Frame::decode(&frame[..frame.len() - cut]).unwrap_err();
        assert!(matches!(err, Error::ChecksumMismatch { .. }), "cut {}: {:?}", cut, err);
        assert!(err.is_decode_error());
    }
}

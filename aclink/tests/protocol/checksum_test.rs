#[path = "../common/mod.rs"]
mod common;

use aclink::protocol::{checksum, verify};

#[test]
fn checksum_examples() {
    assert_eq!(checksum(&[0x01, 0x02, 0x03]), 0xfa);
    assert_eq!(checksum(&[]), 0x00);
    assert_eq!(checksum(&[0x41, 0x43, 0x00, 0x07, 0x03, 0x01]), 0x71);
}

#[test]
fn fixture_frames_verify() {
    assert!(verify(&common::fixtures::empty_success_frame()));
    assert!(verify(&common::fixtures::braces_command_frame()));
}

#[test]
fn every_single_bit_flip_is_detected() {
    let frame = common::fixtures::braces_command_frame();
    for idx in 0..frame.len() - 1 {
        for bit in 0..8 {
            let mut f = frame.clone();
            f[idx] ^= 1 << bit;
            assert!(!verify(&f), "flip at byte {} bit {} went unnoticed", idx, bit);
        }
    }
}

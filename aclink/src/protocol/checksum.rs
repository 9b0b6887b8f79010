// aclink/src/protocol/checksum.rs

/// Frame checksum: two's complement of the byte sum of everything before
/// the checksum byte, so a valid frame sums to zero mod 256.
pub fn checksum(bytes: &[u8]) -> u8 {
    let sum = bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    0u8.wrapping_sub(sum)
}

/// True if the last byte of `frame` is the checksum of the bytes before it.
pub fn verify(frame: &[u8]) -> bool {
    match frame.split_last() {
        Some((&sum, body)) => checksum(body) == sum,
        None => false,
    }
}

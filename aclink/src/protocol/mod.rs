// aclink/src/protocol/mod.rs

pub mod checksum;
pub mod codec;
pub mod frame;
pub mod parser;
pub mod payload;

pub use checksum::{checksum, verify};
pub use codec::{decode, encode};
pub use frame::Frame;
pub use parser::{Header, frame_len};

// aclink/src/lib.rs

//! aclink
//!
//! Host-side link protocol for multi-module smart-card/NFC readers. Six
//! logical modules (contact, contactless, MIFARE, service operations,
//! NXP NTAG, GUI) share one serial-style link; this crate frames their
//! commands, serializes them over the link and routes each reply back to
//! the module that asked.
#![warn(missing_docs)]

pub mod config;
pub mod constants;
pub mod device;
pub mod error;
pub mod link;
pub mod prelude;
pub mod protocol;
pub mod test_support;
pub mod transport;
pub mod types;
pub mod utils;

// Re-export common types at crate root so `crate::Error`, `crate::Result`,
// and the newtypes in `types` are available for consumers and for
// convenient `prelude` re-exports.
pub use crate::error::*;
pub use crate::types::*;

pub use prelude::*;

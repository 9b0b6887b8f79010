//! Utilities for aclink: hex dumps for logging and timeout helpers.

pub mod hex;
pub mod timeout;

pub use hex::*;
pub use timeout::*;

// aclink/src/error.rs

use thiserror::Error;

use crate::types::{CommandType, ModuleId, SequenceId};

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("device not found")]
    DeviceNotFound,

    #[cfg(feature = "usb")]
    #[error("usb error: {0}")]
    Usb(#[from] rusb::Error),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("link closed")]
    LinkClosed,

    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    #[error("invalid frame length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("unknown module id {0:#04x}")]
    UnknownModule(u8),

    #[error("unknown command type {0:#04x}")]
    UnknownCommandType(u8),

    #[error("checksum mismatch: expected {expected:#04x}, got {actual:#04x}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    /// A corrupted reply was received while an exchange was waiting on it.
    #[error("corrupted reply: {cause}")]
    ChecksumError {
        #[source]
        cause: Box<Error>,
    },

    #[error("out of order reply: expected sequence {expected}, got {actual}")]
    OutOfOrder {
        expected: SequenceId,
        actual: SequenceId,
    },

    #[error("reply routed to {actual:?} while {expected:?} holds the link")]
    ModuleMismatch { expected: ModuleId, actual: ModuleId },

    #[error("unexpected command type in reply: {0:?}")]
    UnexpectedCommandType(CommandType),

    #[error("payload too large: max {max} bytes, got {actual}")]
    PayloadTooLarge { max: usize, actual: usize },

    #[error("operation timed out")]
    Timeout,

    #[error("background task failed: {0}")]
    Task(String),

    #[cfg(feature = "serde")]
    #[error("payload serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Frame-level decode failures: the bytes did not form a valid frame.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            Error::MalformedFrame(_)
                | Error::InvalidLength { .. }
                | Error::UnknownModule(_)
                | Error::UnknownCommandType(_)
                | Error::ChecksumMismatch { .. }
        )
    }

    /// Failures a caller of `ModuleEndpoint::send` sees for an exchange that
    /// went wrong on the wire. These are recoverable; retrying is up to the
    /// caller.
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            Error::ChecksumError { .. }
                | Error::OutOfOrder { .. }
                | Error::ModuleMismatch { .. }
                | Error::UnexpectedCommandType(_)
                | Error::Timeout
                | Error::Transport(_)
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        use std::io::ErrorKind;
        match e.kind() {
            ErrorKind::TimedOut | ErrorKind::WouldBlock => Error::Timeout,
            ErrorKind::UnexpectedEof
            | ErrorKind::BrokenPipe
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted => Error::LinkClosed,
            _ => Error::Transport(e.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

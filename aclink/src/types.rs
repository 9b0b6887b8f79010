// aclink/src/types.rs

use derive_more::{Display, From, Into};

use crate::Error;
use std::convert::TryFrom;

/// Hardware subsystem sharing the physical link. The discriminant is the
/// byte carried in the frame's module field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ModuleId {
    ContactCard = 0,
    ContactlessCard = 1,
    Mifare = 2,
    ServiceOperations = 3,
    NxpNtag = 4,
    GuiOperations = 5,
}

impl ModuleId {
    /// Every module, ordered by wire value.
    pub const ALL: [ModuleId; 6] = [
        ModuleId::ContactCard,
        ModuleId::ContactlessCard,
        ModuleId::Mifare,
        ModuleId::ServiceOperations,
        ModuleId::NxpNtag,
        ModuleId::GuiOperations,
    ];

    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Position in [`ModuleId::ALL`]; used to index per-module tables.
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            ModuleId::ContactCard => "contact-card",
            ModuleId::ContactlessCard => "contactless-card",
            ModuleId::Mifare => "mifare",
            ModuleId::ServiceOperations => "service-operations",
            ModuleId::NxpNtag => "nxp-ntag",
            ModuleId::GuiOperations => "gui-operations",
        }
    }
}

impl TryFrom<u8> for ModuleId {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        ModuleId::ALL
            .get(value as usize)
            .copied()
            .ok_or(Error::UnknownModule(value))
    }
}

impl std::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Frame kind. Host requests carry `Command`; the device answers with
/// `Success` or `Failure`, and may send `Pending` while it is still working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum CommandType {
    Command = 0,
    Success = 1,
    Failure = 2,
    Pending = 3,
}

impl CommandType {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Whether a reply of this type ends the exchange.
    pub const fn is_final(self) -> bool {
        matches!(self, CommandType::Success | CommandType::Failure)
    }
}

impl TryFrom<u8> for CommandType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CommandType::Command),
            1 => Ok(CommandType::Success),
            2 => Ok(CommandType::Failure),
            3 => Ok(CommandType::Pending),
            other => Err(Error::UnknownCommandType(other)),
        }
    }
}

/// Rolling one-byte identifier correlating a request with its reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into)]
pub struct SequenceId(u8);

impl SequenceId {
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    pub const fn as_u8(self) -> u8 {
        self.0
    }

    /// The id that follows this one, wrapping after 255.
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Final outcome of a successful exchange: the reply's command type and its
/// decoded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub command_type: CommandType,
    pub payload: Vec<u8>,
}

impl Reply {
    pub fn new(command_type: CommandType, payload: Vec<u8>) -> Self {
        Self {
            command_type,
            payload,
        }
    }

    pub fn is_success(&self) -> bool {
        self.command_type == CommandType::Success
    }

    pub fn is_failure(&self) -> bool {
        self.command_type == CommandType::Failure
    }

    /// Payload as UTF-8 text (JSON bodies in practice).
    pub fn payload_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }

    /// Split into the `(command_type, payload)` pair.
    pub fn into_parts(self) -> (CommandType, Vec<u8>) {
        (self.command_type, self.payload)
    }
}

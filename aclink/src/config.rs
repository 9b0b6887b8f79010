// aclink/src/config.rs

use std::time::Duration;

use crate::utils::{DEFAULT_REPLY_TIMEOUT_MS, ms};

/// Default number of `Pending` frames that may extend one exchange.
pub const DEFAULT_MAX_PENDING_EXTENSIONS: u32 = 8;

/// Default name of the receive dispatcher thread.
pub const DEFAULT_DISPATCHER_NAME: &str = "aclink-dispatcher";

/// Link tuning knobs. All fields have working defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LinkConfig {
    /// How long an exchange waits for its reply unless the caller overrides it.
    pub reply_timeout_ms: u64,
    /// How many `Pending` frames may each push the deadline back by one
    /// reply timeout.
    pub max_pending_extensions: u32,
    /// First sequence id handed out.
    pub initial_sequence: u8,
    /// Thread name of the receive dispatcher.
    pub dispatcher_name: String,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            reply_timeout_ms: DEFAULT_REPLY_TIMEOUT_MS,
            max_pending_extensions: DEFAULT_MAX_PENDING_EXTENSIONS,
            initial_sequence: 0,
            dispatcher_name: DEFAULT_DISPATCHER_NAME.to_string(),
        }
    }
}

impl LinkConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply_timeout(&self) -> Duration {
        ms(self.reply_timeout_ms)
    }

    pub fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout_ms = timeout.as_millis().min(u64::MAX as u128) as u64;
        self
    }

    pub fn with_max_pending_extensions(mut self, n: u32) -> Self {
        self.max_pending_extensions = n;
        self
    }

    pub fn with_initial_sequence(mut self, seq: u8) -> Self {
        self.initial_sequence = seq;
        self
    }

    pub fn with_dispatcher_name(mut self, name: impl Into<String>) -> Self {
        self.dispatcher_name = name.into();
        self
    }
}

// aclink/src/link/stats.rs

use std::sync::atomic::{AtomicU64, Ordering};

/// Link counters, updated without taking the link lock.
#[derive(Debug, Default)]
pub struct LinkStats {
    frames_sent: AtomicU64,
    frames_received: AtomicU64,
    checksum_errors: AtomicU64,
    malformed_frames: AtomicU64,
    out_of_order: AtomicU64,
    stale_dropped: AtomicU64,
    timeouts: AtomicU64,
}

/// Point-in-time copy of [`LinkStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStatsSnapshot {
    pub frames_sent: u64,
    pub frames_received: u64,
    pub checksum_errors: u64,
    pub malformed_frames: u64,
    pub out_of_order: u64,
    pub stale_dropped: u64,
    pub timeouts: u64,
}

macro_rules! counter {
    ($inc:ident, $field:ident) => {
        pub(crate) fn $inc(&self) {
            self.$field.fetch_add(1, Ordering::Relaxed);
        }
    };
}

impl LinkStats {
    counter!(record_sent, frames_sent);
    counter!(record_received, frames_received);
    counter!(record_checksum_error, checksum_errors);
    counter!(record_malformed, malformed_frames);
    counter!(record_out_of_order, out_of_order);
    counter!(record_stale, stale_dropped);
    counter!(record_timeout, timeouts);

    pub fn snapshot(&self) -> LinkStatsSnapshot {
        LinkStatsSnapshot {
            frames_sent: self.frames_sent.load(Ordering::Relaxed),
            frames_received: self.frames_received.load(Ordering::Relaxed),
            checksum_errors: self.checksum_errors.load(Ordering::Relaxed),
            malformed_frames: self.malformed_frames.load(Ordering::Relaxed),
            out_of_order: self.out_of_order.load(Ordering::Relaxed),
            stale_dropped: self.stale_dropped.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
        }
    }
}

// aclink/src/link/sequence.rs

use crate::types::SequenceId;

/// Monotonic one-byte sequence counter with wraparound.
///
/// Lives inside the link's critical section; it is never shared on its own.
#[derive(Debug, Clone)]
pub struct SequenceAllocator {
    current: SequenceId,
}

impl SequenceAllocator {
    pub fn new(initial: u8) -> Self {
        Self {
            current: SequenceId::new(initial),
        }
    }

    /// Return the current value, then advance by one mod 256.
    pub fn next(&mut self) -> SequenceId {
        let id = self.current;
        self.current = id.next();
        id
    }

    /// Value the next call to [`next`](Self::next) will return.
    pub fn peek(&self) -> SequenceId {
        self.current
    }
}

impl Default for SequenceAllocator {
    fn default() -> Self {
        Self::new(0)
    }
}

//! Hex formatting for frame dumps in log output.

use std::fmt;

/// Lazily formats bytes as space-separated lowercase hex. Formatting only
/// happens if the log record is actually emitted.
///
/// Example: `HexDump(&[0x41, 0x43])` displays as `"41 43"`
pub struct HexDump<'a>(pub &'a [u8]);

impl fmt::Display for HexDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.0.iter().enumerate() {
            if i != 0 {
                f.write_str(" ")?;
            }
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl fmt::Debug for HexDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self)
    }
}

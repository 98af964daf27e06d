//! Diagnostic snapshot of an arena's layout.
//!
//! Replaces ad-hoc dumps with a value: callers decide whether it goes to
//! a log, a test assertion, or a debugger. Snapshots of small arenas
//! stay off the host heap.

use smallvec::SmallVec;
use std::fmt;

/// One live allocation in an [`ArenaMap`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MapEntry {
    /// Payload address.
    pub data: usize,
    /// Payload length in bytes.
    pub len: usize,
    /// Registered holder address.
    pub holder: usize,
}

/// Point-in-time description of a region arena's layout.
///
/// Entries are in allocation order (oldest first), matching descriptor
/// order. The `Display` impl renders a summary line followed by one line
/// per allocation.
#[derive(Clone, Debug)]
#[must_use]
pub struct ArenaMap {
    /// Window base address.
    pub lo: usize,
    /// Window end address.
    pub hi: usize,
    /// Bytes of payload in use at the bottom of the window.
    pub data_used: usize,
    /// Live allocations, oldest first.
    pub entries: SmallVec<[MapEntry; 8]>,
}

impl ArenaMap {
    /// Window size in bytes.
    pub fn capacity(&self) -> usize {
        self.hi - self.lo
    }

    /// Number of live allocations.
    pub fn live(&self) -> usize {
        self.entries.len()
    }
}

impl fmt::Display for ArenaMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "arena {:#x}..{:#x}: {} live, {} payload bytes of {}",
            self.lo,
            self.hi,
            self.live(),
            self.data_used,
            self.capacity(),
        )?;
        for (idx, entry) in self.entries.iter().enumerate() {
            writeln!(
                f,
                "  [{idx}] data {:#x} len {} holder {:#x}",
                entry.data, entry.len, entry.holder
            )?;
        }
        Ok(())
    }
}

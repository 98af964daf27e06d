//! Mirrored arena: a half-window region arena with a bit-inverted,
//! CRC-checked shadow.
//!
//! The window is carved into two halves, each prefixed by one checksum
//! word:
//!
//! ```text
//! lo                                                              hi
//! │ crc_a │ primary region (W/2 − 1 word) │ crc_b │ shadow region │
//! ```
//!
//! The primary half hosts a full [`RegionArena`] — payloads, free span,
//! and descriptor table. The shadow is the bitwise complement of the
//! primary, byte for byte, covering descriptors and free bytes alike, so
//! a restore reproduces the exact allocator state. Each checksum covers
//! its own half's region and excludes its storage word.
//!
//! The lifecycle per mutation is:
//! 1. mutate the primary (`allocate`, `reallocate`, ...) — state `Dirty`
//! 2. [`MirroredArena::update_mirror`] — state `Live`
//! 3. [`MirroredArena::check_consistency`] before trusting reads
//!
//! A consistency check compares against the *last mirrored image*:
//! calling it while `Dirty` treats un-mirrored writes as damage and
//! rolls them back. The state machine exists to make that hazard
//! visible.

use std::cell::Cell;

use ballast_core::{crc32, memops};

use crate::descriptor::{ENTRY_BYTES, WORD};
use crate::error::ArenaError;
use crate::holder::HolderCell;
use crate::map::ArenaMap;
use crate::region::RegionArena;
use crate::traits::Arena;

/// Lifecycle state of the mirror.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MirrorState {
    /// Constructed; the shadow is seeded but nothing client-visible has
    /// been mirrored yet.
    Empty,
    /// The shadow and both checksums match the primary.
    Live,
    /// The primary has been mutated since the last `update_mirror`.
    Dirty,
    /// Both copies failed their checksums. Terminal: every subsequent
    /// mutation and check refuses.
    Corrupt,
}

/// Outcome of a successful consistency check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub enum Consistency {
    /// Both checksums matched; nothing was touched.
    Healthy,
    /// Exactly one side was damaged and was restored from the other.
    Recovered,
}

/// Region arena with a bit-inverted shadow and two checksum words.
///
/// Exposes the whole [`RegionArena`] operation surface over the primary
/// half; every successful mutation marks the mirror `Dirty` until the
/// caller refreshes it.
pub struct MirroredArena {
    primary: RegionArena,
    /// Storage word for the primary checksum (window base).
    crc_primary: *mut u8,
    /// Storage word for the shadow checksum.
    crc_shadow: *mut u8,
    shadow_lo: *mut u8,
    /// Bytes covered by each checksum: payloads, free span, and
    /// descriptor table of one half.
    half_len: usize,
    state: Cell<MirrorState>,
}

impl MirroredArena {
    /// Smallest usable window: two checksum words plus room for one
    /// descriptor triple per half.
    pub const MIN_WINDOW: usize = 2 * (WORD + ENTRY_BYTES);

    /// Create a mirrored arena over the window `[lo, hi)`.
    ///
    /// The shadow and both checksum words are seeded immediately, so the
    /// window is internally consistent from birth; the reported state
    /// stays [`MirrorState::Empty`] until the first explicit
    /// [`MirroredArena::update_mirror`].
    ///
    /// Fails with [`ArenaError::InvalidWindow`] if the window size is
    /// odd (the halves would not line up) or too small to hold the
    /// checksum words and one allocation per half.
    ///
    /// # Safety
    ///
    /// Same contract as [`RegionArena::new`]: `lo..hi` must be a valid,
    /// writable range with `lo <= hi`, exclusively owned by this arena
    /// for its whole lifetime. Deliberate fault injection through the
    /// window is the one sanctioned exception — observing it is what
    /// `check_consistency` is for.
    pub unsafe fn new(lo: *mut u8, hi: *mut u8) -> Result<Self, ArenaError> {
        debug_assert!(lo as usize <= hi as usize);
        let size = hi as usize - lo as usize;
        if size % 2 != 0 {
            return Err(ArenaError::InvalidWindow {
                size,
                reason: "window size must be even",
            });
        }
        if size < Self::MIN_WINDOW {
            return Err(ArenaError::InvalidWindow {
                size,
                reason: "window too small for two checksummed halves",
            });
        }

        let half_len = size / 2 - WORD;
        let crc_primary = lo;
        let primary_lo = lo.add(WORD);
        let primary_hi = primary_lo.add(half_len);
        let crc_shadow = primary_hi;
        let shadow_lo = crc_shadow.add(WORD);

        let arena = Self {
            primary: RegionArena::new(primary_lo, primary_hi),
            crc_primary,
            crc_shadow,
            shadow_lo,
            half_len,
            state: Cell::new(MirrorState::Empty),
        };
        arena.refresh();
        Ok(arena)
    }

    /// Bytes in each half's checksummed region.
    pub fn half_len(&self) -> usize {
        self.half_len
    }

    /// Capacity available to allocations: the primary half's window.
    pub fn capacity(&self) -> usize {
        self.primary.capacity()
    }

    /// Bytes of payload currently in use in the primary.
    pub fn data_used(&self) -> usize {
        self.primary.data_used()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> MirrorState {
        self.state.get()
    }

    /// Snapshot the primary's layout for diagnostics.
    pub fn map(&self) -> ArenaMap {
        self.primary.map()
    }

    /// Count of bytes where the shadow is not the exact complement of
    /// the primary. Zero on a freshly mirrored arena.
    pub fn mirror_divergence(&self) -> usize {
        unsafe { memops::mirror_mismatches(self.primary.lo(), self.shadow_lo, self.half_len) }
    }

    /// Refresh the shadow and recompute both checksum words.
    ///
    /// Must be called after any sequence of mutations before the next
    /// consistency check. Idempotent on an already-`Live` arena. Ignored
    /// once the arena is `Corrupt` — nothing can recover that state.
    pub fn update_mirror(&self) {
        if self.state.get() == MirrorState::Corrupt {
            return;
        }
        self.refresh();
        self.state.set(MirrorState::Live);
    }

    /// Verify both halves against their checksums, repairing one-sided
    /// damage.
    ///
    /// | primary | shadow | action                    | result      |
    /// |---------|--------|---------------------------|-------------|
    /// | ok      | ok     | none                      | `Healthy`   |
    /// | bad     | ok     | restore primary           | `Recovered` |
    /// | ok      | bad    | restore shadow            | `Recovered` |
    /// | bad     | bad    | none; arena goes `Corrupt`| error       |
    ///
    /// Restores use the inverted copy, so a recovered half is the exact
    /// byte image last published by `update_mirror` — including the
    /// descriptor table, which re-establishes invariants I1–I4 wholesale.
    pub fn check_consistency(&self) -> Result<Consistency, ArenaError> {
        if self.state.get() == MirrorState::Corrupt {
            return Err(ArenaError::IntegrityLost);
        }
        unsafe {
            let computed_a = crc32(self.primary.lo(), self.primary.hi()) as usize;
            let computed_b = crc32(self.shadow_lo, self.shadow_lo.add(self.half_len)) as usize;
            let stored_a = (self.crc_primary as *const usize).read_unaligned();
            let stored_b = (self.crc_shadow as *const usize).read_unaligned();

            match (stored_a == computed_a, stored_b == computed_b) {
                (true, true) => Ok(Consistency::Healthy),
                (false, true) => {
                    memops::copy_inverted(self.primary.lo(), self.shadow_lo, self.half_len);
                    self.state.set(MirrorState::Live);
                    Ok(Consistency::Recovered)
                }
                (true, false) => {
                    memops::copy_inverted(self.shadow_lo, self.primary.lo(), self.half_len);
                    self.state.set(MirrorState::Live);
                    Ok(Consistency::Recovered)
                }
                (false, false) => {
                    self.state.set(MirrorState::Corrupt);
                    Err(ArenaError::IntegrityLost)
                }
            }
        }
    }

    /// Register `holder` and reserve `len` bytes in the primary half.
    ///
    /// Marks the mirror `Dirty`; refresh it before the next check.
    ///
    /// # Safety
    ///
    /// Same contract as [`RegionArena::allocate`].
    pub unsafe fn allocate(&self, holder: &HolderCell, len: usize) -> Result<(), ArenaError> {
        self.guard_mutable()?;
        self.primary.allocate(holder, len)?;
        self.state.set(MirrorState::Dirty);
        Ok(())
    }

    /// Resize `holder`'s allocation in the primary half.
    ///
    /// Marks the mirror `Dirty` on success.
    pub fn reallocate(
        &self,
        holder: &HolderCell,
        old_len: usize,
        new_len: usize,
    ) -> Result<(), ArenaError> {
        self.guard_mutable()?;
        self.primary.reallocate(holder, old_len, new_len)?;
        self.state.set(MirrorState::Dirty);
        Ok(())
    }

    /// Drop `holder`'s allocation from the primary half.
    ///
    /// Marks the mirror `Dirty` on success.
    pub fn deallocate(&self, holder: &HolderCell) -> Result<(), ArenaError> {
        self.guard_mutable()?;
        self.primary.deallocate(holder)?;
        self.state.set(MirrorState::Dirty);
        Ok(())
    }

    /// Remove `len` bytes at `at` from `holder`'s allocation.
    ///
    /// Marks the mirror `Dirty` on success.
    ///
    /// # Safety
    ///
    /// Same contract as [`RegionArena::remove_span`].
    pub unsafe fn remove_span(
        &self,
        holder: &HolderCell,
        at: *mut u8,
        len: usize,
    ) -> Result<(), ArenaError> {
        self.guard_mutable()?;
        self.primary.remove_span(holder, at, len)?;
        self.state.set(MirrorState::Dirty);
        Ok(())
    }

    /// Run the primary's defensive repack pass.
    ///
    /// Marks the mirror `Dirty` unconditionally: the pass may move
    /// bytes even when the descriptor table looked healthy beforehand.
    pub fn shrink_data(&self) -> Result<(), ArenaError> {
        self.guard_mutable()?;
        self.primary.shrink_data();
        self.state.set(MirrorState::Dirty);
        Ok(())
    }

    /// Number of live allocations in the primary half.
    pub fn live_allocations(&self) -> usize {
        self.primary.live_allocations()
    }

    /// Payload length registered under `holder`, if live.
    pub fn allocation_len(&self, holder: &HolderCell) -> Option<usize> {
        self.primary.allocation_len(holder)
    }

    fn guard_mutable(&self) -> Result<(), ArenaError> {
        if self.state.get() == MirrorState::Corrupt {
            Err(ArenaError::IntegrityLost)
        } else {
            Ok(())
        }
    }

    fn refresh(&self) {
        unsafe {
            memops::copy_inverted(self.shadow_lo, self.primary.lo(), self.half_len);
            let crc_a = crc32(self.primary.lo(), self.primary.hi()) as usize;
            let crc_b = crc32(self.shadow_lo, self.shadow_lo.add(self.half_len)) as usize;
            (self.crc_primary as *mut usize).write_unaligned(crc_a);
            (self.crc_shadow as *mut usize).write_unaligned(crc_b);
        }
    }
}

impl Arena for MirroredArena {
    unsafe fn allocate(&self, holder: &HolderCell, len: usize) -> Result<(), ArenaError> {
        MirroredArena::allocate(self, holder, len)
    }

    fn reallocate(
        &self,
        holder: &HolderCell,
        old_len: usize,
        new_len: usize,
    ) -> Result<(), ArenaError> {
        MirroredArena::reallocate(self, holder, old_len, new_len)
    }

    fn deallocate(&self, holder: &HolderCell) -> Result<(), ArenaError> {
        MirroredArena::deallocate(self, holder)
    }

    unsafe fn remove_span(
        &self,
        holder: &HolderCell,
        at: *mut u8,
        len: usize,
    ) -> Result<(), ArenaError> {
        MirroredArena::remove_span(self, holder, at, len)
    }

    fn live_allocations(&self) -> usize {
        MirroredArena::live_allocations(self)
    }

    fn allocation_len(&self, holder: &HolderCell) -> Option<usize> {
        MirroredArena::allocation_len(self, holder)
    }
}

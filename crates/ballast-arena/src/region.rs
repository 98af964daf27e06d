//! The basic non-fragmenting region arena.
//!
//! A [`RegionArena`] governs a fixed byte window `[lo, hi)` it does not
//! own. Payload bytes grow upward from `lo`, packed end-to-end in
//! allocation order with no padding; descriptor triples grow downward
//! from `hi`:
//!
//! ```text
//! hi ────────────────────────────────
//!    │ descriptor 0 (oldest)        3 words: data, length, holder
//!    │ descriptor 1
//!    │ ...                          ← hi − live·3·WORD
//!    │
//!    │ free (always one span)
//!    │
//!    │ ...                          ← lo + data_used
//!    │ payload 1
//!    │ payload 0
//! lo ────────────────────────────────
//! ```
//!
//! The free region is a single contiguous span at all times: every grow,
//! shrink, and removal immediately slides later payloads so a hole can
//! never exist. Each slide publishes the new address in a fixed order —
//! payload copy, descriptor rewrite, holder rewrite — so holders learn
//! new addresses before they can observe them.

use std::cell::Cell;

use ballast_core::memops;
use smallvec::SmallVec;

use crate::descriptor::{write_holder, Descriptor, DescriptorTable, ENTRY_BYTES};
use crate::error::ArenaError;
use crate::holder::HolderCell;
use crate::map::{ArenaMap, MapEntry};
use crate::traits::Arena;

/// Non-fragmenting allocator over a caller-supplied byte window.
///
/// The arena does not own its backing memory and never touches the host
/// heap; all of its state beyond the two region cursors lives inside the
/// window itself. Operations take `&self` — the arena is a single-owner,
/// single-thread structure (raw window pointers make it neither `Send`
/// nor `Sync`) and mutating a holder cell behind a shared reference is
/// the whole point of the design.
pub struct RegionArena {
    lo: *mut u8,
    hi: *mut u8,
    /// Bytes of payload in use at the bottom of the window.
    data_used: Cell<usize>,
    /// Live descriptor triples at the top of the window.
    live: Cell<usize>,
}

impl RegionArena {
    /// Create an arena over the window `[lo, hi)`.
    ///
    /// # Safety
    ///
    /// `lo..hi` must be a valid, writable byte range with `lo <= hi`,
    /// exclusively owned by this arena for its whole lifetime. The
    /// caller must not access the window through any other path while
    /// the arena is live.
    pub unsafe fn new(lo: *mut u8, hi: *mut u8) -> Self {
        debug_assert!(lo as usize <= hi as usize);
        Self {
            lo,
            hi,
            data_used: Cell::new(0),
            live: Cell::new(0),
        }
    }

    fn table(&self) -> DescriptorTable {
        DescriptorTable::new(self.hi)
    }

    /// Window base address.
    pub fn lo(&self) -> *mut u8 {
        self.lo
    }

    /// Window end address (one past the last byte).
    pub fn hi(&self) -> *mut u8 {
        self.hi
    }

    /// Window size in bytes.
    pub fn capacity(&self) -> usize {
        self.hi as usize - self.lo as usize
    }

    /// Bytes of payload currently in use.
    pub fn data_used(&self) -> usize {
        self.data_used.get()
    }

    /// Bytes consumed by the descriptor table.
    pub fn descriptor_bytes(&self) -> usize {
        self.live.get() * ENTRY_BYTES
    }

    /// Free bytes between the data and descriptor regions.
    pub fn free_bytes(&self) -> usize {
        self.capacity() - self.data_used() - self.descriptor_bytes()
    }

    /// Number of live allocations.
    pub fn live_allocations(&self) -> usize {
        self.live.get()
    }

    /// Decode the descriptor at `entry` (0 = oldest), if live.
    ///
    /// Exposed for diagnostics and tests; ordinary clients only ever go
    /// through their holder cells.
    pub fn descriptor_at(&self, entry: usize) -> Option<Descriptor> {
        if entry < self.live.get() {
            Some(unsafe { self.table().get(entry) })
        } else {
            None
        }
    }

    /// Payload length registered under `holder`, if live.
    pub fn allocation_len(&self, holder: &HolderCell) -> Option<usize> {
        let entry = unsafe { self.table().find_by_holder(self.live.get(), holder.key()) }?;
        Some(unsafe { self.table().get(entry).len })
    }

    /// Register `holder` and reserve `len` bytes for it.
    ///
    /// On success the payload lands at the top of the data region and
    /// `holder` is overwritten with its address. Fails with
    /// [`ArenaError::DuplicateHolder`] if the holder address is already
    /// live, or [`ArenaError::Exhausted`] if the payload plus one more
    /// descriptor triple does not fit; either way the window is
    /// untouched.
    ///
    /// # Safety
    ///
    /// `holder` must stay at the same address, and must not be passed to
    /// another arena, until `deallocate` removes the registration (or
    /// the arena is dropped). The arena stores the cell's address and
    /// writes through it on every later compaction.
    pub unsafe fn allocate(&self, holder: &HolderCell, len: usize) -> Result<(), ArenaError> {
        let live = self.live.get();
        let table = self.table();
        if table.find_by_holder(live, holder.key()).is_some() {
            return Err(ArenaError::DuplicateHolder);
        }
        if self.data_used.get() + len + (live + 1) * ENTRY_BYTES > self.capacity() {
            return Err(ArenaError::Exhausted {
                requested: len,
                available: self.free_bytes(),
            });
        }

        let data = self.lo.add(self.data_used.get());
        table.set(
            live,
            Descriptor {
                data,
                len,
                holder: holder.key(),
            },
        );
        holder.set(data);
        self.live.set(live + 1);
        self.data_used.set(self.data_used.get() + len);
        Ok(())
    }

    /// Resize the allocation currently published through `holder` from
    /// `old_len` to `new_len` bytes.
    ///
    /// The allocation is located by its payload address (the holder's
    /// current value). Growing slides every later payload upward,
    /// shrinking slides them downward; both rewrite the affected
    /// descriptors and holders. Fails with [`ArenaError::NotFound`] if
    /// no allocation starts at the holder's address, or
    /// [`ArenaError::Exhausted`] if the growth does not fit; either way
    /// the window is untouched.
    ///
    /// Every affected payload move is `O(bytes)`; callers with timing
    /// constraints should prefer fixed-size allocations.
    pub fn reallocate(
        &self,
        holder: &HolderCell,
        old_len: usize,
        new_len: usize,
    ) -> Result<(), ArenaError> {
        let live = self.live.get();
        let table = self.table();
        let entry = unsafe { table.find_by_data(live, holder.get()) }.ok_or(ArenaError::NotFound)?;

        if new_len > old_len {
            let delta = new_len - old_len;
            if self.data_used.get() + delta + live * ENTRY_BYTES > self.capacity() {
                return Err(ArenaError::Exhausted {
                    requested: delta,
                    available: self.free_bytes(),
                });
            }
            unsafe {
                table.set_len(entry, new_len);
                // Newest first, so each payload moves into free space
                // before the one below it expands.
                for follower in (entry + 1..live).rev() {
                    self.slide(follower, delta as isize);
                }
            }
            self.data_used.set(self.data_used.get() + delta);
        } else if new_len < old_len {
            let delta = old_len - new_len;
            unsafe {
                table.set_len(entry, new_len);
                // Oldest first, so each payload moves into the span the
                // previous step just vacated.
                for follower in entry + 1..live {
                    self.slide(follower, -(delta as isize));
                }
            }
            self.data_used.set(self.data_used.get() - delta);
        }
        Ok(())
    }

    /// Drop the whole allocation registered under `holder`.
    ///
    /// Later payloads slide down over the vacated span and their
    /// descriptors close ranks toward `hi`. Fails with
    /// [`ArenaError::NotFound`] if the holder is not registered, leaving
    /// the window untouched.
    pub fn deallocate(&self, holder: &HolderCell) -> Result<(), ArenaError> {
        let live = self.live.get();
        let entry = unsafe { self.table().find_by_holder(live, holder.key()) }
            .ok_or(ArenaError::NotFound)?;
        let desc = unsafe { self.table().get(entry) };
        unsafe { self.remove_range(entry, desc.data, desc.len) };
        Ok(())
    }

    /// Remove `len` bytes starting at `at` from `holder`'s allocation.
    ///
    /// `len` is clamped to the allocation size; removing the full size
    /// drops the allocation entirely, exactly like `deallocate`.
    /// Otherwise the allocation shrinks in place: the bytes above `at`
    /// within the allocation collapse downward, then every later payload
    /// slides down by `len`.
    ///
    /// # Safety
    ///
    /// `at` must lie within `holder`'s allocation and, after clamping,
    /// `at + len` must not pass its end.
    pub unsafe fn remove_span(
        &self,
        holder: &HolderCell,
        at: *mut u8,
        len: usize,
    ) -> Result<(), ArenaError> {
        let live = self.live.get();
        let entry = self
            .table()
            .find_by_holder(live, holder.key())
            .ok_or(ArenaError::NotFound)?;
        self.remove_range(entry, at, len);
        Ok(())
    }

    /// Defensive pass restoring the packed layout.
    ///
    /// Walks the descriptors oldest-first and moves any payload whose
    /// recorded address differs from the running expected address,
    /// fixing the descriptor and the holder as it goes. `data_used` is
    /// recomputed from the descriptor lengths. A healthy arena is left
    /// bit-for-bit unchanged.
    pub fn shrink_data(&self) {
        let live = self.live.get();
        let table = self.table();
        let mut expected = self.lo;
        let mut used = 0usize;
        for entry in 0..live {
            unsafe {
                let desc = table.get(entry);
                if desc.data != expected {
                    memops::copy(expected, desc.data, desc.len);
                    table.set_data(entry, expected);
                    write_holder(desc.holder, expected);
                }
                expected = expected.add(desc.len);
                used += desc.len;
            }
        }
        self.data_used.set(used);
    }

    /// Snapshot the current layout for diagnostics.
    pub fn map(&self) -> ArenaMap {
        let live = self.live.get();
        let table = self.table();
        let mut entries = SmallVec::new();
        for entry in 0..live {
            let desc = unsafe { table.get(entry) };
            entries.push(MapEntry {
                data: desc.data as usize,
                len: desc.len,
                holder: desc.holder,
            });
        }
        ArenaMap {
            lo: self.lo as usize,
            hi: self.hi as usize,
            data_used: self.data_used.get(),
            entries,
        }
    }

    /// Move descriptor `entry`'s payload by `delta` bytes and publish
    /// the new address: payload copy, descriptor rewrite, holder
    /// rewrite, in that order.
    unsafe fn slide(&self, entry: usize, delta: isize) {
        let table = self.table();
        let desc = table.get(entry);
        let new_data = desc.data.offset(delta);
        memops::copy(new_data, desc.data, desc.len);
        table.set_data(entry, new_data);
        write_holder(desc.holder, new_data);
    }

    /// Drop `len` bytes starting at `at` inside descriptor `entry`'s
    /// payload, compacting everything above.
    unsafe fn remove_range(&self, entry: usize, at: *mut u8, len: usize) {
        let live = self.live.get();
        let table = self.table();
        let desc = table.get(entry);
        let len = len.min(desc.len);
        debug_assert!(at as usize >= desc.data as usize);
        debug_assert!(at as usize + len <= desc.data as usize + desc.len);

        if len == desc.len {
            // Whole allocation: later entries close ranks toward `hi`
            // and their payloads slide down over the vacated span.
            for follower in entry..live - 1 {
                let next = table.get(follower + 1);
                let new_data = next.data.sub(len);
                memops::copy(new_data, next.data, next.len);
                table.set(
                    follower,
                    Descriptor {
                        data: new_data,
                        len: next.len,
                        holder: next.holder,
                    },
                );
                write_holder(next.holder, new_data);
            }
            self.live.set(live - 1);
        } else {
            // Partial: shrink this entry, collapse its own tail, then
            // slide everything above down by the removed length.
            table.set_len(entry, desc.len - len);
            let tail = at.add(len);
            let tail_len = desc.len - (tail as usize - desc.data as usize);
            memops::copy(at, tail, tail_len);
            for follower in entry + 1..live {
                self.slide(follower, -(len as isize));
            }
        }
        self.data_used.set(self.data_used.get() - len);
    }
}

impl Arena for RegionArena {
    unsafe fn allocate(&self, holder: &HolderCell, len: usize) -> Result<(), ArenaError> {
        RegionArena::allocate(self, holder, len)
    }

    fn reallocate(
        &self,
        holder: &HolderCell,
        old_len: usize,
        new_len: usize,
    ) -> Result<(), ArenaError> {
        RegionArena::reallocate(self, holder, old_len, new_len)
    }

    fn deallocate(&self, holder: &HolderCell) -> Result<(), ArenaError> {
        RegionArena::deallocate(self, holder)
    }

    unsafe fn remove_span(
        &self,
        holder: &HolderCell,
        at: *mut u8,
        len: usize,
    ) -> Result<(), ArenaError> {
        RegionArena::remove_span(self, holder, at, len)
    }

    fn live_allocations(&self) -> usize {
        RegionArena::live_allocations(self)
    }

    fn allocation_len(&self, holder: &HolderCell) -> Option<usize> {
        RegionArena::allocation_len(self, holder)
    }
}

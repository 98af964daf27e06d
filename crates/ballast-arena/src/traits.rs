//! The operation surface shared by both arena variants.

use crate::error::ArenaError;
use crate::holder::HolderCell;

/// Common surface of [`crate::RegionArena`] and [`crate::MirroredArena`].
///
/// Containers in `ballast-vec` are generic over this trait so the same
/// container runs over a plain region or a mirrored one. The mirrored
/// variant adds its own integrity operations on top; those are not part
/// of the shared surface because plain regions have nothing to check.
pub trait Arena {
    /// Register `holder` and reserve `len` bytes for it.
    ///
    /// On success `holder` is overwritten with the payload address and
    /// will track it across every later compaction.
    ///
    /// # Safety
    ///
    /// `holder` must stay at the same address, and must not be passed
    /// to another arena, until `deallocate` removes the registration or
    /// the arena is dropped.
    unsafe fn allocate(&self, holder: &HolderCell, len: usize) -> Result<(), ArenaError>;

    /// Resize the allocation currently published through `holder` from
    /// `old_len` to `new_len` bytes.
    fn reallocate(
        &self,
        holder: &HolderCell,
        old_len: usize,
        new_len: usize,
    ) -> Result<(), ArenaError>;

    /// Drop the whole allocation registered under `holder`.
    fn deallocate(&self, holder: &HolderCell) -> Result<(), ArenaError>;

    /// Remove `len` bytes starting at `at` from `holder`'s allocation.
    ///
    /// # Safety
    ///
    /// `at` must lie within `holder`'s allocation and, after clamping
    /// `len` to the allocation size, `at + len` must not pass its end.
    unsafe fn remove_span(
        &self,
        holder: &HolderCell,
        at: *mut u8,
        len: usize,
    ) -> Result<(), ArenaError>;

    /// Number of live allocations.
    fn live_allocations(&self) -> usize;

    /// Payload length registered under `holder`, if live.
    fn allocation_len(&self, holder: &HolderCell) -> Option<usize>;
}

//! Holder cells: the client-owned pointer slots the arena rewrites.
//!
//! A [`HolderCell`] plays both roles of the back-reference scheme: its
//! *address* is the identity key the arena stores in the descriptor, and
//! its *value* is the allocation's current payload address, which the
//! arena rewrites on every compaction slide. Reading the cell after any
//! arena call on the same thread observes the post-operation address.

use std::cell::UnsafeCell;
use std::fmt;
use std::ptr;

/// A client-owned pointer slot naming one allocation.
///
/// From `allocate` until `deallocate` the cell must stay at the same
/// address — the arena has no other way to reach it. Containers that
/// need to stay movable keep their cell behind a `Box`, as
/// `ballast-vec` does; plain clients can keep it in a stack or static
/// variable that outlives the registration.
///
/// The cell is not `Clone`: a copy would claim the same allocation
/// under a different identity key.
pub struct HolderCell {
    slot: UnsafeCell<*mut u8>,
}

impl HolderCell {
    /// Create an unbound holder (null payload address).
    pub fn new() -> Self {
        Self {
            slot: UnsafeCell::new(ptr::null_mut()),
        }
    }

    /// Current payload address, or null when the cell has never been
    /// bound.
    pub fn get(&self) -> *mut u8 {
        // The arena only writes the slot from the same thread, inside
        // arena calls; the cell is !Sync, so no torn reads are possible.
        unsafe { *self.slot.get() }
    }

    /// Whether the cell has never been bound to an allocation.
    pub fn is_null(&self) -> bool {
        self.get().is_null()
    }

    /// Address of the slot word itself — the arena's identity key.
    pub(crate) fn key(&self) -> usize {
        self.slot.get() as usize
    }

    /// Overwrite the payload address.
    pub(crate) fn set(&self, data: *mut u8) {
        unsafe { *self.slot.get() = data }
    }
}

impl Default for HolderCell {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HolderCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HolderCell")
            .field("key", &(self.key() as *const u8))
            .field("data", &self.get())
            .finish()
    }
}

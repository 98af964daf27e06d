//! The descriptor table packed below the window's top edge.
//!
//! Each live allocation is described by a triple of machine words stored
//! downward from `hi`, oldest allocation closest to `hi`:
//!
//! ```text
//! hi - 1·WORD : payload address   ┐
//! hi - 2·WORD : payload length    │ entry 0 (oldest)
//! hi - 3·WORD : holder address    ┘
//! hi - 4·WORD : payload address   ┐
//! hi - 5·WORD : payload length    │ entry 1
//! hi - 6·WORD : holder address    ┘
//! ...
//! ```
//!
//! The table lives *inside* the managed window — not on the host heap —
//! so the mirrored variant covers it together with the payload bytes.
//! Words are accessed unaligned: the window can start at any address.

use std::fmt;

/// Machine word size in bytes.
pub const WORD: usize = std::mem::size_of::<usize>();

/// Words per descriptor entry.
pub const ENTRY_WORDS: usize = 3;

/// Bytes per descriptor entry.
pub const ENTRY_BYTES: usize = ENTRY_WORDS * WORD;

// Word offsets below `hi` for entry 0.
const DATA_WORD: usize = 1;
const LEN_WORD: usize = 2;
const HOLDER_WORD: usize = 3;

/// One decoded descriptor entry.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    /// Absolute address of the first payload byte.
    pub data: *mut u8,
    /// Payload length in bytes.
    pub len: usize,
    /// Address of the holder slot registered for this allocation.
    pub holder: usize,
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Descriptor(data={:p}, len={}, holder={:#x})",
            self.data, self.len, self.holder
        )
    }
}

/// Raw view of the descriptor words below `hi`.
///
/// The view holds no state of its own; [`crate::RegionArena`] constructs
/// one per operation from its window bound. All accessors are `unsafe`
/// because the view trusts the caller-supplied entry index to lie within
/// the live table.
#[derive(Clone, Copy)]
pub(crate) struct DescriptorTable {
    hi: *mut u8,
}

impl DescriptorTable {
    pub(crate) fn new(hi: *mut u8) -> Self {
        Self { hi }
    }

    unsafe fn word_ptr(&self, entry: usize, field: usize) -> *mut usize {
        self.hi.sub((entry * ENTRY_WORDS + field) * WORD) as *mut usize
    }

    /// Decode entry `entry`.
    pub(crate) unsafe fn get(&self, entry: usize) -> Descriptor {
        Descriptor {
            data: self.word_ptr(entry, DATA_WORD).read_unaligned() as *mut u8,
            len: self.word_ptr(entry, LEN_WORD).read_unaligned(),
            holder: self.word_ptr(entry, HOLDER_WORD).read_unaligned(),
        }
    }

    /// Encode `desc` into entry `entry`.
    pub(crate) unsafe fn set(&self, entry: usize, desc: Descriptor) {
        self.word_ptr(entry, DATA_WORD)
            .write_unaligned(desc.data as usize);
        self.word_ptr(entry, LEN_WORD).write_unaligned(desc.len);
        self.word_ptr(entry, HOLDER_WORD).write_unaligned(desc.holder);
    }

    pub(crate) unsafe fn set_data(&self, entry: usize, data: *mut u8) {
        self.word_ptr(entry, DATA_WORD).write_unaligned(data as usize);
    }

    pub(crate) unsafe fn set_len(&self, entry: usize, len: usize) {
        self.word_ptr(entry, LEN_WORD).write_unaligned(len);
    }

    /// Find the entry registered under the given holder key.
    pub(crate) unsafe fn find_by_holder(&self, count: usize, key: usize) -> Option<usize> {
        (0..count).find(|&entry| self.word_ptr(entry, HOLDER_WORD).read_unaligned() == key)
    }

    /// Find the entry whose payload address matches `data`.
    pub(crate) unsafe fn find_by_data(&self, count: usize, data: *mut u8) -> Option<usize> {
        (0..count)
            .find(|&entry| self.word_ptr(entry, DATA_WORD).read_unaligned() == data as usize)
    }
}

/// Write a payload address through a registered holder key.
///
/// # Safety
///
/// `key` must be the address of a live [`crate::HolderCell`] slot, as
/// stored by `allocate`. The holder-stability contract makes that
/// address valid for the lifetime of the registration.
pub(crate) unsafe fn write_holder(key: usize, data: *mut u8) {
    *(key as *mut *mut u8) = data;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_window() -> (Vec<u64>, *mut u8) {
        let mut words = vec![0u64; 32];
        let hi = unsafe { (words.as_mut_ptr() as *mut u8).add(32 * 8) };
        (words, hi)
    }

    #[test]
    fn set_then_get_round_trips() {
        let (_words, hi) = make_window();
        let table = DescriptorTable::new(hi);
        let desc = Descriptor {
            data: 0x1000 as *mut u8,
            len: 48,
            holder: 0x2000,
        };
        unsafe {
            table.set(0, desc);
            assert_eq!(table.get(0), desc);
        }
    }

    #[test]
    fn entries_do_not_overlap() {
        let (_words, hi) = make_window();
        let table = DescriptorTable::new(hi);
        unsafe {
            for entry in 0..4usize {
                table.set(
                    entry,
                    Descriptor {
                        data: (0x1000 + entry * 0x10) as *mut u8,
                        len: entry,
                        holder: 0x2000 + entry,
                    },
                );
            }
            for entry in 0..4usize {
                let d = table.get(entry);
                assert_eq!(d.data as usize, 0x1000 + entry * 0x10);
                assert_eq!(d.len, entry);
                assert_eq!(d.holder, 0x2000 + entry);
            }
        }
    }

    #[test]
    fn entry_zero_sits_just_below_hi() {
        let (words, hi) = make_window();
        let table = DescriptorTable::new(hi);
        unsafe {
            table.set(
                0,
                Descriptor {
                    data: 0xAAAA as *mut u8,
                    len: 0xBBBB,
                    holder: 0xCCCC,
                },
            );
        }
        // Topmost word is the payload address, then length, then holder.
        let n = words.len();
        assert_eq!(words[n - 1], 0xAAAA);
        assert_eq!(words[n - 2], 0xBBBB);
        assert_eq!(words[n - 3], 0xCCCC);
    }

    #[test]
    fn find_by_holder_and_data() {
        let (_words, hi) = make_window();
        let table = DescriptorTable::new(hi);
        unsafe {
            for entry in 0..3usize {
                table.set(
                    entry,
                    Descriptor {
                        data: (0x100 * (entry + 1)) as *mut u8,
                        len: 8,
                        holder: 0x900 + entry,
                    },
                );
            }
            assert_eq!(table.find_by_holder(3, 0x901), Some(1));
            assert_eq!(table.find_by_holder(3, 0x999), None);
            assert_eq!(table.find_by_data(3, 0x300 as *mut u8), Some(2));
            assert_eq!(table.find_by_data(3, 0x400 as *mut u8), None);
        }
    }

    #[test]
    fn unaligned_hi_still_round_trips() {
        let mut words = vec![0u64; 33];
        // Offset the window top by one byte so every word access is
        // unaligned.
        let hi = unsafe { (words.as_mut_ptr() as *mut u8).add(32 * 8 + 1) };
        let table = DescriptorTable::new(hi);
        let desc = Descriptor {
            data: 0x1234_5678 as *mut u8,
            len: 99,
            holder: 0x9ABC_DEF0,
        };
        unsafe {
            table.set(0, desc);
            assert_eq!(table.get(0), desc);
        }
    }
}

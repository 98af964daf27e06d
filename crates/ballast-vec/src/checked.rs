//! The integrity-checking sequence over a mirrored arena.

use std::cell::Cell;
use std::marker::PhantomData;
use std::mem;

use ballast_arena::{HolderCell, MirroredArena};

use crate::error::SequenceError;

/// A [`crate::Sequence`]-shaped container that verifies its arena before
/// every read and refreshes the mirror after every successful write.
///
/// The discipline per operation:
/// - reads (`get`, `at`, iteration) run
///   [`MirroredArena::check_consistency`] first; one-sided damage heals
///   silently, two-sided damage latches `read_inconsistent` and refuses.
/// - writes (`push`, `resize`, `erase`, `set`) check first, mutate, then
///   [`MirroredArena::update_mirror`], so the window is always either
///   mirrored or mid-operation.
///
/// The two sticky flags separate the failure directions: a refused
/// arena write latches `write_failed`, a failed consistency check
/// latches `read_inconsistent`. [`CheckedSequence::is_jeopardized`]
/// reports their disjunction and clears only by rebuilding the
/// sequence.
pub struct CheckedSequence<'a, T: Copy> {
    arena: &'a MirroredArena,
    holder: Box<HolderCell>,
    len: usize,
    write_failed: bool,
    read_inconsistent: Cell<bool>,
    _elems: PhantomData<T>,
}

impl<'a, T: Copy> CheckedSequence<'a, T> {
    /// Create an empty checked sequence over `arena`.
    pub fn new(arena: &'a MirroredArena) -> Self {
        Self {
            arena,
            holder: Box::new(HolderCell::new()),
            len: 0,
            write_failed: false,
            read_inconsistent: Cell::new(false),
            _elems: PhantomData,
        }
    }

    /// Create a checked sequence initialised from `items`.
    pub fn from_slice(arena: &'a MirroredArena, items: &[T]) -> Self {
        let mut seq = Self::new(arena);
        for &item in items {
            if seq.push(item).is_err() {
                break;
            }
        }
        seq
    }

    /// Append `value` at the end of the sequence.
    pub fn push(&mut self, value: T) -> Result<(), SequenceError> {
        self.verify()?;
        self.grow_bytes(mem::size_of::<T>())?;
        unsafe { self.element_ptr(self.len).write_unaligned(value) };
        self.len += 1;
        self.arena.update_mirror();
        Ok(())
    }

    /// Append every element of `other`.
    pub fn append(&mut self, other: &CheckedSequence<'_, T>) -> Result<(), SequenceError> {
        for index in 0..other.len() {
            match other.get(index) {
                Some(value) => self.push(value)?,
                None => break,
            }
        }
        Ok(())
    }

    /// Grow the sequence by `additional` elements, default-initialised.
    pub fn resize(&mut self, additional: usize) -> Result<(), SequenceError>
    where
        T: Default,
    {
        self.verify()?;
        self.grow_bytes(additional * mem::size_of::<T>())?;
        for slot in 0..additional {
            unsafe {
                self.element_ptr(self.len + slot)
                    .write_unaligned(T::default());
            }
        }
        self.len += additional;
        self.arena.update_mirror();
        Ok(())
    }

    /// Remove the element at `index`, shifting everything after it down.
    pub fn erase(&mut self, index: usize) -> Result<(), SequenceError> {
        if index >= self.len {
            return Err(SequenceError::OutOfBounds {
                index,
                len: self.len,
            });
        }
        self.verify()?;
        let at = self.element_ptr(index) as *mut u8;
        match unsafe { self.arena.remove_span(&self.holder, at, mem::size_of::<T>()) } {
            Ok(()) => {
                self.len -= 1;
                self.arena.update_mirror();
                Ok(())
            }
            Err(err) => {
                self.write_failed = true;
                Err(SequenceError::Arena(err))
            }
        }
    }

    /// The element at `index`, or `None` past the end or when the
    /// arena's integrity cannot be established.
    pub fn get(&self, index: usize) -> Option<T> {
        if index >= self.len || self.verify().is_err() {
            return None;
        }
        Some(unsafe { (self.element_ptr(index) as *const T).read_unaligned() })
    }

    /// The element at `index`, with the refusal reason on failure.
    pub fn at(&self, index: usize) -> Result<T, SequenceError> {
        if index >= self.len {
            return Err(SequenceError::OutOfBounds {
                index,
                len: self.len,
            });
        }
        self.verify()?;
        Ok(unsafe { (self.element_ptr(index) as *const T).read_unaligned() })
    }

    /// Overwrite the element at `index`.
    pub fn set(&mut self, index: usize, value: T) -> Result<(), SequenceError> {
        if index >= self.len {
            return Err(SequenceError::OutOfBounds {
                index,
                len: self.len,
            });
        }
        self.verify()?;
        unsafe { self.element_ptr(index).write_unaligned(value) };
        self.arena.update_mirror();
        Ok(())
    }

    /// Iterate over the elements by value.
    ///
    /// Iteration stops early if the arena's integrity is lost mid-walk.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.len).map_while(move |index| self.get(index))
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the sequence holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether any write was refused or any consistency check failed.
    pub fn is_jeopardized(&self) -> bool {
        self.write_failed || self.read_inconsistent.get()
    }

    /// Sticky flag: a push, resize, or erase was refused by the arena.
    pub fn write_failed(&self) -> bool {
        self.write_failed
    }

    /// Sticky flag: a consistency check found unrecoverable damage.
    pub fn read_inconsistent(&self) -> bool {
        self.read_inconsistent.get()
    }

    /// A fresh checked sequence over the same arena with the same
    /// contents.
    pub fn duplicate(&self) -> CheckedSequence<'a, T> {
        let mut copy = CheckedSequence::new(self.arena);
        for value in self.iter() {
            if copy.push(value).is_err() {
                break;
            }
        }
        copy
    }

    fn verify(&self) -> Result<(), SequenceError> {
        match self.arena.check_consistency() {
            Ok(_) => Ok(()),
            Err(err) => {
                self.read_inconsistent.set(true);
                Err(SequenceError::Arena(err))
            }
        }
    }

    fn element_ptr(&self, index: usize) -> *mut T {
        unsafe { self.holder.get().add(index * mem::size_of::<T>()) as *mut T }
    }

    fn grow_bytes(&mut self, additional: usize) -> Result<(), SequenceError> {
        let old_bytes = self.len * mem::size_of::<T>();
        let result = if self.arena.allocation_len(&self.holder).is_none() {
            unsafe { self.arena.allocate(&self.holder, old_bytes + additional) }
        } else {
            self.arena
                .reallocate(&self.holder, old_bytes, old_bytes + additional)
        };
        result.map_err(|err| {
            self.write_failed = true;
            SequenceError::Arena(err)
        })
    }
}

impl<T: Copy> crate::Container for CheckedSequence<'_, T> {
    fn len(&self) -> usize {
        CheckedSequence::len(self)
    }

    fn is_jeopardized(&self) -> bool {
        CheckedSequence::is_jeopardized(self)
    }
}

impl<T: Copy> Drop for CheckedSequence<'_, T> {
    fn drop(&mut self) {
        // Refresh the mirror only when something was actually removed,
        // so sibling sequences on the same arena keep checking clean.
        if self.arena.deallocate(&self.holder).is_ok() {
            self.arena.update_mirror();
        }
    }
}

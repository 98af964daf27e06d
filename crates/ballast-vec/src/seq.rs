//! The arena-backed sequence container.

use std::marker::PhantomData;
use std::mem;

use ballast_arena::{Arena, HolderCell, RegionArena};

use crate::error::SequenceError;

/// A growable array of `T` whose buffer lives inside an arena window.
///
/// The sequence owns a single [`HolderCell`] behind a `Box`; the cell's
/// address is the arena's identity key for the buffer and its value is
/// the buffer's current location. Because the box pins the cell, the
/// sequence itself may move freely while the allocation is live.
///
/// `T` must be trivially relocatable: the arena slides payload bytes
/// with a plain byte copy, so a valid `T` must remain valid after a
/// `memcpy`. `T: Copy` enforces that (types with drop glue or
/// address-dependent identity are rejected at compile time). Elements
/// are packed with no padding and accessed unaligned; they are returned
/// *by value* — a reference into the window could dangle the moment a
/// sibling sequence on the same arena grows.
///
/// A failed write latches the sticky `write_failed` flag, reported by
/// [`Sequence::is_jeopardized`]; the flag clears only by rebuilding the
/// sequence.
pub struct Sequence<'a, T: Copy, A: Arena = RegionArena> {
    arena: &'a A,
    holder: Box<HolderCell>,
    len: usize,
    write_failed: bool,
    _elems: PhantomData<T>,
}

impl<'a, T: Copy, A: Arena> Sequence<'a, T, A> {
    /// Create an empty sequence over `arena`.
    ///
    /// Nothing is allocated until the first push or resize.
    pub fn new(arena: &'a A) -> Self {
        Self {
            arena,
            holder: Box::new(HolderCell::new()),
            len: 0,
            write_failed: false,
            _elems: PhantomData,
        }
    }

    /// Create a sequence initialised from `items`.
    ///
    /// Pushes each element in turn; a refused push latches the jeopardy
    /// flag and leaves the remaining items unpushed.
    pub fn from_slice(arena: &'a A, items: &[T]) -> Self {
        let mut seq = Self::new(arena);
        for &item in items {
            if seq.push(item).is_err() {
                break;
            }
        }
        seq
    }

    /// Append `value` at the end of the sequence.
    ///
    /// The first push allocates; later pushes grow-reallocate, which may
    /// move this buffer and every later allocation in the arena. On
    /// refusal the arena is unchanged, the jeopardy flag latches, and
    /// the error is returned.
    pub fn push(&mut self, value: T) -> Result<(), SequenceError> {
        self.grow_bytes(mem::size_of::<T>())?;
        unsafe { self.element_ptr(self.len).write_unaligned(value) };
        self.len += 1;
        Ok(())
    }

    /// Append every element of `other`.
    ///
    /// Elements are pushed one at a time; `other` may live on the same
    /// arena (its buffer address is re-read through its holder after
    /// every push).
    pub fn append(&mut self, other: &Sequence<'_, T, A>) -> Result<(), SequenceError> {
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
        self.grow_bytes(additional * mem::size_of::<T>())?;
        for slot in 0..additional {
            unsafe {
                self.element_ptr(self.len + slot)
                    .write_unaligned(T::default());
            }
        }
        self.len += additional;
        Ok(())
    }

    /// Remove the element at `index`, shifting everything after it down.
    ///
    /// An out-of-range index is refused without touching any state and
    /// without latching the jeopardy flag.
    pub fn erase(&mut self, index: usize) -> Result<(), SequenceError> {
        if index >= self.len {
            return Err(SequenceError::OutOfBounds {
                index,
                len: self.len,
            });
        }
        let at = self.element_ptr(index) as *mut u8;
        match unsafe { self.arena.remove_span(&self.holder, at, mem::size_of::<T>()) } {
            Ok(()) => {
                self.len -= 1;
                Ok(())
            }
            Err(err) => {
                self.write_failed = true;
                Err(SequenceError::Arena(err))
            }
        }
    }

    /// The element at `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<T> {
        if index >= self.len {
            return None;
        }
        Some(unsafe { (self.element_ptr(index) as *const T).read_unaligned() })
    }

    /// The element at `index`, or `OutOfBounds` past the end.
    pub fn at(&self, index: usize) -> Result<T, SequenceError> {
        self.get(index).ok_or(SequenceError::OutOfBounds {
            index,
            len: self.len,
        })
    }

    /// Overwrite the element at `index`.
    pub fn set(&mut self, index: usize, value: T) -> Result<(), SequenceError> {
        if index >= self.len {
            return Err(SequenceError::OutOfBounds {
                index,
                len: self.len,
            });
        }
        unsafe { self.element_ptr(index).write_unaligned(value) };
        Ok(())
    }

    /// Iterate over the elements by value.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.len).filter_map(move |index| self.get(index))
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the sequence holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether any write has been refused since construction.
    pub fn is_jeopardized(&self) -> bool {
        self.write_failed
    }

    /// Sticky flag: a push, resize, or erase was refused by the arena.
    pub fn write_failed(&self) -> bool {
        self.write_failed
    }

    /// A fresh sequence over the same arena with the same contents.
    ///
    /// The copy registers its own holder; a refused push while copying
    /// latches the copy's jeopardy flag, never this sequence's.
    pub fn duplicate(&self) -> Sequence<'a, T, A> {
        let mut copy = Sequence::new(self.arena);
        for value in self.iter() {
            if copy.push(value).is_err() {
                break;
            }
        }
        copy
    }

    fn element_ptr(&self, index: usize) -> *mut T {
        unsafe { self.holder.get().add(index * mem::size_of::<T>()) as *mut T }
    }

    fn grow_bytes(&mut self, additional: usize) -> Result<(), SequenceError> {
        let old_bytes = self.len * mem::size_of::<T>();
        // The holder is live unless the sequence never allocated or was
        // erased down to nothing; asking the arena is authoritative.
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

impl<T: Copy, A: Arena> crate::Container for Sequence<'_, T, A> {
    fn len(&self) -> usize {
        Sequence::len(self)
    }

    fn is_jeopardized(&self) -> bool {
        Sequence::is_jeopardized(self)
    }
}

impl<T: Copy, A: Arena> Drop for Sequence<'_, T, A> {
    fn drop(&mut self) {
        // A sequence that never allocated, or whose last element was
        // erased, has no descriptor; NotFound is the expected outcome
        // then.
        let _ = self.arena.deallocate(&self.holder);
    }
}

//! Dynamic sequence containers backed by ballast region arenas.
//!
//! A [`Sequence`] is a growable array whose buffer lives inside an
//! arena window rather than on the host heap. The arena keeps the
//! sequence's buffer pointer current across compaction by writing
//! through the sequence's holder cell, so every push, resize, and erase
//! is prepared for its buffer address to change as a side effect.
//!
//! [`CheckedSequence`] is the integrity-checking variant over
//! [`ballast_arena::MirroredArena`]: every read verifies the mirror
//! first and every successful write refreshes it.
//!
//! This crate contains no `unsafe` API surface — the raw-window work
//! happens in `ballast-arena`; the containers uphold the holder
//! contracts by pinning their cells behind a `Box`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod checked;
pub mod container;
pub mod error;
pub mod seq;

pub use checked::CheckedSequence;
pub use container::Container;
pub use error::SequenceError;
pub use seq::Sequence;

//! Non-fragmenting region arenas for the ballast allocator.
//!
//! Provides the two arena variants: [`RegionArena`], a compacting
//! allocator over a caller-supplied byte window, and [`MirroredArena`],
//! which halves its window to keep a bit-inverted, CRC-checked shadow of
//! the live region. Holders of allocations survive compaction because
//! the arena rewrites their [`HolderCell`] on every move.
//!
//! This crate is one of two that contain `unsafe` code (along with
//! `ballast-core`): the arenas work directly on raw byte windows whose
//! layout — payloads and descriptor words alike — must be visible to the
//! mirroring machinery.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod descriptor;
pub mod error;
pub mod holder;
pub mod map;
pub mod mirror;
pub mod region;
pub mod traits;

pub use descriptor::{Descriptor, ENTRY_BYTES, WORD};
pub use error::ArenaError;
pub use holder::HolderCell;
pub use map::{ArenaMap, MapEntry};
pub use mirror::{Consistency, MirrorState, MirroredArena};
pub use region::RegionArena;
pub use traits::Arena;

//! Ballast: a non-fragmenting region allocator with mirrored integrity
//! protection.
//!
//! Ballast manages variable-sized allocations inside a fixed,
//! caller-supplied byte window — a linker section, a static buffer, a
//! stack array — without ever producing external fragmentation: the
//! free region is kept contiguous by sliding live allocations on every
//! grow, shrink, and free, and holders of allocations survive those
//! moves because the arena rewrites their pointer cells in place. The
//! mirrored variant halves the window to keep a bit-inverted,
//! CRC-checked shadow that can repair single-sided corruption on
//! demand.
//!
//! This is the facade crate re-exporting the public API from the
//! ballast sub-crates; adding `ballast` as a single dependency is
//! sufficient for most users.
//!
//! # Quick start
//!
//! ```rust
//! use ballast::prelude::*;
//!
//! // Any fixed byte window works; here, a stack buffer.
//! let mut backing = [0u8; 512];
//! let lo = backing.as_mut_ptr();
//! let arena = unsafe { RegionArena::new(lo, lo.add(backing.len())) };
//!
//! let mut primes: Sequence<'_, u32> = Sequence::new(&arena);
//! primes.push(2).unwrap();
//! primes.push(3).unwrap();
//! primes.push(5).unwrap();
//!
//! // A second client on the same arena; growing it slides `primes`,
//! // whose buffer pointer is fixed up behind the scenes.
//! let squares = Sequence::from_slice(&arena, &[1u64, 4, 9, 16]);
//!
//! assert_eq!(primes.iter().collect::<Vec<_>>(), vec![2, 3, 5]);
//! assert_eq!(squares.len(), 4);
//! assert_eq!(arena.live_allocations(), 2);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for items not in
//! the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`arena`] | `ballast-arena` | `RegionArena`, `MirroredArena`, holders, errors |
//! | [`mem`] | `ballast-core` | byte-copy primitives and CRC-32 |
//! | [`vec`] | `ballast-vec` | `Sequence`, `CheckedSequence` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Arenas, holder cells, and arena errors (`ballast-arena`).
///
/// Most users only need [`arena::RegionArena`] or
/// [`arena::MirroredArena`] from this module — both are also available
/// in the [`prelude`].
pub use ballast_arena as arena;

/// Byte-copy primitives and CRC-32 (`ballast-core`).
///
/// The overlap-safe [`mem::memops::copy`], the mirror's
/// [`mem::memops::copy_inverted`], and [`mem::crc32::crc32_bytes`].
pub use ballast_core as mem;

/// Arena-backed sequence containers (`ballast-vec`).
///
/// [`vec::Sequence`] for plain regions, [`vec::CheckedSequence`] for
/// the consistency-checking discipline over a mirrored arena.
pub use ballast_vec as vec;

/// Common imports for typical ballast usage.
///
/// ```rust
/// use ballast::prelude::*;
/// ```
pub mod prelude {
    pub use ballast_arena::{
        Arena, ArenaError, Consistency, HolderCell, MirrorState, MirroredArena, RegionArena,
    };
    pub use ballast_vec::{CheckedSequence, Container, Sequence, SequenceError};
}

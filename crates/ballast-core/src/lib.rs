//! Byte-level primitives for the ballast region allocator.
//!
//! This is the leaf crate with zero internal ballast dependencies. It
//! holds the raw-memory routines the arenas are built from: an
//! overlap-safe byte copy, the bit-inverted mirror copy, and the CRC-32
//! used by the mirrored arena. This crate is one of two that contain
//! `unsafe` code (along with `ballast-arena`); everything above them is
//! `unsafe`-free.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod crc32;
pub mod memops;

pub use crc32::{crc32, crc32_bytes};
pub use memops::{copy, copy_inverted, mirror_mismatches};

//! Arena-specific error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur during arena operations.
///
/// Every failing operation leaves the arena window byte-for-byte
/// unchanged; these values are the only observable effect of a refusal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The requested allocation or growth does not fit in the window.
    Exhausted {
        /// Number of payload bytes requested.
        requested: usize,
        /// Free bytes remaining between the data and descriptor regions.
        available: usize,
    },
    /// `allocate` was called with a holder address that is already live.
    DuplicateHolder,
    /// No live descriptor matches the given holder or payload address.
    NotFound,
    /// A mirrored arena was constructed over an unusable window.
    InvalidWindow {
        /// The window size in bytes.
        size: usize,
        /// What made the window unusable.
        reason: &'static str,
    },
    /// Both the primary and the shadow failed their checksums. The
    /// mirrored arena is read-only from this point on.
    IntegrityLost,
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted {
                requested,
                available,
            } => {
                write!(
                    f,
                    "arena exhausted: requested {requested} bytes, {available} bytes free"
                )
            }
            Self::DuplicateHolder => write!(f, "holder address is already registered"),
            Self::NotFound => write!(f, "no live allocation matches the given key"),
            Self::InvalidWindow { size, reason } => {
                write!(f, "unusable window of {size} bytes: {reason}")
            }
            Self::IntegrityLost => {
                write!(f, "both copies failed their checksums; arena is corrupt")
            }
        }
    }
}

impl Error for ArenaError {}

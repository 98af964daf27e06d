//! Sequence-specific error types.

use std::error::Error;
use std::fmt;

use ballast_arena::ArenaError;

/// Errors that can occur during sequence operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequenceError {
    /// An index past the end of the sequence.
    OutOfBounds {
        /// The requested index.
        index: usize,
        /// The sequence length at the time of the call.
        len: usize,
    },
    /// The backing arena refused the operation.
    Arena(ArenaError),
}

impl fmt::Display for SequenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for length {len}")
            }
            Self::Arena(err) => write!(f, "arena operation failed: {err}"),
        }
    }
}

impl Error for SequenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Arena(err) => Some(err),
            Self::OutOfBounds { .. } => None,
        }
    }
}

//! Error types for byte pipeline operations.

use std::fmt;

/// Result type for cursor operations.
pub type CursorResult<T> = Result<T, CursorError>;

/// Errors produced by bounds-checked cursor reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorError {
    /// The input ended before the requested bytes were available.
    EndOfInput {
        /// Number of bytes the read needed.
        requested: usize,
        /// Number of bytes that were available.
        available: usize,
    },
}

impl fmt::Display for CursorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndOfInput {
                requested,
                available,
            } => {
                write!(
                    f,
                    "input ended: requested {requested} bytes, {available} available"
                )
            }
        }
    }
}

impl std::error::Error for CursorError {}

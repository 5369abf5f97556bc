//! Byte pipeline primitives for the rdelta codec.
//!
//! This crate provides the byte-level building blocks the codec streams
//! through: a self-delimiting varint format, a bounds-checked cursor over
//! segmented input, and buffered frame reader/writer halves over any async
//! byte stream.
//!
//! # Design Principles
//!
//! - **Bounded reads** - Every cursor operation is bounds-checked and never
//!   panics on malformed input.
//! - **Fragment tolerant** - Input is consumed as a sequence of segments;
//!   multi-byte reads span segment boundaries without copying.
//! - **No steady-state allocations** - Staging buffers are reused across
//!   packets.

mod cursor;
mod error;
mod reader;
mod varint;
mod writer;

pub use cursor::SegmentCursor;
pub use error::{CursorError, CursorResult};
pub use reader::FrameReader;
pub use varint::{encoded_len, read_varint, write_varint, VarIntRead, MAX_VARINT_LEN};
pub use writer::{FrameWriter, LengthSlot};

//! Bounds-checked read cursor over segmented input.

use bytes::Bytes;

use crate::error::{CursorError, CursorResult};

/// A read cursor over a sequence of byte segments.
///
/// All read operations are bounds-checked and consume nothing on failure,
/// so a caller can retry once more input has been buffered. Multi-byte
/// reads may span segment boundaries; the input is never copied into a
/// contiguous buffer.
#[derive(Debug)]
pub struct SegmentCursor<'a> {
    segments: &'a [Bytes],
    /// Index of the segment the cursor stands in.
    seg: usize,
    /// Offset within the current segment.
    off: usize,
    /// Absolute position from the start of the input.
    pos: usize,
    /// Total input length across all segments.
    len: usize,
}

impl<'a> SegmentCursor<'a> {
    /// Creates a cursor positioned at the start of `segments`.
    #[must_use]
    pub fn new(segments: &'a [Bytes]) -> Self {
        let len = segments.iter().map(Bytes::len).sum();
        let mut cursor = Self {
            segments,
            seg: 0,
            off: 0,
            pos: 0,
            len,
        };
        cursor.skip_exhausted();
        cursor
    }

    /// Returns the absolute read position.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the number of unread bytes.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.len - self.pos
    }

    /// Moves the cursor to an absolute position.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is past the end of the input.
    pub fn rewind_to(&mut self, pos: usize) {
        assert!(pos <= self.len, "rewind past end of input");
        self.seg = 0;
        self.off = 0;
        self.pos = 0;
        self.skip_exhausted();
        self.advance(pos);
    }

    /// Reads a single byte.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::EndOfInput`] if no bytes remain.
    pub fn read_u8(&mut self) -> CursorResult<u8> {
        if self.remaining() == 0 {
            return Err(CursorError::EndOfInput {
                requested: 1,
                available: 0,
            });
        }
        let byte = self.segments[self.seg][self.off];
        self.advance(1);
        Ok(byte)
    }

    /// Copies exactly `dst.len()` bytes into `dst`.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::EndOfInput`] if fewer than `dst.len()` bytes
    /// remain; the cursor is left unchanged in that case.
    pub fn copy_to_slice(&mut self, dst: &mut [u8]) -> CursorResult<()> {
        if dst.len() > self.remaining() {
            return Err(CursorError::EndOfInput {
                requested: dst.len(),
                available: self.remaining(),
            });
        }
        let mut copied = 0;
        while copied < dst.len() {
            let segment = &self.segments[self.seg];
            let take = (dst.len() - copied).min(segment.len() - self.off);
            dst[copied..copied + take].copy_from_slice(&segment[self.off..self.off + take]);
            copied += take;
            self.advance(take);
        }
        Ok(())
    }

    /// Reads a little-endian `u16`.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::EndOfInput`] if fewer than 2 bytes remain.
    pub fn read_u16_le(&mut self) -> CursorResult<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    /// Reads a little-endian `u32`.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::EndOfInput`] if fewer than 4 bytes remain.
    pub fn read_u32_le(&mut self) -> CursorResult<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// Reads a little-endian `u64`.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::EndOfInput`] if fewer than 8 bytes remain.
    pub fn read_u64_le(&mut self) -> CursorResult<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    /// Reads a single signed byte.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::EndOfInput`] if no bytes remain.
    pub fn read_i8(&mut self) -> CursorResult<i8> {
        Ok(self.read_u8()? as i8)
    }

    /// Reads a little-endian `i16`.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::EndOfInput`] if fewer than 2 bytes remain.
    pub fn read_i16_le(&mut self) -> CursorResult<i16> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    /// Reads a little-endian `i32`.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::EndOfInput`] if fewer than 4 bytes remain.
    pub fn read_i32_le(&mut self) -> CursorResult<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    /// Reads a little-endian `i64`.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::EndOfInput`] if fewer than 8 bytes remain.
    pub fn read_i64_le(&mut self) -> CursorResult<i64> {
        Ok(i64::from_le_bytes(self.read_array()?))
    }

    fn read_array<const N: usize>(&mut self) -> CursorResult<[u8; N]> {
        let mut buf = [0u8; N];
        self.copy_to_slice(&mut buf)?;
        Ok(buf)
    }

    /// Moves forward by `n` bytes. Callers guarantee `n <= remaining()`.
    fn advance(&mut self, mut n: usize) {
        self.pos += n;
        while n > 0 {
            let seg_remaining = self.segments[self.seg].len() - self.off;
            if n < seg_remaining {
                self.off += n;
                n = 0;
            } else {
                n -= seg_remaining;
                self.seg += 1;
                self.off = 0;
            }
        }
        self.skip_exhausted();
    }

    /// Steps over exhausted and empty segments so that, whenever bytes
    /// remain, `segments[seg][off]` is the next byte.
    fn skip_exhausted(&mut self) {
        while self.seg < self.segments.len() && self.off == self.segments[self.seg].len() {
            self.seg += 1;
            self.off = 0;
        }
    }
}

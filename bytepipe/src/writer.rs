//! Buffered writer over an async byte sink.

use std::io;

use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// A handle to a reserved little-endian `u32` slot in the write buffer.
///
/// Created by [`FrameWriter::reserve_u32`] and redeemed with
/// [`FrameWriter::patch_u32`] once the final value is known. Slots are
/// only valid until the next [`FrameWriter::flush`].
#[derive(Debug, Clone, Copy)]
#[must_use]
pub struct LengthSlot(usize);

/// A buffered writer that accumulates packet bytes before flushing.
///
/// The staging buffer is recycled across flushes, so steady-state writing
/// does not allocate.
#[derive(Debug)]
pub struct FrameWriter<W> {
    sink: W,
    buf: BytesMut,
    flushed: u64,
}

impl<W> FrameWriter<W> {
    /// Creates a writer with an empty staging buffer.
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            buf: BytesMut::new(),
            flushed: 0,
        }
    }

    /// Creates a writer with a pre-allocated staging buffer.
    pub fn with_capacity(sink: W, capacity: usize) -> Self {
        Self {
            sink,
            buf: BytesMut::with_capacity(capacity),
            flushed: 0,
        }
    }

    /// Returns the number of buffered, unflushed bytes.
    #[must_use]
    pub fn unflushed(&self) -> usize {
        self.buf.len()
    }

    /// Returns the total number of bytes written to the sink so far.
    #[must_use]
    pub fn flushed(&self) -> u64 {
        self.flushed
    }

    /// Reserves a 4-byte little-endian slot at the current position.
    ///
    /// The slot is zero-filled until patched.
    pub fn reserve_u32(&mut self) -> LengthSlot {
        let slot = LengthSlot(self.buf.len());
        self.buf.put_u32_le(0);
        slot
    }

    /// Patches a previously reserved slot with `value`.
    pub fn patch_u32(&mut self, slot: LengthSlot, value: u32) {
        self.buf[slot.0..slot.0 + 4].copy_from_slice(&value.to_le_bytes());
    }

    /// Exposes the staging buffer for direct serialization.
    pub fn buffer_mut(&mut self) -> &mut BytesMut {
        &mut self.buf
    }

    /// Consumes the writer, returning the underlying sink.
    pub fn into_inner(self) -> W {
        self.sink
    }
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    /// Writes all buffered bytes to the sink and flushes it.
    ///
    /// The staging buffer is cleared but keeps its capacity.
    ///
    /// # Errors
    ///
    /// Propagates any I/O error from the sink; buffered bytes are retained
    /// on failure.
    pub async fn flush(&mut self) -> io::Result<()> {
        if !self.buf.is_empty() {
            self.sink.write_all(&self.buf).await?;
            self.flushed += self.buf.len() as u64;
            self.buf.clear();
        }
        self.sink.flush().await
    }
}

//! The delta compression engine.

use std::marker::PhantomData;
use std::mem;

use bytepipe::{read_varint, write_varint, FrameReader, FrameWriter, SegmentCursor, VarIntRead};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::trace;

use crate::contract::{ContextCodec, RecordCodec};
use crate::error::{CodecError, CodecResult};

/// Outcome of one packet-parse attempt.
enum PacketStep {
    /// A whole packet was parsed and applied; the cursor stands at `end`.
    Complete { end: usize },
    /// The buffered input ends mid-packet; the cursor was rewound to the
    /// packet start.
    NeedMore,
}

/// Delta compression engine for a fixed-length array of records.
///
/// The engine owns two snapshot arrays of identical length: `baseline`
/// (the state as of the last transmission) and `working` (the latest
/// known state). Encoding diffs a new snapshot against the baseline and
/// then swaps the two arrays instead of copying; decoding applies packets
/// to `working` in place, one whole packet at a time.
///
/// Both arrays are allocated once at construction and reused for the
/// engine's lifetime. A single engine must not be driven by more than one
/// task at a time.
pub struct DeltaCompressor<R, X>
where
    R: RecordCodec,
    X: ContextCodec<Context = R::Context>,
{
    baseline: Vec<R::Record>,
    working: Vec<R::Record>,
    _context: PhantomData<X>,
}

impl<R, X> std::fmt::Debug for DeltaCompressor<R, X>
where
    R: RecordCodec,
    X: ContextCodec<Context = R::Context>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeltaCompressor")
            .field("len", &self.baseline.len())
            .finish()
    }
}

impl<R, X> DeltaCompressor<R, X>
where
    R: RecordCodec,
    X: ContextCodec<Context = R::Context>,
{
    /// Creates an engine for snapshots of `len` records, all
    /// default-valued.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::EmptyState`] if `len` is zero.
    pub fn new(len: usize) -> CodecResult<Self> {
        if len == 0 {
            return Err(CodecError::EmptyState);
        }
        Ok(Self {
            baseline: vec![R::Record::default(); len],
            working: vec![R::Record::default(); len],
            _context: PhantomData,
        })
    }

    /// Returns the number of records per snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.working.len()
    }

    /// Copies `state` into both snapshot arrays.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::StateLengthMismatch`] without mutating
    /// anything if `state` has the wrong length.
    pub fn set_initial_state(&mut self, state: &[R::Record]) -> CodecResult<()> {
        self.check_len(state)?;
        self.working.copy_from_slice(state);
        self.baseline.copy_from_slice(state);
        Ok(())
    }

    /// Returns the working snapshot.
    ///
    /// The view reflects the latest encode or decode; it goes stale at the
    /// next engine call.
    #[must_use]
    pub fn current_state(&self) -> &[R::Record] {
        &self.working
    }

    /// Copies the working snapshot into the baseline.
    ///
    /// Required between a decode and a re-encode on the same engine (relay
    /// use): decoding never touches the baseline, so without this the next
    /// [`write_packet`](Self::write_packet) would diff against the
    /// pre-decode baseline and emit an empty delta.
    pub fn advance_baseline(&mut self) {
        self.baseline.copy_from_slice(&self.working);
    }

    /// Encodes the delta from the baseline to `new_state` into `writer`
    /// and flushes it.
    ///
    /// The packet always carries the context, even when no record changed.
    /// On success `baseline` and `working` have been swapped, so the
    /// just-sent snapshot is the baseline for the next diff.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::StateLengthMismatch`] before any byte is
    /// written if `new_state` has the wrong length, and
    /// [`CodecError::Io`] if the flush fails.
    pub async fn write_packet<W>(
        &mut self,
        writer: &mut FrameWriter<W>,
        new_state: &[R::Record],
        ctx: &R::Context,
    ) -> CodecResult<()>
    where
        W: AsyncWrite + Unpin,
    {
        self.check_len(new_state)?;
        self.working.copy_from_slice(new_state);

        let slot = writer.reserve_u32();
        let body_start = writer.unflushed();
        X::write(ctx, writer.buffer_mut());

        let mut entries = 0usize;
        for (index, (current, baseline)) in self.working.iter().zip(&self.baseline).enumerate() {
            let mask = R::change_mask(current, baseline, ctx);
            if mask == 0 {
                continue;
            }
            let out = writer.buffer_mut();
            write_varint(out, index as u64);
            write_varint(out, mask);
            R::write_delta(current, out, mask);
            entries += 1;
        }

        let body_len = writer.unflushed() - body_start;
        writer.patch_u32(slot, body_len as u32);
        mem::swap(&mut self.baseline, &mut self.working);

        trace!(entries, body_len, "encoded delta packet");
        writer.flush().await?;
        Ok(())
    }

    /// Applies every complete packet arriving on `reader` until the
    /// upstream completes.
    ///
    /// Each packet commits atomically: a packet that is only partially
    /// buffered mutates nothing until the rest arrives. Incomplete
    /// trailing bytes at end of input are discarded without error.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::VarIntOverflow`] or
    /// [`CodecError::IndexOutOfRange`] on malformed input, and
    /// [`CodecError::Io`] if the underlying read fails. Packets applied
    /// before the failure stay applied.
    pub async fn apply_packet<S>(&mut self, reader: &mut FrameReader<S>) -> CodecResult<()>
    where
        S: AsyncRead + Unpin,
    {
        loop {
            reader.fill().await?;
            let completed = reader.is_completed();

            let consumed = {
                let mut cursor = SegmentCursor::new(reader.segments());
                let mut consumed = 0;
                loop {
                    match self.try_read_packet(&mut cursor)? {
                        PacketStep::Complete { end } => consumed = end,
                        PacketStep::NeedMore => break,
                    }
                }
                consumed
            };
            reader.consume(consumed);

            if completed {
                return Ok(());
            }
        }
    }

    /// Attempts to parse and apply one packet at the cursor.
    ///
    /// Any short read rewinds the cursor to the packet start, so the next
    /// attempt reparses the whole packet once more bytes have arrived; the
    /// unit of atomicity is the packet.
    fn try_read_packet(&mut self, cursor: &mut SegmentCursor<'_>) -> CodecResult<PacketStep> {
        let start = cursor.position();

        let body_len = match cursor.read_u32_le() {
            Ok(len) => len as usize,
            Err(_) => {
                cursor.rewind_to(start);
                return Ok(PacketStep::NeedMore);
            }
        };
        if cursor.remaining() < body_len {
            cursor.rewind_to(start);
            return Ok(PacketStep::NeedMore);
        }

        let body_start = cursor.position();
        if cursor.remaining() < X::SIZE {
            // Can only happen when the declared body is shorter than a
            // context; the packet is unusable and stays pending.
            cursor.rewind_to(start);
            return Ok(PacketStep::NeedMore);
        }
        let ctx = match X::read(cursor) {
            Ok(ctx) => ctx,
            Err(_) => {
                cursor.rewind_to(start);
                return Ok(PacketStep::NeedMore);
            }
        };

        while cursor.position() - body_start < body_len {
            let index = match read_varint(cursor) {
                VarIntRead::Value(index) => index,
                VarIntRead::NeedMore => {
                    cursor.rewind_to(start);
                    return Ok(PacketStep::NeedMore);
                }
                VarIntRead::Overflow => return Err(CodecError::VarIntOverflow),
            };
            let mask = match read_varint(cursor) {
                VarIntRead::Value(mask) => mask,
                VarIntRead::NeedMore => {
                    cursor.rewind_to(start);
                    return Ok(PacketStep::NeedMore);
                }
                VarIntRead::Overflow => return Err(CodecError::VarIntOverflow),
            };
            if index >= self.working.len() as u64 {
                return Err(CodecError::IndexOutOfRange {
                    index,
                    len: self.working.len(),
                });
            }
            let payload = R::delta_size(mask);
            if cursor.remaining() < payload {
                cursor.rewind_to(start);
                return Ok(PacketStep::NeedMore);
            }
            let record = &mut self.working[index as usize];
            if R::apply_delta(record, cursor, mask).is_err() {
                cursor.rewind_to(start);
                return Ok(PacketStep::NeedMore);
            }
        }

        for record in &mut self.working {
            R::apply_context(record, &ctx);
        }

        trace!(body_len, "applied delta packet");
        Ok(PacketStep::Complete {
            end: cursor.position(),
        })
    }

    fn check_len(&self, state: &[R::Record]) -> CodecResult<()> {
        if state.len() != self.working.len() {
            return Err(CodecError::StateLengthMismatch {
                expected: self.working.len(),
                found: state.len(),
            });
        }
        Ok(())
    }
}

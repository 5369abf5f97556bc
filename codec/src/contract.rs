//! Serializer contracts for records and packet contexts.

use bytepipe::{CursorError, SegmentCursor};
use bytes::BytesMut;

/// Per-record delta serializer.
///
/// Implementations define the mapping between change-mask bits and record
/// fields, and the fixed order flagged fields are serialized in. Both must
/// be identical on the two ends of a link.
///
/// All operations are associated functions on plain data, so the engine's
/// per-entry calls compile to direct, inlinable code.
pub trait RecordCodec {
    /// The record value replicated by the engine.
    type Record: Copy + Default;

    /// Packet-wide context applied to every record on decode.
    type Context;

    /// Computes the change mask of `new` against `old`.
    ///
    /// Returns 0 iff all user-visible fields are equal. The context may
    /// force bits on (e.g. a periodic full-field resync).
    fn change_mask(new: &Self::Record, old: &Self::Record, ctx: &Self::Context) -> u64;

    /// Returns the exact payload size in bytes for `mask`.
    ///
    /// A pure function of the mask alone. Must equal the byte count
    /// [`write_delta`](Self::write_delta) emits for the same mask; the
    /// decoder validates availability against this before committing any
    /// state.
    fn delta_size(mask: u64) -> usize;

    /// Writes the fields flagged in `mask`, in the serializer's fixed
    /// order. No mask or length prefix is written here.
    fn write_delta(record: &Self::Record, out: &mut BytesMut, mask: u64);

    /// Reads the fields flagged in `mask` and assigns them in place.
    ///
    /// Consumes exactly [`delta_size`](Self::delta_size)`(mask)` bytes.
    /// Fields not flagged in `mask` are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::EndOfInput`] if the cursor runs short; the
    /// engine guarantees availability beforehand, and treats a short read
    /// here as an incomplete packet.
    fn apply_delta(
        record: &mut Self::Record,
        cursor: &mut SegmentCursor<'_>,
        mask: u64,
    ) -> Result<(), CursorError>;

    /// Applies packet-wide context to a record.
    ///
    /// Invoked for every record of the array on every decoded packet,
    /// including records the packet did not update, so packet-wide data
    /// (tick, timestamp) propagates even to idle records.
    fn apply_context(record: &mut Self::Record, ctx: &Self::Context);
}

/// Packet-context serializer with a compile-time-constant size.
pub trait ContextCodec {
    /// The context value carried once per packet.
    type Context;

    /// Serialized size in bytes. [`write`](Self::write) emits exactly this
    /// many bytes and [`read`](Self::read) consumes exactly this many.
    const SIZE: usize;

    /// Writes the context.
    fn write(ctx: &Self::Context, out: &mut BytesMut);

    /// Reads the context.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::EndOfInput`] if fewer than
    /// [`SIZE`](Self::SIZE) bytes remain.
    fn read(cursor: &mut SegmentCursor<'_>) -> Result<Self::Context, CursorError>;
}

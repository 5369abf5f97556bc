//! Demo record and context codecs for the reference simulation.

use bytepipe::{CursorError, SegmentCursor};
use bytes::{BufMut, BytesMut};
use codec::{ContextCodec, RecordCodec};

/// Change-mask bit for [`PlayerState::position_q`].
pub const MASK_POSITION: u64 = 1 << 0;
/// Change-mask bit for [`PlayerState::ammo`].
pub const MASK_AMMO: u64 = 1 << 1;

/// Replicated per-player state.
///
/// `tick` is packet-wide data: it has no change-mask bit and is refreshed
/// on every decoded packet from the context instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerState {
    /// Quantized position along the demo track.
    pub position_q: i32,
    /// Remaining ammunition.
    pub ammo: u16,
    /// Tick of the last packet that covered this record.
    pub tick: u64,
}

/// Packet-wide context: the simulation tick the snapshot belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickContext {
    pub tick: u64,
}

/// Field serializer for [`PlayerState`].
///
/// Fields are serialized in mask-bit order: position first, then ammo,
/// both little-endian.
pub struct StateCodec;

impl RecordCodec for StateCodec {
    type Record = PlayerState;
    type Context = TickContext;

    fn change_mask(new: &PlayerState, old: &PlayerState, _ctx: &TickContext) -> u64 {
        let mut mask = 0;
        if new.position_q != old.position_q {
            mask |= MASK_POSITION;
        }
        if new.ammo != old.ammo {
            mask |= MASK_AMMO;
        }
        mask
    }

    fn delta_size(mask: u64) -> usize {
        let mut size = 0;
        if mask & MASK_POSITION != 0 {
            size += 4;
        }
        if mask & MASK_AMMO != 0 {
            size += 2;
        }
        size
    }

    fn write_delta(record: &PlayerState, out: &mut BytesMut, mask: u64) {
        if mask & MASK_POSITION != 0 {
            out.put_i32_le(record.position_q);
        }
        if mask & MASK_AMMO != 0 {
            out.put_u16_le(record.ammo);
        }
    }

    fn apply_delta(
        record: &mut PlayerState,
        cursor: &mut SegmentCursor<'_>,
        mask: u64,
    ) -> Result<(), CursorError> {
        if mask & MASK_POSITION != 0 {
            record.position_q = cursor.read_i32_le()?;
        }
        if mask & MASK_AMMO != 0 {
            record.ammo = cursor.read_u16_le()?;
        }
        Ok(())
    }

    fn apply_context(record: &mut PlayerState, ctx: &TickContext) {
        record.tick = ctx.tick;
    }
}

/// Context serializer for [`TickContext`]: one little-endian `u64`.
pub struct TickCodec;

impl ContextCodec for TickCodec {
    type Context = TickContext;
    const SIZE: usize = 8;

    fn write(ctx: &TickContext, out: &mut BytesMut) {
        out.put_u64_le(ctx.tick);
    }

    fn read(cursor: &mut SegmentCursor<'_>) -> Result<TickContext, CursorError> {
        Ok(TickContext {
            tick: cursor.read_u64_le()?,
        })
    }
}

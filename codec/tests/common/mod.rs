//! Shared record/context codecs and helpers for the integration suites.
#![allow(dead_code)]

use bytepipe::{CursorError, FrameWriter, SegmentCursor};
use bytes::{BufMut, BytesMut};
use codec::{ContextCodec, DeltaCompressor, RecordCodec};

pub const MASK_A: u64 = 1 << 0;
pub const MASK_B: u64 = 1 << 1;

/// Test record with a 4-byte and a 2-byte field plus a context-fed tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TestRecord {
    pub a: i32,
    pub b: u16,
    pub tick: u64,
}

pub fn record(a: i32, b: u16) -> TestRecord {
    TestRecord { a, b, tick: 0 }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TestContext {
    pub tick: u64,
}

pub struct TestRecordCodec;

impl RecordCodec for TestRecordCodec {
    type Record = TestRecord;
    type Context = TestContext;

    fn change_mask(new: &TestRecord, old: &TestRecord, _ctx: &TestContext) -> u64 {
        let mut mask = 0;
        if new.a != old.a {
            mask |= MASK_A;
        }
        if new.b != old.b {
            mask |= MASK_B;
        }
        mask
    }

    fn delta_size(mask: u64) -> usize {
        let mut size = 0;
        if mask & MASK_A != 0 {
            size += 4;
        }
        if mask & MASK_B != 0 {
            size += 2;
        }
        size
    }

    fn write_delta(record: &TestRecord, out: &mut BytesMut, mask: u64) {
        if mask & MASK_A != 0 {
            out.put_i32_le(record.a);
        }
        if mask & MASK_B != 0 {
            out.put_u16_le(record.b);
        }
    }

    fn apply_delta(
        record: &mut TestRecord,
        cursor: &mut SegmentCursor<'_>,
        mask: u64,
    ) -> Result<(), CursorError> {
        if mask & MASK_A != 0 {
            record.a = cursor.read_i32_le()?;
        }
        if mask & MASK_B != 0 {
            record.b = cursor.read_u16_le()?;
        }
        Ok(())
    }

    fn apply_context(record: &mut TestRecord, ctx: &TestContext) {
        record.tick = ctx.tick;
    }
}

pub struct TestContextCodec;

impl ContextCodec for TestContextCodec {
    type Context = TestContext;
    const SIZE: usize = 8;

    fn write(ctx: &TestContext, out: &mut BytesMut) {
        out.put_u64_le(ctx.tick);
    }

    fn read(cursor: &mut SegmentCursor<'_>) -> Result<TestContext, CursorError> {
        Ok(TestContext {
            tick: cursor.read_u64_le()?,
        })
    }
}

pub type Engine = DeltaCompressor<TestRecordCodec, TestContextCodec>;

/// Creates an engine of `len` all-zero records on both arrays.
pub fn engine_with_zero_state(len: usize) -> Engine {
    let mut engine = Engine::new(len).expect("non-empty engine");
    engine
        .set_initial_state(&vec![TestRecord::default(); len])
        .expect("initial state");
    engine
}

/// Encodes one packet to raw bytes.
pub async fn encode_packet(engine: &mut Engine, state: &[TestRecord], tick: u64) -> Vec<u8> {
    let mut writer = FrameWriter::new(Vec::<u8>::new());
    engine
        .write_packet(&mut writer, state, &TestContext { tick })
        .await
        .expect("encode packet");
    writer.into_inner()
}

/// Asserts the engine state holds the given `(a, b)` pairs, all stamped
/// with `tick`.
pub fn assert_state(engine: &Engine, pairs: &[(i32, u16)], tick: u64) {
    let expected: Vec<TestRecord> = pairs
        .iter()
        .map(|&(a, b)| TestRecord { a, b, tick })
        .collect();
    assert_eq!(engine.current_state(), &expected[..]);
}

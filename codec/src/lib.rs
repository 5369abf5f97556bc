//! Delta packet encoding/decoding for fixed-length record arrays.
//!
//! This is the main codec crate. It ties the `bytepipe` primitives
//! together with pluggable record and context serializers to synchronize
//! a fixed-length array of records over a byte stream: the sender diffs
//! each snapshot against a baseline and emits only changed fields; the
//! receiver applies packets incrementally as bytes arrive.
//!
//! # Features
//!
//! - Length-prefixed delta packets streamed into a pooled write buffer
//! - Incremental decoding tolerant of arbitrary input fragmentation
//! - Zero-copy baseline/working buffer cycling
//! - Pluggable per-record and packet-context serializers
//!
//! # Design Principles
//!
//! - **Correctness first** - All invariants are documented and tested.
//! - **No steady-state allocations** - Snapshot arrays and pipeline
//!   buffers are allocated once and reused.
//! - **Atomic packets** - Partially received input never mutates state.
//!
//! See `WIRE_FORMAT.md` for the packet layout.

mod contract;
mod engine;
mod error;

pub use contract::{ContextCodec, RecordCodec};
pub use engine::DeltaCompressor;
pub use error::{CodecError, CodecResult};

#![no_main]

use bytepipe::{read_varint, SegmentCursor, VarIntRead};
use bytes::Bytes;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Decode the same bytes as one segment and as per-byte segments; the
    // outcomes and cursor positions must agree at every step.
    let whole = [Bytes::copy_from_slice(data)];
    let split: Vec<Bytes> = data
        .iter()
        .map(|byte| Bytes::copy_from_slice(&[*byte]))
        .collect();

    let mut contiguous = SegmentCursor::new(&whole);
    let mut segmented = SegmentCursor::new(&split);

    loop {
        let a = read_varint(&mut contiguous);
        let b = read_varint(&mut segmented);
        assert_eq!(a, b);
        assert_eq!(contiguous.position(), segmented.position());

        match a {
            VarIntRead::Value(_) => {
                if contiguous.remaining() == 0 {
                    break;
                }
            }
            VarIntRead::NeedMore | VarIntRead::Overflow => break,
        }
    }
});

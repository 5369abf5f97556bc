mod common;

use bytepipe::FrameReader;
use codec::CodecError;
use common::{assert_state, engine_with_zero_state};

/// Builds a packet by hand: length prefix, 8-byte tick context, raw body.
fn packet(tick: u64, entries: &[u8]) -> Vec<u8> {
    let body_len = 8 + entries.len();
    let mut bytes = Vec::with_capacity(4 + body_len);
    bytes.extend((body_len as u32).to_le_bytes());
    bytes.extend(tick.to_le_bytes());
    bytes.extend(entries);
    bytes
}

#[tokio::test]
async fn overflowing_varint_is_fatal() {
    // Eleven continuation-prefixed bytes then a terminator.
    let mut entries = vec![0xFF; 11];
    entries.push(0x01);
    let bytes = packet(0, &entries);

    let mut receiver = engine_with_zero_state(3);
    let mut reader = FrameReader::new(&bytes[..]);
    let err = receiver.apply_packet(&mut reader).await.unwrap_err();
    assert!(matches!(err, CodecError::VarIntOverflow));
}

#[tokio::test]
async fn index_out_of_range_is_fatal() {
    // index 7, mask 1 (4-byte payload), N = 3.
    let bytes = packet(0, &[0x07, 0x01, 0x00, 0x00, 0x00, 0x00]);

    let mut receiver = engine_with_zero_state(3);
    let mut reader = FrameReader::new(&bytes[..]);
    let err = receiver.apply_packet(&mut reader).await.unwrap_err();
    assert!(matches!(
        err,
        CodecError::IndexOutOfRange { index: 7, len: 3 }
    ));
}

#[tokio::test]
async fn huge_index_is_range_checked_not_truncated() {
    // index 2^40 as a varint, mask 0.
    let bytes = packet(0, &[0x80, 0x80, 0x80, 0x80, 0x80, 0x20, 0x00]);

    let mut receiver = engine_with_zero_state(3);
    let mut reader = FrameReader::new(&bytes[..]);
    let err = receiver.apply_packet(&mut reader).await.unwrap_err();
    assert!(matches!(
        err,
        CodecError::IndexOutOfRange {
            index,
            len: 3
        } if index == 1 << 40
    ));
}

#[tokio::test]
async fn fatal_error_keeps_previously_committed_packets() {
    let mut sender = engine_with_zero_state(3);
    let good = common::encode_packet(
        &mut sender,
        &[common::record(1, 0), common::record(0, 0), common::record(0, 0)],
        1,
    )
    .await;

    let mut stream = good;
    stream.extend(packet(2, &[0x07, 0x01, 0x00, 0x00, 0x00, 0x00]));

    let mut receiver = engine_with_zero_state(3);
    let mut reader = FrameReader::new(&stream[..]);
    let err = receiver.apply_packet(&mut reader).await.unwrap_err();
    assert!(matches!(err, CodecError::IndexOutOfRange { .. }));
    assert_state(&receiver, &[(1, 0), (0, 0), (0, 0)], 1);
}

#[tokio::test]
async fn short_context_packet_is_silently_ignored_at_eof() {
    // Declared body of 4 bytes cannot hold the 8-byte context.
    let mut bytes = vec![0x04, 0x00, 0x00, 0x00];
    bytes.extend([0xAA; 4]);

    let mut receiver = engine_with_zero_state(2);
    let mut reader = FrameReader::new(&bytes[..]);
    receiver.apply_packet(&mut reader).await.unwrap();
    assert_state(&receiver, &[(0, 0), (0, 0)], 0);
}

#[tokio::test]
async fn zero_length_body_is_silently_ignored_at_eof() {
    let bytes = [0x00, 0x00, 0x00, 0x00];

    let mut receiver = engine_with_zero_state(2);
    let mut reader = FrameReader::new(&bytes[..]);
    receiver.apply_packet(&mut reader).await.unwrap();
    assert_state(&receiver, &[(0, 0), (0, 0)], 0);
}

#[tokio::test]
async fn non_minimal_varints_are_accepted() {
    // index 1 and mask 1, each padded to two bytes.
    let bytes = packet(6, &[0x81, 0x00, 0x81, 0x00, 0x2A, 0x00, 0x00, 0x00]);

    let mut receiver = engine_with_zero_state(3);
    let mut reader = FrameReader::new(&bytes[..]);
    receiver.apply_packet(&mut reader).await.unwrap();
    assert_state(&receiver, &[(0, 0), (42, 0), (0, 0)], 6);
}

#[tokio::test]
async fn overflow_is_detected_even_when_drip_fed() {
    let mut entries = vec![0xFF; 11];
    entries.push(0x01);
    let bytes = packet(0, &entries);

    let mut receiver = engine_with_zero_state(3);
    let mut reader = FrameReader::with_chunk_size(&bytes[..], 1);
    let err = receiver.apply_packet(&mut reader).await.unwrap_err();
    assert!(matches!(err, CodecError::VarIntOverflow));
}

#![no_main]

use bytepipe::FrameReader;
use codec::DeltaCompressor;
use demo_state::{StateCodec, TickCodec};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");
    runtime.block_on(async {
        let mut engine: DeltaCompressor<StateCodec, TickCodec> =
            DeltaCompressor::new(8).expect("engine");
        let mut reader = FrameReader::with_chunk_size(data, 3);
        // Malformed input may surface an error but must never panic.
        let _ = engine.apply_packet(&mut reader).await;
    });
});

//! Fuzz target: `RpcEngine::feed_available_bytes`
//!
//! Drives arbitrary byte sequences through a small-buffer engine and
//! asserts that it never panics, never buffers past capacity, and puts
//! exactly one well-formed line on the wire per handled message.
//!
//! cargo fuzz run fuzz_line_engine

#![no_main]

use libfuzzer_sys::fuzz_target;
use serial_jsonrpc::{FeedOutcome, MemoryTransport, ResponseEncoder, RpcEngine, handler_fn};

const CAP: usize = 64;

fuzz_target!(|data: &[u8]| {
    let handler = handler_fn(
        |id, method: &str, _params: &[String], out: &mut ResponseEncoder<'_, MemoryTransport>| {
            out.send_string_result(id, method)
        },
    );
    let mut engine: RpcEngine<_, _, CAP> =
        RpcEngine::new(MemoryTransport::with_input(data), handler);

    let mut handled = 0usize;
    loop {
        match engine.feed_available_bytes() {
            Ok(FeedOutcome::Idle | FeedOutcome::Pending) => break,
            Ok(_) => handled += 1,
            Err(_) => unreachable!("memory transport never fails"),
        }
        assert!(engine.buffered() <= CAP, "buffer exceeds capacity");
    }

    let out = engine.transport().output();
    let lines = out.split(|&b| b == b'\n').filter(|l| !l.is_empty());
    let mut count = 0usize;
    for line in lines {
        let v: serde_json::Value = serde_json::from_slice(line)
            .expect("every response is valid JSON");
        assert_eq!(v["jsonrpc"], "2.0");
        count += 1;
    }
    assert_eq!(count, handled, "one response per handled message");
});

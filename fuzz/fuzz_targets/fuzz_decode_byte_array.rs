//! Fuzz target: `decode_byte_array`
//!
//! Arbitrary input must either decode within capacity or fail without
//! touching the output buffer.
//!
//! cargo fuzz run fuzz_decode_byte_array

#![no_main]

use libfuzzer_sys::fuzz_target;
use serial_jsonrpc::decode_byte_array;

fuzz_target!(|data: &[u8]| {
    let mut out = [0xA5u8; 8];
    match decode_byte_array(data, &mut out) {
        Ok(n) => assert!(n <= out.len()),
        Err(_) => assert_eq!(out, [0xA5; 8], "failed decode must not write"),
    }
});

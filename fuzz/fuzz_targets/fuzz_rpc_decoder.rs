//! Fuzz target: `rpc::decode_command`
//!
//! Arbitrary RPC payloads must decode to a command or a typed error —
//! never panic, never read out of bounds.
//!
//! cargo fuzz run fuzz_rpc_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use provlink::protocol::rpc::{Command, decode_command};

fuzz_target!(|data: &[u8]| {
    if let Ok(Command::WifiSettings { ssid, password }) = decode_command(data) {
        // Decoded strings respect their declared capacities.
        assert!(ssid.len() <= 32);
        assert!(password.len() <= 64);
    }
});

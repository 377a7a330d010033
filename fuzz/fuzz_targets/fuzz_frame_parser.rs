//! Fuzz target: `FrameParser::push`
//!
//! Drives arbitrary byte sequences into the incremental parser and asserts
//! that it never panics, never grows its buffer past one maximal frame, and
//! only yields payloads the length field could have described.
//!
//! cargo fuzz run fuzz_frame_parser

#![no_main]

use libfuzzer_sys::fuzz_target;
use provlink::protocol::frame::{FrameParser, MAX_FRAME, ParseStep};

fuzz_target!(|data: &[u8]| {
    let mut parser = FrameParser::new();

    for byte in data {
        match parser.push(*byte) {
            ParseStep::Complete(frame) => {
                assert!(frame.payload.len() <= 255, "payload exceeds length field");
                assert_eq!(parser.buffered(), 0, "buffer must clear on completion");
            }
            ParseStep::Rejected(_) => {
                assert_eq!(parser.buffered(), 0, "buffer must clear on rejection");
            }
            ParseStep::Pending => {}
        }
        assert!(parser.buffered() <= MAX_FRAME);
    }

    // After a reset the parser must accept bytes cleanly again.
    parser.reset();
    for byte in data {
        let _ = parser.push(*byte);
    }
});

//! Incremental frame parser and serializer.
//!
//! The parser consumes one byte at a time and accumulates it into a bounded
//! buffer. This handles the UART reality gracefully — a poll of the serial
//! adapter may surface part of a header, part of a payload, or several
//! frames back to back, interleaved with console noise. Noise is rejected
//! at the first byte that cannot extend a valid frame; the caller applies
//! the 50 ms inter-frame quiescence rule on top to discard stalled partial
//! frames.

use super::FrameType;

/// Fixed six-byte frame preamble.
pub const MAGIC: [u8; 6] = *b"IMPROV";

/// Protocol version accepted at offset 6.
pub const PROTOCOL_VERSION: u8 = 0x01;

/// Maximum payload size (the length field is a single byte).
pub const MAX_PAYLOAD: usize = 255;

/// Header (9) + payload (≤255) + checksum (1).
pub const MAX_FRAME: usize = 9 + MAX_PAYLOAD + 1;

/// Serialized frame plus the trailing LF appended on emission.
pub type FrameBytes = heapless::Vec<u8, { MAX_FRAME + 1 }>;

/// A complete inbound frame with a verified checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Raw type byte at offset 7. Retained even when unrecognized — only
    /// `rpc` is actionable inbound, everything else is dropped silently.
    pub type_byte: u8,
    pub payload: heapless::Vec<u8, MAX_PAYLOAD>,
}

impl Frame {
    /// The type tag, if it is one of the four defined values.
    pub fn frame_type(&self) -> Option<FrameType> {
        FrameType::from_byte(self.type_byte)
    }
}

/// Outcome of feeding one byte to [`FrameParser::push`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseStep {
    /// Byte accepted; the frame is still in progress.
    Pending,
    /// The byte completed a frame with a matching checksum. The buffer is
    /// already cleared for the next frame.
    Complete(Frame),
    /// Byte rejected; the buffer is already cleared.
    Rejected(Reject),
}

/// Why a byte was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reject {
    /// Magic or version mismatch — likely serial console noise, dropped
    /// without a reply.
    Noise,
    /// The final byte disagreed with the computed checksum. The caller
    /// reports `invalid_rpc` to the host.
    BadChecksum,
}

/// Streaming parser for one inbound frame.
///
/// Holds at most one partially received frame; the buffer never grows past
/// [`MAX_FRAME`] bytes between frame boundaries.
pub struct FrameParser {
    buf: heapless::Vec<u8, MAX_FRAME>,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    pub fn new() -> Self {
        Self {
            buf: heapless::Vec::new(),
        }
    }

    /// Bytes currently buffered (partial frame in flight).
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Discard any partial frame (inter-frame reset, caller-driven).
    pub fn reset(&mut self) {
        self.buf.clear();
    }

    /// Feed a single byte.
    ///
    /// Offsets follow the wire layout: magic at 0..5, version at 6, type at
    /// 7, length L at 8, payload at 9..9+L, checksum at 9+L. Type and
    /// length are accepted unconditionally; the checksum byte settles
    /// whether the frame is real.
    pub fn push(&mut self, byte: u8) -> ParseStep {
        let at = self.buf.len();
        if self.buf.push(byte).is_err() {
            self.buf.clear();
            return ParseStep::Rejected(Reject::Noise);
        }

        match at {
            0..=5 => {
                if byte == MAGIC[at] {
                    ParseStep::Pending
                } else {
                    self.buf.clear();
                    ParseStep::Rejected(Reject::Noise)
                }
            }
            6 => {
                if byte == PROTOCOL_VERSION {
                    ParseStep::Pending
                } else {
                    self.buf.clear();
                    ParseStep::Rejected(Reject::Noise)
                }
            }
            7 | 8 => ParseStep::Pending,
            _ => {
                let payload_len = self.buf[8] as usize;
                if at < 9 + payload_len {
                    return ParseStep::Pending;
                }

                // Checksum byte: wrapping sum of everything before it.
                let expected = checksum(&self.buf[..at]);
                if expected != byte {
                    self.buf.clear();
                    return ParseStep::Rejected(Reject::BadChecksum);
                }

                let frame = Frame {
                    type_byte: self.buf[7],
                    // Slice length is payload_len ≤ 255, within capacity.
                    payload: heapless::Vec::from_slice(&self.buf[9..9 + payload_len])
                        .unwrap_or_default(),
                };
                self.buf.clear();
                ParseStep::Complete(frame)
            }
        }
    }
}

/// Modular-256 sum over `bytes`.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// Serialize a frame: magic, version, type, length, payload, checksum.
///
/// Returns `None` when the payload exceeds [`MAX_PAYLOAD`]. The buffer
/// keeps one spare byte so the transport can append the trailing LF
/// without reallocating.
pub fn encode_frame(frame_type: FrameType, payload: &[u8]) -> Option<FrameBytes> {
    if payload.len() > MAX_PAYLOAD {
        return None;
    }

    let mut out = FrameBytes::new();
    out.extend_from_slice(&MAGIC).ok()?;
    out.push(PROTOCOL_VERSION).ok()?;
    out.push(frame_type as u8).ok()?;
    out.push(payload.len() as u8).ok()?;
    out.extend_from_slice(payload).ok()?;
    let sum = checksum(&out);
    out.push(sum).ok()?;
    Some(out)
}

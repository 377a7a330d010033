//! RPC command decoding and response building.
//!
//! An RPC payload is a command id, an inner length, then a body of
//! length-prefixed UTF-8 strings. The decoder maps malformed bodies to
//! [`RpcError::Malformed`] and unrecognized ids to [`RpcError::Unknown`]
//! without touching the state machine; string contents are not validated.

use core::fmt;

/// SSID capacity (802.11 limit).
pub const SSID_MAX: usize = 32;

/// Passphrase capacity (WPA2 limit).
pub const PASSWORD_MAX: usize = 64;

/// Command ids defined by the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandId {
    WifiSettings = 0x01,
    GetCurrentState = 0x02,
    GetDeviceInfo = 0x03,
}

/// A decoded RPC command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Set wireless credentials. Empty strings are permitted.
    WifiSettings {
        ssid: heapless::String<SSID_MAX>,
        password: heapless::String<PASSWORD_MAX>,
    },
    GetCurrentState,
    GetDeviceInfo,
}

/// Decode failure, mapped to an `error_state` byte by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcError {
    /// Body disagrees with its inner length, a string is truncated or not
    /// UTF-8, or a field overflows its fixed capacity.
    Malformed,
    /// Command id is not one of the defined values.
    Unknown(u8),
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed RPC body"),
            Self::Unknown(id) => write!(f, "unknown RPC command 0x{:02X}", id),
        }
    }
}

/// Decode an RPC frame payload into a [`Command`].
pub fn decode_command(payload: &[u8]) -> Result<Command, RpcError> {
    if payload.len() < 2 {
        return Err(RpcError::Malformed);
    }
    let id = payload[0];
    let inner_len = payload[1] as usize;

    match id {
        id if id == CommandId::WifiSettings as u8 => {
            if 2 + inner_len != payload.len() {
                return Err(RpcError::Malformed);
            }
            let body = &payload[2..];
            let (ssid, rest) = take_string::<SSID_MAX>(body)?;
            let (password, rest) = take_string::<PASSWORD_MAX>(rest)?;
            if !rest.is_empty() {
                return Err(RpcError::Malformed);
            }
            Ok(Command::WifiSettings { ssid, password })
        }
        // Body ignored for the parameterless queries.
        id if id == CommandId::GetCurrentState as u8 => Ok(Command::GetCurrentState),
        id if id == CommandId::GetDeviceInfo as u8 => Ok(Command::GetDeviceInfo),
        other => Err(RpcError::Unknown(other)),
    }
}

/// Pop one length-prefixed UTF-8 string off the front of `body`.
fn take_string<const N: usize>(
    body: &[u8],
) -> Result<(heapless::String<N>, &[u8]), RpcError> {
    let (len_byte, rest) = body.split_first().ok_or(RpcError::Malformed)?;
    let len = *len_byte as usize;
    if rest.len() < len {
        return Err(RpcError::Malformed);
    }
    let text = core::str::from_utf8(&rest[..len]).map_err(|_| RpcError::Malformed)?;
    let mut out = heapless::String::new();
    out.push_str(text).map_err(|_| RpcError::Malformed)?;
    Ok((out, &rest[len..]))
}

/// Build an RPC response payload: command id, inner length, then each field
/// as a length-prefixed string.
///
/// Returns `None` when the fields cannot fit a single frame payload.
pub fn encode_response(
    command: CommandId,
    fields: &[&str],
) -> Option<heapless::Vec<u8, { super::frame::MAX_PAYLOAD }>> {
    let mut out = heapless::Vec::new();
    out.push(command as u8).ok()?;
    out.push(0).ok()?; // inner length, patched below

    for field in fields {
        let bytes = field.as_bytes();
        if bytes.len() > u8::MAX as usize {
            return None;
        }
        out.push(bytes.len() as u8).ok()?;
        out.extend_from_slice(bytes).ok()?;
    }

    out[1] = (out.len() - 2) as u8;
    Some(out)
}

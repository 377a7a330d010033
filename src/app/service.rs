//! Provisioning service — the hexagonal core.
//!
//! [`ProvisioningService`] owns the frame parser and the provisioning state
//! machine, and exposes a single non-reentrant [`poll`] entry point that the
//! firmware main loop invokes at coarse intervals. All I/O flows through
//! port traits injected at the call sites, making the entire service
//! testable with mock adapters.
//!
//! ```text
//!  SerialPort ──▶ ┌────────────────────────────┐ ──▶ SerialPort
//!                 │    ProvisioningService      │
//!  TimePort   ──▶ │  parser · state machine     │ ──▶ WirelessPort
//!                 └────────────────────────────┘ ──▶ CredentialPort
//! ```
//!
//! [`poll`]: ProvisioningService::poll

use core::fmt::Write as _;

use log::{debug, info, warn};

use crate::protocol::frame::{FrameParser, ParseStep, Reject, encode_frame};
use crate::protocol::rpc::{self, Command, CommandId, PASSWORD_MAX, RpcError, SSID_MAX};
use crate::protocol::{ErrorKind, FrameType, ProvisioningState};

use super::ports::{CredentialPort, SerialPort, TimePort, WirelessMode, WirelessPort};

/// Quiescence window after which a partial frame is abandoned.
const INTER_FRAME_RESET_MS: u32 = 50;

/// "http://" plus a dotted-quad address.
const URL_MAX: usize = 24;

// ───────────────────────────────────────────────────────────────
// Device identity
// ───────────────────────────────────────────────────────────────

/// Immutable identity strings reported by `get_device_info`, captured at
/// construction.
#[derive(Debug, Clone, Copy)]
pub struct DeviceInfo {
    pub firmware_name: &'static str,
    pub firmware_version: &'static str,
    pub hardware_variant: &'static str,
    pub device_name: &'static str,
}

/// The last credential pair accepted over the wire, retained so the
/// firmware can mirror what the host sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiCredentials {
    pub ssid: heapless::String<SSID_MAX>,
    pub password: heapless::String<PASSWORD_MAX>,
}

// ───────────────────────────────────────────────────────────────
// ProvisioningService
// ───────────────────────────────────────────────────────────────

/// Improv-Serial responder. One instance per device; the main loop owns it
/// and drives [`ProvisioningService::poll`].
pub struct ProvisioningService {
    state: ProvisioningState,
    parser: FrameParser,
    /// Monotonic timestamp of the last accepted byte.
    last_rx_ms: u32,
    info: DeviceInfo,
    last_settings: Option<WifiCredentials>,
}

impl ProvisioningService {
    /// Construct the responder.
    ///
    /// Does **not** query the radio — call [`start`](Self::start) next.
    pub fn new(info: DeviceInfo) -> Self {
        Self {
            state: ProvisioningState::Authorized,
            parser: FrameParser::new(),
            last_rx_ms: 0,
            info,
            last_settings: None,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Pick the initial state from the radio: an active station-mode
    /// association means the device is already provisioned.
    pub fn start(&mut self, wireless: &impl WirelessPort) {
        self.state = if wireless.mode() == WirelessMode::Station && wireless.is_connected() {
            ProvisioningState::Provisioned
        } else {
            ProvisioningState::Authorized
        };
        info!("provisioning responder started in {:?}", self.state);
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current provisioning state.
    pub fn state(&self) -> ProvisioningState {
        self.state
    }

    /// SSID from the last accepted `wifi_settings` command.
    pub fn ssid(&self) -> Option<&str> {
        self.last_settings.as_ref().map(|c| c.ssid.as_str())
    }

    /// Password from the last accepted `wifi_settings` command.
    pub fn password(&self) -> Option<&str> {
        self.last_settings.as_ref().map(|c| c.password.as_str())
    }

    // ── Service loop ──────────────────────────────────────────

    /// Run one service cycle: apply the inter-frame reset, drain available
    /// serial bytes through the parser, then advance the state machine.
    ///
    /// `timeout` is the caller's verdict that the in-flight association has
    /// taken too long; it is consulted only in `provisioning`. Returns
    /// `true` iff a transition to `provisioned` happened this call, so the
    /// application can re-render status.
    ///
    /// Not reentrant — the caller serializes invocations.
    pub fn poll(
        &mut self,
        serial: &mut impl SerialPort,
        wireless: &mut impl WirelessPort,
        credentials: &mut impl CredentialPort,
        clock: &impl TimePort,
        timeout: bool,
    ) -> bool {
        let now = clock.now_ms();
        if now.wrapping_sub(self.last_rx_ms) > INTER_FRAME_RESET_MS {
            self.parser.reset();
            self.last_rx_ms = now;
        }

        while serial.available() > 0 {
            let Some(byte) = serial.read_byte() else {
                break;
            };
            debug!("serial byte: 0x{:02X}", byte);
            match self.parser.push(byte) {
                ParseStep::Pending => self.last_rx_ms = now,
                ParseStep::Complete(frame) => {
                    self.last_rx_ms = now;
                    self.handle_frame(&frame, serial, wireless, credentials);
                }
                ParseStep::Rejected(Reject::Noise) => {}
                ParseStep::Rejected(Reject::BadChecksum) => {
                    warn!("frame checksum mismatch");
                    send_error(serial, ErrorKind::InvalidRpc);
                }
            }
        }

        if self.state == ProvisioningState::Provisioning {
            let associated = wireless.mode() == WirelessMode::AccessPoint
                || (wireless.mode() == WirelessMode::Station && wireless.is_connected());
            if associated {
                self.state = ProvisioningState::Provisioned;
                let url = device_url(wireless);
                info!("association succeeded, reachable at '{}'", url);
                send_rpc_response(serial, CommandId::WifiSettings, &[url.as_str()]);
                return true;
            }
            if timeout {
                warn!("timed out waiting for association");
                send_error(serial, ErrorKind::UnableToConnect);
                self.enter_state(serial, ProvisioningState::Authorized);
                wireless.disconnect();
            }
        }

        false
    }

    // ── Internal ──────────────────────────────────────────────

    /// A checksum-valid frame arrived. Only `rpc` is actionable inbound;
    /// any other type is dropped without a reply.
    fn handle_frame(
        &mut self,
        frame: &crate::protocol::frame::Frame,
        serial: &mut impl SerialPort,
        wireless: &mut impl WirelessPort,
        credentials: &mut impl CredentialPort,
    ) {
        if frame.frame_type() != Some(FrameType::Rpc) {
            debug!("ignoring non-RPC frame (type 0x{:02X})", frame.type_byte);
            return;
        }
        match rpc::decode_command(&frame.payload) {
            Ok(command) => self.handle_command(command, serial, wireless, credentials),
            Err(e @ RpcError::Malformed) => {
                warn!("{}", e);
                send_error(serial, ErrorKind::InvalidRpc);
            }
            Err(e @ RpcError::Unknown(_)) => {
                warn!("{}", e);
                send_error(serial, ErrorKind::UnknownRpc);
            }
        }
    }

    fn handle_command(
        &mut self,
        command: Command,
        serial: &mut impl SerialPort,
        wireless: &mut impl WirelessPort,
        credentials: &mut impl CredentialPort,
    ) {
        match command {
            // Persist the pair, advertise `provisioning`, then kick the
            // radio over to the new network. Association completes (or
            // times out) on a later poll; the store must already hold the
            // credentials when `associate` is issued.
            Command::WifiSettings { ssid, password } => {
                info!("wifi settings received (ssid='{}')", ssid);
                if let Err(e) = credentials.persist(&ssid, &password) {
                    warn!("credential store write failed: {}", e);
                }
                self.enter_state(serial, ProvisioningState::Provisioning);
                wireless.disconnect();
                wireless.set_mode(WirelessMode::Station);
                wireless.associate(&ssid, &password);
                self.last_settings = Some(WifiCredentials { ssid, password });
            }

            // Re-assert the current state; once provisioned, also repeat
            // the reachable-URL response.
            Command::GetCurrentState => {
                let state = self.state;
                self.enter_state(serial, state);
                if state == ProvisioningState::Provisioned {
                    let url = device_url(wireless);
                    send_rpc_response(serial, CommandId::GetCurrentState, &[url.as_str()]);
                }
            }

            Command::GetDeviceInfo => {
                send_rpc_response(
                    serial,
                    CommandId::GetDeviceInfo,
                    &[
                        self.info.firmware_name,
                        self.info.firmware_version,
                        self.info.hardware_variant,
                        self.info.device_name,
                    ],
                );
            }
        }
    }

    /// Enter (or re-assert) a state and advertise it with exactly one
    /// `current_state` frame.
    fn enter_state(&mut self, serial: &mut impl SerialPort, state: ProvisioningState) {
        if self.state != state {
            info!("state {:?} -> {:?}", self.state, state);
        }
        self.state = state;
        send_current_state(serial, state);
    }
}

// ───────────────────────────────────────────────────────────────
// Outbound frames
// ───────────────────────────────────────────────────────────────

/// `"http://" + <local-ip>`; just `"http://"` when no address is known yet
/// (hosts expect the entry to be present either way).
fn device_url(wireless: &impl WirelessPort) -> heapless::String<URL_MAX> {
    let mut url = heapless::String::new();
    url.push_str("http://").ok();
    if let Some(ip) = wireless.local_ip() {
        write!(url, "{}", ip).ok();
    }
    url
}

fn send_current_state(serial: &mut impl SerialPort, state: ProvisioningState) {
    send_frame(serial, FrameType::CurrentState, &[state as u8]);
}

fn send_error(serial: &mut impl SerialPort, kind: ErrorKind) {
    send_frame(serial, FrameType::ErrorState, &[kind as u8]);
}

fn send_rpc_response(serial: &mut impl SerialPort, command: CommandId, fields: &[&str]) {
    match rpc::encode_response(command, fields) {
        Some(payload) => send_frame(serial, FrameType::RpcResponse, &payload),
        None => warn!("RPC response for {:?} does not fit a frame", command),
    }
}

/// Serialize and write one frame, LF-terminated, in a single call. Write
/// failures are logged and dropped — the host retries.
fn send_frame(serial: &mut impl SerialPort, frame_type: FrameType, payload: &[u8]) {
    let Some(mut bytes) = encode_frame(frame_type, payload) else {
        warn!("oversized frame payload dropped ({} bytes)", payload.len());
        return;
    };
    bytes.push(b'\n').ok();
    if let Err(e) = serial.write(&bytes) {
        warn!("serial write failed: {}", e);
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────

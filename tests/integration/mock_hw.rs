//! Mock adapters for integration tests.
//!
//! Record every port call so tests can assert on the full interaction
//! history without touching real UART/radio/flash.

use std::cell::Cell;
use std::collections::VecDeque;
use std::net::Ipv4Addr;

use provlink::app::ports::{
    CredentialError, CredentialPort, SerialError, SerialPort, TimePort, WirelessMode, WirelessPort,
};

// ── Serial ────────────────────────────────────────────────────

pub struct MockSerial {
    rx: VecDeque<u8>,
    /// One entry per `write` call — each should be a complete LF-terminated
    /// frame.
    pub writes: Vec<Vec<u8>>,
    pub fail_writes: bool,
}

#[allow(dead_code)]
impl MockSerial {
    pub fn new() -> Self {
        Self {
            rx: VecDeque::new(),
            writes: Vec::new(),
            fail_writes: false,
        }
    }

    pub fn inject(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes);
    }

    /// Drain captured frames, stripping the trailing LF from each.
    pub fn take_frames(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.writes)
            .into_iter()
            .map(|mut frame| {
                assert_eq!(frame.pop(), Some(0x0A), "emitted frame must end in LF");
                frame
            })
            .collect()
    }
}

impl SerialPort for MockSerial {
    fn available(&self) -> usize {
        self.rx.len()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), SerialError> {
        if self.fail_writes {
            return Err(SerialError::IoError);
        }
        self.writes.push(bytes.to_vec());
        Ok(())
    }
}

// ── Wireless ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WifiCall {
    SetMode(WirelessMode),
    Disconnect,
    Associate { ssid: String, password: String },
}

pub struct MockWifi {
    pub mode: WirelessMode,
    pub connected: bool,
    pub ip: Option<Ipv4Addr>,
    pub calls: Vec<WifiCall>,
}

#[allow(dead_code)]
impl MockWifi {
    pub fn new() -> Self {
        Self {
            mode: WirelessMode::Off,
            connected: false,
            ip: None,
            calls: Vec::new(),
        }
    }

    pub fn associated(ip: Ipv4Addr) -> Self {
        Self {
            mode: WirelessMode::Station,
            connected: true,
            ip: Some(ip),
            calls: Vec::new(),
        }
    }
}

impl WirelessPort for MockWifi {
    fn mode(&self) -> WirelessMode {
        self.mode
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn local_ip(&self) -> Option<Ipv4Addr> {
        self.ip
    }

    fn set_mode(&mut self, mode: WirelessMode) {
        self.mode = mode;
        self.calls.push(WifiCall::SetMode(mode));
    }

    fn disconnect(&mut self) {
        self.connected = false;
        self.calls.push(WifiCall::Disconnect);
    }

    fn associate(&mut self, ssid: &str, password: &str) {
        self.calls.push(WifiCall::Associate {
            ssid: ssid.to_string(),
            password: password.to_string(),
        });
    }
}

// ── Credential store ──────────────────────────────────────────

pub struct MockStore {
    pub saved: Vec<(String, String)>,
    pub fail: bool,
}

#[allow(dead_code)]
impl MockStore {
    pub fn new() -> Self {
        Self {
            saved: Vec::new(),
            fail: false,
        }
    }
}

impl CredentialPort for MockStore {
    fn persist(&mut self, ssid: &str, password: &str) -> Result<(), CredentialError> {
        if self.fail {
            return Err(CredentialError::IoError);
        }
        self.saved.push((ssid.to_string(), password.to_string()));
        Ok(())
    }
}

// ── Clock ─────────────────────────────────────────────────────

pub struct MockClock {
    now: Cell<u32>,
}

#[allow(dead_code)]
impl MockClock {
    pub fn new() -> Self {
        Self { now: Cell::new(0) }
    }

    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }
}

impl TimePort for MockClock {
    fn now_ms(&self) -> u32 {
        self.now.get()
    }
}

//! Port traits — the hexagonal boundary between domain logic and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ProvisioningService (domain)
//! ```
//!
//! Driven adapters (UART, radio, credential storage, clock) implement these
//! traits. The [`ProvisioningService`](super::service::ProvisioningService)
//! consumes them via generics at its call sites, so the domain core never
//! touches hardware directly. Logging goes through the `log` facade; the
//! embedding firmware installs the backend.

use core::fmt;
use core::net::Ipv4Addr;

// ───────────────────────────────────────────────────────────────
// Serial port (driven adapter: UART ↔ domain)
// ───────────────────────────────────────────────────────────────

/// Non-blocking byte transport. All three operations may be called from the
/// same task as the service loop and must never block.
pub trait SerialPort {
    /// Bytes immediately available to read.
    fn available(&self) -> usize;

    /// Pop one byte, or `None` if the receive queue drained underneath the
    /// last `available` report.
    fn read_byte(&mut self) -> Option<u8>;

    /// Write a complete frame in one call.
    fn write(&mut self, bytes: &[u8]) -> Result<(), SerialError>;
}

// ───────────────────────────────────────────────────────────────
// Wireless port (driven adapter: domain → radio)
// ───────────────────────────────────────────────────────────────

/// Radio role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WirelessMode {
    Off,
    /// Joined (or joining) an existing network.
    Station,
    /// Serving a network.
    AccessPoint,
    /// Simultaneous station + access point.
    ApSta,
}

/// Wireless subsystem contract. `associate` is asynchronous: it returns
/// immediately and the service observes the outcome on later ticks via
/// `mode`/`is_connected`.
pub trait WirelessPort {
    fn mode(&self) -> WirelessMode;
    fn is_connected(&self) -> bool;
    /// Local address once associated, if known.
    fn local_ip(&self) -> Option<Ipv4Addr>;
    fn set_mode(&mut self, mode: WirelessMode);
    fn disconnect(&mut self);
    fn associate(&mut self, ssid: &str, password: &str);
}

// ───────────────────────────────────────────────────────────────
// Credential store port (driven adapter: domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Persists the credential pair to non-volatile storage; must survive
/// reboot. Key naming is the adapter's concern.
pub trait CredentialPort {
    fn persist(&mut self, ssid: &str, password: &str) -> Result<(), CredentialError>;
}

// ───────────────────────────────────────────────────────────────
// Time port (driven adapter: domain ← monotonic clock)
// ───────────────────────────────────────────────────────────────

/// Monotonic milliseconds. Wraparound is tolerated — consumers compare with
/// wrapping arithmetic.
pub trait TimePort {
    fn now_ms(&self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`SerialPort::write`]. The service drops the frame and logs;
/// the host retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialError {
    /// Transmit queue full or driver busy.
    WouldBlock,
    /// Generic I/O error from the UART driver.
    IoError,
}

impl fmt::Display for SerialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WouldBlock => write!(f, "transmit queue full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

/// Errors from [`CredentialPort::persist`]. A failed write is logged but
/// does not prevent the association attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialError {
    /// Storage partition is full.
    Full,
    /// Generic I/O error from the storage backend.
    IoError,
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

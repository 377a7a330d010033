//! UART serial adapter.
//!
//! Implements [`SerialPort`] — the byte transport the responder owns for
//! its lifetime.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: non-blocking reads/writes against an
//!   already-configured UART via the ESP-IDF driver (`uart_*` calls). The
//!   firmware installs the driver before constructing the adapter.
//! - **all other targets**: an in-memory loopback — tests inject receive
//!   bytes and capture every transmitted frame.

use crate::app::ports::{SerialError, SerialPort};

#[cfg(not(target_os = "espidf"))]
use std::collections::VecDeque;

pub struct UartAdapter {
    /// UART controller number (0..=2 on ESP32-class parts).
    #[allow(dead_code)]
    port: i32,
    #[cfg(not(target_os = "espidf"))]
    rx: VecDeque<u8>,
    #[cfg(not(target_os = "espidf"))]
    writes: Vec<Vec<u8>>,
}

impl UartAdapter {
    pub fn new(port: i32) -> Self {
        Self {
            port,
            #[cfg(not(target_os = "espidf"))]
            rx: VecDeque::new(),
            #[cfg(not(target_os = "espidf"))]
            writes: Vec::new(),
        }
    }

    // ── Simulation hooks ──────────────────────────────────────

    /// Queue bytes for the next reads.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_inject(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes);
    }

    /// Drain the captured writes, one entry per `write` call.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_take_writes(&mut self) -> Vec<Vec<u8>> {
        core::mem::take(&mut self.writes)
    }
}

impl SerialPort for UartAdapter {
    #[cfg(target_os = "espidf")]
    fn available(&self) -> usize {
        let mut len: usize = 0;
        let ret = unsafe { esp_idf_svc::sys::uart_get_buffered_data_len(self.port, &mut len) };
        if ret == esp_idf_svc::sys::ESP_OK { len } else { 0 }
    }

    #[cfg(not(target_os = "espidf"))]
    fn available(&self) -> usize {
        self.rx.len()
    }

    #[cfg(target_os = "espidf")]
    fn read_byte(&mut self) -> Option<u8> {
        let mut byte: u8 = 0;
        let read = unsafe {
            esp_idf_svc::sys::uart_read_bytes(
                self.port,
                core::ptr::addr_of_mut!(byte).cast(),
                1,
                0, // non-blocking
            )
        };
        (read == 1).then_some(byte)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }

    #[cfg(target_os = "espidf")]
    fn write(&mut self, bytes: &[u8]) -> Result<(), SerialError> {
        let written = unsafe {
            esp_idf_svc::sys::uart_write_bytes(self.port, bytes.as_ptr().cast(), bytes.len())
        };
        if written == bytes.len() as i32 {
            Ok(())
        } else if written >= 0 {
            Err(SerialError::WouldBlock)
        } else {
            Err(SerialError::IoError)
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn write(&mut self, bytes: &[u8]) -> Result<(), SerialError> {
        self.writes.push(bytes.to_vec());
        Ok(())
    }
}

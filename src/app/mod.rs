//! Application core — pure domain logic, zero I/O.
//!
//! The provisioning service interprets decoded RPC commands, drives the
//! {authorized, provisioning, provisioned} state machine, and emits reply
//! frames. All interaction with hardware happens through **port traits**
//! defined in [`ports`], keeping this layer fully testable without real
//! peripherals.

pub mod ports;
pub mod service;

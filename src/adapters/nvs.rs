//! NVS credential store adapter.
//!
//! Implements [`CredentialPort`]: the accepted SSID/password pair is
//! written to its own NVS namespace so it survives reboot and is picked up
//! by the firmware's normal WiFi bring-up.
//!
//! # Security
//!
//! - On ESP32, prefer mapping the namespace onto the encrypted NVS
//!   partition; the simulation backend is plaintext (dev/test only).
//! - Writes are atomic per `nvs_commit()`.

use log::info;

use crate::app::ports::{CredentialError, CredentialPort};

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

const CRED_NAMESPACE: &str = "wifi";
const KEY_SSID: &str = "ssid";
const KEY_PASSWORD: &str = "password";

pub struct NvsCredentialStore {
    #[cfg(not(target_os = "espidf"))]
    store: HashMap<String, String>,
}

impl NvsCredentialStore {
    /// Create the store and initialise NVS flash.
    ///
    /// On first boot or after a version mismatch the NVS partition is
    /// erased and re-initialised automatically.
    pub fn new() -> Result<Self, CredentialError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
            // single main-task context before any concurrent NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                log::warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK {
                    return Err(CredentialError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK {
                    return Err(CredentialError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(CredentialError::IoError);
            }
            info!("NvsCredentialStore: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsCredentialStore: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: HashMap::new(),
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn composite_key(key: &str) -> String {
        format!("{}::{}", CRED_NAMESPACE, key)
    }

    /// Stored SSID, if any (simulation backend).
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_stored_ssid(&self) -> Option<&str> {
        self.store.get(&Self::composite_key(KEY_SSID)).map(String::as_str)
    }

    /// Stored password, if any (simulation backend).
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_stored_password(&self) -> Option<&str> {
        self.store
            .get(&Self::composite_key(KEY_PASSWORD))
            .map(String::as_str)
    }

    /// Open the credential namespace, run `f` with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F>(f: F) -> Result<(), i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<(), i32>,
    {
        let mut ns_buf = [0u8; 16];
        let ns_bytes = CRED_NAMESPACE.as_bytes();
        ns_buf[..ns_bytes.len()].copy_from_slice(ns_bytes);

        let mut handle: nvs_handle_t = 0;
        let ret = unsafe {
            nvs_open(
                ns_buf.as_ptr() as *const _,
                nvs_open_mode_t_NVS_READWRITE,
                &mut handle,
            )
        };
        if ret != ESP_OK {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }

    /// `nvs_set_str` with stack-built NUL-terminated buffers.
    #[cfg(target_os = "espidf")]
    fn set_str(handle: nvs_handle_t, key: &str, value: &str) -> Result<(), i32> {
        let mut key_buf = [0u8; 16];
        let key_bytes = key.as_bytes();
        key_buf[..key_bytes.len()].copy_from_slice(key_bytes);

        // Values are bounded by the decoder (SSID ≤ 32, password ≤ 64).
        let mut val_buf = [0u8; 65];
        let val_bytes = value.as_bytes();
        if val_bytes.len() >= val_buf.len() {
            return Err(ESP_ERR_INVALID_ARG);
        }
        val_buf[..val_bytes.len()].copy_from_slice(val_bytes);

        let ret = unsafe {
            nvs_set_str(
                handle,
                key_buf.as_ptr() as *const _,
                val_buf.as_ptr() as *const _,
            )
        };
        if ret != ESP_OK { Err(ret) } else { Ok(()) }
    }
}

impl CredentialPort for NvsCredentialStore {
    #[cfg(target_os = "espidf")]
    fn persist(&mut self, ssid: &str, password: &str) -> Result<(), CredentialError> {
        Self::with_nvs_handle(|handle| {
            Self::set_str(handle, KEY_SSID, ssid)?;
            Self::set_str(handle, KEY_PASSWORD, password)?;
            let ret = unsafe { nvs_commit(handle) };
            if ret != ESP_OK { Err(ret) } else { Ok(()) }
        })
        .map_err(|err| {
            if err == ESP_ERR_NVS_NOT_ENOUGH_SPACE {
                CredentialError::Full
            } else {
                CredentialError::IoError
            }
        })?;
        info!("credentials persisted to NVS");
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn persist(&mut self, ssid: &str, password: &str) -> Result<(), CredentialError> {
        self.store
            .insert(Self::composite_key(KEY_SSID), ssid.to_string());
        self.store
            .insert(Self::composite_key(KEY_PASSWORD), password.to_string());
        info!("credentials persisted (simulation)");
        Ok(())
    }
}

//! WiFi station-mode adapter.
//!
//! Implements [`WirelessPort`] — the radio boundary the responder drives
//! when new credentials arrive. The responder only issues mode switches,
//! disconnects, and association kicks; connection supervision (backoff,
//! rescan) stays with the embedding firmware.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via
//!   `esp_idf_svc::wifi`.
//! - **all other targets**: simulation stubs for host-side tests, with
//!   knobs to script association outcomes.

use core::net::Ipv4Addr;

use log::info;

use crate::app::ports::{WirelessMode, WirelessPort};

pub struct WifiAdapter {
    mode: WirelessMode,
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    #[cfg(not(target_os = "espidf"))]
    sim_connected: bool,
    #[cfg(not(target_os = "espidf"))]
    sim_ip: Option<Ipv4Addr>,
}

impl Default for WifiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl WifiAdapter {
    pub fn new() -> Self {
        Self {
            mode: WirelessMode::Off,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            #[cfg(not(target_os = "espidf"))]
            sim_connected: false,
            #[cfg(not(target_os = "espidf"))]
            sim_ip: None,
        }
    }

    // ── Simulation hooks ──────────────────────────────────────

    /// Script the association outcome the next polls will observe.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_connected(&mut self, connected: bool) {
        self.sim_connected = connected;
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_ip(&mut self, ip: Option<Ipv4Addr>) {
        self.sim_ip = ip;
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_associate(&mut self) {
        // ESP-IDF STA association. The full wiring requires the EspWifi
        // handle built in the firmware binary from (modem, sysloop, nvs):
        //   wifi.set_configuration(&Configuration::Client(ClientConfiguration {
        //       ssid: self.ssid.as_str().try_into().unwrap_or_default(),
        //       password: self.password.as_str().try_into().unwrap_or_default(),
        //       ..Default::default()
        //   }))
        //   wifi.start(); wifi.connect();
        // The modem peripheral is owned by the binary, so the handle is
        // threaded in there rather than constructed here.
        info!("WiFi(espidf): STA associate requested (ssid='{}')", self.ssid);
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_associate(&mut self) {
        info!(
            "WiFi(sim): associating with '{}' (passphrase {} bytes)",
            self.ssid,
            self.password.len()
        );
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_connected(&self) -> bool {
        unsafe {
            let mut ap_info: esp_idf_svc::sys::wifi_ap_record_t = core::mem::zeroed();
            esp_idf_svc::sys::esp_wifi_sta_get_ap_info(&mut ap_info) == esp_idf_svc::sys::ESP_OK
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_connected(&self) -> bool {
        self.sim_connected
    }

    #[cfg(target_os = "espidf")]
    fn platform_local_ip(&self) -> Option<Ipv4Addr> {
        unsafe {
            let netif = esp_idf_svc::sys::esp_netif_get_handle_from_ifkey(c"WIFI_STA_DEF".as_ptr());
            if netif.is_null() {
                return None;
            }
            let mut ip_info: esp_idf_svc::sys::esp_netif_ip_info_t = core::mem::zeroed();
            if esp_idf_svc::sys::esp_netif_get_ip_info(netif, &mut ip_info)
                != esp_idf_svc::sys::ESP_OK
            {
                return None;
            }
            if ip_info.ip.addr == 0 {
                return None;
            }
            Some(Ipv4Addr::from(u32::from_be(ip_info.ip.addr)))
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_local_ip(&self) -> Option<Ipv4Addr> {
        if self.sim_connected { self.sim_ip } else { None }
    }

    #[cfg(target_os = "espidf")]
    fn platform_disconnect(&mut self) {
        unsafe {
            esp_idf_svc::sys::esp_wifi_disconnect();
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_disconnect(&mut self) {
        self.sim_connected = false;
        self.sim_ip = None;
    }
}

impl WirelessPort for WifiAdapter {
    fn mode(&self) -> WirelessMode {
        self.mode
    }

    fn is_connected(&self) -> bool {
        self.platform_is_connected()
    }

    fn local_ip(&self) -> Option<Ipv4Addr> {
        self.platform_local_ip()
    }

    fn set_mode(&mut self, mode: WirelessMode) {
        if self.mode != mode {
            info!("WiFi: mode {:?} -> {:?}", self.mode, mode);
        }
        self.mode = mode;
    }

    fn disconnect(&mut self) {
        self.platform_disconnect();
        info!("WiFi: disconnected");
    }

    fn associate(&mut self, ssid: &str, password: &str) {
        // Capacities match the command decoder's limits, so these cannot
        // overflow on the responder path.
        self.ssid.clear();
        self.ssid.push_str(ssid).ok();
        self.password.clear();
        self.password.push_str(password).ok();
        self.platform_associate();
    }
}

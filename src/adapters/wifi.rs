//! WiFi station-mode adapter.
//!
//! Implements [`NetworkPort`]: the hexagonal boundary for joining a
//! wireless network.  `begin_join` configures the station and starts
//! association without blocking; the bounded wait lives in
//! [`crate::network::join`], which polls `is_associated`.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation stubs for host-side tests, driven
//!   by a [`SimTime`] handle so association can be scheduled.

use log::{info, warn};

use crate::app::ports::NetworkPort;
use crate::error::JoinError;
use crate::session::CredentialPair;

#[cfg(target_os = "espidf")]
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::modem::Modem,
    nvs::EspDefaultNvsPartition,
    sys::EspError,
    wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi},
};

#[cfg(not(target_os = "espidf"))]
use crate::adapters::time::SimTime;

// ───────────────────────────────────────────────────────────────
// Simulated link behaviour (host only)
// ───────────────────────────────────────────────────────────────

/// How the simulated access point responds to a join.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimLink {
    /// Associates this long after `begin_join`.
    AssociateAfter { ms: u64 },
    /// Out of range: never associates.
    Never,
    /// Driver refuses the configuration.
    Reject,
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    #[cfg(target_os = "espidf")]
    wifi: EspWifi<'static>,
    ssid: heapless::String<32>,
    #[cfg(not(target_os = "espidf"))]
    time: SimTime,
    #[cfg(not(target_os = "espidf"))]
    link: SimLink,
    #[cfg(not(target_os = "espidf"))]
    joined_at: Option<u64>,
    #[cfg(not(target_os = "espidf"))]
    join_calls: u32,
}

#[cfg(target_os = "espidf")]
impl WifiAdapter {
    pub fn new(
        modem: Modem,
        sys_loop: EspSystemEventLoop,
        nvs: Option<EspDefaultNvsPartition>,
    ) -> Result<Self, EspError> {
        let wifi = EspWifi::new(modem, sys_loop, nvs)?;
        info!("WiFi: station driver initialised");
        Ok(Self {
            wifi,
            ssid: heapless::String::new(),
        })
    }
}

#[cfg(not(target_os = "espidf"))]
impl WifiAdapter {
    pub fn simulated(time: SimTime, link: SimLink) -> Self {
        Self {
            ssid: heapless::String::new(),
            time,
            link,
            joined_at: None,
            join_calls: 0,
        }
    }

    /// Change the simulated access point's behaviour, e.g. walking out
    /// of range.  An already-started join is re-evaluated against it.
    pub fn set_link(&mut self, link: SimLink) {
        self.link = link;
    }

    pub fn join_calls(&self) -> u32 {
        self.join_calls
    }
}

impl WifiAdapter {
    /// Network most recently passed to `begin_join`.
    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_begin(&mut self, credentials: &CredentialPair) -> Result<(), JoinError> {
        let auth_method = if credentials.secret.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let config = Configuration::Client(ClientConfiguration {
            ssid: credentials
                .name
                .as_str()
                .try_into()
                .map_err(|_| JoinError::Rejected)?,
            password: credentials
                .secret
                .as_str()
                .try_into()
                .map_err(|_| JoinError::Rejected)?,
            auth_method,
            ..Default::default()
        });

        let started = self
            .wifi
            .set_configuration(&config)
            .and_then(|()| self.wifi.start())
            .and_then(|()| self.wifi.connect());
        started.map_err(|e| {
            warn!("WiFi: station start failed: {}", e);
            JoinError::Rejected
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_begin(&mut self, _credentials: &CredentialPair) -> Result<(), JoinError> {
        self.join_calls += 1;
        if self.link == SimLink::Reject {
            warn!("WiFi(sim): configuration rejected");
            return Err(JoinError::Rejected);
        }
        self.joined_at = Some(self.time.now_ms());
        info!("WiFi(sim): association started at {} ms", self.time.now_ms());
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_associated(&mut self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_associated(&mut self) -> bool {
        match (self.joined_at, self.link) {
            (Some(at), SimLink::AssociateAfter { ms }) => self.time.now_ms() >= at + ms,
            _ => false,
        }
    }
}

impl NetworkPort for WifiAdapter {
    fn begin_join(&mut self, credentials: &CredentialPair) -> Result<(), JoinError> {
        self.ssid = credentials.name.clone();
        self.platform_begin(credentials)
    }

    fn is_associated(&mut self) -> bool {
        self.platform_is_associated()
    }
}

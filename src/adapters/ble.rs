//! BLE pairing adapter.
//!
//! Implements [`PairingPort`]: the hexagonal boundary for delivering
//! network credentials over Bluetooth Low Energy.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: NimBLE GATT server via `esp32_nimble`.
//! - **all other targets**: simulation stubs for host-side tests, with
//!   `inject_*` helpers standing in for a phone.
//!
//! ## GATT Service Layout
//!
//! | Characteristic | UUID                                     | Perms |
//! |----------------|------------------------------------------|-------|
//! | Credentials    | `beb5483e-36e1-4688-b7f5-ea07361b26a8`   | Write |
//!
//! The service (`4fafc201-…-c5c9c331914b`) is advertised under the
//! configured device name.  A write carries `<name>:<secret>` as UTF-8.
//!
//! ## Callback context
//!
//! NimBLE runs callbacks on its host task.  They only parse and store
//! into the shared [`PairingMailbox`]; the main loop pulls events with
//! [`PairingPort::next_event`].

use std::sync::Arc;

use log::{info, warn};

use crate::app::ports::PairingPort;
use crate::config::CollarConfig;
use crate::error::PairingError;
use crate::events::{PairingEvent, PairingMailbox};
use crate::session::CredentialPair;

#[cfg(target_os = "espidf")]
use esp32_nimble::{utilities::BleUuid, BLEAdvertisementData, BLEDevice, NimbleProperties};

// ───────────────────────────────────────────────────────────────
// Callback bodies (shared by the NimBLE path and the simulation)
// ───────────────────────────────────────────────────────────────

fn on_peer_connected(mailbox: &PairingMailbox) {
    info!("BLE: peer connected");
    mailbox.set_peer(true);
}

fn on_peer_disconnected(mailbox: &PairingMailbox) {
    info!("BLE: peer disconnected, advertising re-armed");
    mailbox.set_peer(false);
}

/// Malformed payloads raise nothing.
fn on_credentials_write(mailbox: &PairingMailbox, payload: &[u8]) {
    match CredentialPair::parse(payload) {
        Some(pair) => {
            info!("BLE: credentials written for network '{}'", pair.name);
            mailbox.put_credentials(pair);
        }
        None => warn!("BLE: ignoring malformed credential write ({} bytes)", payload.len()),
    }
}

// ───────────────────────────────────────────────────────────────
// BLE adapter
// ───────────────────────────────────────────────────────────────

pub struct BlePairingAdapter {
    device_name: heapless::String<24>,
    service_uuid: heapless::String<36>,
    credentials_uuid: heapless::String<36>,
    mailbox: Arc<PairingMailbox>,
    enabled: bool,
    #[cfg(not(target_os = "espidf"))]
    sim: SimStats,
}

/// Host-side record of what the stack was asked to do.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SimStats {
    pub enable_calls: u32,
    pub disable_calls: u32,
    /// Times the stack was actually torn down (disable while enabled).
    pub releases: u32,
    pub fail_enable: bool,
}

impl BlePairingAdapter {
    pub fn new(config: &CollarConfig) -> Self {
        Self {
            device_name: config.device_name.clone(),
            service_uuid: config.service_uuid.clone(),
            credentials_uuid: config.credentials_uuid.clone(),
            mailbox: Arc::new(PairingMailbox::new()),
            enabled: false,
            #[cfg(not(target_os = "espidf"))]
            sim: SimStats::default(),
        }
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_enable(&mut self) -> Result<(), PairingError> {
        let service_uuid = BleUuid::from_uuid128_string(&self.service_uuid)
            .map_err(|_| PairingError::ServiceSetupFailed)?;
        let credentials_uuid = BleUuid::from_uuid128_string(&self.credentials_uuid)
            .map_err(|_| PairingError::ServiceSetupFailed)?;

        let device = BLEDevice::take();
        BLEDevice::set_device_name(&self.device_name).map_err(|e| {
            warn!("BLE: set_device_name failed: {:?}", e);
            PairingError::StackInitFailed
        })?;

        let server = device.get_server();
        server.advertise_on_disconnect(true);

        let mb = Arc::clone(&self.mailbox);
        server.on_connect(move |_server, _desc| on_peer_connected(&mb));
        let mb = Arc::clone(&self.mailbox);
        server.on_disconnect(move |_desc, _reason| on_peer_disconnected(&mb));

        let service = server.create_service(service_uuid);
        let characteristic = service
            .lock()
            .create_characteristic(credentials_uuid, NimbleProperties::WRITE);
        let mb = Arc::clone(&self.mailbox);
        characteristic
            .lock()
            .on_write(move |args| on_credentials_write(&mb, args.recv_data()));

        let advertising = device.get_advertising();
        advertising
            .lock()
            .set_data(
                BLEAdvertisementData::new()
                    .name(&self.device_name)
                    .add_service_uuid(service_uuid),
            )
            .map_err(|e| {
                warn!("BLE: advertising data rejected: {:?}", e);
                PairingError::AdvertisingFailed
            })?;
        advertising.lock().start().map_err(|e| {
            warn!("BLE: advertising start failed: {:?}", e);
            PairingError::AdvertisingFailed
        })?;

        info!("BLE: advertising as '{}'", self.device_name);
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_enable(&mut self) -> Result<(), PairingError> {
        self.sim.enable_calls += 1;
        if self.sim.fail_enable {
            warn!("BLE(sim): simulated stack init failure");
            return Err(PairingError::StackInitFailed);
        }
        info!(
            "BLE(sim): advertising as '{}' (service {}, credentials {})",
            self.device_name, self.service_uuid, self.credentials_uuid
        );
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_disable(&mut self) {
        if let Err(e) = BLEDevice::take().get_advertising().lock().stop() {
            warn!("BLE: advertising stop failed: {:?}", e);
        }
        if let Err(e) = BLEDevice::deinit() {
            warn!("BLE: deinit failed: {:?}", e);
        }
        info!("BLE: stack released");
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_disable(&mut self) {
        self.sim.releases += 1;
        info!("BLE(sim): stack released");
    }
}

// ───────────────────────────────────────────────────────────────
// Simulation hooks (host only)
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
impl BlePairingAdapter {
    pub fn stats(&self) -> SimStats {
        self.sim
    }

    /// Make the next `enable()` fail.
    pub fn fail_next_enable(&mut self) {
        self.sim.fail_enable = true;
    }

    pub fn inject_peer_connected(&self) {
        on_peer_connected(&self.mailbox);
    }

    pub fn inject_peer_disconnected(&self) {
        on_peer_disconnected(&self.mailbox);
    }

    /// Deliver a raw characteristic write, exactly as the stack would.
    pub fn inject_write(&self, payload: &[u8]) {
        on_credentials_write(&self.mailbox, payload);
    }

    /// Shared handle, as held by the stack's callbacks.
    pub fn mailbox(&self) -> Arc<PairingMailbox> {
        Arc::clone(&self.mailbox)
    }
}

impl PairingPort for BlePairingAdapter {
    fn enable(&mut self) -> Result<(), PairingError> {
        if self.enabled {
            return Ok(());
        }
        self.platform_enable()?;
        self.enabled = true;
        Ok(())
    }

    fn disable(&mut self) {
        #[cfg(not(target_os = "espidf"))]
        {
            self.sim.disable_calls += 1;
        }
        if !self.enabled {
            return;
        }
        self.platform_disable();
        self.enabled = false;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn next_event(&mut self) -> Option<PairingEvent> {
        self.mailbox.next()
    }
}

//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::LongPress => {
                info!("INPUT | long press");
            }
            AppEvent::PeerConnected => {
                info!("PAIR  | peer connected");
            }
            AppEvent::PeerDisconnected => {
                info!("PAIR  | peer disconnected");
            }
            AppEvent::CredentialsReceived { network } => {
                info!("PAIR  | credentials received for '{}'", network);
            }
            AppEvent::IdentityCaptured(id) => {
                info!("IDENT | {}", id);
            }
            AppEvent::ProvisioningFailed(cause) => {
                warn!("FAIL  | cause={}", cause);
            }
            AppEvent::Provisioned { network } => {
                info!("DONE  | joined '{}'", network);
            }
            AppEvent::ZoneChanged(zone) => {
                info!("ZONE  | {:?}", zone);
            }
            AppEvent::LocationReported { latitude, longitude } => {
                info!("GEO   | reported {:.6}, {:.6}", latitude, longitude);
            }
        }
    }
}

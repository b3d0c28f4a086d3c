//! Pairing event hand-off.
//!
//! The BLE stack invokes its callbacks on its own host task, not on the
//! main loop, and the main loop may be inside a multi-second blocking
//! call when they fire.  Callbacks therefore store into latest-wins
//! slots rather than a queue: the peer slot holds the most recent
//! connection state, the credential slot the most recent well-formed
//! payload.  Nothing a callback stores can be lost to back-pressure.
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────────┐     ┌──────────────┐
//! │ on_connect       │────▶│ peer: Signal<bool>   │     │              │
//! │ on_disconnect    │────▶│                      │────▶│  AppService  │
//! │ on_write (creds) │────▶│ creds: Signal<Pair>  │     │  (consumer)  │
//! └──────────────────┘     └──────────────────────┘     └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use crate::session::CredentialPair;

/// Events surfaced by the pairing service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingEvent {
    PeerConnected,
    /// Advertising has already been re-armed when this is observed.
    PeerDisconnected,
    /// A well-formed `<name>:<secret>` payload was written.
    CredentialsWritten(CredentialPair),
}

/// Latest-wins hand-off between the BLE host task and the main loop.
pub struct PairingMailbox {
    peer: Signal<CriticalSectionRawMutex, bool>,
    credentials: Signal<CriticalSectionRawMutex, CredentialPair>,
}

impl Default for PairingMailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl PairingMailbox {
    pub const fn new() -> Self {
        Self {
            peer: Signal::new(),
            credentials: Signal::new(),
        }
    }

    /// Record the peer's connection state, replacing any unread one.
    pub fn set_peer(&self, connected: bool) {
        self.peer.signal(connected);
    }

    /// Store a payload, replacing any unread one.
    pub fn put_credentials(&self, pair: CredentialPair) {
        self.credentials.signal(pair);
    }

    /// Next unread slot as an event: peer state first, then credentials.
    pub fn next(&self) -> Option<PairingEvent> {
        if let Some(connected) = self.peer.try_take() {
            return Some(if connected {
                PairingEvent::PeerConnected
            } else {
                PairingEvent::PeerDisconnected
            });
        }
        self.credentials.try_take().map(PairingEvent::CredentialsWritten)
    }
}

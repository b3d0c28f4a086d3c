//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService / FSM (domain)
//! ```
//!
//! Driven adapters (clock, modem link, WiFi station, BLE pairing, LED,
//! event sinks) implement these traits.  The domain core never touches
//! hardware directly, and every bounded wait reads time only through
//! [`Clock`], so tests substitute a simulated clock.

use embedded_hal::delay::DelayNs;

use crate::error::{JoinError, ModemError, PairingError};
use crate::events::PairingEvent;
use crate::session::CredentialPair;

// ───────────────────────────────────────────────────────────────
// Clock (monotonic time + blocking delay)
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock.  Blocking delays come from
/// [`DelayNs`]; a simulated clock advances its own time inside them.
pub trait Clock: DelayNs {
    /// Milliseconds since boot.
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Modem port (driven adapter: domain ↔ cellular modem)
// ───────────────────────────────────────────────────────────────

/// Raw access to the cellular modem: its power key and byte stream.
/// No framing or parsing happens at this level.
pub trait ModemPort {
    /// Drive the power-key rail.
    fn set_power_rail(&mut self, high: bool);

    /// Queue bytes for transmission.
    fn write(&mut self, bytes: &[u8]) -> Result<(), ModemError>;

    /// Copy whatever has arrived into `buf` without blocking.
    /// Returns the number of bytes written to `buf`.
    fn read_available(&mut self, buf: &mut [u8]) -> usize;
}

// ───────────────────────────────────────────────────────────────
// Network port (driven adapter: domain → WiFi station)
// ───────────────────────────────────────────────────────────────

pub trait NetworkPort {
    /// Configure the station and start association.  Non-blocking.
    fn begin_join(&mut self, credentials: &CredentialPair) -> Result<(), JoinError>;

    /// Current association status.
    fn is_associated(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Pairing port (driven adapter: domain ↔ BLE GATT server)
// ───────────────────────────────────────────────────────────────

pub trait PairingPort {
    /// Start advertising the credential service.
    fn enable(&mut self) -> Result<(), PairingError>;

    /// Stop advertising and release the stack.  Idempotent.
    fn disable(&mut self);

    fn is_enabled(&self) -> bool;

    /// Next pending event from the stack's callback context.
    fn next_event(&mut self) -> Option<PairingEvent>;
}

// ───────────────────────────────────────────────────────────────
// Indicator port (domain → status LED)
// ───────────────────────────────────────────────────────────────

pub trait IndicatorPort {
    fn set_led(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// GPS port (positioning receiver byte stream)
// ───────────────────────────────────────────────────────────────

pub trait GpsPort {
    /// Copy whatever NMEA bytes have arrived into `buf` without blocking.
    fn read_available(&mut self, buf: &mut [u8]) -> usize;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Board: the ports a state handler may drive during one tick
// ───────────────────────────────────────────────────────────────

/// Borrowed bundle of every port the state machine drives.
///
/// Built by the caller for the duration of one tick, so adapters stay
/// owned by the main loop (or the test).
pub struct Board<'a> {
    pub clock: &'a mut dyn Clock,
    pub modem: &'a mut dyn ModemPort,
    pub network: &'a mut dyn NetworkPort,
    pub pairing: &'a mut dyn PairingPort,
}

//! Error types for the SmartCollar firmware.
//!
//! One typed enum per boundary (pairing, modem, network, hardware init,
//! config), each with a hand-written `Display`.

use core::fmt;

pub use crate::config::ConfigError;

// ---------------------------------------------------------------------------
// Pairing errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingError {
    /// The BLE stack could not be brought up.
    StackInitFailed,
    /// GATT service or characteristic registration failed.
    ServiceSetupFailed,
    /// Advertising could not be started.
    AdvertisingFailed,
}

impl fmt::Display for PairingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StackInitFailed => write!(f, "BLE stack initialisation failed"),
            Self::ServiceSetupFailed => write!(f, "GATT service setup failed"),
            Self::AdvertisingFailed => write!(f, "BLE advertising failed to start"),
        }
    }
}

impl std::error::Error for PairingError {}

// ---------------------------------------------------------------------------
// Modem errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModemError {
    /// Bytes could not be queued for transmission.
    WriteFailed(i32),
}

impl fmt::Display for ModemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WriteFailed(rc) => write!(f, "modem UART write failed (rc={})", rc),
        }
    }
}

impl std::error::Error for ModemError {}

// ---------------------------------------------------------------------------
// Network join errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinError {
    /// The station interface rejected the credentials before associating.
    Rejected,
    /// Association did not complete within the bound.
    Timeout { waited_ms: u64 },
}

impl fmt::Display for JoinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected => write!(f, "network join rejected by the station driver"),
            Self::Timeout { waited_ms } => {
                write!(f, "network association timed out after {} ms", waited_ms)
            }
        }
    }
}

impl std::error::Error for JoinError {}

// ---------------------------------------------------------------------------
// Hardware init errors
// ---------------------------------------------------------------------------

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    /// `gpio_config` rejected a pin.
    GpioConfigFailed { pin: i32, code: i32 },
}

impl fmt::Display for HwInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioConfigFailed { pin, code } => {
                write!(f, "GPIO{} config failed (rc={})", pin, code)
            }
        }
    }
}

impl std::error::Error for HwInitError {}

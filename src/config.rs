//! System configuration parameters
//!
//! All tunable parameters for the SmartCollar firmware.  Every value is a
//! compiled-in default: the collar has no runtime configuration channel
//! and nothing is persisted across power cycles.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Provisioning firmware configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollarConfig {
    // --- Pairing ---
    /// BLE advertised local name.
    pub device_name: heapless::String<24>,
    /// Primary GATT service UUID (canonical 8-4-4-4-12 form).
    pub service_uuid: heapless::String<36>,
    /// Write-only credential characteristic UUID.
    pub credentials_uuid: heapless::String<36>,

    // --- Outer loop ---
    /// Sleep between outer-loop iterations (milliseconds)
    pub loop_period_ms: u32,
    /// Minimum continuous hold to register a long press (milliseconds)
    pub long_press_ms: u32,

    // --- Modem power sequence ---
    /// Power rail held low during the power-key pulse (milliseconds)
    pub modem_power_low_ms: u32,
    /// Settle time after releasing the power rail (milliseconds)
    pub modem_power_settle_ms: u32,
    /// Boot wait before the first AT command (milliseconds)
    pub modem_boot_ms: u32,

    // --- Identity query ---
    pub identity_command: heapless::String<16>,
    /// Response collection window (milliseconds)
    pub identity_window_ms: u32,
    /// Minimum trimmed response length accepted as an identity
    pub min_identity_len: usize,

    // --- Network join ---
    /// Upper bound on association time (milliseconds)
    pub join_bound_ms: u32,
    /// Association status poll interval (milliseconds)
    pub join_poll_ms: u32,

    // --- Modem power-down ---
    pub power_down_command: heapless::String<16>,
    /// Collection window for the power-down acknowledgement (milliseconds)
    pub power_down_window_ms: u32,

    // --- Status LED ---
    /// Half-period of the "awaiting peer" blink (milliseconds)
    pub slow_blink_half_period_ms: u32,
    /// Half-period of the failure blink (milliseconds)
    pub fast_blink_half_period_ms: u32,

    // --- Watchdog ---
    /// Task watchdog timeout; must outlast the longest blocking wait
    pub watchdog_timeout_ms: u32,
}

impl Default for CollarConfig {
    fn default() -> Self {
        Self {
            device_name: fixed("SmartCollar"),
            service_uuid: fixed("4fafc201-1fb5-459e-8fcc-c5c9c331914b"),
            credentials_uuid: fixed("beb5483e-36e1-4688-b7f5-ea07361b26a8"),

            loop_period_ms: 10,
            long_press_ms: 2_000,

            modem_power_low_ms: 1_000,
            modem_power_settle_ms: 100,
            modem_boot_ms: 3_000,

            identity_command: fixed("AT+CGSN"),
            identity_window_ms: 2_000,
            min_identity_len: 15,

            join_bound_ms: 120_000, // 2 min
            join_poll_ms: 500,

            power_down_command: fixed("AT+QPOWD"),
            power_down_window_ms: 5_000,

            slow_blink_half_period_ms: 500,
            fast_blink_half_period_ms: 200,

            watchdog_timeout_ms: 150_000,
        }
    }
}

impl CollarConfig {
    /// Longest single blocking call the state machine can make.
    pub fn longest_blocking_ms(&self) -> u32 {
        let power_on = self.modem_power_low_ms + self.modem_power_settle_ms + self.modem_boot_ms;
        // Connected entry runs inside the same tick as the final join poll.
        let join = self.join_bound_ms + self.join_poll_ms + self.power_down_window_ms;
        power_on.max(self.identity_window_ms).max(join)
    }

    /// Reject timings that would stall or starve the outer loop.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.loop_period_ms == 0 {
            return Err(ConfigError::ValidationFailed("loop_period_ms must be > 0"));
        }
        if self.long_press_ms == 0 {
            return Err(ConfigError::ValidationFailed("long_press_ms must be > 0"));
        }
        if self.join_poll_ms == 0 || self.join_poll_ms > self.join_bound_ms {
            return Err(ConfigError::ValidationFailed(
                "join_poll_ms must be in 1..=join_bound_ms",
            ));
        }
        if self.slow_blink_half_period_ms == 0 || self.fast_blink_half_period_ms == 0 {
            return Err(ConfigError::ValidationFailed("blink half-periods must be > 0"));
        }
        if self.device_name.is_empty() {
            return Err(ConfigError::ValidationFailed("device_name must not be empty"));
        }
        if self.watchdog_timeout_ms <= self.longest_blocking_ms() {
            return Err(ConfigError::ValidationFailed(
                "watchdog_timeout_ms must exceed the longest blocking wait",
            ));
        }
        Ok(())
    }
}

/// Geofence tracker image configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeofenceConfig {
    /// Home network whose presence defines the safe zone.
    pub home_ssid: heapless::String<32>,
    pub home_password: heapless::String<64>,
    /// SMS destination in international format.
    pub sms_recipient: heapless::String<20>,
    /// Settle time after starting the first join (milliseconds)
    pub boot_join_wait_ms: u32,
    /// Delay between presence checks while inside the zone (milliseconds)
    pub recheck_interval_ms: u32,
    /// Pause between SMS submission steps (milliseconds)
    pub command_pause_ms: u32,
    /// Minimum spacing between two location reports (milliseconds)
    pub min_report_interval_ms: u32,
    /// Sleep between tracker polls while outside (milliseconds)
    pub loop_period_ms: u32,
    /// Task watchdog timeout; must outlast the boot wait and a recheck
    pub watchdog_timeout_ms: u32,
    /// GPS UART baud rate
    pub gps_baud: u32,
    /// Modem UART baud rate
    pub modem_baud: u32,
}

impl Default for GeofenceConfig {
    fn default() -> Self {
        Self {
            home_ssid: fixed(option_env!("COLLAR_HOME_SSID").unwrap_or("YourWiFiSSID")),
            home_password: fixed(option_env!("COLLAR_HOME_PASSWORD").unwrap_or("YourWiFiPassword")),
            sms_recipient: fixed(option_env!("COLLAR_SMS_RECIPIENT").unwrap_or("+910000000000")),
            boot_join_wait_ms: 5_000,
            recheck_interval_ms: 30_000,
            command_pause_ms: 100,
            min_report_interval_ms: 10_000,
            loop_period_ms: 10,
            watchdog_timeout_ms: 60_000,
            gps_baud: 9_600,
            modem_baud: 115_200,
        }
    }
}

impl GeofenceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.home_ssid.is_empty() {
            return Err(ConfigError::ValidationFailed("home_ssid must not be empty"));
        }
        if self.sms_recipient.is_empty() {
            return Err(ConfigError::ValidationFailed("sms_recipient must not be empty"));
        }
        if self.recheck_interval_ms == 0 || self.loop_period_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "recheck_interval_ms and loop_period_ms must be > 0",
            ));
        }
        let longest = self.boot_join_wait_ms.max(self.recheck_interval_ms);
        if self.watchdog_timeout_ms <= longest {
            return Err(ConfigError::ValidationFailed(
                "watchdog_timeout_ms must exceed the longest blocking wait",
            ));
        }
        Ok(())
    }
}

/// Errors from configuration validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Copy a compile-time string into a fixed-capacity buffer, truncating
/// at a char boundary if it does not fit.
fn fixed<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

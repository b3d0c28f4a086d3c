//! GPIO / peripheral pin assignments for the SmartCollar board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// User button (active-low, internal pull-up)
// ---------------------------------------------------------------------------

/// Momentary push-button.  LOW = pressed.
pub const BUTTON_GPIO: i32 = 0;

// ---------------------------------------------------------------------------
// Status LED (single colour, active HIGH)
// ---------------------------------------------------------------------------

pub const LED_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// Cellular modem (Quectel-class, PWRKEY through a transistor)
// ---------------------------------------------------------------------------

/// Digital output driving the modem power key.
pub const MODEM_POWER_GPIO: i32 = 4;
pub const MODEM_UART_RX_GPIO: i32 = 16;
pub const MODEM_UART_TX_GPIO: i32 = 17;
pub const MODEM_UART_BAUD: u32 = 115_200;

// ---------------------------------------------------------------------------
// Geofence image (separate board revision)
// ---------------------------------------------------------------------------

/// GPS receiver on UART1, receive only.
pub const GEOFENCE_GPS_UART_RX_GPIO: i32 = 16;
/// Modem on UART2.
pub const GEOFENCE_MODEM_UART_RX_GPIO: i32 = 18;
pub const GEOFENCE_MODEM_UART_TX_GPIO: i32 = 19;

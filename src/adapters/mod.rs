//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter      | Implements     | Connects to                 |
//! |--------------|----------------|-----------------------------|
//! | `ble`        | PairingPort    | NimBLE GATT server          |
//! | `gps_uart`   | GpsPort        | GPS receiver UART (NMEA)    |
//! | `log_sink`   | EventSink      | Serial log output           |
//! | `modem_uart` | ModemPort      | Modem UART + power key GPIO |
//! | `time`       | Clock          | ESP32 system timer          |
//! | `wifi`       | NetworkPort    | ESP-IDF WiFi STA            |

pub mod ble;
pub mod gps_uart;
pub mod log_sink;
pub mod modem_uart;
pub mod time;
pub mod wifi;

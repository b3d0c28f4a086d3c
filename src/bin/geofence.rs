//! SmartCollar Firmware: Geofence Tracker Entry Point
//!
//! Treats the home WiFi network as the safe zone.  Away from it, GPS
//! fixes are sent by SMS through the cellular modem.
//!
//! ```text
//!  WifiAdapter ─┐
//!  GpsUart ─────┼──▶ GeofenceTracker ──▶ ModemUart (SMS)
//!  SystemClock ─┘            │
//!                            └──▶ LogEventSink
//! ```
#![deny(unused_must_use)]

use anyhow::{Context, Result};
use embedded_hal::delay::DelayNs;
use log::info;

use esp_idf_hal::gpio::AnyIOPin;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::uart::{config::Config as UartConfig, UartDriver, UartRxDriver};
use esp_idf_hal::units::Hertz;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;

use smartcollar::adapters::gps_uart::GpsUart;
use smartcollar::adapters::log_sink::LogEventSink;
use smartcollar::adapters::modem_uart::ModemUart;
use smartcollar::adapters::time::SystemClock;
use smartcollar::adapters::wifi::WifiAdapter;
use smartcollar::config::GeofenceConfig;
use smartcollar::drivers::hw_init;
use smartcollar::drivers::watchdog::Watchdog;
use smartcollar::pins;
use smartcollar::tracker::{GeofenceTracker, TrackerIo, Zone};

fn main() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;
    info!("SmartCollar geofence v{}", env!("CARGO_PKG_VERSION"));

    let config = GeofenceConfig::default();
    config.validate().context("invalid geofence configuration")?;

    hw_init::init_peripherals().context("GPIO init failed")?;
    let mut watchdog = Watchdog::subscribe(config.watchdog_timeout_ms);

    let peripherals = Peripherals::take()?;
    let sys_loop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // ── UARTs: GPS on UART1 (RX only), modem on UART2 ─────────
    let gps_uart = UartRxDriver::new(
        peripherals.uart1,
        peripherals.pins.gpio16,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &UartConfig::default().baudrate(Hertz(config.gps_baud)),
    )
    .context("GPS UART init failed")?;
    let modem_uart = UartDriver::new(
        peripherals.uart2,
        peripherals.pins.gpio19,
        peripherals.pins.gpio18,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &UartConfig::default().baudrate(Hertz(config.modem_baud)),
    )
    .context("modem UART init failed")?;
    info!(
        "UARTs: GPS RX GPIO{}, modem TX GPIO{} RX GPIO{}",
        pins::GEOFENCE_GPS_UART_RX_GPIO,
        pins::GEOFENCE_MODEM_UART_TX_GPIO,
        pins::GEOFENCE_MODEM_UART_RX_GPIO
    );

    let mut clock = SystemClock::new();
    let mut gps = GpsUart::new(gps_uart);
    let mut modem = ModemUart::new(modem_uart, pins::MODEM_POWER_GPIO);
    let mut wifi = WifiAdapter::new(peripherals.modem, sys_loop, Some(nvs))
        .context("WiFi driver init failed")?;
    let mut sink = LogEventSink::new();

    let loop_period_ms = config.loop_period_ms;
    let mut tracker = GeofenceTracker::new(config);
    let mut io = TrackerIo {
        clock: &mut clock,
        network: &mut wifi,
        gps: &mut gps,
        modem: &mut modem,
    };

    match tracker.boot(&mut io) {
        Ok(zone) => info!("Geofence: starting {:?}", zone),
        Err(e) => log::warn!("Geofence: home join not started ({}), tracking as outside", e),
    }
    watchdog.feed();

    loop {
        if tracker.poll(&mut io, &mut sink) == Zone::Outside {
            io.clock.delay_ms(loop_period_ms);
        }
        watchdog.feed();
    }
}

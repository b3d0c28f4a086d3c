//! SmartCollar Firmware: Provisioning Entry Point
//!
//! Hexagonal architecture with a single cooperative polling loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  SystemClock   ModemUart     WifiAdapter    BlePairingAdapter  │
//! │  (Clock)       (ModemPort)   (NetworkPort)  (PairingPort)      │
//! │  StatusLed     LogEventSink                                    │
//! │  (Indicator)   (EventSink)                                     │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Button · FSM · LED patterns                           │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every iteration samples the button, runs one FSM tick and sleeps for
//! the loop period.  A tick may block for the modem boot or the network
//! join; nothing else is serviced meanwhile.
#![deny(unused_must_use)]

use anyhow::{Context, Result};
use embedded_hal::delay::DelayNs;
use log::info;

use esp_idf_hal::gpio::AnyIOPin;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::uart::{config::Config as UartConfig, UartDriver};
use esp_idf_hal::units::Hertz;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;

use smartcollar::adapters::ble::BlePairingAdapter;
use smartcollar::adapters::log_sink::LogEventSink;
use smartcollar::adapters::modem_uart::ModemUart;
use smartcollar::adapters::time::SystemClock;
use smartcollar::adapters::wifi::WifiAdapter;
use smartcollar::app::ports::Board;
use smartcollar::app::service::AppService;
use smartcollar::config::CollarConfig;
use smartcollar::drivers::button;
use smartcollar::drivers::hw_init;
use smartcollar::drivers::status_led::StatusLed;
use smartcollar::drivers::watchdog::Watchdog;
use smartcollar::pins;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  SmartCollar v{}                  ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration (compiled-in, validated) ─────────────
    let config = CollarConfig::default();
    config.validate().context("invalid collar configuration")?;

    // ── 3. Peripherals ────────────────────────────────────────
    hw_init::init_peripherals().context("GPIO init failed")?;
    let mut watchdog = Watchdog::subscribe(config.watchdog_timeout_ms);

    let peripherals = Peripherals::take()?;
    let sys_loop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    let uart_config = UartConfig::default().baudrate(Hertz(pins::MODEM_UART_BAUD));
    let uart = UartDriver::new(
        peripherals.uart2,
        peripherals.pins.gpio17,
        peripherals.pins.gpio16,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &uart_config,
    )
    .context("modem UART init failed")?;
    info!(
        "Modem UART: TX GPIO{} RX GPIO{} @ {} baud",
        pins::MODEM_UART_TX_GPIO,
        pins::MODEM_UART_RX_GPIO,
        pins::MODEM_UART_BAUD
    );

    // ── 4. Adapters ───────────────────────────────────────────
    let mut clock = SystemClock::new();
    let mut modem = ModemUart::new(uart, pins::MODEM_POWER_GPIO);
    let mut wifi = WifiAdapter::new(peripherals.modem, sys_loop, Some(nvs))
        .context("WiFi driver init failed")?;
    let mut ble = BlePairingAdapter::new(&config);
    let mut led = StatusLed::new(pins::LED_GPIO);
    let mut sink = LogEventSink::new();

    // ── 5. Application core ───────────────────────────────────
    let loop_period_ms = config.loop_period_ms;
    let mut app = AppService::new(config);
    {
        let mut board = Board {
            clock: &mut clock,
            modem: &mut modem,
            network: &mut wifi,
            pairing: &mut ble,
        };
        app.start(&mut board, &mut led, &mut sink);
    }

    info!("Entering main loop ({} ms period)", loop_period_ms);

    // ── 6. Outer loop ─────────────────────────────────────────
    loop {
        let pressed = button::read_pressed(pins::BUTTON_GPIO);
        {
            let mut board = Board {
                clock: &mut clock,
                modem: &mut modem,
                network: &mut wifi,
                pairing: &mut ble,
            };
            app.tick(pressed, &mut board, &mut led, &mut sink);
        }
        watchdog.feed();
        clock.delay_ms(loop_period_ms);
    }
}

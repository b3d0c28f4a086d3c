//! AT-command transport and modem power control.
//!
//! The transport sends one command line and then collects every byte
//! that arrives until the collection window closes.  There is no early
//! exit on `OK`/`ERROR` and no parsing: callers inspect the blob.
//!
//! ```text
//!  write "AT+CGSN\r\n" ──▶ ┌────── window_ms ──────┐ ──▶ AtResponse
//!                          │ drain · sleep · drain │
//!                          └───────────────────────┘
//! ```

use core::fmt::Write as _;

use log::{debug, info, warn};

use crate::app::ports::{Clock, ModemPort};
use crate::error::ModemError;

/// Bytes kept from one collection window.  Later bytes are dropped.
pub const RESPONSE_CAPACITY: usize = 256;

/// Sleep between UART drains while a window is open.
const COLLECT_POLL_MS: u32 = 10;

/// Terminates an SMS body in text mode.
const CTRL_Z: u8 = 0x1A;

/// Raw bytes collected during one command window.
pub type AtResponse = heapless::Vec<u8, RESPONSE_CAPACITY>;

// ───────────────────────────────────────────────────────────────
// Command / response
// ───────────────────────────────────────────────────────────────

/// Send `command` and collect everything received within `window_ms`.
///
/// A failed write is logged and the window still runs; the result is
/// then usually empty.
pub fn send_command(
    modem: &mut dyn ModemPort,
    clock: &mut dyn Clock,
    command: &str,
    window_ms: u32,
) -> AtResponse {
    debug!("Modem: >> {}", command);
    if let Err(e) = write_line(modem, command) {
        warn!("Modem: {}", e);
    }
    collect(modem, clock, window_ms)
}

/// Write one command line, CR LF terminated.
pub fn write_line(modem: &mut dyn ModemPort, line: &str) -> Result<(), ModemError> {
    modem.write(line.as_bytes())?;
    modem.write(b"\r\n")
}

/// Accumulate received bytes until `window_ms` has elapsed.
pub fn collect(modem: &mut dyn ModemPort, clock: &mut dyn Clock, window_ms: u32) -> AtResponse {
    let start = clock.now_ms();
    let deadline = u64::from(window_ms);
    let mut response = AtResponse::new();
    let mut dropped = 0usize;
    let mut chunk = [0u8; 64];

    loop {
        loop {
            let n = modem.read_available(&mut chunk);
            if n == 0 {
                break;
            }
            for &b in &chunk[..n] {
                if response.push(b).is_err() {
                    dropped += 1;
                }
            }
        }

        if clock.now_ms().saturating_sub(start) >= deadline {
            break;
        }
        clock.delay_ms(COLLECT_POLL_MS);
    }

    if dropped > 0 {
        warn!("Modem: response overflow, {} bytes dropped", dropped);
    }
    response
}

/// Throw away anything sitting in the receive buffer.
pub fn discard_pending(modem: &mut dyn ModemPort) -> usize {
    let mut chunk = [0u8; 64];
    let mut total = 0;
    loop {
        let n = modem.read_available(&mut chunk);
        if n == 0 {
            return total;
        }
        total += n;
    }
}

// ───────────────────────────────────────────────────────────────
// Power control
// ───────────────────────────────────────────────────────────────

/// Timing of the power-key pulse and boot wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerSequence {
    pub low_ms: u32,
    pub settle_ms: u32,
    pub boot_ms: u32,
}

/// Pulse the power key (rail low, pause, rail high, settle) and wait
/// for the modem to boot.  Blocks for the whole sequence.
pub fn power_on(modem: &mut dyn ModemPort, clock: &mut dyn Clock, seq: PowerSequence) {
    modem.set_power_rail(false);
    clock.delay_ms(seq.low_ms);
    modem.set_power_rail(true);
    clock.delay_ms(seq.settle_ms);
    info!("Modem: power key released, waiting {} ms for boot", seq.boot_ms);
    clock.delay_ms(seq.boot_ms);
}

/// Issue the power-down command and wait out its acknowledgement window.
pub fn power_down(
    modem: &mut dyn ModemPort,
    clock: &mut dyn Clock,
    command: &str,
    window_ms: u32,
) -> AtResponse {
    let ack = send_command(modem, clock, command, window_ms);
    info!("Modem: powered down ({} bytes acknowledged)", ack.len());
    ack
}

// ───────────────────────────────────────────────────────────────
// SMS (text mode)
// ───────────────────────────────────────────────────────────────

/// Submit a text-mode SMS.  Fire-and-forget: delivery is not confirmed.
pub fn send_sms(
    modem: &mut dyn ModemPort,
    clock: &mut dyn Clock,
    recipient: &str,
    body: &str,
    pause_ms: u32,
) -> Result<(), ModemError> {
    let mut submit = heapless::String::<48>::new();
    // Recipient is bounded by GeofenceConfig; overflow would only truncate.
    let _ = write!(submit, "AT+CMGS=\"{}\"", recipient);

    write_line(modem, "AT+CMGF=1")?;
    clock.delay_ms(pause_ms);
    write_line(modem, &submit)?;
    clock.delay_ms(pause_ms);
    write_line(modem, body)?;
    clock.delay_ms(pause_ms);
    modem.write(&[CTRL_Z])?;

    discard_pending(modem);
    info!("Modem: SMS submitted to {}", recipient);
    Ok(())
}

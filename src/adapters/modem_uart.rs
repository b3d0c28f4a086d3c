//! Cellular modem adapter.
//!
//! Implements [`ModemPort`]: the power-key rail on a GPIO and the AT
//! byte stream on a UART.  Reads never block; the collection windows
//! in [`crate::modem`] do the waiting.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_hal::uart::UartDriver` plus
//!   `hw_init::gpio_write` for the power key.
//! - **all other targets**: a scripted modem that answers known command
//!   lines and records everything it was sent.

use crate::app::ports::ModemPort;
use crate::drivers::hw_init;
use crate::error::ModemError;

#[cfg(target_os = "espidf")]
use esp_idf_hal::{delay::NON_BLOCK, uart::UartDriver};

#[cfg(not(target_os = "espidf"))]
use std::collections::VecDeque;

pub struct ModemUart {
    power_gpio: i32,
    #[cfg(target_os = "espidf")]
    uart: UartDriver<'static>,
    #[cfg(not(target_os = "espidf"))]
    sim: SimModem,
}

#[cfg(target_os = "espidf")]
impl ModemUart {
    pub fn new(uart: UartDriver<'static>, power_gpio: i32) -> Self {
        Self { power_gpio, uart }
    }
}

impl ModemPort for ModemUart {
    fn set_power_rail(&mut self, high: bool) {
        hw_init::gpio_write(self.power_gpio, high);
        #[cfg(not(target_os = "espidf"))]
        self.sim.rail.push(high);
    }

    #[cfg(target_os = "espidf")]
    fn write(&mut self, bytes: &[u8]) -> Result<(), ModemError> {
        self.uart
            .write(bytes)
            .map(|_| ())
            .map_err(|e| ModemError::WriteFailed(e.code()))
    }

    #[cfg(not(target_os = "espidf"))]
    fn write(&mut self, bytes: &[u8]) -> Result<(), ModemError> {
        self.sim.receive(bytes);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn read_available(&mut self, buf: &mut [u8]) -> usize {
        match self.uart.read(buf, NON_BLOCK) {
            Ok(n) => n,
            Err(e) => {
                log::warn!("Modem: UART read failed: {}", e);
                0
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_available(&mut self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(self.sim.rx.len());
        for (slot, b) in buf.iter_mut().zip(self.sim.rx.drain(..n)) {
            *slot = b;
        }
        n
    }
}

// ───────────────────────────────────────────────────────────────
// Scripted modem (host only)
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Default)]
struct SimModem {
    rail: Vec<bool>,
    written: Vec<u8>,
    partial: Vec<u8>,
    lines: Vec<String>,
    rx: VecDeque<u8>,
    script: Vec<(String, Vec<u8>)>,
}

#[cfg(not(target_os = "espidf"))]
impl SimModem {
    fn receive(&mut self, bytes: &[u8]) {
        self.written.extend_from_slice(bytes);
        for &b in bytes {
            // Ctrl-Z closes an SMS body and is never followed by CR LF.
            if b == 0x1A {
                self.partial.clear();
                continue;
            }
            self.partial.push(b);
            if self.partial.ends_with(b"\r\n") {
                let len = self.partial.len() - 2;
                let line = String::from_utf8_lossy(&self.partial[..len]).into_owned();
                self.partial.clear();
                if let Some((_, reply)) = self.script.iter().find(|(cmd, _)| *cmd == line) {
                    self.rx.extend(reply.iter().copied());
                }
                self.lines.push(line);
            }
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl ModemUart {
    pub fn simulated(power_gpio: i32) -> Self {
        Self {
            power_gpio,
            sim: SimModem::default(),
        }
    }

    /// Answer `command` with `reply` every time it is sent.
    pub fn script(&mut self, command: &str, reply: &[u8]) {
        self.sim.script.retain(|(cmd, _)| cmd != command);
        self.sim.script.push((command.to_owned(), reply.to_vec()));
    }

    /// Unsolicited bytes, e.g. a URC.
    pub fn push_rx(&mut self, bytes: &[u8]) {
        self.sim.rx.extend(bytes.iter().copied());
    }

    /// Every CR LF terminated line sent so far.
    pub fn lines(&self) -> &[String] {
        &self.sim.lines
    }

    pub fn count_line(&self, line: &str) -> usize {
        self.sim.lines.iter().filter(|l| *l == line).count()
    }

    /// Raw bytes sent, including any unterminated tail (Ctrl-Z).
    pub fn written(&self) -> &[u8] {
        &self.sim.written
    }

    /// Power rail levels in the order they were driven.
    pub fn rail_history(&self) -> &[bool] {
        &self.sim.rail
    }
}

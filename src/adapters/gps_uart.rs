//! GPS receiver adapter.
//!
//! Implements [`GpsPort`] over a receive-only UART.  The receiver
//! streams NMEA 0183 at 9600 baud; line assembly and parsing live in
//! [`crate::tracker::gps`].
//!
//! - **`target_os = "espidf"`**: `esp_idf_hal::uart::UartRxDriver`, read
//!   without blocking.
//! - **all other targets**: bytes fed in by the test.

use crate::app::ports::GpsPort;

#[cfg(target_os = "espidf")]
use esp_idf_hal::{delay::NON_BLOCK, uart::UartRxDriver};

pub struct GpsUart {
    #[cfg(target_os = "espidf")]
    uart: UartRxDriver<'static>,
    #[cfg(not(target_os = "espidf"))]
    pending: std::collections::VecDeque<u8>,
}

#[cfg(target_os = "espidf")]
impl GpsUart {
    pub fn new(uart: UartRxDriver<'static>) -> Self {
        Self { uart }
    }
}

#[cfg(not(target_os = "espidf"))]
impl GpsUart {
    pub fn simulated() -> Self {
        Self {
            pending: std::collections::VecDeque::new(),
        }
    }

    /// Queue bytes as if the receiver had sent them.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.pending.extend(bytes.iter().copied());
    }
}

impl GpsPort for GpsUart {
    #[cfg(target_os = "espidf")]
    fn read_available(&mut self, buf: &mut [u8]) -> usize {
        match self.uart.read(buf, NON_BLOCK) {
            Ok(n) => n,
            Err(e) => {
                log::warn!("GPS: UART read failed: {}", e);
                0
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_available(&mut self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(self.pending.len());
        for (slot, b) in buf.iter_mut().zip(self.pending.drain(..n)) {
            *slot = b;
        }
        n
    }
}

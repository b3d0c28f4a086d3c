//! Single-colour status LED driver.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the LED GPIO via hw_init.
//! On host/test: tracks state in-memory only.

use crate::app::ports::IndicatorPort;
use crate::drivers::hw_init;

pub struct StatusLed {
    gpio: i32,
    on: bool,
}

impl StatusLed {
    pub fn new(gpio: i32) -> Self {
        Self { gpio, on: false }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}

impl IndicatorPort for StatusLed {
    fn set_led(&mut self, on: bool) {
        hw_init::gpio_write(self.gpio, on);
        self.on = on;
    }
}

//! One-shot GPIO setup and raw level access.
//!
//! Every plain GPIO the firmware touches is listed in [`PIN_SETUP`] with
//! its role and reset level, and configured once by
//! [`init_peripherals`] before the outer loop starts.  UARTs belong to
//! their adapters and are not handled here.
//!
//! On the host there is no register file: inputs read HIGH (button
//! released) and writes are dropped.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::{
    ESP_OK, gpio_config, gpio_config_t, gpio_get_level, gpio_int_type_t_GPIO_INTR_DISABLE,
    gpio_mode_t_GPIO_MODE_INPUT, gpio_mode_t_GPIO_MODE_OUTPUT,
    gpio_pulldown_t_GPIO_PULLDOWN_DISABLE, gpio_pullup_t_GPIO_PULLUP_DISABLE,
    gpio_pullup_t_GPIO_PULLUP_ENABLE, gpio_set_level,
};

use log::info;

pub use crate::error::HwInitError;
use crate::pins;

/// How a pin is set up at boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinRole {
    /// Input with the internal pull-up enabled.
    InputPullUp,
    /// Push-pull output driven to `initial` right after configuration.
    Output { initial: bool },
}

/// Boot configuration of every plain GPIO.
pub const PIN_SETUP: [(i32, PinRole); 3] = [
    (pins::BUTTON_GPIO, PinRole::InputPullUp),
    (pins::LED_GPIO, PinRole::Output { initial: false }),
    // Power key idles HIGH; a LOW pulse toggles the modem.
    (pins::MODEM_POWER_GPIO, PinRole::Output { initial: true }),
];

pub fn init_peripherals() -> Result<(), HwInitError> {
    for &(pin, role) in &PIN_SETUP {
        configure(pin, role)?;
    }
    info!("hw_init: {} GPIOs configured", PIN_SETUP.len());
    Ok(())
}

#[cfg(target_os = "espidf")]
fn configure(pin: i32, role: PinRole) -> Result<(), HwInitError> {
    let (mode, pull_up) = match role {
        PinRole::InputPullUp => (gpio_mode_t_GPIO_MODE_INPUT, gpio_pullup_t_GPIO_PULLUP_ENABLE),
        PinRole::Output { .. } => (gpio_mode_t_GPIO_MODE_OUTPUT, gpio_pullup_t_GPIO_PULLUP_DISABLE),
    };
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pin,
        mode,
        pull_up_en: pull_up,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    // SAFETY: called from main() before any task uses these pins.
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK {
        return Err(HwInitError::GpioConfigFailed { pin, code: ret });
    }
    if let PinRole::Output { initial } = role {
        gpio_write(pin, initial);
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
fn configure(pin: i32, role: PinRole) -> Result<(), HwInitError> {
    log::debug!("hw_init(sim): GPIO{} as {:?}", pin, role);
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: read-only level access on a pin configured at boot.
    (unsafe { gpio_get_level(pin) }) != 0
}

/// Host stub: every input reads HIGH.
#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(_pin: i32) -> bool {
    true
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: level write on an output configured at boot; main loop only.
    unsafe {
        gpio_set_level(pin, u32::from(high));
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) {}

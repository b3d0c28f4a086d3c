//! Task watchdog (TWDT) subscription for the outer loop.
//!
//! A single loop iteration can block for the whole modem boot or network
//! join, so the timeout comes from configuration and `validate()` checks
//! it against the longest blocking wait.  Feed once per iteration.

use log::{info, warn};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::{
    ESP_OK, esp_task_wdt_add, esp_task_wdt_config_t, esp_task_wdt_reconfigure, esp_task_wdt_reset,
};

pub struct Watchdog {
    timeout_ms: u32,
    subscribed: bool,
    feeds: u64,
}

impl Watchdog {
    /// Reconfigure the TWDT to `timeout_ms` and subscribe the calling task.
    /// A failed subscription is logged; `feed` is then a no-op.
    pub fn subscribe(timeout_ms: u32) -> Self {
        let subscribed = platform_subscribe(timeout_ms);
        if subscribed {
            info!("Watchdog: subscribed ({} ms, panic on trigger)", timeout_ms);
        } else {
            warn!("Watchdog: running unsupervised");
        }
        Self {
            timeout_ms,
            subscribed,
            feeds: 0,
        }
    }

    pub fn feed(&mut self) {
        self.feeds = self.feeds.wrapping_add(1);
        if self.subscribed {
            platform_reset();
        }
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    pub fn feeds(&self) -> u64 {
        self.feeds
    }
}

#[cfg(target_os = "espidf")]
fn platform_subscribe(timeout_ms: u32) -> bool {
    let cfg = esp_task_wdt_config_t {
        timeout_ms,
        idle_core_mask: 0,
        trigger_panic: true,
    };
    // SAFETY: plain FFI calls; a null handle means the calling task.
    let ret = unsafe { esp_task_wdt_reconfigure(&cfg) };
    if ret != ESP_OK {
        warn!("Watchdog: reconfigure returned {}", ret);
    }
    let ret = unsafe { esp_task_wdt_add(core::ptr::null_mut()) };
    if ret != ESP_OK {
        warn!("Watchdog: subscribe returned {}", ret);
    }
    ret == ESP_OK
}

#[cfg(not(target_os = "espidf"))]
fn platform_subscribe(_timeout_ms: u32) -> bool {
    true
}

#[cfg(target_os = "espidf")]
fn platform_reset() {
    // SAFETY: the calling task subscribed in platform_subscribe.
    unsafe {
        esp_task_wdt_reset();
    }
}

#[cfg(not(target_os = "espidf"))]
fn platform_reset() {}

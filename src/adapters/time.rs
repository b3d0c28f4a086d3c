//! Clock adapters.
//!
//! Implements [`Clock`] for the SmartCollar firmware.
//!
//! - **`target_os = "espidf"`**: wraps `esp_timer_get_time()` from the
//!   ESP-IDF high-resolution timer; delays yield to FreeRTOS.
//! - **`not(target_os = "espidf")`**: uses `std::time::Instant` for
//!   host-side runs, plus [`SimClock`], a manually driven clock whose
//!   delays advance simulated time instantly.

use embedded_hal::delay::DelayNs;

use crate::app::ports::Clock;

// ───────────────────────────────────────────────────────────────
// System clock
// ───────────────────────────────────────────────────────────────

/// Monotonic system clock.
pub struct SystemClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Microseconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    pub fn uptime_us(&self) -> u64 {
        // SAFETY: esp_timer_get_time reads the RTC-backed counter; no preconditions.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    /// Microseconds since construction (monotonic).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.uptime_us() / 1_000
    }
}

impl DelayNs for SystemClock {
    #[cfg(target_os = "espidf")]
    fn delay_ns(&mut self, ns: u32) {
        esp_idf_hal::delay::Ets::delay_us(ns.div_ceil(1_000));
    }

    #[cfg(not(target_os = "espidf"))]
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(u64::from(ns)));
    }

    #[cfg(target_os = "espidf")]
    fn delay_ms(&mut self, ms: u32) {
        esp_idf_hal::delay::FreeRtos::delay_ms(ms);
    }

    #[cfg(not(target_os = "espidf"))]
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}

// ───────────────────────────────────────────────────────────────
// Simulated clock (host only)
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
pub use sim::{SimClock, SimTime};

#[cfg(not(target_os = "espidf"))]
mod sim {
    use core::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    use embedded_hal::delay::DelayNs;

    use crate::app::ports::Clock;

    /// Read-only handle on a [`SimClock`]'s time, for simulated peers
    /// that schedule behaviour against the same timeline.
    #[derive(Debug, Clone, Default)]
    pub struct SimTime(Arc<AtomicU64>);

    impl SimTime {
        pub fn now_ms(&self) -> u64 {
            self.0.load(Ordering::Acquire)
        }
    }

    /// Clock whose time only moves when a delay runs or the test advances it.
    #[derive(Debug, Default)]
    pub struct SimClock {
        time: SimTime,
        /// Sub-millisecond remainder carried between `delay_ns` calls.
        residual_ns: u32,
    }

    impl SimClock {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn starting_at(ms: u64) -> Self {
            let clock = Self::default();
            clock.set_ms(ms);
            clock
        }

        /// Handle that observes this clock's time.
        pub fn time(&self) -> SimTime {
            self.time.clone()
        }

        pub fn advance(&self, ms: u64) {
            self.time.0.fetch_add(ms, Ordering::AcqRel);
        }

        pub fn set_ms(&self, ms: u64) {
            self.time.0.store(ms, Ordering::Release);
        }
    }

    impl Clock for SimClock {
        fn now_ms(&self) -> u64 {
            self.time.now_ms()
        }
    }

    impl DelayNs for SimClock {
        fn delay_ns(&mut self, ns: u32) {
            let total = u64::from(self.residual_ns) + u64::from(ns);
            self.advance(total / 1_000_000);
            self.residual_ns = (total % 1_000_000) as u32;
        }

        fn delay_ms(&mut self, ms: u32) {
            self.advance(u64::from(ms));
        }
    }
}

//! LED pattern engine for the single-colour status LED.
//!
//! State handlers choose a [`LedPattern`]; the main loop calls
//! [`LedPatternEngine::tick`] once per iteration and drives the LED with
//! the returned level.
//!
//! ## Pattern types
//!
//! | Pattern   | Meaning                        | Half-period |
//! |-----------|--------------------------------|-------------|
//! | Off       | idle / not yet started         | -           |
//! | SlowBlink | advertising, awaiting peer     | 500 ms      |
//! | Solid     | peer connected through success | -           |
//! | FastBlink | failure                        | 200 ms      |
//!
//! A blink toggles once at least one half-period has passed since the
//! previous toggle.  Switching into a blink keeps the current level and
//! starts timing from the switch.

/// Pattern identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LedPattern {
    #[default]
    Off,
    SlowBlink,
    Solid,
    FastBlink,
}

/// LED pattern engine. Stack-allocated, no heap.
pub struct LedPatternEngine {
    pattern: LedPattern,
    lit: bool,
    last_toggle_ms: u64,
    slow_half_ms: u64,
    fast_half_ms: u64,
}

impl LedPatternEngine {
    pub fn new(slow_half_ms: u32, fast_half_ms: u32) -> Self {
        Self {
            pattern: LedPattern::Off,
            lit: false,
            last_toggle_ms: 0,
            slow_half_ms: u64::from(slow_half_ms),
            fast_half_ms: u64::from(fast_half_ms),
        }
    }

    pub fn pattern(&self) -> LedPattern {
        self.pattern
    }

    /// Select a pattern.  Re-selecting the active pattern keeps its phase.
    pub fn set_pattern(&mut self, pattern: LedPattern, now_ms: u64) {
        if pattern == self.pattern {
            return;
        }
        self.pattern = pattern;
        self.last_toggle_ms = now_ms;
        match pattern {
            LedPattern::Off => self.lit = false,
            LedPattern::Solid => self.lit = true,
            LedPattern::SlowBlink | LedPattern::FastBlink => {}
        }
    }

    /// Advance to `now_ms` and return the LED level.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        if let Some(half) = self.half_period_ms() {
            if now_ms.saturating_sub(self.last_toggle_ms) >= half {
                self.lit = !self.lit;
                self.last_toggle_ms = now_ms;
            }
        }
        self.lit
    }

    fn half_period_ms(&self) -> Option<u64> {
        match self.pattern {
            LedPattern::SlowBlink => Some(self.slow_half_ms),
            LedPattern::FastBlink => Some(self.fast_half_ms),
            LedPattern::Off | LedPattern::Solid => None,
        }
    }
}

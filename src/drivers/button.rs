//! Level-sampled button driver with long-press detection.
//!
//! ## Hardware
//!
//! Active-low momentary switch on a pull-up input.  The main loop samples
//! the level once per tick (~10 ms) with [`read_pressed`] and feeds it
//! to [`ButtonDriver::tick`].  No interrupt is involved, so gestures are
//! not seen while the loop is inside a blocking call.
//!
//! ## Gesture detection
//!
//! | Gesture    | Condition                          | Event       |
//! |------------|------------------------------------|-------------|
//! | Long press | Continuous hold >= `long_press_ms` | `LongPress` |
//!
//! A press fires at most once; releasing the button re-arms detection.

/// Button events emitted after gesture classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    LongPress,
}

/// Internal state machine for gesture detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GestureState {
    Released,
    Held { since_ms: u64 },
    /// Long press already reported for this hold.
    Fired,
}

/// Active-low: a LOW level means pressed.  The host stub reads HIGH.
pub fn read_pressed(gpio: i32) -> bool {
    !crate::drivers::hw_init::gpio_read(gpio)
}

pub struct ButtonDriver {
    long_press_ms: u64,
    state: GestureState,
}

impl ButtonDriver {
    pub fn new(long_press_ms: u32) -> Self {
        Self {
            long_press_ms: u64::from(long_press_ms),
            state: GestureState::Released,
        }
    }

    /// Feed one level sample.  `pressed` is the logical (debounced by
    /// sampling period) button state.
    pub fn tick(&mut self, now_ms: u64, pressed: bool) -> Option<ButtonEvent> {
        if !pressed {
            self.state = GestureState::Released;
            return None;
        }

        match self.state {
            GestureState::Released => {
                self.state = GestureState::Held { since_ms: now_ms };
                None
            }
            GestureState::Held { since_ms } => {
                if now_ms.saturating_sub(since_ms) >= self.long_press_ms {
                    self.state = GestureState::Fired;
                    log::info!("Button: long press detected");
                    Some(ButtonEvent::LongPress)
                } else {
                    None
                }
            }
            GestureState::Fired => None,
        }
    }
}

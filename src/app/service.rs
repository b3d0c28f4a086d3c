//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the FSM, its context blackboard, the long-press
//! detector and the LED pattern engine.  It exposes a hardware-agnostic
//! API.  All I/O flows through port traits injected at call sites,
//! making the entire service testable with mock adapters.
//!
//! ```text
//!  button level ──▶ ┌─────────────────────────┐ ──▶ EventSink
//!  PairingPort  ──▶ │       AppService        │
//!                   │  Button · FSM · LED     │ ──▶ IndicatorPort
//!  Board ◀────────▶ └─────────────────────────┘
//! ```

use log::info;

use crate::config::CollarConfig;
use crate::drivers::button::{ButtonDriver, ButtonEvent};
use crate::drivers::led_patterns::{LedPattern, LedPatternEngine};
use crate::events::PairingEvent;
use crate::fsm::context::FsmContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::session::DeviceIdentity;

use super::events::AppEvent;
use super::ports::{Board, EventSink, IndicatorPort};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    fsm: Fsm,
    ctx: FsmContext,
    button: ButtonDriver,
    led: LedPatternEngine,
    /// Level last written to the indicator; `None` before the first write.
    led_level: Option<bool>,
    tick_count: u64,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** start the FSM; call [`start`](Self::start) next.
    pub fn new(config: CollarConfig) -> Self {
        let button = ButtonDriver::new(config.long_press_ms);
        let led = LedPatternEngine::new(
            config.slow_blink_half_period_ms,
            config.fast_blink_half_period_ms,
        );
        let ctx = FsmContext::new(config);
        let fsm = Fsm::new(build_state_table(), StateId::Idle);

        Self {
            fsm,
            ctx,
            button,
            led,
            led_level: None,
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Start the FSM in Idle and drive the LED to its initial level.
    pub fn start(
        &mut self,
        board: &mut Board<'_>,
        indicator: &mut impl IndicatorPort,
        sink: &mut impl EventSink,
    ) {
        self.fsm.start(&mut self.ctx, board);
        self.update_led(board.clock.now_ms(), indicator);
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!("AppService started in {:?}", self.fsm.current_state());
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one outer-loop iteration:
    /// button → pairing events → FSM → LED → events.
    ///
    /// May block for as long as the current state's action takes (modem
    /// power pulse, AT window, network join).
    pub fn tick(
        &mut self,
        button_pressed: bool,
        board: &mut Board<'_>,
        indicator: &mut impl IndicatorPort,
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;
        let prev_state = self.fsm.current_state();

        // 1. Gesture
        if let Some(ButtonEvent::LongPress) = self.button.tick(board.clock.now_ms(), button_pressed) {
            self.ctx.gesture.raise(());
            sink.emit(&AppEvent::LongPress);
        }

        // 2. Pairing events stored by the BLE host task
        while let Some(event) = board.pairing.next_event() {
            self.apply_pairing_event(event, sink);
        }

        // 3. FSM tick
        self.fsm.tick(&mut self.ctx, board);

        // 4. LED, timed after any blocking work in the tick
        self.update_led(board.clock.now_ms(), indicator);

        // 5. Emit state change and its outcome if the FSM moved
        let new_state = self.fsm.current_state();
        if new_state != prev_state {
            sink.emit(&AppEvent::StateChanged {
                from: prev_state,
                to: new_state,
            });
            self.emit_outcome(new_state, sink);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current FSM state.
    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    /// Total ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn led_pattern(&self) -> LedPattern {
        self.led.pattern()
    }

    /// Identity captured during IdentityQuery, if any.
    pub fn identity(&self) -> Option<&DeviceIdentity> {
        self.ctx.identity.as_ref()
    }

    /// Name of the network handed to the join primitive, if any.
    pub fn network_name(&self) -> Option<&str> {
        self.ctx.network.as_ref().map(|c| c.name.as_str())
    }

    pub fn peer_connected(&self) -> bool {
        self.ctx.peer_connected
    }

    pub fn config(&self) -> &CollarConfig {
        &self.ctx.config
    }

    // ── Internal ──────────────────────────────────────────────

    fn apply_pairing_event(&mut self, event: PairingEvent, sink: &mut impl EventSink) {
        match event {
            PairingEvent::PeerConnected => {
                self.ctx.peer_connected = true;
                sink.emit(&AppEvent::PeerConnected);
            }
            PairingEvent::PeerDisconnected => {
                self.ctx.peer_connected = false;
                sink.emit(&AppEvent::PeerDisconnected);
            }
            PairingEvent::CredentialsWritten(pair) => {
                sink.emit(&AppEvent::CredentialsReceived {
                    network: pair.name.clone(),
                });
                self.ctx.credentials.raise(pair);
            }
        }
    }

    fn emit_outcome(&self, state: StateId, sink: &mut impl EventSink) {
        match state {
            StateId::AwaitingPeer => {
                if let Some(id) = &self.ctx.identity {
                    sink.emit(&AppEvent::IdentityCaptured(id.clone()));
                }
            }
            StateId::Failed => {
                if let Some(cause) = self.ctx.failure {
                    sink.emit(&AppEvent::ProvisioningFailed(cause));
                }
            }
            StateId::Connected => {
                if let Some(creds) = &self.ctx.network {
                    sink.emit(&AppEvent::Provisioned {
                        network: creds.name.clone(),
                    });
                }
            }
            _ => {}
        }
    }

    /// Follow the pattern the FSM asked for; write the LED only on change.
    fn update_led(&mut self, now_ms: u64, indicator: &mut impl IndicatorPort) {
        self.led.set_pattern(self.ctx.led, now_ms);
        let level = self.led.tick(now_ms);
        if self.led_level != Some(level) {
            indicator.set_led(level);
            self.led_level = Some(level);
        }
    }
}

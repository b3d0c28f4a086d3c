//! Mock hardware for integration tests.
//!
//! Records every LED write and domain event so tests can assert on the
//! full history, and bundles the simulated adapters into a [`Rig`] that
//! mirrors one iteration of the firmware's outer loop.

use embedded_hal::delay::DelayNs;

use smartcollar::adapters::ble::BlePairingAdapter;
use smartcollar::adapters::modem_uart::ModemUart;
use smartcollar::adapters::time::SimClock;
use smartcollar::adapters::wifi::{SimLink, WifiAdapter};
use smartcollar::app::events::AppEvent;
use smartcollar::app::ports::{Board, Clock, EventSink, IndicatorPort};
use smartcollar::app::service::AppService;
use smartcollar::config::CollarConfig;
use smartcollar::fsm::StateId;
use smartcollar::pins;

/// What a real modem answers to the identity query.
pub const GOOD_IDENTITY_REPLY: &[u8] = b"\r\n861234567890123\r\n\r\nOK\r\n";

// ── RecordingLed ──────────────────────────────────────────────

/// Records `(time, level)` for every LED write.
pub struct RecordingLed {
    pub writes: Vec<(u64, bool)>,
    clock: smartcollar::adapters::time::SimTime,
}

impl RecordingLed {
    pub fn new(clock: &SimClock) -> Self {
        Self {
            writes: Vec::new(),
            clock: clock.time(),
        }
    }

    pub fn level(&self) -> Option<bool> {
        self.writes.last().map(|(_, on)| *on)
    }

    /// Writes at or after `since_ms`.
    pub fn writes_since(&self, since_ms: u64) -> Vec<(u64, bool)> {
        self.writes
            .iter()
            .copied()
            .filter(|(t, _)| *t >= since_ms)
            .collect()
    }
}

impl IndicatorPort for RecordingLed {
    fn set_led(&mut self, on: bool) {
        self.writes.push((self.clock.now_ms(), on));
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    /// The `to` side of every state change, in order.
    pub fn state_path(&self) -> Vec<StateId> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::StateChanged { to, .. } => Some(*to),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Rig ───────────────────────────────────────────────────────

/// Simulated collar: every adapter plus a started [`AppService`].
pub struct Rig {
    pub app: AppService,
    pub clock: SimClock,
    pub modem: ModemUart,
    pub wifi: WifiAdapter,
    pub ble: BlePairingAdapter,
    pub led: RecordingLed,
    pub sink: RecordingSink,
}

#[allow(dead_code)]
impl Rig {
    pub fn new(link: SimLink) -> Self {
        Self::with_identity(GOOD_IDENTITY_REPLY, link)
    }

    pub fn with_identity(identity_reply: &[u8], link: SimLink) -> Self {
        let config = CollarConfig::default();
        let clock = SimClock::starting_at(1_000);
        let mut modem = ModemUart::simulated(pins::MODEM_POWER_GPIO);
        modem.script(&config.identity_command, identity_reply);
        let wifi = WifiAdapter::simulated(clock.time(), link);
        let ble = BlePairingAdapter::new(&config);
        let led = RecordingLed::new(&clock);

        let mut rig = Self {
            app: AppService::new(config),
            clock,
            modem,
            wifi,
            ble,
            led,
            sink: RecordingSink::new(),
        };
        let mut board = Board {
            clock: &mut rig.clock,
            modem: &mut rig.modem,
            network: &mut rig.wifi,
            pairing: &mut rig.ble,
        };
        rig.app.start(&mut board, &mut rig.led, &mut rig.sink);
        rig
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// One outer-loop iteration: tick, then sleep the loop period.
    pub fn step(&mut self, pressed: bool) -> StateId {
        let mut board = Board {
            clock: &mut self.clock,
            modem: &mut self.modem,
            network: &mut self.wifi,
            pairing: &mut self.ble,
        };
        self.app.tick(pressed, &mut board, &mut self.led, &mut self.sink);
        let period = self.app.config().loop_period_ms;
        self.clock.delay_ms(period);
        self.app.state()
    }

    pub fn steps(&mut self, n: usize, pressed: bool) -> StateId {
        for _ in 0..n {
            self.step(pressed);
        }
        self.app.state()
    }

    /// Hold the button until the long press registers, then release.
    pub fn long_press(&mut self) {
        let before = self.sink.count(|e| *e == AppEvent::LongPress);
        for _ in 0..1_000 {
            self.step(true);
            if self.sink.count(|e| *e == AppEvent::LongPress) > before {
                break;
            }
        }
        self.step(false);
    }

    /// Step until `state` is reached, up to `limit` iterations.
    pub fn run_until(&mut self, state: StateId, limit: usize) -> bool {
        for _ in 0..limit {
            if self.app.state() == state {
                return true;
            }
            self.step(false);
        }
        self.app.state() == state
    }

    /// Drive a fresh rig to AwaitingCredentials with a connected peer.
    pub fn to_awaiting_credentials(&mut self) {
        self.long_press();
        assert!(self.run_until(StateId::AwaitingPeer, 10));
        self.ble.inject_peer_connected();
        assert!(self.run_until(StateId::AwaitingCredentials, 2));
    }
}

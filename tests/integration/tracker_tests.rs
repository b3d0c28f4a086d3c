//! Integration tests for the geofence tracker.
//!
//! Home WiFi association decides the zone; outside it, RMC fixes from
//! the GPS stream turn into rate-limited SMS reports on the modem.

use smartcollar::adapters::gps_uart::GpsUart;
use smartcollar::adapters::modem_uart::ModemUart;
use smartcollar::adapters::time::SimClock;
use smartcollar::adapters::wifi::{SimLink, WifiAdapter};
use smartcollar::app::events::AppEvent;
use smartcollar::app::ports::Clock;
use smartcollar::config::GeofenceConfig;
use smartcollar::error::JoinError;
use smartcollar::tracker::{GeofenceTracker, TrackerIo, Zone};

use crate::mock_hw::RecordingSink;

const RMC: &[u8] = b"$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A\r\n";
const GGA: &[u8] =
    b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\r\n";

struct TrackerRig {
    tracker: GeofenceTracker,
    clock: SimClock,
    wifi: WifiAdapter,
    gps: GpsUart,
    modem: ModemUart,
    sink: RecordingSink,
}

impl TrackerRig {
    fn new(link: SimLink) -> Self {
        Self::with_config(link, GeofenceConfig::default())
    }

    fn with_config(link: SimLink, config: GeofenceConfig) -> Self {
        let clock = SimClock::new();
        let wifi = WifiAdapter::simulated(clock.time(), link);
        Self {
            tracker: GeofenceTracker::new(config),
            clock,
            wifi,
            gps: GpsUart::simulated(),
            modem: ModemUart::simulated(smartcollar::pins::MODEM_POWER_GPIO),
            sink: RecordingSink::new(),
        }
    }

    fn boot(&mut self) -> Result<Zone, JoinError> {
        let mut io = TrackerIo {
            clock: &mut self.clock,
            network: &mut self.wifi,
            gps: &mut self.gps,
            modem: &mut self.modem,
        };
        self.tracker.boot(&mut io)
    }

    fn poll(&mut self) -> Zone {
        let mut io = TrackerIo {
            clock: &mut self.clock,
            network: &mut self.wifi,
            gps: &mut self.gps,
            modem: &mut self.modem,
        };
        self.tracker.poll(&mut io, &mut self.sink)
    }

    fn zone_changes(&self) -> Vec<Zone> {
        self.sink
            .events
            .iter()
            .filter_map(|e| match e {
                AppEvent::ZoneChanged(z) => Some(*z),
                _ => None,
            })
            .collect()
    }
}

// ── Boot ──────────────────────────────────────────────────────

#[test]
fn boot_joins_home_and_waits() {
    let mut rig = TrackerRig::new(SimLink::AssociateAfter { ms: 1_000 });
    assert_eq!(rig.boot(), Ok(Zone::Inside));
    assert_eq!(rig.clock.now_ms(), 5_000);
    assert_eq!(rig.wifi.ssid(), GeofenceConfig::default().home_ssid.as_str());
}

#[test]
fn boot_out_of_range_reports_outside() {
    let mut rig = TrackerRig::new(SimLink::Never);
    assert_eq!(rig.boot(), Ok(Zone::Outside));
}

#[test]
fn boot_rejected_join_is_an_error() {
    let mut rig = TrackerRig::new(SimLink::Reject);
    assert_eq!(rig.boot(), Err(JoinError::Rejected));
    assert_eq!(rig.poll(), Zone::Outside);
}

// ── Inside ────────────────────────────────────────────────────

#[test]
fn inside_waits_recheck_interval_and_ignores_gps() {
    let mut rig = TrackerRig::new(SimLink::AssociateAfter { ms: 0 });
    rig.boot().unwrap();
    rig.gps.feed(RMC);

    let before = rig.clock.now_ms();
    assert_eq!(rig.poll(), Zone::Inside);
    assert_eq!(rig.clock.now_ms() - before, 30_000);
    assert!(rig.modem.written().is_empty());
    assert_eq!(rig.tracker.reports(), 0);
}

// ── Outside ───────────────────────────────────────────────────

#[test]
fn outside_fix_is_sent_by_sms() {
    let mut rig = TrackerRig::new(SimLink::Never);
    rig.boot().unwrap();
    rig.gps.feed(GGA);
    rig.gps.feed(RMC);

    assert_eq!(rig.poll(), Zone::Outside);
    assert_eq!(
        rig.modem.lines(),
        [
            "AT+CMGF=1",
            "AT+CMGS=\"+910000000000\"",
            "Pet Location: 48.117300, 11.516667",
        ]
    );
    assert_eq!(rig.modem.written().last(), Some(&0x1A));
    assert_eq!(rig.tracker.reports(), 1);

    let fix = rig.tracker.last_fix().unwrap();
    assert!((fix.latitude - 48.1173).abs() < 1e-6);
    assert!(rig.sink.events.iter().any(|e| matches!(e, AppEvent::LocationReported { .. })));
}

#[test]
fn outside_without_fix_stays_silent() {
    let mut rig = TrackerRig::new(SimLink::Never);
    rig.boot().unwrap();
    rig.gps.feed(GGA);
    rig.gps.feed(b"$GPRMC,123519,A,4807.0");

    for _ in 0..10 {
        assert_eq!(rig.poll(), Zone::Outside);
    }
    assert!(rig.modem.written().is_empty());
}

#[test]
fn sentence_split_across_polls_still_reports() {
    let mut rig = TrackerRig::new(SimLink::Never);
    rig.boot().unwrap();
    let (head, tail) = RMC.split_at(30);
    rig.gps.feed(head);
    rig.poll();
    assert_eq!(rig.tracker.reports(), 0);
    rig.gps.feed(tail);
    rig.poll();
    assert_eq!(rig.tracker.reports(), 1);
}

#[test]
fn reports_are_rate_limited() {
    let mut rig = TrackerRig::new(SimLink::Never);
    rig.boot().unwrap();

    rig.gps.feed(RMC);
    rig.poll();
    rig.clock.advance(5_000);
    rig.gps.feed(RMC);
    rig.poll();
    assert_eq!(rig.tracker.reports(), 1);

    rig.clock.advance(5_000);
    rig.gps.feed(RMC);
    rig.poll();
    assert_eq!(rig.tracker.reports(), 2);
    assert_eq!(rig.modem.count_line("AT+CMGF=1"), 2);
}

#[test]
fn zero_interval_reports_every_fix() {
    let config = GeofenceConfig {
        min_report_interval_ms: 0,
        ..GeofenceConfig::default()
    };
    let mut rig = TrackerRig::with_config(SimLink::Never, config);
    rig.boot().unwrap();

    for _ in 0..3 {
        rig.gps.feed(RMC);
        rig.poll();
    }
    assert_eq!(rig.tracker.reports(), 3);
    assert_eq!(rig.modem.count_line("AT+CMGF=1"), 3);
}

// ── Zone changes ──────────────────────────────────────────────

#[test]
fn zone_changes_are_emitted_once_per_edge() {
    let mut rig = TrackerRig::new(SimLink::AssociateAfter { ms: 0 });
    rig.boot().unwrap();
    rig.poll();
    rig.poll();

    rig.wifi.set_link(SimLink::Never);
    rig.poll();
    rig.poll();

    rig.wifi.set_link(SimLink::AssociateAfter { ms: 0 });
    rig.poll();

    assert_eq!(rig.zone_changes(), vec![Zone::Inside, Zone::Outside, Zone::Inside]);
    assert_eq!(rig.tracker.zone(), Some(Zone::Inside));
}

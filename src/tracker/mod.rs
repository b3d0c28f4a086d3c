//! Geofence tracker.
//!
//! Presence of the home WiFi network stands in for "inside the home
//! zone".  Outside it, GPS fixes are forwarded as text messages over the
//! cellular modem.
//!
//! ```text
//!            ┌──────────── associated? ────────────┐
//!            │ yes                              no │
//!            ▼                                     ▼
//!   INSIDE: wait recheck_interval      OUTSIDE: drain GPS ─▶ RMC fix?
//!                                                          │ yes, report due
//!                                                          ▼
//!                                              SMS "Pet Location: lat, lon"
//! ```
//!
//! The tracker is tick-driven: the binary calls [`GeofenceTracker::poll`]
//! in its outer loop.  Inside the zone a poll blocks for the recheck
//! interval; outside it never blocks beyond the SMS pauses.

pub mod gps;

use core::fmt::Write as _;

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{Clock, EventSink, GpsPort, ModemPort, NetworkPort};
use crate::config::GeofenceConfig;
use crate::error::JoinError;
use crate::modem;
use crate::session::CredentialPair;

use gps::{Fix, NmeaLineReader};

/// Where the pet is relative to the home network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Inside,
    Outside,
}

/// Borrowed ports the tracker drives during one poll.
pub struct TrackerIo<'a> {
    pub clock: &'a mut dyn Clock,
    pub network: &'a mut dyn NetworkPort,
    pub gps: &'a mut dyn GpsPort,
    pub modem: &'a mut dyn ModemPort,
}

pub struct GeofenceTracker {
    config: GeofenceConfig,
    zone: Option<Zone>,
    reader: NmeaLineReader,
    last_fix: Option<Fix>,
    last_report_ms: Option<u64>,
    reports: u32,
}

impl GeofenceTracker {
    pub fn new(config: GeofenceConfig) -> Self {
        Self {
            config,
            zone: None,
            reader: NmeaLineReader::new(),
            last_fix: None,
            last_report_ms: None,
            reports: 0,
        }
    }

    /// Start joining the home network and give it the boot wait to settle.
    pub fn boot(&mut self, io: &mut TrackerIo<'_>) -> Result<Zone, JoinError> {
        let home = CredentialPair {
            name: self.config.home_ssid.clone(),
            secret: self.config.home_password.clone(),
        };
        info!("Geofence: joining home network '{}'", home.name);
        io.network.begin_join(&home)?;
        io.clock.delay_ms(self.config.boot_join_wait_ms);

        let zone = Self::observe(io);
        info!("Geofence: boot complete, pet is {:?}", zone);
        Ok(zone)
    }

    /// One tracker iteration.  Returns the zone observed.
    pub fn poll(&mut self, io: &mut TrackerIo<'_>, sink: &mut impl EventSink) -> Zone {
        let zone = Self::observe(io);
        if self.zone != Some(zone) {
            info!("Geofence: pet is now {:?}", zone);
            self.zone = Some(zone);
            sink.emit(&AppEvent::ZoneChanged(zone));
        }

        match zone {
            Zone::Inside => io.clock.delay_ms(self.config.recheck_interval_ms),
            Zone::Outside => {
                if let Some(fix) = self.drain_gps(io.gps) {
                    self.last_fix = Some(fix);
                    self.report(fix, io, sink);
                }
            }
        }
        zone
    }

    pub fn zone(&self) -> Option<Zone> {
        self.zone
    }

    pub fn last_fix(&self) -> Option<Fix> {
        self.last_fix
    }

    /// SMS reports submitted so far.
    pub fn reports(&self) -> u32 {
        self.reports
    }

    // ── Internal ──────────────────────────────────────────────

    fn observe(io: &mut TrackerIo<'_>) -> Zone {
        if io.network.is_associated() {
            Zone::Inside
        } else {
            Zone::Outside
        }
    }

    fn drain_gps(&mut self, gps: &mut dyn GpsPort) -> Option<Fix> {
        let mut chunk = [0u8; 128];
        let mut fix = None;
        loop {
            let n = gps.read_available(&mut chunk);
            if n == 0 {
                return fix;
            }
            if let Some(f) = self.reader.push(&chunk[..n]) {
                fix = Some(f);
            }
        }
    }

    fn report(&mut self, fix: Fix, io: &mut TrackerIo<'_>, sink: &mut impl EventSink) {
        let now = io.clock.now_ms();
        let interval = u64::from(self.config.min_report_interval_ms);
        if self.last_report_ms.is_some_and(|t| now.saturating_sub(t) < interval) {
            return;
        }

        let mut body = heapless::String::<64>::new();
        let _ = write!(body, "Pet Location: {:.6}, {:.6}", fix.latitude, fix.longitude);

        match modem::send_sms(
            io.modem,
            io.clock,
            &self.config.sms_recipient,
            &body,
            self.config.command_pause_ms,
        ) {
            Ok(()) => {
                self.last_report_ms = Some(now);
                self.reports += 1;
                sink.emit(&AppEvent::LocationReported {
                    latitude: fix.latitude,
                    longitude: fix.longitude,
                });
            }
            Err(e) => warn!("Geofence: location report failed: {}", e),
        }
    }
}

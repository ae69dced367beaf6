//! Main-loop task and query interface
//!
//! [`TimeReference`] is the only consumer of interrupt-produced state. Once
//! per main-loop cycle, [`TimeReference::poll`]:
//!
//! 1. takes the newest copy from each [`Exchange`] slot (one short critical
//!    section per slot),
//! 2. expires state whose age exceeds its timeout domain,
//! 3. drives the receiver identity queries.
//!
//! All queries read the task-side copies; none of them touch interrupt state.
//!
//! ## Timeout domains
//!
//! | Domain   | Bound | On expiry                               |
//! |----------|-------|-----------------------------------------|
//! | PPS      | 2 s   | `PpsState.valid = false`                |
//! | NMEA     | 3 s   | time, position and fix invalidated      |
//! | Identity | 2 s × 5 attempts | queries stop, logged once   |
//!
//! Expiry never cancels anything; fresh data makes the state valid again.

use crate::config::AcquisitionConfig;
use crate::counter::{FrequencyStatistics, FrequencyValidator};
use crate::gnss::{
    FixType, GnssFixState, GnssPosition, GnssSnapshot, GnssTime, PpsState, ReceiverIdentity,
};
use crate::handoff::{ControlFlags, Handoff, Request};
use crate::logging::{log_debug, log_info, log_warn};
use crate::nmea::NmeaStats;
use crate::pps::PpsCapture;
use crate::time::{self, Timestamp};
use crate::ubx::{self, MgaIniTimeUtc, MonVerPoll, NavTimelsPoll, UbxSink, UbxStats};

/// Every interrupt/task crossing point, grouped for placement in one `static`
pub struct Exchange {
    /// PIO interrupt → task
    pub frequency: Handoff<FrequencyValidator>,
    /// UART interrupt → task
    pub gnss: Handoff<GnssSnapshot>,
    /// GPIO interrupt → task
    pub pps: Handoff<PpsCapture>,
    /// Task → UART interrupt
    pub control: ControlFlags,
    /// Task → UART interrupt: drop buffered input and time state
    pub flush: Request,
    /// Task → PIO interrupt: clear frequency statistics
    pub reset_statistics: Request,
}

impl Exchange {
    /// All slots empty, GNSS enabled
    pub const fn new() -> Self {
        Self {
            frequency: Handoff::new(),
            gnss: Handoff::new(),
            pps: Handoff::new(),
            control: ControlFlags::new(),
            flush: Request::new(),
            reset_statistics: Request::new(),
        }
    }
}

impl Default for Exchange {
    fn default() -> Self {
        Self::new()
    }
}

/// What one `poll` observed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollReport {
    /// A new frequency measurement was adopted
    pub frequency: bool,
    /// A new GNSS snapshot was adopted
    pub gnss: bool,
    /// A new PPS capture was adopted
    pub pps: bool,
    /// PPS went stale this cycle
    pub pps_expired: bool,
    /// GNSS time went stale this cycle
    pub time_expired: bool,
    /// Fix state went stale this cycle
    pub fix_expired: bool,
    /// UBX frames sent to the receiver this cycle
    pub frames_sent: u8,
}

impl PollReport {
    /// Any domain produced fresh data
    pub fn any_fresh(&self) -> bool {
        self.frequency || self.gnss || self.pps
    }

    /// Any domain became invalid
    pub fn any_expired(&self) -> bool {
        self.pps_expired || self.time_expired || self.fix_expired
    }
}

/// Receiver identity query progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IdentityQuery {
    /// Waiting for the receiver to boot
    Holdoff { since: Timestamp },
    /// Hint sent, polling until answered
    Polling { attempts: u8, next_at: Timestamp },
    /// Answered, or attempts exhausted
    Finished,
}

/// Main-loop owner of the externally visible time-reference state
pub struct TimeReference<'a> {
    config: AcquisitionConfig,
    exchange: &'a Exchange,

    frequency: FrequencyValidator,
    time: GnssTime,
    time_updated: Option<Timestamp>,
    position: GnssPosition,
    fix: GnssFixState,
    fix_updated: Option<Timestamp>,
    /// Update stamps already expired here; the UART side still holds them
    expired_time: Option<Timestamp>,
    expired_fix: Option<Timestamp>,
    identity: ReceiverIdentity,
    nmea_stats: NmeaStats,
    ubx_stats: UbxStats,
    pps: PpsState,

    query: Option<IdentityQuery>,
    last_poll: Timestamp,
}

impl<'a> TimeReference<'a> {
    /// Task state reading from `exchange`
    pub fn new(config: AcquisitionConfig, exchange: &'a Exchange) -> Self {
        Self {
            frequency: FrequencyValidator::new(&config),
            config,
            exchange,
            time: GnssTime::default(),
            time_updated: None,
            position: GnssPosition::default(),
            fix: GnssFixState::default(),
            fix_updated: None,
            expired_time: None,
            expired_fix: None,
            identity: ReceiverIdentity::default(),
            nmea_stats: NmeaStats::new(),
            ubx_stats: UbxStats::default(),
            pps: PpsState::default(),
            query: None,
            last_poll: 0,
        }
    }

    /// One main-loop cycle
    pub fn poll<S: UbxSink + ?Sized>(&mut self, now: Timestamp, sink: &mut S) -> PollReport {
        let mut report = PollReport::default();
        self.last_poll = now;

        if let Some(validator) = self.exchange.frequency.take() {
            self.frequency = validator;
            report.frequency = true;
        }

        if let Some(snapshot) = self.exchange.gnss.take() {
            self.adopt_snapshot(snapshot);
            report.gnss = true;
        }

        if let Some(capture) = self.exchange.pps.take() {
            self.pps = PpsState {
                timestamp: Some(capture.timestamp),
                count: capture.count,
                valid: true,
            };
            report.pps = true;
        }

        self.expire(now, &mut report);
        report.frames_sent = self.service_receiver(now, sink);
        report
    }

    fn adopt_snapshot(&mut self, snapshot: GnssSnapshot) {
        if !self.identity.version_known() && snapshot.identity.version_known() {
            log_info!(
                "Receiver identified: fw {}, hw {}",
                snapshot.identity.firmware.as_str(),
                snapshot.identity.hardware.as_str()
            );
        }
        if !self.identity.leap_reported && snapshot.identity.leap_reported {
            log_info!(
                "Leap seconds: {} (valid: {})",
                snapshot.identity.leap_seconds,
                snapshot.identity.leap_valid
            );
        }

        self.time = snapshot.time;
        self.time_updated = snapshot.time_updated;
        self.position = snapshot.position;
        if self.expired_time.is_some() && snapshot.time_updated == self.expired_time {
            self.time.valid = false;
            self.position.valid = false;
        }

        self.fix = snapshot.fix;
        self.fix_updated = snapshot.fix_updated;
        if self.expired_fix.is_some() && snapshot.fix_updated == self.expired_fix {
            self.fix = GnssFixState::default();
        }
        self.identity = snapshot.identity;
        self.nmea_stats = snapshot.nmea;
        self.ubx_stats = snapshot.ubx;
    }

    fn expire(&mut self, now: Timestamp, report: &mut PollReport) {
        if self.pps.valid && time::is_stale(now, self.pps.timestamp, self.config.pps_timeout) {
            self.pps.valid = false;
            report.pps_expired = true;
            log_warn!("PPS lost");
        }

        if self.time.valid && time::is_stale(now, self.time_updated, self.config.nmea_timeout) {
            self.time.valid = false;
            self.position.valid = false;
            self.expired_time = self.time_updated;
            report.time_expired = true;
            log_warn!("GNSS time stale");
        }

        let has_fix = self.fix != GnssFixState::default();
        if has_fix && time::is_stale(now, self.fix_updated, self.config.nmea_timeout) {
            self.fix = GnssFixState::default();
            self.expired_fix = self.fix_updated;
            report.fix_expired = true;
            log_warn!("GNSS fix stale");
        }
    }

    /// Boot hold-off, one time hint, then bounded identity polling
    fn service_receiver<S: UbxSink + ?Sized>(&mut self, now: Timestamp, sink: &mut S) -> u8 {
        let mut sent = 0;
        let query = *self.query.get_or_insert(IdentityQuery::Holdoff { since: now });

        match query {
            IdentityQuery::Holdoff { since } => {
                if time::age(now, since) < self.config.boot_holdoff.to_micros() {
                    return 0;
                }
                let hint = MgaIniTimeUtc { leap_seconds: self.config.leap_second_hint };
                if ubx::send(sink, &hint) > 0 {
                    sent += 1;
                }
                log_debug!("Leap second hint sent: {}", self.config.leap_second_hint);
                self.query = Some(IdentityQuery::Polling { attempts: 0, next_at: now });
                sent += self.service_receiver(now, sink);
            }
            IdentityQuery::Polling { attempts, next_at } => {
                if self.identity.is_complete() {
                    self.query = Some(IdentityQuery::Finished);
                    return 0;
                }
                if attempts >= self.config.identity_max_attempts {
                    log_warn!("Receiver identity unavailable after {} attempts", attempts);
                    self.query = Some(IdentityQuery::Finished);
                    return 0;
                }
                if now < next_at {
                    return 0;
                }

                if !self.identity.version_known() && ubx::send(sink, &MonVerPoll) > 0 {
                    sent += 1;
                }
                if !self.identity.leap_reported && ubx::send(sink, &NavTimelsPoll) > 0 {
                    sent += 1;
                }
                self.query = Some(IdentityQuery::Polling {
                    attempts: attempts + 1,
                    next_at: now + self.config.identity_retry_interval.to_micros(),
                });
            }
            IdentityQuery::Finished => {}
        }

        sent
    }

    /// Whether identity polling has stopped, answered or not
    pub fn identity_query_finished(&self) -> bool {
        self.query == Some(IdentityQuery::Finished)
    }

    // ===== FIX =====

    /// Non-none fix with enough satellites, from fresh NMEA
    pub fn fix_valid(&self) -> bool {
        self.fix.is_usable(self.config.min_satellites)
    }

    /// Fix dimension
    pub fn fix_type(&self) -> FixType {
        self.fix.fix_type
    }

    /// Satellites in use
    pub fn satellites(&self) -> u8 {
        self.fix.satellites
    }

    /// UTC time; check `valid`
    pub fn utc_time(&self) -> GnssTime {
        self.time
    }

    /// Position; check `valid`
    pub fn position(&self) -> GnssPosition {
        self.position
    }

    // ===== PPS =====

    /// An edge arrived within the PPS timeout
    pub fn pps_valid(&self) -> bool {
        self.pps.valid
    }

    /// Monotonic time of the last edge
    pub fn pps_timestamp(&self) -> Option<Timestamp> {
        self.pps.timestamp
    }

    /// Edges since boot
    pub fn pps_count(&self) -> u32 {
        self.pps.count
    }

    /// Full PPS state
    pub fn pps_state(&self) -> PpsState {
        self.pps
    }

    // ===== FREQUENCY =====

    /// Fractional offset in ppb, 0.0 if never measured
    pub fn frequency_offset_ppb(&self) -> f64 {
        self.frequency.offset_ppb()
    }

    /// Last deviation in cycles
    pub fn frequency_error(&self) -> i32 {
        self.frequency.error()
    }

    /// Oscillator quality counters
    pub fn frequency_statistics(&self) -> FrequencyStatistics {
        *self.frequency.statistics()
    }

    /// Whether a frequency measurement has ever been adopted
    pub fn frequency_measured(&self) -> bool {
        self.frequency.has_measurement()
    }

    /// Reference present as of the last `poll`
    pub fn signal_present(&self) -> bool {
        self.frequency.signal_present(self.last_poll)
    }

    // ===== RECEIVER =====

    /// MON-VER software version, empty until known
    pub fn firmware_version(&self) -> &str {
        self.identity.firmware.as_str()
    }

    /// MON-VER hardware version, empty until known
    pub fn hardware_version(&self) -> &str {
        self.identity.hardware.as_str()
    }

    /// GPS-UTC offset in seconds
    pub fn leap_seconds(&self) -> i8 {
        self.identity.leap_seconds
    }

    /// Leap-second count confirmed by an authoritative source
    pub fn leap_seconds_valid(&self) -> bool {
        self.identity.leap_valid
    }

    /// Everything known about the receiver
    pub fn identity(&self) -> &ReceiverIdentity {
        &self.identity
    }

    /// NMEA counters as of the last adopted snapshot
    pub fn nmea_stats(&self) -> NmeaStats {
        self.nmea_stats
    }

    /// UBX counters as of the last adopted snapshot
    pub fn ubx_stats(&self) -> UbxStats {
        self.ubx_stats
    }

    // ===== CONTROL =====

    /// Enable or suspend GNSS byte processing
    pub fn set_enabled(&self, enabled: bool) {
        self.exchange.control.set_enabled(enabled);
        log_info!("GNSS processing {}", if enabled { "enabled" } else { "disabled" });
    }

    /// Whether GNSS byte processing is enabled
    pub fn is_enabled(&self) -> bool {
        self.exchange.control.get().enabled
    }

    /// Per-sentence and per-frame logging in the receive interrupt
    pub fn set_debug(&self, debug: bool) {
        self.exchange.control.set_debug(debug);
    }

    /// Flush buffered receiver input and invalidate current time
    pub fn reset_time_state(&mut self) {
        self.exchange.gnss.clear();
        self.exchange.flush.raise();
        self.time.valid = false;
        self.time_updated = None;
        self.position.valid = false;
        self.fix = GnssFixState::default();
        self.fix_updated = None;
        log_info!("GNSS time state reset");
    }

    /// Clear frequency statistics here and in the counter interrupt
    pub fn reset_frequency_statistics(&mut self) {
        self.exchange.frequency.clear();
        self.exchange.reset_statistics.raise();
        self.frequency.reset_statistics();
    }

    /// Configuration in effect
    pub fn config(&self) -> &AcquisitionConfig {
        &self.config
    }
}

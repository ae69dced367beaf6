//! Protocol byte router (UART receive interrupt side)
//!
//! One byte stream carries two framing protocols. Every byte goes to the UBX
//! [`FrameParser`]; bytes in the 7-bit ASCII range also go to the NMEA
//! [`SentenceAssembler`]. The two never share state: each only sees bytes
//! and reports its own completed units.
//!
//! ```text
//!                ┌──→ FrameParser ───────→ MON-VER / NAV-TIMELS ─┐
//! UART RX byte ──┤                                               ├─→ GnssSnapshot ─→ Handoff
//!                └──→ SentenceAssembler ─→ RMC / GGA / GSA / ZDA ┘
//!                     (ASCII only)
//! ```
//!
//! After every completed unit (applied, rejected or ignored) the whole
//! working snapshot is published, so the task sees statistics move even when
//! no state changed.

use super::state::{FixType, GnssFixState, GnssPosition, GnssTime, ReceiverIdentity};
use crate::handoff::{ControlFlags, Handoff, Request};
use crate::logging::{log_debug, log_info};
use crate::nmea::{Gga, Gsa, NmeaStats, Rmc, Sentence, SentenceAssembler, Zda};
use crate::time::Timestamp;
use crate::ubx::{self, class, id, Frame, FrameParser, UbxStats};

/// Everything the receive interrupt knows, published as one copy
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GnssSnapshot {
    /// Latest UTC time
    pub time: GnssTime,
    /// When `time` was last set from a valid sentence
    pub time_updated: Option<Timestamp>,
    /// Latest position
    pub position: GnssPosition,
    /// Latest fix state
    pub fix: GnssFixState,
    /// When `fix` was last touched by GGA or GSA
    pub fix_updated: Option<Timestamp>,
    /// Receiver identity from UBX responses
    pub identity: ReceiverIdentity,
    /// NMEA counters
    pub nmea: NmeaStats,
    /// UBX counters
    pub ubx: UbxStats,
}

impl GnssSnapshot {
    /// Drop time, position and fix; keep identity and counters
    pub fn invalidate_time(&mut self) {
        self.time.valid = false;
        self.time_updated = None;
        self.position.valid = false;
        self.fix = GnssFixState::default();
        self.fix_updated = None;
    }

    fn apply_sentence(&mut self, sentence: &Sentence, now: Timestamp) {
        match sentence {
            Sentence::Rmc(rmc) => self.apply_rmc(rmc, now),
            Sentence::Gga(gga) => self.apply_gga(gga, now),
            Sentence::Gsa(gsa) => self.apply_gsa(gsa, now),
            Sentence::Zda(zda) => self.apply_zda(zda, now),
        }
    }

    fn apply_rmc(&mut self, rmc: &Rmc, now: Timestamp) {
        if !rmc.active {
            self.time.valid = false;
            self.position.valid = false;
            return;
        }

        if let (Some(date), Some(time)) = (rmc.date, rmc.time) {
            self.time = GnssTime::from_parts(date, time);
            self.time_updated = Some(now);
        }
        if let (Some(latitude), Some(longitude)) = (rmc.latitude, rmc.longitude) {
            self.position.latitude = latitude;
            self.position.longitude = longitude;
            self.position.valid = true;
        }
        if let Some(knots) = rmc.speed_knots {
            self.position.set_speed_knots(knots);
        }
        if let Some(course) = rmc.course {
            self.position.course = course;
        }
    }

    fn apply_gga(&mut self, gga: &Gga, now: Timestamp) {
        if gga.quality == Some(0) {
            self.fix.fix_type = FixType::None;
        }
        if let Some(satellites) = gga.satellites {
            self.fix.satellites = satellites;
        }
        if let Some(hdop) = gga.hdop {
            self.position.hdop = hdop;
        }
        if let Some(altitude) = gga.altitude {
            self.position.altitude = altitude;
        }
        self.fix_updated = Some(now);
    }

    fn apply_gsa(&mut self, gsa: &Gsa, now: Timestamp) {
        if let Some(fix) = gsa.fix {
            self.fix.fix_type = fix;
        }
        self.fix_updated = Some(now);
    }

    fn apply_zda(&mut self, zda: &Zda, now: Timestamp) {
        if let (Some(date), Some(time)) = (zda.date, zda.time) {
            self.time = GnssTime::from_parts(date, time);
            self.time_updated = Some(now);
        }
    }

    /// Returns `false` for frames this layer does not consume
    fn apply_frame(&mut self, frame: &Frame<'_>) -> bool {
        match frame.key() {
            (class::MON, id::MON_VER) => {
                match ubx::decode_mon_ver(frame.payload) {
                    Ok(version) => {
                        if !self.identity.version_known() {
                            log_info!("Receiver firmware: {}", version.software.as_str());
                        }
                        self.identity.apply_version(version);
                    }
                    Err(_error) => log_debug!("MON-VER rejected: {}", _error),
                }
                true
            }
            (class::NAV, id::NAV_TIMELS) => {
                match ubx::decode_nav_timels(frame.payload) {
                    Ok(status) => self.identity.apply_leap_seconds(status),
                    Err(_error) => log_debug!("NAV-TIMELS rejected: {}", _error),
                }
                true
            }
            _ => false,
        }
    }
}

/// UART receive interrupt owner of both protocol parsers
pub struct GnssFrontEnd<'a> {
    ubx: FrameParser,
    nmea: SentenceAssembler,
    snapshot: GnssSnapshot,
    control: &'a ControlFlags,
    flush: &'a Request,
    reports: &'a Handoff<GnssSnapshot>,
}

impl<'a> GnssFrontEnd<'a> {
    /// Router publishing into `reports`, steered by `control` and `flush`
    pub fn new(
        control: &'a ControlFlags,
        flush: &'a Request,
        reports: &'a Handoff<GnssSnapshot>,
    ) -> Self {
        Self {
            ubx: FrameParser::new(),
            nmea: SentenceAssembler::new(),
            snapshot: GnssSnapshot::default(),
            control,
            flush,
            reports,
        }
    }

    /// UART RX interrupt body, called once per received byte
    pub fn on_rx_byte(&mut self, byte: u8, now: Timestamp) {
        if self.flush.take() {
            self.ubx.reset();
            self.nmea.reset();
            self.snapshot.invalidate_time();
            log_debug!("Receiver input flushed");
        }

        let control = self.control.get();
        if !control.enabled {
            return;
        }

        let mut completed = false;

        match self.ubx.feed(byte) {
            Ok(frame) => {
                completed = true;
                if control.debug {
                    log_debug!("UBX {:x}-{:x} len {}", frame.class, frame.id, frame.declared_len);
                }
                if let Err(_error) = frame.full_payload() {
                    log_debug!("UBX frame truncated: {}", _error);
                }
                let consumed = self.snapshot.apply_frame(&frame);
                if !consumed {
                    self.ubx.note_unknown();
                }
            }
            Err(nb::Error::Other(_error)) => {
                completed = true;
                log_debug!("UBX frame dropped: {}", _error);
            }
            Err(nb::Error::WouldBlock) => {}
        }

        if byte.is_ascii() {
            match self.nmea.feed(byte) {
                Ok(sentence) => {
                    completed = true;
                    if control.debug {
                        log_debug!("NMEA {}", sentence.kind());
                    }
                    self.snapshot.apply_sentence(&sentence, now);
                }
                Err(nb::Error::Other(_error)) => {
                    completed = true;
                    if control.debug {
                        log_debug!("NMEA sentence dropped: {}", _error);
                    }
                }
                Err(nb::Error::WouldBlock) => {}
            }
        }

        if completed {
            self.snapshot.nmea = *self.nmea.stats();
            self.snapshot.ubx = *self.ubx.stats();
            self.reports.publish(self.snapshot.clone());
        }
    }

    /// Feed a run of bytes received at `now`
    pub fn on_rx_bytes(&mut self, bytes: &[u8], now: Timestamp) {
        for &byte in bytes {
            self.on_rx_byte(byte, now);
        }
    }

    /// Working snapshot
    pub fn snapshot(&self) -> &GnssSnapshot {
        &self.snapshot
    }

    /// UBX parser, for inspection
    pub fn ubx_parser(&self) -> &FrameParser {
        &self.ubx
    }

    /// NMEA assembler, for inspection
    pub fn nmea_assembler(&self) -> &SentenceAssembler {
        &self.nmea
    }
}

//! GNSS data model
//!
//! Plain `Copy`/`Clone` value types. The receive interrupt owns the working
//! copies; the main-loop task owns the externally visible ones and replaces
//! them wholesale from each published snapshot.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use heapless::String;

use crate::constants::buffers::{HW_VERSION_STRING_CAPACITY, VERSION_STRING_CAPACITY};
use crate::constants::gnss::KNOTS_TO_MPS;
use crate::nmea::{UtcDate, UtcTime};
use crate::time::Timestamp;
use crate::ubx::{LeapSecondSource, LeapSecondStatus, ReceiverVersion};

/// Dimensionality of the position solution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FixType {
    /// No fix
    #[default]
    None,
    /// Horizontal only
    Fix2D,
    /// Horizontal and vertical
    Fix3D,
}

/// UTC date and time as reported by the receiver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GnssTime {
    /// Four-digit year
    pub year: u16,
    /// 1..=12
    pub month: u8,
    /// 1..=31
    pub day: u8,
    /// 0..=23
    pub hour: u8,
    /// 0..=59
    pub minute: u8,
    /// 0..=60
    pub second: u8,
    /// 0..=999
    pub millisecond: u16,
    /// From a verified sentence with an active fix, and not stale
    pub valid: bool,
}

impl GnssTime {
    /// Valid time from a decoded date and time of day
    pub fn from_parts(date: UtcDate, time: UtcTime) -> Self {
        Self {
            year: date.year,
            month: date.month,
            day: date.day,
            hour: time.hour,
            minute: time.minute,
            second: time.second,
            millisecond: time.millisecond,
            valid: true,
        }
    }

    /// Seconds since the Unix epoch, `None` if invalid
    ///
    /// A leap second (`:60`) maps onto the preceding second.
    pub fn to_unix_seconds(&self) -> Option<i64> {
        if !self.valid {
            return None;
        }
        let date = NaiveDate::from_ymd_opt(self.year as i32, self.month as u32, self.day as u32)?;
        let (second, leap_ms) = if self.second == 60 { (59, 1000) } else { (self.second, 0) };
        let time = NaiveTime::from_hms_milli_opt(
            self.hour as u32,
            self.minute as u32,
            second as u32,
            self.millisecond as u32 + leap_ms,
        )?;
        Some(NaiveDateTime::new(date, time).and_utc().timestamp())
    }
}

/// Position and motion
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GnssPosition {
    /// Decimal degrees, north positive
    pub latitude: f64,
    /// Decimal degrees, east positive
    pub longitude: f64,
    /// Metres above mean sea level (GGA)
    pub altitude: f32,
    /// Ground speed, m/s
    pub speed: f32,
    /// Course over ground, degrees true
    pub course: f32,
    /// Horizontal dilution of precision (GGA)
    pub hdop: f32,
    /// Latitude/longitude came from an active RMC and are not stale
    pub valid: bool,
}

impl GnssPosition {
    /// Store ground speed given in knots
    pub fn set_speed_knots(&mut self, knots: f32) {
        self.speed = knots * KNOTS_TO_MPS;
    }
}

/// Fix dimension and satellites in use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GnssFixState {
    /// From GSA, forced to `None` by GGA quality 0
    pub fix_type: FixType,
    /// From GGA
    pub satellites: u8,
}

impl GnssFixState {
    /// Non-none fix with at least `min_satellites` in use
    pub fn is_usable(&self, min_satellites: u8) -> bool {
        self.fix_type != FixType::None && self.satellites >= min_satellites
    }
}

/// What the receiver said about itself
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReceiverIdentity {
    /// MON-VER swVersion, empty until received
    pub firmware: String<VERSION_STRING_CAPACITY>,
    /// MON-VER hwVersion, empty until received
    pub hardware: String<HW_VERSION_STRING_CAPACITY>,
    /// GPS-UTC offset from NAV-TIMELS
    pub leap_seconds: i8,
    /// Authority behind `leap_seconds`
    pub leap_source: LeapSecondSource,
    /// `leap_seconds` is confirmed by an authoritative source
    pub leap_valid: bool,
    /// A NAV-TIMELS response has been seen
    pub leap_reported: bool,
}

impl ReceiverIdentity {
    /// Take version strings from MON-VER
    pub fn apply_version(&mut self, version: ReceiverVersion) {
        self.firmware = version.software;
        self.hardware = version.hardware;
    }

    /// Take leap-second status from NAV-TIMELS
    pub fn apply_leap_seconds(&mut self, status: LeapSecondStatus) {
        self.leap_seconds = status.current;
        self.leap_source = status.source;
        self.leap_valid = status.valid;
        self.leap_reported = true;
    }

    /// MON-VER has been received
    pub fn version_known(&self) -> bool {
        !self.firmware.is_empty()
    }

    /// Both identity queries have been answered
    pub fn is_complete(&self) -> bool {
        self.version_known() && self.leap_reported
    }
}

/// Externally visible PPS state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PpsState {
    /// Monotonic time of the last captured edge
    pub timestamp: Option<Timestamp>,
    /// Edges captured since boot
    pub count: u32,
    /// An edge arrived within the PPS timeout
    pub valid: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_time() -> GnssTime {
        GnssTime::from_parts(
            UtcDate { year: 1994, month: 3, day: 23 },
            UtcTime { hour: 12, minute: 35, second: 19, millisecond: 0 },
        )
    }

    #[test]
    fn unix_seconds() {
        assert_eq!(reference_time().to_unix_seconds(), Some(764_426_119));
    }

    #[test]
    fn invalid_time_has_no_unix_seconds() {
        let mut time = reference_time();
        time.valid = false;
        assert_eq!(time.to_unix_seconds(), None);
    }

    #[test]
    fn leap_second_maps_to_previous() {
        let time = GnssTime::from_parts(
            UtcDate { year: 2016, month: 12, day: 31 },
            UtcTime { hour: 23, minute: 59, second: 60, millisecond: 0 },
        );
        assert_eq!(time.to_unix_seconds(), Some(1_483_228_799));
    }

    #[test]
    fn fix_usability_needs_both_fields() {
        let mut fix = GnssFixState { fix_type: FixType::Fix3D, satellites: 3 };
        assert!(!fix.is_usable(4));
        fix.satellites = 4;
        assert!(fix.is_usable(4));
        fix.fix_type = FixType::None;
        assert!(!fix.is_usable(4));
    }

    #[test]
    fn identity_completion() {
        let mut identity = ReceiverIdentity::default();
        assert!(!identity.is_complete());

        let mut version = ReceiverVersion::default();
        version.software.push_str("ROM SPG 5.10").unwrap();
        identity.apply_version(version);
        assert!(identity.version_known());
        assert!(!identity.is_complete());

        identity.apply_leap_seconds(LeapSecondStatus {
            current: 18,
            source: LeapSecondSource::Default,
            valid: false,
        });
        assert!(identity.is_complete());
        assert!(!identity.leap_valid);
    }

    #[test]
    fn speed_is_stored_in_metres_per_second() {
        let mut position = GnssPosition::default();
        position.set_speed_knots(10.0);
        assert!((position.speed - 5.144_44).abs() < 1e-4);
    }
}

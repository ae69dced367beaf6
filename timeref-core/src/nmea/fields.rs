//! Positional field decoders
//!
//! All decoders take the raw field text. Empty fields are filtered out by
//! [`optional`] so the caller keeps its previous value; a malformed field is
//! an error naming the field index.

use chrono::NaiveDate;

use crate::constants::gnss::NMEA_YEAR_PIVOT;
use crate::errors::{AcquisitionError, AcquisitionResult};

/// UTC time of day from an `hhmmss[.sss]` field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UtcTime {
    /// 0..=23
    pub hour: u8,
    /// 0..=59
    pub minute: u8,
    /// 0..=60 (60 only during a leap second)
    pub second: u8,
    /// 0..=999
    pub millisecond: u16,
}

/// Calendar date, already checked to exist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UtcDate {
    /// Four-digit year
    pub year: u16,
    /// 1..=12
    pub month: u8,
    /// 1..=31
    pub day: u8,
}

/// Field text at `index`, `None` if empty or absent
pub fn optional<'a>(fields: &[&'a str], index: usize) -> Option<&'a str> {
    fields.get(index).copied().filter(|f| !f.is_empty())
}

fn digits(text: &str, index: usize) -> AcquisitionResult<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AcquisitionError::InvalidField { index });
    }
    text.parse().map_err(|_| AcquisitionError::InvalidField { index })
}

/// `hhmmss` or `hhmmss.s…`; fractional digits beyond milliseconds are ignored
pub fn parse_time(field: &str, index: usize) -> AcquisitionResult<UtcTime> {
    let invalid = AcquisitionError::InvalidField { index };
    let (whole, fraction) = match field.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (field, ""),
    };
    if whole.len() != 6 || !whole.is_ascii() {
        return Err(invalid);
    }

    let hour = digits(&whole[0..2], index)? as u8;
    let minute = digits(&whole[2..4], index)? as u8;
    let second = digits(&whole[4..6], index)? as u8;
    if hour > 23 || minute > 59 || second > 60 {
        return Err(invalid);
    }

    let mut millisecond = 0u16;
    let mut scale = 100u16;
    for byte in fraction.bytes() {
        if !byte.is_ascii_digit() {
            return Err(invalid);
        }
        millisecond += (byte - b'0') as u16 * scale;
        scale /= 10;
    }

    Ok(UtcTime { hour, minute, second, millisecond })
}

/// Check that a calendar date exists
pub fn checked_date(year: u16, month: u8, day: u8, index: usize) -> AcquisitionResult<UtcDate> {
    NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
        .map(|_| UtcDate { year, month, day })
        .ok_or(AcquisitionError::InvalidField { index })
}

/// RMC `ddmmyy`; two-digit years below the pivot are 20xx
pub fn parse_date(field: &str, index: usize) -> AcquisitionResult<UtcDate> {
    if field.len() != 6 || !field.is_ascii() {
        return Err(AcquisitionError::InvalidField { index });
    }
    let day = digits(&field[0..2], index)? as u8;
    let month = digits(&field[2..4], index)? as u8;
    let yy = digits(&field[4..6], index)? as u16;
    let year = if yy < NMEA_YEAR_PIVOT { 2000 + yy } else { 1900 + yy };
    checked_date(year, month, day, index)
}

/// Unsigned integer field
pub fn parse_u8(field: &str, index: usize) -> AcquisitionResult<u8> {
    let value = digits(field, index)?;
    u8::try_from(value).map_err(|_| AcquisitionError::InvalidField { index })
}

/// Unsigned integer field, 16 bits
pub fn parse_u16(field: &str, index: usize) -> AcquisitionResult<u16> {
    let value = digits(field, index)?;
    u16::try_from(value).map_err(|_| AcquisitionError::InvalidField { index })
}

/// Decimal field such as speed, course, HDOP or altitude
pub fn parse_f32(field: &str, index: usize) -> AcquisitionResult<f32> {
    field
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or(AcquisitionError::InvalidField { index })
}

/// Degrees-and-minutes coordinate to signed decimal degrees
///
/// `degree_digits` is 2 for latitude, 3 for longitude. `hemisphere` must be
/// one of the two letters valid for the axis.
pub fn decode_coordinate(value: &str, hemisphere: &str, degree_digits: usize) -> AcquisitionResult<f64> {
    let (max_degrees, positive, negative) = match degree_digits {
        2 => (90.0, "N", "S"),
        _ => (180.0, "E", "W"),
    };

    if value.len() <= degree_digits || !value.is_char_boundary(degree_digits) {
        return Err(AcquisitionError::CoordinateOutOfRange);
    }
    let (degree_text, minute_text) = value.split_at(degree_digits);
    if !degree_text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AcquisitionError::CoordinateOutOfRange);
    }
    if !minute_text.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return Err(AcquisitionError::CoordinateOutOfRange);
    }

    let degrees: f64 = degree_text
        .parse()
        .map_err(|_| AcquisitionError::CoordinateOutOfRange)?;
    let minutes: f64 = minute_text
        .parse()
        .map_err(|_| AcquisitionError::CoordinateOutOfRange)?;
    if degrees > max_degrees || !(0.0..60.0).contains(&minutes) {
        return Err(AcquisitionError::CoordinateOutOfRange);
    }

    let magnitude = degrees + minutes / 60.0;
    if magnitude > max_degrees {
        return Err(AcquisitionError::CoordinateOutOfRange);
    }

    if hemisphere == positive {
        Ok(magnitude)
    } else if hemisphere == negative {
        Ok(-magnitude)
    } else {
        Err(AcquisitionError::CoordinateOutOfRange)
    }
}

/// Latitude in decimal degrees from `ddmm.mmmm` and `N`/`S`
///
/// Rejected input yields 0.0.
pub fn parse_latitude(value: &str, hemisphere: &str) -> f64 {
    decode_coordinate(value, hemisphere, 2).unwrap_or(0.0)
}

/// Longitude in decimal degrees from `dddmm.mmmm` and `E`/`W`
///
/// Rejected input yields 0.0.
pub fn parse_longitude(value: &str, hemisphere: &str) -> f64 {
    decode_coordinate(value, hemisphere, 3).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn latitude_north_and_south() {
        assert!(close(parse_latitude("4916.45", "N"), 49.274_17));
        assert!(close(parse_latitude("4916.45", "S"), -49.274_17));
    }

    #[test]
    fn longitude_east_and_west() {
        assert!(close(parse_longitude("01131.000", "E"), 11.516_67));
        assert!(close(parse_longitude("12311.12", "W"), -123.185_33));
    }

    #[test]
    fn out_of_range_degrees_are_neutral() {
        assert_eq!(parse_latitude("9100.00", "N"), 0.0);
        assert_eq!(parse_longitude("18100.00", "E"), 0.0);
        assert_eq!(
            decode_coordinate("9100.00", "N", 2),
            Err(AcquisitionError::CoordinateOutOfRange)
        );
    }

    #[test]
    fn malformed_coordinates_are_neutral() {
        assert_eq!(parse_latitude("4a16.45", "N"), 0.0);
        assert_eq!(parse_latitude("4960.00", "N"), 0.0);
        assert_eq!(parse_latitude("49", "N"), 0.0);
        assert_eq!(parse_latitude("4916.45", "E"), 0.0);
        assert_eq!(parse_latitude("9000.01", "N"), 0.0);
    }

    #[test]
    fn exact_pole_is_accepted() {
        assert_eq!(parse_latitude("9000.00", "S"), -90.0);
    }

    #[test]
    fn time_with_and_without_fraction() {
        assert_eq!(
            parse_time("123519", 0),
            Ok(UtcTime { hour: 12, minute: 35, second: 19, millisecond: 0 })
        );
        assert_eq!(parse_time("235960.25", 0).unwrap().millisecond, 250);
        assert_eq!(parse_time("000000.1239", 0).unwrap().millisecond, 123);
        assert!(parse_time("246000", 4).is_err());
        assert_eq!(parse_time("12351", 4), Err(AcquisitionError::InvalidField { index: 4 }));
    }

    #[test]
    fn two_digit_years_pivot() {
        assert_eq!(parse_date("230394", 8).unwrap().year, 1994);
        assert_eq!(parse_date("010124", 8).unwrap().year, 2024);
    }

    #[test]
    fn impossible_dates_are_rejected() {
        assert_eq!(parse_date("310224", 8), Err(AcquisitionError::InvalidField { index: 8 }));
        assert!(parse_date("290224", 8).is_ok());
        assert!(parse_date("290223", 8).is_err());
        assert!(checked_date(2024, 13, 1, 3).is_err());
    }

    #[test]
    fn optional_skips_empty() {
        let fields = ["a", "", "c"];
        assert_eq!(optional(&fields, 0), Some("a"));
        assert_eq!(optional(&fields, 1), None);
        assert_eq!(optional(&fields, 7), None);
    }
}

//! Typed NMEA sentences
//!
//! Parsing works on the checksum-verified body (between `$` and `*`). Every
//! field is optional: `None` means "empty in this sentence, keep what you
//! had". Only the RMC status letter and the GGA quality digit carry their
//! own validity meaning. Empty is not absent, though: a sentence cut short
//! before the last field its type defines is rejected as malformed.

use heapless::Vec;

use super::fields::{
    checked_date, decode_coordinate, optional, parse_date, parse_f32, parse_time, parse_u16,
    parse_u8, UtcDate, UtcTime,
};
use crate::constants::buffers::NMEA_MAX_FIELDS;
use crate::errors::{AcquisitionError, AcquisitionResult};
use crate::gnss::FixType;

/// Recommended minimum data: time, date, position, validity
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rmc {
    /// Field 0
    pub time: Option<UtcTime>,
    /// Field 1 is `A`
    pub active: bool,
    /// Fields 2-3; `None` if empty or rejected
    pub latitude: Option<f64>,
    /// Fields 4-5; `None` if empty or rejected
    pub longitude: Option<f64>,
    /// Field 6
    pub speed_knots: Option<f32>,
    /// Field 7, degrees true
    pub course: Option<f32>,
    /// Field 8
    pub date: Option<UtcDate>,
}

/// Fix data: quality, satellites, HDOP, altitude
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Gga {
    /// Field 0
    pub time: Option<UtcTime>,
    /// Field 5; 0 means no fix
    pub quality: Option<u8>,
    /// Field 6
    pub satellites: Option<u8>,
    /// Field 7
    pub hdop: Option<f32>,
    /// Field 8, metres above mean sea level
    pub altitude: Option<f32>,
}

/// DOP and active satellites; only the fix dimension is used
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Gsa {
    /// Field 1
    pub fix: Option<FixType>,
}

/// Time and date
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Zda {
    /// Field 0
    pub time: Option<UtcTime>,
    /// Fields 1-3, present only if all three parse
    pub date: Option<UtcDate>,
}

/// A sentence this layer consumes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sentence {
    /// `xxRMC`
    Rmc(Rmc),
    /// `xxGGA`
    Gga(Gga),
    /// `xxGSA`
    Gsa(Gsa),
    /// `xxZDA`
    Zda(Zda),
}

impl Sentence {
    /// Three-letter type, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Rmc(_) => "RMC",
            Self::Gga(_) => "GGA",
            Self::Gsa(_) => "GSA",
            Self::Zda(_) => "ZDA",
        }
    }
}

/// Parse a verified sentence body such as `GPRMC,123519,A,...`
///
/// The talker id (`GP`, `GN`, `GL`, `GA`, `GB`, `BD`, ...) is ignored.
pub fn parse(body: &str) -> AcquisitionResult<Sentence> {
    let mut split = body.split(',');
    let identifier = split.next().unwrap_or("");
    if identifier.len() < 5 || !identifier.is_ascii() {
        return Err(AcquisitionError::UnsupportedSentence);
    }

    let mut fields: Vec<&str, NMEA_MAX_FIELDS> = Vec::new();
    for field in split {
        if fields.push(field).is_err() {
            break;
        }
    }

    match &identifier[identifier.len() - 3..] {
        "RMC" => require(&fields, 9).and_then(|_| parse_rmc(&fields)).map(Sentence::Rmc),
        "GGA" => require(&fields, 9).and_then(|_| parse_gga(&fields)).map(Sentence::Gga),
        "GSA" => require(&fields, 2).and_then(|_| parse_gsa(&fields)).map(Sentence::Gsa),
        "ZDA" => require(&fields, 4).and_then(|_| parse_zda(&fields)).map(Sentence::Zda),
        _ => Err(AcquisitionError::UnsupportedSentence),
    }
}

/// At least `count` positional fields, empty or not
fn require(fields: &[&str], count: usize) -> AcquisitionResult<()> {
    if fields.len() < count {
        return Err(AcquisitionError::MissingField { index: fields.len() });
    }
    Ok(())
}

fn time_field(fields: &[&str], index: usize) -> AcquisitionResult<Option<UtcTime>> {
    optional(fields, index).map(|f| parse_time(f, index)).transpose()
}

fn f32_field(fields: &[&str], index: usize) -> AcquisitionResult<Option<f32>> {
    optional(fields, index).map(|f| parse_f32(f, index)).transpose()
}

fn u8_field(fields: &[&str], index: usize) -> AcquisitionResult<Option<u8>> {
    optional(fields, index).map(|f| parse_u8(f, index)).transpose()
}

fn coordinate(fields: &[&str], index: usize, degree_digits: usize) -> Option<f64> {
    let value = optional(fields, index)?;
    let hemisphere = optional(fields, index + 1)?;
    decode_coordinate(value, hemisphere, degree_digits).ok()
}

fn parse_rmc(fields: &[&str]) -> AcquisitionResult<Rmc> {
    let active = match optional(fields, 1) {
        Some("A") => true,
        Some("V") | None => false,
        Some(_) => return Err(AcquisitionError::InvalidField { index: 1 }),
    };

    Ok(Rmc {
        time: time_field(fields, 0)?,
        active,
        latitude: coordinate(fields, 2, 2),
        longitude: coordinate(fields, 4, 3),
        speed_knots: f32_field(fields, 6)?,
        course: f32_field(fields, 7)?,
        date: optional(fields, 8).map(|f| parse_date(f, 8)).transpose()?,
    })
}

fn parse_gga(fields: &[&str]) -> AcquisitionResult<Gga> {
    Ok(Gga {
        time: time_field(fields, 0)?,
        quality: u8_field(fields, 5)?,
        satellites: u8_field(fields, 6)?,
        hdop: f32_field(fields, 7)?,
        altitude: f32_field(fields, 8)?,
    })
}

fn parse_gsa(fields: &[&str]) -> AcquisitionResult<Gsa> {
    let fix = match optional(fields, 1) {
        None => None,
        Some("1") => Some(FixType::None),
        Some("2") => Some(FixType::Fix2D),
        Some("3") => Some(FixType::Fix3D),
        Some(_) => return Err(AcquisitionError::InvalidField { index: 1 }),
    };
    Ok(Gsa { fix })
}

fn parse_zda(fields: &[&str]) -> AcquisitionResult<Zda> {
    let day = u8_field(fields, 1)?;
    let month = u8_field(fields, 2)?;
    let year = optional(fields, 3).map(|f| parse_u16(f, 3)).transpose()?;

    let date = match (year, month, day) {
        (Some(year), Some(month), Some(day)) => Some(checked_date(year, month, day, 1)?),
        _ => None,
    };

    Ok(Zda {
        time: time_field(fields, 0)?,
        date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rmc_fields() {
        let sentence =
            parse("GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W").unwrap();
        let Sentence::Rmc(rmc) = sentence else {
            panic!("expected RMC, got {:?}", sentence);
        };

        assert!(rmc.active);
        assert_eq!(rmc.time.unwrap().second, 19);
        assert_eq!(rmc.date, Some(UtcDate { year: 1994, month: 3, day: 23 }));
        assert!((rmc.latitude.unwrap() - 48.1173).abs() < 1e-4);
        assert!((rmc.longitude.unwrap() - 11.516_67).abs() < 1e-4);
        assert_eq!(rmc.speed_knots, Some(22.4));
        assert_eq!(rmc.course, Some(84.4));
    }

    #[test]
    fn talker_ids_are_equivalent() {
        let gp = parse("GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,").unwrap();
        let gn = parse("GNGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,").unwrap();
        assert_eq!(gp, gn);
        assert_eq!(gp.kind(), "GGA");
    }

    #[test]
    fn gga_fields() {
        let Sentence::Gga(gga) =
            parse("GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,").unwrap()
        else {
            panic!("expected GGA");
        };
        assert_eq!(gga.quality, Some(1));
        assert_eq!(gga.satellites, Some(8));
        assert_eq!(gga.hdop, Some(0.9));
        assert_eq!(gga.altitude, Some(545.4));
    }

    #[test]
    fn empty_fields_are_none() {
        let Sentence::Rmc(rmc) = parse("GPRMC,,V,,,,,,,,,").unwrap() else {
            panic!("expected RMC");
        };
        assert!(!rmc.active);
        assert_eq!(rmc, Rmc::default());
    }

    #[test]
    fn gsa_fix_dimension() {
        let fix = |body| match parse(body) {
            Ok(Sentence::Gsa(gsa)) => gsa.fix,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(fix("GNGSA,A,3,04,05,,09,12,,,24,,,,,2.5,1.3,2.1,1"), Some(FixType::Fix3D));
        assert_eq!(fix("GPGSA,A,2,,,,,,,,,,,,,,,"), Some(FixType::Fix2D));
        assert_eq!(fix("GPGSA,A,1,,,,,,,,,,,,,,,"), Some(FixType::None));
        assert_eq!(
            parse("GPGSA,A,4,,,,,,,,,,,,,,,"),
            Err(AcquisitionError::InvalidField { index: 1 })
        );
    }

    #[test]
    fn zda_needs_all_date_fields() {
        let Sentence::Zda(zda) = parse("GPZDA,201530.00,04,07,2002,00,00").unwrap() else {
            panic!("expected ZDA");
        };
        assert_eq!(zda.date, Some(UtcDate { year: 2002, month: 7, day: 4 }));
        assert_eq!(zda.time.unwrap().hour, 20);

        let Sentence::Zda(partial) = parse("GPZDA,201530.00,04,,2002,00,00").unwrap() else {
            panic!("expected ZDA");
        };
        assert_eq!(partial.date, None);
    }

    #[test]
    fn impossible_rmc_date_rejects_sentence() {
        assert_eq!(
            parse("GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,310294,003.1,W"),
            Err(AcquisitionError::InvalidField { index: 8 })
        );
    }

    #[test]
    fn truncated_sentence_reports_first_missing_field() {
        assert_eq!(parse("GPRMC,123519,A"), Err(AcquisitionError::MissingField { index: 2 }));
        assert_eq!(
            parse("GPGGA,123519,4807.038,N,01131.000,E,1,08"),
            Err(AcquisitionError::MissingField { index: 7 })
        );
        assert_eq!(parse("GPGSA,A"), Err(AcquisitionError::MissingField { index: 1 }));
        assert_eq!(parse("GPZDA,201530.00,04,07"), Err(AcquisitionError::MissingField { index: 3 }));

        // Empty but present is fine
        assert!(parse("GPGSA,,").is_ok());
    }

    #[test]
    fn unknown_and_proprietary_types() {
        assert_eq!(parse("GPGSV,3,1,11"), Err(AcquisitionError::UnsupportedSentence));
        assert_eq!(parse("PUBX,00"), Err(AcquisitionError::UnsupportedSentence));
    }

    #[test]
    fn bad_coordinate_is_skipped_not_fatal() {
        let Sentence::Rmc(rmc) =
            parse("GPRMC,123519,A,9107.038,N,01131.000,E,,,230394,,").unwrap()
        else {
            panic!("expected RMC");
        };
        assert_eq!(rmc.latitude, None);
        assert!(rmc.longitude.is_some());
    }
}

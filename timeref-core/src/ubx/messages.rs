//! UBX message definitions
//!
//! Outbound messages implement [`UbxMessage`]; inbound responses are decoded
//! from a completed frame's payload by free functions.

use heapless::String;

use super::{class, id, UbxMessage};
use crate::constants::buffers::{HW_VERSION_STRING_CAPACITY, VERSION_STRING_CAPACITY};
use crate::errors::{AcquisitionError, AcquisitionResult};

/// MON-VER poll (empty payload)
#[derive(Debug, Clone, Copy, Default)]
pub struct MonVerPoll;

impl UbxMessage for MonVerPoll {
    fn class(&self) -> u8 {
        class::MON
    }

    fn id(&self) -> u8 {
        id::MON_VER
    }

    fn payload_len(&self) -> u16 {
        0
    }

    fn write_payload(&self, _buf: &mut [u8]) -> usize {
        0
    }
}

/// NAV-TIMELS poll (empty payload)
#[derive(Debug, Clone, Copy, Default)]
pub struct NavTimelsPoll;

impl UbxMessage for NavTimelsPoll {
    fn class(&self) -> u8 {
        class::NAV
    }

    fn id(&self) -> u8 {
        id::NAV_TIMELS
    }

    fn payload_len(&self) -> u16 {
        0
    }

    fn write_payload(&self, _buf: &mut [u8]) -> usize {
        0
    }
}

/// MGA-INI-TIME_UTC: leap-second hint sent once at startup
///
/// Only the leap-second count is meaningful; the date/time fields stay zero
/// and both accuracy fields are all-ones, which the receiver treats as
/// "unknown" and therefore never lets override its own time.
#[derive(Debug, Clone, Copy)]
pub struct MgaIniTimeUtc {
    /// GPS-UTC offset in seconds
    pub leap_seconds: i8,
}

impl MgaIniTimeUtc {
    /// Payload length fixed by the message layout
    pub const PAYLOAD_LEN: u16 = 24;
    /// `type` field value selecting TIME_UTC
    pub const TYPE: u8 = 0x10;
}

impl UbxMessage for MgaIniTimeUtc {
    fn class(&self) -> u8 {
        class::MGA
    }

    fn id(&self) -> u8 {
        id::MGA_INI
    }

    fn payload_len(&self) -> u16 {
        Self::PAYLOAD_LEN
    }

    fn write_payload(&self, buf: &mut [u8]) -> usize {
        let len = Self::PAYLOAD_LEN as usize;
        buf[..len].fill(0);

        buf[0] = Self::TYPE;
        buf[1] = 0x00; // version
        buf[2] = 0x00; // ref: none
        buf[3] = self.leap_seconds as u8;
        // year..ns and reserved fields stay zero
        buf[16..18].copy_from_slice(&u16::MAX.to_le_bytes()); // tAccS
        buf[20..24].copy_from_slice(&u32::MAX.to_le_bytes()); // tAccNs

        len
    }
}

/// MON-VER response fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceiverVersion {
    /// swVersion, trailing padding removed
    pub software: String<VERSION_STRING_CAPACITY>,
    /// hwVersion, trailing padding removed
    pub hardware: String<HW_VERSION_STRING_CAPACITY>,
}

/// Fixed part of MON-VER: swVersion CH[30] + hwVersion CH[10]
pub const MON_VER_MIN_LEN: usize = VERSION_STRING_CAPACITY + HW_VERSION_STRING_CAPACITY;

/// Decode a MON-VER payload; extension strings are ignored
pub fn decode_mon_ver(payload: &[u8]) -> AcquisitionResult<ReceiverVersion> {
    if payload.len() < MON_VER_MIN_LEN {
        return Err(AcquisitionError::PayloadTooShort {
            len: payload.len(),
            min: MON_VER_MIN_LEN,
        });
    }

    Ok(ReceiverVersion {
        software: padded_string(&payload[..VERSION_STRING_CAPACITY]),
        hardware: padded_string(&payload[VERSION_STRING_CAPACITY..MON_VER_MIN_LEN]),
    })
}

/// NUL-terminated, space-padded fixed field to a trimmed string
fn padded_string<const N: usize>(field: &[u8]) -> String<N> {
    let mut out = String::new();
    for &byte in field.iter().take_while(|&&b| b != 0) {
        let c = if byte.is_ascii_graphic() || byte == b' ' {
            byte as char
        } else {
            '?'
        };
        if out.push(c).is_err() {
            break;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Authority the receiver took its current leap-second count from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LeapSecondSource {
    /// Firmware default, not confirmed by any constellation
    Default,
    /// Derived from GPS and GLONASS time difference
    GpsGlonass,
    /// GPS navigation message
    Gps,
    /// SBAS
    Sbas,
    /// BeiDou
    BeiDou,
    /// Galileo
    Galileo,
    /// Aiding data
    Aided,
    /// Configured by the host
    Configured,
    /// NavIC
    NavIc,
    /// No source reported
    #[default]
    Unknown,
}

impl LeapSecondSource {
    /// Map the NAV-TIMELS `srcOfCurrLs` field
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Default,
            1 => Self::GpsGlonass,
            2 => Self::Gps,
            3 => Self::Sbas,
            4 => Self::BeiDou,
            5 => Self::Galileo,
            6 => Self::Aided,
            7 => Self::Configured,
            8 => Self::NavIc,
            _ => Self::Unknown,
        }
    }

    /// Whether the count came from a real authority rather than a fallback
    pub fn is_authoritative(&self) -> bool {
        !matches!(self, Self::Default | Self::Unknown)
    }
}

/// NAV-TIMELS response fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeapSecondStatus {
    /// Current GPS-UTC offset, seconds
    pub current: i8,
    /// Where `current` came from
    pub source: LeapSecondSource,
    /// `validCurrLs` flag and an authoritative source
    pub valid: bool,
}

/// NAV-TIMELS payload length
pub const NAV_TIMELS_LEN: usize = 24;

/// Decode a NAV-TIMELS payload
pub fn decode_nav_timels(payload: &[u8]) -> AcquisitionResult<LeapSecondStatus> {
    if payload.len() < NAV_TIMELS_LEN {
        return Err(AcquisitionError::PayloadTooShort {
            len: payload.len(),
            min: NAV_TIMELS_LEN,
        });
    }

    let source = LeapSecondSource::from_raw(payload[8]);
    let current = payload[9] as i8;
    let flagged = payload[23] & 0x01 != 0;

    Ok(LeapSecondStatus {
        current,
        source,
        valid: flagged && source.is_authoritative(),
    })
}

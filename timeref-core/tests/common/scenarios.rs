//! Canned receiver output
//!
//! Sentences follow the receiver's real framing; the RMC/GGA pair is the
//! classic 1994-03-23 12:35:19 fix near Munich.

use super::{mon_ver_payload, nav_timels_payload, nmea_sentence, ubx_frame};

pub const RMC_MUNICH: &[u8] =
    b"$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A\r\n";

pub const GGA_MUNICH: &str = "GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,";

/// Unix seconds of 1994-03-23 12:35:19 UTC
pub const MUNICH_UNIX: i64 = 764_426_119;

pub const MUNICH_LATITUDE: f64 = 48.1173;
pub const MUNICH_LONGITUDE: f64 = 11.516_666;

/// RMC with a void status
pub fn void_rmc() -> Vec<u8> {
    nmea_sentence("GPRMC,123520,V,,,,,,,230394,,,N")
}

/// Active RMC at `hhmmss` on 1994-03-23
pub fn rmc_at(hhmmss: &str) -> Vec<u8> {
    nmea_sentence(&format!(
        "GPRMC,{},A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W",
        hhmmss
    ))
}

/// GGA with the given quality and satellite count
pub fn gga(quality: u8, satellites: u8) -> Vec<u8> {
    nmea_sentence(&format!(
        "GPGGA,123519,4807.038,N,01131.000,E,{},{:02},0.9,545.4,M,46.9,M,,",
        quality, satellites
    ))
}

/// GSA reporting a 3D fix
pub fn gsa_3d() -> Vec<u8> {
    nmea_sentence("GNGSA,A,3,01,02,03,04,05,06,07,08,,,,,1.2,0.9,0.8")
}

/// MON-VER response of an M8 receiver
pub fn mon_ver_response() -> Vec<u8> {
    ubx_frame(0x0A, 0x04, &mon_ver_payload("ROM CORE 3.01 (107888)", "00080000"))
}

/// NAV-TIMELS response with 18 leap seconds confirmed by GPS
pub fn nav_timels_response() -> Vec<u8> {
    ubx_frame(0x01, 0x26, &nav_timels_payload(2, 18, true))
}

/// A minute of receiver start-up chatter: identity answers buried in NMEA
pub fn boot_transcript() -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend(nmea_sentence("GPTXT,01,01,02,u-blox AG - www.u-blox.com"));
    bytes.extend(void_rmc());
    bytes.extend(mon_ver_response());
    bytes.extend(gga(1, 8));
    bytes.extend(nav_timels_response());
    bytes.extend(gsa_3d());
    bytes.extend_from_slice(RMC_MUNICH);
    bytes
}

//! Buffer Capacities
//!
//! Fixed capacities for everything the interrupt-side parsers hold. None of
//! these grow at runtime; overflow is detected and counted.

/// NMEA sentence assembly buffer, bytes.
///
/// NMEA 0183 caps sentences at 82 characters including `$` and CR/LF.
/// The extra headroom covers proprietary sentences some receivers emit.
pub const NMEA_BUFFER_SIZE: usize = 96;

/// Shortest sentence worth verifying: `$` + 5-char address + `*` + 2 hex
/// digits + one field separator.
pub const NMEA_MIN_SENTENCE_LEN: usize = 10;

/// Maximum comma-separated fields split out of one sentence.
///
/// GSA carries the most: mode, fix, 12 satellite slots, PDOP/HDOP/VDOP
/// and the system id on NMEA 4.11 receivers.
pub const NMEA_MAX_FIELDS: usize = 24;

/// UBX receive payload capacity, bytes.
///
/// Bytes beyond this are consumed but not stored; MON-VER responses run to
/// 160+ bytes but only the first 40 are decoded.
pub const UBX_PAYLOAD_CAPACITY: usize = 128;

/// Outbound UBX frame buffer: 6-byte header + 24-byte payload + 2-byte checksum,
/// rounded up.
pub const UBX_TX_BUFFER_SIZE: usize = 40;

/// Firmware version string capacity (MON-VER swVersion field).
pub const VERSION_STRING_CAPACITY: usize = 30;

/// Hardware version string capacity (MON-VER hwVersion field).
pub const HW_VERSION_STRING_CAPACITY: usize = 10;

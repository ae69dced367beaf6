//! GNSS Receiver Thresholds
//!
//! Values governing when a fix is considered usable and how persistently the
//! receiver identity is queried.

/// Satellites in use required before a fix is reported as usable.
///
/// Four is the minimum for a 3D position-and-time solution.
pub const MIN_SATELLITES_FOR_FIX: u8 = 4;

/// Version / leap-second query attempts before giving up permanently.
pub const IDENTITY_MAX_ATTEMPTS: u8 = 5;

/// Leap-second count (GPS-UTC) sent in the startup time hint.
///
/// Valid since 2017-01-01. The receiver replaces it with the broadcast value
/// once it has decoded the navigation message.
pub const DEFAULT_LEAP_SECONDS: i8 = 18;

/// Knots to metres per second.
pub const KNOTS_TO_MPS: f32 = 0.514_444;

/// NMEA two-digit years below this pivot belong to the 2000s.
pub const NMEA_YEAR_PIVOT: u16 = 80;

//! GNSS receiver front-end
//!
//! - [`state`]: time, position, fix, identity and PPS value types
//! - [`front_end`]: the UART receive interrupt side, routing each byte to
//!   the UBX and NMEA parsers and publishing a [`GnssSnapshot`]

pub mod front_end;
pub mod state;

pub use front_end::{GnssFrontEnd, GnssSnapshot};
pub use state::{FixType, GnssFixState, GnssPosition, GnssTime, PpsState, ReceiverIdentity};

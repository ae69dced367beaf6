//! Hardware time-reference acquisition for a GNSS-disciplined time server
//!
//! Turns three physical signals into validated, timestamped state:
//! - a 10 MHz reference oscillator, counted by a PIO program between PPS edges
//! - the GNSS PPS edge, correlated with the counter capture
//! - the GNSS UART stream, carrying interleaved UBX frames and NMEA sentences
//!
//! Key constraints:
//! - Interrupt handlers never block and never allocate
//! - Interrupt and main-loop state meet only in [`handoff`] slots
//! - Every published value carries a validity flag and a monotonic timestamp
//!
//! ```no_run
//! use timeref_core::{AcquisitionConfig, Exchange, TimeReference};
//! use timeref_core::ubx::UbxSink;
//!
//! struct Uart;
//! impl UbxSink for Uart {
//!     fn send_frame(&mut self, _frame: &[u8]) {}
//! }
//!
//! static EXCHANGE: Exchange = Exchange::new();
//!
//! let mut reference = TimeReference::new(AcquisitionConfig::default(), &EXCHANGE);
//! let report = reference.poll(1_000_000, &mut Uart);
//! if reference.fix_valid() && reference.pps_valid() {
//!     let _utc = reference.utc_time();
//! }
//! # let _ = report;
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(all(test, not(feature = "std")))]
extern crate std;

mod logging;

pub mod buffer;
pub mod config;
pub mod constants;
pub mod counter;
pub mod errors;
pub mod gnss;
pub mod handoff;
pub mod irq;
pub mod mains;
pub mod nmea;
pub mod pps;
pub mod reference;
pub mod time;
pub mod ubx;

// Public API
pub use config::AcquisitionConfig;
pub use counter::{EdgeCounter, FrequencyCounter, FrequencyValidator, MeasurementClass};
pub use errors::{AcquisitionError, AcquisitionResult};
pub use gnss::{FixType, GnssFrontEnd, GnssPosition, GnssSnapshot, GnssTime, PpsState};
pub use handoff::{ControlFlags, Handoff, Request};
pub use irq::{Edge, GpioDispatch, GpioRouter};
pub use pps::{PpsCapture, PpsCorrelator};
pub use reference::{Exchange, PollReport, TimeReference};
pub use time::{TimeSource, Timestamp};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

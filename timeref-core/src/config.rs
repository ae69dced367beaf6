//! Acquisition configuration
//!
//! One plain struct carries every tunable the acquisition layer reads. The
//! defaults are the documented contracts from [`crate::constants`]; boards
//! override pin assignments and, rarely, the validation tolerance.
//!
//! ```rust
//! use timeref_core::config::AcquisitionConfig;
//! use fugit::MicrosDurationU64;
//!
//! let config = AcquisitionConfig::default()
//!     .with_counter_pins(20, 21)
//!     .with_pps_timeout(MicrosDurationU64::millis(1500));
//! assert_eq!(config.reference_pin, 20);
//! ```

use fugit::MicrosDurationU64;

use crate::constants::{frequency, gnss, time};

/// Tunables for the acquisition layer
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AcquisitionConfig {
    /// GPIO carrying the 10 MHz reference (PIO IN base)
    pub reference_pin: u8,
    /// GPIO carrying the counter gate, i.e. the PPS as seen by the PIO (JMP pin)
    pub gate_pin: u8,
    /// GPIO raising the GNSS PPS edge interrupt
    pub pps_pin: u8,
    /// GPIO raising the AC-mains zero-crossing interrupt
    pub mains_pin: u8,

    /// Expected edges per gate interval
    pub nominal_count: u32,
    /// Deviation still classified as valid, cycles
    pub valid_tolerance: u32,
    /// Signal-present window around nominal, percent
    pub signal_window_percent: u32,

    /// Measurement age beyond which the reference is not present
    #[cfg_attr(feature = "serde", serde(with = "micros"))]
    pub measurement_stale: MicrosDurationU64,
    /// PPS age beyond which `PpsState` is invalid
    #[cfg_attr(feature = "serde", serde(with = "micros"))]
    pub pps_timeout: MicrosDurationU64,
    /// NMEA age beyond which time and fix state are invalid
    #[cfg_attr(feature = "serde", serde(with = "micros"))]
    pub nmea_timeout: MicrosDurationU64,

    /// Satellites required for a usable fix
    pub min_satellites: u8,

    /// Wait after init before talking to the receiver
    #[cfg_attr(feature = "serde", serde(with = "micros"))]
    pub boot_holdoff: MicrosDurationU64,
    /// Interval between identity query attempts
    #[cfg_attr(feature = "serde", serde(with = "micros"))]
    pub identity_retry_interval: MicrosDurationU64,
    /// Identity query attempts before giving up
    pub identity_max_attempts: u8,
    /// Leap seconds announced in the startup time hint
    pub leap_second_hint: i8,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            // Pico-based reference board wiring
            reference_pin: 20,
            gate_pin: 21,
            pps_pin: 22,
            mains_pin: 26,

            nominal_count: frequency::NOMINAL_COUNT,
            valid_tolerance: frequency::VALID_TOLERANCE_CYCLES,
            signal_window_percent: frequency::SIGNAL_WINDOW_PERCENT,

            measurement_stale: MicrosDurationU64::micros(time::MEASUREMENT_STALE_US),
            pps_timeout: MicrosDurationU64::micros(time::PPS_TIMEOUT_US),
            nmea_timeout: MicrosDurationU64::micros(time::NMEA_TIMEOUT_US),

            min_satellites: gnss::MIN_SATELLITES_FOR_FIX,

            boot_holdoff: MicrosDurationU64::micros(time::RECEIVER_BOOT_HOLDOFF_US),
            identity_retry_interval: MicrosDurationU64::micros(time::IDENTITY_RETRY_INTERVAL_US),
            identity_max_attempts: gnss::IDENTITY_MAX_ATTEMPTS,
            leap_second_hint: gnss::DEFAULT_LEAP_SECONDS,
        }
    }
}

impl AcquisitionConfig {
    /// Pins feeding the hardware pulse counter
    pub fn with_counter_pins(mut self, reference: u8, gate: u8) -> Self {
        self.reference_pin = reference;
        self.gate_pin = gate;
        self
    }

    /// Pins routed through the shared GPIO callback
    pub fn with_irq_pins(mut self, pps: u8, mains: u8) -> Self {
        self.pps_pin = pps;
        self.mains_pin = mains;
        self
    }

    /// Override the valid-measurement tolerance (cycles)
    pub fn with_tolerance(mut self, cycles: u32) -> Self {
        self.valid_tolerance = cycles;
        self
    }

    /// Override the PPS staleness bound
    pub fn with_pps_timeout(mut self, timeout: MicrosDurationU64) -> Self {
        self.pps_timeout = timeout;
        self
    }

    /// Override the NMEA staleness bound
    pub fn with_nmea_timeout(mut self, timeout: MicrosDurationU64) -> Self {
        self.nmea_timeout = timeout;
        self
    }

    /// Override the identity retry policy
    pub fn with_identity_retry(mut self, interval: MicrosDurationU64, attempts: u8) -> Self {
        self.identity_retry_interval = interval;
        self.identity_max_attempts = attempts;
        self
    }

    /// Lowest raw count still treated as a present reference
    pub fn signal_min_count(&self) -> u32 {
        self.nominal_count - self.nominal_count / 100 * self.signal_window_percent
    }

    /// Highest raw count still treated as a present reference
    pub fn signal_max_count(&self) -> u32 {
        self.nominal_count + self.nominal_count / 100 * self.signal_window_percent
    }
}

#[cfg(feature = "serde")]
mod micros {
    use fugit::MicrosDurationU64;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &MicrosDurationU64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.to_micros())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<MicrosDurationU64, D::Error> {
        u64::deserialize(deserializer).map(MicrosDurationU64::micros)
    }
}

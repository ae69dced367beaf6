//! Frequency validation against the nominal 10 MHz count
//!
//! Consumes raw edge counts from the hardware pulse counter and turns them
//! into a deviation, a valid/invalid classification and running oscillator
//! quality statistics.
//!
//! ## Validation Layers
//!
//! 1. **Classification**: `|count - nominal| <= tolerance` (±10 cycles by
//!    default, ±1 µs over a 1 s gate). Counted into `valid` / `invalid`.
//! 2. **Signal presence**: a measurement exists, is younger than the
//!    staleness bound, and lies within ±10% of nominal. Guards against
//!    "never started", "stalled" and "wrong frequency entirely".
//! 3. **Offset**: `(count - nominal) / nominal × 1e9` ppb, reported as 0.0
//!    only when nothing was ever measured. Callers that must tell "never
//!    measured" from "exactly on frequency" check `has_measurement()`.
//!
//! The first interval after a (re)start has unknown phase alignment: the
//! gate opened at an arbitrary point relative to the state machine start.
//! It is surfaced as the latest measurement but excluded from statistics.

use fugit::MicrosDurationU64;

use crate::config::AcquisitionConfig;
use crate::constants::frequency::PPB_SCALE;
use crate::time::{self, Timestamp};

/// Most recent raw measurement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrequencyMeasurement {
    /// Reference edges counted in the last gate interval
    pub count: u32,
    /// Measurements taken since (re)start, including the discarded first one
    pub sequence: u32,
    /// `count - nominal`, in cycles
    pub deviation: i32,
    /// Monotonic time the measurement was captured
    pub timestamp: Option<Timestamp>,
}

/// Running statistics over measurements admitted since the last reset
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrequencyStatistics {
    min_error: i32,
    max_error: i32,
    valid: u32,
    invalid: u32,
    sum_error: i64,
    sum_sq_error: f64,
}

impl FrequencyStatistics {
    /// No measurements admitted
    pub const fn new() -> Self {
        Self {
            min_error: i32::MAX,
            max_error: i32::MIN,
            valid: 0,
            invalid: 0,
            sum_error: 0,
            sum_sq_error: 0.0,
        }
    }

    fn admit(&mut self, deviation: i32, valid: bool) {
        self.min_error = self.min_error.min(deviation);
        self.max_error = self.max_error.max(deviation);
        if valid {
            self.valid = self.valid.saturating_add(1);
        } else {
            self.invalid = self.invalid.saturating_add(1);
        }
        self.sum_error += deviation as i64;
        self.sum_sq_error += (deviation as f64) * (deviation as f64);
    }

    /// In-tolerance measurements
    pub fn valid_count(&self) -> u32 {
        self.valid
    }

    /// Out-of-tolerance measurements
    pub fn invalid_count(&self) -> u32 {
        self.invalid
    }

    /// Measurements admitted to statistics
    pub fn samples(&self) -> u32 {
        self.valid.saturating_add(self.invalid)
    }

    /// Smallest deviation seen, `None` before the first admitted sample
    pub fn min_error(&self) -> Option<i32> {
        (self.samples() > 0).then_some(self.min_error)
    }

    /// Largest deviation seen, `None` before the first admitted sample
    pub fn max_error(&self) -> Option<i32> {
        (self.samples() > 0).then_some(self.max_error)
    }

    /// Mean deviation in cycles
    pub fn mean_error(&self) -> Option<f64> {
        let n = self.samples();
        (n > 0).then(|| self.sum_error as f64 / n as f64)
    }

    /// Root-mean-square deviation in cycles
    pub fn rms_error(&self) -> Option<f64> {
        let n = self.samples();
        (n > 0).then(|| libm::sqrt(self.sum_sq_error / n as f64))
    }
}

impl Default for FrequencyStatistics {
    fn default() -> Self {
        Self::new()
    }
}

/// How a measurement was accounted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MeasurementClass {
    /// First interval after (re)start, excluded from statistics
    Discarded,
    /// Within tolerance
    Valid,
    /// Outside tolerance
    Invalid,
}

/// Deviation, classification and statistics for the reference oscillator
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrequencyValidator {
    nominal: u32,
    tolerance: u32,
    signal_min: u32,
    signal_max: u32,
    #[cfg_attr(feature = "serde", serde(skip, default = "default_stale"))]
    stale_after: MicrosDurationU64,
    measurement: FrequencyMeasurement,
    statistics: FrequencyStatistics,
}

#[cfg(feature = "serde")]
fn default_stale() -> MicrosDurationU64 {
    AcquisitionConfig::default().measurement_stale
}

impl Default for FrequencyValidator {
    fn default() -> Self {
        Self::new(&AcquisitionConfig::default())
    }
}

impl FrequencyValidator {
    /// Validator using the tolerances in `config`
    pub fn new(config: &AcquisitionConfig) -> Self {
        Self {
            nominal: config.nominal_count,
            tolerance: config.valid_tolerance,
            signal_min: config.signal_min_count(),
            signal_max: config.signal_max_count(),
            stale_after: config.measurement_stale,
            measurement: FrequencyMeasurement::default(),
            statistics: FrequencyStatistics::new(),
        }
    }

    /// Forget all measurements; the next one is treated as first
    pub fn restart(&mut self) {
        self.measurement = FrequencyMeasurement::default();
        self.statistics = FrequencyStatistics::new();
    }

    /// Clear statistics without touching the latest measurement
    pub fn reset_statistics(&mut self) {
        self.statistics = FrequencyStatistics::new();
    }

    /// Account one raw count captured at `now`
    pub fn record(&mut self, count: u32, now: Timestamp) -> MeasurementClass {
        let deviation = self.deviation_of(count);
        let first = self.measurement.sequence == 0;

        self.measurement = FrequencyMeasurement {
            count,
            sequence: self.measurement.sequence.wrapping_add(1).max(1),
            deviation,
            timestamp: Some(now),
        };

        if first {
            return MeasurementClass::Discarded;
        }

        let valid = self.within_tolerance(deviation);
        self.statistics.admit(deviation, valid);
        if valid {
            MeasurementClass::Valid
        } else {
            MeasurementClass::Invalid
        }
    }

    /// Signed deviation of `count` from nominal, saturated to `i32`
    pub fn deviation_of(&self, count: u32) -> i32 {
        let delta = count as i64 - self.nominal as i64;
        delta.clamp(i32::MIN as i64, i32::MAX as i64) as i32
    }

    /// Whether `deviation` is inside the valid tolerance
    pub fn within_tolerance(&self, deviation: i32) -> bool {
        deviation.unsigned_abs() <= self.tolerance
    }

    /// Last deviation in cycles (0 before the first measurement)
    pub fn error(&self) -> i32 {
        self.measurement.deviation
    }

    /// Last fractional frequency offset in parts per billion
    ///
    /// 0.0 before the first measurement.
    pub fn offset_ppb(&self) -> f64 {
        if !self.has_measurement() {
            return 0.0;
        }
        (self.measurement.count as f64 - self.nominal as f64) / self.nominal as f64 * PPB_SCALE
    }

    /// Whether a plausible 10 MHz reference is currently being measured
    pub fn signal_present(&self, now: Timestamp) -> bool {
        if !self.has_measurement() {
            return false;
        }
        if time::is_stale(now, self.measurement.timestamp, self.stale_after) {
            return false;
        }
        (self.signal_min..=self.signal_max).contains(&self.measurement.count)
    }

    /// Whether at least one measurement exists since (re)start
    pub fn has_measurement(&self) -> bool {
        self.measurement.timestamp.is_some()
    }

    /// Latest raw measurement
    pub fn measurement(&self) -> &FrequencyMeasurement {
        &self.measurement
    }

    /// Running statistics
    pub fn statistics(&self) -> &FrequencyStatistics {
        &self.statistics
    }

    /// Nominal count this validator compares against
    pub fn nominal(&self) -> u32 {
        self.nominal
    }
}

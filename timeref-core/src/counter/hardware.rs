//! Interrupt-side frequency counter
//!
//! [`FrequencyCounter`] owns the PIO state machine (through [`EdgeCounter`])
//! and the working [`FrequencyValidator`]. The PIO interrupt handler calls
//! [`FrequencyCounter::on_interrupt`]; every accepted count updates the
//! validator and publishes a full copy of it for the main-loop task.
//!
//! ```text
//! PIO IRQ 0 ──→ on_interrupt(now)
//!                 ├─ acknowledge IRQ flag
//!                 └─ drain RX FIFO ──→ validator.record(count, now)
//!                                        └─ publish(copy) ──→ Handoff
//! ```

use core::convert::Infallible;

use crate::config::AcquisitionConfig;
use crate::counter::validator::{FrequencyValidator, MeasurementClass};
use crate::handoff::{Handoff, Request};
use crate::logging::{log_debug, log_info, log_warn};
use crate::time::Timestamp;

/// PIO state machine running the gated counter program
///
/// Implemented by `PioEdgeCounter` (feature `rp2040`) on the chip and by
/// `SimulatedCounter` for tests. Every method is called from interrupt context.
pub trait EdgeCounter {
    /// Load the program, map pins and start the state machine
    fn configure(&mut self, reference_pin: u8, gate_pin: u8);

    /// Pop one completed count from the RX FIFO
    fn read_fifo(&mut self) -> nb::Result<u32, Infallible>;

    /// Clear the completion IRQ flag; returns whether it was raised
    fn acknowledge(&mut self) -> bool;
}

/// Hardware pulse counter plus its validator
pub struct FrequencyCounter<'a, H: EdgeCounter> {
    hardware: H,
    config: AcquisitionConfig,
    validator: FrequencyValidator,
    running: bool,
    fresh: bool,
    reports: &'a Handoff<FrequencyValidator>,
    reset: &'a Request,
}

impl<'a, H: EdgeCounter> FrequencyCounter<'a, H> {
    /// Counter publishing into `reports` and honouring `reset`
    pub fn new(
        hardware: H,
        config: AcquisitionConfig,
        reports: &'a Handoff<FrequencyValidator>,
        reset: &'a Request,
    ) -> Self {
        Self {
            validator: FrequencyValidator::new(&config),
            hardware,
            config,
            running: false,
            fresh: false,
            reports,
            reset,
        }
    }

    /// Configure the state machine on the configured pins and start counting
    ///
    /// The first interval after a start is never trusted.
    pub fn start(&mut self) {
        self.hardware
            .configure(self.config.reference_pin, self.config.gate_pin);
        self.validator.restart();
        self.fresh = false;
        self.running = true;
        log_info!(
            "Frequency counter started: ref GPIO{}, gate GPIO{}",
            self.config.reference_pin,
            self.config.gate_pin
        );
    }

    /// Whether `start` has been called
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Pop one raw count, if the FIFO holds one
    pub fn read_count(&mut self) -> Option<u32> {
        match self.hardware.read_fifo() {
            Ok(count) => Some(count),
            Err(nb::Error::WouldBlock) => None,
            Err(nb::Error::Other(never)) => match never {},
        }
    }

    /// Account one count captured at `now` and publish the result
    pub fn capture(&mut self, count: u32, now: Timestamp) -> MeasurementClass {
        if self.reset.take() {
            self.validator.reset_statistics();
            log_debug!("Frequency statistics reset");
        }

        let class = self.validator.record(count, now);
        match class {
            MeasurementClass::Discarded => {
                log_debug!("Discarding first interval after start: {}", count);
            }
            MeasurementClass::Invalid => {
                log_warn!(
                    "Frequency out of tolerance: {} cycles ({} counted)",
                    self.validator.error(),
                    count
                );
            }
            MeasurementClass::Valid => {}
        }

        self.fresh = true;
        self.reports.publish(self.validator);
        class
    }

    /// PIO interrupt body: acknowledge and drain every completed count
    ///
    /// Returns the number of counts processed.
    pub fn on_interrupt(&mut self, now: Timestamp) -> usize {
        if !self.running {
            return 0;
        }
        self.hardware.acknowledge();

        let mut drained = 0;
        while let Some(count) = self.read_count() {
            self.capture(count, now);
            drained += 1;
        }
        drained
    }

    /// One-shot "new measurement" flag, cleared by reading it
    pub fn new_measurement_available(&mut self) -> bool {
        core::mem::replace(&mut self.fresh, false)
    }

    /// Working validator state
    pub fn validator(&self) -> &FrequencyValidator {
        &self.validator
    }

    /// Underlying state machine
    pub fn hardware(&self) -> &H {
        &self.hardware
    }

    /// Underlying state machine, mutably
    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hardware
    }
}

//! PIO-backed edge counter for the RP2040
//!
//! Runs [`gated_counter_program`] on one state machine through `embassy-rp`.
//! The firmware splits its `Pio` peripheral and hands over the common block,
//! one state machine, the IRQ flags and the two GPIOs; everything after that
//! goes through [`EdgeCounter`] from the PIO interrupt.
//!
//! ```ignore
//! let Pio { common, irq_flags, sm0, .. } = Pio::new(p.PIO0, Irqs);
//! let hardware = PioEdgeCounter::new(common, sm0, irq_flags, p.PIN_20, p.PIN_21);
//! let mut counter = FrequencyCounter::new(hardware, config, &EXCHANGE.frequency, &EXCHANGE.reset_statistics);
//! counter.start();
//! ```

use core::convert::Infallible;

use embassy_rp::pio::{
    Common, Config, Direction, Instance, IrqFlags, LoadedProgram, Pin, PioPin,
    StateMachine,
};
use embassy_rp::Peri;

use crate::counter::hardware::EdgeCounter;
use crate::counter::program::{gated_counter_program, COMPLETION_IRQ};
use crate::logging::{log_info, log_warn};

/// Gated counter on state machine `SM` of PIO block `P`
pub struct PioEdgeCounter<'d, P: Instance, const SM: usize> {
    common: Common<'d, P>,
    sm: StateMachine<'d, P, SM>,
    irq_flags: IrqFlags<'d, P>,
    reference: Pin<'d, P>,
    gate: Pin<'d, P>,
    program: Option<LoadedProgram<'d, P>>,
}

impl<'d, P: Instance, const SM: usize> PioEdgeCounter<'d, P, SM> {
    /// Claim the PIO block, one state machine and the reference and gate pins
    ///
    /// Nothing runs until [`EdgeCounter::configure`].
    pub fn new(
        mut common: Common<'d, P>,
        sm: StateMachine<'d, P, SM>,
        irq_flags: IrqFlags<'d, P>,
        reference: Peri<'d, impl PioPin + 'd>,
        gate: Peri<'d, impl PioPin + 'd>,
    ) -> Self {
        let reference = common.make_pio_pin(reference);
        let gate = common.make_pio_pin(gate);
        Self { common, sm, irq_flags, reference, gate, program: None }
    }

    /// GPIO numbers of the reference and gate inputs
    pub fn pins(&self) -> (u8, u8) {
        (self.reference.pin(), self.gate.pin())
    }
}

impl<'d, P: Instance, const SM: usize> EdgeCounter for PioEdgeCounter<'d, P, SM> {
    fn configure(&mut self, reference_pin: u8, gate_pin: u8) {
        if self.pins() != (reference_pin, gate_pin) {
            log_warn!(
                "PIO counter wired to GPIO{}/GPIO{}, configuration names GPIO{}/GPIO{}",
                self.reference.pin(),
                self.gate.pin(),
                reference_pin,
                gate_pin
            );
        }

        self.sm.set_enable(false);

        // Loaded once; a restart reuses the same instruction memory
        let common = &mut self.common;
        let program = self
            .program
            .get_or_insert_with(|| common.load_program(&gated_counter_program()));

        let mut cfg = Config::default();
        cfg.use_program(program, &[]);
        // IN base is the reference clock for `wait pin 0`; the gate is read with `jmp pin`
        cfg.set_in_pins(&[&self.reference]);
        cfg.set_jmp_pin(&self.gate);

        self.sm.set_pin_dirs(Direction::In, &[&self.reference, &self.gate]);
        self.sm.set_config(&cfg);
        self.sm.clear_fifos();
        self.sm.restart();
        self.irq_flags.clear(COMPLETION_IRQ as usize);
        self.sm.set_enable(true);

        log_info!("PIO state machine {} armed", SM);
    }

    fn read_fifo(&mut self) -> nb::Result<u32, Infallible> {
        self.sm.rx().try_pull().ok_or(nb::Error::WouldBlock)
    }

    fn acknowledge(&mut self) -> bool {
        self.irq_flags.check_and_clear(COMPLETION_IRQ as usize)
    }
}

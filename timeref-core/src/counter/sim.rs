//! Simulated PIO counter
//!
//! Behaves like the state machine as the CPU sees it: a 4-entry RX FIFO
//! that drops new counts when full (`push noblock`), plus a sticky IRQ flag.

use core::convert::Infallible;

use heapless::Deque;

use crate::counter::hardware::EdgeCounter;

/// RX FIFO depth of an RP2040 state machine without FIFO joining
pub const FIFO_DEPTH: usize = 4;

/// Host-side stand-in for the PIO gated counter
#[derive(Debug, Default)]
pub struct SimulatedCounter {
    fifo: Deque<u32, FIFO_DEPTH>,
    irq: bool,
    pins: Option<(u8, u8)>,
    overruns: u32,
}

impl SimulatedCounter {
    /// Unconfigured, empty FIFO
    pub fn new() -> Self {
        Self::default()
    }

    /// End a gate interval that counted `count` reference edges
    ///
    /// Returns `false` if the FIFO was full and the count was dropped.
    pub fn complete_interval(&mut self, count: u32) -> bool {
        self.irq = true;
        if self.fifo.push_back(count).is_err() {
            self.overruns += 1;
            return false;
        }
        true
    }

    /// Pins passed to the last `configure`
    pub fn pins(&self) -> Option<(u8, u8)> {
        self.pins
    }

    /// Whether the completion IRQ is raised
    pub fn irq_pending(&self) -> bool {
        self.irq
    }

    /// Counts lost to a full FIFO
    pub fn overruns(&self) -> u32 {
        self.overruns
    }
}

impl EdgeCounter for SimulatedCounter {
    fn configure(&mut self, reference_pin: u8, gate_pin: u8) {
        self.fifo.clear();
        self.irq = false;
        self.pins = Some((reference_pin, gate_pin));
    }

    fn read_fifo(&mut self) -> nb::Result<u32, Infallible> {
        self.fifo.pop_front().ok_or(nb::Error::WouldBlock)
    }

    fn acknowledge(&mut self) -> bool {
        core::mem::replace(&mut self.irq, false)
    }
}

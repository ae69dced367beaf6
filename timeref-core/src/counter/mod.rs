//! Hardware pulse counter and frequency validation
//!
//! - [`program`]: the PIO assembly that counts reference edges per PPS gate
//! - [`hardware`]: the interrupt-side owner of the state machine
//! - [`validator`]: deviation, classification and statistics
//! - `rp2040`: the state machine itself, through `embassy-rp` (feature `rp2040`)
//! - [`sim`]: FIFO-accurate stand-in for host tests

pub mod hardware;
pub mod program;
#[cfg(feature = "rp2040")]
pub mod rp2040;
pub mod sim;
pub mod validator;

pub use hardware::{EdgeCounter, FrequencyCounter};
pub use program::{gated_counter_program, COMPLETION_IRQ, PROGRAM_LENGTH};
#[cfg(feature = "rp2040")]
pub use rp2040::PioEdgeCounter;
pub use sim::SimulatedCounter;
pub use validator::{
    FrequencyMeasurement, FrequencyStatistics, FrequencyValidator, MeasurementClass,
};

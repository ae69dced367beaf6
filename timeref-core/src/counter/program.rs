//! PIO program for the gated edge counter
//!
//! The counter runs entirely inside one RP2040 PIO state machine. The CPU
//! never polls the gate; it only drains the RX FIFO when the program raises
//! IRQ 0 at the end of each interval.
//!
//! ## Pin mapping
//!
//! - **IN base** = reference clock. `wait 1 pin 0` / `wait 0 pin 0` consume
//!   exactly one reference period.
//! - **JMP pin** (EXECCTRL) = gate / PPS. Tested with `jmp pin` so the gate
//!   can sit on any GPIO, not just IN base + 1.
//!
//! ## Interval accounting
//!
//! `x` starts at `0xFFFF_FFFF` and is decremented once per reference period;
//! at the next rising gate edge `~x` is exactly the number of periods seen.
//! The count is split across the high and low phases of the PPS pulse so the
//! program detects the next rising edge without a second gate input. At
//! 125 MHz the non-waiting instructions of each loop take 4 system clocks,
//! well inside the 12.5-clock reference period.
//!
//! After the push, the program wraps straight back to `armed`: the gate has
//! just gone high, so the next interval starts on the same edge.

/// Instructions reserved by the program (see `gated_counter_program`)
pub const PROGRAM_LENGTH: usize = 16;

/// PIO IRQ flag raised when a count is pushed
pub const COMPLETION_IRQ: u8 = 0;

/// Assembled gated edge-counter program
///
/// The first three instructions run once, synchronising to the first rising
/// gate edge after the state machine is enabled; `.wrap_target` then keeps the
/// counting loop resident.
pub fn gated_counter_program() -> pio::Program<{ pio::RP2040_MAX_PROGRAM_SIZE }> {
    pio::pio_asm!(
        "idle_high:",
        "    jmp pin idle_high",
        "idle_low:",
        "    jmp pin armed",
        "    jmp idle_low",
        "armed:",
        ".wrap_target",
        "    mov x, ~null",
        "count_high:",
        "    wait 1 pin 0",
        "    wait 0 pin 0",
        "    jmp x-- high_next",
        "high_next:",
        "    jmp pin count_high",
        "count_low:",
        "    wait 1 pin 0",
        "    wait 0 pin 0",
        "    jmp x-- low_next",
        "low_next:",
        "    jmp pin done",
        "    jmp count_low",
        "done:",
        "    mov isr, ~x",
        "    push noblock",
        "    irq 0",
        ".wrap",
    )
    .program
}

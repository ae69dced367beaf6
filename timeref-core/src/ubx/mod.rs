//! UBX binary protocol
//!
//! ```text
//! ┌──────┬──────┬───────┬────┬──────────┬─────────┬──────┬──────┐
//! │ 0xB5 │ 0x62 │ class │ id │ len (LE) │ payload │ CK_A │ CK_B │
//! └──────┴──────┴───────┴────┴──────────┴─────────┴──────┴──────┘
//!                 └──────── Fletcher-8 over these ─────┘
//! ```
//!
//! Outbound: three small messages (identity poll, leap-second poll, time
//! hint). Inbound: a byte-level [`FrameParser`] and decoders for the two
//! responses the acquisition layer consumes.

mod messages;
mod parser;

pub use messages::*;
pub use parser::*;

use crate::constants::buffers::UBX_TX_BUFFER_SIZE;

/// First sync byte
pub const SYNC1: u8 = 0xB5;
/// Second sync byte
pub const SYNC2: u8 = 0x62;

/// Header bytes before the payload: sync(2) + class + id + len(2)
pub const HEADER_LEN: usize = 6;
/// Header plus checksum
pub const FRAME_OVERHEAD: usize = HEADER_LEN + 2;

/// Message classes used by this layer
pub mod class {
    /// Navigation results
    pub const NAV: u8 = 0x01;
    /// Monitoring
    pub const MON: u8 = 0x0A;
    /// Multiple GNSS assistance
    pub const MGA: u8 = 0x13;
}

/// Message ids used by this layer
pub mod id {
    /// NAV-TIMELS: leap second event information
    pub const NAV_TIMELS: u8 = 0x26;
    /// MON-VER: receiver and software version
    pub const MON_VER: u8 = 0x04;
    /// MGA-INI-*: initial assistance data
    pub const MGA_INI: u8 = 0x40;
}

/// Calculate UBX Fletcher checksum over class, id, length and payload
pub fn calculate_checksum(data: &[u8]) -> (u8, u8) {
    let mut checksum = Checksum::new();
    for &byte in data {
        checksum.update(byte);
    }
    checksum.value()
}

/// Incremental Fletcher-8, fed one byte at a time by the parser
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Checksum {
    a: u8,
    b: u8,
}

impl Checksum {
    /// Zeroed accumulator
    pub const fn new() -> Self {
        Self { a: 0, b: 0 }
    }

    /// Accumulate one byte
    #[inline]
    pub fn update(&mut self, byte: u8) {
        self.a = self.a.wrapping_add(byte);
        self.b = self.b.wrapping_add(self.a);
    }

    /// `(CK_A, CK_B)`
    pub fn value(&self) -> (u8, u8) {
        (self.a, self.b)
    }
}

/// Outbound UBX message
pub trait UbxMessage {
    /// Message class
    fn class(&self) -> u8;

    /// Message id
    fn id(&self) -> u8;

    /// Payload length
    fn payload_len(&self) -> u16;

    /// Write payload to buffer, returns bytes written
    fn write_payload(&self, buf: &mut [u8]) -> usize;

    /// Build complete UBX frame into buffer, returns total bytes (0 if it does not fit)
    fn build(&self, buf: &mut [u8]) -> usize {
        let payload_len = self.payload_len() as usize;
        let total_len = FRAME_OVERHEAD + payload_len;

        if buf.len() < total_len {
            return 0;
        }

        buf[0] = SYNC1;
        buf[1] = SYNC2;
        buf[2] = self.class();
        buf[3] = self.id();
        buf[4..6].copy_from_slice(&(payload_len as u16).to_le_bytes());

        self.write_payload(&mut buf[HEADER_LEN..HEADER_LEN + payload_len]);

        let (ck_a, ck_b) = calculate_checksum(&buf[2..HEADER_LEN + payload_len]);
        buf[HEADER_LEN + payload_len] = ck_a;
        buf[HEADER_LEN + payload_len + 1] = ck_b;

        total_len
    }
}

/// Transmit side of the receiver serial link
pub trait UbxSink {
    /// Queue one complete frame for transmission
    fn send_frame(&mut self, frame: &[u8]);
}

/// Build `message` on the stack and hand it to `sink`
///
/// Returns the frame length, or 0 if the message did not fit the transmit
/// buffer and nothing was sent.
pub fn send<M: UbxMessage, S: UbxSink + ?Sized>(sink: &mut S, message: &M) -> usize {
    let mut buf = [0u8; UBX_TX_BUFFER_SIZE];
    let len = message.build(&mut buf);
    if len > 0 {
        sink.send_frame(&buf[..len]);
    }
    len
}

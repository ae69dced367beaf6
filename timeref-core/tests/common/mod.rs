//! Common test utilities for integration tests
//!
//! This module provides:
//! - Wire builders for NMEA sentences and UBX frames
//! - A recording transmit sink
//! - [`harness::Station`], every interrupt owner wired to one `TimeReference`

#![allow(dead_code)]

use timeref_core::nmea;
use timeref_core::ubx::{calculate_checksum, UbxSink};

pub mod harness;
pub mod scenarios;

/// `$body*HH\r\n` with a correct checksum
pub fn nmea_sentence(body: &str) -> Vec<u8> {
    format!("${}*{:02X}\r\n", body, nmea::checksum(body.as_bytes())).into_bytes()
}

/// Complete UBX frame with a correct checksum
pub fn ubx_frame(class: u8, id: u8, payload: &[u8]) -> Vec<u8> {
    let mut frame = vec![0xB5, 0x62, class, id];
    frame.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    frame.extend_from_slice(payload);
    let (ck_a, ck_b) = calculate_checksum(&frame[2..]);
    frame.extend_from_slice(&[ck_a, ck_b]);
    frame
}

/// MON-VER payload with NUL-padded version strings
pub fn mon_ver_payload(software: &str, hardware: &str) -> Vec<u8> {
    let mut payload = vec![0u8; 40];
    payload[..software.len()].copy_from_slice(software.as_bytes());
    payload[30..30 + hardware.len()].copy_from_slice(hardware.as_bytes());
    payload
}

/// NAV-TIMELS payload carrying `current` leap seconds from `source`
pub fn nav_timels_payload(source: u8, current: i8, valid: bool) -> Vec<u8> {
    let mut payload = vec![0u8; 24];
    payload[8] = source;
    payload[9] = current as u8;
    payload[23] = valid as u8;
    payload
}

/// Transmit sink that keeps every frame
#[derive(Default)]
pub struct RecordingSink {
    pub frames: Vec<Vec<u8>>,
}

impl RecordingSink {
    /// `(class, id)` of each frame sent so far
    pub fn keys(&self) -> Vec<(u8, u8)> {
        self.frames.iter().map(|f| (f[2], f[3])).collect()
    }
}

impl UbxSink for RecordingSink {
    fn send_frame(&mut self, frame: &[u8]) {
        self.frames.push(frame.to_vec());
    }
}

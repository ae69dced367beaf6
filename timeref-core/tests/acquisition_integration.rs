//! Integration tests for the acquisition layer
//!
//! Tests the complete data flow from receiver bytes, PIO counts and GPIO
//! edges through the interrupt owners and the handoff slots into the
//! main-loop `TimeReference`.

#![cfg(test)]

mod common;

use timeref_core::irq::Edge;
use timeref_core::ubx::LeapSecondSource;
use timeref_core::{AcquisitionConfig, FixType};

use common::harness::Station;
use common::scenarios::{self, MUNICH_LATITUDE, MUNICH_LONGITUDE, MUNICH_UNIX, RMC_MUNICH};
use common::{nmea_sentence, ubx_frame};

const NOMINAL: u32 = 10_000_000;

#[test]
fn test_rmc_reaches_time_reference() {
    let mut station = Station::new();
    station.receive(RMC_MUNICH);
    let report = station.poll();

    assert!(report.gnss);
    let time = station.reference.utc_time();
    assert!(time.valid);
    assert_eq!((time.year, time.month, time.day), (1994, 3, 23));
    assert_eq!((time.hour, time.minute, time.second), (12, 35, 19));
    assert_eq!(time.to_unix_seconds(), Some(MUNICH_UNIX));

    let position = station.reference.position();
    assert!(position.valid);
    assert!((position.latitude - MUNICH_LATITUDE).abs() < 1e-4);
    assert!((position.longitude - MUNICH_LONGITUDE).abs() < 1e-4);
    assert!((position.speed - 22.4 * 0.514_444).abs() < 1e-3);
}

#[test]
fn test_boot_transcript_yields_full_state() {
    let mut station = Station::new();
    station.receive(&scenarios::boot_transcript());
    station.poll();

    let reference = &station.reference;
    assert!(reference.fix_valid());
    assert_eq!(reference.fix_type(), FixType::Fix3D);
    assert_eq!(reference.satellites(), 8);
    assert!(reference.utc_time().valid);
    assert_eq!(reference.firmware_version(), "ROM CORE 3.01 (107888)");
    assert_eq!(reference.hardware_version(), "00080000");
    assert_eq!(reference.leap_seconds(), 18);
    assert!(reference.leap_seconds_valid());
    assert_eq!(reference.identity().leap_source, LeapSecondSource::Gps);

    let nmea = reference.nmea_stats();
    assert_eq!(nmea.accepted, 4);
    assert_eq!(nmea.unknown, 1);
    assert_eq!(nmea.checksum_errors, 0);
    assert_eq!(reference.ubx_stats().frames, 2);
}

#[test]
fn test_void_rmc_invalidates_time() {
    let mut station = Station::new();
    station.receive(RMC_MUNICH);
    station.receive(&scenarios::void_rmc());
    station.poll();

    let time = station.reference.utc_time();
    assert!(!time.valid);
    assert!(!station.reference.position().valid);
    // The last good values stay readable
    assert_eq!(time.second, 19);
}

#[test]
fn test_gga_quality_zero_drops_fix() {
    let mut station = Station::new();
    station.receive(&scenarios::gsa_3d());
    station.receive(&scenarios::gga(1, 8));
    station.poll();
    assert!(station.reference.fix_valid());

    station.receive(&scenarios::gga(0, 8));
    station.poll();
    assert!(!station.reference.fix_valid());
    assert_eq!(station.reference.fix_type(), FixType::None);
}

#[test]
fn test_too_few_satellites_is_not_a_fix() {
    let mut station = Station::new();
    station.receive(&scenarios::gsa_3d());
    station.receive(&scenarios::gga(1, 3));
    station.poll();

    assert_eq!(station.reference.fix_type(), FixType::Fix3D);
    assert!(!station.reference.fix_valid());
}

#[test]
fn test_corrupted_sentence_changes_nothing() {
    let mut station = Station::new();
    station.receive(RMC_MUNICH);
    station.poll();
    let before = station.reference.utc_time();

    let mut corrupted = scenarios::rmc_at("130000");
    let star = corrupted.iter().position(|&b| b == b'*').unwrap();
    corrupted[star + 1] = if corrupted[star + 1] == b'0' { b'1' } else { b'0' };
    station.receive(&corrupted);
    station.poll();

    assert_eq!(station.reference.utc_time(), before);
    assert_eq!(station.reference.nmea_stats().checksum_errors, 1);
}

#[test]
fn test_frequency_offset_through_pps() {
    let mut station = Station::new();

    // First interval after start is partial and only primes the validator
    station.second(NOMINAL + 123);
    assert_eq!(station.reference.frequency_statistics().samples(), 0);

    let report = station.second(NOMINAL + 5);
    assert!(report.frequency && report.pps);
    assert_eq!(station.reference.frequency_error(), 5);
    assert!((station.reference.frequency_offset_ppb() - 500.0).abs() < 1e-6);
    assert!(station.reference.signal_present());
    assert!(station.reference.pps_valid());
    assert_eq!(station.reference.pps_count(), 2);

    let stats = station.reference.frequency_statistics();
    assert_eq!(stats.valid_count(), 1);
    assert_eq!(stats.invalid_count(), 0);
}

#[test]
fn test_out_of_tolerance_counts_are_classified() {
    let mut station = Station::new();
    station.second(NOMINAL);
    station.second(NOMINAL + 10);
    station.second(NOMINAL - 11);
    station.second(NOMINAL + 200);

    let stats = station.reference.frequency_statistics();
    assert_eq!(stats.valid_count(), 1);
    assert_eq!(stats.invalid_count(), 2);
    assert_eq!(stats.min_error(), Some(-11));
    assert_eq!(stats.max_error(), Some(200));
    // Still inside the ±10 % presence window
    assert!(station.reference.signal_present());
}

#[test]
fn test_signal_present_timeline() {
    let mut station = Station::new();
    assert!(!station.reference.signal_present());

    station.second(NOMINAL);
    assert!(station.reference.signal_present());

    // Way outside the presence window
    station.second(NOMINAL / 2);
    assert!(!station.reference.signal_present());

    station.second(NOMINAL);
    assert!(station.reference.signal_present());

    // Edges stop: present until the measurement is older than two seconds
    station.advance_ms(2000);
    station.poll();
    assert!(station.reference.signal_present());
    station.advance_ms(1);
    station.poll();
    assert!(!station.reference.signal_present());
}

#[test]
fn test_pps_loss_and_recovery() {
    let mut station = Station::new();
    station.second(NOMINAL);
    station.second(NOMINAL);
    assert!(station.reference.pps_valid());

    station.advance_ms(2001);
    let report = station.poll();
    assert!(report.pps_expired);
    assert!(!station.reference.pps_valid());
    assert_eq!(station.reference.pps_count(), 2);

    station.second(NOMINAL);
    assert!(station.reference.pps_valid());
    assert_eq!(station.reference.pps_count(), 3);
}

#[test]
fn test_nmea_silence_expires_time_and_fix() {
    let mut station = Station::new();
    station.receive(&scenarios::boot_transcript());
    station.poll();
    assert!(station.reference.fix_valid());

    station.advance_ms(3000);
    station.poll();
    assert!(station.reference.utc_time().valid);

    station.advance_ms(1);
    let report = station.poll();
    assert!(report.time_expired && report.fix_expired);
    assert!(!station.reference.utc_time().valid);
    assert!(!station.reference.fix_valid());
    // Identity is not part of the NMEA timeout domain
    assert!(station.reference.leap_seconds_valid());

    station.receive(RMC_MUNICH);
    station.poll();
    assert!(station.reference.utc_time().valid);
}

#[test]
fn test_rmc_stops_while_gga_continues() {
    let mut station = Station::new();
    station.receive(RMC_MUNICH);
    station.receive(&scenarios::gsa_3d());
    station.poll();
    assert!(station.reference.utc_time().valid);

    let mut expirations = 0;
    for _ in 0..6 {
        station.advance_ms(1000);
        station.receive(&scenarios::gga(1, 8));
        let report = station.poll();
        assert!(report.gnss);
        assert!(!report.fix_expired);
        if report.time_expired {
            expirations += 1;
        }
    }

    assert_eq!(expirations, 1);
    assert!(!station.reference.utc_time().valid);
    assert!(!station.reference.position().valid);
    assert!(station.reference.fix_valid());

    station.receive(RMC_MUNICH);
    station.poll();
    assert!(station.reference.utc_time().valid);
}

#[test]
fn test_identity_queries_and_answers() {
    let mut station = Station::new();
    station.poll();
    assert!(station.sink.frames.is_empty());

    station.advance_ms(1000);
    station.poll();
    assert_eq!(station.sink.keys(), [(0x13, 0x40), (0x0A, 0x04), (0x01, 0x26)]);
    let hint = &station.sink.frames[0];
    assert_eq!(hint[6], 0x10);
    assert_eq!(hint[6 + 3] as i8, 18);

    station.receive(&scenarios::mon_ver_response());
    station.receive(&scenarios::nav_timels_response());
    station.advance_ms(2000);
    station.poll();

    assert_eq!(station.sink.frames.len(), 3);
    assert!(station.reference.identity_query_finished());
    assert!(station.reference.identity().is_complete());
}

#[test]
fn test_silent_receiver_gives_up() {
    let config = AcquisitionConfig::default()
        .with_identity_retry(fugit::MicrosDurationU64::millis(500), 3);
    let mut station = Station::with_config(config);

    for _ in 0..40 {
        station.poll();
        station.advance_ms(100);
    }

    // Hint, then three rounds of both polls
    assert_eq!(station.sink.frames.len(), 1 + 3 * 2);
    assert!(station.reference.identity_query_finished());
    assert_eq!(station.reference.firmware_version(), "");
}

#[test]
fn test_disabled_front_end_ignores_input() {
    let mut station = Station::new();
    station.reference.set_enabled(false);
    station.receive(RMC_MUNICH);
    station.poll();
    assert!(!station.reference.utc_time().valid);

    station.reference.set_enabled(true);
    station.receive(RMC_MUNICH);
    station.poll();
    assert!(station.reference.utc_time().valid);
}

#[test]
fn test_reset_time_state_flushes_partial_input() {
    let mut station = Station::new();
    station.receive(RMC_MUNICH);
    station.poll();

    let sentence = scenarios::rmc_at("123600");
    let (head, tail) = sentence.split_at(20);
    station.receive(head);
    station.reference.reset_time_state();
    assert!(!station.reference.utc_time().valid);

    // The flush lands with the next byte and discards the half sentence
    station.receive(tail);
    station.poll();
    assert!(!station.reference.utc_time().valid);

    station.receive(&scenarios::rmc_at("123601"));
    station.poll();
    let time = station.reference.utc_time();
    assert!(time.valid);
    assert_eq!((time.minute, time.second), (36, 1));
}

#[test]
fn test_reset_frequency_statistics_reaches_counter() {
    let mut station = Station::new();
    station.second(NOMINAL);
    station.second(NOMINAL + 50);
    station.second(NOMINAL + 1);
    assert_eq!(station.reference.frequency_statistics().samples(), 2);

    station.reference.reset_frequency_statistics();
    assert_eq!(station.reference.frequency_statistics().samples(), 0);

    station.second(NOMINAL + 2);
    let stats = station.reference.frequency_statistics();
    assert_eq!(stats.samples(), 1);
    assert_eq!(stats.max_error(), Some(2));
}

#[test]
fn test_measurement_flag_is_one_shot() {
    let mut station = Station::new();
    assert!(!station.counter.new_measurement_available());

    station.pps_edge(NOMINAL);
    assert!(station.counter.new_measurement_available());
    assert!(!station.counter.new_measurement_available());

    // Edge without a completed interval captures nothing
    station.gpio(station.config.pps_pin, Edge::Rising);
    assert!(!station.counter.new_measurement_available());
}

#[test]
fn test_mains_edges_do_not_touch_pps() {
    let mut station = Station::new();
    let mains_pin = station.config.mains_pin;
    for _ in 0..60 {
        station.advance_ms(20);
        station.gpio(mains_pin, Edge::Falling);
    }
    station.poll();

    assert_eq!(station.pps.count(), 0);
    assert!(!station.reference.pps_valid());
    assert!(!station.reference.frequency_measured());
    assert!((station.mains.frequency_hz().unwrap() - 50.0).abs() < 0.01);
}

#[test]
fn test_ubx_inside_nmea_stream() {
    let mut station = Station::new();
    let mut stream = nmea_sentence("GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,");
    let frame = ubx_frame(0x0A, 0x04, &common::mon_ver_payload("EXT CORE 1.00", "00190000"));
    stream.splice(10..10, frame);
    station.receive(&stream);
    station.poll();

    assert_eq!(station.reference.firmware_version(), "EXT CORE 1.00");
    // The frame's ASCII bytes spoil the surrounding sentence, not the frame
    assert_eq!(station.reference.ubx_stats().frames, 1);
}

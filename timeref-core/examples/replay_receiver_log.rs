//! Receiver Log Replay Example
//!
//! Replays a raw GNSS receiver capture through the acquisition layer as if
//! it arrived on the UART at 115200 baud, with a simulated 10 MHz reference
//! and PPS edge every second, and prints what the main loop sees.
//!
//! ## Running the Example
//!
//! ```bash
//! # Built-in session: boot chatter, identity answers, then a fix
//! cargo run --example replay_receiver_log
//!
//! # Your own capture (raw bytes as read from the receiver)
//! cargo run --example replay_receiver_log -- capture.bin
//! ```

use std::error::Error;

use timeref_core::counter::SimulatedCounter;
use timeref_core::irq::{Edge, GpioDispatch, GpioRouter};
use timeref_core::mains::ZeroCrossingMonitor;
use timeref_core::nmea;
use timeref_core::ubx::{calculate_checksum, UbxSink};
use timeref_core::{
    AcquisitionConfig, Exchange, FrequencyCounter, GnssFrontEnd, PpsCorrelator, TimeReference,
};

/// One byte at 115200 baud, 8N1
const BYTE_TIME_US: u64 = 87;
/// Main-loop period
const POLL_INTERVAL_US: u64 = 10_000;
/// Simulated oscillator: 3 cycles fast
const REFERENCE_COUNT: u32 = 10_000_003;

static EXCHANGE: Exchange = Exchange::new();

/// Prints every frame the main loop sends to the receiver
struct ConsoleUart;

impl UbxSink for ConsoleUart {
    fn send_frame(&mut self, frame: &[u8]) {
        println!("  -> UBX {:02X}-{:02X} ({} bytes)", frame[2], frame[3], frame.len());
    }
}

fn sentence(body: &str) -> Vec<u8> {
    format!("${}*{:02X}\r\n", body, nmea::checksum(body.as_bytes())).into_bytes()
}

fn frame(class: u8, id: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = vec![0xB5, 0x62, class, id];
    out.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    out.extend_from_slice(payload);
    let (ck_a, ck_b) = calculate_checksum(&out[2..]);
    out.extend_from_slice(&[ck_a, ck_b]);
    out
}

/// Five seconds of a receiver waking up and acquiring
fn builtin_session() -> Vec<u8> {
    let mut mon_ver = vec![0u8; 40];
    mon_ver[..22].copy_from_slice(b"ROM CORE 3.01 (107888)");
    mon_ver[30..38].copy_from_slice(b"00080000");

    let mut timels = vec![0u8; 24];
    timels[8] = 2; // GPS
    timels[9] = 18;
    timels[23] = 0x01;

    let mut log = Vec::new();
    log.extend(sentence("GPTXT,01,01,02,u-blox AG - www.u-blox.com"));
    log.extend(sentence("GPRMC,123515,V,,,,,,,230394,,,N"));
    log.extend(frame(0x0A, 0x04, &mon_ver));
    log.extend(frame(0x01, 0x26, &timels));
    for second in 16..20 {
        log.extend(sentence(&format!(
            "GPRMC,1235{},A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W",
            second
        )));
        log.extend(sentence(&format!(
            "GPGGA,1235{},4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,",
            second
        )));
        log.extend(sentence("GNGSA,A,3,01,02,03,04,05,06,07,08,,,,,1.2,0.9,0.8"));
    }
    log
}

fn main() -> Result<(), Box<dyn Error>> {
    let log = match std::env::args().nth(1) {
        Some(path) => std::fs::read(&path)?,
        None => builtin_session(),
    };
    println!("Replaying {} receiver bytes", log.len());

    let config = AcquisitionConfig::default();
    let mut front_end = GnssFrontEnd::new(&EXCHANGE.control, &EXCHANGE.flush, &EXCHANGE.gnss);
    let mut counter = FrequencyCounter::new(
        SimulatedCounter::new(),
        config,
        &EXCHANGE.frequency,
        &EXCHANGE.reset_statistics,
    );
    counter.start();
    let mut pps = PpsCorrelator::new(&EXCHANGE.pps);
    let mut mains = ZeroCrossingMonitor::new();
    let router = GpioRouter::new(&config);
    let mut reference = TimeReference::new(config, &EXCHANGE);
    let mut uart = ConsoleUart;

    let mut now = 0u64;
    let mut bytes = log.iter();
    let mut next_byte = 0u64;
    let mut next_pps = 1_000_000u64;
    let mut next_poll = 0u64;
    // Keep going a little after the last byte so timeouts show up
    let end = log.len() as u64 * BYTE_TIME_US + 4_000_000;

    while now <= end {
        if now >= next_byte {
            if let Some(&byte) = bytes.next() {
                front_end.on_rx_byte(byte, now);
            }
            next_byte += BYTE_TIME_US;
        }

        if now >= next_pps {
            counter.hardware_mut().complete_interval(REFERENCE_COUNT);
            let mut dispatch = GpioDispatch {
                pps: &mut pps,
                trigger: &mut counter,
                mains: &mut mains,
            };
            router.route(config.pps_pin, Edge::Rising, now, &mut dispatch);
            next_pps += 1_000_000;
        }

        if now >= next_poll {
            let report = reference.poll(now, &mut uart);
            if report.pps || report.any_expired() {
                let time = reference.utc_time();
                println!(
                    "[{:>7} ms] fix {:?}/{} sats valid={} | {:04}-{:02}-{:02} {:02}:{:02}:{:02} valid={} | \
                     pps #{} valid={} | offset {:+.1} ppb present={}",
                    now / 1000,
                    reference.fix_type(),
                    reference.satellites(),
                    reference.fix_valid(),
                    time.year,
                    time.month,
                    time.day,
                    time.hour,
                    time.minute,
                    time.second,
                    time.valid,
                    reference.pps_count(),
                    reference.pps_valid(),
                    reference.frequency_offset_ppb(),
                    reference.signal_present(),
                );
            }
            next_poll += POLL_INTERVAL_US;
        }

        now = next_byte.min(next_pps).min(next_poll);
    }

    println!();
    println!(
        "Receiver: fw '{}', hw '{}', leap seconds {} (valid: {})",
        reference.firmware_version(),
        reference.hardware_version(),
        reference.leap_seconds(),
        reference.leap_seconds_valid()
    );
    println!("NMEA: {:?}", reference.nmea_stats());
    println!("UBX:  {:?}", reference.ubx_stats());
    let stats = reference.frequency_statistics();
    println!(
        "Frequency: {} valid, {} invalid, mean error {:?} cycles",
        stats.valid_count(),
        stats.invalid_count(),
        stats.mean_error()
    );

    Ok(())
}

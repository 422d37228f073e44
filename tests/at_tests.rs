//! AT Link Tests
//!
//! Tests for the blocking send-and-wait exchange, the debug mirror and
//! the timeout accounting, all on a scripted transport with a fake
//! clock.

mod common;

use common::{FakeClock, ScriptedSerial};

use sim808_firmware::at::{AtLink, AtOptions};
use sim808_firmware::types::Error;

// ============================================================================
// Send and Wait Tests
// ============================================================================

#[test]
fn test_match_on_first_line() {
    let mut modem = ScriptedSerial::new();
    let mut debug = ScriptedSerial::new();
    let mut clock = FakeClock::new();
    modem.queue_response("OK\r\n");

    let mut link = AtLink::new(&mut modem, &mut debug, &mut clock);
    link.send_and_wait("AT\r\n", "OK", 2000).unwrap();

    assert_eq!(modem.sent_str(), "AT\r\n");
}

#[test]
fn test_match_skips_unrelated_lines() {
    let mut modem = ScriptedSerial::new();
    let mut debug = ScriptedSerial::new();
    let mut clock = FakeClock::new();
    modem.queue_response("+CPIN: READY\r\n");
    modem.queue_response("Call Ready\r\n");
    modem.queue_response("OK\r\n");

    let mut link = AtLink::new(&mut modem, &mut debug, &mut clock);
    link.send_and_wait("AT\r\n", "OK", 2000).unwrap();
}

#[test]
fn test_match_is_substring_containment() {
    let mut modem = ScriptedSerial::new();
    let mut debug = ScriptedSerial::new();
    let mut clock = FakeClock::new();
    // Registration status arrives embedded in a longer line.
    modem.queue_response("+CREG: 1,\"0001\",\"0002\"\r\n");

    let mut link = AtLink::new(&mut modem, &mut debug, &mut clock);
    link.send_and_wait("AT+CFUN=1,1\r\n", "+CREG: 1", 2000)
        .unwrap();
}

#[test]
fn test_timeout_when_no_response() {
    let mut modem = ScriptedSerial::new();
    let mut debug = ScriptedSerial::new();
    let mut clock = FakeClock::new();

    let mut link = AtLink::new(&mut modem, &mut debug, &mut clock);
    let result = link.send_and_wait("AT\r\n", "OK", 50);

    assert_eq!(result, Err(Error::Timeout));
    assert!(clock.elapsed_ms >= 50);
}

#[test]
fn test_timeout_when_only_wrong_lines_arrive() {
    let mut modem = ScriptedSerial::new();
    let mut debug = ScriptedSerial::new();
    let mut clock = FakeClock::new();
    modem.queue_response("ERROR\r\n");

    let mut link = AtLink::new(&mut modem, &mut debug, &mut clock);
    assert_eq!(link.send_and_wait("AT\r\n", "OK", 50), Err(Error::Timeout));
}

// ============================================================================
// Debug Mirror Tests
// ============================================================================

#[test]
fn test_matched_line_is_mirrored() {
    let mut modem = ScriptedSerial::new();
    let mut debug = ScriptedSerial::new();
    let mut clock = FakeClock::new();
    modem.queue_response("OK\r\n");

    let mut link = AtLink::new(&mut modem, &mut debug, &mut clock);
    link.send_and_wait("AT\r\n", "OK", 2000).unwrap();

    assert_eq!(debug.sent_str(), "OK\r");
}

#[test]
fn test_non_matching_lines_are_mirrored_too() {
    let mut modem = ScriptedSerial::new();
    let mut debug = ScriptedSerial::new();
    let mut clock = FakeClock::new();
    modem.queue_response("ERROR\r\n");
    modem.queue_response("OK\r\n");

    let mut link = AtLink::new(&mut modem, &mut debug, &mut clock);
    link.send_and_wait("AT\r\n", "OK", 2000).unwrap();

    assert!(debug.sent_str().contains("ERROR\r"));
    assert!(debug.sent_str().contains("OK\r"));
}

// ============================================================================
// Timing Option Tests
// ============================================================================

#[test]
fn test_settle_delay_applied_after_match() {
    let mut modem = ScriptedSerial::new();
    let mut debug = ScriptedSerial::new();
    let mut clock = FakeClock::new();
    modem.queue_response("OK\r\n");

    let mut link = AtLink::with_options(
        &mut modem,
        &mut debug,
        &mut clock,
        AtOptions {
            settle_ms: 700,
            poll_interval_ms: 1,
        },
    );
    link.send_and_wait("AT\r\n", "OK", 2000).unwrap();

    assert!(clock.elapsed_ms >= 700);
    assert!(clock.elapsed_ms < 2000);
}

#[test]
fn test_no_settle_delay_on_timeout() {
    let mut modem = ScriptedSerial::new();
    let mut debug = ScriptedSerial::new();
    let mut clock = FakeClock::new();

    let mut link = AtLink::with_options(
        &mut modem,
        &mut debug,
        &mut clock,
        AtOptions {
            settle_ms: 700,
            poll_interval_ms: 10,
        },
    );
    assert_eq!(link.send_and_wait("AT\r\n", "OK", 50), Err(Error::Timeout));
    assert!(clock.elapsed_ms < 700);
}

#[test]
fn test_zero_poll_interval_still_makes_progress() {
    let mut modem = ScriptedSerial::new();
    let mut debug = ScriptedSerial::new();
    let mut clock = FakeClock::new();

    let mut link = AtLink::with_options(
        &mut modem,
        &mut debug,
        &mut clock,
        AtOptions {
            settle_ms: 0,
            poll_interval_ms: 0,
        },
    );
    // Must terminate rather than loop forever on a zero interval.
    assert_eq!(link.send_and_wait("AT\r\n", "OK", 5), Err(Error::Timeout));
}

// ============================================================================
// Raw Send Tests
// ============================================================================

#[test]
fn test_raw_sends_and_wait_for() {
    let mut modem = ScriptedSerial::new();
    let mut debug = ScriptedSerial::new();
    let mut clock = FakeClock::new();
    modem.queue_response("OK\r\n");

    let mut link = AtLink::new(&mut modem, &mut debug, &mut clock);
    link.send_str("hello").unwrap();
    link.send_byte(0x1A).unwrap();
    link.wait_for("OK", 2000).unwrap();

    assert_eq!(modem.sent, b"hello\x1a");
}

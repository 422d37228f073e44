//! AT command request/response driver
//!
//! Implements the blocking send-then-wait exchange that every modem
//! operation is built from: transmit a command, poll assembled response
//! lines, mirror each one to the debug transport, and report success
//! once the expected substring shows up or failure once the timeout
//! budget runs out.

use crate::config::{DEFAULT_POLL_INTERVAL_MS, DEFAULT_SETTLE_MS, LINE_BUFFER_SIZE};
use crate::transport::{LineEvent, Serial};
use crate::types::Error;

/// Injectable time source for the wait loop
///
/// Production uses a busy-wait delay calibrated to the system clock;
/// tests substitute a simulated clock so timeouts run in zero real
/// time.
pub trait Clock {
    /// Block the calling context for `ms` milliseconds
    fn delay_ms(&mut self, ms: u32);
}

/// Tuning knobs of the wait loop
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AtOptions {
    /// Pause after a matched response, letting the peer finish any
    /// trailing output before the caller proceeds
    pub settle_ms: u32,
    /// Sleep per wait-loop iteration; also the granularity of the
    /// elapsed-time accounting
    pub poll_interval_ms: u32,
}

impl AtOptions {
    /// Reference timing: 1000 ms settle, 1 ms poll
    #[must_use]
    pub const fn new() -> Self {
        Self {
            settle_ms: DEFAULT_SETTLE_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl Default for AtOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Request/response link over a modem transport and a debug mirror
///
/// Holds the line assembly buffer and forwards every observed response
/// line to the debug transport, match or not, so the console sees all
/// modem chatter. Blocks the calling context for up to the timeout of
/// each exchange; interrupts keep filling the receive ring meanwhile,
/// so no data is lost while waiting, only processed late.
pub struct AtLink<'a, M: Serial, D: Serial, C: Clock> {
    modem: &'a mut M,
    debug: &'a mut D,
    clock: &'a mut C,
    options: AtOptions,
    line: [u8; LINE_BUFFER_SIZE],
}

impl<'a, M: Serial, D: Serial, C: Clock> AtLink<'a, M, D, C> {
    /// Create a link with the reference timing options
    pub fn new(modem: &'a mut M, debug: &'a mut D, clock: &'a mut C) -> Self {
        Self::with_options(modem, debug, clock, AtOptions::new())
    }

    /// Create a link with explicit timing options
    pub fn with_options(
        modem: &'a mut M,
        debug: &'a mut D,
        clock: &'a mut C,
        options: AtOptions,
    ) -> Self {
        Self {
            modem,
            debug,
            clock,
            options,
            line: [0; LINE_BUFFER_SIZE],
        }
    }

    /// Replace the timing options
    pub fn set_options(&mut self, options: AtOptions) {
        self.options = options;
    }

    /// The modem channel's end-of-line byte
    #[must_use]
    pub fn end_byte(&self) -> u8 {
        self.modem.end_byte()
    }

    /// Transmit raw bytes to the modem without waiting
    pub fn send_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.modem.transmit_bytes(bytes)
    }

    /// Transmit a raw string to the modem without waiting
    pub fn send_str(&mut self, s: &str) -> Result<(), Error> {
        self.modem.transmit_str(s)
    }

    /// Transmit a single raw byte to the modem without waiting
    pub fn send_byte(&mut self, byte: u8) -> Result<(), Error> {
        self.modem.transmit_byte(byte)
    }

    /// Block for `ms` milliseconds on the injected clock
    pub fn delay_ms(&mut self, ms: u32) {
        self.clock.delay_ms(ms);
    }

    /// Transmit `command` and wait for `expected` within `timeout_ms`
    ///
    /// Matching is substring containment against the accumulated line
    /// text, case-sensitive, first match wins; some expected tokens
    /// span response fragments, so no exact-line comparison is done.
    /// On match the settle delay is applied before returning. The
    /// command is never retried here; retry policy belongs to the
    /// caller.
    pub fn send_and_wait(
        &mut self,
        command: &str,
        expected: &str,
        timeout_ms: u32,
    ) -> Result<(), Error> {
        self.modem.transmit_str(command)?;
        self.wait_for(expected, timeout_ms)
    }

    /// Wait for `expected` on the modem channel within `timeout_ms`
    ///
    /// Used directly after raw sends, e.g. for the SMS body
    /// confirmation.
    pub fn wait_for(&mut self, expected: &str, timeout_ms: u32) -> Result<(), Error> {
        let step = self.options.poll_interval_ms.max(1);
        let mut elapsed: u32 = 0;

        while elapsed < timeout_ms {
            let mut completed = None;
            loop {
                match self.modem.poll_line(&mut self.line) {
                    LineEvent::Idle => break,
                    LineEvent::Accumulated => {}
                    LineEvent::Completed { len } => {
                        completed = Some(len);
                        break;
                    }
                }
            }

            if self.modem.line_ready() {
                let len = completed.unwrap_or(0);
                // Mirror the modem chatter; a full debug buffer must not
                // fail the exchange itself.
                let _ = self.debug.transmit_bytes(&self.line[..len]);
                if contains_token(&self.line[..len], expected.as_bytes()) {
                    self.clock.delay_ms(self.options.settle_ms);
                    return Ok(());
                }
                self.line.fill(0);
            }

            self.clock.delay_ms(step);
            elapsed += step;
        }

        Err(Error::Timeout)
    }
}

/// Substring containment over raw response bytes
///
/// Responses are plain ASCII but not guaranteed valid UTF-8, so the
/// search stays on bytes.
pub(crate) fn contains_token(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() {
        return true;
    }
    if needle.len() > haystack.len() {
        return false;
    }
    haystack.windows(needle.len()).any(|window| window == needle)
}

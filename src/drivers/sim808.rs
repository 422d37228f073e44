//! SIM808 GSM/GPRS modem session driver
//!
//! Sequences AT exchanges into named operations: module init, GPRS
//! bearer attach, HTTP GET, SMS send/list and voice calls. Every step
//! is one [`AtLink::send_and_wait`] with a fixed command, expected
//! token and timeout; this layer adds no parsing beyond the
//! unsolicited-notification classifier.

use core::fmt::Write as _;

use heapless::String;

use crate::at::{contains_token, AtLink, AtOptions, Clock};
use crate::config::{
    BEARER_TIMEOUT_MS, CALL_TIMEOUT_MS, COMMAND_TIMEOUT_MS, HTTP_TIMEOUT_MS, RESTART_TIMEOUT_MS,
    SMS_BODY_PAUSE_MS, SMS_LIST_TIMEOUT_MS, SMS_TERMINATOR, SMS_TIMEOUT_MS,
};
use crate::transport::Serial;
use crate::types::Error;

/// Marker prefix of a new-SMS notification line
const NEW_SMS_MARKER: &[u8] = b"+CMTI:";

/// Marker of an incoming-call notification line
const RING_MARKER: &[u8] = b"RING";

/// Success token of an HTTP GET action (status 200)
const HTTP_OK_TOKEN: &str = "+HTTPACTION: 0,200";

/// Network-operator access-point profile
///
/// Keys the static APN lookup table used when attaching the data
/// session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApnProfile {
    /// Telecom Egypt (WE)
    We,
    /// Orange Egypt
    Orange,
    /// Etisalat Egypt
    Etisalat,
    /// Vodafone Egypt
    Vodafone,
    /// Sentinel for an unconfigured profile; APN lookup fails
    Invalid,
}

impl ApnProfile {
    /// Access-point name for this operator, `None` for the sentinel
    #[must_use]
    pub const fn apn(self) -> Option<&'static str> {
        match self {
            Self::We => Some("internet.te.eg"),
            Self::Orange => Some("mobinilweb"),
            Self::Etisalat => Some("internet"),
            Self::Vodafone => Some("internet.vodafone.net"),
            Self::Invalid => None,
        }
    }
}

/// Unsolicited notification classes recognized on the modem channel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notification {
    /// A new SMS arrived (`+CMTI:` marker)
    NewSms,
    /// An incoming voice call is ringing (`RING` marker)
    IncomingCall,
}

/// Classify an assembled modem line as an unsolicited notification
///
/// Substring classification, not parsing; the new-SMS marker is checked
/// first. `None` is the valid steady state for ordinary traffic.
#[must_use]
pub fn detect_notification(line: &[u8]) -> Option<Notification> {
    if contains_token(line, NEW_SMS_MARKER) {
        Some(Notification::NewSms)
    } else if contains_token(line, RING_MARKER) {
        Some(Notification::IncomingCall)
    } else {
        None
    }
}

/// Step-failure policy for multi-step session operations
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct SessionPolicy {
    /// When set, a failed step does not abort the remaining script;
    /// the first error is still reported in the aggregate result.
    pub continue_on_step_failure: bool,
}

/// SIM808 session driver over an AT link
///
/// Holds the selected operator profile and the failure policy; both are
/// set at session start and read-only afterwards.
pub struct Sim808<'a, M: Serial, D: Serial, C: Clock> {
    link: AtLink<'a, M, D, C>,
    profile: ApnProfile,
    policy: SessionPolicy,
}

impl<'a, M: Serial, D: Serial, C: Clock> Sim808<'a, M, D, C> {
    /// Create a session driver mirroring modem traffic to `debug`
    pub fn new(
        modem: &'a mut M,
        debug: &'a mut D,
        clock: &'a mut C,
        profile: ApnProfile,
    ) -> Self {
        Self {
            link: AtLink::new(modem, debug, clock),
            profile,
            policy: SessionPolicy::default(),
        }
    }

    /// Set the step-failure policy
    pub fn set_policy(&mut self, policy: SessionPolicy) {
        self.policy = policy;
    }

    /// Set the AT wait-loop timing options
    pub fn set_at_options(&mut self, options: AtOptions) {
        self.link.set_options(options);
    }

    /// The selected operator profile
    #[must_use]
    pub const fn profile(&self) -> ApnProfile {
        self.profile
    }

    /// Restart the module and bring it to a known state
    ///
    /// Restarts with `AT+CFUN=1,1` and waits for network registration,
    /// then disables command echo, verifies responsiveness, switches
    /// SMS to text mode and enables new-message notifications.
    pub fn init(&mut self) -> Result<(), Error> {
        self.run_script(&[
            ("AT+CFUN=1,1\r\n", "+CREG: 1", RESTART_TIMEOUT_MS),
            ("ATE0\r\n", "OK", COMMAND_TIMEOUT_MS),
            ("AT\r\n", "OK", COMMAND_TIMEOUT_MS),
            ("AT+CMGF=1\r\n", "OK", COMMAND_TIMEOUT_MS),
            ("AT+CNMI=2,1,0,0,0\r\n", "OK", COMMAND_TIMEOUT_MS),
        ])
    }

    /// Configure and activate the GPRS bearer for the selected profile
    ///
    /// Fails with [`Error::InvalidProfile`] before touching the APN when
    /// the profile has no table entry; the bearer is then left
    /// unactivated.
    pub fn attach_data_session(&mut self) -> Result<(), Error> {
        let mut first_error = None;
        if let Err(err) = self.step(
            "AT+SAPBR=3,1,\"CONTYPE\",\"GPRS\"\r\n",
            "OK",
            BEARER_TIMEOUT_MS,
        ) {
            if !self.policy.continue_on_step_failure {
                return Err(err);
            }
            first_error = Some(err);
        }

        // A lookup failure is not a step failure; no policy applies.
        let apn = self.profile.apn().ok_or(Error::InvalidProfile)?;
        let mut command: String<96> = String::new();
        write!(command, "AT+SAPBR=3,1,\"APN\",\"{apn}\"\r\n").map_err(|_| Error::CommandTooLong)?;

        if let Err(err) = self.step(&command, "OK", BEARER_TIMEOUT_MS) {
            if !self.policy.continue_on_step_failure {
                return Err(err);
            }
            if first_error.is_none() {
                first_error = Some(err);
            }
        }

        let activate = self.step("AT+SAPBR=1,1\r\n", "OK", BEARER_TIMEOUT_MS);
        match first_error {
            Some(err) => Err(err),
            None => activate,
        }
    }

    /// Fetch `url` over the HTTP subsystem, then tear everything down
    ///
    /// Initializes HTTP, binds bearer profile 1, sets the target URL,
    /// issues the GET, waits for a 200 status, reads the body, and
    /// terminates both the HTTP service and the bearer.
    pub fn fetch_http(&mut self, url: &str) -> Result<(), Error> {
        let mut url_command: String<256> = String::new();
        write!(url_command, "AT+HTTPPARA=\"URL\",\"{url}\"\r\n").map_err(|_| Error::CommandTooLong)?;

        let mut first_error = None;
        let steps: [(&str, &str); 6] = [
            ("AT+HTTPINIT\r\n", "OK"),
            ("AT+HTTPPARA=\"CID\",1\r\n", "OK"),
            (&url_command, "OK"),
            ("AT+HTTPACTION=0\r\n", HTTP_OK_TOKEN),
            ("AT+HTTPREAD\r\n", "OK"),
            ("AT+HTTPTERM\r\n", "OK"),
        ];
        for (command, expected) in steps {
            match self.step(command, expected, HTTP_TIMEOUT_MS) {
                Ok(()) => {}
                Err(err) => {
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                    if !self.policy.continue_on_step_failure {
                        // Still release the bearer before reporting.
                        let _ = self.link.send_and_wait("AT+SAPBR=0,1\r\n", "OK", BEARER_TIMEOUT_MS);
                        return Err(err);
                    }
                }
            }
        }

        let teardown = self.step("AT+SAPBR=0,1\r\n", "OK", BEARER_TIMEOUT_MS);
        match first_error {
            Some(err) => Err(err),
            None => teardown,
        }
    }

    /// Send one text-mode SMS
    ///
    /// Enters recipient-addressed compose mode, transmits the body,
    /// pauses briefly, terminates with Ctrl+Z plus the channel's line
    /// terminator, and awaits the submission confirmation.
    pub fn send_sms(&mut self, number: &str, message: &str) -> Result<(), Error> {
        let mut command: String<64> = String::new();
        write!(command, "AT+CMGS=\"{number}\"\r\n").map_err(|_| Error::CommandTooLong)?;

        self.link.send_str(&command)?;
        self.link.send_str(message)?;
        self.link.delay_ms(SMS_BODY_PAUSE_MS);
        self.link.send_byte(SMS_TERMINATOR)?;
        let end = self.link.end_byte();
        self.link.send_byte(end)?;
        self.link.wait_for("OK", SMS_TIMEOUT_MS)
    }

    /// List unread SMS messages and await the listing marker
    pub fn receive_unread_sms(&mut self) -> Result<(), Error> {
        self.link
            .send_and_wait("AT+CMGL=\"REC UNREAD\"\r\n", "+CMGL: 1", SMS_LIST_TIMEOUT_MS)
    }

    /// Place a voice call to `number`
    pub fn place_call(&mut self, number: &str) -> Result<(), Error> {
        let mut command: String<64> = String::new();
        write!(command, "ATD{number};\r\n").map_err(|_| Error::CommandTooLong)?;
        self.link.send_and_wait(&command, "OK", CALL_TIMEOUT_MS)
    }

    /// One scripted exchange
    fn step(&mut self, command: &str, expected: &str, timeout_ms: u32) -> Result<(), Error> {
        self.link.send_and_wait(command, expected, timeout_ms)
    }

    /// Run a fixed command script under the session policy
    fn run_script(&mut self, steps: &[(&str, &str, u32)]) -> Result<(), Error> {
        let mut first_error = None;
        for &(command, expected, timeout_ms) in steps {
            match self.step(command, expected, timeout_ms) {
                Ok(()) => {}
                Err(err) => {
                    if !self.policy.continue_on_step_failure {
                        return Err(err);
                    }
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

//! SIM808 GSM gateway firmware entry point
//!
//! Brings up both USART channels, runs the scripted modem session
//! (init, GPRS attach, HTTP fetch, SMS, voice call), then settles into
//! the relay loop: modem lines are mirrored to the console and
//! classified for unsolicited notifications, console lines are
//! forwarded to the modem.

#![no_std]
#![no_main]
#![feature(abi_avr_interrupt)]

use panic_halt as _;

use avr_device::atmega128a::Peripherals;

use sim808_firmware::at::Clock;
use sim808_firmware::config::{LINE_BUFFER_SIZE, SYSTEM_CLOCK_HZ};
use sim808_firmware::drivers::sim808::{
    detect_notification, ApnProfile, Notification, SessionPolicy, Sim808,
};
use sim808_firmware::hal::usart::{
    channel_cell, dispatch_rx, dispatch_tx, AvrUsart0, AvrUsart1, ChannelCell, SharedChannel,
};
use sim808_firmware::transport::{Channel, LineEvent, Serial};
use sim808_firmware::types::{BaudRate, UsartConfig};

/// Demo recipient for the boot-time SMS and call
const DEMO_NUMBER: &str = "+201000000000";

/// Demo URL fetched once the bearer is up
const DEMO_URL: &str = "http://api.quotable.io/random?tags=wisdom";

static MODEM: ChannelCell<AvrUsart0> = channel_cell();
static CONSOLE: ChannelCell<AvrUsart1> = channel_cell();

#[avr_device::interrupt(atmega128a)]
fn USART0_RX() {
    dispatch_rx(&MODEM);
}

#[avr_device::interrupt(atmega128a)]
fn USART0_UDRE() {
    dispatch_tx(&MODEM);
}

#[avr_device::interrupt(atmega128a)]
fn USART1_RX() {
    dispatch_rx(&CONSOLE);
}

#[avr_device::interrupt(atmega128a)]
fn USART1_UDRE() {
    dispatch_tx(&CONSOLE);
}

/// Calibrated busy-wait time source
///
/// Inner loop tuned for roughly one millisecond per iteration block at
/// the configured system clock; close enough for AT timeouts, which are
/// specified in whole seconds.
struct BusyClock;

impl Clock for BusyClock {
    fn delay_ms(&mut self, ms: u32) {
        const CYCLES_PER_MS: u32 = SYSTEM_CLOCK_HZ / 1000 / 8;
        for _ in 0..ms {
            for _ in 0..CYCLES_PER_MS {
                avr_device::asm::nop();
            }
        }
    }
}

#[avr_device::entry]
fn main() -> ! {
    let dp = Peripherals::take().unwrap();

    let usart_config = UsartConfig::new(BaudRate::Bps115200);
    critical_section::with(|cs| {
        MODEM.borrow_ref_mut(cs).replace(Channel::new(
            AvrUsart0::new(dp.USART0),
            usart_config,
            SYSTEM_CLOCK_HZ,
        ));
        CONSOLE.borrow_ref_mut(cs).replace(Channel::new(
            AvrUsart1::new(dp.USART1),
            usart_config,
            SYSTEM_CLOCK_HZ,
        ));
    });

    #[allow(unsafe_code)]
    unsafe {
        avr_device::interrupt::enable();
    }

    let mut clock = BusyClock;
    let mut modem = SharedChannel::new(&MODEM).unwrap();
    let mut console = SharedChannel::new(&CONSOLE).unwrap();

    let _ = console.transmit_str("\r\nSIM808 GSM Gateway\r\nInitializing module...\r\n");

    let session_result = {
        let mut session = Sim808::new(&mut modem, &mut console, &mut clock, ApnProfile::Vodafone);
        session.set_policy(SessionPolicy {
            continue_on_step_failure: true,
        });
        let init = session.init();
        let attach = session.attach_data_session();
        let http = session.fetch_http(DEMO_URL);
        let sms = session.send_sms(DEMO_NUMBER, "Message from the SIM808 gateway");
        let call = session.place_call(DEMO_NUMBER);
        init.and(attach).and(http).and(sms).and(call)
    };

    let _ = console.transmit_str(match session_result {
        Ok(()) => "\r\nGateway ready\r\n",
        Err(_) => "\r\nGateway ready (some startup steps failed)\r\n",
    });

    let mut modem_line = [0u8; LINE_BUFFER_SIZE];
    let mut console_line = [0u8; LINE_BUFFER_SIZE];
    let mut modem_len = 0usize;
    let mut console_len = 0usize;

    loop {
        if let LineEvent::Completed { len } = modem.poll_line(&mut modem_line) {
            modem_len = len;
        }
        if let LineEvent::Completed { len } = console.poll_line(&mut console_line) {
            console_len = len;
        }

        if modem.line_ready() {
            let line = &modem_line[..modem_len];
            let _ = console.transmit_bytes(line);
            let _ = console.transmit_byte(console.end_byte());
            match detect_notification(line) {
                Some(Notification::NewSms) => {
                    let mut session =
                        Sim808::new(&mut modem, &mut console, &mut clock, ApnProfile::Vodafone);
                    let _ = session.receive_unread_sms();
                }
                Some(Notification::IncomingCall) => {
                    let _ = console.transmit_str("** incoming call **\r\n");
                }
                None => {}
            }
            modem_line.fill(0);
            modem_len = 0;
        }

        if console.line_ready() {
            // Console lines keep their carriage return, so the command
            // arrives at the modem properly terminated.
            let _ = modem.transmit_bytes(&console_line[..console_len]);
            console_line.fill(0);
            console_len = 0;
        }
    }
}

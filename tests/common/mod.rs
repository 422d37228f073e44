//! Shared test doubles for the transport and protocol layers
#![allow(dead_code)]

use std::collections::VecDeque;

use sim808_firmware::at::Clock;
use sim808_firmware::transport::{LineAssembler, LineEvent, Serial, UsartHw};
use sim808_firmware::types::{Error, UsartConfig};

/// Serial endpoint driven by pre-queued response bytes
///
/// Everything transmitted is recorded; everything queued with
/// [`ScriptedSerial::queue_response`] becomes available to the receive
/// side immediately.
pub struct ScriptedSerial {
    pub sent: Vec<u8>,
    rx: VecDeque<u8>,
    assembler: LineAssembler,
}

impl ScriptedSerial {
    pub fn new() -> Self {
        Self {
            sent: Vec::new(),
            rx: VecDeque::new(),
            assembler: LineAssembler::new(b'\n'),
        }
    }

    pub fn queue_response(&mut self, response: &str) {
        self.rx.extend(response.bytes());
    }

    pub fn sent_str(&self) -> String {
        String::from_utf8_lossy(&self.sent).into_owned()
    }
}

impl Serial for ScriptedSerial {
    fn transmit_byte(&mut self, byte: u8) -> Result<(), Error> {
        self.sent.push(byte);
        Ok(())
    }

    fn receive_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }

    fn poll_line(&mut self, buf: &mut [u8]) -> LineEvent {
        match self.rx.pop_front() {
            Some(byte) => self.assembler.feed(byte, buf),
            None => LineEvent::Idle,
        }
    }

    fn line_ready(&mut self) -> bool {
        self.assembler.take_ready()
    }

    fn end_byte(&self) -> u8 {
        b'\n'
    }
}

/// Clock that only counts; no real time passes
pub struct FakeClock {
    pub elapsed_ms: u64,
}

impl FakeClock {
    pub fn new() -> Self {
        Self { elapsed_ms: 0 }
    }
}

impl Clock for FakeClock {
    fn delay_ms(&mut self, ms: u32) {
        self.elapsed_ms += u64::from(ms);
    }
}

/// USART register double: writes are logged, reads come from a queue
pub struct MockUsart {
    pub programmed_ubrr: Option<u16>,
    pub tx_log: Vec<u8>,
    pub rx_fifo: VecDeque<u8>,
    pub tx_irq_enabled: bool,
    pub error_flagged: bool,
}

impl MockUsart {
    pub fn new() -> Self {
        Self {
            programmed_ubrr: None,
            tx_log: Vec::new(),
            rx_fifo: VecDeque::new(),
            tx_irq_enabled: false,
            error_flagged: false,
        }
    }
}

impl UsartHw for MockUsart {
    fn configure(&mut self, _config: &UsartConfig, ubrr: u16) {
        self.programmed_ubrr = Some(ubrr);
    }

    fn data_register_empty(&self) -> bool {
        true
    }

    fn write_data(&mut self, byte: u8) {
        self.tx_log.push(byte);
    }

    fn receive_complete(&self) -> bool {
        !self.rx_fifo.is_empty()
    }

    fn read_data(&mut self) -> u8 {
        self.rx_fifo.pop_front().unwrap_or(0)
    }

    fn set_tx_ready_interrupt(&mut self, enable: bool) {
        self.tx_irq_enabled = enable;
    }

    fn rx_error(&self) -> bool {
        self.error_flagged
    }
}

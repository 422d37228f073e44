//! USART channel transport driver
//!
//! Owns the per-channel ring buffers and line assembly state, programs
//! the hardware for a [`UsartConfig`], and routes bytes between the
//! interrupt dispatch entry points and the application-side API.

use crate::transport::line::{LineAssembler, LineEvent};
use crate::transport::ring::RingBuffer;
use crate::transport::Serial;
use crate::types::{Error, InterruptMode, UsartConfig};
use crate::config::{RX_BUFFER_SIZE, TX_BUFFER_SIZE};

/// Register-level view of one USART peripheral
///
/// The hardware collaborator seam: the ATmega implementation lives in
/// `hal::usart`, host tests substitute a loopback.
pub trait UsartHw {
    /// Program baud, frame format and interrupt sources
    fn configure(&mut self, config: &UsartConfig, ubrr: u16);

    /// Transmit data register is ready for a new byte (UDRE)
    fn data_register_empty(&self) -> bool;

    /// Write one byte to the transmit data register
    fn write_data(&mut self, byte: u8);

    /// Unread data is present in the receive register (RXC)
    fn receive_complete(&self) -> bool;

    /// Read one byte from the receive data register
    fn read_data(&mut self) -> u8;

    /// Enable or disable the data-register-empty interrupt source
    fn set_tx_ready_interrupt(&mut self, enable: bool);

    /// A framing, overrun or parity error is flagged for the pending byte
    fn rx_error(&self) -> bool;
}

/// One USART channel: hardware handle, ring buffers, line assembler
///
/// Statically allocated, lives for the whole process. The interrupt
/// dispatch methods ([`Channel::on_rx_complete`], [`Channel::on_tx_ready`])
/// are the only code meant to run in interrupt context; they are
/// allocation-free and never block.
pub struct Channel<H: UsartHw> {
    hw: H,
    config: UsartConfig,
    rx: RingBuffer<RX_BUFFER_SIZE>,
    tx: RingBuffer<TX_BUFFER_SIZE>,
    assembler: LineAssembler,
}

impl<H: UsartHw> Channel<H> {
    /// Initialize the hardware for `config` and wrap it in a channel
    pub fn new(mut hw: H, config: UsartConfig, clock_hz: u32) -> Self {
        let ubrr = config.ubrr(clock_hz);
        hw.configure(&config, ubrr);
        Self {
            hw,
            config,
            rx: RingBuffer::new(),
            tx: RingBuffer::new(),
            assembler: LineAssembler::new(config.end_of_line),
        }
    }

    /// The channel's immutable configuration
    #[must_use]
    pub const fn config(&self) -> &UsartConfig {
        &self.config
    }

    /// Direct access to the hardware handle, for platform integration
    pub fn hw_mut(&mut self) -> &mut H {
        &mut self.hw
    }

    /// Receive-complete interrupt dispatch
    ///
    /// Reads the data register (which also acknowledges any framing,
    /// overrun or parity flag) and pushes the byte into the receive
    /// ring. A full ring drops the byte; the error flags are not
    /// surfaced further.
    pub fn on_rx_complete(&mut self) {
        let byte = self.hw.read_data();
        let _ = self.rx.push(byte);
        if self.hw.rx_error() {
            let _ = self.hw.read_data();
        }
    }

    /// Data-register-empty interrupt dispatch
    ///
    /// Moves one byte from the transmit ring into the hardware and
    /// disables the interrupt source once the ring is drained; the next
    /// enqueue re-enables it.
    pub fn on_tx_ready(&mut self) {
        if let Some(byte) = self.tx.pop() {
            self.hw.write_data(byte);
        }
        if self.tx.is_empty() {
            self.hw.set_tx_ready_interrupt(false);
        }
    }

    /// Discard any received data pending in hardware and in the ring
    pub fn flush(&mut self) {
        while self.hw.receive_complete() {
            let _ = self.hw.read_data();
        }
        self.rx.clear();
        self.assembler.reset();
    }
}

impl<H: UsartHw> Serial for Channel<H> {
    fn transmit_byte(&mut self, byte: u8) -> Result<(), Error> {
        match self.config.interrupt_mode {
            InterruptMode::Enabled => {
                self.tx.push(byte)?;
                self.hw.set_tx_ready_interrupt(true);
                Ok(())
            }
            InterruptMode::Disabled => {
                while !self.hw.data_register_empty() {
                    core::hint::spin_loop();
                }
                self.hw.write_data(byte);
                Ok(())
            }
        }
    }

    fn receive_byte(&mut self) -> Option<u8> {
        match self.config.interrupt_mode {
            InterruptMode::Enabled => self.rx.pop(),
            InterruptMode::Disabled => {
                while !self.hw.receive_complete() {
                    core::hint::spin_loop();
                }
                Some(self.hw.read_data())
            }
        }
    }

    fn poll_line(&mut self, buf: &mut [u8]) -> LineEvent {
        let pending = match self.config.interrupt_mode {
            InterruptMode::Enabled => self.rx.pop(),
            // Unlike receive_byte, never wait here; an empty data
            // register simply means no progress this poll.
            InterruptMode::Disabled => self
                .hw
                .receive_complete()
                .then(|| self.hw.read_data()),
        };
        match pending {
            Some(byte) => self.assembler.feed(byte, buf),
            None => LineEvent::Idle,
        }
    }

    fn line_ready(&mut self) -> bool {
        self.assembler.take_ready()
    }

    fn end_byte(&self) -> u8 {
        self.config.end_of_line
    }
}

#[cfg(feature = "embedded")]
impl<H: UsartHw> embedded_io::ErrorType for Channel<H> {
    type Error = Error;
}

#[cfg(feature = "embedded")]
impl<H: UsartHw> embedded_io::Write for Channel<H> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        for (queued, &byte) in buf.iter().enumerate() {
            if self.transmit_byte(byte).is_err() {
                if queued == 0 {
                    return Err(Error::BufferFull);
                }
                return Ok(queued);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Error> {
        // Queued bytes drain from interrupt context on their own.
        Ok(())
    }
}

#[cfg(feature = "embedded")]
impl<H: UsartHw> embedded_io::Read for Channel<H> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        let first = loop {
            if let Some(byte) = self.receive_byte() {
                break byte;
            }
            core::hint::spin_loop();
        };
        buf[0] = first;
        let mut count = 1;
        while count < buf.len() {
            match self.receive_byte() {
                Some(byte) => {
                    buf[count] = byte;
                    count += 1;
                }
                None => break,
            }
        }
        Ok(count)
    }
}

//! USART transport layer
//!
//! Ring-buffered, interrupt-driven byte transport plus the line-oriented
//! receive protocol built on it. [`Serial`] is the seam the protocol
//! drivers program against, so a scripted or loopback transport can
//! stand in for real hardware.

pub mod channel;
pub mod line;
pub mod ring;

pub use channel::{Channel, UsartHw};
pub use line::{LineAssembler, LineEvent};
pub use ring::RingBuffer;

use crate::types::Error;

/// Byte- and line-level surface of one USART channel
///
/// Implemented by [`Channel`] over real or mocked hardware; the AT
/// driver and the application loop only ever see this trait.
pub trait Serial {
    /// Queue one byte for transmission
    ///
    /// In interrupt mode the byte is dropped with [`Error::BufferFull`]
    /// when the transmit ring is full; there is no blocking and no
    /// back-pressure beyond the error.
    fn transmit_byte(&mut self, byte: u8) -> Result<(), Error>;

    /// Take one received byte, if any
    fn receive_byte(&mut self) -> Option<u8>;

    /// Pull at most one received byte through the line assembler
    ///
    /// Non-blocking; returns [`LineEvent::Idle`] when nothing was
    /// pending. `buf` is the caller-owned accumulation buffer.
    fn poll_line(&mut self, buf: &mut [u8]) -> LineEvent;

    /// Return and clear the latched line-ready flag (one-shot)
    fn line_ready(&mut self) -> bool;

    /// The configured end-of-line byte
    fn end_byte(&self) -> u8;

    /// Transmit a byte slice, byte by byte
    ///
    /// Not atomic: if the transmit ring fills partway through, the
    /// bytes already queued stay queued and the first failure is
    /// returned.
    fn transmit_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
        for &byte in bytes {
            self.transmit_byte(byte)?;
        }
        Ok(())
    }

    /// Transmit a string slice, byte by byte
    fn transmit_str(&mut self, s: &str) -> Result<(), Error> {
        self.transmit_bytes(s.as_bytes())
    }
}

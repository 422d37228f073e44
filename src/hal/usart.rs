//! ATmega128A USART register access
//!
//! Implements [`UsartHw`] for both USART peripherals and provides the
//! interrupt-shared channel cell that lets the receive-complete and
//! data-register-empty vectors dispatch into a [`Channel`] owned by the
//! main line.

#![allow(unsafe_code)]

use core::cell::RefCell;

use avr_device::atmega128a::{USART0, USART1};
use critical_section::Mutex;

use crate::transport::{Channel, LineEvent, Serial, UsartHw};
use crate::types::{Error, UsartConfig};

macro_rules! avr_usart {
    (
        $(#[$meta:meta])*
        $name:ident, $periph:ty,
        $udr:ident, $ucsra:ident, $ucsrb:ident, $ucsrc:ident, $ubrrh:ident, $ubrrl:ident,
        ($rxc:ident, $udre:ident, $fe:ident, $dor:ident, $upe:ident),
        $udrie:ident
    ) => {
        $(#[$meta])*
        pub struct $name {
            regs: $periph,
        }

        impl $name {
            /// Take ownership of the peripheral
            #[must_use]
            pub fn new(regs: $periph) -> Self {
                Self { regs }
            }
        }

        impl UsartHw for $name {
            fn configure(&mut self, config: &UsartConfig, ubrr: u16) {
                // Baud register high byte first, per the datasheet's
                // access ordering for the shared UBRRH location.
                self.regs
                    .$ubrrh
                    .write(|w| unsafe { w.bits((ubrr >> 8) as u8) });
                self.regs.$ubrrl.write(|w| unsafe { w.bits(ubrr as u8) });

                // Whole-register images come from the configuration
                // descriptor; both USARTs share the same bit layout.
                self.regs
                    .$ucsra
                    .write(|w| unsafe { w.bits(config.control_a_bits()) });
                self.regs
                    .$ucsrb
                    .write(|w| unsafe { w.bits(config.control_b_bits()) });
                self.regs
                    .$ucsrc
                    .write(|w| unsafe { w.bits(config.control_c_bits()) });
            }

            fn data_register_empty(&self) -> bool {
                self.regs.$ucsra.read().$udre().bit_is_set()
            }

            fn write_data(&mut self, byte: u8) {
                self.regs.$udr.write(|w| unsafe { w.bits(byte) });
            }

            fn receive_complete(&self) -> bool {
                self.regs.$ucsra.read().$rxc().bit_is_set()
            }

            fn read_data(&mut self) -> u8 {
                self.regs.$udr.read().bits()
            }

            fn set_tx_ready_interrupt(&mut self, enable: bool) {
                self.regs.$ucsrb.modify(|_, w| w.$udrie().bit(enable));
            }

            fn rx_error(&self) -> bool {
                let status = self.regs.$ucsra.read();
                status.$fe().bit_is_set()
                    || status.$dor().bit_is_set()
                    || status.$upe().bit_is_set()
            }
        }
    };
}

avr_usart!(
    /// USART0, wired to the SIM808 modem
    AvrUsart0, USART0,
    udr0, ucsr0a, ucsr0b, ucsr0c, ubrr0h, ubrr0l,
    (rxc0, udre0, fe0, dor0, upe0),
    udrie0
);

avr_usart!(
    /// USART1, wired to the debug console adapter
    AvrUsart1, USART1,
    udr1, ucsr1a, ucsr1b, ucsr1c, ubrr1h, ubrr1l,
    (rxc1, udre1, fe1, dor1, upe1),
    udrie1
);

/// A channel parked where both the interrupt vectors and the main line
/// can reach it
pub type ChannelCell<H> = Mutex<RefCell<Option<Channel<H>>>>;

/// Create an empty channel cell, for static initialization
#[must_use]
pub const fn channel_cell<H: UsartHw>() -> ChannelCell<H> {
    Mutex::new(RefCell::new(None))
}

/// Receive-complete vector body: dispatch into the shared channel
pub fn dispatch_rx<H: UsartHw>(cell: &ChannelCell<H>) {
    critical_section::with(|cs| {
        if let Some(channel) = cell.borrow_ref_mut(cs).as_mut() {
            channel.on_rx_complete();
        }
    });
}

/// Data-register-empty vector body: dispatch into the shared channel
pub fn dispatch_tx<H: UsartHw>(cell: &ChannelCell<H>) {
    critical_section::with(|cs| {
        if let Some(channel) = cell.borrow_ref_mut(cs).as_mut() {
            channel.on_tx_ready();
        }
    });
}

/// Main-line handle to a channel living in a [`ChannelCell`]
///
/// Every call takes a short critical section around a single ring
/// operation; nothing here waits for data while holding the section, so
/// the interrupt vectors are never starved.
pub struct SharedChannel<'a, H: UsartHw> {
    cell: &'a ChannelCell<H>,
    end_of_line: u8,
}

impl<'a, H: UsartHw> SharedChannel<'a, H> {
    /// Bind to an initialized channel cell
    ///
    /// Fails with [`Error::Unavailable`] when the cell has not been
    /// populated yet.
    pub fn new(cell: &'a ChannelCell<H>) -> Result<Self, Error> {
        let end_of_line = critical_section::with(|cs| {
            cell.borrow_ref(cs)
                .as_ref()
                .map(|channel| channel.config().end_of_line)
        })
        .ok_or(Error::Unavailable)?;
        Ok(Self { cell, end_of_line })
    }

    fn with_channel<R>(&mut self, f: impl FnOnce(&mut Channel<H>) -> R) -> Result<R, Error> {
        critical_section::with(|cs| self.cell.borrow_ref_mut(cs).as_mut().map(f))
            .ok_or(Error::Unavailable)
    }
}

impl<H: UsartHw> Serial for SharedChannel<'_, H> {
    fn transmit_byte(&mut self, byte: u8) -> Result<(), Error> {
        self.with_channel(|channel| channel.transmit_byte(byte))?
    }

    fn receive_byte(&mut self) -> Option<u8> {
        self.with_channel(Channel::receive_byte).unwrap_or(None)
    }

    fn poll_line(&mut self, buf: &mut [u8]) -> LineEvent {
        self.with_channel(|channel| channel.poll_line(buf))
            .unwrap_or(LineEvent::Idle)
    }

    fn line_ready(&mut self) -> bool {
        self.with_channel(Channel::line_ready).unwrap_or(false)
    }

    fn end_byte(&self) -> u8 {
        self.end_of_line
    }
}

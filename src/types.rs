//! Shared types used across the gateway firmware
//!
//! This module defines domain-specific types that enforce invariants
//! at compile time: the USART channel descriptor and its field enums,
//! plus the crate-wide error type.

use core::fmt;

/// Standard baud rates supported by the ATmega128A USART
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BaudRate {
    /// 2400 bits per second
    Bps2400,
    /// 4800 bits per second
    Bps4800,
    /// 9600 bits per second
    Bps9600,
    /// 14400 bits per second
    Bps14400,
    /// 19200 bits per second
    Bps19200,
    /// 38400 bits per second
    Bps38400,
    /// 57600 bits per second
    Bps57600,
    /// 115200 bits per second
    Bps115200,
    /// 128000 bits per second
    Bps128000,
    /// 256000 bits per second
    Bps256000,
}

impl BaudRate {
    /// Get the rate in bits per second
    #[must_use]
    pub const fn as_bps(self) -> u32 {
        match self {
            Self::Bps2400 => 2_400,
            Self::Bps4800 => 4_800,
            Self::Bps9600 => 9_600,
            Self::Bps14400 => 14_400,
            Self::Bps19200 => 19_200,
            Self::Bps38400 => 38_400,
            Self::Bps57600 => 57_600,
            Self::Bps115200 => 115_200,
            Self::Bps128000 => 128_000,
            Self::Bps256000 => 256_000,
        }
    }
}

/// Character size of a USART frame
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DataSize {
    /// 5 data bits
    Bits5,
    /// 6 data bits
    Bits6,
    /// 7 data bits
    Bits7,
    /// 8 data bits
    #[default]
    Bits8,
    /// 9 data bits
    Bits9,
}

/// Parity generation and checking
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Parity {
    /// No parity bit
    #[default]
    Disabled,
    /// Even parity
    Even,
    /// Odd parity
    Odd,
}

/// Number of stop bits appended to each frame
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StopBits {
    /// One stop bit
    #[default]
    One,
    /// Two stop bits
    Two,
}

/// USART clocking mode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OperationMode {
    /// Internally clocked, no XCK pin
    #[default]
    Asynchronous,
    /// Externally clocked via XCK
    Synchronous,
}

/// XCK edge assignment in synchronous mode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ClockPolarity {
    /// Transmit on rising edge, sample on falling edge
    #[default]
    RisingTxFallingRx,
    /// Sample on rising edge, transmit on falling edge
    RisingRxFallingTx,
}

/// Double transmission speed (U2X)
///
/// Halves the baud divisor in asynchronous mode, trading sampling
/// margin for a finer baud match at high rates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DoubleSpeed {
    /// Normal speed, divisor 16
    #[default]
    Disabled,
    /// Double speed, divisor 8
    Enabled,
}

/// Whether the channel runs on interrupts and ring buffers or busy-waits
/// directly on the hardware flags
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum InterruptMode {
    /// Busy-wait on hardware flags, no buffering
    Disabled,
    /// Interrupt-driven, ring-buffered
    #[default]
    Enabled,
}

/// Immutable descriptor for one USART channel
///
/// Set once at initialization and read-only afterwards; the drivers
/// never mutate it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UsartConfig {
    /// Baud rate
    pub baud: BaudRate,
    /// Frame data size
    pub data_size: DataSize,
    /// Clocking mode
    pub operation_mode: OperationMode,
    /// XCK edge selection (synchronous mode only)
    pub clock_polarity: ClockPolarity,
    /// Interrupt-driven vs polled operation
    pub interrupt_mode: InterruptMode,
    /// Stop bit count
    pub stop_bits: StopBits,
    /// Parity mode
    pub parity: Parity,
    /// Double transmission speed
    pub double_speed: DoubleSpeed,
    /// Byte that terminates an assembled line on receive
    pub end_of_line: u8,
}

impl UsartConfig {
    /// Create a descriptor with the gateway defaults: 8N1, asynchronous,
    /// double speed, interrupt-driven, lines terminated by `\n`.
    #[must_use]
    pub const fn new(baud: BaudRate) -> Self {
        Self {
            baud,
            data_size: DataSize::Bits8,
            operation_mode: OperationMode::Asynchronous,
            clock_polarity: ClockPolarity::RisingTxFallingRx,
            interrupt_mode: InterruptMode::Enabled,
            stop_bits: StopBits::One,
            parity: Parity::Disabled,
            double_speed: DoubleSpeed::Enabled,
            end_of_line: b'\n',
        }
    }

    /// Baud divisor: 8 in double-speed asynchronous operation, 16 otherwise
    #[must_use]
    pub const fn divisor(&self) -> u32 {
        match (self.double_speed, self.operation_mode) {
            (DoubleSpeed::Enabled, OperationMode::Asynchronous) => 8,
            _ => 16,
        }
    }

    /// Baud rate register value: round(clock / divisor / baud) - 1
    ///
    /// Computed with integer rounding so the result matches the
    /// datasheet tables exactly. Clamped at zero when the clock is too
    /// slow for the requested rate.
    #[must_use]
    pub const fn ubrr(&self, clock_hz: u32) -> u16 {
        let step = self.divisor() * self.baud.as_bps();
        let rounded = (clock_hz + step / 2) / step;
        rounded.saturating_sub(1) as u16
    }

    /// UCSRnA register image at initialization
    ///
    /// Only the double-speed bit is configuration-driven; the rest of
    /// the register holds read-only status flags and the
    /// multi-processor bit, which stays off.
    #[must_use]
    pub const fn control_a_bits(&self) -> u8 {
        match self.double_speed {
            DoubleSpeed::Enabled => 1 << 1,
            DoubleSpeed::Disabled => 0,
        }
    }

    /// UCSRnB register image at initialization
    ///
    /// Receiver and transmitter are always enabled. Interrupt-driven
    /// channels enable the receive-complete source here; the
    /// data-register-empty source is toggled at enqueue and drain time
    /// instead, and the transmit-complete source stays off because no
    /// vector consumes it.
    #[must_use]
    pub const fn control_b_bits(&self) -> u8 {
        let mut bits = (1 << 4) | (1 << 3);
        if matches!(self.interrupt_mode, InterruptMode::Enabled) {
            bits |= 1 << 7;
        }
        if matches!(self.data_size, DataSize::Bits9) {
            bits |= 1 << 2;
        }
        bits
    }

    /// UCSRnC register image: frame format
    #[must_use]
    pub const fn control_c_bits(&self) -> u8 {
        let mut bits = match self.parity {
            Parity::Disabled => 0,
            Parity::Even => 0b10 << 4,
            Parity::Odd => 0b11 << 4,
        };
        if matches!(self.operation_mode, OperationMode::Synchronous) {
            bits |= 1 << 6;
        }
        if matches!(self.stop_bits, StopBits::Two) {
            bits |= 1 << 3;
        }
        bits |= (match self.data_size {
            DataSize::Bits5 => 0b00,
            DataSize::Bits6 => 0b01,
            DataSize::Bits7 => 0b10,
            DataSize::Bits8 | DataSize::Bits9 => 0b11,
        }) << 1;
        if matches!(self.clock_polarity, ClockPolarity::RisingRxFallingTx) {
            bits |= 1;
        }
        bits
    }
}

impl Default for UsartConfig {
    fn default() -> Self {
        Self::new(BaudRate::Bps115200)
    }
}

/// Errors surfaced by the transport and protocol drivers
///
/// Nothing here is fatal: the worst case is a stalled session state,
/// recoverable by re-initialization. Failures are never retried inside
/// the core; retry is the caller's decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// The shared channel has not been initialized yet
    Unavailable,
    /// A ring buffer producer could not enqueue; the byte was dropped
    BufferFull,
    /// The expected response substring was not observed within the budget
    Timeout,
    /// No access-point name exists for the selected operator profile
    InvalidProfile,
    /// A formatted command exceeded its fixed-size buffer
    CommandTooLong,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "transport unavailable"),
            Self::BufferFull => write!(f, "transmit buffer full"),
            Self::Timeout => write!(f, "response timeout"),
            Self::InvalidProfile => write!(f, "no APN for operator profile"),
            Self::CommandTooLong => write!(f, "command too long"),
        }
    }
}

#[cfg(feature = "embedded")]
impl embedded_io::Error for Error {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            Self::Timeout => embedded_io::ErrorKind::TimedOut,
            _ => embedded_io::ErrorKind::Other,
        }
    }
}

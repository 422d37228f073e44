//! Hardware Abstraction Layer
//!
//! Register-level access to the ATmega128A peripherals. All unsafe
//! register plumbing is isolated here.

pub mod usart;

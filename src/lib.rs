//! SIM808 GSM Gateway Firmware Library
//!
//! This library provides the core functionality for an ATmega128A-based
//! GSM/GPRS gateway built around the SIMCom SIM808 module. The modem is
//! driven over USART0 with scripted AT exchanges while USART1 mirrors
//! all modem traffic to a serial console.
//!
//! # Architecture
//!
//! The firmware is organized in layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    APPLICATION LAYER                         │
//! │  Gateway loop  │  Console relay  │  Notification handling    │
//! ├─────────────────────────────────────────────────────────────┤
//! │                    PROTOCOL LAYER                            │
//! │  SIM808 session driver  │  AT request/response link          │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   TRANSPORT LAYER                            │
//! │  USART channels  │  Line assembler  │  SPSC ring buffers     │
//! ├─────────────────────────────────────────────────────────────┤
//! │                      HAL LAYER                               │
//! │  ATmega128A USART registers  │  Interrupt dispatch           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Principles
//!
//! - **Host-testable core**: everything above the HAL builds and tests
//!   on the host with no features enabled
//! - **Type-driven design**: USART configuration enums make invalid
//!   register encodings unrepresentable
//! - **No unsafe outside the HAL**: register access is the only unsafe
//!   code in the tree
//! - **Explicit error handling**: all fallible operations return `Result`

#![cfg_attr(feature = "embedded", no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export dependencies needed by applications (only in embedded mode)
#[cfg(feature = "embedded")]
pub use avr_device;
#[cfg(feature = "embedded")]
pub use critical_section;

pub mod at;
pub mod config;
pub mod drivers;
pub mod transport;
pub mod types;

#[cfg(feature = "embedded")]
pub mod hal;

pub use types::Error;

//! Peripheral Drivers
//!
//! High-level drivers for external modules attached to the MCU.

pub mod sim808;

//! System configuration and hardware constants
//!
//! Compile-time constants for the GSM gateway hardware. Clock rates,
//! buffer sizes, protocol timing budgets and pin mappings are
//! centralized here.

/// System clock frequency (ATmega128A @ 16 MHz external crystal)
pub const SYSTEM_CLOCK_HZ: u32 = 16_000_000;

/// Receive ring buffer capacity per channel (one slot reserved)
pub const RX_BUFFER_SIZE: usize = 512;

/// Transmit ring buffer capacity per channel (one slot reserved)
pub const TX_BUFFER_SIZE: usize = 512;

/// Line assembly buffer size for modem responses
pub const LINE_BUFFER_SIZE: usize = 512;

/// Settle delay after a matched response, before the caller proceeds
pub const DEFAULT_SETTLE_MS: u32 = 1_000;

/// Poll interval of the response wait loop
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 1;

/// Pause between an SMS body and its terminator byte
pub const SMS_BODY_PAUSE_MS: u32 = 100;

/// Ctrl+Z, terminates an SMS body in text mode
pub const SMS_TERMINATOR: u8 = 0x1A;

/// Module restart budget: network registration can take tens of seconds
pub const RESTART_TIMEOUT_MS: u32 = 30_000;

/// Budget for plain command/OK exchanges
pub const COMMAND_TIMEOUT_MS: u32 = 2_000;

/// Budget for bearer configuration and activation steps
pub const BEARER_TIMEOUT_MS: u32 = 5_000;

/// Budget for each HTTP subsystem step
pub const HTTP_TIMEOUT_MS: u32 = 5_000;

/// Budget for SMS submission confirmation
pub const SMS_TIMEOUT_MS: u32 = 5_000;

/// Budget for the unread-SMS listing marker
pub const SMS_LIST_TIMEOUT_MS: u32 = 3_000;

/// Budget for voice call confirmation
pub const CALL_TIMEOUT_MS: u32 = 5_000;

/// Pin assignments for the gateway board
pub mod pins {
    //! GPIO pin assignments matching the schematic

    /// USART0 receive, wired to the SIM808 TXD
    pub const MODEM_RXD: &str = "PE0";

    /// USART0 transmit, wired to the SIM808 RXD
    pub const MODEM_TXD: &str = "PE1";

    /// USART1 receive, wired to the debug console adapter
    pub const DEBUG_RXD: &str = "PD2";

    /// USART1 transmit, wired to the debug console adapter
    pub const DEBUG_TXD: &str = "PD3";

    /// TWI clock (status LCD)
    pub const I2C_SCL: &str = "PD0";

    /// TWI data (status LCD)
    pub const I2C_SDA: &str = "PD1";
}

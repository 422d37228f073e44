//! Line assembly state machine
//!
//! Turns the raw receive byte stream into discrete lines delimited by
//! the channel's configured end byte. The accumulation buffer is
//! supplied by the caller and is not cleared here; clearing between
//! lines is the caller's responsibility.

/// Outcome of feeding the assembler
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineEvent {
    /// No byte was available, or the byte carried no line progress
    Idle,
    /// A byte was appended to the line under assembly
    Accumulated,
    /// The end byte arrived; `len` is the assembled line length
    Completed {
        /// Bytes accumulated before the terminator
        len: usize,
    },
}

/// Restartable byte-to-line state machine for one channel
///
/// The ready flag latches when a line completes and stays set until
/// consumed through [`LineAssembler::take_ready`]; callers must poll
/// every cycle or the edge is lost to them, not overwritten.
pub struct LineAssembler {
    end_byte: u8,
    index: usize,
    ready: bool,
}

impl LineAssembler {
    /// Create an assembler recognizing `end_byte` as the line terminator
    #[must_use]
    pub const fn new(end_byte: u8) -> Self {
        Self {
            end_byte,
            index: 0,
            ready: false,
        }
    }

    /// The configured line terminator
    #[must_use]
    pub const fn end_byte(&self) -> u8 {
        self.end_byte
    }

    /// Advance the state machine by one received byte
    ///
    /// The terminator resets the accumulation index and latches the
    /// ready flag. NUL bytes are ignored; the modem never emits them in
    /// text mode. Any other byte lands in `buf` at the current index,
    /// wrapping silently at the buffer capacity (a long unterminated
    /// burst corrupts the line rather than growing it).
    pub fn feed(&mut self, byte: u8, buf: &mut [u8]) -> LineEvent {
        if byte == self.end_byte {
            let len = self.index;
            self.index = 0;
            self.ready = true;
            return LineEvent::Completed { len };
        }
        if byte == 0 || buf.is_empty() {
            return LineEvent::Idle;
        }
        buf[self.index % buf.len()] = byte;
        self.index = (self.index + 1) % buf.len();
        LineEvent::Accumulated
    }

    /// Return and clear the latched ready flag (one-shot)
    ///
    /// A second immediate call returns `false` even if no new line has
    /// arrived since.
    pub fn take_ready(&mut self) -> bool {
        let ready = self.ready;
        self.ready = false;
        ready
    }

    /// Drop any partial line and the ready latch
    pub fn reset(&mut self) {
        self.index = 0;
        self.ready = false;
    }
}

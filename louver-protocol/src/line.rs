//! Newline framing for the serial link

use heapless::Vec;

/// Longest accepted request line, excluding the terminator
pub const MAX_LINE_LEN: usize = 128;

/// Line framing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    /// The line exceeded [`MAX_LINE_LEN`] and was discarded
    TooLong,
}

/// Accumulates bytes until `\n`
///
/// `\r` is dropped so both `\n` and `\r\n` terminators work. An
/// overlong line is discarded in full: bytes are dropped until the next
/// terminator, which then reports [`LineError::TooLong`] once.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buffer: Vec<u8, MAX_LINE_LEN>,
    overflowed: bool,
}

impl LineBuffer {
    /// Create an empty line buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop any partial line
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.overflowed = false;
    }

    /// Feed a single byte
    ///
    /// Returns `Ok(Some(line))` when a terminator completes a non-empty
    /// line, `Ok(None)` otherwise. Blank lines are skipped.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Vec<u8, MAX_LINE_LEN>>, LineError> {
        match byte {
            b'\n' => {
                if self.overflowed {
                    self.reset();
                    return Err(LineError::TooLong);
                }
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                let line = self.buffer.clone();
                self.reset();
                Ok(Some(line))
            }
            b'\r' => Ok(None),
            _ => {
                if !self.overflowed && self.buffer.push(byte).is_err() {
                    self.buffer.clear();
                    self.overflowed = true;
                }
                Ok(None)
            }
        }
    }
}

//! Line-at-a-time block assembly.
//!
//! The judge streams blocks over a pipe. The reader buffers lines from a
//! phase header up to `STATE END` and hands the finished block to
//! [`parse_state`].

use crate::board::{Phase, State};

use super::block::{parse_state, ProtocolError, STATE_END};

/// Accumulates judge lines into complete blocks.
#[derive(Debug, Default)]
pub struct BlockReader {
    buffer: String,
    open: bool,
}

impl BlockReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one line. Returns the parsed state once a block closes.
    ///
    /// Blank lines are ignored. A non-header line outside a block is
    /// reported as an error and dropped.
    pub fn push_line(&mut self, line: &str) -> Option<Result<State, ProtocolError>> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }

        if !self.open {
            if Phase::from_header(trimmed).is_none() {
                return Some(Err(ProtocolError::UnknownPhase(trimmed.to_string())));
            }
            self.open = true;
            self.buffer.clear();
        }

        self.buffer.push_str(trimmed);
        self.buffer.push('\n');
        if trimmed == STATE_END {
            self.open = false;
            return Some(parse_state(&self.buffer));
        }
        None
    }

    /// Returns true while a block is partially read.
    pub fn is_open(&self) -> bool {
        self.open
    }
}

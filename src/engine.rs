//! Judge session state.
//!
//! Feeds judge lines into a block reader and answers each complete block
//! with one move line. The contestant is created on the first block, for
//! whichever side is to move there, and kept for the rest of the game.

use std::io::{self, Write};

use tracing::{info, warn};

use crate::board::State;
use crate::player::{Contestant, Schedule};
use crate::protocol::{judge_move, BlockReader};

/// Holds the mutable state of the engine between blocks.
pub struct Engine {
    reader: BlockReader,
    contestant: Option<Contestant>,
    schedule: Schedule,
    seed: Option<u64>,
}

impl Engine {
    pub fn new(schedule: Schedule, seed: Option<u64>) -> Self {
        Engine {
            reader: BlockReader::new(),
            contestant: None,
            schedule,
            seed,
        }
    }

    /// Handles one input line, writing a move once a block completes.
    ///
    /// Malformed blocks and positions without any ply are logged and
    /// skipped; only I/O failures are returned.
    pub fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<()> {
        match self.reader.push_line(line) {
            None => Ok(()),
            Some(Err(e)) => {
                warn!(error = %e, "discarding block");
                Ok(())
            }
            Some(Ok(state)) => self.handle_state(&state, out),
        }
    }

    fn handle_state<W: Write>(&mut self, state: &State, out: &mut W) -> io::Result<()> {
        let stale = self
            .contestant
            .as_ref()
            .map(Contestant::side)
            .filter(|&side| side != state.turn);
        if let Some(previous) = stale {
            info!(
                from = previous.name(),
                to = state.turn.name(),
                "side to move changed, starting over"
            );
            self.contestant = None;
        }
        let schedule = &self.schedule;
        let seed = self.seed;
        let contestant = self
            .contestant
            .get_or_insert_with(|| Contestant::new(state.turn, schedule.clone(), seed));

        match contestant.search(state) {
            Ok(result) => {
                writeln!(out, "{}", judge_move(result.ply, state))?;
                out.flush()
            }
            Err(e) => {
                warn!(error = %e, "no move to send");
                Ok(())
            }
        }
    }
}

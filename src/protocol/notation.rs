//! Move lines exchanged with the judge: `<position> <weight>`.

use std::fmt;
use std::str::FromStr;

use crate::board::{Phase, Ply, State, Weight, BOARD_SIZE};

use super::block::ProtocolError;

/// A move as the judge sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JudgeMove {
    pub position: i32,
    pub weight: Weight,
}

impl fmt::Display for JudgeMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.position, self.weight)
    }
}

impl FromStr for JudgeMove {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ProtocolError::MalformedMove(s.to_string());
        let mut fields = s.split_whitespace();
        let position = fields
            .next()
            .and_then(|f| f.parse().ok())
            .ok_or_else(malformed)?;
        let weight = fields
            .next()
            .and_then(|f| f.parse().ok())
            .ok_or_else(malformed)?;
        if fields.next().is_some() {
            return Err(malformed());
        }
        Ok(JudgeMove { position, weight })
    }
}

/// Describes `ply` for the judge. `ply` must fit `state`.
pub fn judge_move(ply: Ply, state: &State) -> JudgeMove {
    match ply.weight(state) {
        Some(weight) => JudgeMove {
            position: ply.position(),
            weight,
        },
        None => panic!("{} does not fit the position", ply),
    }
}

/// Maps a judge move back onto a ply for the side to move in `state`.
///
/// Checks only that the ply can be applied; it may still tip the board.
pub fn resolve_move(mv: JudgeMove, state: &State) -> Result<Ply, ProtocolError> {
    let illegal = || ProtocolError::IllegalMove(mv.to_string());
    if !(-BOARD_SIZE..=BOARD_SIZE).contains(&mv.position) {
        return Err(illegal());
    }
    match state.phase {
        Phase::Adding => {
            if state.board.get(mv.position).is_some() {
                return Err(illegal());
            }
            state
                .current_hand()
                .unplayed()
                .find(|&(_, w)| w == mv.weight)
                .map(|(hand_index, _)| Ply::Add {
                    position: mv.position,
                    hand_index,
                })
                .ok_or_else(illegal)
        }
        Phase::Removing => {
            if state.board.is_anchor(mv.position) || state.board.get(mv.position) != Some(mv.weight)
            {
                return Err(illegal());
            }
            Ok(Ply::Remove {
                position: mv.position,
            })
        }
    }
}

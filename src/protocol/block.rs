//! Judge state blocks.
//!
//! A block is a phase header, one row per weight, and a terminator:
//!
//! ```text
//! ADDING
//! 1 -4 Green 3
//! 1 -2 Red 5
//! 0 0 Red 1
//! 0 0 Blue 1
//! STATE END
//! ```
//!
//! Rows read `<on_board> <position> <colour> <weight>`. `Green` is the
//! anchor. Off-board rows are weights still in hand while adding and are
//! ignored while removing. The side to move is inferred from the counts.

use crate::board::{
    Board, Hand, Phase, Side, State, Weight, ANCHOR_POSITION, ANCHOR_WEIGHT, BOARD_SIZE,
    HAND_SIZE,
};

/// Line closing a state block.
pub const STATE_END: &str = "STATE END";

/// Errors that can occur while reading a state block.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("empty state block")]
    Empty,

    #[error("unknown phase header: '{0}'")]
    UnknownPhase(String),

    #[error("block ended without 'STATE END'")]
    MissingEnd,

    #[error("malformed row: '{0}'")]
    MalformedRow(String),

    #[error("unknown colour: '{0}'")]
    UnknownColour(String),

    #[error("weight {0} outside 1..=10")]
    WeightOutOfRange(Weight),

    #[error("position {0} off the board")]
    PositionOutOfRange(i32),

    #[error("slot {0} listed twice")]
    SlotTaken(i32),

    #[error("{side} weight {weight} listed twice")]
    DuplicateWeight { side: &'static str, weight: Weight },

    #[error("anchor row must be '1 -4 Green 3', got '{0}'")]
    MisplacedAnchor(String),

    #[error("hands out of turn: Red holds {red}, Blue holds {blue}")]
    TurnOrder { red: i32, blue: i32 },

    #[error("position is already tipped")]
    Tipped,

    #[error("malformed move: '{0}'")]
    MalformedMove(String),

    #[error("move '{0}' does not fit the position")]
    IllegalMove(String),
}

enum Colour {
    Player(Side),
    Anchor,
}

fn parse_colour(s: &str) -> Result<Colour, ProtocolError> {
    match s {
        "Green" => Ok(Colour::Anchor),
        other => Side::from_name(other)
            .map(Colour::Player)
            .ok_or_else(|| ProtocolError::UnknownColour(other.to_string())),
    }
}

/// Parses one row into `(on_board, position, colour, weight)`.
fn parse_row(line: &str) -> Result<(bool, i32, Colour, Weight), ProtocolError> {
    let malformed = || ProtocolError::MalformedRow(line.to_string());
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 4 {
        return Err(malformed());
    }
    let on_board = match fields[0] {
        "1" => true,
        "0" => false,
        _ => return Err(malformed()),
    };
    let position: i32 = fields[1].parse().map_err(|_| malformed())?;
    let colour = parse_colour(fields[2])?;
    let weight: Weight = fields[3].parse().map_err(|_| malformed())?;
    Ok((on_board, position, colour, weight))
}

/// Parses a full block, header through terminator. Blank lines are skipped.
pub fn parse_state(text: &str) -> Result<State, ProtocolError> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
    let header = lines.next().ok_or(ProtocolError::Empty)?;
    let phase =
        Phase::from_header(header).ok_or_else(|| ProtocolError::UnknownPhase(header.to_string()))?;

    let mut state = State::initial();
    state.board = Board::cleared();
    state.red = Hand::played();
    state.blue = Hand::played();
    state.phase = phase;

    let mut placed = [[false; HAND_SIZE]; 2];
    let mut ended = false;
    for line in lines {
        if line == STATE_END {
            ended = true;
            break;
        }
        let (on_board, position, colour, weight) = parse_row(line)?;

        let side = match colour {
            Colour::Anchor => {
                if !on_board || position != ANCHOR_POSITION || weight != ANCHOR_WEIGHT {
                    return Err(ProtocolError::MisplacedAnchor(line.to_string()));
                }
                if state.board.get(ANCHOR_POSITION).is_some() {
                    return Err(ProtocolError::SlotTaken(position));
                }
                state.board.seat_anchor();
                continue;
            }
            Colour::Player(side) => side,
        };

        if !(1..=HAND_SIZE as Weight).contains(&weight) {
            return Err(ProtocolError::WeightOutOfRange(weight));
        }
        let seen = &mut placed[side as usize][weight as usize - 1];
        if *seen {
            return Err(ProtocolError::DuplicateWeight {
                side: side.name(),
                weight,
            });
        }
        *seen = true;

        if on_board {
            if !(-BOARD_SIZE..=BOARD_SIZE).contains(&position) {
                return Err(ProtocolError::PositionOutOfRange(position));
            }
            if state.board.get(position).is_some() {
                return Err(ProtocolError::SlotTaken(position));
            }
            state.board.place(position, weight);
        } else if phase == Phase::Adding {
            let hand = state.hand_mut(side);
            hand.weights[weight as usize - 1] = Some(weight);
            hand.remain += 1;
        }
    }
    if !ended {
        return Err(ProtocolError::MissingEnd);
    }
    if state.board.is_tipped() {
        return Err(ProtocolError::Tipped);
    }

    // A placing block with nothing left in hand is already a removing one.
    if state.phase == Phase::Adding && state.red.is_empty() && state.blue.is_empty() {
        state.phase = Phase::Removing;
    }

    match state.phase {
        Phase::Adding => {
            let (red, blue) = (state.red.remain, state.blue.remain);
            state.turn = if red == blue {
                Side::Red
            } else if blue == red + 1 {
                Side::Blue
            } else {
                return Err(ProtocolError::TurnOrder { red, blue });
            };
        }
        Phase::Removing => {
            let removed = (2 * HAND_SIZE).saturating_sub(state.board.removable_count()) as i32;
            // Red removes first.
            state.red.remain = -((removed + 1) / 2);
            state.blue.remain = -(removed / 2);
            state.turn = if removed % 2 == 0 {
                Side::Red
            } else {
                Side::Blue
            };
        }
    }
    Ok(state)
}

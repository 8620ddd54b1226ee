//! Plies and their reversible application.
//!
//! A ply is managed together with the state it was generated from. The
//! state is never copied on the way down a search; `apply` mutates it and
//! `undo` restores it exactly, so calls must nest like a stack.

use std::fmt;

use super::layout::Weight;
use super::state::{Phase, State};

/// One placement or removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ply {
    /// Place the mover's weight at `hand_index` on `position`.
    Add { position: i32, hand_index: usize },
    /// Take the weight at `position` off the board.
    Remove { position: i32 },
}

impl Ply {
    /// Target slot of the ply.
    pub const fn position(self) -> i32 {
        match self {
            Ply::Add { position, .. } | Ply::Remove { position } => position,
        }
    }

    /// Weight moved by this ply, read from the state it applies to.
    pub fn weight(self, state: &State) -> Option<Weight> {
        match self {
            Ply::Add { hand_index, .. } => state.current_hand().weights[hand_index],
            Ply::Remove { position } => state.board.get(position),
        }
    }
}

impl fmt::Display for Ply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ply::Add {
                position,
                hand_index,
            } => write!(f, "add #{} at {}", hand_index, position),
            Ply::Remove { position } => write!(f, "remove at {}", position),
        }
    }
}

/// Applies `ply` to `state` and passes the turn.
///
/// Flips the phase to removing once both hands are empty. Panics if the
/// ply does not fit the state: wrong phase, occupied target when adding,
/// empty or anchor target when removing, or an already played hand index.
pub fn apply(ply: Ply, state: &mut State) {
    match ply {
        Ply::Add {
            position,
            hand_index,
        } => {
            assert_eq!(state.phase, Phase::Adding, "add ply outside adding phase");
            let mover = state.turn;
            let hand = state.hand_mut(mover);
            let weight = match hand.weights[hand_index].take() {
                Some(w) => w,
                None => panic!("hand index {} already played", hand_index),
            };
            hand.remain -= 1;
            state.board.place(position, weight);
            state.turn = mover.opponent();
            if state.red.is_empty() && state.blue.is_empty() {
                state.phase = Phase::Removing;
            }
        }
        Ply::Remove { position } => {
            assert_eq!(
                state.phase,
                Phase::Removing,
                "remove ply outside removing phase"
            );
            assert!(
                !state.board.is_anchor(position),
                "the anchor cannot be removed"
            );
            let mover = state.turn;
            let weight = state.board.lift(position);
            state.push_removed(weight);
            state.hand_mut(mover).remain -= 1;
            state.turn = mover.opponent();
        }
    }
}

/// Reverses a ply previously passed to [`apply`] on the same state.
pub fn undo(ply: Ply, state: &mut State) {
    match ply {
        Ply::Add {
            position,
            hand_index,
        } => {
            if state.phase == Phase::Removing {
                assert!(
                    state.removed().is_empty(),
                    "undoing a placement with removals outstanding"
                );
                state.phase = Phase::Adding;
            }
            let mover = state.turn.opponent();
            state.turn = mover;
            let weight = state.board.lift(position);
            let hand = state.hand_mut(mover);
            assert!(
                hand.weights[hand_index].is_none(),
                "hand index {} was not played",
                hand_index
            );
            hand.weights[hand_index] = Some(weight);
            hand.remain += 1;
        }
        Ply::Remove { position } => {
            assert_eq!(
                state.phase,
                Phase::Removing,
                "remove ply outside removing phase"
            );
            let mover = state.turn.opponent();
            state.turn = mover;
            let weight = state.pop_removed();
            state.board.place(position, weight);
            state.hand_mut(mover).remain += 1;
        }
    }
}

//! Game state representation.
//!
//! Holds the complete snapshot of a No Tipping game: the board, both hands,
//! the side to move, the phase, and the stack of weights removed so far.

use serde::{Deserialize, Serialize};

use super::layout::{Board, Weight};

/// Weights owned by each side; hand index `i` holds weight `i + 1`.
pub const HAND_SIZE: usize = 10;

/// Removals possible in one game (every placed weight comes back off).
pub const MAX_REMOVALS: usize = 2 * HAND_SIZE;

/// Longest possible game in plies.
pub const MAX_PLIES: usize = 2 * HAND_SIZE + MAX_REMOVALS;

/// One of the two players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Red,
    Blue,
}

impl Side {
    /// The other player.
    pub const fn opponent(self) -> Side {
        match self {
            Side::Red => Side::Blue,
            Side::Blue => Side::Red,
        }
    }

    /// Name used by the judge protocol.
    pub const fn name(self) -> &'static str {
        match self {
            Side::Red => "Red",
            Side::Blue => "Blue",
        }
    }

    /// Parses a judge protocol colour name.
    pub fn from_name(s: &str) -> Option<Side> {
        match s {
            "Red" => Some(Side::Red),
            "Blue" => Some(Side::Blue),
            _ => None,
        }
    }
}

/// The phase of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Adding,
    Removing,
}

impl Phase {
    /// Header line used by the judge protocol.
    pub const fn header(self) -> &'static str {
        match self {
            Phase::Adding => "ADDING",
            Phase::Removing => "REMOVING",
        }
    }

    /// Parses a judge protocol header line.
    pub fn from_header(s: &str) -> Option<Phase> {
        match s {
            "ADDING" => Some(Phase::Adding),
            "REMOVING" => Some(Phase::Removing),
            _ => None,
        }
    }
}

/// A side's hand of weights.
///
/// `remain` counts unplaced weights while adding. Once the game flips to
/// removing it keeps counting down, one per removal made by this side, so
/// it goes negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hand {
    pub weights: [Option<Weight>; HAND_SIZE],
    pub remain: i32,
}

impl Default for Hand {
    fn default() -> Self {
        Hand::full()
    }
}

impl Hand {
    /// A full hand holding weights `1..=HAND_SIZE`.
    pub fn full() -> Self {
        let mut weights = [None; HAND_SIZE];
        for (i, w) in weights.iter_mut().enumerate() {
            *w = Some(i as Weight + 1);
        }
        Hand {
            weights,
            remain: HAND_SIZE as i32,
        }
    }

    /// A hand with every weight already played.
    pub fn played() -> Self {
        Hand {
            weights: [None; HAND_SIZE],
            remain: 0,
        }
    }

    /// Returns true if no weight is left to place.
    pub fn is_empty(&self) -> bool {
        self.weights.iter().all(|w| w.is_none())
    }

    /// Unplayed weights with their hand index, in index order.
    pub fn unplayed(&self) -> impl Iterator<Item = (usize, Weight)> + '_ {
        self.weights
            .iter()
            .enumerate()
            .filter_map(|(i, w)| w.map(|w| (i, w)))
    }
}

/// Complete game state at a point in time.
///
/// Everything lives in fixed-size arrays, so a clone is a full deep copy
/// and equality is exact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct State {
    pub board: Board,
    pub red: Hand,
    pub blue: Hand,
    pub turn: Side,
    pub phase: Phase,
    removed: [Weight; MAX_REMOVALS],
    removed_len: usize,
}

impl Default for State {
    fn default() -> Self {
        State::initial()
    }
}

impl State {
    /// The canonical starting position: anchor seated, both hands full,
    /// adding phase, Red to move.
    pub fn initial() -> Self {
        State {
            board: Board::initial(),
            red: Hand::full(),
            blue: Hand::full(),
            turn: Side::Red,
            phase: Phase::Adding,
            removed: [0; MAX_REMOVALS],
            removed_len: 0,
        }
    }

    /// Resets this state to the starting position in place.
    pub fn reset(&mut self) {
        *self = State::initial();
    }

    /// The hand of `side`.
    pub fn hand(&self, side: Side) -> &Hand {
        match side {
            Side::Red => &self.red,
            Side::Blue => &self.blue,
        }
    }

    /// The hand of `side`, mutably.
    pub fn hand_mut(&mut self, side: Side) -> &mut Hand {
        match side {
            Side::Red => &mut self.red,
            Side::Blue => &mut self.blue,
        }
    }

    /// The hand of the side to move.
    pub fn current_hand(&self) -> &Hand {
        self.hand(self.turn)
    }

    /// Weights removed so far, oldest first.
    pub fn removed(&self) -> &[Weight] {
        &self.removed[..self.removed_len]
    }

    /// Plies played since the start of the game, inferred from the hands.
    pub fn plies_played(&self) -> usize {
        let placed = 2 * HAND_SIZE as i32 - self.red.remain.max(0) - self.blue.remain.max(0);
        let removed = -(self.red.remain.min(0) + self.blue.remain.min(0));
        (placed + removed) as usize
    }

    pub(crate) fn push_removed(&mut self, weight: Weight) {
        assert!(self.removed_len < MAX_REMOVALS, "removal stack overflow");
        self.removed[self.removed_len] = weight;
        self.removed_len += 1;
    }

    pub(crate) fn pop_removed(&mut self) -> Weight {
        assert!(self.removed_len > 0, "removal stack underflow");
        self.removed_len -= 1;
        // Zero the slot so undo restores an identical state.
        std::mem::take(&mut self.removed[self.removed_len])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::layout::{ANCHOR_POSITION, ANCHOR_WEIGHT};

    #[test]
    fn side_names_roundtrip() {
        for s in [Side::Red, Side::Blue] {
            assert_eq!(Side::from_name(s.name()), Some(s));
            assert_eq!(s.opponent().opponent(), s);
        }
        assert_eq!(Side::from_name("Green"), None);
    }

    #[test]
    fn phase_headers_roundtrip() {
        for p in [Phase::Adding, Phase::Removing] {
            assert_eq!(Phase::from_header(p.header()), Some(p));
        }
        assert_eq!(Phase::from_header("adding"), None);
    }

    #[test]
    fn full_hand_holds_one_to_ten() {
        let hand = Hand::full();
        assert_eq!(hand.remain, HAND_SIZE as i32);
        for (i, w) in hand.weights.iter().enumerate() {
            assert_eq!(*w, Some(i as Weight + 1));
        }
        assert!(!hand.is_empty());
        assert!(Hand::played().is_empty());
    }

    #[test]
    fn initial_state_defaults() {
        let state = State::initial();
        assert_eq!(state.board.get(ANCHOR_POSITION), Some(ANCHOR_WEIGHT));
        assert_eq!(state.board.occupied().count(), 1);
        assert_eq!(state.red, Hand::full());
        assert_eq!(state.blue, Hand::full());
        assert_eq!(state.turn, Side::Red);
        assert_eq!(state.phase, Phase::Adding);
        assert!(state.removed().is_empty());
        assert_eq!(state.plies_played(), 0);
    }

    #[test]
    fn reset_restores_initial() {
        let mut state = State::initial();
        state.board.place(3, 7);
        state.red.weights[6] = None;
        state.turn = Side::Blue;
        state.reset();
        assert_eq!(state, State::initial());
    }

    #[test]
    fn removal_stack_push_pop() {
        let mut state = State::initial();
        let before = state.clone();
        state.push_removed(4);
        state.push_removed(9);
        assert_eq!(state.removed(), &[4, 9]);
        assert_eq!(state.pop_removed(), 9);
        assert_eq!(state.pop_removed(), 4);
        assert_eq!(state, before);
    }
}

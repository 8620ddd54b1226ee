//! Ply generation.
//!
//! Enumerates the plies available to the side to move, split by whether
//! they keep the board balanced. Both torques are computed once per call;
//! each candidate only adds its own contribution.

use crate::board::layout::{tips, Board, PIVOT_LEFT, PIVOT_RIGHT};
use crate::board::{Phase, Ply, State};

/// Which side of the torque bound to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Plies that leave the board balanced.
    Legal,
    /// Plies that tip the board. Only used for analysis.
    Suicidal,
}

impl Mode {
    #[inline]
    fn keeps(self, torque_left: i32, torque_right: i32) -> bool {
        let tipped = tips(torque_left, torque_right);
        match self {
            Mode::Legal => !tipped,
            Mode::Suicidal => tipped,
        }
    }
}

/// Fills `plies` with every ply of `mode` for the side to move.
///
/// Adding plies come ordered by hand index, then position; removing plies
/// by position. The buffer is cleared first so callers can reuse it.
pub fn generate(state: &State, mode: Mode, plies: &mut Vec<Ply>) {
    plies.clear();
    let board = &state.board;
    let torque_left = board.torque_left();
    let torque_right = board.torque_right();

    match state.phase {
        Phase::Adding => {
            for (hand_index, w) in state.current_hand().unplayed() {
                for position in Board::positions() {
                    if board.get(position).is_some() {
                        continue;
                    }
                    let left = torque_left + w * (PIVOT_LEFT - position);
                    let right = torque_right + w * (PIVOT_RIGHT - position);
                    if mode.keeps(left, right) {
                        plies.push(Ply::Add {
                            position,
                            hand_index,
                        });
                    }
                }
            }
        }
        Phase::Removing => {
            for (position, w) in board.removable() {
                let left = torque_left - w * (PIVOT_LEFT - position);
                let right = torque_right - w * (PIVOT_RIGHT - position);
                if mode.keeps(left, right) {
                    plies.push(Ply::Remove { position });
                }
            }
        }
    }
}

/// All plies that keep the board balanced.
pub fn legal_plies(state: &State) -> Vec<Ply> {
    let mut plies = Vec::new();
    generate(state, Mode::Legal, &mut plies);
    plies
}

/// All plies that tip the board.
pub fn suicidal_plies(state: &State) -> Vec<Ply> {
    let mut plies = Vec::new();
    generate(state, Mode::Suicidal, &mut plies);
    plies
}

/// Any ply at all, for a side that has already lost. Prefers a legal one.
pub fn any_ply(state: &State) -> Option<Ply> {
    legal_plies(state)
        .into_iter()
        .next()
        .or_else(|| suicidal_plies(state).into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{apply, undo, Side, ANCHOR_POSITION, ANCHOR_WEIGHT, HAND_SIZE, SLOT_COUNT};

    /// A removing-phase state with a hand-picked board.
    fn removing_state(weights: &[(i32, i32)]) -> State {
        let mut state = State::initial();
        state.red = crate::board::Hand::played();
        state.blue = crate::board::Hand::played();
        state.phase = Phase::Removing;
        for &(pos, w) in weights {
            state.board.place(pos, w);
        }
        state
    }

    #[test]
    fn initial_state_has_legal_plies() {
        let state = State::initial();
        let plies = legal_plies(&state);
        assert!(!plies.is_empty());
        for ply in &plies {
            assert!(matches!(ply, Ply::Add { .. }));
            assert_ne!(ply.position(), ANCHOR_POSITION);
        }
    }

    #[test]
    fn legal_and_suicidal_partition_candidates() {
        let state = State::initial();
        let legal = legal_plies(&state);
        let suicidal = suicidal_plies(&state);
        // Every (weight, empty slot) pair lands in exactly one set.
        assert_eq!(legal.len() + suicidal.len(), HAND_SIZE * (SLOT_COUNT - 1));
        for ply in &legal {
            assert!(!suicidal.contains(ply));
        }
    }

    #[test]
    fn legal_plies_never_tip() {
        let mut state = State::initial();
        for ply in legal_plies(&state) {
            apply(ply, &mut state);
            assert!(!state.board.is_tipped(), "{} tipped the board", ply);
            assert_eq!(state.board.get(ANCHOR_POSITION), Some(ANCHOR_WEIGHT));
            assert_eq!(state.board.occupied().count(), 2);
            undo(ply, &mut state);
        }
    }

    #[test]
    fn suicidal_plies_always_tip() {
        let mut state = State::initial();
        let suicidal = suicidal_plies(&state);
        assert!(!suicidal.is_empty());
        for ply in suicidal {
            apply(ply, &mut state);
            assert!(state.board.is_tipped(), "{} kept the board balanced", ply);
            undo(ply, &mut state);
        }
        assert_eq!(state, State::initial());
    }

    #[test]
    fn plies_ordered_by_hand_index_then_position() {
        let state = State::initial();
        let plies = legal_plies(&state);
        let keys: Vec<(usize, i32)> = plies
            .iter()
            .map(|p| match *p {
                Ply::Add {
                    position,
                    hand_index,
                } => (hand_index, position),
                Ply::Remove { .. } => unreachable!(),
            })
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn uses_current_side_hand() {
        let mut state = State::initial();
        state.turn = Side::Blue;
        for w in state.blue.weights.iter_mut().skip(1) {
            *w = None;
        }
        let plies = legal_plies(&state);
        assert!(!plies.is_empty());
        assert!(plies
            .iter()
            .all(|p| matches!(p, Ply::Add { hand_index: 0, .. })));
    }

    #[test]
    fn between_pivots_always_legal_when_adding() {
        let state = State::initial();
        let legal = legal_plies(&state);
        for hand_index in 0..HAND_SIZE {
            for position in PIVOT_LEFT..=PIVOT_RIGHT {
                assert!(legal.contains(&Ply::Add {
                    position,
                    hand_index
                }));
            }
        }
    }

    #[test]
    fn removal_that_unbalances_is_suicidal() {
        // 4 at -8 and 5 at 4 hold each other up; the 1 at 0 is free.
        let state = removing_state(&[(-8, 4), (0, 1), (4, 5)]);
        assert!(!state.board.is_tipped());
        assert_eq!(legal_plies(&state), vec![Ply::Remove { position: 0 }]);
        assert_eq!(
            suicidal_plies(&state),
            vec![Ply::Remove { position: -8 }, Ply::Remove { position: 4 }]
        );
        for ply in suicidal_plies(&state) {
            let mut s = state.clone();
            apply(ply, &mut s);
            assert!(s.board.is_tipped());
        }
    }

    #[test]
    fn anchor_only_board_has_no_removals() {
        let state = removing_state(&[]);
        assert!(legal_plies(&state).is_empty());
        assert!(suicidal_plies(&state).is_empty());
        assert_eq!(any_ply(&state), None);
    }

    #[test]
    fn generate_reuses_buffer() {
        let state = State::initial();
        let mut buf = vec![Ply::Remove { position: 0 }; 3];
        generate(&state, Mode::Legal, &mut buf);
        assert_eq!(buf, legal_plies(&state));
    }
}

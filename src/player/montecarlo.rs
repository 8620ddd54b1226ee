//! Random-rollout player.
//!
//! Each decision plays a fixed number of random games from the current
//! state. A rollout opens with a random ply for the mover, then both sides
//! play random balanced plies until the board tips or someone is stuck. The
//! opening ply that led to the most wins is played.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

use crate::board::{apply, Ply, Side, State};
use crate::movegen::{generate, Mode};
use crate::search::SearchError;

use super::Player;

/// Rollouts per decision.
pub const DEFAULT_TRIALS: usize = 1000;

pub struct MonteCarloPlayer {
    trials: usize,
    rng: SmallRng,
    plies: Vec<Ply>,
}

impl MonteCarloPlayer {
    /// `None` seeds from entropy.
    pub fn new(seed: Option<u64>) -> Self {
        MonteCarloPlayer::with_trials(DEFAULT_TRIALS, seed)
    }

    pub fn with_trials(trials: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        MonteCarloPlayer {
            trials: trials.max(1),
            rng,
            plies: Vec::new(),
        }
    }

    /// Plays one random game from `state`. Returns its opening ply and
    /// whether `who` won it.
    fn rollout(&mut self, state: &State, who: Side) -> Option<(Ply, bool)> {
        let mut sim = state.clone();
        let first = random_ply(&sim, &mut self.plies, &mut self.rng)?;
        apply(first, &mut sim);
        loop {
            // After a tip the turn has passed to the side that did not tip.
            if sim.board.is_tipped() {
                return Some((first, sim.turn == who));
            }
            match random_ply(&sim, &mut self.plies, &mut self.rng) {
                Some(ply) => apply(ply, &mut sim),
                None => return Some((first, sim.turn != who)),
            }
        }
    }
}

/// A uniformly random balanced ply, else the first ply that fits.
fn random_ply(state: &State, buf: &mut Vec<Ply>, rng: &mut SmallRng) -> Option<Ply> {
    generate(state, Mode::Legal, buf);
    if let Some(&ply) = buf.choose(rng) {
        return Some(ply);
    }
    generate(state, Mode::Suicidal, buf);
    buf.first().copied()
}

impl Player for MonteCarloPlayer {
    fn next_ply(&mut self, state: &State) -> Result<Ply, SearchError> {
        let who = state.turn;
        // Opening plies in the order first tried, with their win counts.
        let mut tally: Vec<(Ply, u32)> = Vec::new();
        for _ in 0..self.trials {
            let (first, won) = self.rollout(state, who).ok_or(SearchError::NoMoves)?;
            match tally.iter_mut().find(|(ply, _)| *ply == first) {
                Some(entry) => entry.1 += won as u32,
                None => tally.push((first, won as u32)),
            }
        }

        let (ply, wins) = tally
            .iter()
            .copied()
            .fold(None, |best: Option<(Ply, u32)>, entry| match best {
                Some(best) if best.1 >= entry.1 => Some(best),
                _ => Some(entry),
            })
            .ok_or(SearchError::NoMoves)?;
        debug!(%ply, wins, trials = self.trials, tried = tally.len(), "rollouts done");
        Ok(ply)
    }

    fn name(&self) -> &'static str {
        "montecarlo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Hand, Phase, Weight};
    use crate::movegen::legal_plies;

    fn removing_state(weights: &[(i32, Weight)], turn: Side) -> State {
        let mut state = State::initial();
        state.red = Hand::played();
        state.blue = Hand::played();
        state.phase = Phase::Removing;
        state.turn = turn;
        for &(pos, w) in weights {
            state.board.place(pos, w);
        }
        state
    }

    #[test]
    fn plays_balanced_plies_through_the_opening() {
        let mut player = MonteCarloPlayer::with_trials(40, Some(2));
        let mut state = State::initial();
        for _ in 0..4 {
            let ply = player.next_ply(&state).unwrap();
            assert!(legal_plies(&state).contains(&ply));
            apply(ply, &mut state);
        }
    }

    #[test]
    fn seeded_players_agree() {
        let state = State::initial();
        let mut a = MonteCarloPlayer::with_trials(30, Some(9));
        let mut b = MonteCarloPlayer::with_trials(30, Some(9));
        assert_eq!(a.next_ply(&state), b.next_ply(&state));
    }

    #[test]
    fn prefers_the_only_winning_removal() {
        // Every random continuation after lifting the 1 at -15 ends with
        // Blue stuck or tipping; every other opening loses.
        let state = removing_state(&[(-15, 1), (-14, 2), (4, 5)], Side::Red);
        assert!(!state.board.is_tipped());
        let mut player = MonteCarloPlayer::with_trials(60, Some(4));
        let ply = player.next_ply(&state).unwrap();
        assert_eq!(ply, Ply::Remove { position: -15 });
    }

    #[test]
    fn rollout_counts_a_stuck_opponent_as_a_win() {
        let state = removing_state(&[(0, 1)], Side::Red);
        let mut player = MonteCarloPlayer::with_trials(1, Some(0));
        let (ply, won) = player.rollout(&state, Side::Red).unwrap();
        assert_eq!(ply, Ply::Remove { position: 0 });
        assert!(won);
    }

    #[test]
    fn nothing_to_play_is_an_error() {
        let state = removing_state(&[], Side::Red);
        let mut player = MonteCarloPlayer::with_trials(5, Some(0));
        assert_eq!(player.next_ply(&state), Err(SearchError::NoMoves));
    }
}

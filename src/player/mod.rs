//! Players that pick a ply for a given state.
//!
//! `Contestant` is the real engine: it owns its catalog, keeps it current
//! as the game goes on, and retunes the search budget each turn from its
//! `Schedule`. `RandomPlayer` and `MonteCarloPlayer` are baseline opponents.

pub mod montecarlo;
pub mod schedule;

pub use montecarlo::MonteCarloPlayer;
pub use schedule::{ConfigError, Schedule};

use rand::rngs::{SmallRng, StdRng};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::board::{Ply, Side, State};
use crate::eval::Catalog;
use crate::movegen::{any_ply, legal_plies};
use crate::search::{choose_move, SearchError, SearchResult};

/// Something that moves.
pub trait Player {
    /// Picks a ply for the side to move in `state`.
    fn next_ply(&mut self, state: &State) -> Result<Ply, SearchError>;

    /// Short name for logs and records.
    fn name(&self) -> &'static str;
}

/// Catalog-backed alpha-beta player.
pub struct Contestant {
    side: Side,
    catalog: Catalog,
    schedule: Schedule,
    rng: StdRng,
}

impl Contestant {
    /// Builds the base catalog. `seed` fixes root move order; `None` draws
    /// from entropy.
    pub fn new(side: Side, schedule: Schedule, seed: Option<u64>) -> Self {
        let catalog = Catalog::build();
        info!(
            side = side.name(),
            red_entries = catalog.total(Side::Red),
            blue_entries = catalog.total(Side::Blue),
            "contestant ready"
        );
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Contestant {
            side,
            catalog,
            schedule,
            rng,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Updates the catalog for this turn and runs the search.
    pub fn search(&mut self, state: &State) -> Result<SearchResult, SearchError> {
        let turn = state.plies_played() + 1;
        if let Some(depths) = self.schedule.catalog_for(turn) {
            self.catalog.update(state, depths.start, depths.end);
        }
        let params = self.schedule.params_for(turn);
        debug!(
            turn,
            adding = params.max_depth_adding,
            removing = params.max_depth_removing,
            "searching"
        );
        let result = choose_move(state, &self.catalog, &params, &mut self.rng)?;
        info!(
            turn,
            ply = %result.ply,
            score = result.score,
            nodes = result.nodes,
            fallback = result.fallback,
            "move chosen"
        );
        Ok(result)
    }
}

impl Player for Contestant {
    fn next_ply(&mut self, state: &State) -> Result<Ply, SearchError> {
        self.search(state).map(|result| result.ply)
    }

    fn name(&self) -> &'static str {
        "contestant"
    }
}

/// Plays a uniformly random balanced ply, or any ply once none balances.
pub struct RandomPlayer {
    rng: SmallRng,
}

impl RandomPlayer {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        RandomPlayer { rng }
    }
}

impl Player for RandomPlayer {
    fn next_ply(&mut self, state: &State) -> Result<Ply, SearchError> {
        match legal_plies(state).choose(&mut self.rng) {
            Some(&ply) => Ok(ply),
            None => any_ply(state).ok_or(SearchError::NoMoves),
        }
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{apply, Hand, Phase, Weight, HAND_SIZE};
    use crate::combination::for_each_combination;
    use crate::eval::is_final;

    fn quick_schedule() -> Schedule {
        Schedule {
            opening_depth: 1,
            late_adding_depth: 1,
            transition_depth: 2,
            endgame_depth: 3,
            removing_catalog: 1..5,
            ..Schedule::default()
        }
    }

    #[test]
    fn random_player_plays_legal_plies() {
        let mut player = RandomPlayer::new(Some(11));
        let mut state = State::initial();
        for _ in 0..6 {
            let ply = player.next_ply(&state).unwrap();
            assert!(legal_plies(&state).contains(&ply));
            apply(ply, &mut state);
        }
    }

    #[test]
    fn random_player_with_nothing_to_remove() {
        let mut state = State::initial();
        state.red = Hand::played();
        state.blue = Hand::played();
        state.phase = Phase::Removing;
        let mut player = RandomPlayer::new(Some(1));
        assert_eq!(player.next_ply(&state), Err(SearchError::NoMoves));
    }

    /// Plays Red's contestant against a random Blue until the first
    /// removal, trying seeds until a game gets there balanced.
    fn contestant_at_first_removal() -> (Contestant, State) {
        (0..)
            .find_map(|seed| {
                let mut contestant = Contestant::new(Side::Red, quick_schedule(), Some(seed));
                let mut opponent = RandomPlayer::new(Some(seed + 100));
                let mut state = State::initial();
                while state.phase == Phase::Adding {
                    if state.board.is_tipped() || legal_plies(&state).is_empty() {
                        return None;
                    }
                    let ply = if state.turn == Side::Red {
                        contestant.next_ply(&state).ok()?
                    } else {
                        opponent.next_ply(&state).ok()?
                    };
                    apply(ply, &mut state);
                }
                Some((contestant, state))
            })
            .unwrap()
    }

    #[test]
    fn catalog_waits_for_the_full_board() {
        let (mut contestant, state) = contestant_at_first_removal();
        assert_eq!(contestant.side(), Side::Red);
        assert_eq!(state.turn, Side::Red);
        // Nothing past the base strata while placing.
        assert_eq!(contestant.catalog().depths().collect::<Vec<_>>(), vec![1, 2]);

        contestant.search(&state).unwrap();
        let catalog = contestant.catalog();
        let placed: Vec<(i32, Weight)> = state.board.occupied().collect();
        assert_eq!(placed.len(), 2 * HAND_SIZE + 1);
        for depth in [3, 4] {
            let stratum = catalog.stratum(depth).unwrap();
            let mut finals = 0;
            for_each_combination(placed.len(), depth, |subset| {
                let chosen: Vec<(i32, Weight)> = subset.iter().map(|&i| placed[i]).collect();
                if is_final(&chosen) {
                    finals += 1;
                    let hash = catalog.keys().hash(chosen.iter().copied());
                    assert!(stratum.binary_search(&hash).is_ok(), "missing {:?}", chosen);
                }
            });
            assert_eq!(stratum.len(), finals, "depth {}", depth);
        }
    }

    #[test]
    fn seeded_contestants_agree() {
        let state = State::initial();
        let mut a = Contestant::new(Side::Red, quick_schedule(), Some(3));
        let mut b = Contestant::new(Side::Red, quick_schedule(), Some(3));
        assert_eq!(a.next_ply(&state), b.next_ply(&state));
    }
}

//! Root-parallel alpha-beta.
//!
//! Root plies are shuffled, then dealt round-robin to one worker per rayon
//! thread. Each worker owns a clone of the root state and a move-list arena
//! with one buffer per depth, and walks its subtrees with apply/undo. Every
//! root child gets a full window, so its score is exact and the reduction
//! does not depend on which worker finished first.

use rand::seq::SliceRandom;
use rand::Rng;
use rayon::prelude::*;
use tracing::debug;

use crate::board::{apply, undo, Ply, Side, State, HAND_SIZE, MAX_PLIES, SLOT_COUNT};
use crate::eval::{evaluate, Catalog};
use crate::movegen::{generate, suicidal_plies, Mode};

use super::params::{SearchError, SearchParams};

/// Score of a line where the root mover's opponent runs out of plies.
pub const WIN: i32 = i32::MAX;

/// Score of a line where the root mover runs out of plies.
pub const LOSS: i32 = i32::MIN;

/// Plies one arena buffer holds without growing: every hand weight on
/// every slot.
const ARENA_CAPACITY: usize = HAND_SIZE * SLOT_COUNT;

/// Outcome of one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    pub ply: Ply,
    /// Minimax value of the root. `LOSS` when no forced result was found.
    pub score: i32,
    pub nodes: u64,
    /// True if the ply came from the one-ply evaluator fallback.
    pub fallback: bool,
}

/// Private state of one root worker.
struct Worker<'a> {
    state: State,
    arena: Vec<Vec<Ply>>,
    catalog: &'a Catalog,
    root_side: Side,
    max_depth: usize,
    nodes: u64,
}

impl<'a> Worker<'a> {
    fn new(root: &State, catalog: &'a Catalog, max_depth: usize) -> Self {
        Worker {
            state: root.clone(),
            arena: (0..=MAX_PLIES)
                .map(|_| Vec::with_capacity(ARENA_CAPACITY))
                .collect(),
            catalog,
            root_side: root.turn,
            max_depth,
            nodes: 0,
        }
    }

    /// Exact score of `ply` from the root.
    fn score_root_child(&mut self, ply: Ply) -> i32 {
        apply(ply, &mut self.state);
        let score = self.alphabeta(1, LOSS, WIN);
        undo(ply, &mut self.state);
        score
    }

    fn alphabeta(&mut self, depth: usize, mut alpha: i32, mut beta: i32) -> i32 {
        self.nodes += 1;
        if depth == self.max_depth {
            return evaluate(&self.state.board, self.catalog, self.root_side);
        }

        let maximizing = self.state.turn == self.root_side;
        let mut plies = std::mem::take(&mut self.arena[depth]);
        generate(&self.state, Mode::Legal, &mut plies);
        if plies.is_empty() {
            self.arena[depth] = plies;
            return if maximizing { LOSS } else { WIN };
        }

        let mut value = if maximizing { LOSS } else { WIN };
        for &ply in &plies {
            apply(ply, &mut self.state);
            let score = self.alphabeta(depth + 1, alpha, beta);
            undo(ply, &mut self.state);
            if maximizing {
                value = value.max(score);
                alpha = alpha.max(value);
            } else {
                value = value.min(score);
                beta = beta.min(value);
            }
            if alpha >= beta {
                break;
            }
        }
        self.arena[depth] = plies;
        value
    }
}

/// Picks a ply for the side to move in `state`.
///
/// Root plies are shuffled with `rng`; the same state, params and seed give
/// the same ply. When every line loses within the budget, the ply with the
/// best evaluator score one ply ahead is returned instead.
pub fn choose_move<R>(
    state: &State,
    catalog: &Catalog,
    params: &SearchParams,
    rng: &mut R,
) -> Result<SearchResult, SearchError>
where
    R: Rng + ?Sized,
{
    params.validate()?;
    debug_assert!(!state.board.is_tipped(), "search from a tipped board");

    let mut root_plies = Vec::new();
    generate(state, Mode::Legal, &mut root_plies);
    if root_plies.is_empty() {
        // Lost either way; any ply will do.
        let ply = suicidal_plies(state)
            .into_iter()
            .next()
            .ok_or(SearchError::NoMoves)?;
        debug!(%ply, "no balanced ply, conceding");
        return Ok(SearchResult {
            ply,
            score: LOSS,
            nodes: 0,
            fallback: false,
        });
    }
    root_plies.shuffle(rng);

    let max_depth = params.depth_for(state.phase);
    let worker_count = rayon::current_num_threads().clamp(1, root_plies.len());
    let mut workers: Vec<Worker<'_>> = (0..worker_count)
        .map(|_| Worker::new(state, catalog, max_depth))
        .collect();

    let root = &root_plies;
    let mut scored: Vec<(usize, i32)> = workers
        .par_iter_mut()
        .enumerate()
        .flat_map_iter(|(id, worker)| {
            (id..root.len())
                .step_by(worker_count)
                .map(|i| (i, worker.score_root_child(root[i])))
                .collect::<Vec<_>>()
        })
        .collect();
    let nodes: u64 = workers.iter().map(|w| w.nodes).sum();

    // Best score, lowest root index on ties.
    scored.sort_unstable_by_key(|&(i, _)| i);
    let (best_index, best_score) = scored
        .iter()
        .copied()
        .fold((0, LOSS), |best, (i, score)| {
            if score > best.1 {
                (i, score)
            } else {
                best
            }
        });

    if best_score != LOSS {
        let ply = root_plies[best_index];
        debug!(%ply, score = best_score, nodes, max_depth, "search finished");
        return Ok(SearchResult {
            ply,
            score: best_score,
            nodes,
            fallback: false,
        });
    }

    let ply = heuristic_choice(state, catalog, &root_plies);
    debug!(%ply, nodes, max_depth, "no forced result, using evaluator");
    Ok(SearchResult {
        ply,
        score: LOSS,
        nodes: nodes + root_plies.len() as u64,
        fallback: true,
    })
}

/// The ply whose resulting board the evaluator likes best for the mover.
fn heuristic_choice(state: &State, catalog: &Catalog, plies: &[Ply]) -> Ply {
    let mut scratch = state.clone();
    let mut best = (plies[0], i32::MIN);
    for &ply in plies {
        apply(ply, &mut scratch);
        let score = evaluate(&scratch.board, catalog, state.turn);
        undo(ply, &mut scratch);
        if score > best.1 {
            best = (ply, score);
        }
    }
    best.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Hand, Phase, Weight};
    use crate::movegen::legal_plies;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn removing_state(weights: &[(i32, Weight)], turn: Side) -> State {
        let mut state = State::initial();
        state.red = Hand::played();
        state.blue = Hand::played();
        state.phase = Phase::Removing;
        state.turn = turn;
        for &(pos, w) in weights {
            state.board.place(pos, w);
        }
        assert!(!state.board.is_tipped());
        state
    }

    fn params(adding: usize, removing: usize) -> SearchParams {
        SearchParams {
            max_depth_adding: adding,
            max_depth_removing: removing,
        }
    }

    /// Plain minimax with the same horizon and scoring, no pruning.
    fn minimax(state: &mut State, catalog: &Catalog, root: Side, depth: usize, max: usize) -> i32 {
        if depth == max {
            return evaluate(&state.board, catalog, root);
        }
        let plies = legal_plies(state);
        let maximizing = state.turn == root;
        if plies.is_empty() {
            return if maximizing { LOSS } else { WIN };
        }
        let scores = plies.iter().map(|&ply| {
            apply(ply, state);
            let s = minimax(state, catalog, root, depth + 1, max);
            undo(ply, state);
            s
        });
        let scores: Vec<i32> = scores.collect();
        if maximizing {
            *scores.iter().max().unwrap()
        } else {
            *scores.iter().min().unwrap()
        }
    }

    #[test]
    fn rejects_bad_depth_before_searching() {
        let catalog = Catalog::build();
        let mut rng = StdRng::seed_from_u64(1);
        let err = choose_move(&State::initial(), &catalog, &params(0, 4), &mut rng).unwrap_err();
        assert!(matches!(err, SearchError::DepthOutOfRange { depth: 0, .. }));
    }

    #[test]
    fn anchor_only_board_has_no_moves() {
        let catalog = Catalog::build();
        let state = removing_state(&[], Side::Red);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            choose_move(&state, &catalog, &params(2, 4), &mut rng),
            Err(SearchError::NoMoves)
        );
    }

    #[test]
    fn takes_last_weight_to_win() {
        let catalog = Catalog::build();
        let state = removing_state(&[(0, 1)], Side::Red);
        let mut rng = StdRng::seed_from_u64(3);
        let result = choose_move(&state, &catalog, &params(2, 2), &mut rng).unwrap();
        assert_eq!(result.ply, Ply::Remove { position: 0 });
        assert_eq!(result.score, WIN);
        assert!(!result.fallback);
        assert!(result.nodes > 0);
    }

    #[test]
    fn lost_position_falls_back_to_evaluator() {
        // Both weights come off safely in either order, so Red is left
        // without a ply on the third move.
        let catalog = Catalog::build();
        let state = removing_state(&[(-2, 1), (0, 1)], Side::Red);
        let mut rng = StdRng::seed_from_u64(5);
        let result = choose_move(&state, &catalog, &params(2, 3), &mut rng).unwrap();
        assert!(result.fallback);
        assert_eq!(result.score, LOSS);
        assert!(legal_plies(&state).contains(&result.ply));
    }

    #[test]
    fn concedes_with_suicidal_ply_when_nothing_balances() {
        let catalog = Catalog::build();
        let state = removing_state(&[(-8, 4), (4, 5)], Side::Blue);
        let mut rng = StdRng::seed_from_u64(9);
        let result = choose_move(&state, &catalog, &params(2, 4), &mut rng).unwrap();
        assert_eq!(result.ply, Ply::Remove { position: -8 });
        assert_eq!(result.score, LOSS);
        assert_eq!(result.nodes, 0);
    }

    #[test]
    fn same_seed_same_move() {
        let catalog = Catalog::build();
        let state = State::initial();
        let p = params(2, 4);
        let a = choose_move(&state, &catalog, &p, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = choose_move(&state, &catalog, &p, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a.ply, b.ply);
        assert_eq!(a.score, b.score);
        assert!(legal_plies(&state).contains(&a.ply));
    }

    #[test]
    fn pruning_agrees_with_minimax() {
        let catalog = Catalog::build();
        let weights = [(-6, 2), (-2, 5), (0, 1), (1, 3), (2, 2), (6, 1)];
        for turn in [Side::Red, Side::Blue] {
            for depth in 1..=5 {
                let state = removing_state(&weights, turn);
                let result = choose_move(
                    &state,
                    &catalog,
                    &params(1, depth),
                    &mut StdRng::seed_from_u64(depth as u64),
                )
                .unwrap();
                let expected = minimax(&mut state.clone(), &catalog, turn, 0, depth);
                assert_eq!(result.score, expected, "turn {:?} depth {}", turn, depth);
            }
        }
    }

    #[test]
    fn arena_holds_an_opening_without_growing() {
        let catalog = Catalog::build();
        let state = State::initial();
        let mut worker = Worker::new(&state, &catalog, 2);
        let before = worker.arena[0].capacity();
        assert!(before >= ARENA_CAPACITY);
        let mut all = Vec::new();
        generate(&state, Mode::Legal, &mut worker.arena[0]);
        all.extend_from_slice(&worker.arena[0]);
        generate(&state, Mode::Suicidal, &mut worker.arena[0]);
        all.extend_from_slice(&worker.arena[0]);
        assert_eq!(all.len(), HAND_SIZE * (SLOT_COUNT - 1));
        assert_eq!(worker.arena[0].capacity(), before);
    }

    #[test]
    fn search_leaves_input_untouched() {
        let catalog = Catalog::build();
        let state = State::initial();
        let before = state.clone();
        choose_move(&state, &catalog, &params(2, 4), &mut StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(state, before);
    }
}

//! Win-state catalog.
//!
//! For each inverse depth `d` the catalog holds the hashes of every set of
//! `d` weights that balances an otherwise empty board and still balances
//! after any one of them is taken off. The anchor is one of the weights
//! like any other. Strata are sorted so lookups are a binary search.
//!
//! Depths 1 and 2 are enumerated up front from every (slot, weight) pair
//! that fits beside the starting anchor. Deeper strata are filled from the
//! weights actually on the board, each at most once.

use std::collections::BTreeMap;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::debug;

use crate::board::layout::{
    tips, Board, Weight, ANCHOR_POSITION, ANCHOR_WEIGHT, PIVOT_LEFT, PIVOT_RIGHT, SLOT_COUNT,
};
use crate::board::{Side, State, HAND_SIZE, MAX_REMOVALS};
use crate::combination::{
    for_each_combination, BinomialTable, CombinationStepper, RandomAccessCombinations,
};

/// Depths enumerated when a catalog is built.
pub const BASE_DEPTHS: std::ops::Range<usize> = 1..3;

/// Deepest stratum: every removable weight plus the anchor.
pub const MAX_DEPTH: usize = MAX_REMOVALS + 1;

/// Every (slot, weight) pair a hand can put on the board, plus the anchor
/// in its own slot.
const BASE_CANDIDATES: usize = (SLOT_COUNT - 1) * HAND_SIZE + 1;

/// Subsets handed to one rayon task when filling a stratum.
const CHUNK: u64 = 4096;

const ZOBRIST_SEED: u64 = 0x6e74_6763_6174_616c;

/// The side a stratum at `depth` counts for: whoever made the removal
/// that leaves `depth` weights, anchor included.
///
/// Red takes the first of the twenty removals, so Red is to move whenever
/// an odd number of weights remain and the side that just moved is Blue.
pub const fn side_of_depth(depth: usize) -> Side {
    if depth % 2 == 1 {
        Side::Blue
    } else {
        Side::Red
    }
}

/// Random keys per (slot, weight), XORed into configuration hashes.
#[derive(Debug, Clone)]
pub struct ZobristKeys {
    keys: Box<[[u64; HAND_SIZE + 1]; SLOT_COUNT]>,
}

impl Default for ZobristKeys {
    fn default() -> Self {
        ZobristKeys::new()
    }
}

impl ZobristKeys {
    /// Keys from a fixed seed, identical across runs.
    pub fn new() -> Self {
        let mut rng = SmallRng::seed_from_u64(ZOBRIST_SEED);
        let mut keys = Box::new([[0u64; HAND_SIZE + 1]; SLOT_COUNT]);
        for row in keys.iter_mut() {
            for key in row.iter_mut() {
                *key = rng.gen();
            }
        }
        ZobristKeys { keys }
    }

    /// Key for `weight` sitting at `position`.
    #[inline]
    pub fn key(&self, position: i32, weight: Weight) -> u64 {
        debug_assert!(
            (1..=HAND_SIZE as Weight).contains(&weight),
            "weight {} out of range",
            weight
        );
        self.keys[Board::index(position)][weight as usize]
    }

    /// Order-independent hash of a set of placements.
    pub fn hash<I>(&self, placements: I) -> u64
    where
        I: IntoIterator<Item = (i32, Weight)>,
    {
        placements
            .into_iter()
            .fold(0, |acc, (pos, w)| acc ^ self.key(pos, w))
    }
}

/// Per-depth sorted hash lists of final configurations.
#[derive(Debug, Clone)]
pub struct Catalog {
    keys: ZobristKeys,
    binomials: BinomialTable,
    strata: BTreeMap<usize, Vec<u64>>,
}

impl Catalog {
    /// Builds the base strata.
    pub fn build() -> Self {
        let mut catalog = Catalog {
            keys: ZobristKeys::new(),
            binomials: BinomialTable::new(BASE_CANDIDATES, MAX_DEPTH),
            strata: BTreeMap::new(),
        };

        let candidates = base_candidates();
        debug_assert_eq!(candidates.len(), BASE_CANDIDATES);

        for depth in BASE_DEPTHS {
            let hashes = catalog.collect_stratum(&candidates, depth);
            catalog.insert_stratum(depth, hashes);
        }
        catalog
    }

    /// The hashing keys shared by every stratum.
    pub fn keys(&self) -> &ZobristKeys {
        &self.keys
    }

    /// Computes strata `from..to` from the weights on `state`'s board,
    /// anchor included.
    ///
    /// Depths already present are skipped, as are depths larger than the
    /// number of weights on the board; the latter can be filled by a later
    /// call once the board holds enough weights.
    pub fn update(&mut self, state: &State, from: usize, to: usize) {
        assert!(from >= 1, "inverse depth starts at 1");
        let candidates: Vec<(i32, Weight)> = state.board.occupied().collect();
        for depth in from..to {
            if self.strata.contains_key(&depth) || depth > candidates.len() {
                continue;
            }
            let hashes = self.collect_stratum(&candidates, depth);
            self.insert_stratum(depth, hashes);
        }
    }

    /// Sorted hashes at `depth`, if computed.
    pub fn stratum(&self, depth: usize) -> Option<&[u64]> {
        self.strata.get(&depth).map(Vec::as_slice)
    }

    /// Computed depths in ascending order.
    pub fn depths(&self) -> impl Iterator<Item = usize> + '_ {
        self.strata.keys().copied()
    }

    /// Number of entries across all strata credited to `side`.
    pub fn total(&self, side: Side) -> usize {
        self.strata
            .iter()
            .filter(|(&d, _)| side_of_depth(d) == side)
            .map(|(_, h)| h.len())
            .sum()
    }

    /// Counts the subsets of `board`'s weights, anchor included, that match
    /// an entry credited to `side`.
    pub fn reachable(&self, board: &Board, side: Side) -> u64 {
        let mut placed = [(0i32, 0 as Weight); SLOT_COUNT];
        let mut n = 0;
        for (pos, w) in board.occupied() {
            placed[n] = (pos, w);
            n += 1;
        }
        let placed = &placed[..n];

        let mut count = 0;
        for (&depth, hashes) in &self.strata {
            if depth > n || side_of_depth(depth) != side || hashes.is_empty() {
                continue;
            }
            for_each_combination(n, depth, |subset| {
                let hash = self.keys.hash(subset.iter().map(|&i| placed[i]));
                if hashes.binary_search(&hash).is_ok() {
                    count += 1;
                }
            });
        }
        count
    }

    fn insert_stratum(&mut self, depth: usize, mut hashes: Vec<u64>) {
        assert!(
            !self.strata.contains_key(&depth),
            "stratum {} already computed",
            depth
        );
        hashes.sort_unstable();
        assert!(
            hashes.windows(2).all(|w| w[0] != w[1]),
            "duplicate configuration in stratum {}",
            depth
        );
        debug!(
            depth,
            side = side_of_depth(depth).name(),
            entries = hashes.len(),
            "catalog stratum computed"
        );
        self.strata.insert(depth, hashes);
    }

    /// Hashes of every final `depth`-subset of `candidates`, unsorted.
    ///
    /// Subsets that put two weights in one slot are skipped. The rank space
    /// is cut into fixed chunks; each rayon task seeks to its first subset
    /// by rank and steps from there.
    fn collect_stratum(&self, candidates: &[(i32, Weight)], depth: usize) -> Vec<u64> {
        let access = RandomAccessCombinations::new(&self.binomials, candidates.len(), depth);
        let count = access.count();
        let chunks = count.div_ceil(CHUNK);
        (0..chunks)
            .into_par_iter()
            .flat_map_iter(|chunk| {
                let start = chunk * CHUNK;
                let end = (start + CHUNK).min(count);
                let mut stepper = CombinationStepper::starting_at(&access, start);
                let mut hashes = Vec::new();
                let mut subset = Vec::with_capacity(depth);
                while stepper.advance() && stepper.rank() < end {
                    subset.clear();
                    subset.extend(stepper.current().iter().map(|&i| candidates[i]));
                    if distinct_slots(&subset) && is_final(&subset) {
                        hashes.push(self.keys.hash(subset.iter().copied()));
                    }
                }
                hashes
            })
            .collect()
    }
}

/// Every (slot, weight) pair that does not clash with the starting anchor.
fn base_candidates() -> Vec<(i32, Weight)> {
    Board::positions()
        .flat_map(|pos| (1..=HAND_SIZE as Weight).map(move |w| (pos, w)))
        .filter(|&(pos, w)| pos != ANCHOR_POSITION || w == ANCHOR_WEIGHT)
        .collect()
}

/// True if no slot appears twice.
fn distinct_slots(placements: &[(i32, Weight)]) -> bool {
    placements
        .iter()
        .enumerate()
        .all(|(i, &(pos, _))| placements[..i].iter().all(|&(other, _)| other != pos))
}

/// True if `placements` balance an otherwise empty board, and still
/// balance with any single one of them taken off.
///
/// A lone weight only has to balance: the board is never emptied in play.
pub fn is_final(placements: &[(i32, Weight)]) -> bool {
    let base = Board::cleared();
    let mut left = base.torque_left();
    let mut right = base.torque_right();
    for &(pos, w) in placements {
        left += w * (PIVOT_LEFT - pos);
        right += w * (PIVOT_RIGHT - pos);
    }
    if tips(left, right) {
        return false;
    }
    placements.len() == 1
        || placements.iter().all(|&(pos, w)| {
            !tips(
                left - w * (PIVOT_LEFT - pos),
                right - w * (PIVOT_RIGHT - pos),
            )
        })
}

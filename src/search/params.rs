//! Search configuration and failure modes.

use serde::{Deserialize, Serialize};

use crate::board::{Phase, MAX_PLIES};

/// Depth budgets in plies, one per phase of the root position.
///
/// A budget of 1 scores each root ply directly with the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    pub max_depth_adding: usize,
    pub max_depth_removing: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        SearchParams {
            max_depth_adding: 2,
            max_depth_removing: 4,
        }
    }
}

impl SearchParams {
    /// Budget for a root in `phase`.
    pub fn depth_for(&self, phase: Phase) -> usize {
        match phase {
            Phase::Adding => self.max_depth_adding,
            Phase::Removing => self.max_depth_removing,
        }
    }

    /// Rejects budgets the per-worker arenas cannot hold.
    pub fn validate(&self) -> Result<(), SearchError> {
        for depth in [self.max_depth_adding, self.max_depth_removing] {
            if !(1..=MAX_PLIES).contains(&depth) {
                return Err(SearchError::DepthOutOfRange {
                    depth,
                    max: MAX_PLIES,
                });
            }
        }
        Ok(())
    }
}

/// Errors reported before a search starts.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("search depth {depth} outside 1..={max}")]
    DepthOutOfRange { depth: usize, max: usize },
    #[error("side to move has no ply at all")]
    NoMoves,
}

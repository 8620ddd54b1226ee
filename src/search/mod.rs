//! Move search.
//!
//! Depth-limited alpha-beta over the reversible state, parallel at the
//! root, scored at the horizon by the catalog evaluator.

pub mod alphabeta;
pub mod params;

pub use alphabeta::{choose_move, SearchResult, LOSS, WIN};
pub use params::{SearchError, SearchParams};

//! Fulcrum engine library.
//!
//! Exposes the board model, move generation, the catalog evaluator, the
//! parallel search, the judge protocol and self-play for use by the
//! binaries, integration tests and benchmarks.

pub mod board;
pub mod combination;
pub mod engine;
pub mod eval;
pub mod movegen;
pub mod player;
pub mod protocol;
pub mod search;
pub mod selfplay;

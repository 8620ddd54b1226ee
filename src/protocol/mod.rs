//! Judge protocol handling.
//!
//! Parses the line-oriented state blocks the judge sends, and formats the
//! single `<position> <weight>` line sent back.

pub mod block;
pub mod notation;
pub mod parser;

pub use block::{parse_state, ProtocolError, STATE_END};
pub use notation::{judge_move, resolve_move, JudgeMove};
pub use parser::BlockReader;

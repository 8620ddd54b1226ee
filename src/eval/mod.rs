//! Leaf evaluation.
//!
//! Scores a board by how many cataloged final configurations each side can
//! still reach from it. This is only a signal at the search horizon, bounded
//! by whichever strata the catalog has computed so far.

pub mod catalog;

pub use catalog::{is_final, side_of_depth, Catalog, ZobristKeys, BASE_DEPTHS};

use crate::board::{Board, Side};

/// Reachable entries for `perspective` minus those for its opponent.
///
/// Returns 0 when neither side reaches anything. The result never touches
/// `i32::MIN` or `i32::MAX`, which the search reserves for proven outcomes.
pub fn evaluate(board: &Board, catalog: &Catalog, perspective: Side) -> i32 {
    let mine = catalog.reachable(board, perspective) as i64;
    let theirs = catalog.reachable(board, perspective.opponent()) as i64;
    (mine - theirs).clamp(i32::MIN as i64 + 1, i32::MAX as i64 - 1) as i32
}

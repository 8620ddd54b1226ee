//! Board representation and game-state types.
//!
//! Contains the lever board with its torque model, the per-side hands,
//! the full game state, and the reversible ply type.

pub mod layout;
pub mod ply;
pub mod state;

pub use layout::{
    Board, Weight, ANCHOR_POSITION, ANCHOR_WEIGHT, BOARD_SIZE, BOARD_WEIGHT, CENTER_OF_GRAVITY,
    PIVOT_LEFT, PIVOT_RIGHT, SLOT_COUNT,
};
pub use ply::{apply, undo, Ply};
pub use state::{Hand, Phase, Side, State, HAND_SIZE, MAX_PLIES, MAX_REMOVALS};

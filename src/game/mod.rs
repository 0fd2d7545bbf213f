//! Game Logic Module
//!
//! Board state and the operations on it. Everything here is synchronous
//! except [`board::BoardEngine`], which owns the single mutex the network
//! layer goes through.
//!
//! ## Module Structure
//!
//! - `grid`: cell states and bomb mask, pure data
//! - `board`: reveal/flag/deflag/render plus the flood-fill cascade
//! - `setup`: initial board construction (random or from a board file)

pub mod board;
pub mod grid;
pub mod setup;

// Re-export key types
pub use board::{Board, BoardEngine, RevealOutcome};
pub use grid::{CellState, Grid};
pub use setup::{BoardSetupError, BOMB_PROBABILITY, DEFAULT_SIZE};

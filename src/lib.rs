//! # Minegrid Server
//!
//! Multiplayer minesweeper served over a line-oriented text protocol.
//! Many clients share one board; every board operation is serialized
//! behind a single lock, so concurrent sessions always observe a
//! consistent snapshot.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      MINEGRID SERVER                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  game/           - Board logic (lock-serialized)             │
//! │  ├── grid.rs     - Cell states + bomb mask, pure data        │
//! │  ├── board.rs    - Reveal/flag/deflag/render, flood fill     │
//! │  └── setup.rs    - Random / file-based board construction    │
//! │                                                              │
//! │  network/        - Protocol and connection handling          │
//! │  ├── protocol.rs - Command grammar and response text         │
//! │  ├── session.rs  - Per-connection line loop                  │
//! │  └── server.rs   - Accept loop, player count, shutdown       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//!
//! One tokio task per connection. The only shared mutable state is the
//! board behind `BoardEngine`'s mutex; the lock is held for the full
//! duration of each operation — flood fill included — and never across
//! a network read or write.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod game;
pub mod network;

// Re-export commonly used types
pub use game::board::{Board, BoardEngine, RevealOutcome};
pub use game::grid::{CellState, Grid};
pub use game::setup::{BoardSetupError, BOMB_PROBABILITY, DEFAULT_SIZE};
pub use network::server::{GameServer, ServerConfig, ServerError, DEFAULT_PORT};
pub use network::session::SessionHandler;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

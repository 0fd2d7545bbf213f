//! Network Layer
//!
//! TCP server speaking the line-oriented text protocol. All game state
//! lives in `game/`; this layer only parses commands, serializes replies,
//! and owns the task-per-connection plumbing.

pub mod protocol;
pub mod server;
pub mod session;

pub use protocol::{Command, BOOM_MESSAGE, DISCONNECT_MESSAGE, HELP_MESSAGE};
pub use server::{GameServer, ServerConfig, ServerError, DEFAULT_PORT};
pub use session::SessionHandler;

//! TCP Game Server
//!
//! Accepts connections and runs one session task per client against the
//! single shared board. A failed accept or a failed session never stops
//! the accept loop; shutdown is signalled over a broadcast channel.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::game::board::BoardEngine;
use crate::network::session::SessionHandler;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 4444;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address.
    pub bind_addr: SocketAddr,
    /// Keep clients connected after a boom reply.
    pub debug: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            debug: false,
        }
    }
}

/// Game server errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind the listening socket.
    #[error("failed to bind: {0}")]
    BindFailed(#[from] std::io::Error),
}

/// Live count of open sessions, reported in the greeting.
///
/// Incremented when a session joins; the returned guard decrements on
/// drop, so every exit path — bye, boom, EOF, I/O error — is counted.
#[derive(Debug, Default)]
struct PlayerCount(AtomicUsize);

impl PlayerCount {
    fn join(self: &Arc<Self>) -> PlayerGuard {
        let count = self.0.fetch_add(1, Ordering::SeqCst) + 1;
        PlayerGuard {
            counter: Arc::clone(self),
            count,
        }
    }
}

struct PlayerGuard {
    counter: Arc<PlayerCount>,
    /// Session count at join time, including this session.
    count: usize,
}

impl Drop for PlayerGuard {
    fn drop(&mut self) {
        self.counter.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// The minesweeper server: one listener, one board, many sessions.
pub struct GameServer {
    config: ServerConfig,
    board: Arc<BoardEngine>,
    players: Arc<PlayerCount>,
    listener: TcpListener,
    local_addr: SocketAddr,
    shutdown_tx: broadcast::Sender<()>,
}

impl GameServer {
    /// Bind the listening socket. The board must already be valid; board
    /// construction errors are fatal before this point.
    pub async fn bind(config: ServerConfig, board: BoardEngine) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(config.bind_addr).await?;
        let local_addr = listener.local_addr()?;
        let (shutdown_tx, _) = broadcast::channel(1);

        Ok(Self {
            config,
            board: Arc::new(board),
            players: Arc::new(PlayerCount::default()),
            listener,
            local_addr,
            shutdown_tx,
        })
    }

    /// Address the server is actually listening on (useful when binding
    /// port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Number of currently open sessions.
    pub fn player_count(&self) -> usize {
        self.players.0.load(Ordering::SeqCst)
    }

    /// Run the accept loop until [`GameServer::shutdown`] is called.
    ///
    /// Accept errors are logged and the loop continues; a broken
    /// individual connection never takes the server down.
    pub async fn run(&self) -> Result<(), ServerError> {
        info!("minesweeper server listening on {}", self.local_addr);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            tokio::select! {
                result = self.listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            info!(%addr, "new connection");
                            self.spawn_session(stream, addr);
                        }
                        Err(e) => {
                            error!("accept error: {e}");
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("shutdown signal received");
                    break;
                }
            }
        }
        Ok(())
    }

    /// Signal the accept loop to stop. Running sessions are left to
    /// finish on their own.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    fn spawn_session(&self, stream: TcpStream, addr: SocketAddr) {
        let handler = SessionHandler::new(Arc::clone(&self.board), self.config.debug);
        let players = Arc::clone(&self.players);

        tokio::spawn(async move {
            let guard = players.join();
            if let Err(e) = handler.run(stream, guard.count).await {
                // Isolated to this connection; the accept loop and every
                // other session keep going.
                warn!(%addr, "session ended with I/O error: {e}");
            }
            debug!(%addr, "session closed");
        });
    }
}

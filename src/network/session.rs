//! Client Sessions
//!
//! One session per connection: greet, then read one command line at a
//! time, run it against the shared board, and write the response lines
//! back. A session ends on `bye`, on a bomb dig (unless the server runs
//! in debug mode), or when the client's stream closes. I/O failures are
//! returned to the dispatcher and never affect any other session.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::debug;

use crate::game::board::{BoardEngine, RevealOutcome};
use crate::network::protocol::{
    self, Command, BOOM_MESSAGE, DISCONNECT_MESSAGE, HELP_MESSAGE,
};

/// What to send for one command line, and whether the session survives it.
enum Reply {
    /// Send the text, keep reading.
    Continue(String),
    /// Send the text, then close the connection.
    Close(String),
}

/// Handler for a single client connection.
///
/// Holds a handle to the shared board and the server's debug flag. The
/// handler itself is stateless beyond that: all game state lives behind
/// the board engine's lock.
pub struct SessionHandler {
    board: Arc<BoardEngine>,
    debug: bool,
}

impl SessionHandler {
    /// Create a handler bound to the shared board. `debug` keeps sessions
    /// open after a boom reply.
    pub fn new(board: Arc<BoardEngine>, debug: bool) -> Self {
        Self { board, debug }
    }

    /// Drive the session over any line-capable stream until the client
    /// disconnects, says `bye`, or digs a bomb in non-debug mode.
    ///
    /// `players` is the live session count, including this one, reported
    /// in the greeting.
    pub async fn run<S>(&self, stream: S, players: usize) -> std::io::Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let (reader, mut writer) = tokio::io::split(stream);
        let mut lines = BufReader::new(reader).lines();

        let greeting =
            protocol::greeting(players, self.board.width().await, self.board.height().await);
        writer.write_all(greeting.as_bytes()).await?;
        writer.write_all(b"\n").await?;

        while let Some(line) = lines.next_line().await? {
            let reply = self.handle_line(&line).await;
            let (text, close) = match reply {
                Reply::Continue(text) => (text, false),
                Reply::Close(text) => (text, true),
            };
            writer.write_all(text.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            if close {
                break;
            }
        }
        writer.shutdown().await?;
        Ok(())
    }

    /// Run one input line against the board and build the response.
    async fn handle_line(&self, line: &str) -> Reply {
        let Some(command) = Command::parse(line) else {
            debug!(?line, "unparseable input line");
            return Reply::Continue(HELP_MESSAGE.to_string());
        };
        debug!(%command, "handling command");

        match command {
            Command::Look => Reply::Continue(self.board.render().await),
            Command::Help => Reply::Continue(HELP_MESSAGE.to_string()),
            Command::Bye => Reply::Close(DISCONNECT_MESSAGE.to_string()),
            Command::Dig { x, y } => match self.board.reveal(x, y).await {
                RevealOutcome::Bomb if self.debug => Reply::Continue(BOOM_MESSAGE.to_string()),
                RevealOutcome::Bomb => Reply::Close(BOOM_MESSAGE.to_string()),
                RevealOutcome::Count(_) | RevealOutcome::NoOp => {
                    Reply::Continue(self.board.render().await)
                }
            },
            Command::Flag { x, y } => {
                self.board.flag(x, y).await;
                Reply::Continue(self.board.render().await)
            }
            Command::Deflag { x, y } => {
                self.board.deflag(x, y).await;
                Reply::Continue(self.board.render().await)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::board::Board;
    use crate::game::grid::Grid;
    use tokio::io::{AsyncBufReadExt, DuplexStream, Lines, ReadHalf, WriteHalf};
    use tokio::task::JoinHandle;

    struct TestClient {
        lines: Lines<BufReader<ReadHalf<DuplexStream>>>,
        writer: WriteHalf<DuplexStream>,
        session: JoinHandle<std::io::Result<()>>,
    }

    impl TestClient {
        /// Connect an in-memory client to a fresh session over the board.
        fn connect(rows: &[&str], debug: bool, players: usize) -> Self {
            let height = rows.len();
            let width = rows[0].len();
            let mut grid = Grid::new(width, height);
            for (y, row) in rows.iter().enumerate() {
                for (x, c) in row.chars().enumerate() {
                    if c == '1' {
                        grid.plant_bomb(x, y);
                    }
                }
            }
            let board = Arc::new(BoardEngine::new(Board::new(grid)));
            let handler = SessionHandler::new(board, debug);

            let (client, server) = tokio::io::duplex(4096);
            let session = tokio::spawn(async move { handler.run(server, players).await });
            let (reader, writer) = tokio::io::split(client);
            Self {
                lines: BufReader::new(reader).lines(),
                writer,
                session,
            }
        }

        async fn send(&mut self, line: &str) {
            self.writer.write_all(line.as_bytes()).await.unwrap();
            self.writer.write_all(b"\n").await.unwrap();
        }

        async fn recv(&mut self) -> String {
            self.lines
                .next_line()
                .await
                .unwrap()
                .expect("stream closed early")
        }

        async fn recv_eof(&mut self) {
            assert_eq!(self.lines.next_line().await.unwrap(), None);
        }
    }

    #[tokio::test]
    async fn test_greeting_reports_players_and_dimensions() {
        let mut client = TestClient::connect(&["000", "000"], false, 4);
        assert_eq!(
            client.recv().await,
            "Welcome to Minesweeper. Players: 4 including you. \
Board: 3 columns by 2 rows. Type 'help' for help."
        );
    }

    #[tokio::test]
    async fn test_look_renders_board() {
        let mut client = TestClient::connect(&["010", "000"], false, 1);
        client.recv().await;

        client.send("look").await;
        assert_eq!(client.recv().await, "- - -");
        assert_eq!(client.recv().await, "- - -");
    }

    #[tokio::test]
    async fn test_invalid_line_gets_help_and_session_survives() {
        let mut client = TestClient::connect(&["00", "00"], false, 1);
        client.recv().await;

        client.send("frobnicate").await;
        assert_eq!(client.recv().await, HELP_MESSAGE);
        client.send("dig 1").await;
        assert_eq!(client.recv().await, HELP_MESSAGE);

        client.send("look").await;
        assert_eq!(client.recv().await, "- -");
        assert_eq!(client.recv().await, "- -");
    }

    #[tokio::test]
    async fn test_help_command() {
        let mut client = TestClient::connect(&["00"], false, 1);
        client.recv().await;
        client.send("help").await;
        assert_eq!(client.recv().await, HELP_MESSAGE);
    }

    #[tokio::test]
    async fn test_flag_and_deflag_reply_with_render() {
        let mut client = TestClient::connect(&["00", "00"], false, 1);
        client.recv().await;

        client.send("flag 1 0").await;
        assert_eq!(client.recv().await, "- F");
        assert_eq!(client.recv().await, "- -");

        client.send("deflag 1 0").await;
        assert_eq!(client.recv().await, "- -");
        assert_eq!(client.recv().await, "- -");
    }

    #[tokio::test]
    async fn test_safe_dig_replies_with_render() {
        let mut client = TestClient::connect(&["100", "000", "000"], false, 1);
        client.recv().await;

        client.send("dig 1 1").await;
        assert_eq!(client.recv().await, "- - -");
        assert_eq!(client.recv().await, "- 1 -");
        assert_eq!(client.recv().await, "- - -");
    }

    #[tokio::test]
    async fn test_out_of_bounds_dig_replies_with_unchanged_render() {
        let mut client = TestClient::connect(&["00", "00"], false, 1);
        client.recv().await;

        client.send("dig 9 9").await;
        assert_eq!(client.recv().await, "- -");
        assert_eq!(client.recv().await, "- -");
    }

    #[tokio::test]
    async fn test_boom_disconnects_without_debug() {
        let mut client = TestClient::connect(&["10", "00"], false, 1);
        client.recv().await;

        client.send("dig 0 0").await;
        assert_eq!(client.recv().await, BOOM_MESSAGE);
        client.recv_eof().await;
        assert!(client.session.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_boom_keeps_session_in_debug_mode() {
        let mut client = TestClient::connect(&["10", "00"], true, 1);
        client.recv().await;

        client.send("dig 0 0").await;
        assert_eq!(client.recv().await, BOOM_MESSAGE);

        // The bomb was consumed; the board keeps the revealed state and
        // the session keeps answering.
        client.send("look").await;
        assert_eq!(client.recv().await, "   ");
        assert_eq!(client.recv().await, "   ");
    }

    #[tokio::test]
    async fn test_bye_always_disconnects() {
        let mut client = TestClient::connect(&["00"], true, 1);
        client.recv().await;

        client.send("bye").await;
        assert_eq!(client.recv().await, DISCONNECT_MESSAGE);
        client.recv_eof().await;
        assert!(client.session.await.unwrap().is_ok());
    }
}

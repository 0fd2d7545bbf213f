//! Minegrid Server Binary
//!
//! Parses the command line, builds the initial board, and serves it.
//! A bad board file or size is fatal here — the server never starts
//! accepting connections with an invalid board.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use minegrid::game::setup;
use minegrid::{BoardEngine, GameServer, ServerConfig, DEFAULT_PORT, DEFAULT_SIZE, VERSION};

#[derive(Parser, Debug)]
#[command(name = "minegrid-server", version, about = "Multiplayer minesweeper server")]
struct Args {
    /// Keep clients connected after they dig a bomb
    #[arg(long)]
    debug: bool,

    /// Disconnect clients after a boom message (the default)
    #[arg(long = "no-debug", conflicts_with = "debug")]
    no_debug: bool,

    /// Listening port
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Random board size as COLS,ROWS
    #[arg(long, value_parser = parse_size, conflicts_with = "file")]
    size: Option<(usize, usize)>,

    /// Path to a board file to load instead of generating randomly
    #[arg(long)]
    file: Option<PathBuf>,
}

fn parse_size(value: &str) -> Result<(usize, usize), String> {
    let (cols, rows) = value
        .split_once(',')
        .ok_or_else(|| format!("expected COLS,ROWS, got {value:?}"))?;
    let cols: usize = cols.parse().map_err(|_| format!("invalid column count {cols:?}"))?;
    let rows: usize = rows.parse().map_err(|_| format!("invalid row count {rows:?}"))?;
    if cols == 0 || rows == 0 {
        return Err("board size must be positive".to_string());
    }
    Ok((cols, rows))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    info!("Minegrid Server v{}", VERSION);

    // --no-debug states the default explicitly; the flags conflict, so
    // whichever was given wins.
    let debug = args.debug && !args.no_debug;

    let board = match (&args.file, args.size) {
        (Some(path), _) => setup::board_from_file(path)
            .with_context(|| format!("loading board file {}", path.display()))?,
        (None, Some((cols, rows))) => setup::random_board(cols, rows)?,
        (None, None) => setup::random_board(DEFAULT_SIZE, DEFAULT_SIZE)?,
    };
    info!(
        "board ready: {} columns by {} rows, {} bombs",
        board.width(),
        board.height(),
        board.bomb_count()
    );
    if debug {
        info!("debug mode: clients stay connected after a boom");
    }

    let config = ServerConfig {
        bind_addr: SocketAddr::from(([0, 0, 0, 0], args.port)),
        debug,
    };
    let server = GameServer::bind(config, BoardEngine::new(board))
        .await
        .context("failed to start server")?;
    server.run().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size_accepts_cols_rows() {
        assert_eq!(parse_size("42,58"), Ok((42, 58)));
        assert_eq!(parse_size("1,1"), Ok((1, 1)));
    }

    #[test]
    fn test_parse_size_rejects_bad_input() {
        assert!(parse_size("10").is_err());
        assert!(parse_size("a,b").is_err());
        assert!(parse_size("0,5").is_err());
        assert!(parse_size("5,0").is_err());
        assert!(parse_size("10,10,10").is_err());
    }

    #[test]
    fn test_size_and_file_are_mutually_exclusive() {
        use clap::CommandFactory;
        let result = Args::command().try_get_matches_from([
            "minegrid-server",
            "--size",
            "5,5",
            "--file",
            "board.txt",
        ]);
        assert!(result.is_err());
    }
}

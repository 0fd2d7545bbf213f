//! Board Construction
//!
//! Builds the initial board either randomly (each cell independently
//! bomb-bearing at a fixed probability) or from a board file. Construction
//! errors are fatal at startup: the server must never begin accepting
//! connections with an invalid board.
//!
//! Board file grammar:
//!
//! ```text
//! FILE  ::= BOARD LINE+
//! BOARD ::= WIDTH " " HEIGHT NEWLINE
//! LINE  ::= (VAL " ")* VAL NEWLINE
//! VAL   ::= 0 | 1
//! ```

use std::path::Path;

use rand::Rng;

use crate::game::board::Board;
use crate::game::grid::Grid;

/// Default square board size when neither `--size` nor `--file` is given.
pub const DEFAULT_SIZE: usize = 10;

/// Probability that a randomly generated cell holds a bomb.
pub const BOMB_PROBABILITY: f64 = 0.25;

/// Errors building the initial board.
#[derive(Debug, thiserror::Error)]
pub enum BoardSetupError {
    /// Reading the board file failed.
    #[error("failed to read board file: {0}")]
    Io(#[from] std::io::Error),

    /// The board file has no size line.
    #[error("board file is empty")]
    EmptyFile,

    /// The first line is not `<width> <height>`.
    #[error("invalid board size line: {0:?}")]
    InvalidSizeLine(String),

    /// A dimension is zero or negative.
    #[error("board size must be positive, got {width} by {height}")]
    NonPositiveSize {
        /// Requested width.
        width: i64,
        /// Requested height.
        height: i64,
    },

    /// The file ended before `height` rows were read.
    #[error("expected {expected} rows, file has {found}")]
    MissingRows {
        /// Rows the size line promised.
        expected: usize,
        /// Rows actually present.
        found: usize,
    },

    /// A row has the wrong number of values.
    #[error("row {row} has {found} values, expected {expected}")]
    BadRowLength {
        /// Zero-based row index.
        row: usize,
        /// Values the size line promised.
        expected: usize,
        /// Values actually present.
        found: usize,
    },

    /// A cell value is neither `0` nor `1`.
    #[error("invalid value {value:?} in row {row}")]
    BadValue {
        /// Zero-based row index.
        row: usize,
        /// The offending token.
        value: String,
    },
}

/// Generate a `width x height` board, each cell independently holding a
/// bomb with probability [`BOMB_PROBABILITY`].
pub fn random_board(width: usize, height: usize) -> Result<Board, BoardSetupError> {
    if width == 0 || height == 0 {
        return Err(BoardSetupError::NonPositiveSize {
            width: width as i64,
            height: height as i64,
        });
    }

    let mut rng = rand::thread_rng();
    let mut grid = Grid::new(width, height);
    for y in 0..height {
        for x in 0..width {
            if rng.gen_bool(BOMB_PROBABILITY) {
                grid.plant_bomb(x, y);
            }
        }
    }
    Ok(Board::new(grid))
}

/// Load a board from a file in the grammar above.
pub fn board_from_file(path: &Path) -> Result<Board, BoardSetupError> {
    let contents = std::fs::read_to_string(path)?;
    parse_board(&contents)
}

/// Parse board file contents. Lines beyond the promised `height` rows are
/// ignored, matching the `LINE+` grammar.
fn parse_board(input: &str) -> Result<Board, BoardSetupError> {
    let mut lines = input.lines();
    let header = lines.next().ok_or(BoardSetupError::EmptyFile)?;

    let (width, height) = parse_size_line(header)?;
    let mut grid = Grid::new(width, height);

    for row in 0..height {
        let line = lines.next().ok_or(BoardSetupError::MissingRows {
            expected: height,
            found: row,
        })?;
        let values: Vec<&str> = line.split(' ').collect();
        if values.len() != width {
            return Err(BoardSetupError::BadRowLength {
                row,
                expected: width,
                found: values.len(),
            });
        }
        for (col, value) in values.iter().enumerate() {
            match *value {
                "0" => {}
                "1" => grid.plant_bomb(col, row),
                other => {
                    return Err(BoardSetupError::BadValue {
                        row,
                        value: other.to_string(),
                    });
                }
            }
        }
    }

    Ok(Board::new(grid))
}

fn parse_size_line(header: &str) -> Result<(usize, usize), BoardSetupError> {
    let invalid = || BoardSetupError::InvalidSizeLine(header.to_string());

    let mut parts = header.split(' ');
    let width: i64 = parts
        .next()
        .and_then(|t| t.parse().ok())
        .ok_or_else(invalid)?;
    let height: i64 = parts
        .next()
        .and_then(|t| t.parse().ok())
        .ok_or_else(invalid)?;
    if parts.next().is_some() {
        return Err(invalid());
    }
    if width <= 0 || height <= 0 {
        return Err(BoardSetupError::NonPositiveSize { width, height });
    }
    Ok((width as usize, height as usize))
}

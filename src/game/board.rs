//! Board Engine
//!
//! The reveal/flag/deflag/render operations, the neighbor bomb counting,
//! and the flood-fill cascade. `Board` is the synchronous state machine;
//! `BoardEngine` wraps it in the single mutex that serializes every
//! session's access. The lock is held for the full duration of each
//! operation, including the entire cascade triggered by one reveal, so no
//! client can observe a board mid-flood-fill.

use tokio::sync::Mutex;

use crate::game::grid::{CellState, Grid};

/// Result of a reveal operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    /// The cell held a bomb. The bomb has been consumed and the cell is
    /// now revealed with an up-to-date neighbor count.
    Bomb,
    /// The cell was revealed safely with this many bomb-bearing neighbors.
    Count(u8),
    /// Nothing changed: out of bounds, flagged, or already revealed.
    NoOp,
}

/// Minesweeper board state machine.
///
/// Per-cell transitions: `Untouched <-> Flagged` via flag/deflag, and
/// `Untouched -> Revealed(n)` via reveal, which is terminal. Counter
/// invariants are asserted after every mutation; a violation is a bug in
/// this module, never something a client can trigger.
#[derive(Clone, Debug)]
pub struct Board {
    grid: Grid,
    untouched: usize,
    flagged: usize,
    revealed: usize,
    bombs_remaining: usize,
}

impl Board {
    /// Build a board from a prepared grid. All cells must still be
    /// untouched; the bomb layout is whatever the grid carries.
    pub fn new(grid: Grid) -> Self {
        let bombs_remaining = grid.bomb_total();
        let untouched = grid.width() * grid.height();
        let board = Self {
            grid,
            untouched,
            flagged: 0,
            revealed: 0,
            bombs_remaining,
        };
        board.check_invariants();
        board
    }

    /// Board width in columns.
    pub fn width(&self) -> usize {
        self.grid.width()
    }

    /// Board height in rows.
    pub fn height(&self) -> usize {
        self.grid.height()
    }

    /// Bombs not yet consumed by a reveal.
    pub fn bomb_count(&self) -> usize {
        self.bombs_remaining
    }

    /// Currently flagged cells.
    pub fn flagged_count(&self) -> usize {
        self.flagged
    }

    /// Cells neither revealed nor flagged.
    pub fn untouched_count(&self) -> usize {
        self.untouched
    }

    /// Flag an untouched cell. Out of bounds or any state other than
    /// `Untouched` is a no-op.
    pub fn flag(&mut self, x: i32, y: i32) {
        let Some((x, y)) = self.cell_at(x, y) else {
            return;
        };
        if self.grid.get(x, y) == CellState::Untouched {
            self.grid.set(x, y, CellState::Flagged);
            self.untouched -= 1;
            self.flagged += 1;
        }
        self.check_invariants();
    }

    /// Remove the flag from a flagged cell. Out of bounds or any state
    /// other than `Flagged` is a no-op.
    pub fn deflag(&mut self, x: i32, y: i32) {
        let Some((x, y)) = self.cell_at(x, y) else {
            return;
        };
        if self.grid.get(x, y) == CellState::Flagged {
            self.grid.set(x, y, CellState::Untouched);
            self.flagged -= 1;
            self.untouched += 1;
        }
        self.check_invariants();
    }

    /// Reveal an untouched cell.
    ///
    /// A bomb cell is consumed: the bomb leaves the mask, the global bomb
    /// count drops, and every already-revealed neighbor's stored count is
    /// decremented so the displayed numbers stay accurate. The cell itself
    /// ends up `Revealed(n)` with a freshly computed count either way, and
    /// a count of zero cascades through the untouched non-bomb
    /// neighborhood.
    pub fn reveal(&mut self, x: i32, y: i32) -> RevealOutcome {
        let Some((x, y)) = self.cell_at(x, y) else {
            return RevealOutcome::NoOp;
        };
        match self.grid.get(x, y) {
            CellState::Flagged | CellState::Revealed(_) => return RevealOutcome::NoOp,
            CellState::Untouched => {}
        }

        let hit_bomb = self.grid.has_bomb(x, y);
        if hit_bomb {
            self.grid.clear_bomb(x, y);
            self.bombs_remaining -= 1;
            self.decrement_revealed_neighbors(x, y);
        }

        let count = self.count_bomb_neighbors(x, y);
        self.grid.set(x, y, CellState::Revealed(count));
        self.untouched -= 1;
        self.revealed += 1;

        if count == 0 {
            self.cascade_from(x, y);
        }

        self.check_invariants();
        if hit_bomb {
            RevealOutcome::Bomb
        } else {
            RevealOutcome::Count(count)
        }
    }

    /// Render the board as protocol text: one line per row, cells
    /// separated by single spaces, no trailing newline. `-` untouched,
    /// `F` flagged, a space for a revealed zero, digits `1`-`8` otherwise.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.height() * self.width() * 2);
        for y in 0..self.height() {
            if y > 0 {
                out.push('\n');
            }
            for x in 0..self.width() {
                if x > 0 {
                    out.push(' ');
                }
                out.push(match self.grid.get(x, y) {
                    CellState::Untouched => '-',
                    CellState::Flagged => 'F',
                    CellState::Revealed(0) => ' ',
                    CellState::Revealed(n) => char::from_digit(n as u32, 10).unwrap_or('?'),
                });
            }
        }
        out
    }

    /// Flood fill from a zero-count cell: reveal every surrounding
    /// untouched non-bomb cell, continuing through further zero-count
    /// cells. Iterative worklist; each cell is revealed at most once, so
    /// the loop drains in at most `width * height` steps.
    fn cascade_from(&mut self, x: usize, y: usize) {
        let mut work = vec![(x, y)];
        while let Some((cx, cy)) = work.pop() {
            for (nx, ny) in neighbors(self.width(), self.height(), cx, cy) {
                if self.grid.get(nx, ny) != CellState::Untouched || self.grid.has_bomb(nx, ny) {
                    continue;
                }
                let count = self.count_bomb_neighbors(nx, ny);
                self.grid.set(nx, ny, CellState::Revealed(count));
                self.untouched -= 1;
                self.revealed += 1;
                if count == 0 {
                    work.push((nx, ny));
                }
            }
        }
    }

    /// Bombs among the up-to-eight in-range neighbors of `(x, y)`.
    fn count_bomb_neighbors(&self, x: usize, y: usize) -> u8 {
        neighbors(self.width(), self.height(), x, y)
            .filter(|&(nx, ny)| self.grid.has_bomb(nx, ny))
            .count() as u8
    }

    /// After the bomb at `(x, y)` is consumed, each already-revealed
    /// neighbor has one fewer bomb nearby; lower its stored count.
    fn decrement_revealed_neighbors(&mut self, x: usize, y: usize) {
        for (nx, ny) in neighbors(self.width(), self.height(), x, y) {
            if let CellState::Revealed(n) = self.grid.get(nx, ny) {
                if n > 0 {
                    self.grid.set(nx, ny, CellState::Revealed(n - 1));
                }
            }
        }
    }

    /// Map signed protocol coordinates to in-range grid coordinates.
    fn cell_at(&self, x: i32, y: i32) -> Option<(usize, usize)> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width() || y >= self.height() {
            return None;
        }
        Some((x, y))
    }

    fn check_invariants(&self) {
        let total = self.width() * self.height();
        assert!(self.width() > 0 && self.height() > 0, "board has zero dimension");
        assert!(
            self.bombs_remaining <= total,
            "bomb count {} exceeds cell count {}",
            self.bombs_remaining,
            total
        );
        assert_eq!(
            self.untouched + self.flagged + self.revealed,
            total,
            "cell counters out of sync with board size"
        );
        #[cfg(debug_assertions)]
        self.check_classification();
    }

    // Full per-cell audit, debug builds only.
    #[cfg(debug_assertions)]
    fn check_classification(&self) {
        let (mut untouched, mut flagged, mut revealed) = (0, 0, 0);
        for y in 0..self.height() {
            for x in 0..self.width() {
                match self.grid.get(x, y) {
                    CellState::Untouched => untouched += 1,
                    CellState::Flagged => flagged += 1,
                    CellState::Revealed(n) => {
                        revealed += 1;
                        assert!(n <= 8, "neighbor count {n} out of range at ({x}, {y})");
                        assert!(
                            !self.grid.has_bomb(x, y),
                            "revealed cell ({x}, {y}) still holds a bomb"
                        );
                    }
                }
            }
        }
        assert_eq!(untouched, self.untouched, "untouched counter drifted");
        assert_eq!(flagged, self.flagged, "flagged counter drifted");
        assert_eq!(revealed, self.revealed, "revealed counter drifted");
    }
}

/// The shared board behind its mutex: the synchronization boundary every
/// session goes through. No other component reads or writes grid cells
/// directly.
///
/// None of the operations await while the guard is held; the lock is
/// taken, the synchronous board operation runs to completion (cascade
/// included), and the guard drops before the caller touches the network
/// again.
#[derive(Debug)]
pub struct BoardEngine {
    board: Mutex<Board>,
}

impl BoardEngine {
    /// Wrap a board in its lock.
    pub fn new(board: Board) -> Self {
        Self {
            board: Mutex::new(board),
        }
    }

    /// Flag a cell. See [`Board::flag`].
    pub async fn flag(&self, x: i32, y: i32) {
        self.board.lock().await.flag(x, y);
    }

    /// Remove a flag. See [`Board::deflag`].
    pub async fn deflag(&self, x: i32, y: i32) {
        self.board.lock().await.deflag(x, y);
    }

    /// Reveal a cell. See [`Board::reveal`].
    pub async fn reveal(&self, x: i32, y: i32) -> RevealOutcome {
        self.board.lock().await.reveal(x, y)
    }

    /// Snapshot the board as protocol text.
    pub async fn render(&self) -> String {
        self.board.lock().await.render()
    }

    /// Board width in columns.
    pub async fn width(&self) -> usize {
        self.board.lock().await.width()
    }

    /// Board height in rows.
    pub async fn height(&self) -> usize {
        self.board.lock().await.height()
    }

    /// Bombs not yet consumed.
    pub async fn bomb_count(&self) -> usize {
        self.board.lock().await.bomb_count()
    }

    /// Currently flagged cells.
    pub async fn flagged_count(&self) -> usize {
        self.board.lock().await.flagged_count()
    }

    /// Cells neither revealed nor flagged.
    pub async fn untouched_count(&self) -> usize {
        self.board.lock().await.untouched_count()
    }
}

/// In-range members of the 8-neighborhood of `(x, y)`, clipped at the
/// board edges. Edge and corner cells simply yield fewer neighbors.
fn neighbors(
    width: usize,
    height: usize,
    x: usize,
    y: usize,
) -> impl Iterator<Item = (usize, usize)> {
    let mut out = Vec::with_capacity(8);
    for dy in -1i64..=1 {
        for dx in -1i64..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            if nx >= 0 && ny >= 0 && (nx as usize) < width && (ny as usize) < height {
                out.push((nx as usize, ny as usize));
            }
        }
    }
    out.into_iter()
}

//! Cell Grid Storage
//!
//! Dense 2-D array of cell states plus a parallel bomb mask. Pure data:
//! no locking and no bounds checking of its own. Callers (the board
//! engine) validate coordinates before touching the grid, which keeps the
//! flood-fill inner loop free of redundant range checks.

/// Visible state of one board cell.
///
/// Bomb presence is tracked separately in the grid's bomb mask, so a
/// revealed cell can never be confused with a bomb-bearing one: bombs are
/// consumed on reveal and the cell is re-classified as `Revealed(n)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellState {
    /// Neither revealed nor flagged.
    Untouched,
    /// Marked by a player as a suspected bomb; protected from reveal.
    Flagged,
    /// Revealed, carrying the bomb count of its neighbors at reveal time.
    Revealed(u8),
}

/// Dense `width x height` grid of cell states and bomb locations.
///
/// Row-major storage indexed as `y * width + x`. Coordinates passed to
/// the accessors must already be in range; that is a precondition, not a
/// re-validated check.
#[derive(Clone, Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<CellState>,
    bombs: Vec<bool>,
}

impl Grid {
    /// Create a grid with every cell untouched and bomb-free.
    pub fn new(width: usize, height: usize) -> Self {
        let total = width * height;
        Self {
            width,
            height,
            cells: vec![CellState::Untouched; total],
            bombs: vec![false; total],
        }
    }

    /// Grid width in columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Current state of the cell at `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> CellState {
        self.cells[self.index(x, y)]
    }

    /// Overwrite the state of the cell at `(x, y)`.
    pub fn set(&mut self, x: usize, y: usize, state: CellState) {
        let i = self.index(x, y);
        self.cells[i] = state;
    }

    /// Whether the cell at `(x, y)` currently holds a bomb.
    pub fn has_bomb(&self, x: usize, y: usize) -> bool {
        self.bombs[self.index(x, y)]
    }

    /// Place a bomb at `(x, y)`. Used only during board construction.
    pub fn plant_bomb(&mut self, x: usize, y: usize) {
        let i = self.index(x, y);
        self.bombs[i] = true;
    }

    /// Remove the bomb at `(x, y)`. Bombs are never re-planted.
    pub fn clear_bomb(&mut self, x: usize, y: usize) {
        let i = self.index(x, y);
        self.bombs[i] = false;
    }

    /// Total number of bombs currently in the mask.
    pub fn bomb_total(&self) -> usize {
        self.bombs.iter().filter(|&&b| b).count()
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y * self.width + x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_untouched_and_bomb_free() {
        let grid = Grid::new(3, 2);
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(grid.get(x, y), CellState::Untouched);
                assert!(!grid.has_bomb(x, y));
            }
        }
        assert_eq!(grid.bomb_total(), 0);
    }

    #[test]
    fn test_set_and_get_round_trip() {
        let mut grid = Grid::new(4, 4);
        grid.set(2, 3, CellState::Flagged);
        grid.set(0, 0, CellState::Revealed(5));

        assert_eq!(grid.get(2, 3), CellState::Flagged);
        assert_eq!(grid.get(0, 0), CellState::Revealed(5));
        assert_eq!(grid.get(1, 1), CellState::Untouched);
    }

    #[test]
    fn test_plant_and_clear_bomb() {
        let mut grid = Grid::new(2, 2);
        grid.plant_bomb(1, 0);
        assert!(grid.has_bomb(1, 0));
        assert_eq!(grid.bomb_total(), 1);

        grid.clear_bomb(1, 0);
        assert!(!grid.has_bomb(1, 0));
        assert_eq!(grid.bomb_total(), 0);
    }

    #[test]
    fn test_bomb_mask_independent_of_cell_state() {
        let mut grid = Grid::new(2, 2);
        grid.plant_bomb(0, 1);
        grid.set(0, 1, CellState::Flagged);
        assert!(grid.has_bomb(0, 1));
        assert_eq!(grid.get(0, 1), CellState::Flagged);
    }
}

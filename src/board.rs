//! Playfield: fixed 10x20 grid of locked cells.

use crate::piece::CellColor;
use std::collections::VecDeque;

/// Board width in cells.
pub const BOARD_WIDTH: usize = 10;
/// Board height in cells.
pub const BOARD_HEIGHT: usize = 20;

/// Single cell: empty, or the colour of the piece that locked into it.
pub type Cell = Option<CellColor>;

/// Locked cells. y=0 is top; rows are stored [0..height].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// rows[y][x] = cell. rows[0] is top.
    rows: VecDeque<[Cell; BOARD_WIDTH]>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self {
            rows: (0..BOARD_HEIGHT).map(|_| [None; BOARD_WIDTH]).collect(),
        }
    }

    /// x in [0, W) and y < H. There is no lower bound on y: the space above
    /// the board is legal.
    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < BOARD_WIDTH as i32 && y < BOARD_HEIGHT as i32
    }

    /// True iff y >= 0 and the cell holds a locked colour.
    #[inline]
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        y >= 0 && self.get(x, y).is_some_and(|cell| cell.is_some())
    }

    /// Cell at (x, y); None when outside the visible grid.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        if x < 0 || y < 0 {
            return None;
        }
        self.rows
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .copied()
    }

    /// Write a locked colour. Cells outside the visible grid are ignored.
    #[inline]
    pub fn lock_color(&mut self, x: i32, y: i32, color: CellColor) {
        if x < 0 || y < 0 {
            return;
        }
        if let Some(cell) = self
            .rows
            .get_mut(y as usize)
            .and_then(|row| row.get_mut(x as usize))
        {
            *cell = Some(color);
        }
    }

    pub fn is_row_full(&self, y: usize) -> bool {
        self.rows
            .get(y)
            .is_some_and(|row| row.iter().all(Option::is_some))
    }

    /// Remove every full row and push an empty row on top for each one.
    /// Returns the number of rows removed.
    pub fn clear_full_rows(&mut self) -> usize {
        let full: Vec<usize> = (0..BOARD_HEIGHT).filter(|&y| self.is_row_full(y)).collect();
        // Scanned top-to-bottom; each removal plus top insert leaves the
        // indices of the rows further down unchanged.
        for &y in &full {
            self.rows.remove(y);
            self.rows.push_front([None; BOARD_WIDTH]);
        }
        full.len()
    }

    /// Empty every cell.
    pub fn clear(&mut self) {
        for row in &mut self.rows {
            *row = [None; BOARD_WIDTH];
        }
    }

    /// Rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell; BOARD_WIDTH]> {
        self.rows.iter()
    }

    /// Build a board from rows top to bottom; None unless exactly H rows.
    pub fn from_rows(rows: Vec<[Cell; BOARD_WIDTH]>) -> Option<Self> {
        (rows.len() == BOARD_HEIGHT).then(|| Self { rows: rows.into() })
    }
}

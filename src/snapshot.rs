//! Immutable view of the engine for presentation, fixtures and tests.
//!
//! Serialized as JSON: the board is a 2D array of nullable colours
//! (`null` or `"cyan"`, `"red"`, ...), the piece is its kind, rotation
//! index and anchor.

use crate::board::{BOARD_HEIGHT, BOARD_WIDTH, Board, Cell};
use crate::game::GameEngine;
use crate::piece::{CellColor, Piece, PieceKind};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceSnapshot {
    pub kind: PieceKind,
    /// Clockwise quarter turns from the spawn orientation (0..4).
    pub rotation: u8,
    pub x: i32,
    pub y: i32,
    /// Absolute cells, derived from the fields above.
    #[serde(skip)]
    pub cells: Vec<(i32, i32)>,
}

impl PieceSnapshot {
    pub fn color(&self) -> CellColor {
        self.kind.color()
    }

    fn to_piece(&self) -> Piece {
        let mut piece = Piece::new(self.kind);
        for _ in 0..self.rotation % 4 {
            piece.rotate();
        }
        piece.x = self.x;
        piece.y = self.y;
        piece
    }
}

impl From<&Piece> for PieceSnapshot {
    fn from(piece: &Piece) -> Self {
        Self {
            kind: piece.kind(),
            rotation: piece.rotation(),
            x: piece.x,
            y: piece.y,
            cells: piece.cells(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// rows[y][x], top row first.
    pub board: Vec<Vec<Cell>>,
    pub current: Option<PieceSnapshot>,
    pub next: Option<PieceKind>,
    pub score: u32,
    pub level: u32,
    pub lines_cleared: u32,
    pub game_over: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("board has {0} rows")]
    Height(usize),
    #[error("board row {row} has {len} cells")]
    Width { row: usize, len: usize },
    #[error("level must be at least 1")]
    Level,
}

impl GameEngine {
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            board: self.board.rows().map(|row| row.to_vec()).collect(),
            current: self.current.as_ref().map(PieceSnapshot::from),
            next: self.next.as_ref().map(Piece::kind),
            score: self.score,
            level: self.level,
            lines_cleared: self.lines_cleared,
            game_over: self.game_over,
        }
    }

    /// Rebuild an engine from a snapshot (fixtures). Future pieces are random.
    #[allow(dead_code)]
    pub fn restore(snapshot: &GameSnapshot) -> Result<Self, SnapshotError> {
        if snapshot.board.len() != BOARD_HEIGHT {
            return Err(SnapshotError::Height(snapshot.board.len()));
        }
        if snapshot.level == 0 {
            return Err(SnapshotError::Level);
        }
        let mut rows = Vec::with_capacity(BOARD_HEIGHT);
        for (row, cells) in snapshot.board.iter().enumerate() {
            let cells: [Cell; BOARD_WIDTH] =
                cells.as_slice().try_into().map_err(|_| SnapshotError::Width {
                    row,
                    len: cells.len(),
                })?;
            rows.push(cells);
        }
        let board = Board::from_rows(rows).ok_or(SnapshotError::Height(snapshot.board.len()))?;
        let current = snapshot.current.as_ref().map(PieceSnapshot::to_piece);
        let next = snapshot.next.map(Piece::new);
        let mut engine = Self::from_parts(board, current, next, StdRng::from_entropy());
        engine.score = snapshot.score;
        engine.level = snapshot.level;
        engine.lines_cleared = snapshot.lines_cleared;
        engine.game_over = snapshot.game_over;
        Ok(engine)
    }
}

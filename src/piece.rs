//! Tetromino catalog (shapes, colours) and the falling piece.

use crate::board::BOARD_WIDTH;
use serde::{Deserialize, Serialize};

/// Tetromino kinds (I, O, T, S, Z, J, L).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    pub const ALL: [Self; 7] = [Self::I, Self::O, Self::T, Self::S, Self::Z, Self::J, Self::L];

    /// Spawn orientation, row-major; 1 = filled.
    pub fn spawn_shape(&self) -> &'static [&'static [u8]] {
        match self {
            Self::I => &[&[1, 1, 1, 1]],
            Self::O => &[&[1, 1], &[1, 1]],
            Self::T => &[&[0, 1, 0], &[1, 1, 1]],
            Self::S => &[&[0, 1, 1], &[1, 1, 0]],
            Self::Z => &[&[1, 1, 0], &[0, 1, 1]],
            Self::J => &[&[1, 0, 0], &[1, 1, 1]],
            Self::L => &[&[0, 0, 1], &[1, 1, 1]],
        }
    }

    pub fn color(&self) -> CellColor {
        match self {
            Self::I => CellColor::Cyan,
            Self::O => CellColor::Yellow,
            Self::T => CellColor::Purple,
            Self::S => CellColor::Green,
            Self::Z => CellColor::Red,
            Self::J => CellColor::Blue,
            Self::L => CellColor::Orange,
        }
    }
}

/// Colour of a locked cell; one per piece kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellColor {
    Cyan,
    Yellow,
    Purple,
    Green,
    Red,
    Blue,
    Orange,
}

impl CellColor {
    /// Default hex value used by the terminal theme.
    pub fn hex(&self) -> &'static str {
        match self {
            Self::Cyan => "#00f0f0",
            Self::Yellow => "#f0f000",
            Self::Purple => "#a000f0",
            Self::Green => "#00f000",
            Self::Red => "#f00000",
            Self::Blue => "#0000f0",
            Self::Orange => "#f0a000",
        }
    }

    /// Theme key for overriding this colour (`theme[piece_cyan]="#..."`).
    pub fn theme_key(&self) -> &'static str {
        match self {
            Self::Cyan => "piece_cyan",
            Self::Yellow => "piece_yellow",
            Self::Purple => "piece_purple",
            Self::Green => "piece_green",
            Self::Red => "piece_red",
            Self::Blue => "piece_blue",
            Self::Orange => "piece_orange",
        }
    }
}

/// Falling piece: shape matrix in its current orientation plus the top-left
/// anchor of the matrix on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    kind: PieceKind,
    shape: Vec<Vec<bool>>,
    /// Clockwise quarter turns applied since spawn, mod 4.
    rotation: u8,
    pub x: i32,
    pub y: i32,
}

impl Piece {
    /// New piece at its spawn position: horizontally centred, y = 0.
    pub fn new(kind: PieceKind) -> Self {
        let shape: Vec<Vec<bool>> = kind
            .spawn_shape()
            .iter()
            .map(|row| row.iter().map(|&c| c != 0).collect())
            .collect();
        let width = shape.first().map_or(0, Vec::len) as i32;
        Self {
            kind,
            shape,
            rotation: 0,
            x: BOARD_WIDTH as i32 / 2 - width / 2,
            y: 0,
        }
    }

    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    pub fn color(&self) -> CellColor {
        self.kind.color()
    }

    pub fn shape(&self) -> &[Vec<bool>] {
        &self.shape
    }

    pub fn rotation(&self) -> u8 {
        self.rotation
    }

    /// Rotate 90° clockwise in place: reverse the rows, then transpose.
    /// No collision check here.
    pub fn rotate(&mut self) {
        let rows = self.shape.len();
        let cols = self.shape.first().map_or(0, Vec::len);
        self.shape = (0..cols)
            .map(|i| (0..rows).map(|j| self.shape[rows - 1 - j][i]).collect())
            .collect();
        self.rotation = (self.rotation + 1) % 4;
    }

    /// Absolute board coordinates (x, y) of every filled cell.
    pub fn cells(&self) -> Vec<(i32, i32)> {
        self.cells_offset(0, 0)
    }

    /// Same as [`Piece::cells`] with the anchor shifted by (dx, dy).
    pub fn cells_offset(&self, dx: i32, dy: i32) -> Vec<(i32, i32)> {
        let mut out = Vec::with_capacity(4);
        for (row_idx, row) in self.shape.iter().enumerate() {
            for (col_idx, &filled) in row.iter().enumerate() {
                if filled {
                    out.push((self.x + dx + col_idx as i32, self.y + dy + row_idx as i32));
                }
            }
        }
        out
    }

    /// Restore a previously saved orientation (used to roll back a rejected rotation).
    pub(crate) fn set_orientation(&mut self, shape: Vec<Vec<bool>>, rotation: u8) {
        self.shape = shape;
        self.rotation = rotation % 4;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_four_cells() {
        for kind in PieceKind::ALL {
            assert_eq!(Piece::new(kind).cells().len(), 4, "{kind:?}");
        }
    }

    #[test]
    fn test_spawn_is_centred_at_top() {
        let i = Piece::new(PieceKind::I);
        assert_eq!((i.x, i.y), (3, 0));
        let o = Piece::new(PieceKind::O);
        assert_eq!((o.x, o.y), (4, 0));
        let t = Piece::new(PieceKind::T);
        assert_eq!((t.x, t.y), (4, 0));
    }

    #[test]
    fn test_rotate_i_goes_vertical() {
        let mut p = Piece::new(PieceKind::I);
        p.rotate();
        assert_eq!(p.shape().len(), 4);
        assert!(p.shape().iter().all(|row| row.len() == 1 && row[0]));
        assert_eq!(p.rotation(), 1);
    }

    #[test]
    fn test_rotate_t_clockwise() {
        let mut p = Piece::new(PieceKind::T);
        p.rotate();
        let expected = vec![
            vec![true, false],
            vec![true, true],
            vec![true, false],
        ];
        assert_eq!(p.shape(), expected.as_slice());
    }

    #[test]
    fn test_four_rotations_restore_shape() {
        for kind in PieceKind::ALL {
            let original = Piece::new(kind);
            let mut p = original.clone();
            for _ in 0..4 {
                p.rotate();
            }
            assert_eq!(p, original, "{kind:?}");
        }
    }

    #[test]
    fn test_o_rotation_keeps_shape() {
        let mut p = Piece::new(PieceKind::O);
        let before = p.shape().to_vec();
        p.rotate();
        assert_eq!(p.shape(), before.as_slice());
    }

    #[test]
    fn test_cells_follow_anchor() {
        let mut p = Piece::new(PieceKind::S);
        p.x = 0;
        p.y = 5;
        let mut cells = p.cells();
        cells.sort_unstable();
        assert_eq!(cells, vec![(0, 6), (1, 5), (1, 6), (2, 5)]);
        assert_eq!(p.cells_offset(1, -1)[0], (2, 4));
    }

    #[test]
    fn test_colors_are_distinct() {
        let colors: std::collections::HashSet<_> =
            PieceKind::ALL.iter().map(PieceKind::color).collect();
        assert_eq!(colors.len(), 7);
    }
}

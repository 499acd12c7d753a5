//! Game engine: board, current and next piece, score, level, line clear, gravity.

use crate::board::Board;
use crate::piece::{Piece, PieceKind};
use crate::scoring;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Engine phase. Lock processing is internal to a single call and never observable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Active,
    GameOver,
}

/// Result of locking the current piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LockReport {
    pub rows_cleared: usize,
    pub points: u32,
    pub leveled_up: bool,
    /// The piece spawned after the lock collided.
    pub game_over: bool,
}

/// Result of one gravity tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    Moved,
    Locked(LockReport),
    /// No active piece (game over); nothing changed.
    Idle,
}

/// Game state: board, current piece, queued next piece, score, level, lines.
///
/// All mutation goes through the methods below; presentation reads
/// [`GameEngine::snapshot`](crate::snapshot) or the accessors.
#[derive(Debug, Clone)]
pub struct GameEngine {
    pub(crate) board: Board,
    pub(crate) current: Option<Piece>,
    pub(crate) next: Option<Piece>,
    pub(crate) score: u32,
    pub(crate) level: u32,
    pub(crate) lines_cleared: u32,
    pub(crate) game_over: bool,
    rng: StdRng,
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GameEngine {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Engine with a deterministic piece sequence.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        let mut engine = Self::from_parts(Board::new(), None, None, rng);
        engine.spawn_piece();
        engine.spawn_next_piece();
        engine
    }

    /// Engine over existing state; score 0, level 1, nothing spawned.
    pub(crate) fn from_parts(
        board: Board,
        current: Option<Piece>,
        next: Option<Piece>,
        rng: StdRng,
    ) -> Self {
        Self {
            board,
            current,
            next,
            score: 0,
            level: 1,
            lines_cleared: 0,
            game_over: false,
            rng,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current(&self) -> Option<&Piece> {
        self.current.as_ref()
    }

    pub fn next(&self) -> Option<&Piece> {
        self.next.as_ref()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lines_cleared(&self) -> u32 {
        self.lines_cleared
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn phase(&self) -> Phase {
        if self.game_over {
            Phase::GameOver
        } else {
            Phase::Active
        }
    }

    /// Promote the queued piece (or a fresh random one) to current.
    /// If it collides where it spawns, the game is over and the piece is dropped.
    pub fn spawn_piece(&mut self) {
        let piece = match self.next.take() {
            Some(p) => p,
            None => Piece::new(self.random_kind()),
        };
        if self.is_valid_position(&piece, 0, 0) {
            self.current = Some(piece);
        } else {
            info!(
                "game over: {:?} cannot spawn (score {}, level {}, lines {})",
                piece.kind(),
                self.score,
                self.level,
                self.lines_cleared
            );
            self.current = None;
            self.game_over = true;
        }
    }

    /// Queue a uniformly random piece. No bag: repeats are possible.
    pub fn spawn_next_piece(&mut self) {
        let kind = self.random_kind();
        self.next = Some(Piece::new(kind));
    }

    fn random_kind(&mut self) -> PieceKind {
        PieceKind::ALL[self.rng.gen_range(0..PieceKind::ALL.len())]
    }

    /// True iff every cell of `piece` shifted by (dx, dy) is inside the
    /// board (above the top is allowed) and not on a locked cell.
    pub fn is_valid_position(&self, piece: &Piece, dx: i32, dy: i32) -> bool {
        piece
            .cells_offset(dx, dy)
            .into_iter()
            .all(|(x, y)| self.board.in_bounds(x, y) && !self.board.is_occupied(x, y))
    }

    /// Shift the current piece if the target position is valid.
    pub fn move_piece(&mut self, dx: i32, dy: i32) -> bool {
        if self.game_over {
            return false;
        }
        let valid = match self.current.as_ref() {
            Some(piece) => self.is_valid_position(piece, dx, dy),
            None => false,
        };
        if valid {
            if let Some(piece) = self.current.as_mut() {
                piece.x += dx;
                piece.y += dy;
            }
        }
        valid
    }

    /// Rotate clockwise in place; roll back if the result collides. No kicks.
    pub fn rotate_piece(&mut self) -> bool {
        if self.game_over {
            return false;
        }
        let Some(mut piece) = self.current.take() else {
            return false;
        };
        let saved_shape = piece.shape().to_vec();
        let saved_rotation = piece.rotation();
        piece.rotate();
        let valid = self.is_valid_position(&piece, 0, 0);
        if !valid {
            piece.set_orientation(saved_shape, saved_rotation);
        }
        self.current = Some(piece);
        valid
    }

    /// Merge the current piece into the board, clear rows, score, then spawn
    /// the queued piece and queue a new one.
    pub fn lock_piece(&mut self) -> Option<LockReport> {
        let piece = self.current.take()?;
        let color = piece.color();
        for (x, y) in piece.cells() {
            if y >= 0 {
                self.board.lock_color(x, y, color);
            }
        }

        let rows = self.board.clear_full_rows();
        let mut report = LockReport {
            rows_cleared: rows,
            ..LockReport::default()
        };
        if rows > 0 {
            report.points = scoring::line_clear_points(rows, self.level);
            self.score = self.score.saturating_add(report.points);
            self.lines_cleared += rows as u32;
            if scoring::should_level_up(self.lines_cleared, self.level) {
                self.level += 1;
                report.leveled_up = true;
                info!("level up: {} ({} lines)", self.level, self.lines_cleared);
            }
        }
        debug!(
            "locked {:?} at ({}, {}): {} rows, +{} points",
            piece.kind(),
            piece.x,
            piece.y,
            rows,
            report.points
        );

        self.spawn_piece();
        self.spawn_next_piece();
        report.game_over = self.game_over;
        Some(report)
    }

    /// Gravity tick: one row down, or lock if the piece cannot fall.
    pub fn drop_piece(&mut self) -> DropOutcome {
        if self.game_over || self.current.is_none() {
            return DropOutcome::Idle;
        }
        if self.move_piece(0, 1) {
            return DropOutcome::Moved;
        }
        match self.lock_piece() {
            Some(report) => DropOutcome::Locked(report),
            None => DropOutcome::Idle,
        }
    }

    /// Fall straight down as far as possible, then lock.
    pub fn hard_drop(&mut self) -> Option<LockReport> {
        if self.game_over {
            return None;
        }
        while self.move_piece(0, 1) {}
        self.lock_piece()
    }

    /// Empty the board and respawn pieces; score, level and lines are kept.
    pub fn reset_board(&mut self) {
        self.board.clear();
        self.game_over = false;
        self.spawn_piece();
        self.spawn_next_piece();
        info!(
            "board reset (score {}, level {}, lines {})",
            self.score, self.level, self.lines_cleared
        );
    }

    /// Halve the score, rounding down.
    pub fn reduce_score(&mut self) {
        self.score /= 2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{BOARD_HEIGHT, BOARD_WIDTH};
    use crate::piece::CellColor;

    fn engine_with(piece: Piece) -> GameEngine {
        let mut engine = GameEngine::with_seed(7);
        engine.current = Some(piece);
        engine
    }

    fn piece_at(kind: PieceKind, x: i32, y: i32) -> Piece {
        let mut p = Piece::new(kind);
        p.x = x;
        p.y = y;
        p
    }

    fn vertical_i(x: i32, y: i32) -> Piece {
        let mut p = piece_at(PieceKind::I, x, y);
        p.rotate();
        p
    }

    fn fill_row(engine: &mut GameEngine, y: i32, except: &[i32]) {
        for x in 0..BOARD_WIDTH as i32 {
            if !except.contains(&x) {
                engine.board.lock_color(x, y, CellColor::Red);
            }
        }
    }

    fn occupied_count(engine: &GameEngine) -> usize {
        engine
            .board
            .rows()
            .map(|row| row.iter().filter(|c| c.is_some()).count())
            .sum()
    }

    #[test]
    fn test_new_engine_has_current_and_next() {
        let engine = GameEngine::with_seed(1);
        assert!(engine.current().is_some());
        assert!(engine.next().is_some());
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.level(), 1);
        assert_eq!(engine.lines_cleared(), 0);
        assert_eq!(engine.phase(), Phase::Active);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = GameEngine::with_seed(42);
        let mut b = GameEngine::with_seed(42);
        for _ in 0..20 {
            assert_eq!(a.current().map(Piece::kind), b.current().map(Piece::kind));
            a.hard_drop();
            b.hard_drop();
        }
    }

    #[test]
    fn test_valid_position_bounds() {
        let engine = engine_with(piece_at(PieceKind::O, 0, 0));
        let piece = engine.current().cloned().unwrap();
        assert!(engine.is_valid_position(&piece, 0, 0));
        assert!(!engine.is_valid_position(&piece, -1, 0));
        assert!(engine.is_valid_position(&piece, 8, 0));
        assert!(!engine.is_valid_position(&piece, 9, 0));
        assert!(engine.is_valid_position(&piece, 0, 18));
        assert!(!engine.is_valid_position(&piece, 0, 19));
        // Above the top is unconstrained.
        assert!(engine.is_valid_position(&piece, 0, -5));
    }

    #[test]
    fn test_valid_position_overlap() {
        let mut engine = engine_with(piece_at(PieceKind::O, 4, 10));
        engine.board.lock_color(5, 12, CellColor::Blue);
        let piece = engine.current().cloned().unwrap();
        assert!(engine.is_valid_position(&piece, 0, 0));
        assert!(!engine.is_valid_position(&piece, 0, 1));
        assert!(!engine.is_valid_position(&piece, 1, 1));
        assert!(engine.is_valid_position(&piece, 2, 1));
    }

    #[test]
    fn test_move_piece_left_right_down() {
        let mut engine = engine_with(piece_at(PieceKind::T, 4, 0));
        assert!(engine.move_piece(-1, 0));
        assert!(engine.move_piece(1, 0));
        assert!(engine.move_piece(1, 0));
        assert!(engine.move_piece(0, 1));
        let p = engine.current().unwrap();
        assert_eq!((p.x, p.y), (5, 1));
    }

    #[test]
    fn test_move_into_wall_fails_without_mutation() {
        let mut engine = engine_with(piece_at(PieceKind::O, 0, 3));
        assert!(!engine.move_piece(-1, 0));
        let p = engine.current().unwrap();
        assert_eq!((p.x, p.y), (0, 3));
    }

    #[test]
    fn test_rotate_rejected_at_wall_restores_shape() {
        let mut engine = engine_with(vertical_i(9, 0));
        let before = engine.current().cloned().unwrap();
        assert!(!engine.rotate_piece());
        assert_eq!(engine.current(), Some(&before));
    }

    #[test]
    fn test_rotate_accepted_in_open_space() {
        let mut engine = engine_with(piece_at(PieceKind::I, 3, 5));
        assert!(engine.rotate_piece());
        let p = engine.current().unwrap();
        assert_eq!(p.rotation(), 1);
        assert_eq!(p.shape().len(), 4);
    }

    #[test]
    fn test_rotate_rejected_by_locked_cell() {
        let mut engine = engine_with(piece_at(PieceKind::I, 3, 5));
        engine.board.lock_color(3, 6, CellColor::Green);
        assert!(!engine.rotate_piece());
        assert_eq!(engine.current().unwrap().rotation(), 0);
    }

    #[test]
    fn test_hard_drop_i_lands_on_floor() {
        let mut engine = engine_with(piece_at(PieceKind::I, 3, 0));
        let next_kind = engine.next().unwrap().kind();
        let report = engine.hard_drop().unwrap();
        assert_eq!(report.rows_cleared, 0);
        for x in 3..7 {
            assert_eq!(engine.board.get(x, 19), Some(Some(CellColor::Cyan)));
        }
        assert_eq!(occupied_count(&engine), 4);
        let current = engine.current().unwrap();
        assert_eq!(current.kind(), next_kind);
        assert_eq!(current.y, 0);
        assert!(engine.next().is_some());
    }

    #[test]
    fn test_hard_drop_stops_on_stack() {
        let mut engine = engine_with(piece_at(PieceKind::O, 0, 0));
        engine.board.lock_color(0, 15, CellColor::Red);
        engine.hard_drop();
        assert!(engine.board.is_occupied(0, 14));
        assert!(engine.board.is_occupied(1, 13));
        assert!(!engine.board.is_occupied(0, 16));
    }

    #[test]
    fn test_drop_piece_moves_then_locks() {
        let mut engine = engine_with(piece_at(PieceKind::O, 4, 17));
        assert_eq!(engine.drop_piece(), DropOutcome::Moved);
        match engine.drop_piece() {
            DropOutcome::Locked(report) => assert_eq!(report.rows_cleared, 0),
            other => panic!("expected lock, got {other:?}"),
        }
        assert!(engine.board.is_occupied(4, 19));
        assert!(engine.board.is_occupied(5, 18));
    }

    #[test]
    fn test_single_line_clear_scores_and_shifts() {
        let mut engine = engine_with(vertical_i(9, 0));
        fill_row(&mut engine, 19, &[9]);
        let report = engine.hard_drop().unwrap();
        assert_eq!(report.rows_cleared, 1);
        assert_eq!(report.points, 100);
        assert_eq!(engine.score(), 100);
        assert_eq!(engine.lines_cleared(), 1);
        assert_eq!(engine.board.rows().count(), BOARD_HEIGHT);
        // The three cells of the I above the cleared row fell by one.
        for y in 17..20 {
            assert!(engine.board.is_occupied(9, y));
        }
        assert!(!engine.board.is_occupied(9, 16));
        assert!(!engine.board.is_occupied(0, 19));
        assert_eq!(occupied_count(&engine), 3);
    }

    #[test]
    fn test_tetris_scores_800_times_level() {
        let mut engine = engine_with(vertical_i(0, 0));
        engine.level = 2;
        for y in 16..20 {
            fill_row(&mut engine, y, &[0]);
        }
        let report = engine.hard_drop().unwrap();
        assert_eq!(report.rows_cleared, 4);
        assert_eq!(engine.score(), 1600);
        assert_eq!(occupied_count(&engine), 0);
    }

    #[test]
    fn test_double_at_level_three() {
        let mut engine = engine_with(piece_at(PieceKind::O, 8, 0));
        engine.level = 3;
        fill_row(&mut engine, 19, &[8, 9]);
        fill_row(&mut engine, 18, &[8, 9]);
        engine.hard_drop();
        assert_eq!(engine.score(), 900);
        assert_eq!(engine.lines_cleared(), 2);
    }

    #[test]
    fn test_no_clear_no_points() {
        let mut engine = engine_with(piece_at(PieceKind::T, 4, 0));
        let report = engine.hard_drop().unwrap();
        assert_eq!(report, LockReport::default());
        assert_eq!(engine.score(), 0);
    }

    #[test]
    fn test_level_up_at_ten_lines() {
        let mut engine = engine_with(vertical_i(9, 0));
        engine.lines_cleared = 9;
        fill_row(&mut engine, 19, &[9]);
        let report = engine.hard_drop().unwrap();
        assert!(report.leveled_up);
        assert_eq!(engine.lines_cleared(), 10);
        assert_eq!(engine.level(), 2);
    }

    #[test]
    fn test_one_level_per_lock() {
        let mut engine = engine_with(vertical_i(9, 0));
        engine.lines_cleared = 19;
        fill_row(&mut engine, 19, &[9]);
        engine.hard_drop();
        assert_eq!(engine.lines_cleared(), 20);
        assert_eq!(engine.level(), 2);
    }

    #[test]
    fn test_spawn_collision_is_game_over() {
        let mut engine = GameEngine::with_seed(3);
        engine.current = None;
        fill_row(&mut engine, 0, &[]);
        fill_row(&mut engine, 1, &[]);
        let before = engine.board.clone();
        engine.spawn_piece();
        assert!(engine.is_game_over());
        assert_eq!(engine.phase(), Phase::GameOver);
        assert!(engine.current().is_none());
        assert_eq!(engine.board, before);
    }

    #[test]
    fn test_lock_into_full_stack_ends_game() {
        // Every spawn shape touches (4..=5, 0..=1), where this O locks.
        let mut engine = engine_with(piece_at(PieceKind::O, 4, 0));
        for y in 2..20 {
            fill_row(&mut engine, y, &[9]);
        }
        let report = engine.hard_drop().unwrap();
        assert_eq!(report.rows_cleared, 0);
        assert!(report.game_over);
        assert!(engine.is_game_over());
    }

    #[test]
    fn test_mutators_are_noops_after_game_over() {
        let mut engine = GameEngine::with_seed(5);
        fill_row(&mut engine, 0, &[]);
        engine.current = None;
        engine.spawn_piece();
        assert!(engine.is_game_over());
        let before = engine.board.clone();
        assert!(!engine.move_piece(1, 0));
        assert!(!engine.rotate_piece());
        assert_eq!(engine.drop_piece(), DropOutcome::Idle);
        assert!(engine.hard_drop().is_none());
        assert!(engine.hard_drop().is_none());
        assert_eq!(engine.board, before);
        assert_eq!(engine.score(), 0);
    }

    #[test]
    fn test_reset_board_keeps_progress() {
        let mut engine = GameEngine::with_seed(9);
        engine.score = 1234;
        engine.level = 4;
        engine.lines_cleared = 33;
        fill_row(&mut engine, 0, &[]);
        engine.current = None;
        engine.spawn_piece();
        assert!(engine.is_game_over());

        engine.reset_board();
        assert!(!engine.is_game_over());
        assert_eq!(occupied_count(&engine), 0);
        assert!(engine.current().is_some());
        assert!(engine.next().is_some());
        assert_eq!(engine.score(), 1234);
        assert_eq!(engine.level(), 4);
        assert_eq!(engine.lines_cleared(), 33);
    }

    #[test]
    fn test_reduce_score_floors() {
        let mut engine = GameEngine::with_seed(0);
        engine.score = 101;
        engine.reduce_score();
        assert_eq!(engine.score(), 50);
        engine.score = 0;
        engine.reduce_score();
        assert_eq!(engine.score(), 0);
    }
}

//! Layout and drawing: menu, playfield, next preview, sidebar, pause, trivia,
//! game over and leaderboard. Everything is drawn from a [`View`].

use crate::app::{LeaderboardRows, MenuItem, Screen, TriviaState};
use crate::board::{BOARD_HEIGHT, BOARD_WIDTH};
use crate::continuation::{FinalResult, Verdict};
use crate::game::LockReport;
use crate::piece::PieceKind;
use crate::snapshot::GameSnapshot;
use crate::theme::Theme;
use crate::trivia::Answer;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget, Wrap};
use std::time::Instant;
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer};

/// Each board cell is two terminal columns wide.
const CELL_W: u16 = 2;
const SIDEBAR_WIDTH: u16 = 22;
/// Board plus border, in terminal cells.
const PLAYFIELD_W: u16 = BOARD_WIDTH as u16 * CELL_W + 2;
const PLAYFIELD_H: u16 = BOARD_HEIGHT as u16 + 2;

/// Everything a frame needs. Built by the app each frame.
pub struct View<'a> {
    pub screen: Screen,
    pub snapshot: &'a GameSnapshot,
    pub theme: &'a Theme,
    pub player: &'a str,
    pub paused: bool,
    pub menu_selected: MenuItem,
    pub last_lock: Option<LockReport>,
    pub trivia: Option<&'a TriviaState>,
    pub final_result: Option<FinalResult>,
    pub leaderboard_rows: &'a LeaderboardRows,
    pub now: Instant,
}

/// Draw the current screen. When `fade` is set, the fade-in is processed over
/// the whole frame and `fade_process_time` is updated.
pub fn draw(
    frame: &mut Frame,
    view: &View,
    fade: &mut Option<Effect>,
    fade_process_time: &mut Option<Instant>,
) {
    let area = frame.area();
    Block::default()
        .style(Style::default().bg(view.theme.bg))
        .render(area, frame.buffer_mut());

    match view.screen {
        Screen::Menu => draw_menu(frame, view, area),
        Screen::Playing => {
            draw_game(frame, view, area);
            if view.paused {
                draw_pause_overlay(frame, view.theme, area);
            }
        }
        Screen::Trivia => {
            draw_game(frame, view, area);
            if let Some(trivia) = view.trivia {
                draw_trivia(frame, view, trivia, area);
            }
        }
        Screen::GameOver => draw_game_over(frame, view, area),
        Screen::Leaderboard => draw_leaderboard(frame, view, area),
    }

    if let Some(effect) = fade {
        let delta = fade_process_time
            .map(|t| view.now.saturating_duration_since(t))
            .unwrap_or(std::time::Duration::ZERO);
        let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
        *fade_process_time = Some(view.now);
        frame.render_effect(effect, area, TfxDuration::from_millis(delta_ms));
    }
}

/// Centered rect of at most `width` x `height` inside `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn popup_block(theme: &Theme, title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(theme.title),
        ))
}

fn draw_menu(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "T E T R I V I A",
            Style::default()
                .fg(theme.title)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("Player: {}", view.player),
            Style::default().fg(theme.inactive_fg),
        )),
        Line::from(""),
    ];
    for item in MenuItem::ALL {
        let label = match item {
            MenuItem::Play => "Play",
            MenuItem::Leaderboard => "Leaderboard",
            MenuItem::Quit => "Quit",
        };
        let line = if item == view.menu_selected {
            Line::from(Span::styled(
                format!("> {label} <"),
                Style::default()
                    .fg(theme.bg)
                    .bg(theme.title)
                    .add_modifier(Modifier::BOLD),
            ))
        } else {
            Line::from(Span::styled(label, Style::default().fg(theme.main_fg)))
        };
        lines.push(line);
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Up/Down select   Enter confirm   Q quit",
        Style::default().fg(theme.inactive_fg),
    )));

    let popup = centered(area, 46, lines.len() as u16 + 2);
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(popup_block(theme, "Menu"))
        .render(popup, frame.buffer_mut());
}

/// Playfield + sidebar, centered in `area`.
fn draw_game(frame: &mut Frame, view: &View, area: Rect) {
    let active = centered(area, PLAYFIELD_W + SIDEBAR_WIDTH, PLAYFIELD_H);
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(PLAYFIELD_W),
            Constraint::Length(SIDEBAR_WIDTH),
        ])
        .split(active);
    draw_playfield(frame, view, chunks[0]);
    draw_sidebar(frame, view, chunks[1]);
}

fn draw_playfield(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let buf = frame.buffer_mut();
    let mut paint = |x: i32, y: i32, symbol: &str, fg: Color| {
        if x < 0 || y < 0 {
            return;
        }
        let rx = inner.x + x as u16 * CELL_W;
        let ry = inner.y + y as u16;
        if rx + CELL_W <= inner.x + inner.width && ry < inner.y + inner.height {
            buf.set_string(rx, ry, symbol, Style::default().fg(fg).bg(theme.bg));
        }
    };

    for (y, row) in view.snapshot.board.iter().enumerate() {
        for (x, cell) in row.iter().enumerate() {
            match cell {
                Some(color) => paint(x as i32, y as i32, "██", theme.piece_color(*color)),
                None => paint(x as i32, y as i32, " .", theme.div_line),
            }
        }
    }

    // Cells above the board (y < 0) are not drawn.
    if let Some(piece) = &view.snapshot.current {
        let color = theme.piece_color(piece.color());
        for &(x, y) in &piece.cells {
            paint(x, y, "██", color);
        }
    }
}

fn draw_sidebar(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Next (border + title + preview)
            Constraint::Length(1), // gap
            Constraint::Length(7), // Stats (border + player, score, level, lines)
            Constraint::Length(1), // gap
            Constraint::Min(4),    // Last lock + hints
        ])
        .split(area);

    // --- Next ---
    let next_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);
    let next_inner = next_block.inner(chunks[0]);
    next_block.render(chunks[0], frame.buffer_mut());
    let next_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(3)])
        .split(next_inner);
    Paragraph::new(Line::from(Span::styled("Next", title_style)))
        .render(next_layout[0], frame.buffer_mut());
    if let Some(kind) = view.snapshot.next {
        draw_next_preview(frame, theme, next_layout[1], kind);
    }

    // --- Stats ---
    let stats_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);
    let stats_inner = stats_block.inner(chunks[2]);
    stats_block.render(chunks[2], frame.buffer_mut());
    let stat = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(label, title_style),
            Span::styled(value, fg_style),
        ])
    };
    let stats_lines = vec![
        stat("Player: ", view.player.to_string()),
        stat("Score:  ", view.snapshot.score.to_string()),
        stat("Level:  ", view.snapshot.level.to_string()),
        stat("Lines:  ", view.snapshot.lines_cleared.to_string()),
    ];
    Paragraph::new(ratatui::text::Text::from(stats_lines)).render(stats_inner, frame.buffer_mut());

    // --- Last lock, controls ---
    let mut lines = Vec::new();
    if let Some(report) = view.last_lock.filter(|r| r.rows_cleared > 0) {
        lines.push(Line::from(Span::styled(
            format!("{} line(s) +{}", report.rows_cleared, report.points),
            Style::default()
                .fg(theme.title)
                .add_modifier(Modifier::BOLD),
        )));
        if report.leveled_up {
            lines.push(Line::from(Span::styled("Level up!", title_style)));
        }
    } else {
        lines.push(Line::from(""));
    }
    lines.push(Line::from(""));
    let hint = Style::default().fg(theme.inactive_fg);
    lines.push(Line::from(Span::styled("←→ move  ↑ rotate", hint)));
    lines.push(Line::from(Span::styled("↓ soft  Space hard", hint)));
    lines.push(Line::from(Span::styled("P pause  Q menu", hint)));
    Paragraph::new(lines).render(chunks[4], frame.buffer_mut());
}

/// Next piece in its spawn orientation, centered in `area`.
fn draw_next_preview(frame: &mut Frame, theme: &Theme, area: Rect, kind: PieceKind) {
    let shape = kind.spawn_shape();
    let rows = shape.len() as u16;
    let cols = shape.iter().map(|r| r.len()).max().unwrap_or(0) as u16;
    let off_x = area.width.saturating_sub(cols * CELL_W) / 2;
    let off_y = area.height.saturating_sub(rows) / 2;
    let color = theme.piece_color(kind.color());

    let buf = frame.buffer_mut();
    for (dy, row) in shape.iter().enumerate() {
        for (dx, &filled) in row.iter().enumerate() {
            if filled == 0 {
                continue;
            }
            let rx = area.x + off_x + dx as u16 * CELL_W;
            let ry = area.y + off_y + dy as u16;
            if rx + CELL_W <= area.x + area.width && ry < area.y + area.height {
                buf.set_string(rx, ry, "██", Style::default().fg(color).bg(theme.bg));
            }
        }
    }
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup = centered(area, 28, 5);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " P: Resume    Q: Menu ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}

fn draw_trivia(frame: &mut Frame, view: &View, trivia: &TriviaState, area: Rect) {
    let theme = view.theme;
    let question = &trivia.question;
    let mut lines = vec![
        Line::from(Span::styled(
            "Answer correctly to keep playing with half your score.",
            Style::default().fg(theme.inactive_fg),
        )),
        Line::from(""),
        Line::from(Span::styled(
            question.question.as_str(),
            Style::default()
                .fg(theme.main_fg)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    for answer in Answer::ALL {
        lines.push(Line::from(vec![
            Span::styled(format!("{}) ", answer.label()), Style::default().fg(theme.title)),
            Span::styled(question.option(answer), Style::default().fg(theme.main_fg)),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(match trivia.verdict {
        None => Line::from(Span::styled(
            "Press A-D or 1-4",
            Style::default().fg(theme.inactive_fg),
        )),
        Some((Verdict::Continue, _)) => Line::from(Span::styled(
            " Correct! Keep playing ",
            Style::default().fg(Color::Black).bg(Color::Green),
        )),
        Some((Verdict::Final, _)) => Line::from(Span::styled(
            format!(
                " Wrong ({} was right). Game over ",
                question.correct_answer.label()
            ),
            Style::default().fg(Color::White).bg(Color::Red),
        )),
    });

    let popup = centered(area, 60, lines.len() as u16 + 4);
    Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(popup_block(theme, "Second chance"))
        .render(popup, frame.buffer_mut());
}

fn draw_game_over(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let fg = Style::default().fg(theme.main_fg);
    let (score, level) = view
        .final_result
        .map_or((view.snapshot.score, view.snapshot.level), |r| {
            (r.score, r.level)
        });
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Game Over ",
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(format!(" Player: {} ", view.player), fg)),
        Line::from(Span::styled(format!(" Score: {score} "), fg)),
        Line::from(Span::styled(format!(" Level: {level} "), fg)),
        Line::from(Span::styled(
            format!(" Lines: {} ", view.snapshot.lines_cleared),
            fg,
        )),
    ];
    if view.final_result.is_some_and(|r| r.submitted) {
        lines.push(Line::from(Span::styled(
            " Score saved ",
            Style::default()
                .fg(theme.title)
                .add_modifier(Modifier::BOLD),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " Enter/Q: Menu ",
        Style::default().fg(theme.inactive_fg),
    )));
    lines.push(Line::from(""));

    let popup = centered(area, 36, lines.len() as u16 + 2);
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(popup_block(theme, "Tetrivia"))
        .render(popup, frame.buffer_mut());
}

fn draw_leaderboard(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let mut lines = vec![
        Line::from(Span::styled(
            format!("Best games of {}", view.player),
            Style::default().fg(theme.inactive_fg),
        )),
        Line::from(""),
    ];
    match view.leaderboard_rows {
        Ok(rows) if rows.is_empty() => {
            lines.push(Line::from(Span::styled(
                "No scores yet",
                Style::default().fg(theme.main_fg),
            )));
        }
        Ok(rows) => {
            lines.push(Line::from(Span::styled(
                format!("{:>3}  {:>8}  {:>5}", "#", "Score", "Level"),
                Style::default().fg(theme.title),
            )));
            for (i, record) in rows.iter().enumerate() {
                lines.push(Line::from(Span::styled(
                    format!("{:>3}  {:>8}  {:>5}", i + 1, record.score, record.level),
                    Style::default().fg(theme.main_fg),
                )));
            }
        }
        Err(message) => {
            lines.push(Line::from(Span::styled(
                message.as_str(),
                Style::default().fg(Color::Red),
            )));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Enter/Q: Menu",
        Style::default().fg(theme.inactive_fg),
    )));

    let popup = centered(area, 40, lines.len() as u16 + 2);
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(popup_block(theme, "Leaderboard"))
        .render(popup, frame.buffer_mut());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameEngine;
    use crate::leaderboard::ScoreRecord;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render(screen: Screen, rows: &LeaderboardRows) -> String {
        render_with(screen, rows, None)
    }

    fn render_with(screen: Screen, rows: &LeaderboardRows, trivia: Option<&TriviaState>) -> String {
        let engine = GameEngine::with_seed(5);
        let snapshot = engine.snapshot();
        let theme = Theme::default();
        let view = View {
            screen,
            snapshot: &snapshot,
            theme: &theme,
            player: "ana",
            paused: false,
            menu_selected: MenuItem::Play,
            last_lock: None,
            trivia,
            final_result: Some(FinalResult {
                score: 1200,
                level: 3,
                submitted: true,
            }),
            leaderboard_rows: rows,
            now: Instant::now(),
        };
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal
            .draw(|f| draw(f, &view, &mut None, &mut None))
            .unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_menu_lists_items() {
        let text = render(Screen::Menu, &Ok(Vec::new()));
        assert!(text.contains("> Play <"));
        assert!(text.contains("Leaderboard"));
        assert!(text.contains("Player: ana"));
    }

    #[test]
    fn test_playing_shows_stats_and_piece() {
        let text = render(Screen::Playing, &Ok(Vec::new()));
        assert!(text.contains("Score:  0"));
        assert!(text.contains("Level:  1"));
        assert!(text.contains("██"));
    }

    #[test]
    fn test_game_over_shows_final_result() {
        let text = render(Screen::GameOver, &Ok(Vec::new()));
        assert!(text.contains("Score: 1200"));
        assert!(text.contains("Score saved"));
    }

    #[test]
    fn test_leaderboard_lists_records() {
        let rows = Ok(vec![ScoreRecord {
            player: "ana".to_string(),
            score: 4321,
            level: 4,
            recorded_at: 0,
        }]);
        let text = render(Screen::Leaderboard, &rows);
        assert!(text.contains("4321"));
        assert!(text.contains("Best games of ana"));
    }

    #[test]
    fn test_leaderboard_error_message() {
        let rows = Err("Could not load scores".to_string());
        let text = render(Screen::Leaderboard, &rows);
        assert!(text.contains("Could not load scores"));
    }

    #[test]
    fn test_trivia_shows_options_and_verdict() {
        use crate::trivia::{BuiltinQuestionBank, QuestionBank};
        let question = BuiltinQuestionBank.all().unwrap().remove(0);
        let mut trivia = TriviaState {
            question: question.clone(),
            verdict: None,
        };
        let text = render_with(Screen::Trivia, &Ok(Vec::new()), Some(&trivia));
        assert!(text.contains("Second chance"));
        assert!(text.contains(&format!("A) {}", question.option_a)));
        assert!(text.contains("Press A-D or 1-4"));

        trivia.verdict = Some((Verdict::Continue, Instant::now()));
        let text = render_with(Screen::Trivia, &Ok(Vec::new()), Some(&trivia));
        assert!(text.contains("Correct! Keep playing"));
    }
}

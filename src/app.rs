//! App: terminal init, main loop, gravity ticks, intent handling and screens.

use crate::GameConfig;
use crate::continuation::{self, FinalResult, Offer, Verdict};
use crate::game::{DropOutcome, GameEngine, LockReport, Phase};
use crate::input::{Action, IntentQueue, key_to_action};
use crate::leaderboard::{Leaderboard, ScoreRecord, TOP_LIMIT};
use crate::theme::Theme;
use crate::ticker::Ticker;
use crate::trivia::{Question, QuestionBank};
use crate::ui::{self, View};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};
use tachyonfx::{Effect, Interpolation, fx};

/// How long the trivia verdict stays on screen.
const VERDICT_DISPLAY: Duration = Duration::from_secs(2);
/// Screen fade-in for trivia and game over, in ms.
const SCREEN_FADE_MS: u32 = 350;
/// Render/poll period (~60 FPS).
const FRAME: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Playing,
    Trivia,
    GameOver,
    Leaderboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Play,
    Leaderboard,
    Quit,
}

impl MenuItem {
    pub const ALL: [Self; 3] = [Self::Play, Self::Leaderboard, Self::Quit];

    fn up(self) -> Self {
        match self {
            Self::Play => Self::Quit,
            Self::Leaderboard => Self::Play,
            Self::Quit => Self::Leaderboard,
        }
    }

    fn down(self) -> Self {
        match self {
            Self::Play => Self::Leaderboard,
            Self::Leaderboard => Self::Quit,
            Self::Quit => Self::Play,
        }
    }
}

/// Question on screen and, once answered, the verdict and when it was given.
#[derive(Debug, Clone)]
pub struct TriviaState {
    pub question: Question,
    pub verdict: Option<(Verdict, Instant)>,
}

/// Leaderboard rows, or the message to show when they could not be loaded.
pub type LeaderboardRows = Result<Vec<ScoreRecord>, String>;

/// Whether the main loop keeps running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

pub struct App {
    config: GameConfig,
    theme: Theme,
    engine: GameEngine,
    screen: Screen,
    paused: bool,
    ticker: Ticker,
    intents: IntentQueue,
    menu_selected: MenuItem,
    trivia: Option<TriviaState>,
    final_result: Option<FinalResult>,
    leaderboard_rows: LeaderboardRows,
    last_lock: Option<LockReport>,
    leaderboard: Box<dyn Leaderboard>,
    questions: Box<dyn QuestionBank>,
    rng: StdRng,
    /// TachyonFX fade for the screen just entered.
    fade: Option<Effect>,
    /// Last time the fade was processed (for delta).
    fade_process_time: Option<Instant>,
}

impl App {
    pub fn new(
        config: GameConfig,
        theme: Theme,
        leaderboard: Box<dyn Leaderboard>,
        questions: Box<dyn QuestionBank>,
    ) -> Self {
        let now = Instant::now();
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut app = Self {
            engine: new_engine(config.seed),
            screen: Screen::Menu,
            paused: false,
            ticker: Ticker::new(now),
            intents: IntentQueue::default(),
            menu_selected: MenuItem::Play,
            trivia: None,
            final_result: None,
            leaderboard_rows: Ok(Vec::new()),
            last_lock: None,
            leaderboard,
            questions,
            rng,
            fade: None,
            fade_process_time: None,
            config,
            theme,
        };
        if app.config.no_menu {
            app.start_game(now);
        }
        app
    }

    fn start_game(&mut self, now: Instant) {
        self.engine = new_engine(self.config.seed);
        self.screen = Screen::Playing;
        self.paused = false;
        self.trivia = None;
        self.final_result = None;
        self.last_lock = None;
        self.intents.clear();
        self.ticker.reset(now);
        info!("new game for {}", self.config.player);
    }

    fn enter(&mut self, screen: Screen) {
        self.screen = screen;
        self.intents.clear();
        if matches!(screen, Screen::Trivia | Screen::GameOver) {
            self.fade = Some(fx::fade_from(
                self.theme.bg,
                self.theme.bg,
                (SCREEN_FADE_MS, Interpolation::Linear),
            ));
            self.fade_process_time = None;
        }
    }

    fn show_leaderboard(&mut self) {
        self.leaderboard_rows = self
            .leaderboard
            .top(&self.config.player, TOP_LIMIT)
            .map_err(|e| {
                warn!("could not load leaderboard: {e}");
                format!("Could not load scores: {e}")
            });
        self.enter(Screen::Leaderboard);
    }

    /// The engine reported game over: offer trivia or end the game.
    fn on_game_over(&mut self) {
        info!(
            "game over: score {}, level {}, lines {}",
            self.engine.score(),
            self.engine.level(),
            self.engine.lines_cleared()
        );
        if self.config.no_trivia {
            self.finish(true);
            return;
        }
        match continuation::offer(self.questions.as_ref(), &mut self.rng) {
            Offer::Ask(question) => {
                self.trivia = Some(TriviaState {
                    question,
                    verdict: None,
                });
                self.enter(Screen::Trivia);
            }
            Offer::NoQuestions => self.finish(true),
            Offer::Unavailable => self.finish(false),
        }
    }

    fn finish(&mut self, keep_score: bool) {
        let result = continuation::finish(
            &self.engine,
            self.leaderboard.as_mut(),
            &self.config.player,
            keep_score,
        );
        self.final_result = Some(result);
        self.trivia = None;
        self.enter(Screen::GameOver);
    }

    fn apply_action(&mut self, action: Action, now: Instant) -> Flow {
        match self.screen {
            Screen::Menu => match action {
                Action::Rotate => self.menu_selected = self.menu_selected.up(),
                Action::SoftDrop => self.menu_selected = self.menu_selected.down(),
                Action::Confirm | Action::HardDrop => match self.menu_selected {
                    MenuItem::Play => self.start_game(now),
                    MenuItem::Leaderboard => self.show_leaderboard(),
                    MenuItem::Quit => return Flow::Exit,
                },
                Action::Quit => return Flow::Exit,
                _ => {}
            },
            Screen::Playing => self.apply_game_action(action, now),
            Screen::Trivia => {
                if let (Action::Answer(answer), Some(trivia)) = (action, self.trivia.as_mut()) {
                    if trivia.verdict.is_none() {
                        let verdict = continuation::answer(&mut self.engine, &trivia.question, answer);
                        trivia.verdict = Some((verdict, now));
                    }
                }
            }
            Screen::GameOver | Screen::Leaderboard => {
                if matches!(action, Action::Confirm | Action::HardDrop | Action::Quit) {
                    self.enter(Screen::Menu);
                }
            }
        }
        Flow::Continue
    }

    fn apply_game_action(&mut self, action: Action, now: Instant) {
        if self.paused {
            match action {
                Action::Pause => {
                    self.paused = false;
                    self.ticker.reset(now);
                }
                Action::Quit => self.abandon_game(),
                _ => {}
            }
            return;
        }
        if self.engine.is_game_over() {
            return;
        }
        match action {
            Action::MoveLeft => {
                self.engine.move_piece(-1, 0);
            }
            Action::MoveRight => {
                self.engine.move_piece(1, 0);
            }
            Action::SoftDrop => {
                self.engine.move_piece(0, 1);
            }
            Action::Rotate => {
                self.engine.rotate_piece();
            }
            Action::HardDrop => {
                if let Some(report) = self.engine.hard_drop() {
                    self.last_lock = Some(report);
                }
            }
            Action::Pause => self.paused = true,
            Action::Quit => self.abandon_game(),
            Action::Confirm | Action::Answer(_) | Action::None => {}
        }
    }

    /// Leave a running game for the menu; nothing is saved.
    fn abandon_game(&mut self) {
        info!("game abandoned at score {}", self.engine.score());
        self.paused = false;
        self.enter(Screen::Menu);
    }

    /// Gravity, game-over detection and the trivia verdict delay.
    fn update(&mut self, now: Instant) {
        match self.screen {
            Screen::Playing if !self.paused => {
                if !self.engine.is_game_over() && self.ticker.poll(now, self.engine.level()) {
                    if let DropOutcome::Locked(report) = self.engine.drop_piece() {
                        self.last_lock = Some(report);
                    }
                }
                if self.engine.phase() == Phase::GameOver {
                    self.on_game_over();
                }
            }
            Screen::Trivia => {
                let due = self.trivia.as_ref().and_then(|t| t.verdict).and_then(
                    |(verdict, at)| (now.saturating_duration_since(at) >= VERDICT_DISPLAY).then_some(verdict),
                );
                match due {
                    Some(Verdict::Continue) => {
                        self.trivia = None;
                        self.last_lock = None;
                        self.ticker.reset(now);
                        self.enter(Screen::Playing);
                    }
                    Some(Verdict::Final) => self.finish(true),
                    None => {}
                }
            }
            _ => {}
        }
        if self.fade.as_ref().is_some_and(|e| e.done()) {
            self.fade = None;
            self.fade_process_time = None;
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        // Restore
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let now = Instant::now();
            let snapshot = self.engine.snapshot();
            terminal.draw(|f| {
                let view = View {
                    screen: self.screen,
                    snapshot: &snapshot,
                    theme: &self.theme,
                    player: &self.config.player,
                    paused: self.paused,
                    menu_selected: self.menu_selected,
                    last_lock: self.last_lock,
                    trivia: self.trivia.as_ref(),
                    final_result: self.final_result,
                    leaderboard_rows: &self.leaderboard_rows,
                    now,
                };
                ui::draw(f, &view, &mut self.fade, &mut self.fade_process_time);
            })?;

            let mut timeout = FRAME.saturating_sub(now.elapsed());
            if self.screen == Screen::Playing && !self.paused {
                timeout = timeout.min(self.ticker.remaining(now, self.engine.level()));
            }
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        if key.kind == KeyEventKind::Press {
                            self.intents.push(key_to_action(key));
                        }
                    }
                }
            }

            let now = Instant::now();
            while let Some(action) = self.intents.pop() {
                if self.apply_action(action, now) == Flow::Exit {
                    return Ok(());
                }
            }
            self.update(now);
        }
    }
}

fn new_engine(seed: Option<u64>) -> GameEngine {
    match seed {
        Some(seed) => GameEngine::with_seed(seed),
        None => GameEngine::new(),
    }
}

//! Tetrivia: falling-block puzzle in the terminal with a trivia second chance.

mod app;
mod board;
mod continuation;
mod game;
mod input;
mod leaderboard;
mod piece;
mod scoring;
mod snapshot;
mod store;
mod theme;
mod ticker;
mod trivia;
mod ui;

use anyhow::Result;
use app::App;
use clap::Parser;
use flexi_logger::{FileSpec, Logger, WriteMode};
use leaderboard::FileLeaderboard;
use log::{info, warn};
use std::path::PathBuf;
use trivia::{BuiltinQuestionBank, FileQuestionBank, QuestionBank};

/// Options derived from CLI that affect the session (who plays, randomness, flow).
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub player: String,
    pub seed: Option<u64>,
    pub no_menu: bool,
    pub no_trivia: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // The terminal belongs to the game; logs go to a file.
    let log_dir = args.log_dir.clone().unwrap_or_else(store::config_dir);
    let _logger = Logger::try_with_env_or_str(&args.log_level)?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename("tetrivia")
                .suppress_timestamp(),
        )
        .append()
        .write_mode(WriteMode::BufferAndFlush)
        .start()?;

    let theme = theme::Theme::load(args.theme.as_deref()).unwrap_or_else(|e| {
        warn!("could not load theme: {e}; using defaults");
        theme::Theme::default()
    });

    let scores = args.scores.unwrap_or_else(FileLeaderboard::default_path);
    info!("scores file: {}", scores.display());
    let questions: Box<dyn QuestionBank> = match args.questions {
        Some(path) => {
            info!("questions file: {}", path.display());
            Box::new(FileQuestionBank::new(path))
        }
        None => Box::new(BuiltinQuestionBank),
    };

    let player = args
        .player
        .or_else(|| std::env::var("USER").ok())
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| "player".to_string());
    let config = GameConfig {
        player,
        seed: args.seed,
        no_menu: args.no_menu,
        no_trivia: args.no_trivia,
    };

    let mut app = App::new(
        config,
        theme,
        Box::new(FileLeaderboard::new(scores)),
        questions,
    );
    app.run()?;
    info!("bye");
    Ok(())
}

/// Falling-block puzzle game in the terminal with a trivia second chance.
#[derive(Debug, Parser)]
#[command(
    name = "tetrivia",
    version,
    about = "Falling-block puzzle in the terminal. Top out, answer a trivia question, keep playing.",
    long_about = "Tetrivia is a terminal falling-block puzzle.\n\n\
        Clear full rows to score (100/300/500/800 x level); every 10 lines the level \
        rises and pieces fall faster. When the stack tops out you get one trivia \
        question: answer correctly to keep your level with half the score on a clean \
        board, answer wrong and the game is over.\n\n\
        CONTROLS:\n  Left/Right or h/l  Move      Up or k   Rotate     Down or j  Soft drop\n  \
        Space              Hard drop  P         Pause      Q / Esc    Menu\n  \
        A-D or 1-4         Answer a trivia question"
)]
pub struct Args {
    /// Player name shown in game and used for the leaderboard. Defaults to $USER.
    #[arg(short, long, value_name = "NAME")]
    pub player: Option<String>,

    /// Leaderboard file (JSON). Defaults to <config dir>/tetrivia/scores.json.
    #[arg(long, value_name = "FILE")]
    pub scores: Option<PathBuf>,

    /// Trivia questions file (JSON array). Uses a small built-in set if not set.
    #[arg(short, long, value_name = "FILE")]
    pub questions: Option<PathBuf>,

    /// Path to theme file (btop-style theme[key]=\"value\").
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Seed for the piece sequence and question choice (reproducible games).
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Skip main menu and start game immediately.
    #[arg(long)]
    pub no_menu: bool,

    /// No second chance: game over ends the game at once.
    #[arg(long)]
    pub no_trivia: bool,

    /// Log level or filter string (RUST_LOG takes precedence).
    #[arg(long, default_value = "info", value_name = "SPEC")]
    pub log_level: String,

    /// Directory for the log file. Defaults to the config dir.
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

//! After a game over: offer a trivia question; a correct answer halves the
//! score and clears the board, anything else ends the game for good.

use crate::game::GameEngine;
use crate::leaderboard::{Leaderboard, ScoreRecord};
use crate::trivia::{self, Answer, Question, QuestionBank};
use log::{info, warn};
use rand::Rng;

/// What the player is offered once the engine reports game over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Offer {
    Ask(Question),
    /// The bank is empty: the game ends and the score is kept.
    NoQuestions,
    /// The bank could not be read: the game ends and the score is forfeited.
    Unavailable,
}

/// Decision after an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Score halved, board cleared; keep driving ticks.
    Continue,
    Final,
}

/// Final result shown on the game-over screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalResult {
    pub score: u32,
    pub level: u32,
    pub submitted: bool,
}

pub fn offer<R: Rng + ?Sized>(bank: &dyn QuestionBank, rng: &mut R) -> Offer {
    match trivia::pick_question(bank, rng) {
        Ok(Some(question)) => Offer::Ask(question),
        Ok(None) => {
            info!("no trivia questions available");
            Offer::NoQuestions
        }
        Err(e) => {
            warn!("question bank unavailable: {e}");
            Offer::Unavailable
        }
    }
}

/// Apply the player's answer to `engine`.
pub fn answer(engine: &mut GameEngine, question: &Question, answer: Answer) -> Verdict {
    if question.is_correct(answer) {
        info!("trivia answered correctly; continuing");
        engine.reduce_score();
        engine.reset_board();
        Verdict::Continue
    } else {
        info!(
            "trivia answered {} (expected {}); game over",
            answer.label(),
            question.correct_answer.label()
        );
        Verdict::Final
    }
}

/// End the game. With `keep_score` the score is shown and, if positive,
/// submitted; otherwise the result shows a score of 0 and nothing is saved.
/// A failed submission is logged; the result still shows the score.
pub fn finish(
    engine: &GameEngine,
    leaderboard: &mut dyn Leaderboard,
    player: &str,
    keep_score: bool,
) -> FinalResult {
    let level = engine.level();
    if !keep_score {
        return FinalResult {
            score: 0,
            level,
            submitted: false,
        };
    }
    let score = engine.score();
    let mut submitted = false;
    if score > 0 {
        match leaderboard.submit(ScoreRecord::new(player, score, level)) {
            Ok(()) => submitted = true,
            Err(e) => warn!("could not save score: {e}"),
        }
    }
    FinalResult {
        score,
        level,
        submitted,
    }
}

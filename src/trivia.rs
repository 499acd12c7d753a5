//! Question bank used for the second chance after a game over.

use crate::store::{self, StoreError};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One of the four options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Answer {
    A,
    B,
    C,
    D,
}

impl Answer {
    pub const ALL: [Self; 4] = [Self::A, Self::B, Self::C, Self::D];

    pub fn label(&self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_answer: Answer,
}

impl Question {
    pub fn option(&self, answer: Answer) -> &str {
        match answer {
            Answer::A => &self.option_a,
            Answer::B => &self.option_b,
            Answer::C => &self.option_c,
            Answer::D => &self.option_d,
        }
    }

    pub fn is_correct(&self, answer: Answer) -> bool {
        self.correct_answer == answer
    }
}

/// Question store. Loading may fail; an empty list is not an error.
pub trait QuestionBank {
    fn all(&self) -> Result<Vec<Question>, StoreError>;
}

/// Pick one question uniformly at random; `Ok(None)` when the bank is empty.
pub fn pick_question<R: Rng + ?Sized>(
    bank: &dyn QuestionBank,
    rng: &mut R,
) -> Result<Option<Question>, StoreError> {
    let questions = bank.all()?;
    Ok(questions.choose(rng).cloned())
}

/// Questions from a JSON array file. A missing file is an empty bank.
#[derive(Debug, Clone)]
pub struct FileQuestionBank {
    path: PathBuf,
}

impl FileQuestionBank {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl QuestionBank for FileQuestionBank {
    fn all(&self) -> Result<Vec<Question>, StoreError> {
        Ok(store::load_json(&self.path)?.unwrap_or_default())
    }
}

/// Small fixed set used when no question file is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinQuestionBank;

impl QuestionBank for BuiltinQuestionBank {
    fn all(&self) -> Result<Vec<Question>, StoreError> {
        let q = |question: &str, options: [&str; 4], correct_answer: Answer| Question {
            question: question.to_string(),
            option_a: options[0].to_string(),
            option_b: options[1].to_string(),
            option_c: options[2].to_string(),
            option_d: options[3].to_string(),
            correct_answer,
        };
        Ok(vec![
            q(
                "How many cells make up a tetromino?",
                ["3", "4", "5", "6"],
                Answer::B,
            ),
            q(
                "Which planet is closest to the Sun?",
                ["Venus", "Mars", "Mercury", "Earth"],
                Answer::C,
            ),
            q(
                "What is 7 x 8?",
                ["54", "56", "58", "64"],
                Answer::B,
            ),
            q(
                "Which gas do plants absorb from the air?",
                ["Carbon dioxide", "Oxygen", "Nitrogen", "Helium"],
                Answer::A,
            ),
            q(
                "How many sides does a hexagon have?",
                ["5", "7", "8", "6"],
                Answer::D,
            ),
            q(
                "What is the largest ocean on Earth?",
                ["Atlantic", "Indian", "Pacific", "Arctic"],
                Answer::C,
            ),
            q(
                "In which year did the original Tetris appear?",
                ["1984", "1989", "1978", "1995"],
                Answer::A,
            ),
            q(
                "What is the chemical symbol for gold?",
                ["Ag", "Au", "Gd", "Go"],
                Answer::B,
            ),
        ])
    }
}

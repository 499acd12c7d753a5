//! Persist finished games to disk (XDG config or ~/.config/tetrivia/scores.json).

use crate::store::{self, StoreError};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

const FILENAME: &str = "scores.json";

/// Entries shown on the leaderboard screen.
pub const TOP_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub player: String,
    pub score: u32,
    pub level: u32,
    /// Unix seconds.
    pub recorded_at: u64,
}

impl ScoreRecord {
    pub fn new(player: &str, score: u32, level: u32) -> Self {
        let recorded_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            player: player.to_string(),
            score,
            level,
            recorded_at,
        }
    }
}

/// Score persistence service. The app only talks to this trait.
pub trait Leaderboard {
    fn submit(&mut self, record: ScoreRecord) -> Result<(), StoreError>;

    /// Best records of `player`, highest score first, at most `limit`.
    fn top(&self, player: &str, limit: usize) -> Result<Vec<ScoreRecord>, StoreError>;
}

/// Leaderboard kept as a JSON array in one file.
#[derive(Debug, Clone)]
pub struct FileLeaderboard {
    path: PathBuf,
}

impl FileLeaderboard {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Default location in the config directory.
    pub fn default_path() -> PathBuf {
        store::config_dir().join(FILENAME)
    }

    fn load(&self) -> Result<Vec<ScoreRecord>, StoreError> {
        Ok(store::load_json(&self.path)?.unwrap_or_default())
    }
}

impl Leaderboard for FileLeaderboard {
    fn submit(&mut self, record: ScoreRecord) -> Result<(), StoreError> {
        let mut records = self.load()?;
        info!(
            "saving score {} (level {}) for {}",
            record.score, record.level, record.player
        );
        records.push(record);
        store::save_json(&self.path, &records)
    }

    fn top(&self, player: &str, limit: usize) -> Result<Vec<ScoreRecord>, StoreError> {
        let mut records: Vec<ScoreRecord> = self
            .load()?
            .into_iter()
            .filter(|r| r.player == player)
            .collect();
        records.sort_by(|a, b| b.score.cmp(&a.score));
        records.truncate(limit);
        Ok(records)
    }
}

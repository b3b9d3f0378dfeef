//! End-of-round summaries and the high score leaderboards
//!
//! Every saved round is persisted to a JSON file, ranked per mode. The top 10
//! of each mode form the high score table.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::persistence;

/// Rows in the high score table per mode
pub const MAX_HIGH_SCORES: usize = 10;

/// Duel outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    PlayerOne,
    PlayerTwo,
    Draw,
}

/// What a finished round reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum RoundSummary {
    Solo {
        score: u32,
        missed: u32,
        level: u32,
    },
    Duel {
        player1_score: u32,
        player2_score: u32,
        level: u32,
        winner: Winner,
    },
}

impl RoundSummary {
    pub fn solo(score: u32, missed: u32, level: u32) -> Self {
        Self::Solo {
            score,
            missed,
            level,
        }
    }

    /// Winner is whoever scored strictly more
    pub fn duel(player1_score: u32, player2_score: u32, level: u32) -> Self {
        let winner = match player1_score.cmp(&player2_score) {
            std::cmp::Ordering::Greater => Winner::PlayerOne,
            std::cmp::Ordering::Less => Winner::PlayerTwo,
            std::cmp::Ordering::Equal => Winner::Draw,
        };
        Self::Duel {
            player1_score,
            player2_score,
            level,
            winner,
        }
    }

    /// Score the leaderboard ranks by
    pub fn high_score(&self) -> u32 {
        match *self {
            Self::Solo { score, .. } => score,
            Self::Duel {
                player1_score,
                player2_score,
                ..
            } => player1_score.max(player2_score),
        }
    }

    pub fn level(&self) -> u32 {
        match *self {
            Self::Solo { level, .. } | Self::Duel { level, .. } => level,
        }
    }
}

/// Receives finished rounds
pub trait SummarySink {
    fn record(&mut self, summary: &RoundSummary);
}

impl SummarySink for Vec<RoundSummary> {
    fn record(&mut self, summary: &RoundSummary) {
        self.push(*summary);
    }
}

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub summary: RoundSummary,
    /// Unix timestamp (ms) when achieved
    pub timestamp: u64,
}

/// Every saved round of one mode, sorted descending by `RoundSummary::high_score`.
///
/// Nothing is ever dropped; the top-10 table is a view over the head.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub entries: Vec<HighScoreEntry>,
}

impl Leaderboard {
    /// Check if a score would show up in the top-10 table
    pub fn qualifies(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        self.entries
            .get(MAX_HIGH_SCORES - 1)
            .is_none_or(|e| score > e.summary.high_score())
    }

    /// Get the table rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u32) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        Some(self.insertion_index(score) + 1)
    }

    /// Store a round, returns its overall rank (1-indexed).
    ///
    /// Ties keep their save order.
    pub fn add(&mut self, summary: RoundSummary, timestamp: u64) -> usize {
        let index = self.insertion_index(summary.high_score());
        self.entries.insert(index, HighScoreEntry { summary, timestamp });
        index + 1
    }

    /// The top-10 table
    pub fn top(&self) -> &[HighScoreEntry] {
        &self.entries[..self.entries.len().min(MAX_HIGH_SCORES)]
    }

    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.summary.high_score())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insertion_index(&self, score: u32) -> usize {
        self.entries
            .iter()
            .position(|e| score > e.summary.high_score())
            .unwrap_or(self.entries.len())
    }
}

/// Both leaderboards
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreHistory {
    pub solo: Leaderboard,
    pub duel: Leaderboard,
}

impl ScoreHistory {
    pub fn board(&self, summary: &RoundSummary) -> &Leaderboard {
        match summary {
            RoundSummary::Solo { .. } => &self.solo,
            RoundSummary::Duel { .. } => &self.duel,
        }
    }

    pub fn add(&mut self, summary: RoundSummary, timestamp: u64) -> usize {
        let board = match summary {
            RoundSummary::Solo { .. } => &mut self.solo,
            RoundSummary::Duel { .. } => &mut self.duel,
        };
        board.add(summary, timestamp)
    }
}

/// Score history bound to its JSON file
#[derive(Debug)]
pub struct ScoreFile {
    path: PathBuf,
    pub history: ScoreHistory,
}

impl ScoreFile {
    /// Load from disk, starting fresh when the file is missing or unreadable
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let history: ScoreHistory = persistence::load_json_or_default(&path);
        log::info!(
            "Loaded {} solo / {} duel rounds",
            history.solo.entries.len(),
            history.duel.entries.len()
        );
        Self { path, history }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self) -> Result<(), PersistenceError> {
        persistence::save_json(&self.path, &self.history)
    }
}

impl SummarySink for ScoreFile {
    fn record(&mut self, summary: &RoundSummary) {
        let score = summary.high_score();
        let rank = self.history.add(*summary, unix_ms());
        if score > 0 && rank <= MAX_HIGH_SCORES {
            log::info!("New high score #{} ({})", rank, score);
        } else {
            log::debug!("Round saved at rank {} ({})", rank, score);
        }
        if let Err(e) = self.save() {
            log::warn!("Failed to save high scores: {}", e);
        }
    }
}

/// Wall-clock time in unix milliseconds
pub fn unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;

/// Free-form per-round details stored next to the score.
pub type Metadata = BTreeMap<String, Value>;

/// Outcome of one finished round. Built once when the round finishes.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundResult {
    pub game_id: String,
    pub final_score: i64,
    pub played_at: DateTime<Utc>,
    pub metadata: Metadata,
}

// Signed-in player as issued by the auth service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub access_token: String,
}

// Row written to the persistence service for a finished round.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRecord {
    pub user_id: String,
    pub game_id: String,
    pub score: i64,
    pub metadata: Metadata,
    pub played_at: DateTime<Utc>,
}

impl ScoreRecord {
    pub fn new(identity: &Identity, result: &RoundResult) -> Self {
        Self {
            user_id: identity.user_id.clone(),
            game_id: result.game_id.clone(),
            score: result.final_score,
            metadata: result.metadata.clone(),
            played_at: result.played_at,
        }
    }
}

/// One row of a game's public leaderboard.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    pub user_id: String,
    // Profile name; missing when the player never set one.
    pub username: Option<String>,
    pub score: i64,
    pub played_at: DateTime<Utc>,
}

/// Which direction counts as a better score for a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreOrder {
    HigherIsBetter,
    LowerIsBetter,
}

impl ScoreOrder {
    /// Returns true if `candidate` beats `current`.
    pub fn improves(self, candidate: i64, current: Option<i64>) -> bool {
        match (self, current) {
            (_, None) => true,
            (ScoreOrder::HigherIsBetter, Some(best)) => candidate > best,
            (ScoreOrder::LowerIsBetter, Some(best)) => candidate < best,
        }
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Instant;

use crate::domain::entities::{Identity, LeaderboardEntry, ScoreOrder, ScoreRecord};
use crate::domain::errors::SyncError;

// Port for the hosted score persistence service.
#[async_trait]
pub trait StatsStore: Send + Sync {
    async fn submit_score(&self, identity: &Identity, record: ScoreRecord) -> Result<(), SyncError>;

    async fn fetch_best_score(
        &self,
        identity: &Identity,
        game_id: &str,
        order: ScoreOrder,
    ) -> Result<Option<i64>, SyncError>;

    // Most recent rounds first; `game_id = None` spans every game.
    async fn recent_scores(
        &self,
        identity: &Identity,
        game_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ScoreRecord>, SyncError>;

    // Best rounds of every player; readable without signing in.
    async fn leaderboard(
        &self,
        identity: Option<&Identity>,
        game_id: &str,
        order: ScoreOrder,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, SyncError>;
}

// Port for the currently signed-in player, if any.
pub trait IdentitySource: Send + Sync {
    fn current(&self) -> Option<Identity>;
}

// Port for retrieving the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
    fn instant(&self) -> Instant;
}

/// Wall clock backed by the tokio time driver, so paused test time applies.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn instant(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}

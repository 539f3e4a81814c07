use std::sync::{Arc, Mutex};
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{Clock, IdentitySource, StatsStore};
use crate::domain::{Identity, LeaderboardEntry, ScoreOrder, ScoreRecord, SyncError};

// Shared fixed time source for deterministic use-case tests.
pub(crate) struct FixedClock(pub(crate) DateTime<Utc>);

impl Default for FixedClock {
    fn default() -> Self {
        Self(DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp"))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }

    fn instant(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}

pub(crate) struct FixedIdentity(pub(crate) Option<Identity>);

impl IdentitySource for FixedIdentity {
    fn current(&self) -> Option<Identity> {
        self.0.clone()
    }
}

pub(crate) fn signed_in(user_id: &str) -> FixedIdentity {
    FixedIdentity(Some(Identity {
        user_id: user_id.to_string(),
        access_token: format!("token-{user_id}"),
    }))
}

#[derive(Clone, Default)]
pub(crate) struct RecordingStore {
    records: Arc<Mutex<Vec<ScoreRecord>>>,
    fail: bool,
}

impl RecordingStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub(crate) fn records(&self) -> Vec<ScoreRecord> {
        self.records.lock().expect("records mutex poisoned").clone()
    }

    fn check(&self) -> Result<(), SyncError> {
        if self.fail {
            return Err(SyncError::Transport("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl StatsStore for RecordingStore {
    async fn submit_score(&self, _identity: &Identity, record: ScoreRecord) -> Result<(), SyncError> {
        self.check()?;
        self.records.lock().expect("records mutex poisoned").push(record);
        Ok(())
    }

    async fn fetch_best_score(
        &self,
        identity: &Identity,
        game_id: &str,
        order: ScoreOrder,
    ) -> Result<Option<i64>, SyncError> {
        self.check()?;
        let guard = self.records.lock().expect("records mutex poisoned");
        let scores = guard
            .iter()
            .filter(|r| r.user_id == identity.user_id && r.game_id == game_id)
            .map(|r| r.score);
        Ok(match order {
            ScoreOrder::HigherIsBetter => scores.max(),
            ScoreOrder::LowerIsBetter => scores.min(),
        })
    }

    async fn recent_scores(
        &self,
        identity: &Identity,
        game_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ScoreRecord>, SyncError> {
        self.check()?;
        let guard = self.records.lock().expect("records mutex poisoned");
        Ok(guard
            .iter()
            .rev()
            .filter(|r| r.user_id == identity.user_id)
            .filter(|r| game_id.is_none_or(|id| r.game_id == id))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn leaderboard(
        &self,
        _identity: Option<&Identity>,
        game_id: &str,
        order: ScoreOrder,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, SyncError> {
        self.check()?;
        let mut rows: Vec<LeaderboardEntry> = self
            .records
            .lock()
            .expect("records mutex poisoned")
            .iter()
            .filter(|r| r.game_id == game_id)
            .map(|r| LeaderboardEntry {
                user_id: r.user_id.clone(),
                username: None,
                score: r.score,
                played_at: r.played_at,
            })
            .collect();
        match order {
            ScoreOrder::HigherIsBetter => rows.sort_by_key(|row| std::cmp::Reverse(row.score)),
            ScoreOrder::LowerIsBetter => rows.sort_by_key(|row| row.score),
        }
        rows.truncate(limit);
        Ok(rows)
    }
}

// Lets background stats tasks spawned on the test runtime run to completion.
pub(crate) async fn settle_tasks() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

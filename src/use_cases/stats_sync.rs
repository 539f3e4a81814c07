// Best-effort reporting of finished rounds to the persistence service.

use crate::domain::ports::{IdentitySource, StatsStore};
use crate::domain::{
    LeaderboardEntry, RoundResult, ScoreOrder, ScoreRecord, StatsSummary, SyncError,
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Delivered,
    // Nobody is signed in; anonymous play is not reported.
    Skipped,
    Failed(SyncError),
}

/// Single entry point for everything the games send to the stats service.
///
/// Failures are logged and returned as values; nothing here retries, and
/// nothing blocks or reverts a round.
#[derive(Clone)]
pub struct StatsSync {
    store: Arc<dyn StatsStore>,
    identity: Arc<dyn IdentitySource>,
}

impl StatsSync {
    pub fn new(store: Arc<dyn StatsStore>, identity: Arc<dyn IdentitySource>) -> Self {
        Self { store, identity }
    }

    pub fn is_signed_in(&self) -> bool {
        self.identity.current().is_some()
    }

    pub async fn report(&self, result: &RoundResult) -> SyncOutcome {
        let Some(identity) = self.identity.current() else {
            debug!(game_id = %result.game_id, "no signed-in player; skipping stats sync");
            return SyncOutcome::Skipped;
        };

        let record = ScoreRecord::new(&identity, result);
        match self.store.submit_score(&identity, record).await {
            Ok(()) => {
                info!(
                    game_id = %result.game_id,
                    score = result.final_score,
                    "round stats saved"
                );
                SyncOutcome::Delivered
            }
            Err(error) => {
                warn!(game_id = %result.game_id, %error, "failed to save round stats");
                SyncOutcome::Failed(error)
            }
        }
    }

    /// Reports in the background. Returns `None` when no runtime is available.
    pub fn dispatch(&self, result: RoundResult) -> Option<JoinHandle<SyncOutcome>> {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(game_id = %result.game_id, "no async runtime; dropping round stats");
            return None;
        };

        let sync = self.clone();
        Some(runtime.spawn(async move { sync.report(&result).await }))
    }

    pub async fn best_score(&self, game_id: &str, order: ScoreOrder) -> Option<i64> {
        let identity = self.identity.current()?;
        self.store
            .fetch_best_score(&identity, game_id, order)
            .await
            .inspect_err(|error| warn!(game_id, %error, "failed to fetch best score"))
            .ok()
            .flatten()
    }

    /// Recent rounds, newest first. Empty when anonymous or on failure.
    pub async fn history(&self, game_id: Option<&str>, limit: usize) -> Vec<ScoreRecord> {
        let Some(identity) = self.identity.current() else {
            return Vec::new();
        };
        self.store
            .recent_scores(&identity, game_id, limit)
            .await
            .inspect_err(|error| warn!(?game_id, %error, "failed to fetch score history"))
            .unwrap_or_default()
    }

    /// Plays, best and average per game over the player's last `limit` rounds.
    /// `None` when anonymous or when the rounds could not be fetched.
    pub async fn summary<F>(&self, order_of: F, limit: usize) -> Option<StatsSummary>
    where
        F: Fn(&str) -> ScoreOrder,
    {
        let identity = self.identity.current()?;
        let records = self
            .store
            .recent_scores(&identity, None, limit)
            .await
            .inspect_err(|error| warn!(%error, "failed to fetch rounds for summary"))
            .ok()?;
        Some(StatsSummary::from_records(&records, order_of))
    }

    /// Top rounds for `game_id` across all players. Works while anonymous.
    pub async fn leaderboard(
        &self,
        game_id: &str,
        order: ScoreOrder,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, SyncError> {
        let identity = self.identity.current();
        self.store
            .leaderboard(identity.as_ref(), game_id, order, limit)
            .await
            .inspect_err(|error| warn!(game_id, %error, "failed to fetch leaderboard"))
    }
}

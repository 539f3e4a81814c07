// Shell for the reaction test, which runs on a one-shot signal rather than a
// countdown.

use super::shell::Game;
use super::stats_sync::StatsSync;
use super::types::ShellSnapshot;
use crate::domain::ports::Clock;
use crate::domain::reaction::{
    self, ReactionClick, ReactionOutcome, ReactionPhase, ReactionRating, ReactionRound,
};
use crate::domain::{InvalidTransition, Metadata, PlayerAction, RoundPhase, RoundResult};
use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub struct ReactionShell {
    round: ReactionRound,
    rng: StdRng,
    clock: Arc<dyn Clock>,
    sync: Option<StatsSync>,
    last_result: Option<RoundResult>,
}

impl ReactionShell {
    pub fn new(rng: StdRng, clock: Arc<dyn Clock>) -> Self {
        Self {
            round: ReactionRound::default(),
            rng,
            clock,
            sync: None,
            last_result: None,
        }
    }

    pub fn with_sync(mut self, sync: StatsSync) -> Self {
        self.sync = Some(sync);
        self
    }

    /// Seeds the personal best, typically from stats read back at launch.
    pub fn with_best(mut self, best_ms: Option<u64>) -> Self {
        if let Some(best_ms) = best_ms {
            self.round.offer_best(best_ms);
        }
        self
    }

    pub fn round(&self) -> &ReactionRound {
        &self.round
    }

    fn describe(&self) -> Metadata {
        let mut board = Metadata::new();
        let state = match self.round.phase() {
            ReactionPhase::Idle => "idle",
            ReactionPhase::Waiting { .. } => "waiting",
            ReactionPhase::Ready { .. } => "ready",
            ReactionPhase::Finished(ReactionOutcome::TooEarly) => "too_early",
            ReactionPhase::Finished(ReactionOutcome::Reacted {
                reaction_ms,
                new_best,
            }) => {
                board.insert("reaction_ms".to_string(), reaction_ms.into());
                board.insert("new_best".to_string(), new_best.into());
                board.insert(
                    "rating".to_string(),
                    ReactionRating::from_ms(reaction_ms).message().into(),
                );
                "reacted"
            }
        };
        board.insert("state".to_string(), state.into());
        board.insert("best_ms".to_string(), self.round.best_ms().into());
        board.insert("average_ms".to_string(), self.round.average_ms().into());
        board
    }
}

impl Game for ReactionShell {
    fn game_id(&self) -> &str {
        reaction::GAME_ID
    }

    fn start(&mut self) -> Result<(), InvalidTransition> {
        let from = self.round.round_phase();
        if from == RoundPhase::Active {
            return Err(InvalidTransition {
                from,
                action: "begin",
            });
        }
        let delay = reaction::sample_delay(&mut self.rng);
        self.round.begin(self.clock.instant(), delay);
        debug!(delay_ms = delay.as_millis() as u64, "waiting for signal");
        Ok(())
    }

    fn abandon(&mut self) {
        self.round.abandon();
    }

    fn act(&mut self, action: PlayerAction) {
        if action != PlayerAction::Press {
            return;
        }
        match self.round.click(self.clock.instant(), self.clock.now()) {
            ReactionClick::Reacted(result) => {
                info!(reaction_ms = result.final_score, "reaction recorded");
                if let Some(sync) = &self.sync {
                    let _ = sync.dispatch(result.clone());
                }
                self.last_result = Some(result);
            }
            ReactionClick::TooEarly => info!("clicked before the signal"),
            ReactionClick::Ignored => {}
        }
    }

    fn end(&mut self) -> Result<(), InvalidTransition> {
        let from = self.round.round_phase();
        if from != RoundPhase::Active {
            return Err(InvalidTransition { from, action: "end" });
        }
        // An unfinished attempt has no reaction time to report.
        self.round.abandon();
        Ok(())
    }

    fn countdown(&self) -> Option<Duration> {
        None
    }

    fn tick(&mut self) {}

    fn wake_at(&self) -> Option<Instant> {
        self.round.ready_at()
    }

    fn wake(&mut self) {
        if self.round.ready(self.clock.instant()) {
            debug!("signal shown");
        }
    }

    fn snapshot(&self) -> ShellSnapshot {
        let score = match self.round.phase() {
            ReactionPhase::Finished(ReactionOutcome::Reacted { reaction_ms, .. }) => {
                reaction_ms as i64
            }
            _ => 0,
        };
        ShellSnapshot {
            game_id: reaction::GAME_ID.to_string(),
            phase: self.round.round_phase(),
            score,
            remaining_ms: 0,
            board: self.describe(),
            last_score: self.last_result.as_ref().map(|r| r.final_score),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::{FixedClock, RecordingStore, settle_tasks, signed_in};
    use rand::SeedableRng;

    fn shell() -> ReactionShell {
        ReactionShell::new(StdRng::seed_from_u64(1), Arc::new(FixedClock::default()))
    }

    #[tokio::test(start_paused = true)]
    async fn signal_then_click_measures_reaction() {
        let store = RecordingStore::new();
        let sync = StatsSync::new(Arc::new(store.clone()), Arc::new(signed_in("user-2")));
        let mut shell = shell().with_sync(sync);

        shell.start().expect("start");
        let ready_at = shell.wake_at().expect("signal pending");
        tokio::time::sleep_until(tokio::time::Instant::from_std(ready_at)).await;
        shell.wake();
        assert_eq!(shell.wake_at(), None);

        tokio::time::advance(Duration::from_millis(240)).await;
        shell.act(PlayerAction::Press);

        let snapshot = shell.snapshot();
        assert_eq!(snapshot.phase, RoundPhase::Finished);
        assert_eq!(snapshot.score, 240);
        assert_eq!(snapshot.board["state"], "reacted");
        assert_eq!(snapshot.board["best_ms"], 240);

        settle_tasks().await;
        let records = store.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].game_id, reaction::GAME_ID);
        assert_eq!(records[0].score, 240);
    }

    #[tokio::test(start_paused = true)]
    async fn press_after_a_missed_wake_still_counts() {
        let mut shell = shell();
        shell.start().expect("start");
        let ready_at = shell.wake_at().expect("signal pending");

        tokio::time::sleep_until(tokio::time::Instant::from_std(ready_at)).await;
        tokio::time::advance(Duration::from_millis(300)).await;
        shell.act(PlayerAction::Press);

        let snapshot = shell.snapshot();
        assert_eq!(snapshot.board["state"], "reacted");
        assert_eq!(snapshot.score, 300);
        assert_eq!(snapshot.last_score, Some(300));
    }

    #[tokio::test(start_paused = true)]
    async fn early_click_is_not_reported() {
        let store = RecordingStore::new();
        let sync = StatsSync::new(Arc::new(store.clone()), Arc::new(signed_in("user-2")));
        let mut shell = shell().with_sync(sync);

        shell.start().expect("start");
        shell.act(PlayerAction::Press);
        settle_tasks().await;

        assert_eq!(shell.snapshot().board["state"], "too_early");
        assert_eq!(shell.wake_at(), None);
        assert!(store.records().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn start_twice_is_rejected_and_end_returns_to_idle() {
        let mut shell = shell();
        shell.start().expect("start");
        assert!(shell.start().is_err());

        shell.end().expect("end");
        assert_eq!(shell.snapshot().phase, RoundPhase::Idle);
        assert!(shell.end().is_err());
        assert_eq!(shell.wake_at(), None);
    }

    #[test]
    fn seeded_best_is_kept_until_beaten() {
        let shell = shell().with_best(Some(230));
        assert_eq!(shell.round().best_ms(), Some(230));
        assert_eq!(shell.snapshot().board["best_ms"], 230);
    }
}

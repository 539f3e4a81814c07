// Game shell: one game's round, content, clock and stats wiring behind a
// common interface the session task drives.

use super::stats_sync::StatsSync;
use super::types::ShellSnapshot;
use crate::domain::ports::Clock;
use crate::domain::{
    Board, CountdownTimer, InvalidTransition, PlayerAction, RoundMachine, RoundPhase, RoundResult,
    ScoringRule, Submitted, Ticked,
};
use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Everything a session needs from a playable game.
pub trait Game: Send {
    fn game_id(&self) -> &str;

    fn start(&mut self) -> Result<(), InvalidTransition>;

    /// Drops the current round, if any, without a result.
    fn abandon(&mut self);

    /// "Play again": valid from any phase.
    fn restart(&mut self) -> Result<(), InvalidTransition> {
        self.abandon();
        self.start()
    }

    fn act(&mut self, action: PlayerAction);

    fn end(&mut self) -> Result<(), InvalidTransition>;

    /// Tick period while a countdown is running.
    fn countdown(&self) -> Option<Duration>;

    fn tick(&mut self);

    /// One-shot deadline the session should wake the game at.
    fn wake_at(&self) -> Option<Instant> {
        None
    }

    fn wake(&mut self) {}

    /// Stops every timer. Called exactly once when the session exits.
    fn teardown(&mut self) {
        self.abandon();
    }

    fn snapshot(&self) -> ShellSnapshot;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundLength {
    Countdown(Duration),
    // Ends through the rule (or `end`), never through the clock.
    Untimed,
}

/// Shell for the board-based games: a [`RoundMachine`] scored by the game's
/// rule and fed by the game's [`Board`].
pub struct GameShell {
    machine: RoundMachine<Box<dyn ScoringRule>>,
    board: Box<dyn Board>,
    length: RoundLength,
    tick: Duration,
    rng: StdRng,
    clock: Arc<dyn Clock>,
    sync: Option<StatsSync>,
    last_result: Option<RoundResult>,
}

impl GameShell {
    pub fn new(
        game_id: &str,
        rule: Box<dyn ScoringRule>,
        board: Box<dyn Board>,
        length: RoundLength,
        tick: Duration,
        rng: StdRng,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let timer = CountdownTimer::new(tick);
        let tick = timer.period();
        Self {
            machine: RoundMachine::with_timer(game_id, rule, timer),
            board,
            length,
            tick,
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

    pub fn last_result(&self) -> Option<&RoundResult> {
        self.last_result.as_ref()
    }

    fn settle(&mut self, result: RoundResult) {
        info!(
            game_id = %result.game_id,
            score = result.final_score,
            "round finished"
        );
        if let Some(sync) = &self.sync {
            let _ = sync.dispatch(result.clone());
        }
        self.last_result = Some(result);
    }
}

impl Game for GameShell {
    fn game_id(&self) -> &str {
        self.machine.game_id()
    }

    fn start(&mut self) -> Result<(), InvalidTransition> {
        let now = self.clock.now();
        match self.length {
            RoundLength::Countdown(length) => {
                self.machine.begin(length.as_millis() as u64, now)?;
            }
            RoundLength::Untimed => self.machine.begin_untimed(now)?,
        }
        self.board.reset(&mut self.rng);
        info!(game_id = %self.machine.game_id(), "round started");
        Ok(())
    }

    fn abandon(&mut self) {
        if self.machine.phase() == RoundPhase::Active {
            debug!(game_id = %self.machine.game_id(), "round abandoned");
        }
        self.machine.abandon();
    }

    fn act(&mut self, action: PlayerAction) {
        if self.machine.phase() != RoundPhase::Active {
            debug!(?action, "action outside an active round ignored");
            return;
        }
        let Some(event) = self.board.resolve(action, &mut self.rng) else {
            return;
        };

        match self.machine.submit(&event, self.clock.now()) {
            Submitted::Completed { result, .. } => self.settle(result),
            Submitted::Scored(applied) if applied.clamped => {
                debug!(kind = event.kind(), score = applied.score, "score clamped");
            }
            Submitted::Scored(_) | Submitted::Ignored => {}
        }
    }

    fn end(&mut self) -> Result<(), InvalidTransition> {
        let result = self.machine.end(self.clock.now())?;
        self.settle(result);
        Ok(())
    }

    fn countdown(&self) -> Option<Duration> {
        self.machine.is_counting().then_some(self.tick)
    }

    fn tick(&mut self) {
        if !self.machine.is_counting() {
            return;
        }
        self.board.on_tick(&mut self.rng);
        if let Ticked::Expired(result) = self.machine.tick(self.clock.now()) {
            self.settle(result);
        }
    }

    fn snapshot(&self) -> ShellSnapshot {
        let state = self.machine.state();
        ShellSnapshot {
            game_id: self.machine.game_id().to_string(),
            phase: state.phase,
            score: state.score,
            remaining_ms: state.remaining_ms,
            board: self.board.describe(),
            last_score: self.last_result.as_ref().map(|r| r.final_score),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::games::{mug_shot, procrastination};
    use crate::use_cases::test_support::{FixedClock, RecordingStore, settle_tasks, signed_in};
    use rand::SeedableRng;

    fn mug_shot_shell(length: Duration) -> GameShell {
        GameShell::new(
            mug_shot::GAME_ID,
            Box::new(mug_shot::MugShotRule::default()),
            Box::new(mug_shot::MugShotBoard::default()),
            RoundLength::Countdown(length),
            Duration::from_millis(1000),
            StdRng::seed_from_u64(3),
            Arc::new(FixedClock::default()),
        )
    }

    fn first_mug(shell: &GameShell) -> usize {
        shell.snapshot().board["mugs"]
            .as_array()
            .and_then(|mugs| mugs.iter().position(|m| !m.is_null()))
            .expect("a mug on the board")
    }

    #[test]
    fn actions_before_start_do_nothing() {
        let mut shell = mug_shot_shell(Duration::from_secs(3));
        shell.act(PlayerAction::Target(0));

        let snapshot = shell.snapshot();
        assert_eq!(snapshot.phase, RoundPhase::Idle);
        assert_eq!(snapshot.score, 0);
        assert_eq!(shell.countdown(), None);
    }

    #[test]
    fn countdown_expiry_records_the_result() {
        let mut shell = mug_shot_shell(Duration::from_secs(3));
        shell.start().expect("start");
        assert_eq!(shell.countdown(), Some(Duration::from_millis(1000)));

        let target = first_mug(&shell);
        shell.act(PlayerAction::Target(target));
        let scored = shell.snapshot().score;
        assert!((1..=3).contains(&scored));

        for _ in 0..3 {
            shell.tick();
        }
        let snapshot = shell.snapshot();
        assert_eq!(snapshot.phase, RoundPhase::Finished);
        assert_eq!(snapshot.remaining_ms, 0);
        assert_eq!(snapshot.last_score, Some(scored));
        assert_eq!(shell.countdown(), None);

        // Clicks after the buzzer do not change the frozen score.
        shell.act(PlayerAction::Target(0));
        assert_eq!(shell.snapshot().score, scored);
    }

    #[test]
    fn start_while_active_is_rejected_but_restart_resets() {
        let mut shell = mug_shot_shell(Duration::from_secs(10));
        shell.start().expect("start");
        let target = first_mug(&shell);
        shell.act(PlayerAction::Target(target));
        shell.tick();

        assert!(shell.start().is_err());
        assert_eq!(shell.snapshot().remaining_ms, 9000);

        shell.restart().expect("restart");
        let snapshot = shell.snapshot();
        assert_eq!(snapshot.phase, RoundPhase::Active);
        assert_eq!(snapshot.score, 0);
        assert_eq!(snapshot.remaining_ms, 10_000);
        assert_eq!(snapshot.last_score, None);
    }

    #[test]
    fn teardown_stops_the_countdown() {
        let mut shell = mug_shot_shell(Duration::from_secs(10));
        shell.start().expect("start");
        shell.teardown();

        assert_eq!(shell.countdown(), None);
        shell.tick();
        assert_eq!(shell.snapshot().remaining_ms, 10_000);
        assert!(shell.last_result().is_none());
    }

    #[test]
    fn untimed_round_finishes_when_the_rule_runs_out() {
        let mut shell = GameShell::new(
            procrastination::GAME_ID,
            Box::new(procrastination::ProcrastinationRule::default()),
            Box::new(procrastination::ProcrastinationBoard::default()),
            RoundLength::Untimed,
            Duration::from_millis(1000),
            StdRng::seed_from_u64(0),
            Arc::new(FixedClock::default()),
        );
        shell.start().expect("start");
        assert_eq!(shell.countdown(), None);

        for pick in [0, 0, 1] {
            shell.act(PlayerAction::Target(pick));
        }
        let result = shell.last_result().expect("finished round");
        assert_eq!(result.final_score, 3 + 3 + 1);
        assert_eq!(shell.snapshot().phase, RoundPhase::Finished);
    }

    #[tokio::test]
    async fn finished_rounds_are_reported_when_signed_in() {
        let store = RecordingStore::new();
        let sync = StatsSync::new(Arc::new(store.clone()), Arc::new(signed_in("user-7")));
        let mut shell = mug_shot_shell(Duration::from_secs(5)).with_sync(sync);

        shell.start().expect("start");
        let target = first_mug(&shell);
        shell.act(PlayerAction::Target(target));
        shell.end().expect("end");
        assert!(shell.end().is_err());
        settle_tasks().await;

        let records = store.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].game_id, mug_shot::GAME_ID);
        assert_eq!(records[0].score, shell.snapshot().score);
        assert_eq!(records[0].metadata["mugs_shot"], 1);
    }
}

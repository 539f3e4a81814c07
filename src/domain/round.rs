// Round lifecycle shared by every timed game.

use crate::domain::entities::{Metadata, RoundResult};
use crate::domain::errors::InvalidTransition;
use crate::domain::scoring::{Applied, ScoreEvent, ScoringRule};
use crate::domain::timer::CountdownTimer;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    Idle,
    Active,
    Finished,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoundState {
    pub phase: RoundPhase,
    pub score: i64,
    pub remaining_ms: u64,
    pub started_at: Option<DateTime<Utc>>,
}

impl Default for RoundState {
    fn default() -> Self {
        Self {
            phase: RoundPhase::Idle,
            score: 0,
            remaining_ms: 0,
            started_at: None,
        }
    }
}

/// What a submitted event did to the round.
#[derive(Debug, Clone, PartialEq)]
pub enum Submitted {
    // Round was not active; nothing changed.
    Ignored,
    Scored(Applied),
    // The rule ran out of input and the round finished with this event.
    Completed { applied: Applied, result: RoundResult },
}

/// What a countdown tick did to the round.
#[derive(Debug, Clone, PartialEq)]
pub enum Ticked {
    // No countdown running.
    Idle,
    Counting { remaining_ms: u64 },
    Expired(RoundResult),
}

/// One play session: `Idle -> Active -> Finished`, gated by a countdown and
/// player input, scored by an injected rule.
///
/// `begin` while `Active` is rejected with [`InvalidTransition`] and leaves the
/// round untouched; callers that want "play again" mid-round abandon first.
pub struct RoundMachine<R> {
    game_id: String,
    rule: R,
    timer: CountdownTimer,
    state: RoundState,
}

impl<R: ScoringRule> RoundMachine<R> {
    pub fn new(game_id: impl Into<String>, rule: R) -> Self {
        Self::with_timer(game_id, rule, CountdownTimer::default())
    }

    pub fn with_timer(game_id: impl Into<String>, rule: R, timer: CountdownTimer) -> Self {
        let state = RoundState {
            score: rule.initial_score(),
            ..RoundState::default()
        };
        Self {
            game_id: game_id.into(),
            rule,
            timer,
            state,
        }
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn phase(&self) -> RoundPhase {
        self.state.phase
    }

    pub fn score(&self) -> i64 {
        self.state.score
    }

    pub fn is_counting(&self) -> bool {
        self.timer.is_running()
    }

    /// Starts a round with a countdown of `duration_ms`.
    pub fn begin(&mut self, duration_ms: u64, now: DateTime<Utc>) -> Result<(), InvalidTransition> {
        self.reset_into_active(now, "begin")?;
        self.timer.start(duration_ms);
        self.state.remaining_ms = duration_ms;
        Ok(())
    }

    /// Starts a round that only ends through its rule or `end`.
    pub fn begin_untimed(&mut self, now: DateTime<Utc>) -> Result<(), InvalidTransition> {
        self.reset_into_active(now, "begin")
    }

    fn reset_into_active(
        &mut self,
        now: DateTime<Utc>,
        action: &'static str,
    ) -> Result<(), InvalidTransition> {
        if self.state.phase == RoundPhase::Active {
            return Err(InvalidTransition {
                from: RoundPhase::Active,
                action,
            });
        }

        self.timer.cancel();
        self.rule.reset();
        self.state = RoundState {
            phase: RoundPhase::Active,
            score: self.rule.initial_score(),
            remaining_ms: 0,
            started_at: Some(now),
        };
        Ok(())
    }

    /// Applies `event` through the rule. Ignored unless the round is active.
    pub fn submit(&mut self, event: &ScoreEvent, now: DateTime<Utc>) -> Submitted {
        if self.state.phase != RoundPhase::Active {
            return Submitted::Ignored;
        }

        let applied = self.rule.apply(self.state.score, event);
        self.state.score = applied.score;

        if self.rule.exhausted() {
            let result = self.finish(now);
            return Submitted::Completed { applied, result };
        }
        Submitted::Scored(applied)
    }

    /// Advances the countdown one period.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Ticked {
        if self.state.phase != RoundPhase::Active {
            return Ticked::Idle;
        }
        let Some(tick) = self.timer.tick() else {
            return Ticked::Idle;
        };

        self.state.remaining_ms = tick.remaining_ms;
        if tick.expired {
            return Ticked::Expired(self.finish(now));
        }
        Ticked::Counting {
            remaining_ms: tick.remaining_ms,
        }
    }

    /// Ends an active round early.
    pub fn end(&mut self, now: DateTime<Utc>) -> Result<RoundResult, InvalidTransition> {
        if self.state.phase != RoundPhase::Active {
            return Err(InvalidTransition {
                from: self.state.phase,
                action: "end",
            });
        }
        Ok(self.finish(now))
    }

    /// Drops the current round without a result and stops the countdown.
    pub fn abandon(&mut self) {
        self.timer.cancel();
        if self.state.phase == RoundPhase::Active {
            self.state.phase = RoundPhase::Idle;
        }
    }

    fn finish(&mut self, now: DateTime<Utc>) -> RoundResult {
        self.timer.cancel();
        self.state.phase = RoundPhase::Finished;

        let mut metadata: Metadata = self.rule.metadata();
        if let Some(started_at) = self.state.started_at {
            let played_ms = (now - started_at).num_milliseconds().max(0);
            metadata.insert("played_ms".to_string(), played_ms.into());
        }

        RoundResult {
            game_id: self.game_id.clone(),
            final_score: self.state.score,
            played_at: now,
            metadata,
        }
    }
}

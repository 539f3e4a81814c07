// Reaction-time round: wait for the signal, then click as fast as possible.

use crate::domain::entities::{Metadata, RoundResult, ScoreOrder};
use crate::domain::round::RoundPhase;
use chrono::{DateTime, Utc};
use rand::Rng;
use rand::rngs::StdRng;
use std::collections::VecDeque;
use std::ops::Range;
use std::time::{Duration, Instant};

pub const GAME_ID: &str = "reaction-time";
pub const SCORE_ORDER: ScoreOrder = ScoreOrder::LowerIsBetter;

pub const DELAY_RANGE_MS: Range<u64> = 1000..5000;
// Attempts kept for the running average.
pub const ATTEMPT_HISTORY: usize = 5;

/// Picks the wait before the signal, uniformly in [`DELAY_RANGE_MS`].
pub fn sample_delay(rng: &mut StdRng) -> Duration {
    Duration::from_millis(rng.random_range(DELAY_RANGE_MS))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionPhase {
    Idle,
    // Signal not shown yet; clicking now is too early.
    Waiting { ready_at: Instant },
    Ready { since: Instant },
    Finished(ReactionOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionOutcome {
    TooEarly,
    Reacted { reaction_ms: u64, new_best: bool },
}

/// What a click did.
#[derive(Debug, Clone, PartialEq)]
pub enum ReactionClick {
    Ignored,
    TooEarly,
    Reacted(RoundResult),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionRating {
    Lightning,
    Excellent,
    Great,
    Good,
    Fair,
    Slow,
}

impl ReactionRating {
    pub fn from_ms(reaction_ms: u64) -> Self {
        match reaction_ms {
            0..200 => ReactionRating::Lightning,
            200..250 => ReactionRating::Excellent,
            250..300 => ReactionRating::Great,
            300..400 => ReactionRating::Good,
            400..500 => ReactionRating::Fair,
            _ => ReactionRating::Slow,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ReactionRating::Lightning => "Lightning fast! Are you even human?",
            ReactionRating::Excellent => "Excellent reflexes, top ten percent.",
            ReactionRating::Great => "Great reaction time, well above average.",
            ReactionRating::Good => "Good reflexes, right around average.",
            ReactionRating::Fair => "Not bad, room for improvement.",
            ReactionRating::Slow => "Maybe cut back on the coffee. Or drink more?",
        }
    }
}

/// Reaction test state. Best time and recent attempts survive across rounds.
#[derive(Debug, Clone)]
pub struct ReactionRound {
    phase: ReactionPhase,
    best_ms: Option<u64>,
    attempts: VecDeque<u64>,
}

impl Default for ReactionRound {
    fn default() -> Self {
        Self {
            phase: ReactionPhase::Idle,
            best_ms: None,
            attempts: VecDeque::with_capacity(ATTEMPT_HISTORY),
        }
    }
}

impl ReactionRound {
    pub fn with_best(best_ms: Option<u64>) -> Self {
        Self {
            best_ms,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> ReactionPhase {
        self.phase
    }

    pub fn round_phase(&self) -> RoundPhase {
        match self.phase {
            ReactionPhase::Idle => RoundPhase::Idle,
            ReactionPhase::Waiting { .. } | ReactionPhase::Ready { .. } => RoundPhase::Active,
            ReactionPhase::Finished(_) => RoundPhase::Finished,
        }
    }

    pub fn best_ms(&self) -> Option<u64> {
        self.best_ms
    }

    /// Keeps the better of the current best and `best_ms`.
    pub fn offer_best(&mut self, best_ms: u64) {
        if SCORE_ORDER.improves(best_ms as i64, self.best_ms.map(|b| b as i64)) {
            self.best_ms = Some(best_ms);
        }
    }

    pub fn attempts(&self) -> impl Iterator<Item = u64> + '_ {
        self.attempts.iter().copied()
    }

    pub fn average_ms(&self) -> Option<u64> {
        if self.attempts.is_empty() {
            return None;
        }
        let total: u64 = self.attempts.iter().sum();
        let count = self.attempts.len() as u64;
        Some((total + count / 2) / count)
    }

    /// Deadline for `ready`, while waiting for the signal.
    pub fn ready_at(&self) -> Option<Instant> {
        match self.phase {
            ReactionPhase::Waiting { ready_at } => Some(ready_at),
            _ => None,
        }
    }

    /// Starts waiting for the signal. Restarts from any phase.
    pub fn begin(&mut self, now: Instant, delay: Duration) {
        self.phase = ReactionPhase::Waiting {
            ready_at: now + delay,
        };
    }

    /// Shows the signal. Only meaningful while waiting.
    pub fn ready(&mut self, now: Instant) -> bool {
        if !matches!(self.phase, ReactionPhase::Waiting { .. }) {
            return false;
        }
        self.phase = ReactionPhase::Ready { since: now };
        true
    }

    /// A click at or after the signal deadline counts from the deadline, even
    /// if `ready` has not run yet.
    pub fn click(&mut self, now: Instant, played_at: DateTime<Utc>) -> ReactionClick {
        let since = match self.phase {
            ReactionPhase::Waiting { ready_at } if now >= ready_at => ready_at,
            ReactionPhase::Waiting { .. } => {
                self.phase = ReactionPhase::Finished(ReactionOutcome::TooEarly);
                return ReactionClick::TooEarly;
            }
            ReactionPhase::Ready { since } => since,
            ReactionPhase::Idle | ReactionPhase::Finished(_) => return ReactionClick::Ignored,
        };

        let reaction_ms = now.saturating_duration_since(since).as_millis() as u64;
        let new_best = SCORE_ORDER.improves(reaction_ms as i64, self.best_ms.map(|b| b as i64));
        if new_best {
            self.best_ms = Some(reaction_ms);
        }
        if self.attempts.len() == ATTEMPT_HISTORY {
            self.attempts.pop_front();
        }
        self.attempts.push_back(reaction_ms);

        self.phase = ReactionPhase::Finished(ReactionOutcome::Reacted {
            reaction_ms,
            new_best,
        });
        ReactionClick::Reacted(self.result(reaction_ms, played_at))
    }

    /// Back to idle, dropping a pending signal.
    pub fn abandon(&mut self) {
        self.phase = ReactionPhase::Idle;
    }

    fn result(&self, reaction_ms: u64, played_at: DateTime<Utc>) -> RoundResult {
        let mut metadata = Metadata::new();
        metadata.insert("best_ms".to_string(), self.best_ms.into());
        metadata.insert("average_ms".to_string(), self.average_ms().into());
        RoundResult {
            game_id: GAME_ID.to_string(),
            final_score: reaction_ms as i64,
            played_at,
            metadata,
        }
    }
}

// Scoring rule abstraction shared by every timed game.

use crate::domain::entities::Metadata;
use serde::{Deserialize, Serialize};

/// Player action after a board has resolved it against the current content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum ScoreEvent {
    // Something worth points was hit (grinding a bean, shooting a mug).
    Hit { points: i64 },
    // Input that hit nothing.
    Miss,
    // Something that costs points was hit (a workplace distraction).
    Penalty { points: i64 },
    // Pick of option `index` in a multiple-choice step.
    Choice { index: usize },
    // An answer already judged against the board.
    Answer { correct: bool },
}

impl ScoreEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            ScoreEvent::Hit { .. } => "hit",
            ScoreEvent::Miss => "miss",
            ScoreEvent::Penalty { .. } => "penalty",
            ScoreEvent::Choice { .. } => "choice",
            ScoreEvent::Answer { .. } => "answer",
        }
    }
}

/// Inclusive limits a score is clamped to after every event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreBounds {
    pub floor: Option<i64>,
    pub ceiling: Option<i64>,
}

impl ScoreBounds {
    pub const UNBOUNDED: Self = Self {
        floor: None,
        ceiling: None,
    };

    pub const NON_NEGATIVE: Self = Self {
        floor: Some(0),
        ceiling: None,
    };

    /// Returns the clamped score and whether clamping changed it.
    pub fn clamp(&self, raw: i64) -> (i64, bool) {
        match (self.floor, self.ceiling) {
            (Some(floor), _) if raw < floor => (floor, true),
            (_, Some(ceiling)) if raw > ceiling => (ceiling, true),
            _ => (raw, false),
        }
    }
}

/// Score after applying one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied {
    pub score: i64,
    pub clamped: bool,
}

/// Game-specific translation of player events into score changes.
///
/// Rules may keep per-round state (streaks, levels, scenario index); `reset`
/// is called at the start of every round. The clamp policy is carried by the
/// rule through `bounds`, never by the state machine.
pub trait ScoringRule: Send {
    fn initial_score(&self) -> i64 {
        0
    }

    fn bounds(&self) -> ScoreBounds;

    fn reset(&mut self);

    /// Raw score change for `event`, advancing any rule state.
    fn delta(&mut self, score: i64, event: &ScoreEvent) -> i64;

    fn apply(&mut self, score: i64, event: &ScoreEvent) -> Applied {
        let raw = score.saturating_add(self.delta(score, event));
        let (score, clamped) = self.bounds().clamp(raw);
        Applied { score, clamped }
    }

    /// True once the rule accepts no further input (rounds without a clock).
    fn exhausted(&self) -> bool {
        false
    }

    /// Rule state worth keeping with the final score.
    fn metadata(&self) -> Metadata {
        Metadata::new()
    }
}

impl<R: ScoringRule + ?Sized> ScoringRule for Box<R> {
    fn initial_score(&self) -> i64 {
        (**self).initial_score()
    }

    fn bounds(&self) -> ScoreBounds {
        (**self).bounds()
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn delta(&mut self, score: i64, event: &ScoreEvent) -> i64 {
        (**self).delta(score, event)
    }

    fn apply(&mut self, score: i64, event: &ScoreEvent) -> Applied {
        (**self).apply(score, event)
    }

    fn exhausted(&self) -> bool {
        (**self).exhausted()
    }

    fn metadata(&self) -> Metadata {
        (**self).metadata()
    }
}

// Mug Shot: shoot as many coffee mugs as possible before time runs out.

use crate::domain::board::{Board, PlayerAction};
use crate::domain::entities::Metadata;
use crate::domain::scoring::{ScoreBounds, ScoreEvent, ScoringRule};
use rand::Rng;
use rand::rngs::StdRng;
use std::time::Duration;

pub const GAME_ID: &str = "mug-shot";
pub const ROUND_LENGTH: Duration = Duration::from_secs(60);

pub const MUGS_PER_WAVE: usize = 5;
pub const MIN_MUG_POINTS: i64 = 1;
pub const MAX_MUG_POINTS: i64 = 3;

#[derive(Debug, Clone)]
pub struct MugShotRule {
    bounds: ScoreBounds,
    mugs_shot: u32,
}

impl Default for MugShotRule {
    fn default() -> Self {
        Self::new(ScoreBounds::NON_NEGATIVE)
    }
}

impl MugShotRule {
    pub fn new(bounds: ScoreBounds) -> Self {
        Self {
            bounds,
            mugs_shot: 0,
        }
    }

    pub fn mugs_shot(&self) -> u32 {
        self.mugs_shot
    }
}

impl ScoringRule for MugShotRule {
    fn bounds(&self) -> ScoreBounds {
        self.bounds
    }

    fn reset(&mut self) {
        self.mugs_shot = 0;
    }

    fn delta(&mut self, _score: i64, event: &ScoreEvent) -> i64 {
        match event {
            ScoreEvent::Hit { points } => {
                self.mugs_shot += 1;
                *points
            }
            _ => 0,
        }
    }

    fn metadata(&self) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert("mugs_shot".to_string(), self.mugs_shot.into());
        metadata
    }
}

/// Mugs on the table; an emptied slot stays empty until the wave is cleared.
#[derive(Debug, Clone, Default)]
pub struct MugShotBoard {
    mugs: Vec<Option<i64>>,
}

impl MugShotBoard {
    pub fn mugs(&self) -> &[Option<i64>] {
        &self.mugs
    }

    fn spawn_wave(&mut self, rng: &mut StdRng) {
        self.mugs = (0..MUGS_PER_WAVE)
            .map(|_| Some(rng.random_range(MIN_MUG_POINTS..=MAX_MUG_POINTS)))
            .collect();
    }
}

impl Board for MugShotBoard {
    fn reset(&mut self, rng: &mut StdRng) {
        self.spawn_wave(rng);
    }

    fn resolve(&mut self, action: PlayerAction, rng: &mut StdRng) -> Option<ScoreEvent> {
        let index = match action {
            PlayerAction::Target(index) => index,
            PlayerAction::Press => return Some(ScoreEvent::Miss),
            PlayerAction::Answer(_) => return None,
        };

        let Some(points) = self.mugs.get_mut(index).and_then(Option::take) else {
            return Some(ScoreEvent::Miss);
        };
        if self.mugs.iter().all(Option::is_none) {
            self.spawn_wave(rng);
        }
        Some(ScoreEvent::Hit { points })
    }

    fn describe(&self) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert("mugs".to_string(), self.mugs.clone().into());
        metadata
    }
}

// The Daily Grind: grind beans, avoid the distractions.

use crate::domain::board::{Board, PlayerAction};
use crate::domain::entities::Metadata;
use crate::domain::scoring::{ScoreBounds, ScoreEvent, ScoringRule};
use rand::Rng;
use rand::rngs::StdRng;
use std::time::Duration;

pub const GAME_ID: &str = "daily-grind";
pub const ROUND_LENGTH: Duration = Duration::from_secs(30);

pub const GRIND_POINTS: i64 = 1;
pub const DISTRACTION_PENALTY: i64 = 2;
// Chance per tick that a new distraction pops up.
pub const DISTRACTION_CHANCE: f64 = 0.3;
// Ticks a distraction stays on screen.
pub const DISTRACTION_TTL_TICKS: u32 = 2;

#[derive(Debug, Clone)]
pub struct DailyGrindRule {
    bounds: ScoreBounds,
    grinds: u32,
    distractions_hit: u32,
}

impl Default for DailyGrindRule {
    fn default() -> Self {
        Self::new(ScoreBounds::NON_NEGATIVE)
    }
}

impl DailyGrindRule {
    pub fn new(bounds: ScoreBounds) -> Self {
        Self {
            bounds,
            grinds: 0,
            distractions_hit: 0,
        }
    }
}

impl ScoringRule for DailyGrindRule {
    fn bounds(&self) -> ScoreBounds {
        self.bounds
    }

    fn reset(&mut self) {
        self.grinds = 0;
        self.distractions_hit = 0;
    }

    fn delta(&mut self, _score: i64, event: &ScoreEvent) -> i64 {
        match event {
            ScoreEvent::Hit { points } => {
                self.grinds += 1;
                *points
            }
            ScoreEvent::Penalty { points } => {
                self.distractions_hit += 1;
                -*points
            }
            _ => 0,
        }
    }

    fn metadata(&self) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert("grinds".to_string(), self.grinds.into());
        metadata.insert("distractions_hit".to_string(), self.distractions_hit.into());
        metadata
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistractionKind {
    Email,
    Meeting,
    Notification,
}

impl DistractionKind {
    const ALL: [DistractionKind; 3] = [
        DistractionKind::Email,
        DistractionKind::Meeting,
        DistractionKind::Notification,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DistractionKind::Email => "email",
            DistractionKind::Meeting => "meeting",
            DistractionKind::Notification => "notification",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distraction {
    pub kind: DistractionKind,
    pub ticks_left: u32,
}

#[derive(Debug, Clone)]
pub struct DailyGrindBoard {
    spawn_chance: f64,
    distractions: Vec<Distraction>,
}

impl Default for DailyGrindBoard {
    fn default() -> Self {
        Self::with_spawn_chance(DISTRACTION_CHANCE)
    }
}

impl DailyGrindBoard {
    pub fn with_spawn_chance(spawn_chance: f64) -> Self {
        Self {
            spawn_chance: spawn_chance.clamp(0.0, 1.0),
            distractions: Vec::new(),
        }
    }

    pub fn distractions(&self) -> &[Distraction] {
        &self.distractions
    }
}

impl Board for DailyGrindBoard {
    fn reset(&mut self, _rng: &mut StdRng) {
        self.distractions.clear();
    }

    fn on_tick(&mut self, rng: &mut StdRng) {
        for distraction in &mut self.distractions {
            distraction.ticks_left = distraction.ticks_left.saturating_sub(1);
        }
        self.distractions.retain(|d| d.ticks_left > 0);

        if rng.random_bool(self.spawn_chance) {
            let kind = DistractionKind::ALL[rng.random_range(0..DistractionKind::ALL.len())];
            self.distractions.push(Distraction {
                kind,
                ticks_left: DISTRACTION_TTL_TICKS,
            });
        }
    }

    fn resolve(&mut self, action: PlayerAction, _rng: &mut StdRng) -> Option<ScoreEvent> {
        match action {
            PlayerAction::Press => Some(ScoreEvent::Hit {
                points: GRIND_POINTS,
            }),
            PlayerAction::Target(index) if index < self.distractions.len() => {
                self.distractions.remove(index);
                Some(ScoreEvent::Penalty {
                    points: DISTRACTION_PENALTY,
                })
            }
            PlayerAction::Target(_) => Some(ScoreEvent::Miss),
            PlayerAction::Answer(_) => None,
        }
    }

    fn describe(&self) -> Metadata {
        let kinds: Vec<&str> = self.distractions.iter().map(|d| d.kind.as_str()).collect();
        let mut metadata = Metadata::new();
        metadata.insert("distractions".to_string(), kinds.into());
        metadata
    }
}

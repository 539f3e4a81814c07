// True Color: does the word's meaning match the ink it is printed in?

use crate::domain::board::{Board, PlayerAction};
use crate::domain::entities::Metadata;
use crate::domain::scoring::{ScoreBounds, ScoreEvent, ScoringRule};
use rand::Rng;
use rand::rngs::StdRng;
use std::time::Duration;

pub const GAME_ID: &str = "true-color";
pub const ROUND_LENGTH: Duration = Duration::from_secs(60);

pub const BASE_POINTS: i64 = 10;
pub const STREAK_PER_MULTIPLIER: u32 = 3;
pub const MAX_MULTIPLIER: u32 = 5;

pub const COLORS: [&str; 6] = ["RED", "BLUE", "GREEN", "YELLOW", "PURPLE", "ORANGE"];

/// Streak rule: every third correct answer in a row bumps the multiplier.
#[derive(Debug, Clone)]
pub struct TrueColorRule {
    bounds: ScoreBounds,
    streak: u32,
    best_streak: u32,
    multiplier: u32,
}

impl Default for TrueColorRule {
    fn default() -> Self {
        Self::new(ScoreBounds::NON_NEGATIVE)
    }
}

impl TrueColorRule {
    pub fn new(bounds: ScoreBounds) -> Self {
        Self {
            bounds,
            streak: 0,
            best_streak: 0,
            multiplier: 1,
        }
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn multiplier(&self) -> u32 {
        self.multiplier
    }
}

impl ScoringRule for TrueColorRule {
    fn bounds(&self) -> ScoreBounds {
        self.bounds
    }

    fn reset(&mut self) {
        self.streak = 0;
        self.best_streak = 0;
        self.multiplier = 1;
    }

    fn delta(&mut self, _score: i64, event: &ScoreEvent) -> i64 {
        match event {
            ScoreEvent::Answer { correct: true } => {
                self.streak += 1;
                self.best_streak = self.best_streak.max(self.streak);
                self.multiplier = (self.streak / STREAK_PER_MULTIPLIER + 1).min(MAX_MULTIPLIER);
                BASE_POINTS * i64::from(self.multiplier)
            }
            ScoreEvent::Answer { correct: false } => {
                self.streak = 0;
                self.multiplier = 1;
                0
            }
            _ => 0,
        }
    }

    fn metadata(&self) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert("best_streak".to_string(), self.best_streak.into());
        metadata
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorCard {
    // What the word says.
    pub meaning: &'static str,
    // Colour the word is printed in.
    pub ink: &'static str,
    // Decoy word shown above the card.
    pub display: &'static str,
}

impl ColorCard {
    pub fn random(rng: &mut StdRng) -> Self {
        let mut pick = || COLORS[rng.random_range(0..COLORS.len())];
        Self {
            meaning: pick(),
            ink: pick(),
            display: pick(),
        }
    }

    pub fn is_match(&self) -> bool {
        self.meaning == self.ink
    }
}

#[derive(Debug, Clone, Default)]
pub struct TrueColorBoard {
    card: Option<ColorCard>,
}

impl TrueColorBoard {
    pub fn card(&self) -> Option<ColorCard> {
        self.card
    }
}

impl Board for TrueColorBoard {
    fn reset(&mut self, rng: &mut StdRng) {
        self.card = Some(ColorCard::random(rng));
    }

    fn resolve(&mut self, action: PlayerAction, rng: &mut StdRng) -> Option<ScoreEvent> {
        let PlayerAction::Answer(says_match) = action else {
            return None;
        };
        let card = self.card?;

        self.card = Some(ColorCard::random(rng));
        Some(ScoreEvent::Answer {
            correct: says_match == card.is_match(),
        })
    }

    fn describe(&self) -> Metadata {
        let mut metadata = Metadata::new();
        if let Some(card) = self.card {
            metadata.insert("meaning".to_string(), card.meaning.into());
            metadata.insert("ink".to_string(), card.ink.into());
            metadata.insert("display".to_string(), card.display.into());
        }
        metadata
    }
}

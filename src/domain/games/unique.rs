// Unique Challenge: find the one item whose shape or colour appears nowhere else.

use crate::domain::board::{Board, PlayerAction};
use crate::domain::entities::Metadata;
use crate::domain::scoring::{ScoreBounds, ScoreEvent, ScoringRule};
use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde_json::json;
use std::time::Duration;

pub const GAME_ID: &str = "unique-challenge";
pub const ROUND_LENGTH: Duration = Duration::from_secs(60);

pub const BASE_POINTS: i64 = 10;
pub const POINTS_PER_LEVEL: i64 = 5;
pub const CORRECT_PER_LEVEL: u32 = 3;

pub const SHAPES: [&str; 6] = ["circle", "square", "triangle", "diamond", "star", "hexagon"];
pub const COLORS: [&str; 6] = ["red", "blue", "green", "yellow", "purple", "orange"];

const MIN_INSTANCES: usize = 2;
const MAX_INSTANCES: usize = 4;

fn level_for(correct: u32) -> u32 {
    1 + correct / CORRECT_PER_LEVEL
}

#[derive(Debug, Clone)]
pub struct UniqueRule {
    bounds: ScoreBounds,
    correct: u32,
}

impl Default for UniqueRule {
    fn default() -> Self {
        Self::new(ScoreBounds::NON_NEGATIVE)
    }
}

impl UniqueRule {
    pub fn new(bounds: ScoreBounds) -> Self {
        Self { bounds, correct: 0 }
    }

    pub fn level(&self) -> u32 {
        level_for(self.correct)
    }
}

impl ScoringRule for UniqueRule {
    fn bounds(&self) -> ScoreBounds {
        self.bounds
    }

    fn reset(&mut self) {
        self.correct = 0;
    }

    fn delta(&mut self, _score: i64, event: &ScoreEvent) -> i64 {
        match event {
            ScoreEvent::Answer { correct: true } => {
                // Points use the level the puzzle was solved at.
                let points = BASE_POINTS + i64::from(self.level()) * POINTS_PER_LEVEL;
                self.correct += 1;
                points
            }
            _ => 0,
        }
    }

    fn metadata(&self) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert("level".to_string(), self.level().into());
        metadata.insert("correct_answers".to_string(), self.correct.into());
        metadata
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueBy {
    Shape,
    Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub shape: &'static str,
    pub color: &'static str,
    pub unique: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    pub difficulty: u32,
    pub unique_by: UniqueBy,
    pub cells: Vec<Cell>,
}

impl Puzzle {
    /// Builds a grid of repeated (shape, colour) pairs plus exactly one item
    /// that is the only one of its shape, or the only one of its colour.
    pub fn generate(difficulty: u32, rng: &mut StdRng) -> Self {
        let grid_size = (8 + difficulty as usize / 2).min(20);
        let groups = (3 + difficulty as usize / 3).min(6);

        loop {
            let mut cells: Vec<Cell> = Vec::with_capacity(grid_size);
            for _ in 0..groups {
                let room = grid_size - 1 - cells.len();
                if room < MIN_INSTANCES {
                    break;
                }
                let shape = SHAPES[rng.random_range(0..SHAPES.len())];
                let color = COLORS[rng.random_range(0..COLORS.len())];
                let instances = rng.random_range(MIN_INSTANCES..=MAX_INSTANCES).min(room);
                cells.extend((0..instances).map(|_| Cell {
                    shape,
                    color,
                    unique: false,
                }));
            }

            let free_shapes: Vec<&'static str> = SHAPES
                .into_iter()
                .filter(|s| cells.iter().all(|c| c.shape != *s))
                .collect();
            let free_colors: Vec<&'static str> = COLORS
                .into_iter()
                .filter(|col| cells.iter().all(|c| c.color != *col))
                .collect();

            let prefer_shape = rng.random_bool(0.5);
            let unique_by = match (free_shapes.is_empty(), free_colors.is_empty()) {
                // Every shape and colour is taken; lay out a new grid.
                (true, true) => continue,
                (false, true) => UniqueBy::Shape,
                (true, false) => UniqueBy::Color,
                (false, false) if prefer_shape => UniqueBy::Shape,
                (false, false) => UniqueBy::Color,
            };

            // The odd one out must only stand out on one axis.
            let taken = cells[rng.random_range(0..cells.len())];
            let unique = match unique_by {
                UniqueBy::Shape => Cell {
                    shape: free_shapes[rng.random_range(0..free_shapes.len())],
                    color: taken.color,
                    unique: true,
                },
                UniqueBy::Color => Cell {
                    shape: taken.shape,
                    color: free_colors[rng.random_range(0..free_colors.len())],
                    unique: true,
                },
            };
            cells.push(unique);
            cells.shuffle(rng);

            return Self {
                difficulty,
                unique_by,
                cells,
            };
        }
    }

    pub fn unique_index(&self) -> Option<usize> {
        self.cells.iter().position(|c| c.unique)
    }
}

#[derive(Debug, Clone, Default)]
pub struct UniqueBoard {
    correct: u32,
    puzzle: Option<Puzzle>,
}

impl UniqueBoard {
    pub fn puzzle(&self) -> Option<&Puzzle> {
        self.puzzle.as_ref()
    }
}

impl Board for UniqueBoard {
    fn reset(&mut self, rng: &mut StdRng) {
        self.correct = 0;
        self.puzzle = Some(Puzzle::generate(level_for(0), rng));
    }

    fn resolve(&mut self, action: PlayerAction, rng: &mut StdRng) -> Option<ScoreEvent> {
        let PlayerAction::Target(index) = action else {
            return None;
        };
        let cell = *self.puzzle.as_ref()?.cells.get(index)?;

        if cell.unique {
            self.correct += 1;
            self.puzzle = Some(Puzzle::generate(level_for(self.correct), rng));
        }
        Some(ScoreEvent::Answer {
            correct: cell.unique,
        })
    }

    fn describe(&self) -> Metadata {
        let mut metadata = Metadata::new();
        if let Some(puzzle) = &self.puzzle {
            let cells: Vec<_> = puzzle
                .cells
                .iter()
                .map(|c| json!({ "shape": c.shape, "color": c.color }))
                .collect();
            metadata.insert("difficulty".to_string(), puzzle.difficulty.into());
            metadata.insert("cells".to_string(), cells.into());
        }
        metadata
    }
}

// Registry of playable games and the factory that builds their shells.

use super::reaction::ReactionShell;
use super::shell::{Game, GameShell, RoundLength};
use super::stats_sync::StatsSync;
use crate::domain::games::{daily_grind, mug_shot, procrastination, true_color, unique};
use crate::domain::ports::Clock;
use crate::domain::reaction;
use crate::domain::{Board, ScoreOrder, ScoringRule};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameKind {
    Timed(Duration),
    Untimed,
    Reaction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameDescriptor {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub order: ScoreOrder,
    pub kind: GameKind,
}

pub static GAMES: [GameDescriptor; 6] = [
    GameDescriptor {
        id: daily_grind::GAME_ID,
        title: "The Daily Grind",
        description: "Grind coffee beans while swatting away workplace distractions.",
        order: ScoreOrder::HigherIsBetter,
        kind: GameKind::Timed(daily_grind::ROUND_LENGTH),
    },
    GameDescriptor {
        id: procrastination::GAME_ID,
        title: "Procrastination Station",
        description: "Pick your way through very relatable ways of avoiding work.",
        order: ScoreOrder::HigherIsBetter,
        kind: GameKind::Untimed,
    },
    GameDescriptor {
        id: mug_shot::GAME_ID,
        title: "Mug Shot",
        description: "Shoot as many coffee mugs as you can before time runs out.",
        order: ScoreOrder::HigherIsBetter,
        kind: GameKind::Timed(mug_shot::ROUND_LENGTH),
    },
    GameDescriptor {
        id: reaction::GAME_ID,
        title: "Reaction Time",
        description: "Click the moment the signal appears. Lower is better.",
        order: reaction::SCORE_ORDER,
        kind: GameKind::Reaction,
    },
    GameDescriptor {
        id: true_color::GAME_ID,
        title: "True Color Challenge",
        description: "Does the word match its ink? Streaks multiply your points.",
        order: ScoreOrder::HigherIsBetter,
        kind: GameKind::Timed(true_color::ROUND_LENGTH),
    },
    GameDescriptor {
        id: unique::GAME_ID,
        title: "Unique Challenge",
        description: "Find the one item whose shape or colour appears nowhere else.",
        order: ScoreOrder::HigherIsBetter,
        kind: GameKind::Timed(unique::ROUND_LENGTH),
    },
];

/// Builds ready-to-run shells that share one clock and one stats sync.
#[derive(Clone)]
pub struct GameCatalog {
    clock: Arc<dyn Clock>,
    sync: Option<StatsSync>,
    tick: Duration,
    round_length: Option<Duration>,
    seed: Option<u64>,
}

impl GameCatalog {
    pub fn new(clock: Arc<dyn Clock>, sync: Option<StatsSync>, tick: Duration) -> Self {
        Self {
            clock,
            sync,
            tick,
            round_length: None,
            seed: None,
        }
    }

    /// Overrides the countdown of every timed game.
    pub fn with_round_length(mut self, length: Duration) -> Self {
        self.round_length = Some(length);
        self
    }

    /// Makes board content reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn games(&self) -> &'static [GameDescriptor] {
        &GAMES
    }

    pub fn find(&self, id: &str) -> Option<&'static GameDescriptor> {
        GAMES.iter().find(|game| game.id == id)
    }

    /// Unknown ids count higher scores as better.
    pub fn score_order(&self, id: &str) -> ScoreOrder {
        self.find(id).map_or(ScoreOrder::HigherIsBetter, |game| game.order)
    }

    pub fn sync(&self) -> Option<&StatsSync> {
        self.sync.as_ref()
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    pub fn build(&self, id: &str) -> Option<Box<dyn Game>> {
        let descriptor = self.find(id)?;
        let length = match descriptor.kind {
            GameKind::Reaction => return Some(Box::new(self.reaction_shell(None))),
            GameKind::Timed(length) => RoundLength::Countdown(self.round_length.unwrap_or(length)),
            GameKind::Untimed => RoundLength::Untimed,
        };

        let (rule, board): (Box<dyn ScoringRule>, Box<dyn Board>) = match descriptor.id {
            daily_grind::GAME_ID => (
                Box::new(daily_grind::DailyGrindRule::default()),
                Box::new(daily_grind::DailyGrindBoard::default()),
            ),
            procrastination::GAME_ID => (
                Box::new(procrastination::ProcrastinationRule::default()),
                Box::new(procrastination::ProcrastinationBoard::default()),
            ),
            mug_shot::GAME_ID => (
                Box::new(mug_shot::MugShotRule::default()),
                Box::new(mug_shot::MugShotBoard::default()),
            ),
            true_color::GAME_ID => (
                Box::new(true_color::TrueColorRule::default()),
                Box::new(true_color::TrueColorBoard::default()),
            ),
            unique::GAME_ID => (
                Box::new(unique::UniqueRule::default()),
                Box::new(unique::UniqueBoard::default()),
            ),
            _ => return None,
        };

        let shell = GameShell::new(
            descriptor.id,
            rule,
            board,
            length,
            self.tick,
            self.rng(),
            self.clock.clone(),
        );
        Some(match &self.sync {
            Some(sync) => Box::new(shell.with_sync(sync.clone())),
            None => Box::new(shell),
        })
    }

    /// Like [`build`](Self::build), but first reads back what the stats
    /// service knows about the player (the reaction test's personal best).
    pub async fn launch(&self, id: &str) -> Option<Box<dyn Game>> {
        let descriptor = self.find(id)?;
        if descriptor.kind != GameKind::Reaction {
            return self.build(id);
        }

        let best_ms = match &self.sync {
            Some(sync) => sync
                .best_score(descriptor.id, descriptor.order)
                .await
                .and_then(|ms| u64::try_from(ms).ok()),
            None => None,
        };
        Some(Box::new(self.reaction_shell(best_ms)))
    }

    fn reaction_shell(&self, best_ms: Option<u64>) -> ReactionShell {
        let shell = ReactionShell::new(self.rng(), self.clock.clone()).with_best(best_ms);
        match &self.sync {
            Some(sync) => shell.with_sync(sync.clone()),
            None => shell,
        }
    }
}

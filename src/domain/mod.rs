// Domain layer: round lifecycle, scoring rules and game content.

pub mod board;
pub mod entities;
pub mod errors;
pub mod games;
pub mod ports;
pub mod reaction;
pub mod round;
pub mod scoring;
pub mod summary;
pub mod timer;

pub use board::{Board, PlayerAction};
pub use entities::{
    Identity, LeaderboardEntry, Metadata, RoundResult, ScoreOrder, ScoreRecord,
};
pub use errors::{InvalidTransition, SyncError};
pub use round::{RoundMachine, RoundPhase, RoundState, Submitted, Ticked};
pub use scoring::{Applied, ScoreBounds, ScoreEvent, ScoringRule};
pub use summary::{GameSummary, StatsSummary};
pub use timer::{CountdownTimer, Tick};

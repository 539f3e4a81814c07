// Use-case level inputs/outputs for game sessions.

use crate::domain::{Metadata, PlayerAction, RoundPhase};
use serde::Serialize;

/// Commands a front-end sends to a running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Start,
    // Start over, abandoning a round in progress.
    Restart,
    Act(PlayerAction),
    End,
    // Leave the game and hand control back to the hub.
    Back,
}

/// Presentation-agnostic view of a game at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShellSnapshot {
    pub game_id: String,
    pub phase: RoundPhase,
    pub score: i64,
    pub remaining_ms: u64,
    // Game-specific content (mugs, card, puzzle, reaction state).
    pub board: Metadata,
    // Final score of the last finished round.
    pub last_score: Option<i64>,
}

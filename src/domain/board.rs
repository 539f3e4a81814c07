// Per-game content that turns raw player actions into scoring events.

use crate::domain::entities::Metadata;
use crate::domain::scoring::ScoreEvent;
use rand::rngs::StdRng;
use serde::Deserialize;

/// Raw input from the player, before any game has interpreted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum PlayerAction {
    // The game's main button (grind, click the reaction box).
    Press,
    // Click on the item at this index of the board.
    Target(usize),
    // Yes/no answer.
    Answer(bool),
}

pub trait Board: Send {
    /// Lays out fresh content for a new round.
    fn reset(&mut self, rng: &mut StdRng);

    /// Called once per countdown tick while the round is active.
    fn on_tick(&mut self, _rng: &mut StdRng) {}

    /// Resolves `action` against the current content. `None` means the action
    /// has no meaning for this game and should be dropped.
    fn resolve(&mut self, action: PlayerAction, rng: &mut StdRng) -> Option<ScoreEvent>;

    /// Current content for display.
    fn describe(&self) -> Metadata;
}

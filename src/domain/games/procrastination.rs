// Procrastination Station: pick how to avoid work, one scenario at a time.

use crate::domain::board::{Board, PlayerAction};
use crate::domain::entities::Metadata;
use crate::domain::scoring::{ScoreBounds, ScoreEvent, ScoringRule};
use rand::rngs::StdRng;
use serde_json::json;

pub const GAME_ID: &str = "procrastination-station";

pub struct Choice {
    pub text: &'static str,
    pub points: i64,
    pub outcome: &'static str,
}

pub struct Scenario {
    pub situation: &'static str,
    pub choices: [Choice; 3],
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("situation", &self.situation)
            .finish_non_exhaustive()
    }
}

pub static SCENARIOS: [Scenario; 3] = [
    Scenario {
        situation: "Deadline in two hours, and you just found a long article on the history of paperclips.",
        choices: [
            Choice {
                text: "Read all of it, then follow five more links",
                points: 3,
                outcome: "You are now a paperclip historian. The deadline is not impressed.",
            },
            Choice {
                text: "Bookmark it and get back to work",
                points: 1,
                outcome: "Very responsible. You will never open that bookmark.",
            },
            Choice {
                text: "Just the introduction",
                points: 2,
                outcome: "The introduction led to the invention section. Three hours passed.",
            },
        ],
    },
    Scenario {
        situation: "Your coffee break ended twenty minutes ago, but the hot dog sandwich debate is heating up.",
        choices: [
            Choice {
                text: "Keep arguing, this matters",
                points: 3,
                outcome: "Three strangers now believe hot dogs are tacos. Your boss does not.",
            },
            Choice {
                text: "Go back to work, reluctantly",
                points: 1,
                outcome: "Back at your desk, refreshing the thread every minute.",
            },
            Choice {
                text: "Post one final mic-drop reply",
                points: 2,
                outcome: "Your final reply drew forty more. The debate goes on without you.",
            },
        ],
    },
    Scenario {
        situation: "You opened the laptop for a presentation and ended up in a video about bubble wrap.",
        choices: [
            Choice {
                text: "Binge the whole packaging series",
                points: 3,
                outcome: "Industrial packaging expert. Blank presentation.",
            },
            Choice {
                text: "Close it and start working",
                points: 1,
                outcome: "Working, but still thinking about the bubbles.",
            },
            Choice {
                text: "One more, about cardboard",
                points: 2,
                outcome: "One became five. You now understand the cardboard supply chain.",
            },
        ],
    },
];

/// Adds the points of each pick; exhausted after the last scenario.
#[derive(Debug, Clone)]
pub struct ProcrastinationRule {
    bounds: ScoreBounds,
    scenarios: &'static [Scenario],
    picks: Vec<usize>,
}

impl Default for ProcrastinationRule {
    fn default() -> Self {
        Self::new(&SCENARIOS, ScoreBounds::UNBOUNDED)
    }
}

impl ProcrastinationRule {
    pub fn new(scenarios: &'static [Scenario], bounds: ScoreBounds) -> Self {
        Self {
            bounds,
            scenarios,
            picks: Vec::new(),
        }
    }

    pub fn current(&self) -> Option<&'static Scenario> {
        self.scenarios.get(self.picks.len())
    }
}

impl ScoringRule for ProcrastinationRule {
    fn bounds(&self) -> ScoreBounds {
        self.bounds
    }

    fn reset(&mut self) {
        self.picks.clear();
    }

    fn delta(&mut self, _score: i64, event: &ScoreEvent) -> i64 {
        let ScoreEvent::Choice { index } = event else {
            return 0;
        };
        let Some(choice) = self.current().and_then(|s| s.choices.get(*index)) else {
            return 0;
        };

        self.picks.push(*index);
        choice.points
    }

    fn exhausted(&self) -> bool {
        self.picks.len() >= self.scenarios.len()
    }

    fn metadata(&self) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert("choices".to_string(), self.picks.clone().into());
        metadata
    }
}

/// Shows the scenario the player is on and the outcome of their last pick.
#[derive(Debug, Clone)]
pub struct ProcrastinationBoard {
    scenarios: &'static [Scenario],
    position: usize,
    last_outcome: Option<&'static str>,
}

impl Default for ProcrastinationBoard {
    fn default() -> Self {
        Self {
            scenarios: &SCENARIOS,
            position: 0,
            last_outcome: None,
        }
    }
}

impl Board for ProcrastinationBoard {
    fn reset(&mut self, _rng: &mut StdRng) {
        self.position = 0;
        self.last_outcome = None;
    }

    fn resolve(&mut self, action: PlayerAction, _rng: &mut StdRng) -> Option<ScoreEvent> {
        let PlayerAction::Target(index) = action else {
            return None;
        };
        let choice = self.scenarios.get(self.position)?.choices.get(index)?;

        self.position += 1;
        self.last_outcome = Some(choice.outcome);
        Some(ScoreEvent::Choice { index })
    }

    fn describe(&self) -> Metadata {
        let mut metadata = Metadata::new();
        if let Some(scenario) = self.scenarios.get(self.position) {
            let choices: Vec<&str> = scenario.choices.iter().map(|c| c.text).collect();
            metadata.insert(
                "scenario".to_string(),
                json!({ "situation": scenario.situation, "choices": choices }),
            );
        }
        if let Some(outcome) = self.last_outcome {
            metadata.insert("last_outcome".to_string(), outcome.into());
        }
        metadata
    }
}

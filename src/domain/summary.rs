// Per-game totals folded from a player's saved rounds.

use crate::domain::entities::{ScoreOrder, ScoreRecord};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSummary {
    pub game_id: String,
    pub plays: usize,
    pub best: i64,
    // Mean score, rounded half up.
    pub average: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsSummary {
    pub total_games: usize,
    /// One entry per game, in order of first appearance in the records.
    pub games: Vec<GameSummary>,
}

impl StatsSummary {
    /// Folds `records`; `order_of` says which way each game's best points.
    pub fn from_records<F>(records: &[ScoreRecord], order_of: F) -> Self
    where
        F: Fn(&str) -> ScoreOrder,
    {
        let mut totals: Vec<(GameSummary, i64)> = Vec::new();
        for record in records {
            let position = match totals.iter().position(|(g, _)| g.game_id == record.game_id) {
                Some(position) => position,
                None => {
                    totals.push((
                        GameSummary {
                            game_id: record.game_id.clone(),
                            plays: 0,
                            best: record.score,
                            average: 0,
                        },
                        0,
                    ));
                    totals.len() - 1
                }
            };

            let (game, sum) = &mut totals[position];
            if order_of(&game.game_id).improves(record.score, Some(game.best)) {
                game.best = record.score;
            }
            game.plays += 1;
            *sum += record.score;
        }

        let games = totals
            .into_iter()
            .map(|(mut game, sum)| {
                game.average = rounded_mean(sum, game.plays as i64);
                game
            })
            .collect();
        Self {
            total_games: records.len(),
            games,
        }
    }

    pub fn game(&self, game_id: &str) -> Option<&GameSummary> {
        self.games.iter().find(|game| game.game_id == game_id)
    }
}

fn rounded_mean(sum: i64, count: i64) -> i64 {
    (2 * sum + count).div_euclid(2 * count)
}

// Line-oriented front end: parses typed commands and renders snapshots.

use crate::domain::{LeaderboardEntry, PlayerAction, RoundPhase, ScoreRecord, StatsSummary};
use crate::use_cases::{GameDescriptor, SessionCommand, ShellSnapshot};
use std::fmt::{self, Write};

pub const HELP: &str = "\
hub:     list | play <game-id> | history [game-id] | stats | top <game-id> | help | quit
account: signin <email> <password> | signup <email> <password> <username> | signout
in game: start | restart | press | target <n> | yes | no | end | back
         or a JSON action, e.g. {\"type\":\"target\",\"data\":2}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubCommand {
    List,
    Play(String),
    History(Option<String>),
    Stats,
    Leaderboard(String),
    SignIn {
        email: String,
        password: String,
    },
    SignUp {
        email: String,
        password: String,
        username: String,
    },
    SignOut,
    Help,
    Quit,
    Session(SessionCommand),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    Unknown(String),
    MissingArgument(&'static str),
    BadIndex(String),
    BadAction(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => write!(f, "empty command"),
            ParseError::Unknown(word) => write!(f, "unknown command `{word}` (try `help`)"),
            ParseError::MissingArgument(what) => write!(f, "missing {what}"),
            ParseError::BadIndex(raw) => write!(f, "`{raw}` is not a board position"),
            ParseError::BadAction(err) => write!(f, "invalid action: {err}"),
        }
    }
}

impl std::error::Error for ParseError {}

pub fn parse_line(line: &str) -> Result<HubCommand, ParseError> {
    let line = line.trim();
    if line.starts_with('{') {
        let action: PlayerAction =
            serde_json::from_str(line).map_err(|err| ParseError::BadAction(err.to_string()))?;
        return Ok(HubCommand::Session(SessionCommand::Act(action)));
    }

    let mut words = line.split_whitespace();
    let Some(first) = words.next() else {
        return Err(ParseError::Empty);
    };
    let argument = words.next();

    let command = match first.to_ascii_lowercase().as_str() {
        "list" | "games" => HubCommand::List,
        "play" => HubCommand::Play(
            argument
                .ok_or(ParseError::MissingArgument("game id"))?
                .to_string(),
        ),
        "history" => HubCommand::History(argument.map(str::to_string)),
        "stats" => HubCommand::Stats,
        "top" | "leaderboard" => HubCommand::Leaderboard(
            argument
                .ok_or(ParseError::MissingArgument("game id"))?
                .to_string(),
        ),
        "signin" | "login" => HubCommand::SignIn {
            email: argument.ok_or(ParseError::MissingArgument("email"))?.to_string(),
            password: words
                .next()
                .ok_or(ParseError::MissingArgument("password"))?
                .to_string(),
        },
        "signup" | "register" => HubCommand::SignUp {
            email: argument.ok_or(ParseError::MissingArgument("email"))?.to_string(),
            password: words
                .next()
                .ok_or(ParseError::MissingArgument("password"))?
                .to_string(),
            username: words
                .next()
                .ok_or(ParseError::MissingArgument("username"))?
                .to_string(),
        },
        "signout" | "logout" => HubCommand::SignOut,
        "help" | "?" => HubCommand::Help,
        "quit" | "exit" => HubCommand::Quit,
        "start" => HubCommand::Session(SessionCommand::Start),
        "restart" | "again" => HubCommand::Session(SessionCommand::Restart),
        "press" | "p" | "click" | "grind" => {
            HubCommand::Session(SessionCommand::Act(PlayerAction::Press))
        }
        "target" | "t" | "pick" => {
            let raw = argument.ok_or(ParseError::MissingArgument("board position"))?;
            let index = raw
                .parse::<usize>()
                .map_err(|_| ParseError::BadIndex(raw.to_string()))?;
            HubCommand::Session(SessionCommand::Act(PlayerAction::Target(index)))
        }
        "yes" | "y" => HubCommand::Session(SessionCommand::Act(PlayerAction::Answer(true))),
        "no" | "n" => HubCommand::Session(SessionCommand::Act(PlayerAction::Answer(false))),
        "end" => HubCommand::Session(SessionCommand::End),
        "back" => HubCommand::Session(SessionCommand::Back),
        _ => return Err(ParseError::Unknown(first.to_string())),
    };
    Ok(command)
}

pub fn render_catalog(games: &[GameDescriptor]) -> String {
    let mut out = String::from("games:\n");
    for game in games {
        let _ = writeln!(out, "  {:<24} {} - {}", game.id, game.title, game.description);
    }
    out
}

pub fn render_snapshot(snapshot: &ShellSnapshot) -> String {
    let mut out = format!("[{}] ", snapshot.game_id);
    match snapshot.phase {
        RoundPhase::Idle => out.push_str("ready, type `start`"),
        RoundPhase::Active => {
            let _ = write!(out, "score {}", snapshot.score);
            if snapshot.remaining_ms > 0 {
                let _ = write!(out, " | {}s left", snapshot.remaining_ms.div_ceil(1000));
            }
        }
        RoundPhase::Finished => {
            let _ = write!(out, "finished with {}", snapshot.score);
        }
    }
    if let Some(last) = snapshot.last_score {
        let _ = write!(out, " | last score {last}");
    }
    if !snapshot.board.is_empty() {
        let board = serde_json::to_string(&snapshot.board).unwrap_or_default();
        let _ = write!(out, "\n  {board}");
    }
    out
}

pub fn render_history(records: &[ScoreRecord]) -> String {
    if records.is_empty() {
        return "no saved rounds yet".to_string();
    }
    let mut out = String::new();
    for record in records {
        let _ = writeln!(
            out,
            "  {} {:<24} {}",
            record.played_at.format("%Y-%m-%d %H:%M"),
            record.game_id,
            record.score
        );
    }
    out
}

fn title_of<'a>(games: &'a [GameDescriptor], game_id: &'a str) -> &'a str {
    games
        .iter()
        .find(|game| game.id == game_id)
        .map_or(game_id, |game| game.title)
}

pub fn render_summary(summary: &StatsSummary, games: &[GameDescriptor]) -> String {
    if summary.games.is_empty() {
        return "no saved rounds yet".to_string();
    }
    let mut out = format!(
        "{} rounds across {} games\n",
        summary.total_games,
        summary.games.len()
    );
    for game in &summary.games {
        let _ = writeln!(
            out,
            "  {:<24} {:>4} plays | best {} | average {}",
            title_of(games, &game.game_id),
            game.plays,
            game.best,
            game.average
        );
    }
    out
}

pub fn render_leaderboard(title: &str, entries: &[LeaderboardEntry]) -> String {
    if entries.is_empty() {
        return format!("no scores for {title} yet");
    }
    let mut out = format!("{title} leaderboard\n");
    for (rank, entry) in entries.iter().enumerate() {
        let name = entry.username.as_deref().unwrap_or("anonymous");
        let _ = writeln!(out, "  {:>2}. {:<20} {}", rank + 1, name, entry.score);
    }
    out
}

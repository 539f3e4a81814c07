// Wire DTOs and conversions for the hosted stats/auth REST service.
// Domain types never derive the service's row shape directly.

use crate::domain::{Identity, LeaderboardEntry, Metadata, ScoreRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the `game_stats` table, as written and read back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRowDto {
    pub user_id: String,
    pub game_id: String,
    pub score: i64,
    #[serde(default)]
    pub metadata: Metadata,
    pub played_at: DateTime<Utc>,
}

impl From<ScoreRecord> for ScoreRowDto {
    fn from(record: ScoreRecord) -> Self {
        Self {
            user_id: record.user_id,
            game_id: record.game_id,
            score: record.score,
            metadata: record.metadata,
            played_at: record.played_at,
        }
    }
}

impl From<ScoreRowDto> for ScoreRecord {
    fn from(row: ScoreRowDto) -> Self {
        Self {
            user_id: row.user_id,
            game_id: row.game_id,
            score: row.score,
            metadata: row.metadata,
            played_at: row.played_at,
        }
    }
}

// `select=score` projection used for best-score lookups.
#[derive(Debug, Clone, Deserialize)]
pub struct BestScoreRow {
    pub score: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileDto {
    pub username: Option<String>,
}

// `select=user_id,score,played_at,profiles(username)` with the profile embedded.
#[derive(Debug, Clone, Deserialize)]
pub struct LeaderboardRowDto {
    pub user_id: String,
    pub score: i64,
    pub played_at: DateTime<Utc>,
    #[serde(default)]
    pub profiles: Option<ProfileDto>,
}

impl From<LeaderboardRowDto> for LeaderboardEntry {
    fn from(row: LeaderboardRowDto) -> Self {
        Self {
            user_id: row.user_id,
            username: row.profiles.and_then(|profile| profile.username),
            score: row.score,
            played_at: row.played_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SignInRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SignUpRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    // Stored as user metadata; the profile row copies the username.
    pub data: SignUpData<'a>,
}

#[derive(Debug, Serialize)]
pub struct SignUpData<'a> {
    pub username: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionUser {
    pub id: String,
}

/// Token grant returned by a successful sign-in.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionResponse {
    pub access_token: String,
    pub user: SessionUser,
}

impl From<SessionResponse> for Identity {
    fn from(session: SessionResponse) -> Self {
        Self {
            user_id: session.user.id,
            access_token: session.access_token,
        }
    }
}

/// Sign-up reply: a session when the account is usable at once, otherwise
/// the bare user while the email address awaits confirmation.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SignUpResponse {
    Session(SessionResponse),
    Pending(SessionUser),
}

/// Error body; the REST and auth endpoints name the field differently.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    #[serde(alias = "msg", alias = "error_description")]
    pub message: Option<String>,
}

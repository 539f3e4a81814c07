// Domain-level errors for round and stats workflows.

use crate::domain::round::RoundPhase;
use std::fmt;

/// A lifecycle call that is not valid in the current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: RoundPhase,
    pub action: &'static str,
}

impl fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot {} a round in phase {:?}", self.action, self.from)
    }
}

impl std::error::Error for InvalidTransition {}

/// Failure talking to the persistence service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    Transport(String),
    Rejected {
        status: u16,
        message: Option<String>,
    },
    Decode(String),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::Transport(err) => write!(f, "stats transport error: {err}"),
            SyncError::Rejected { status, message } => {
                if let Some(message) = message {
                    write!(f, "stats service rejected request {status}: {message}")
                } else {
                    write!(f, "stats service rejected request {status}")
                }
            }
            SyncError::Decode(err) => write!(f, "stats response decode error: {err}"),
        }
    }
}

impl std::error::Error for SyncError {}

// Use cases layer: game shells, sessions and stats reporting.

pub mod catalog;
pub mod reaction;
pub mod session;
pub mod shell;
pub mod stats_sync;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use catalog::{GameCatalog, GameDescriptor, GameKind};
pub use session::{SessionHandle, spawn_session};
pub use shell::{Game, GameShell, RoundLength};
pub use stats_sync::{StatsSync, SyncOutcome};
pub use types::{SessionCommand, ShellSnapshot};

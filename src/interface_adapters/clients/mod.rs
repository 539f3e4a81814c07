// Clients for the hosted stats and auth service.

pub mod auth;
pub mod stats;

pub use auth::{AuthClient, AuthError, SignUpOutcome};
pub use stats::StatsClient;

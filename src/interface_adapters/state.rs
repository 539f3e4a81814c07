use crate::interface_adapters::clients::AuthClient;
use crate::interface_adapters::identity::SessionIdentity;
use crate::use_cases::GameCatalog;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    // Builds a shell for whichever game the player picks.
    pub catalog: GameCatalog,
    // Signed-in player, shared with the stats sync.
    pub identity: Arc<SessionIdentity>,
    // Only present when a stats service is configured.
    pub auth_client: Option<Arc<AuthClient>>,
}

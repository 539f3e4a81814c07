use crate::domain::Identity;
use crate::domain::ports::IdentitySource;
use std::sync::{PoisonError, RwLock};

// Holds whoever is signed in for the lifetime of the process.
#[derive(Debug, Default)]
pub struct SessionIdentity {
    current: RwLock<Option<Identity>>,
}

impl SessionIdentity {
    pub fn set(&self, identity: Identity) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(identity);
    }

    pub fn clear(&self) -> Option<Identity> {
        self.current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl IdentitySource for SessionIdentity {
    fn current(&self) -> Option<Identity> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_in_then_out() {
        let identity = SessionIdentity::default();
        assert_eq!(identity.current(), None);

        let player = Identity {
            user_id: "u-9".to_string(),
            access_token: "jwt".to_string(),
        };
        identity.set(player.clone());
        assert_eq!(identity.current(), Some(player.clone()));
        assert_eq!(identity.clear(), Some(player));
        assert_eq!(identity.current(), None);
    }
}

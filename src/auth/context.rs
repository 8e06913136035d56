//! Process-wide client session: client, persisted storage and observable state

use std::sync::Arc;
use tracing::warn;

use crate::auth::client::AuthClient;
use crate::auth::persist::{FileStorage, KeyValueStorage, PersistedAuth};
use crate::auth::state::AuthState;
use crate::auth::store::Subscription;
use crate::config::Config;
use crate::error::Result;

/// Constructed once at start-up and passed by reference to whatever needs auth
pub struct AuthContext {
    state: AuthState,
    _persistence: Subscription,
}

impl AuthContext {
    /// Open the context using the file storage named in the config
    pub fn open(config: &Config) -> Result<Self> {
        let storage: Arc<dyn KeyValueStorage> = Arc::new(FileStorage::new(&config.storage.path));
        let client = AuthClient::new(&config.auth)?;
        Ok(Self::with_storage(client, storage, &config.storage.key))
    }

    /// Restore the persisted session, start mirroring changes back to storage,
    /// then build the observable state on top of the restored store
    pub fn with_storage(client: AuthClient, storage: Arc<dyn KeyValueStorage>, key: &str) -> Self {
        let client = Arc::new(client);

        if let Err(e) = PersistedAuth::restore(storage.as_ref(), key, client.store()) {
            warn!("Ignoring unreadable auth storage: {}", e);
        }

        let persistence = PersistedAuth::attach(storage, key, client.store());
        let state = AuthState::new(client);

        Self {
            state,
            _persistence: persistence,
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn client(&self) -> &Arc<AuthClient> {
        self.state.client()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::AuthRecord;
    use crate::auth::persist::MemoryStorage;
    use crate::config::AuthConfig;

    fn client() -> AuthClient {
        AuthClient::new(&AuthConfig::default()).expect("client should build")
    }

    #[test]
    fn test_session_survives_restart() {
        let storage: Arc<dyn KeyValueStorage> = Arc::new(MemoryStorage::new());
        let record = AuthRecord::new("u1", "ada", "ada@example.com");

        {
            let ctx = AuthContext::with_storage(client(), Arc::clone(&storage), "pocketbase_auth");
            assert!(!ctx.state().is_authenticated());
            ctx.client().store().save("tok", Some(record.clone()));
        }

        let ctx = AuthContext::with_storage(client(), Arc::clone(&storage), "pocketbase_auth");
        assert!(ctx.state().is_authenticated());
        assert_eq!(ctx.state().user(), Some(record));

        ctx.state().logout();
        assert!(storage.get("pocketbase_auth").unwrap().is_none());
    }
}

//! Observable auth state derived from a client's token store

use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};

use crate::auth::client::AuthClient;
use crate::auth::models::{AuthRecord, AuthResponse, AuthSnapshot};
use crate::auth::store::Subscription;
use crate::error::Result;

/// Read-only view of who is signed in
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthView {
    pub user: Option<AuthRecord>,
    pub is_authenticated: bool,
}

impl From<&AuthSnapshot> for AuthView {
    fn from(snapshot: &AuthSnapshot) -> Self {
        Self {
            user: snapshot.record.clone(),
            is_authenticated: snapshot.has_token(),
        }
    }
}

/// Mirrors the client's token store.
///
/// Seeded from whatever the store already holds, so a session restored from
/// storage is visible immediately. Stays subscribed until dropped.
pub struct AuthState {
    client: Arc<AuthClient>,
    view: Arc<RwLock<AuthView>>,
    _subscription: Subscription,
}

impl AuthState {
    pub fn new(client: Arc<AuthClient>) -> Self {
        let view = Arc::new(RwLock::new(AuthView::from(&client.store().snapshot())));

        let target = Arc::clone(&view);
        let subscription = client.store().on_change(move |snapshot| {
            *target.write().unwrap_or_else(PoisonError::into_inner) = AuthView::from(snapshot);
        });

        Self {
            client,
            view,
            _subscription: subscription,
        }
    }

    pub fn user(&self) -> Option<AuthRecord> {
        self.view().user
    }

    pub fn is_authenticated(&self) -> bool {
        self.view().is_authenticated
    }

    pub fn view(&self) -> AuthView {
        self.view.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn client(&self) -> &Arc<AuthClient> {
        &self.client
    }

    pub async fn login(&self, identifier: &str, secret: &str) -> Result<AuthResponse> {
        self.client.login(identifier, secret).await
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        secret: &str,
        secret_confirm: &str,
    ) -> Result<AuthRecord> {
        self.client
            .register(username, email, secret, secret_confirm)
            .await
    }

    pub fn logout(&self) {
        self.client.logout();
    }

    /// Observe changes to the derived view
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&AuthView) + Send + Sync + 'static,
    {
        self.client
            .store()
            .on_change(move |snapshot| listener(&AuthView::from(snapshot)))
    }
}

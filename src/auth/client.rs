//! Client for the external identity provider (PocketBase record auth API)

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::auth::models::{
    AuthRecord, AuthResponse, LoginRequest, ProviderErrorBody, RegisterRequest,
};
use crate::auth::store::AuthStore;
use crate::config::AuthConfig;
use crate::error::{Error, Result};

/// Auth provider client bound to one auth collection.
///
/// Each client owns its own [`AuthStore`]. Calls are never cancelled by the
/// client itself: starting a new request does not abort one in flight.
pub struct AuthClient {
    base_url: String,
    collection: String,
    http: reqwest::Client,
    timeout: Option<Duration>,
    store: Arc<AuthStore>,
}

impl AuthClient {
    /// Create a client with its own connection pool
    pub fn new(config: &AuthConfig) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self::with_http(config, http))
    }

    /// Create a client over an existing connection pool with a fresh token store
    pub fn with_http(config: &AuthConfig, http: reqwest::Client) -> Self {
        Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            collection: config.collection.clone(),
            http,
            timeout: config.timeout_secs.map(Duration::from_secs),
            store: Arc::new(AuthStore::new()),
        }
    }

    pub fn store(&self) -> &Arc<AuthStore> {
        &self.store
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Authenticate with an identity (username or email) and password
    pub async fn auth_with_password(&self, identity: &str, password: &str) -> Result<AuthResponse> {
        debug!("Authenticating '{}' against {}", identity, self.collection);

        let body = LoginRequest {
            identity: identity.to_string(),
            password: password.to_string(),
        };
        let request = self
            .http
            .post(self.collection_url("auth-with-password"))
            .json(&body);

        let auth: AuthResponse = self.send(request).await?;
        self.store.save(auth.token.clone(), Some(auth.record.clone()));
        info!("Authenticated user {}", auth.record.id);
        Ok(auth)
    }

    /// Exchange the stored token for a fresh one and an up-to-date record
    pub async fn auth_refresh(&self) -> Result<AuthResponse> {
        let request = self
            .http
            .post(self.collection_url("auth-refresh"))
            .header(reqwest::header::AUTHORIZATION, self.store.token());

        let auth: AuthResponse = self.send(request).await?;
        self.store.save(auth.token.clone(), Some(auth.record.clone()));
        debug!("Refreshed session for user {}", auth.record.id);
        Ok(auth)
    }

    /// Create a new account record. Does not sign the user in.
    pub async fn create(&self, data: &RegisterRequest) -> Result<AuthRecord> {
        let request = self
            .http
            .post(format!(
                "{}/api/collections/{}/records",
                self.base_url, self.collection
            ))
            .json(data);

        let record: AuthRecord = self.send(request).await?;
        info!("Created account {} ({})", record.id, record.username);
        Ok(record)
    }

    pub async fn login(&self, identifier: &str, secret: &str) -> Result<AuthResponse> {
        self.auth_with_password(identifier, secret).await
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        secret: &str,
        secret_confirm: &str,
    ) -> Result<AuthRecord> {
        self.create(&RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: secret.to_string(),
            password_confirm: secret_confirm.to_string(),
        })
        .await
    }

    /// Clear the session locally; the provider keeps no server-side session
    pub fn logout(&self) {
        self.store.clear();
    }

    fn collection_url(&self, action: &str) -> String {
        format!(
            "{}/api/collections/{}/{}",
            self.base_url, self.collection, action
        )
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let request = match self.timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let text = response.text().await.unwrap_or_default();
        let body: ProviderErrorBody = serde_json::from_str(&text).unwrap_or_default();
        let message = if body.message.is_empty() {
            "Something went wrong while processing your request.".to_string()
        } else {
            body.message
        };

        Err(Error::Provider {
            status: if body.status == 0 { status.as_u16() } else { body.status },
            message,
            data: body.data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_are_built_from_config() {
        let config = AuthConfig {
            url: "http://127.0.0.1:8090/".to_string(),
            ..AuthConfig::default()
        };
        let client = AuthClient::new(&config).expect("client should build");

        assert_eq!(client.base_url(), "http://127.0.0.1:8090");
        assert_eq!(
            client.collection_url("auth-refresh"),
            "http://127.0.0.1:8090/api/collections/smlt_users/auth-refresh"
        );
    }

    #[test]
    fn test_logout_clears_store() {
        let client = AuthClient::new(&AuthConfig::default()).expect("client should build");
        client
            .store()
            .save("tok", Some(AuthRecord::new("u1", "ada", "ada@example.com")));

        client.logout();
        assert!(client.store().token().is_empty());
        assert!(client.store().record().is_none());
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_transport_error() {
        let config = AuthConfig {
            url: "http://127.0.0.1:9".to_string(),
            timeout_secs: Some(2),
            ..AuthConfig::default()
        };
        let client = AuthClient::new(&config).expect("client should build");

        let result = client.login("ada", "secret").await;
        assert!(matches!(result, Err(Error::Http(_))));
        assert!(client.store().token().is_empty());
    }
}

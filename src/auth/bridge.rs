//! Per-request session bridge between the `pb_auth` cookie and a fresh auth client

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{
        header::{COOKIE, SET_COOKIE},
        request::Parts,
        HeaderMap, HeaderValue, StatusCode,
    },
    middleware::Next,
    response::Response,
};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::api::server::SharedState;
use crate::auth::client::AuthClient;
use crate::auth::models::AuthRecord;

/// Identity resolved for the current request, `None` when anonymous
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<AuthRecord>);

/// The request-scoped auth client; mutations are reflected in the response cookie
#[derive(Clone)]
pub struct RequestAuth(pub Arc<AuthClient>);

/// Restore, refresh, expose and re-emit the session for every request
pub async fn session_bridge(
    State(state): State<SharedState>,
    mut req: Request,
    next: Next,
) -> Response {
    let client = Arc::new(AuthClient::with_http(&state.config.auth, state.http.clone()));

    let cookie_header = cookie_header(req.headers());
    client
        .store()
        .load_from_cookie(&cookie_header, &state.cookie.name);

    let user = refresh_session(&client).await;

    req.extensions_mut().insert(CurrentUser(user));
    req.extensions_mut().insert(RequestAuth(Arc::clone(&client)));

    let mut response = next.run(req).await;

    let set_cookie = client.store().export_to_cookie(&state.cookie);
    match HeaderValue::from_str(&set_cookie) {
        Ok(value) => {
            response.headers_mut().append(SET_COOKIE, value);
        }
        Err(e) => warn!("Failed to encode session cookie: {}", e),
    }

    response
}

/// Bring a restored session up to date with the provider.
///
/// A structurally valid token is refreshed exactly once. Any failure
/// (rejected token, unreachable provider) demotes the request to anonymous
/// instead of failing it.
pub async fn refresh_session(client: &AuthClient) -> Option<AuthRecord> {
    let store = client.store();

    if !store.is_valid() {
        if !store.token().is_empty() {
            debug!("Discarding expired or malformed session token");
            store.clear();
        }
        return None;
    }

    match client.auth_refresh().await {
        Ok(auth) => Some(auth.record),
        Err(e) => {
            warn!("Session refresh failed, continuing as anonymous: {}", e);
            store.clear();
            None
        }
    }
}

/// All `Cookie` headers joined, as HTTP/2 clients may split them
fn cookie_header(headers: &HeaderMap) -> String {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect::<Vec<_>>()
        .join("; ")
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .unwrap_or_default())
    }
}

impl<S> FromRequestParts<S> for RequestAuth
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<RequestAuth>().cloned().ok_or_else(|| {
            tracing::error!("Session bridge is not installed on this route");
            StatusCode::INTERNAL_SERVER_ERROR
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::tests::issue_token;
    use crate::config::AuthConfig;

    fn offline_client() -> AuthClient {
        let config = AuthConfig {
            url: "http://127.0.0.1:9".to_string(),
            timeout_secs: Some(2),
            ..AuthConfig::default()
        };
        AuthClient::new(&config).expect("client should build")
    }

    #[tokio::test]
    async fn test_no_session_stays_anonymous() {
        let client = offline_client();
        assert!(refresh_session(&client).await.is_none());
        assert!(client.store().token().is_empty());
    }

    #[tokio::test]
    async fn test_expired_token_is_cleared_without_network() {
        let client = offline_client();
        client.store().save(
            issue_token("u1", -60),
            Some(AuthRecord::new("u1", "ada", "ada@example.com")),
        );

        assert!(refresh_session(&client).await.is_none());
        assert!(client.store().token().is_empty());
        assert!(client.store().record().is_none());
    }

    #[tokio::test]
    async fn test_unreachable_provider_demotes_to_anonymous() {
        let client = offline_client();
        client.store().save(
            issue_token("u1", 3600),
            Some(AuthRecord::new("u1", "ada", "ada@example.com")),
        );

        assert!(refresh_session(&client).await.is_none());
        assert!(client.store().token().is_empty());
    }

    #[test]
    fn test_cookie_headers_are_joined() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("a=1"));
        headers.append(COOKIE, HeaderValue::from_static("pb_auth=x"));
        assert_eq!(cookie_header(&headers), "a=1; pb_auth=x");
    }
}

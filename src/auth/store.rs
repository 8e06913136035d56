//! In-memory token store with change notification
//!
//! The store holds the current session token and identity record. Every
//! mutation replaces the whole snapshot and synchronously notifies the
//! registered listeners, in registration order. Listeners are detached by
//! dropping (or calling `unsubscribe` on) the returned [`Subscription`].

use axum_extra::extract::cookie::{Cookie, SameSite};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::auth::models::{AuthRecord, AuthSnapshot};
use crate::auth::token;
use crate::config::{AuthConfig, CookieSameSite};

/// Browsers drop cookies larger than this
const MAX_COOKIE_SIZE: usize = 4096;

type Listener = Arc<dyn Fn(&AuthSnapshot) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

/// Token store for a single client instance
pub struct AuthStore {
    snapshot: RwLock<AuthSnapshot>,
    listeners: Arc<Mutex<Listeners>>,
}

impl AuthStore {
    /// Create an empty (anonymous) store
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(AuthSnapshot::default()),
            listeners: Arc::new(Mutex::new(Listeners::default())),
        }
    }

    /// Current token, empty when anonymous
    pub fn token(&self) -> String {
        self.read().token.clone()
    }

    /// Current identity record
    pub fn record(&self) -> Option<AuthRecord> {
        self.read().record.clone()
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        self.read().clone()
    }

    /// True when the token is present, decodes, and has not expired
    pub fn is_valid(&self) -> bool {
        !token::is_token_expired(&self.read().token)
    }

    /// Replace the stored token and record
    pub fn save(&self, token: impl Into<String>, record: Option<AuthRecord>) {
        let snapshot = AuthSnapshot::new(token, record);
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = snapshot.clone();
        self.notify(&snapshot);
    }

    /// Drop the session and notify listeners with the empty state
    pub fn clear(&self) {
        self.save(String::new(), None);
    }

    /// Register a change listener
    pub fn on_change<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&AuthSnapshot) + Send + Sync + 'static,
    {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.push((id, Arc::new(listener)));

        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
            active: true,
        }
    }

    /// Number of attached listeners
    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    /// Restore the store from a `Cookie` request header.
    ///
    /// A missing cookie or an undecodable value leaves the store anonymous.
    pub fn load_from_cookie(&self, header: &str, cookie_name: &str) {
        let raw = Cookie::split_parse_encoded(header)
            .filter_map(|cookie| cookie.ok())
            .find(|cookie| cookie.name() == cookie_name)
            .map(|cookie| cookie.value().to_string());

        let snapshot = raw
            .and_then(|value| serde_json::from_str::<AuthSnapshot>(&value).ok())
            .unwrap_or_default();

        self.save(snapshot.token, snapshot.record);
    }

    /// Serialize the current state as a `Set-Cookie` header value.
    ///
    /// The cookie expires together with the token; anonymous state produces
    /// an already-expired cookie so the browser drops any stale session.
    pub fn export_to_cookie(&self, options: &CookieOptions) -> String {
        let mut snapshot = self.snapshot();

        let expires = match token::decode_claims(&snapshot.token).and_then(|claims| claims.exp) {
            Some(exp) => cookie_expiry(exp),
            None => OffsetDateTime::UNIX_EPOCH,
        };

        let cookie = options.build(&snapshot, expires);
        if cookie.len() <= MAX_COOKIE_SIZE {
            return cookie;
        }

        match snapshot.record.take() {
            Some(record) => {
                snapshot.record = Some(record.minimal());
                options.build(&snapshot, expires)
            }
            None => cookie,
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, AuthSnapshot> {
        self.snapshot.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, snapshot: &AuthSnapshot) {
        // Listeners run outside the lock so they may subscribe or unsubscribe
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            listener(snapshot);
        }
    }
}

/// Cookie expiry for a token `exp`, clamped to the representable range
fn cookie_expiry(exp: i64) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(exp).unwrap_or_else(|_| {
        if exp > 0 {
            PrimitiveDateTime::MAX.assume_utc()
        } else {
            OffsetDateTime::UNIX_EPOCH
        }
    })
}

impl Default for AuthStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a registered change listener.
///
/// Dropping the handle detaches the listener.
#[must_use = "dropping a Subscription immediately unsubscribes the listener"]
pub struct Subscription {
    id: u64,
    listeners: Weak<Mutex<Listeners>>,
    active: bool,
}

impl Subscription {
    /// Detach the listener now
    pub fn unsubscribe(mut self) {
        self.remove();
    }

    /// Keep the listener attached for as long as the store lives
    pub fn detach(mut self) {
        self.active = false;
    }

    fn remove(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Some(listeners) = self.listeners.upgrade() {
            listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .entries
                .retain(|(id, _)| *id != self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.remove();
    }
}

/// Attributes of the session cookie
#[derive(Debug, Clone)]
pub struct CookieOptions {
    pub name: String,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: CookieSameSite,
}

impl CookieOptions {
    fn build(&self, snapshot: &AuthSnapshot, expires: OffsetDateTime) -> String {
        let value = serde_json::to_string(snapshot).unwrap_or_else(|e| {
            tracing::error!("Failed to serialize auth state: {}", e);
            String::new()
        });

        let same_site = match self.same_site {
            CookieSameSite::Strict => SameSite::Strict,
            CookieSameSite::Lax => SameSite::Lax,
            CookieSameSite::None => SameSite::None,
        };

        Cookie::build((self.name.clone(), value))
            .path(self.path.clone())
            .secure(self.secure)
            .http_only(self.http_only)
            .same_site(same_site)
            .expires(expires)
            .build()
            .encoded()
            .to_string()
    }
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self::from(&AuthConfig::default())
    }
}

impl From<&AuthConfig> for CookieOptions {
    fn from(config: &AuthConfig) -> Self {
        Self {
            name: config.cookie_name.clone(),
            path: "/".to_string(),
            secure: config.cookie_secure,
            http_only: config.cookie_http_only,
            same_site: config.cookie_same_site,
        }
    }
}

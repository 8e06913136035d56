//! Authentication: provider client, token store and session synchronization

pub mod bridge;
pub mod client;
pub mod context;
pub mod models;
pub mod persist;
pub mod state;
pub mod store;
pub mod token;

pub use bridge::{refresh_session, session_bridge, CurrentUser, RequestAuth};
pub use client::AuthClient;
pub use context::AuthContext;
pub use models::{AuthRecord, AuthResponse, AuthSnapshot, RegisterRequest, SessionInfo};
pub use persist::{FileStorage, KeyValueStorage, MemoryStorage, PersistedAuth};
pub use state::{AuthState, AuthView};
pub use store::{AuthStore, CookieOptions, Subscription};
pub use token::{decode_claims, is_token_expired, token_expiry, TokenClaims};

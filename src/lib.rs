//! smlt - courses, lessons and quizzes backed by PocketBase sessions
//!
//! This is the library interface for smlt: content loading, the auth
//! provider client, and the session bridge used by the HTTP server.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod content;
pub mod error;

pub use auth::{AuthClient, AuthContext, AuthState};
pub use config::Config;
pub use content::ContentRepository;
pub use error::Error;

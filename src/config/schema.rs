//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub content: ContentConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

/// Server configuration for the HTTP API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served at `/`; content documents live under `<static_dir>/data`
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5173
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("./static")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

/// Identity provider (PocketBase) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_auth_url")]
    pub url: String,

    #[serde(default = "default_collection")]
    pub collection: String,

    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    #[serde(default = "default_true")]
    pub cookie_secure: bool,

    #[serde(default = "default_true")]
    pub cookie_http_only: bool,

    #[serde(default)]
    pub cookie_same_site: CookieSameSite,

    /// Per-request timeout for provider calls; unset means wait indefinitely
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_auth_url() -> String {
    std::env::var("PUBLIC_POCKETBASE_URL")
        .ok()
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| "https://sciminds.cloud".to_string())
}

fn default_collection() -> String {
    "smlt_users".to_string()
}

fn default_cookie_name() -> String {
    "pb_auth".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            url: default_auth_url(),
            collection: default_collection(),
            cookie_name: default_cookie_name(),
            cookie_secure: true,
            cookie_http_only: true,
            cookie_same_site: CookieSameSite::default(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CookieSameSite {
    #[default]
    Strict,
    Lax,
    None,
}

/// Where the course/lesson/quiz documents are read from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// A directory path or an `http(s)://` base URL
    #[serde(default = "default_content_source")]
    pub source: String,
}

fn default_content_source() -> String {
    "./static".to_string()
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            source: default_content_source(),
        }
    }
}

/// Persisted client-side auth storage used by the CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,

    #[serde(default = "default_storage_key")]
    pub key: String,
}

fn default_storage_path() -> PathBuf {
    PathBuf::from(".smlt/storage.json")
}

fn default_storage_key() -> String {
    "pocketbase_auth".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            key: default_storage_key(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").expect("empty config should parse");
        assert_eq!(config.server.port, 5173);
        assert_eq!(config.auth.collection, "smlt_users");
        assert_eq!(config.auth.cookie_name, "pb_auth");
        assert_eq!(config.auth.cookie_same_site, CookieSameSite::Strict);
        assert_eq!(config.storage.key, "pocketbase_auth");
        assert_eq!(config.content.source, "./static");
    }

    #[test]
    fn test_partial_auth_section() {
        let config: Config = toml::from_str(
            r#"
            [auth]
            url = "http://127.0.0.1:8090"
            cookie_secure = false
            cookie_same_site = "lax"
            "#,
        )
        .expect("config should parse");

        assert_eq!(config.auth.url, "http://127.0.0.1:8090");
        assert!(!config.auth.cookie_secure);
        assert!(config.auth.cookie_http_only);
        assert_eq!(config.auth.cookie_same_site, CookieSameSite::Lax);
        assert_eq!(config.auth.collection, "smlt_users");
    }
}

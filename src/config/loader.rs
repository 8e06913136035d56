//! Configuration loading and environment variable interpolation

use crate::error::{Error, Result};
use regex::Regex;
use std::env;
use std::fs;
use std::path::Path;

use super::Config;

pub const CONFIG_FILENAME: &str = "smlt.toml";

/// Load configuration from smlt.toml, falling back to defaults when none exists
pub fn load_config() -> Result<Config> {
    match find_config_file() {
        Ok(config_path) => load_config_from_path(&config_path),
        Err(Error::ConfigNotFound) => {
            tracing::debug!("No {} found, using defaults", CONFIG_FILENAME);
            Ok(Config::default())
        }
        Err(e) => Err(e),
    }
}

/// Load configuration from a specific path
pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|_| Error::ConfigNotFound)?;
    let content = interpolate_env_vars(&content);
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

/// Find the configuration file, searching upward from current directory
fn find_config_file() -> Result<std::path::PathBuf> {
    let mut current = env::current_dir().map_err(|e| Error::Config(e.to_string()))?;

    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Ok(config_path);
        }

        if !current.pop() {
            return Err(Error::ConfigNotFound);
        }
    }
}

/// Interpolate environment variables in the format ${VAR_NAME} or ${VAR_NAME:-default}
fn interpolate_env_vars(content: &str) -> String {
    // Compile-time constant pattern; a failure here is a bug, not a runtime condition
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}")
        .expect("Invalid regex pattern - this is a bug in the codebase");

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");

        env::var(var_name).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}

/// Generate a default configuration file content
pub fn default_config_content() -> &'static str {
    r#"# smlt configuration

[server]
host = "0.0.0.0"
port = 5173
# Served at /, content documents are read from <static_dir>/data/*.json
static_dir = "./static"

[auth]
url = "${PUBLIC_POCKETBASE_URL:-https://sciminds.cloud}"
collection = "smlt_users"
cookie_name = "pb_auth"
cookie_secure = true
cookie_http_only = true
cookie_same_site = "strict"  # or "lax", "none"
# timeout_secs = 30

[content]
# A directory or an http(s):// base URL serving /data/courses.json etc.
source = "./static"

[storage]
# Persisted login used by the CLI
path = ".smlt/storage.json"
key = "pocketbase_auth"
"#
}

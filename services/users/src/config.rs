//! Service configuration
//!
//! Values are layered: built-in defaults, then an optional `config/users`
//! file (TOML, YAML or JSON), then `USERS_`-prefixed environment variables
//! using `__` between nested keys, e.g. `USERS_AUTH__PASSWORD=secret`.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::{fmt, path::PathBuf};
use subtle::ConstantTimeEq;

/// Top-level service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub photos: PhotoConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// The single static credential accepted on `/api/**`
#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
}

impl AuthConfig {
    pub fn matches(&self, username: &str, password: &str) -> bool {
        let username = self.username.as_bytes().ct_eq(username.as_bytes());
        let password = self.password.as_bytes().ct_eq(password.as_bytes());
        (username & password).into()
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoConfig {
    /// Directory photos are stored in, created on demand
    pub root_dir: PathBuf,
    /// Upper bound for request bodies, uploads included
    pub max_upload_bytes: usize,
}

impl AppConfig {
    /// Load configuration from defaults, `config/users.*` and the environment
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080_i64)?
            .set_default("auth.username", "admin")?
            .set_default("auth.password", "admin")?
            .set_default("photos.root_dir", "photos_dir")?
            .set_default("photos.max_upload_bytes", 10_i64 * 1024 * 1024)?
            .add_source(File::with_name("config/users").required(false))
            .add_source(
                Environment::with_prefix("USERS")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}

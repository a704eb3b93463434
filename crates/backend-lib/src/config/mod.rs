// ============================
// crates/backend-lib/src/config/mod.rs
// ============================
//! Configuration management.
//!
//! Settings are layered: built-in defaults, then a TOML file, then
//! `IDENTITY_`-prefixed environment variables (`__` separates sections,
//! e.g. `IDENTITY_AUTH__JWT_SECRET`).
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{ensure, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::auth::lockout::{DEFAULT_FAILED_LOGIN_THRESHOLD, DEFAULT_LOCKOUT_WINDOW};
use crate::auth::password::{PasswordRequirements, MIN_PASSWORD_LENGTH};
use crate::auth::token::DEFAULT_TOKEN_EXPIRY;


/// Config file read when no explicit path is given
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "IDENTITY_";

/// Longest accepted lockout window or token lifetime (ten years)
pub const MAX_DURATION_SECS: u64 = 10 * 365 * 86_400;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub log: LogSettings,
    pub auth: AuthSettings,
    pub password: PasswordRequirements,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerSettings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Prefix every API route is mounted under
    pub api_prefix: String,
}

/// Which account store backs the server
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    Memory,
    #[default]
    FlatFile,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    /// Data directory path
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogSettings {
    /// Default filter level, overridden by `RUST_LOG`
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

/// Lockout and token settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AuthSettings {
    /// Consecutive failures that lock an account
    pub failed_login_threshold: u32,
    /// Lifetime of failure counters and lockout flags
    pub lockout_window_secs: u64,
    /// Session token lifetime
    pub token_expiry_secs: u64,
    pub token_issuer: String,
    /// HMAC secret for session tokens. Required.
    pub jwt_secret: String,
    /// How often expired counters are swept from memory
    pub counter_sweep_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            api_prefix: "/api/v1".to_string(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            data_dir: PathBuf::from("data"),
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            failed_login_threshold: DEFAULT_FAILED_LOGIN_THRESHOLD,
            lockout_window_secs: DEFAULT_LOCKOUT_WINDOW.as_secs(),
            token_expiry_secs: DEFAULT_TOKEN_EXPIRY.as_secs(),
            token_issuer: "identity".to_string(),
            jwt_secret: String::new(),
            counter_sweep_secs: 300,
        }
    }
}

impl AuthSettings {
    pub fn lockout_window(&self) -> Duration {
        Duration::from_secs(self.lockout_window_secs)
    }

    pub fn token_expiry(&self) -> Duration {
        Duration::from_secs(self.token_expiry_secs)
    }

    pub fn counter_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.counter_sweep_secs)
    }
}

impl Settings {
    /// Load settings from defaults, a TOML file and the environment.
    /// `None` reads `config.toml` from the working directory if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        let settings: Settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        ensure!(
            LOG_LEVELS.contains(&self.log.level.to_lowercase().as_str()),
            "log.level must be one of {LOG_LEVELS:?}"
        );
        ensure!(
            self.server.api_prefix.is_empty() || self.server.api_prefix.starts_with('/'),
            "server.api_prefix must start with '/'"
        );
        ensure!(
            self.auth.failed_login_threshold > 0,
            "auth.failed_login_threshold must be at least 1"
        );
        ensure!(self.auth.lockout_window_secs > 0, "auth.lockout_window_secs must be positive");
        ensure!(
            self.auth.lockout_window_secs <= MAX_DURATION_SECS,
            "auth.lockout_window_secs must not exceed {MAX_DURATION_SECS}"
        );
        ensure!(self.auth.token_expiry_secs > 0, "auth.token_expiry_secs must be positive");
        ensure!(
            self.auth.token_expiry_secs <= MAX_DURATION_SECS,
            "auth.token_expiry_secs must not exceed {MAX_DURATION_SECS}"
        );
        ensure!(self.auth.counter_sweep_secs > 0, "auth.counter_sweep_secs must be positive");
        ensure!(!self.auth.token_issuer.trim().is_empty(), "auth.token_issuer must be set");
        ensure!(!self.auth.jwt_secret.is_empty(), "auth.jwt_secret must be set");
        ensure!(
            self.password.min_length >= MIN_PASSWORD_LENGTH,
            "password.min_length must be at least {MIN_PASSWORD_LENGTH}"
        );
        Ok(())
    }
}

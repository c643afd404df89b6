//! Configuration loading.
//!
//! Settings come from an optional TOML file, then from the process
//! environment, which always wins. The hosted-database endpoint and access
//! key are normally supplied only through the environment:
//!
//! | Variable | Setting |
//! |----------|---------|
//! | `SUPABASE_URL` | `database.url` |
//! | `SUPABASE_KEY` | `database.key` |
//! | `STOCKROOM_BACKEND` | `database.backend` |
//! | `STOCKROOM_SQLITE_PATH` | `database.sqlite_path` |
//! | `STOCKROOM_BIND` | `server.bind` |
//! | `STOCKROOM_LOG` | `log.level` |

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use stockroom_core::service::DEFAULT_LIST_FAILURE_MESSAGE;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Which [`ItemStore`](stockroom_core::ItemStore) implementation to build.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Hosted PostgREST endpoint (Supabase).
    #[default]
    Postgrest,
    /// Local SQLite file.
    Sqlite,
    /// Process memory; contents are lost on exit.
    Memory,
}

impl std::str::FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgrest" | "supabase" => Ok(Backend::Postgrest),
            "sqlite" => Ok(Backend::Sqlite),
            "memory" => Ok(Backend::Memory),
            other => bail!(
                "Unknown database backend: '{}'. Must be postgrest, sqlite, or memory.",
                other
            ),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: Backend,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default = "default_schema")]
    pub schema: String,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_sqlite_path")]
    pub sqlite_path: PathBuf,
    /// Per-request timeout for the hosted backend. Unset means the HTTP
    /// client's own behaviour applies.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            url: None,
            key: None,
            schema: default_schema(),
            table: default_table(),
            sqlite_path: default_sqlite_path(),
            timeout_secs: None,
        }
    }
}

fn default_schema() -> String {
    "public".to_string()
}
fn default_table() -> String {
    "items".to_string()
}
fn default_sqlite_path() -> PathBuf {
    PathBuf::from("./data/stockroom.sqlite")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct UiConfig {
    /// Shown instead of the listing when the store cannot be queried.
    #[serde(default = "default_list_error_message")]
    pub list_error_message: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            list_error_message: default_list_error_message(),
        }
    }
}

fn default_list_error_message() -> String {
    DEFAULT_LIST_FAILURE_MESSAGE.to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive, e.g. `info` or `stockroom=debug`.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `text` or `json`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "text".to_string()
}

impl Config {
    /// Defaults with an in-memory backend. Used by tests and demos.
    pub fn in_memory() -> Self {
        let mut config = Config::default();
        config.database.backend = Backend::Memory;
        config
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("SUPABASE_URL") {
            self.database.url = Some(url);
        }
        if let Some(key) = lookup("SUPABASE_KEY") {
            self.database.key = Some(key);
        }
        if let Some(backend) = lookup("STOCKROOM_BACKEND") {
            self.database.backend = backend.parse()?;
        }
        if let Some(path) = lookup("STOCKROOM_SQLITE_PATH") {
            self.database.sqlite_path = PathBuf::from(path);
        }
        if let Some(bind) = lookup("STOCKROOM_BIND") {
            self.server.bind = bind;
        }
        if let Some(level) = lookup("STOCKROOM_LOG") {
            self.log.level = level;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let db = &self.database;

        if db.backend == Backend::Postgrest {
            if db.url.as_deref().map_or(true, |u| u.trim().is_empty()) {
                bail!("SUPABASE_URL must be set when database.backend is 'postgrest'");
            }
            if db.key.as_deref().map_or(true, |k| k.trim().is_empty()) {
                bail!("SUPABASE_KEY must be set when database.backend is 'postgrest'");
            }
        }

        if db.schema.trim().is_empty() {
            bail!("database.schema must not be empty");
        }
        if db.table.trim().is_empty() {
            bail!("database.table must not be empty");
        }
        if db.timeout_secs == Some(0) {
            bail!("database.timeout_secs must be > 0 when set");
        }

        match self.log.format.as_str() {
            "text" | "json" => {}
            other => bail!("Unknown log format: '{}'. Must be text or json.", other),
        }

        Ok(())
    }
}

/// Load configuration from `path` (skipped if the file does not exist),
/// then the environment, then validate.
pub fn load_config(path: &Path) -> Result<Config> {
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content).with_context(|| "Failed to parse config file")?
    } else {
        Config::default()
    };

    config.apply_env(|key| std::env::var(key).ok())?;
    config.validate()?;

    Ok(config)
}

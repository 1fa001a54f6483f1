//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. `DATABASE_URL` (mapped onto `database.url`)
//! 2. Environment variables (prefix: `COLLOC_`, nesting with `__`, e.g. `COLLOC_SERVICE__PORT`)
//! 3. Current working directory: ./config.toml
//! 4. XDG config directory: ~/.config/collocation-search/config.toml
//! 5. System directory: /etc/collocation-search/config.toml
//! 6. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::search::filters::{DEFAULT_EXAMPLES_LIMIT, DEFAULT_RESULTS_LIMIT};

const APP_DIR: &str = "collocation-search";
const ENV_PREFIX: &str = "COLLOC_";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service configuration
    pub service: ServiceConfig,

    /// Middleware configuration
    #[serde(default)]
    pub middleware: MiddlewareConfig,

    /// Database configuration (required to serve searches)
    #[serde(default)]
    pub database: Option<DatabaseConfig>,

    /// Search engine configuration
    #[serde(default)]
    pub search: SearchConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name
    pub name: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level or `EnvFilter` directive (e.g. "info,sqlx=warn")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Environment (dev, staging, production)
    #[serde(default = "default_environment")]
    pub environment: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum idle connections
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_secs: u64,

    /// Maximum retry attempts for establishing the pool at startup
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between retry attempts in seconds
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,
}

/// Middleware configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// Request body size limit in MB
    #[serde(default = "default_body_limit_mb")]
    pub body_limit_mb: usize,

    /// Enable panic recovery middleware
    #[serde(default = "default_true")]
    pub catch_panic: bool,

    /// Enable gzip compression
    #[serde(default = "default_true")]
    pub compression: bool,

    /// CORS mode: permissive, restrictive or disabled
    #[serde(default = "default_cors_mode")]
    pub cors_mode: String,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            body_limit_mb: default_body_limit_mb(),
            catch_panic: true,
            compression: true,
            cors_mode: default_cors_mode(),
        }
    }
}

/// Search engine configuration
///
/// Table names are interpolated into SQL text, so they are validated as plain
/// identifiers by [`Config::validate`]. They never come from requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Relation holding one row per collocation with its embedded examples
    #[serde(default = "default_collocations_table")]
    pub collocations_table: String,

    /// Relation holding book metadata (name, category, period, style)
    #[serde(default = "default_books_table")]
    pub books_table: String,

    /// Largest accepted `results_limit`
    #[serde(default = "default_max_results_limit")]
    pub max_results_limit: i64,

    /// Largest accepted `examples_limit`
    #[serde(default = "default_max_examples_limit")]
    pub max_examples_limit: i64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            collocations_table: default_collocations_table(),
            books_table: default_books_table(),
            max_results_limit: default_max_results_limit(),
            max_examples_limit: default_max_examples_limit(),
        }
    }
}

// Default value functions
fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_environment() -> String {
    "dev".to_string()
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    2
}

fn default_connection_timeout() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    5
}

fn default_retry_delay() -> u64 {
    2
}

fn default_true() -> bool {
    true
}

fn default_body_limit_mb() -> usize {
    1
}

fn default_cors_mode() -> String {
    "permissive".to_string()
}

fn default_collocations_table() -> String {
    "mv_token_collocations".to_string()
}

fn default_books_table() -> String {
    "books".to_string()
}

fn default_max_results_limit() -> i64 {
    1000
}

fn default_max_examples_limit() -> i64 {
    100
}

/// Returns true for `name` or `schema.name` made of ASCII letters, digits and
/// underscores, not starting with a digit.
pub(crate) fn is_plain_identifier(name: &str) -> bool {
    let part_ok = |part: &str| {
        let mut chars = part.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    };
    match name.split_once('.') {
        Some((schema, table)) => part_ok(schema) && part_ok(table),
        None => part_ok(name),
    }
}

impl DatabaseConfig {
    /// Pool settings at their defaults for `url`
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connection_timeout_secs: default_connection_timeout(),
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay(),
        }
    }

    /// Pool acquire timeout as Duration
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_secs)
    }
}

impl Config {
    /// Load configuration from all sources
    ///
    /// Searches for config files in this order (first found wins on conflicts):
    /// 1. Current working directory: ./config.toml
    /// 2. XDG config directory: ~/.config/collocation-search/config.toml
    /// 3. System directory: /etc/collocation-search/config.toml
    ///
    /// Environment variables override all file-based configs.
    pub fn load() -> Result<Self> {
        let config_paths = Self::find_config_paths();

        tracing::debug!("Searching for config files in order:");
        for path in &config_paths {
            tracing::debug!("  - {}", path.display());
        }

        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Lowest priority first so that higher priority files override
        for path in config_paths.iter().rev() {
            if path.exists() {
                tracing::info!("Loading configuration from: {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }

        Self::finish(Self::with_env(figment))
    }

    /// Load configuration from a specific file
    ///
    /// Bypasses the XDG and system directories. Environment variables still
    /// take precedence over the file.
    pub fn load_from(path: &str) -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path));

        Self::finish(Self::with_env(figment))
    }

    fn with_env(figment: Figment) -> Figment {
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(
                Env::raw()
                    .only(&["DATABASE_URL"])
                    .map(|_| "database.url".into()),
            )
    }

    fn finish(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot express
    pub fn validate(&self) -> Result<()> {
        for table in [&self.search.collocations_table, &self.search.books_table] {
            if !is_plain_identifier(table) {
                return Err(Error::Internal(format!(
                    "Invalid table name in [search] config: {:?}",
                    table
                )));
            }
        }
        // Requests that leave the page sizes at their defaults must stay valid
        if self.search.max_results_limit < DEFAULT_RESULTS_LIMIT {
            return Err(Error::Internal(format!(
                "search.max_results_limit must be at least {}",
                DEFAULT_RESULTS_LIMIT
            )));
        }
        if self.search.max_examples_limit < DEFAULT_EXAMPLES_LIMIT {
            return Err(Error::Internal(format!(
                "search.max_examples_limit must be at least {}",
                DEFAULT_EXAMPLES_LIMIT
            )));
        }
        Ok(())
    }

    /// Find all possible config file paths, highest priority first
    fn find_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        let xdg_dirs = xdg::BaseDirectories::with_prefix(APP_DIR);
        if let Some(path) = xdg_dirs.find_config_file("config.toml") {
            paths.push(path);
        }

        paths.push(PathBuf::from("/etc").join(APP_DIR).join("config.toml"));

        paths
    }

    /// Get database URL
    pub fn database_url(&self) -> Option<&str> {
        self.database.as_ref().map(|db| db.url.as_str())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: APP_DIR.to_string(),
                port: default_port(),
                log_level: default_log_level(),
                timeout_secs: default_timeout(),
                environment: default_environment(),
            },
            middleware: MiddlewareConfig::default(),
            database: None,
            search: SearchConfig::default(),
        }
    }
}

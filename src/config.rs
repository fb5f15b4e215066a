//! Configuration loading and management.
//!
//! Configuration is loaded from multiple sources with the following precedence
//! (highest to lowest):
//!
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. `.sql-lint-gateway.toml` in current directory
//! 4. `~/.config/sql-lint-gateway/config.toml`
//! 5. Default values
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8000
//!
//! [linter]
//! command = ["sqlfluff"]
//! default_dialect = "ansi"
//! timeout_secs = 10
//!
//! [security]
//! disabled = ["SEC002"]
//!
//! [security.severity]
//! SEC003 = "high"
//!
//! [client]
//! url = "http://localhost:8000"
//!
//! [retry]
//! max_retries = 3
//! initial_delay_ms = 1000
//! max_delay_ms = 30000
//! backoff_factor = 2.0
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `SQL_LINT_HOST` | Address the server binds to |
//! | `SQL_LINT_PORT` | Port the server listens on |
//! | `SQL_LINT_COMMAND` | Linter program (replaces `linter.command`) |
//! | `SQL_LINT_TIMEOUT_SECS` | Linter timeout in seconds |
//! | `SQL_LINT_DIALECT` | Dialect used when a request names none |
//! | `SQL_LINT_URL` | Gateway URL used by `check` |

use std::{
    collections::HashMap,
    env, fs,
    path::{Path, PathBuf},
    time::Duration
};

use serde::Deserialize;

use crate::error::{AppResult, config_error};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server:   ServerConfig,
    #[serde(default)]
    pub linter:   LinterConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub client:   ClientConfig,
    #[serde(default)]
    pub retry:    RetryConfig
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 8000
        }
    }
}

/// External linter invocation
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LinterConfig {
    /// Program followed by any leading arguments, e.g. `["python", "-m",
    /// "sqlfluff"]`
    pub command:         Vec<String>,
    pub default_dialect: String,
    pub timeout_secs:    u64
}

impl Default for LinterConfig {
    fn default() -> Self {
        Self {
            command:         vec![String::from("sqlfluff")],
            default_dialect: String::from("ansi"),
            timeout_secs:    10
        }
    }
}

impl LinterConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Security rules configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SecurityConfig {
    /// Disabled rule IDs
    #[serde(default)]
    pub disabled: Vec<String>,
    /// Severity overrides (rule_id -> severity)
    #[serde(default)]
    pub severity: HashMap<String, String>
}

/// Gateway client configuration for the `check` command
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ClientConfig {
    pub url: Option<String>
}

/// Retry configuration for gateway requests
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries:      u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms:     u64,
    pub backoff_factor:   f64
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries:      3,
            initial_delay_ms: 1000,
            max_delay_ms:     30000,
            backoff_factor:   2.0
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables
    /// 2. Config file in current directory (.sql-lint-gateway.toml)
    /// 3. Config file in home directory
    ///    (~/.config/sql-lint-gateway/config.toml)
    /// 4. Default values
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(home) = env::var_os("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("sql-lint-gateway")
                .join("config.toml");

            if home_config.exists() {
                config = Self::from_file(&home_config)?;
            }
        }

        let local_config = PathBuf::from(".sql-lint-gateway.toml");
        if local_config.exists() {
            config = Self::from_file(&local_config)?;
        }

        config.apply_env(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|e| config_error(format!("Invalid config file: {}", e)))
    }

    fn from_file(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| config_error(format!("Failed to read config file: {}", e)))?;
        Self::parse(&content)
    }

    /// Override settings from environment-style lookups
    pub fn apply_env<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>
    {
        if let Some(host) = lookup("SQL_LINT_HOST") {
            self.server.host = host;
        }

        if let Some(port) = lookup("SQL_LINT_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| config_error(format!("Invalid SQL_LINT_PORT: {}", port)))?;
        }

        if let Some(command) = lookup("SQL_LINT_COMMAND") {
            self.linter.command = vec![command];
        }

        if let Some(secs) = lookup("SQL_LINT_TIMEOUT_SECS") {
            self.linter.timeout_secs = secs
                .parse()
                .map_err(|_| config_error(format!("Invalid SQL_LINT_TIMEOUT_SECS: {}", secs)))?;
        }

        if let Some(dialect) = lookup("SQL_LINT_DIALECT") {
            self.linter.default_dialect = dialect;
        }

        if let Some(url) = lookup("SQL_LINT_URL") {
            self.client.url = Some(url);
        }

        Ok(())
    }
}

//! Application configuration loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use domain::StockPolicy;
use thiserror::Error;

/// Error raised when an environment variable holds an unusable value.
#[derive(Debug, Error)]
#[error("invalid value for {var}: {value:?}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Where the workshop collections are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Memory,
    File,
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` (default `0.0.0.0`), `PORT` (default `3000`)
/// - `RUST_LOG` (default `info`), `OSMECH_LOG_FORMAT` (`pretty` or `json`)
/// - `OSMECH_STORE` (`memory` or `file`), `OSMECH_DATA_DIR` (default `./data`)
/// - `OSMECH_STOCK_POLICY` (`allow-negative` or `floor-at-zero`)
/// - `OSMECH_DELETE_PASSWORD_HASH`: argon2 PHC string; deletes are refused without it
/// - `OSMECH_ADMIN_NAME`, `OSMECH_ADMIN_EMAIL`: bootstrap administrator
/// - `GEMINI_API_KEY`, `OSMECH_AI_MODEL`, `OSMECH_AI_TIMEOUT_SECS`
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub store: StoreBackend,
    pub data_dir: PathBuf,
    pub stock_policy: StockPolicy,
    pub delete_password_hash: Option<String>,
    pub admin_name: String,
    pub admin_email: Option<String>,
    pub gemini_api_key: Option<String>,
    pub ai_model: String,
    /// None leaves the HTTP client's default in place.
    pub ai_timeout: Option<Duration>,
}

impl Config {
    /// Loads configuration from the process environment (and `.env`, if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError {
                var: "PORT",
                value: raw,
            })?,
            None => defaults.port,
        };

        let log_format = match get("OSMECH_LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError {
                    var: "OSMECH_LOG_FORMAT",
                    value: other.to_string(),
                });
            }
        };

        let store = match get("OSMECH_STORE").as_deref().map(str::trim) {
            None | Some("memory") => StoreBackend::Memory,
            Some("file") => StoreBackend::File,
            Some(other) => {
                return Err(ConfigError {
                    var: "OSMECH_STORE",
                    value: other.to_string(),
                });
            }
        };

        let stock_policy = match get("OSMECH_STOCK_POLICY") {
            Some(raw) => raw.parse().map_err(|_| ConfigError {
                var: "OSMECH_STOCK_POLICY",
                value: raw,
            })?,
            None => defaults.stock_policy,
        };

        let ai_timeout = match get("OSMECH_AI_TIMEOUT_SECS") {
            Some(raw) => Some(Duration::from_secs(raw.trim().parse().map_err(|_| {
                ConfigError {
                    var: "OSMECH_AI_TIMEOUT_SECS",
                    value: raw,
                }
            })?)),
            None => None,
        };

        Ok(Self {
            host: get("HOST").unwrap_or(defaults.host),
            port,
            log_level: get("RUST_LOG").unwrap_or(defaults.log_level),
            log_format,
            store,
            data_dir: get("OSMECH_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            stock_policy,
            delete_password_hash: get("OSMECH_DELETE_PASSWORD_HASH"),
            admin_name: get("OSMECH_ADMIN_NAME").unwrap_or(defaults.admin_name),
            admin_email: get("OSMECH_ADMIN_EMAIL"),
            gemini_api_key: get("GEMINI_API_KEY"),
            ai_model: get("OSMECH_AI_MODEL").unwrap_or(defaults.ai_model),
            ai_timeout,
        })
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            store: StoreBackend::Memory,
            data_dir: PathBuf::from("./data"),
            stock_policy: StockPolicy::AllowNegative,
            delete_password_hash: None,
            admin_name: "Administrador".to_string(),
            admin_email: None,
            gemini_api_key: None,
            ai_model: diagnosis::gemini::DEFAULT_MODEL.to_string(),
            ai_timeout: None,
        }
    }
}

//! services/api/src/config.rs
//!
//! Service settings, read from the process environment once at startup.
//! A `.env` file in the working directory is honored outside of tests.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::Level;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
pub const DEFAULT_REVIEWER_NAME: &str = "Levi Hobbs";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable {0} is required but not set")]
    MissingVar(String),
    #[error("Environment variable {0} has an unusable value: {1}")]
    InvalidValue(String, String),
}

/// Everything the service reads from its environment.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    /// Stamped on every imported review.
    pub reviewer_name: String,
    pub prune_bookshelves_on_import: bool,
    /// Optional JSON file replacing the built-in genre -> tone lexicon.
    pub genre_tone_lexicon_path: Option<PathBuf>,
    pub cors_origin: String,
    pub max_upload_bytes: usize,
}

/// A set, non-blank variable.
fn non_blank_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parses a variable when present, otherwise falls back to `default`.
fn parsed_var<T, E>(name: &str, default: T, parse: impl FnOnce(&str) -> Result<T, E>) -> Result<T, ConfigError>
where
    E: ToString,
{
    match non_blank_var(name) {
        Some(raw) => parse(&raw).map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        None => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address = non_blank_var("BIND_ADDRESS")
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;
        let database_url = non_blank_var("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?;
        let log_level = parsed_var("RUST_LOG", Level::INFO, |raw| {
            Level::from_str(raw).map_err(|_| format!("'{}' is not a log level", raw))
        })?;

        let reviewer_name =
            non_blank_var("REVIEWER_NAME").unwrap_or_else(|| DEFAULT_REVIEWER_NAME.to_string());
        let prune_bookshelves_on_import = parsed_var("PRUNE_BOOKSHELVES_ON_IMPORT", true, |raw| {
            parse_flag(raw).ok_or_else(|| format!("'{}' is not a boolean", raw))
        })?;
        let genre_tone_lexicon_path = non_blank_var("GENRE_TONE_LEXICON_PATH").map(PathBuf::from);

        let cors_origin =
            non_blank_var("CORS_ORIGIN").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string());
        let max_upload_bytes =
            parsed_var("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES, usize::from_str)?;

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            reviewer_name,
            prune_bookshelves_on_import,
            genre_tone_lexicon_path,
            cors_origin,
            max_upload_bytes,
        })
    }

    /// Settings for running the router without a database, as the tests do.
    pub fn for_tests() -> Self {
        Config {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 0)),
            database_url: String::new(),
            log_level: Level::INFO,
            reviewer_name: DEFAULT_REVIEWER_NAME.to_string(),
            prune_bookshelves_on_import: true,
            genre_tone_lexicon_path: None,
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

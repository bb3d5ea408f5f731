//! Server configuration read from the environment at startup.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::TimeDelta;
use festquest_sticker::cutout::{DEFAULT_REMOVE_BG_URL, RemoveBgConfig};
use festquest_sticker::render::typeface::{DEFAULT_BOLD_FONT, DEFAULT_REGULAR_FONT};

use crate::error::AppError;

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// remove.bg settings; `None` when no API key is configured.
    pub cutout: Option<RemoveBgConfig>,
    /// Skip background removal even when a key is configured.
    pub skip_cutout: bool,
    /// Quest catalog file; the built-in catalog is used when absent.
    pub catalog_path: Option<PathBuf>,
    /// Bold font for the tagline.
    pub font_bold: PathBuf,
    /// Regular font for the brand line.
    pub font_regular: PathBuf,
    /// How long a sticker request waits for its photo.
    pub pending_ttl: TimeDelta,
}

fn parse_or<T>(value: Option<String>, name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{name} is invalid ({raw:?}): {e}"))),
    }
}

fn parse_flag(value: Option<String>, name: &str) -> Result<bool, AppError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(false),
        Some(v) if ["1", "true", "yes", "on"].contains(&v.to_ascii_lowercase().as_str()) => {
            Ok(true)
        }
        Some(v) if ["0", "false", "no", "off"].contains(&v.to_ascii_lowercase().as_str()) => {
            Ok(false)
        }
        Some(v) => Err(AppError::Config(format!("{name} must be a boolean, got {v:?}"))),
    }
}

impl AppConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing or a
    /// value does not parse.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing or a
    /// value does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                AppError::Config("DATABASE_URL environment variable must be set".into())
            })?;
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_owned());
        let port: u16 = parse_or(lookup("PORT"), "PORT", 3000)?;

        let timeout_secs: u64 = parse_or(lookup("CUTOUT_TIMEOUT_SECS"), "CUTOUT_TIMEOUT_SECS", 15)?;
        let max_attempts: u32 = parse_or(lookup("CUTOUT_MAX_ATTEMPTS"), "CUTOUT_MAX_ATTEMPTS", 2)?;
        if max_attempts == 0 {
            return Err(AppError::Config("CUTOUT_MAX_ATTEMPTS must be at least 1".into()));
        }
        let backoff_ms: u64 = parse_or(lookup("CUTOUT_BACKOFF_MS"), "CUTOUT_BACKOFF_MS", 500)?;
        let cutout = lookup("REMOVE_BG_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .map(|api_key| RemoveBgConfig {
                endpoint: lookup("REMOVE_BG_URL").unwrap_or_else(|| DEFAULT_REMOVE_BG_URL.to_owned()),
                api_key,
                timeout: Duration::from_secs(timeout_secs),
                max_attempts,
                backoff: Duration::from_millis(backoff_ms),
            });

        let pending_secs: i64 =
            parse_or(lookup("PENDING_INTENT_TTL_SECS"), "PENDING_INTENT_TTL_SECS", 600)?;
        if pending_secs <= 0 {
            return Err(AppError::Config("PENDING_INTENT_TTL_SECS must be positive".into()));
        }

        Ok(Self {
            database_url,
            host,
            port,
            cutout,
            skip_cutout: parse_flag(lookup("STICKER_SKIP_CUTOUT"), "STICKER_SKIP_CUTOUT")?,
            catalog_path: lookup("QUEST_CATALOG_PATH").map(PathBuf::from),
            font_bold: lookup("FONT_BOLD_PATH").map_or_else(|| DEFAULT_BOLD_FONT.into(), PathBuf::from),
            font_regular: lookup("FONT_REGULAR_PATH")
                .map_or_else(|| DEFAULT_REGULAR_FONT.into(), PathBuf::from),
            pending_ttl: TimeDelta::seconds(pending_secs),
        })
    }

    /// The socket address to listen on.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST:PORT` is not a valid address.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

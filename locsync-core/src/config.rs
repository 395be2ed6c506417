//! Process configuration.
//!
//! Built once in `main` and passed by reference to the stores that need it.
//!
//! # Precedence (lowest first)
//!
//! 1. Built-in defaults
//! 2. Optional YAML file (`--config <path>`)
//! 3. `.env` in the working directory (loaded into the process environment)
//! 4. Process environment

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::types::LogicalTable;

pub const ENV_SHEET_URL: &str = "GOOGLE_SHEETS_URL";
pub const ENV_STATIC_GID: &str = "GOOGLE_SHEET_STATIC_GID";
pub const ENV_GAME_GID: &str = "GOOGLE_SHEET_GAME_GID";
pub const ENV_GRIDLY_API_KEY: &str = "GRIDLY_API_KEY";
pub const ENV_GRIDLY_API_URL: &str = "GRIDLY_API_URL";
pub const ENV_STATIC_VIEW: &str = "GRIDLY_STATIC_TEXTS_VIEW_ID";
pub const ENV_GAME_VIEW: &str = "GRIDLY_GAME_TEXT_VIEW_ID";
pub const ENV_DATABASE: &str = "LOCSYNC_DATABASE";
pub const ENV_MARKER: &str = "LOCSYNC_MARKER";
pub const ENV_HTTP_TIMEOUT: &str = "LOCSYNC_HTTP_TIMEOUT_SECS";
pub const ENV_REMOTE_RETRIES: &str = "LOCSYNC_REMOTE_RETRIES";

pub const DEFAULT_GRIDLY_API_URL: &str = "https://api.gridly.com/v1";
pub const DEFAULT_DATABASE: &str = "localization.db";
pub const DEFAULT_MARKER: &str = "module_run.flag";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_REMOTE_RETRIES: u32 = 2;

/// Optional settings file. Every key may be omitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub sheet_url: Option<String>,
    pub static_texts_gid: Option<String>,
    pub game_text_gid: Option<String>,
    pub gridly_api_key: Option<String>,
    pub gridly_api_url: Option<String>,
    pub static_texts_view_id: Option<String>,
    pub game_text_view_id: Option<String>,
    pub database: Option<PathBuf>,
    pub marker: Option<PathBuf>,
    pub http_timeout_secs: Option<u64>,
    pub remote_retries: Option<u32>,
}

impl ConfigFile {
    pub fn load_at(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Resolved settings.
#[derive(Clone)]
pub struct Config {
    /// Prefix to which `gid=<gid>` is appended to get a CSV export of a tab.
    pub sheet_url: String,
    pub static_texts_gid: String,
    pub game_text_gid: String,
    pub gridly_api_url: String,
    pub gridly_api_key: String,
    pub static_texts_view_id: String,
    pub game_text_view_id: String,
    pub database_path: PathBuf,
    pub marker_path: PathBuf,
    pub http_timeout: Duration,
    pub remote_retries: u32,
}

impl Config {
    /// Load `.env`, the optional YAML file and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            let missing = matches!(
                e,
                dotenvy::Error::Io(ref io) if io.kind() == std::io::ErrorKind::NotFound
            );
            if !missing {
                return Err(e.into());
            }
        }

        let file = match path {
            Some(path) => ConfigFile::load_at(path)?,
            None => ConfigFile::default(),
        };
        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    /// Resolve settings from a parsed file and an environment lookup.
    ///
    /// Empty environment values count as unset.
    pub fn from_sources<F>(file: ConfigFile, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str, fallback: Option<String>| {
            env(key)
                .or(fallback)
                .ok_or(ConfigError::Missing { key })
        };

        let http_timeout_secs = match env(ENV_HTTP_TIMEOUT) {
            Some(raw) => parse_number(ENV_HTTP_TIMEOUT, &raw)?,
            None => file.http_timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
        };
        if http_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: ENV_HTTP_TIMEOUT,
                value: "0".to_string(),
            });
        }
        let remote_retries = match env(ENV_REMOTE_RETRIES) {
            Some(raw) => parse_number(ENV_REMOTE_RETRIES, &raw)?,
            None => file.remote_retries.unwrap_or(DEFAULT_REMOTE_RETRIES),
        };

        Ok(Self {
            sheet_url: required(ENV_SHEET_URL, file.sheet_url)?,
            static_texts_gid: required(ENV_STATIC_GID, file.static_texts_gid)?,
            game_text_gid: required(ENV_GAME_GID, file.game_text_gid)?,
            gridly_api_url: env(ENV_GRIDLY_API_URL)
                .or(file.gridly_api_url)
                .unwrap_or_else(|| DEFAULT_GRIDLY_API_URL.to_string()),
            gridly_api_key: required(ENV_GRIDLY_API_KEY, file.gridly_api_key)?,
            static_texts_view_id: required(ENV_STATIC_VIEW, file.static_texts_view_id)?,
            game_text_view_id: required(ENV_GAME_VIEW, file.game_text_view_id)?,
            database_path: env(ENV_DATABASE)
                .map(PathBuf::from)
                .or(file.database)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE)),
            marker_path: env(ENV_MARKER)
                .map(PathBuf::from)
                .or(file.marker)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MARKER)),
            http_timeout: Duration::from_secs(http_timeout_secs),
            remote_retries,
        })
    }

    /// Spreadsheet tab id for `table`.
    pub fn sheet_gid(&self, table: LogicalTable) -> &str {
        match table {
            LogicalTable::StaticTexts => &self.static_texts_gid,
            LogicalTable::GameText => &self.game_text_gid,
        }
    }

    /// Remote view id for `table`.
    pub fn gridly_view_id(&self, table: LogicalTable) -> &str {
        match table {
            LogicalTable::StaticTexts => &self.static_texts_view_id,
            LogicalTable::GameText => &self.game_text_view_id,
        }
    }
}

// The API key never reaches logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("sheet_url", &self.sheet_url)
            .field("static_texts_gid", &self.static_texts_gid)
            .field("game_text_gid", &self.game_text_gid)
            .field("gridly_api_url", &self.gridly_api_url)
            .field("gridly_api_key", &"<redacted>")
            .field("static_texts_view_id", &self.static_texts_view_id)
            .field("game_text_view_id", &self.game_text_view_id)
            .field("database_path", &self.database_path)
            .field("marker_path", &self.marker_path)
            .field("http_timeout", &self.http_timeout)
            .field("remote_retries", &self.remote_retries)
            .finish()
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: raw.to_string(),
    })
}

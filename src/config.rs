//! Configuration management for the Acoustats analyzer.
//!
//! This module handles loading and accessing configuration values from environment
//! variables and `.env` files. It provides a centralized way to manage application
//! configuration including API credentials, service endpoints and pipeline tuning.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Command-line flags (applied by the `cli` layer)
//! 2. Environment variables
//! 3. `.env` file in the local data directory
//! 4. Application defaults (where applicable)

use std::{
    env,
    path::PathBuf,
    str::FromStr,
    sync::atomic::{AtomicBool, Ordering},
};

use thiserror::Error;

use crate::stats::Timeframe;

pub const DEFAULT_LASTFM_API_URL: &str = "https://ws.audioscrobbler.com/2.0/";
pub const DEFAULT_SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_MUSICBRAINZ_API_URL: &str = "https://musicbrainz.org/ws/2";
pub const DEFAULT_WORKER_COUNT: usize = 5;

/// Contact string sent in the `User-Agent` of every request. MusicBrainz
/// rejects anonymous clients.
pub const USER_AGENT: &str = concat!(
    "Acoustats Analyzer/",
    env!("CARGO_PKG_VERSION"),
    " ( https://github.com/hkamran80/acoustats )"
);

static VERBOSE: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("You must set the {0} environment variable")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Client-credentials pair for the Spotify Web API.
#[derive(Debug, Clone)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the `acoustats` data directory if it doesn't exist. A missing
/// `.env` file is not an error: every value can also come from the process
/// environment.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/acoustats/.env`
/// - macOS: `~/Library/Application Support/acoustats/.env`
/// - Windows: `%LOCALAPPDATA%/acoustats/.env`
///
/// # Errors
///
/// Returns an error string if the directory cannot be created or an existing
/// `.env` file cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }

    Ok(())
}

/// Root of everything the analyzer stores locally (`.env`, response cache).
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("acoustats");
    path
}

/// Whether verbose diagnostics are printed by [`crate::debug!`].
pub fn verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

pub fn set_verbose(enabled: bool) {
    VERBOSE.store(enabled, Ordering::Relaxed);
}

/// Returns the Last.fm user whose history is analyzed.
///
/// Reads `LASTFM_USERNAME`, falling back to `USERNAME` for compatibility
/// with older `.env` files.
///
/// # Errors
///
/// `ConfigError::Missing` when neither variable is set.
pub fn lastfm_username() -> Result<String, ConfigError> {
    non_empty("LASTFM_USERNAME")
        .or_else(|| non_empty("USERNAME"))
        .ok_or(ConfigError::Missing("LASTFM_USERNAME"))
}

/// Returns the Last.fm API key.
///
/// # Errors
///
/// `ConfigError::Missing` when `LAST_FM_API_KEY` is not set.
pub fn lastfm_api_key() -> Result<String, ConfigError> {
    non_empty("LAST_FM_API_KEY").ok_or(ConfigError::Missing("LAST_FM_API_KEY"))
}

/// Returns the Spotify client credentials when both halves are configured.
///
/// The Spotify fallback stage is skipped entirely when this is `None`.
pub fn spotify_credentials() -> Option<SpotifyCredentials> {
    match (
        non_empty("SPOTIFY_CLIENT_ID"),
        non_empty("SPOTIFY_CLIENT_SECRET"),
    ) {
        (Some(client_id), Some(client_secret)) => Some(SpotifyCredentials {
            client_id,
            client_secret,
        }),
        _ => None,
    }
}

pub fn lastfm_api_url() -> String {
    non_empty("LASTFM_API_URL").unwrap_or_else(|| DEFAULT_LASTFM_API_URL.to_string())
}

pub fn spotify_api_url() -> String {
    non_empty("SPOTIFY_API_URL").unwrap_or_else(|| DEFAULT_SPOTIFY_API_URL.to_string())
}

pub fn spotify_token_url() -> String {
    non_empty("SPOTIFY_API_TOKEN_URL").unwrap_or_else(|| DEFAULT_SPOTIFY_TOKEN_URL.to_string())
}

pub fn musicbrainz_api_url() -> String {
    non_empty("MUSICBRAINZ_API_URL").unwrap_or_else(|| DEFAULT_MUSICBRAINZ_API_URL.to_string())
}

/// Returns the number of concurrent workers per pipeline stage.
///
/// # Errors
///
/// `ConfigError::Invalid` when `ANALYZER_WORKERS` is not a positive integer.
pub fn worker_count() -> Result<usize, ConfigError> {
    match non_empty("ANALYZER_WORKERS") {
        None => Ok(DEFAULT_WORKER_COUNT),
        Some(raw) => match raw.parse::<usize>() {
            Ok(0) | Err(_) => Err(ConfigError::Invalid {
                name: "ANALYZER_WORKERS",
                reason: format!("expected a positive integer, got {raw:?}"),
            }),
            Ok(count) => Ok(count),
        },
    }
}

/// Returns the timeframe used when none is given on the command line.
///
/// # Errors
///
/// `ConfigError::Invalid` when `TIMEFRAME` names an unknown timeframe.
pub fn default_timeframe() -> Result<Timeframe, ConfigError> {
    match non_empty("TIMEFRAME") {
        None => Ok(Timeframe::ThisWeek),
        Some(raw) => Timeframe::from_str(&raw).map_err(|reason| ConfigError::Invalid {
            name: "TIMEFRAME",
            reason,
        }),
    }
}

/// `RAW_DUMP`: emit machine-readable values instead of sentences.
pub fn raw_dump() -> bool {
    flag("RAW_DUMP")
}

/// `ANALYZER_OUTPUT`: print per-worker diagnostics.
pub fn analyzer_output() -> bool {
    flag("ANALYZER_OUTPUT")
}

/// `HISTORY_OUTPUT`: write the full scrobble history as CSV.
pub fn history_output() -> bool {
    flag("HISTORY_OUTPUT")
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn flag(name: &str) -> bool {
    non_empty(name).is_some_and(|value| {
        !matches!(
            value.to_ascii_lowercase().as_str(),
            "0" | "false" | "no" | "off"
        )
    })
}

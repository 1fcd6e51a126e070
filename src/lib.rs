//! Acoustats Listening History Analyzer Library
//!
//! This library retrieves a Last.fm user's scrobble history, resolves a
//! duration for every unique track through a fallback chain of data sources
//! (Last.fm, Spotify, MusicBrainz) and aggregates the result into listening
//! statistics for a chosen timeframe.
//!
//! # Modules
//!
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `http` - Cached JSON-over-HTTP client shared by all sources
//! - `lastfm` - Last.fm history paging and track info
//! - `management` - Response cache, token and report persistence
//! - `musicbrainz` - MusicBrainz recording lookups
//! - `pipeline` - Work queue, worker pool and enrichment orchestration
//! - `spotify` - Spotify client-credentials auth and catalog search
//! - `stats` - Timeframes, aggregation and message formatting
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use acoustats::{config, cli};
//!
//! #[tokio::main]
//! async fn main() -> acoustats::Res<()> {
//!     config::load_env().await?;
//!     // Use CLI functions...
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod http;
pub mod lastfm;
pub mod management;
pub mod musicbrainz;
pub mod pipeline;
pub mod spotify;
pub mod stats;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Used by the CLI layer where any error ends up as a terminal message.
/// Library code below it returns the typed errors of each module.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Retrieving recent tracks...");
/// info!("Found {} unique tracks", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Report written to {}", path.display());
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only for fatal errors: the process terminates with exit code 1 right
/// after the message is printed.
///
/// # Example
///
/// ```
/// error!("Rate limit exceeded");
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for per-item failures that the pipeline degrades around, such as a
/// failed lookup or a malformed response.
///
/// # Example
///
/// ```
/// warning!("Spotify search failed for {}: {}", name, err);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a dimmed diagnostic line, only when verbose output is enabled.
///
/// Verbose mode is switched on by `--verbose` or `ANALYZER_OUTPUT` and is
/// read through [`config::verbose`].
///
/// # Example
///
/// ```
/// debug!("[WORKER::{}] {} items left", name, remaining);
/// ```
#[macro_export]
macro_rules! debug {
  ($($arg:tt)*) => ({
    if $crate::config::verbose() {
      use colored::Colorize;
      println!("[{}] {}", "·".dimmed(), format!($($arg)*).dimmed());
    }
  })
}

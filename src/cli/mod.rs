//! # CLI Module
//!
//! The command-line layer of Acoustats. Each public function here backs one
//! subcommand of the `acoustats` binary and owns user interaction: reading
//! configuration, showing progress, printing results and turning fatal
//! errors into a single red message.
//!
//! ## Commands
//!
//! - [`analyze`] - Enriches the Last.fm history and reports statistics for a
//!   timeframe
//! - [`list_timeframes`] - Shows the date range of every timeframe
//! - [`purge_cache`] / [`clear_cache`] - Maintains the response cache
//!
//! ## Architecture
//!
//! ```text
//! CLI Layer (options, terminal output)
//!     ↓
//! Pipeline (work queue, worker pool, fallback stages)
//!     ↓
//! Sources (Last.fm, Spotify, MusicBrainz)
//!     ↓
//! HTTP + Response Cache
//! ```
//!
//! ## Usage
//!
//! ```bash
//! acoustats analyze                          # this week, from .env settings
//! acoustats analyze --timeframe "last month" --raw
//! acoustats analyze --workers 10 --history   # also write tracks_<user>.csv
//! acoustats timeframes
//! acoustats cache purge
//! ```

mod analyze;
mod cache;
mod timeframes;

pub use analyze::AnalyzeOptions;
pub use analyze::analyze;
pub use cache::clear_cache;
pub use cache::purge_cache;
pub use timeframes::list_timeframes;

use std::{path::PathBuf, sync::Arc};

use chrono::Local;
use tabled::Table;

use crate::{
    config, debug, error, info,
    http::HttpClient,
    lastfm::{LastFmClient, RecentTracksFetcher, TrackInfoFetcher},
    management::{HistoryManager, ReportManager, ResponseCache, TokenManager},
    musicbrainz::MusicBrainzFetcher,
    pipeline::{DurationFetcher, EnrichmentStats, Pipeline, PipelineOptions, Sources},
    spotify::SpotifySearchFetcher,
    stats::{Timeframe, aggregate, generate_messages},
    success,
    types::{AnalysisReport, SummaryTableRow, TrackCount},
    warning,
};

/// Flags of `acoustats analyze`. Unset values fall back to the environment.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    pub timeframe: Option<Timeframe>,
    pub workers: Option<usize>,
    pub raw: bool,
    pub verbose: bool,
    pub history: bool,
    pub output: Option<PathBuf>,
    pub no_progress: bool,
}

/// Runs the whole analysis: enrich the history, aggregate the chosen
/// timeframe, print the summary and write the report.
///
/// Rate limits and an unreachable Last.fm are fatal; nothing is written in
/// that case.
pub async fn analyze(options: AnalyzeOptions) {
    if options.verbose || config::analyzer_output() {
        config::set_verbose(true);
    }

    let username = config::lastfm_username().unwrap_or_else(|e| error!("{}", e));
    let api_key = config::lastfm_api_key().unwrap_or_else(|e| error!("{}", e));
    let timeframe = match options.timeframe {
        Some(timeframe) => timeframe,
        None => config::default_timeframe().unwrap_or_else(|e| error!("{}", e)),
    };
    let concurrency = match options.workers {
        Some(workers) => workers,
        None => config::worker_count().unwrap_or_else(|e| error!("{}", e)),
    };
    let raw = options.raw || config::raw_dump();

    let http = HttpClient::new(ResponseCache::new())
        .unwrap_or_else(|e| error!("Cannot create HTTP client. Err: {}", e));
    let sources = build_sources(&http, username.clone(), api_key);

    debug!(
        "Analyzing {} for {} with {} workers",
        timeframe, username, concurrency
    );

    let mut pipeline = Pipeline::new(
        sources,
        PipelineOptions {
            concurrency: concurrency.max(1),
            show_progress: !options.no_progress,
        },
    );
    let history = match pipeline.run().await {
        Ok(history) => history,
        Err(e) => error!("{}", e),
    };
    print_stats(&history.stats);

    if options.history || config::history_output() {
        let manager = HistoryManager::new(&username);
        match manager.save(&history.plays).await {
            Ok(()) => success!("History written to {}", manager.path().display()),
            Err(e) => warning!("Cannot write history. Err: {}", e),
        }
    }

    let window = timeframe.window(Local::now().date_naive());
    let plays = history.enriched_plays();
    let track_count = plays
        .iter()
        .filter(|play| window.contains(play.track.played_at))
        .count();

    let result = aggregate(&plays, &window);
    let report = generate_messages(&result, track_count, timeframe, raw);

    print_report(&report);

    let manager = ReportManager::new(options.output, &username);
    match manager.save(&report).await {
        Ok(()) => success!("Report written to {}", manager.path().display()),
        Err(e) => error!("Cannot write report. Err: {}", e),
    }
}

/// Wires the four fetchers of a run. Spotify is only included when client
/// credentials are configured.
fn build_sources(http: &HttpClient, username: String, api_key: String) -> Sources {
    let lastfm = LastFmClient::new(http.clone(), config::lastfm_api_url(), api_key, username);

    let secondary = config::spotify_credentials().map(|credentials| {
        let tokens = TokenManager::new(
            credentials,
            config::spotify_token_url(),
            http.client().clone(),
        );
        let fetcher = SpotifySearchFetcher::new(
            http.clone(),
            config::spotify_api_url(),
            Arc::new(tokens),
        );
        Arc::new(fetcher) as Arc<DurationFetcher>
    });

    Sources {
        pages: Arc::new(RecentTracksFetcher::new(lastfm.clone())),
        primary: Arc::new(TrackInfoFetcher::new(lastfm)),
        secondary,
        tertiary: Arc::new(MusicBrainzFetcher::new(
            http.clone(),
            config::musicbrainz_api_url(),
        )),
    }
}

fn print_stats(stats: &EnrichmentStats) {
    info!(
        "{} scrobbles, {} unique tracks",
        stats.scrobbles, stats.unique_tracks
    );
    if stats.missing_pages > 0 {
        warning!("{} history pages could not be retrieved", stats.missing_pages);
    }
    if let Some(found) = stats.secondary_found {
        debug!("Spotify durations found: {}", found);
    }
    debug!("MusicBrainz durations found: {}", stats.tertiary_found);
    if stats.anomalies > 0 {
        warning!("{} results did not match any unique track", stats.anomalies);
    }
    info!("Unresolved tracks: {}", stats.unresolved);
}

fn print_report(report: &AnalysisReport) {
    let tracks = match &report.tracks {
        TrackCount::Message(message) => message.clone(),
        TrackCount::Raw(count) => count.to_string(),
    };

    let mut rows = vec![
        SummaryTableRow {
            statistic: "Top track".to_string(),
            value: report.toptrack.clone(),
        },
        SummaryTableRow {
            statistic: "Top artist".to_string(),
            value: report.topartist.clone(),
        },
        SummaryTableRow {
            statistic: "Top album".to_string(),
            value: report.topalbum.clone(),
        },
        SummaryTableRow {
            statistic: "Duration".to_string(),
            value: report.duration.clone(),
        },
        SummaryTableRow {
            statistic: "Tracks".to_string(),
            value: tracks,
        },
    ];
    if let Some(iso) = &report.duration_datetime {
        rows.insert(
            4,
            SummaryTableRow {
                statistic: "Duration (ISO)".to_string(),
                value: iso.clone(),
            },
        );
    }

    let mut timeframe = report.timeframe.clone();
    if let Some(first) = timeframe.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    println!("\n{}\n{}", timeframe, Table::new(rows));
}

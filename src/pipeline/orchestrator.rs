use std::{collections::HashMap, fmt, sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;

use crate::{
    debug, info,
    pipeline::{Fetcher, WorkQueue, run_stage},
    types::{
        EnrichedRecentTrack, EnrichedTrackInfo, FetchOutcome, RecentTrack, RecentTracksPage,
        TrackIdentity, TrackKey, TrackMetadata,
    },
    utils, warning,
};

pub type PageFetcher = dyn Fetcher<Item = u32, Output = RecentTracksPage>;
pub type InfoFetcher = dyn Fetcher<Item = TrackIdentity, Output = TrackMetadata>;
pub type DurationFetcher = dyn Fetcher<Item = TrackIdentity, Output = u64>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Rate limit exceeded while {stage}")]
    RateLimited { stage: Stage },

    #[error("Unable to retrieve recent tracks: {0}")]
    UpstreamUnavailable(String),

    #[error("Recent tracks not available")]
    EmptyHistory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Pending,
    FetchPages,
    Dedup,
    PrimaryEnrich,
    SecondaryFallback,
    TertiaryFallback,
    Done,
    Aborted,
}

impl Stage {
    /// Prefix of the worker names of this stage.
    fn worker_prefix(self) -> &'static str {
        match self {
            Stage::FetchPages => "GRT",
            Stage::PrimaryEnrich => "GTI",
            Stage::SecondaryFallback => "SFTD",
            Stage::TertiaryFallback => "MBD",
            Stage::Pending | Stage::Dedup | Stage::Done | Stage::Aborted => "-",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Pending => "waiting to start",
            Stage::FetchPages => "fetching recent tracks",
            Stage::Dedup => "finding unique tracks",
            Stage::PrimaryEnrich => "retrieving track information",
            Stage::SecondaryFallback => "retrieving durations from Spotify",
            Stage::TertiaryFallback => "retrieving durations from MusicBrainz",
            Stage::Done => "done",
            Stage::Aborted => "aborted",
        };
        write!(f, "{label}")
    }
}

/// The data sources of one run. `secondary` is `None` when Spotify
/// credentials are not configured, which skips that stage entirely.
#[derive(Clone)]
pub struct Sources {
    pub pages: Arc<PageFetcher>,
    pub primary: Arc<InfoFetcher>,
    pub secondary: Option<Arc<DurationFetcher>>,
    pub tertiary: Arc<DurationFetcher>,
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub concurrency: usize,
    pub show_progress: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            concurrency: crate::config::DEFAULT_WORKER_COUNT,
            show_progress: false,
        }
    }
}

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentStats {
    pub scrobbles: usize,
    pub missing_pages: usize,
    pub unique_tracks: usize,
    pub missing_after_primary: usize,
    /// `None` when the Spotify stage was skipped.
    pub secondary_found: Option<usize>,
    pub tertiary_found: usize,
    pub unresolved: usize,
    pub anomalies: usize,
}

/// Outcome of merging one stage's results into the record map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub applied: usize,
    /// Successful outcomes whose identity has no record.
    pub anomalies: usize,
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct EnrichedHistory {
    /// Every scrobble, in page order.
    pub plays: Vec<RecentTrack>,
    /// One record per unique `(name, artist)`.
    pub tracks: HashMap<TrackKey, EnrichedTrackInfo>,
    pub stats: EnrichmentStats,
}

impl EnrichedHistory {
    pub fn duration_of(&self, identity: &TrackIdentity) -> u64 {
        self.tracks
            .get(&identity.key())
            .map_or(0, |record| record.duration_ms)
    }

    /// Joins every scrobble with the duration of its track.
    pub fn enriched_plays(&self) -> Vec<EnrichedRecentTrack> {
        self.plays
            .iter()
            .map(|track| EnrichedRecentTrack {
                duration_ms: self.duration_of(&track.identity),
                track: track.clone(),
            })
            .collect()
    }
}

/// Drives one enrichment run through its stages.
pub struct Pipeline {
    sources: Sources,
    options: PipelineOptions,
    stage: Stage,
}

impl Pipeline {
    pub fn new(sources: Sources, options: PipelineOptions) -> Self {
        Self {
            sources,
            options,
            stage: Stage::Pending,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Runs every stage in order.
    ///
    /// # Errors
    ///
    /// - `PipelineError::UpstreamUnavailable` when the first history page
    ///   cannot be fetched; no worker pool is started.
    /// - `PipelineError::EmptyHistory` when the user has no scrobbles.
    /// - `PipelineError::RateLimited` on the first rate-limit signal from any
    ///   source; no results of that stage are merged.
    pub async fn run(&mut self) -> Result<EnrichedHistory, PipelineError> {
        let result = self.run_stages().await;
        if result.is_err() {
            self.stage = Stage::Aborted;
        }
        result
    }

    async fn run_stages(&mut self) -> Result<EnrichedHistory, PipelineError> {
        let mut stats = EnrichmentStats::default();

        self.stage = Stage::FetchPages;
        let plays = self.fetch_pages(&mut stats).await?;
        if plays.is_empty() {
            return Err(PipelineError::EmptyHistory);
        }
        stats.scrobbles = plays.len();

        self.stage = Stage::Dedup;
        let mut records: HashMap<TrackKey, EnrichedTrackInfo> = dedup(&plays)
            .into_iter()
            .map(|identity| (identity.key(), EnrichedTrackInfo::from_identity(identity)))
            .collect();
        stats.unique_tracks = records.len();

        self.stage = Stage::PrimaryEnrich;
        info!("Retrieving unique track information...");
        let identities: Vec<TrackIdentity> = sorted_identities(records.values());
        let output = self
            .execute(Arc::clone(&self.sources.primary), identities)
            .await?;
        stats.anomalies += merge_metadata(&mut records, output).anomalies;

        stats.missing_after_primary = count_missing(&records);
        info!("Tracks with no duration: {}", stats.missing_after_primary);

        if let Some(secondary) = self.sources.secondary.clone() {
            self.stage = Stage::SecondaryFallback;
            let summary = self.fallback(secondary, &mut records, "Spotify").await?;
            stats.secondary_found = Some(summary.applied);
            stats.anomalies += summary.anomalies;
        } else {
            debug!("Spotify credentials not configured, skipping Spotify durations");
        }

        self.stage = Stage::TertiaryFallback;
        let tertiary = Arc::clone(&self.sources.tertiary);
        let summary = self.fallback(tertiary, &mut records, "MusicBrainz").await?;
        stats.tertiary_found = summary.applied;
        stats.anomalies += summary.anomalies;

        stats.unresolved = count_missing(&records);
        info!("Tracks without durations: {}", stats.unresolved);

        self.stage = Stage::Done;
        Ok(EnrichedHistory {
            plays,
            tracks: records,
            stats,
        })
    }

    async fn fetch_pages(
        &self,
        stats: &mut EnrichmentStats,
    ) -> Result<Vec<RecentTrack>, PipelineError> {
        info!("Retrieving recent tracks...");

        let first = match self.sources.pages.fetch(&1).await {
            FetchOutcome::Success(page) => page,
            FetchOutcome::RateLimited => {
                return Err(PipelineError::RateLimited {
                    stage: Stage::FetchPages,
                });
            }
            FetchOutcome::NoMatch => {
                return Err(PipelineError::UpstreamUnavailable(
                    "the first page of the history could not be fetched".to_string(),
                ));
            }
        };

        let remaining: Vec<u32> = (2..=first.total_pages).collect();
        let expected = remaining.len();
        let output = self
            .execute(Arc::clone(&self.sources.pages), remaining)
            .await?;

        let mut pages: Vec<RecentTracksPage> = output
            .into_iter()
            .filter_map(|(page, outcome)| match outcome {
                FetchOutcome::Success(tracks) => Some(tracks),
                FetchOutcome::NoMatch => {
                    warning!("Page {} of the history is missing", page);
                    None
                }
                FetchOutcome::RateLimited => None,
            })
            .collect();
        pages.sort_by_key(|page| page.page);
        stats.missing_pages = expected - pages.len();

        let mut plays = first.tracks;
        for page in pages {
            plays.extend(page.tracks);
        }
        Ok(plays)
    }

    /// Runs one fallback stage over the records that still lack a duration.
    async fn fallback(
        &self,
        fetcher: Arc<DurationFetcher>,
        records: &mut HashMap<TrackKey, EnrichedTrackInfo>,
        source: &str,
    ) -> Result<MergeSummary, PipelineError> {
        let pending = sorted_identities(records.values().filter(|r| !r.has_duration()));
        if pending.is_empty() {
            debug!("No tracks left for {}", source);
            return Ok(MergeSummary::default());
        }

        info!("Retrieving durations for no duration tracks ({source})...");
        let output = self.execute(fetcher, pending).await?;
        let summary = merge_durations(records, output);
        info!("{} durations found: {}", source, summary.applied);
        Ok(summary)
    }

    /// Fills a fresh queue, runs the stage's pool and enforces the
    /// rate-limit guard on the way out.
    async fn execute<F>(
        &self,
        fetcher: Arc<F>,
        items: Vec<F::Item>,
    ) -> Result<Vec<(F::Item, FetchOutcome<F::Output>)>, PipelineError>
    where
        F: Fetcher + ?Sized + 'static,
    {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let queue = WorkQueue::new();
        queue.extend(items).await;

        let progress = self.progress(queue.len().await as u64);
        let output = run_stage(
            self.stage.worker_prefix(),
            &queue,
            fetcher,
            self.options.concurrency,
            &progress,
        )
        .await;
        progress.finish_and_clear();

        if output.rate_limited {
            return Err(PipelineError::RateLimited { stage: self.stage });
        }
        Ok(output.outcomes)
    }

    fn progress(&self, len: u64) -> ProgressBar {
        if !self.options.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len);
        let style = ProgressStyle::with_template("{spinner:.blue} {msg} [{bar:30.blue}] {pos}/{len}")
            .map(|style| style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏").progress_chars("=> "))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb.set_message(capitalize(&self.stage.to_string()));
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}

/// Unique identities of `plays`, keeping the first occurrence's album and
/// external id.
pub fn dedup(plays: &[RecentTrack]) -> Vec<TrackIdentity> {
    let mut identities: Vec<TrackIdentity> =
        plays.iter().map(|track| track.identity.clone()).collect();
    utils::remove_duplicate_tracks(&mut identities);
    identities
}

/// Merges primary-source metadata. Metadata is applied even when the
/// reported duration is 0; an already-known duration is kept.
pub fn merge_metadata(
    records: &mut HashMap<TrackKey, EnrichedTrackInfo>,
    outcomes: Vec<(TrackIdentity, FetchOutcome<TrackMetadata>)>,
) -> MergeSummary {
    let mut summary = MergeSummary::default();

    for (item, outcome) in outcomes {
        let metadata = match outcome {
            FetchOutcome::Success(metadata) => metadata,
            FetchOutcome::NoMatch | FetchOutcome::RateLimited => continue,
        };

        let key = item.key();
        let Some(current) = records.get(&key) else {
            warning!("Unique track not found: {} ({})", item.name, item.artist_name);
            summary.anomalies += 1;
            continue;
        };

        let mut identity = current.identity.clone();
        if identity.album_name.is_none() {
            identity.album_name = metadata.album_name.filter(|album| !album.is_empty());
        }

        let updated = EnrichedTrackInfo {
            identity,
            artist_mbid: metadata.artist_mbid.or_else(|| current.artist_mbid.clone()),
            duration_ms: if current.has_duration() {
                current.duration_ms
            } else {
                metadata.duration_ms
            },
            play_count: metadata.play_count,
        };
        records.insert(key, updated);
        summary.applied += 1;
    }

    summary
}

/// Merges fallback durations. A record only takes a duration while its own
/// is still 0, so an earlier source always wins.
pub fn merge_durations(
    records: &mut HashMap<TrackKey, EnrichedTrackInfo>,
    outcomes: Vec<(TrackIdentity, FetchOutcome<u64>)>,
) -> MergeSummary {
    let mut summary = MergeSummary::default();

    for (item, outcome) in outcomes {
        let duration_ms = match outcome {
            FetchOutcome::Success(0) | FetchOutcome::NoMatch | FetchOutcome::RateLimited => {
                continue;
            }
            FetchOutcome::Success(duration_ms) => duration_ms,
        };

        let key = item.key();
        let Some(current) = records.get(&key) else {
            warning!("Unique track not found: {} ({})", item.name, item.artist_name);
            summary.anomalies += 1;
            continue;
        };
        if current.has_duration() {
            continue;
        }

        let updated = EnrichedTrackInfo {
            duration_ms,
            ..current.clone()
        };
        records.insert(key, updated);
        summary.applied += 1;
    }

    summary
}

fn count_missing(records: &HashMap<TrackKey, EnrichedTrackInfo>) -> usize {
    records.values().filter(|r| !r.has_duration()).count()
}

fn sorted_identities<'a>(
    records: impl Iterator<Item = &'a EnrichedTrackInfo>,
) -> Vec<TrackIdentity> {
    let mut identities: Vec<TrackIdentity> = records.map(|r| r.identity.clone()).collect();
    identities.sort_by_key(TrackIdentity::key);
    identities
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

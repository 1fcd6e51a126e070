//! # Enrichment Pipeline
//!
//! Turns a user's raw scrobble history into one [`EnrichedTrackInfo`] per
//! unique track, with a duration resolved through a fallback chain of data
//! sources.
//!
//! ## Stages
//!
//! ```text
//! FetchPages → Dedup → PrimaryEnrich → SecondaryFallback? → TertiaryFallback → Done
//!                                  ↘ (first RateLimited) → Aborted
//! ```
//!
//! Every stage that talks to a remote service fills a [`WorkQueue`] and hands
//! it to [`run_stage`], which runs a fixed number of workers until the queue
//! is empty. The orchestrator waits for all workers (the stage barrier),
//! then merges the collected outcomes into the record map. Later stages only
//! see records whose duration is still unknown.
//!
//! ## Failure model
//!
//! - `NoMatch` and per-item transport failures leave the duration at 0.
//! - The first `RateLimited` outcome drains the queue and aborts the run;
//!   nothing from the aborted stage is merged.
//!
//! [`EnrichedTrackInfo`]: crate::types::EnrichedTrackInfo

mod orchestrator;
mod pool;
mod queue;

use async_trait::async_trait;

use crate::types::FetchOutcome;

pub use orchestrator::DurationFetcher;
pub use orchestrator::EnrichedHistory;
pub use orchestrator::EnrichmentStats;
pub use orchestrator::InfoFetcher;
pub use orchestrator::MergeSummary;
pub use orchestrator::PageFetcher;
pub use orchestrator::Pipeline;
pub use orchestrator::PipelineError;
pub use orchestrator::PipelineOptions;
pub use orchestrator::Sources;
pub use orchestrator::Stage;
pub use orchestrator::dedup;
pub use orchestrator::merge_durations;
pub use orchestrator::merge_metadata;
pub use pool::StageOutput;
pub use pool::run_stage;
pub use queue::WorkQueue;

/// One data source as seen by the worker pool.
///
/// Implementations may do network and cache I/O but never touch pipeline
/// state; per-item failures are reported as [`FetchOutcome::NoMatch`].
#[async_trait]
pub trait Fetcher: Send + Sync {
    type Item: Clone + Send + Sync + 'static;
    type Output: Send + 'static;

    /// Short label used in logs.
    fn name(&self) -> &'static str;

    async fn fetch(&self, item: &Self::Item) -> FetchOutcome<Self::Output>;
}

//! MusicBrainz recording search, the last duration fallback.
//!
//! MusicBrainz asks clients for a descriptive `User-Agent` (set on the
//! shared [`HttpClient`]) and answers over-eager clients with HTTP 503,
//! which is treated the same as a 429 elsewhere.

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::{
    debug,
    http::{CachedRequest, HttpClient, HttpError},
    pipeline::Fetcher,
    types::{FetchOutcome, Recording, RecordingSearchResponse, TrackIdentity},
    warning,
};

pub struct MusicBrainzFetcher {
    http: HttpClient,
    api_url: String,
}

impl MusicBrainzFetcher {
    pub fn new(http: HttpClient, api_url: String) -> Self {
        Self { http, api_url }
    }

    async fn search(&self, track: &TrackIdentity) -> Result<Vec<Recording>, HttpError> {
        let request = CachedRequest::get(format!(
            "{}/recording",
            self.api_url.trim_end_matches('/')
        ))
        .query("query", format!("{} artist:{}", track.name, track.artist_name))
        .query("fmt", "json")
        .rate_limited_on(StatusCode::SERVICE_UNAVAILABLE);

        let response = self.http.get_json(&request).await?;
        let parsed: RecordingSearchResponse = serde_json::from_value(response.body)?;
        Ok(parsed.recordings)
    }
}

#[async_trait]
impl Fetcher for MusicBrainzFetcher {
    type Item = TrackIdentity;
    type Output = u64;

    fn name(&self) -> &'static str {
        "MusicBrainz search"
    }

    async fn fetch(&self, track: &TrackIdentity) -> FetchOutcome<u64> {
        debug!("[MBD] {} ({})", track.name, track.artist_name);

        match self.search(track).await {
            Ok(recordings) => find_matching_length(&recordings, track).into(),
            Err(HttpError::RateLimited) => FetchOutcome::RateLimited,
            Err(e) => {
                warning!(
                    "MusicBrainz search failed for {} ({}): {}",
                    track.name,
                    track.artist_name,
                    e
                );
                FetchOutcome::NoMatch
            }
        }
    }
}

/// Length of the first recording that matches `track`.
///
/// A recording matches when its title equals the track name (typographic
/// apostrophes folded to `'`, case-insensitive) and one of its artist
/// credits equals the artist. Only the first such recording is considered:
/// when the track carries an external id that recording must list a medium
/// track with that id, and it must have a `length`. Otherwise there is no
/// match.
pub fn find_matching_length(recordings: &[Recording], track: &TrackIdentity) -> Option<u64> {
    let name = normalize(&track.name);
    let artist = track.artist_name.to_lowercase();

    let recording = recordings.iter().find(|recording| {
        normalize(&recording.title) == name
            && recording
                .artist_credit
                .iter()
                .any(|credit| credit.name.to_lowercase() == artist)
    })?;

    match &track.external_id {
        Some(id) if !contains_track_id(recording, id) => None,
        _ => recording.length,
    }
}

fn normalize(title: &str) -> String {
    title.replace('\u{2019}', "'").to_lowercase()
}

fn contains_track_id(recording: &Recording, id: &str) -> bool {
    recording
        .releases
        .iter()
        .flat_map(|release| &release.media)
        .flat_map(|medium| &medium.track)
        .any(|medium_track| medium_track.id == id)
}

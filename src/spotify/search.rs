use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::{
    debug,
    http::{CachedRequest, HttpClient, HttpError},
    management::TokenManager,
    pipeline::Fetcher,
    types::{FetchOutcome, SpotifySearchResponse, SpotifyTrack, TrackIdentity},
    warning,
};

/// Number of search candidates inspected per track.
const SEARCH_LIMIT: u32 = 5;

/// Secondary duration source: Spotify catalog search by track name.
pub struct SpotifySearchFetcher {
    http: HttpClient,
    api_url: String,
    tokens: Arc<TokenManager>,
}

impl SpotifySearchFetcher {
    pub fn new(http: HttpClient, api_url: String, tokens: Arc<TokenManager>) -> Self {
        Self {
            http,
            api_url,
            tokens,
        }
    }

    async fn search(&self, track: &TrackIdentity) -> Result<Vec<Option<SpotifyTrack>>, HttpError> {
        let token = self.tokens.get_valid_token().await?;
        let request = CachedRequest::get(format!("{}/search", self.api_url.trim_end_matches('/')))
            .query("q", format!("track:{}", track.name))
            .query("type", "track")
            .query("limit", SEARCH_LIMIT)
            .bearer(token);

        let response = self.http.get_json(&request).await?;
        let parsed: SpotifySearchResponse = serde_json::from_value(response.body)?;
        Ok(parsed.tracks.items)
    }
}

#[async_trait]
impl Fetcher for SpotifySearchFetcher {
    type Item = TrackIdentity;
    type Output = u64;

    fn name(&self) -> &'static str {
        "Spotify search"
    }

    async fn fetch(&self, track: &TrackIdentity) -> FetchOutcome<u64> {
        debug!("[SFTD] {} ({})", track.name, track.artist_name);

        match self.search(track).await {
            Ok(candidates) => find_matching_duration(&candidates, track).into(),
            Err(HttpError::RateLimited) => FetchOutcome::RateLimited,
            Err(HttpError::Status { status, .. }) if status == StatusCode::UNAUTHORIZED => {
                warning!(
                    "Spotify rejected the access token while searching for {}, requesting a new one",
                    track.name
                );
                self.tokens.invalidate().await;
                FetchOutcome::NoMatch
            }
            Err(e) => {
                warning!("Spotify search failed for {} ({}): {}", track.name, track.artist_name, e);
                FetchOutcome::NoMatch
            }
        }
    }
}

/// Duration of the first candidate whose name matches the track and whose
/// artists include the track's artist, both compared case-insensitively.
pub fn find_matching_duration(
    candidates: &[Option<SpotifyTrack>],
    track: &TrackIdentity,
) -> Option<u64> {
    let name = track.name.to_lowercase();
    let artist = track.artist_name.to_lowercase();

    candidates
        .iter()
        .flatten()
        .find(|candidate| {
            candidate.name.to_lowercase() == name
                && candidate
                    .artists
                    .iter()
                    .flatten()
                    .any(|a| a.name.to_lowercase() == artist)
        })
        .map(|candidate| candidate.duration_ms)
}

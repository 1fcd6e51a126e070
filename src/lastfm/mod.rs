//! # Last.fm Integration Module
//!
//! Read-only access to the Last.fm web service: the user's scrobble history
//! (`user.getRecentTracks`) and per-track metadata (`track.getInfo`), both
//! exposed as pipeline [`Fetcher`](crate::pipeline::Fetcher)s.
//!
//! Last.fm reports most failures as a JSON body `{"error": <code>,
//! "message": ...}`. Code 29 ("Rate Limit Exceeded") becomes
//! [`FetchOutcome::RateLimited`]; code 6 (not found) becomes
//! [`FetchOutcome::NoMatch`]. Every response that did not come from the
//! cache is followed by a short pause to stay within the service's
//! request budget.

mod recent;
mod track;

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tokio::time::sleep;

use crate::{
    debug,
    http::{CachedRequest, HttpClient, HttpError},
    types::FetchOutcome,
    warning,
};

pub use recent::RecentTracksFetcher;
pub use recent::parse_recent_tracks;
pub use track::TrackInfoFetcher;
pub use track::parse_track_info;

/// Last.fm error code for "Rate Limit Exceeded".
pub const RATE_LIMIT_ERROR: i64 = 29;
/// Last.fm error code for "Invalid parameters" / not found.
pub const NOT_FOUND_ERROR: i64 = 6;

const THROTTLE: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum LastFmError {
    #[error("rate limit exceeded")]
    RateLimited,

    #[error("Last.fm error {code}: {message}")]
    Api { code: i64, message: String },

    #[error(transparent)]
    Http(HttpError),

    #[error("unexpected response shape: {0}")]
    Parse(#[from] serde_json::Error),
}

impl From<HttpError> for LastFmError {
    fn from(err: HttpError) -> Self {
        if let HttpError::Status {
            body: Some(body), ..
        } = &err
        {
            match api_error(body) {
                Some((RATE_LIMIT_ERROR, _)) => return LastFmError::RateLimited,
                Some((code, message)) => return LastFmError::Api { code, message },
                None => {}
            }
        }

        match err {
            HttpError::RateLimited => LastFmError::RateLimited,
            other => LastFmError::Http(other),
        }
    }
}

/// Extracts `(code, message)` from a Last.fm error body.
pub fn api_error(body: &Value) -> Option<(i64, String)> {
    let code = body.get("error")?.as_i64()?;
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Some((code, message))
}

#[derive(Debug, Clone)]
pub struct LastFmClient {
    http: HttpClient,
    api_url: String,
    api_key: String,
    username: String,
}

impl LastFmClient {
    pub fn new(http: HttpClient, api_url: String, api_key: String, username: String) -> Self {
        Self {
            http,
            api_url,
            api_key,
            username,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    fn request(&self, method: &str) -> CachedRequest {
        CachedRequest::get(&self.api_url).query("method", method)
    }

    async fn call(&self, request: CachedRequest) -> Result<Value, LastFmError> {
        let request = request
            .query("api_key", &self.api_key)
            .query("format", "json");

        let response = self.http.get_json(&request).await?;
        if !response.from_cache {
            sleep(THROTTLE).await;
        }

        match api_error(&response.body) {
            Some((RATE_LIMIT_ERROR, _)) => Err(LastFmError::RateLimited),
            Some((code, message)) => Err(LastFmError::Api { code, message }),
            None => Ok(response.body),
        }
    }
}

/// Folds a Last.fm result into a pipeline outcome. Failures other than rate
/// limiting are logged and reported as `NoMatch`.
fn into_outcome<T>(context: &str, result: Result<T, LastFmError>) -> FetchOutcome<T> {
    match result {
        Ok(value) => FetchOutcome::Success(value),
        Err(LastFmError::RateLimited) => FetchOutcome::RateLimited,
        Err(LastFmError::Api {
            code: NOT_FOUND_ERROR,
            message,
        }) => {
            debug!("[Last.fm] {}: {}", context, message);
            FetchOutcome::NoMatch
        }
        Err(e) => {
            warning!("[Last.fm] {}: {}", context, e);
            FetchOutcome::NoMatch
        }
    }
}

//! Cached JSON-over-HTTP client shared by all data sources.
//!
//! Every outbound GET goes through [`HttpClient::get_json`], which consults
//! the [`ResponseCache`] before touching the network and stores successful
//! responses afterwards. Service-specific error handling (Last.fm error
//! codes, MusicBrainz throttling) is layered on top by each source module.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;

use crate::{
    config, debug,
    management::{CATALOG_NAMESPACE, CATALOG_TTL, CacheError, ResponseCache},
    warning,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How many times an expired entry is invalidated and looked up again
/// before the request goes to the network regardless.
const MAX_EXPIRED_RETRIES: u32 = 1;

/// Query parameters left out of cache keys so entries survive key rotation.
const IGNORED_KEY_PARAMS: &[&str] = &["api_key"];

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("rate limit exceeded")]
    RateLimited,

    #[error("unexpected status {status}")]
    Status {
        status: StatusCode,
        body: Option<Value>,
    },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("response is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Description of one cacheable GET request.
#[derive(Debug, Clone)]
pub struct CachedRequest {
    url: String,
    query: Vec<(String, String)>,
    bearer: Option<String>,
    namespace: String,
    ttl: Duration,
    rate_limit_statuses: Vec<StatusCode>,
}

impl CachedRequest {
    /// A GET cached in the catalog namespace, rate-limited on HTTP 429.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
            bearer: None,
            namespace: CATALOG_NAMESPACE.to_string(),
            ttl: CATALOG_TTL,
            rate_limit_statuses: vec![StatusCode::TOO_MANY_REQUESTS],
        }
    }

    pub fn query(mut self, name: &str, value: impl ToString) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    pub fn cache(mut self, namespace: impl Into<String>, ttl: Duration) -> Self {
        self.namespace = namespace.into();
        self.ttl = ttl;
        self
    }

    /// Adds a status the service documents as its throttling signal.
    pub fn rate_limited_on(mut self, status: StatusCode) -> Self {
        if !self.rate_limit_statuses.contains(&status) {
            self.rate_limit_statuses.push(status);
        }
        self
    }

    /// URL plus sorted query parameters, without credentials. Headers are
    /// not part of the key.
    pub fn cache_key(&self) -> String {
        let mut params: Vec<String> = self
            .query
            .iter()
            .filter(|(name, _)| !IGNORED_KEY_PARAMS.contains(&name.as_str()))
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        params.sort();

        if params.is_empty() {
            self.url.clone()
        } else {
            format!("{}?{}", self.url, params.join("&"))
        }
    }
}

#[derive(Debug, Clone)]
pub struct JsonResponse {
    pub body: Value,
    pub from_cache: bool,
}

/// Shared HTTP client. Cloning is cheap; every clone uses the same
/// connection pool and cache directory.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    cache: ResponseCache,
}

impl HttpClient {
    /// # Errors
    ///
    /// Fails when the TLS backend cannot be initialized.
    pub fn new(cache: ResponseCache) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(config::USER_AGENT)
            .build()?;
        Ok(Self { client, cache })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Returns the JSON body for `request`, from cache when a fresh entry
    /// exists, otherwise from the network.
    ///
    /// Only successful responses whose body carries no top-level `error`
    /// field are cached.
    ///
    /// # Errors
    ///
    /// - `HttpError::RateLimited` for one of the request's throttling statuses
    /// - `HttpError::Status` for any other non-success status
    /// - `HttpError::Transport` / `HttpError::Parse` for network and body failures
    pub async fn get_json(&self, request: &CachedRequest) -> Result<JsonResponse, HttpError> {
        let key = request.cache_key();

        let mut expired_retries = 0;
        loop {
            match self.cache.get(&request.namespace, &key).await {
                Ok(Some(hit)) if !hit.is_expired => {
                    debug!("Cache hit ({key})");
                    return Ok(JsonResponse {
                        body: hit.payload,
                        from_cache: true,
                    });
                }
                Ok(Some(_)) if expired_retries < MAX_EXPIRED_RETRIES => {
                    debug!("Expired response ({key})");
                    expired_retries += 1;
                    if let Err(e) = self.cache.invalidate(&request.namespace, &key).await {
                        warning!("Cannot remove expired cache entry for {}: {}", key, e);
                        break;
                    }
                }
                Ok(_) => break,
                Err(e) => {
                    warning!("Ignoring unreadable cache entry for {}: {}", key, e);
                    break;
                }
            }
        }

        let mut builder = self.client.get(&request.url).query(&request.query);
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let status = response.status();
        if request.rate_limit_statuses.contains(&status) {
            return Err(HttpError::RateLimited);
        }

        let text = response.text().await?;
        if !status.is_success() {
            return Err(HttpError::Status {
                status,
                body: serde_json::from_str(&text).ok(),
            });
        }

        let body: Value = serde_json::from_str(&text)?;
        if body.get("error").is_none() {
            if let Err(e) = self
                .cache
                .put(&request.namespace, &key, &body, request.ttl)
                .await
            {
                warning!("Cannot cache response for {}: {}", key, e);
            }
        }

        Ok(JsonResponse {
            body,
            from_cache: false,
        })
    }
}

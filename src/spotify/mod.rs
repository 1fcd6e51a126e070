//! # Spotify Integration Module
//!
//! Spotify is the secondary duration source. It is consulted only for
//! tracks Last.fm knows nothing about (or reports with a zero length), and
//! only when the application's client credentials are configured.
//!
//! ## Overview
//!
//! The integration needs no user authorization. It uses the OAuth 2.0
//! client-credentials flow to obtain an app token and then searches the
//! public catalog:
//!
//! ```text
//! SpotifySearchFetcher
//!     ├── TokenManager (lazy token, renewed before expiry)
//!     │       └── auth::request_client_credentials_token
//!     └── GET /v1/search?q=track:<name>&type=track&limit=5
//!             └── find_matching_duration
//! ```
//!
//! ## Core Modules
//!
//! ### Authentication Module
//!
//! [`auth`] - Client-credentials token request:
//! - **Basic Auth**: `client_id:client_secret`, base64-encoded
//! - **Throttling**: HTTP 429 from the token endpoint is reported as a rate limit
//!
//! ### Search Module
//!
//! [`search`] - Catalog search used by the secondary fallback stage:
//! - **Matching**: first candidate whose name and one of whose artists match,
//!   both case-insensitively
//! - **Caching**: search responses are cached for a month like every other
//!   catalog lookup
//! - **Token Rejection**: HTTP 401 drops the held token so the next lookup
//!   authenticates again
//!
//! ## Rate Limiting
//!
//! A 429 from either endpoint surfaces as
//! [`FetchOutcome::RateLimited`](crate::types::FetchOutcome::RateLimited),
//! which stops the whole run.

pub mod auth;
pub mod search;

pub use auth::request_client_credentials_token;
pub use search::{SpotifySearchFetcher, find_matching_duration};

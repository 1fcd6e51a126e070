use chrono::Utc;
use tokio::sync::Mutex;

use crate::{
    config::SpotifyCredentials, http::HttpError, spotify, types::ClientCredentialsToken,
};

/// Seconds before the reported expiry at which a token is considered stale.
const EXPIRY_BUFFER_SECS: i64 = 240;

struct IssuedToken {
    token: ClientCredentialsToken,
    obtained_at: i64,
}

impl IssuedToken {
    fn is_expired(&self, now: i64) -> bool {
        let lifetime = i64::try_from(self.token.expires_in).unwrap_or(i64::MAX);
        now >= self.obtained_at.saturating_add(lifetime) - EXPIRY_BUFFER_SECS
    }
}

/// Holds the Spotify client-credentials token for one run.
///
/// The token is requested on first use, so runs that never reach the
/// Spotify stage never authenticate. Workers share one manager; the mutex
/// makes sure only one of them requests a new token at a time.
pub struct TokenManager {
    credentials: SpotifyCredentials,
    token_url: String,
    client: reqwest::Client,
    token: Mutex<Option<IssuedToken>>,
}

impl TokenManager {
    pub fn new(credentials: SpotifyCredentials, token_url: String, client: reqwest::Client) -> Self {
        Self {
            credentials,
            token_url,
            client,
            token: Mutex::new(None),
        }
    }

    /// Returns a usable access token, requesting a new one when none is
    /// held or the held one is about to expire.
    ///
    /// # Errors
    ///
    /// Propagates the token endpoint failure.
    pub async fn get_valid_token(&self) -> Result<String, HttpError> {
        let mut lock = self.token.lock().await;
        let now = Utc::now().timestamp();

        if let Some(issued) = lock.as_ref() {
            if !issued.is_expired(now) {
                return Ok(issued.token.access_token.clone());
            }
        }

        let token =
            spotify::request_client_credentials_token(&self.client, &self.token_url, &self.credentials)
                .await?;
        let access_token = token.access_token.clone();
        *lock = Some(IssuedToken {
            token,
            obtained_at: now,
        });

        Ok(access_token)
    }

    /// Drops the held token so the next call requests a fresh one.
    pub async fn invalidate(&self) {
        *self.token.lock().await = None;
    }
}

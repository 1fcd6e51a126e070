use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::{Client, StatusCode};

use crate::{config::SpotifyCredentials, debug, http::HttpError, types::ClientCredentialsToken};

/// Requests an app-only access token through the client-credentials flow.
///
/// Spotify expects the client id and secret as HTTP Basic credentials and
/// the grant type as a form field. The resulting token can read the public
/// catalog (search, tracks, albums) but no user data, which is all the
/// duration lookup needs.
///
/// # Arguments
///
/// * `client` - Shared HTTP client
/// * `token_url` - Accounts service token endpoint
/// * `credentials` - Application client id and secret
///
/// # Returns
///
/// Returns a `Result` containing:
/// - `Ok(ClientCredentialsToken)` - Bearer token and its lifetime in seconds
/// - `Err(HttpError)` - Network failure, rejected credentials or throttling
///
/// # Example
///
/// ```
/// let token = request_client_credentials_token(&client, &token_url, &credentials).await?;
/// println!("Token valid for {} seconds", token.expires_in);
/// ```
pub async fn request_client_credentials_token(
    client: &Client,
    token_url: &str,
    credentials: &SpotifyCredentials,
) -> Result<ClientCredentialsToken, HttpError> {
    debug!("Requesting Spotify client-credentials token");

    let response = client
        .post(token_url)
        .header(
            "Authorization",
            format!("Basic {}", basic_credentials(credentials)),
        )
        .form(&[("grant_type", "client_credentials")])
        .send()
        .await?;

    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(HttpError::RateLimited);
    }

    let text = response.text().await?;
    if !status.is_success() {
        return Err(HttpError::Status {
            status,
            body: serde_json::from_str(&text).ok(),
        });
    }

    Ok(serde_json::from_str(&text)?)
}

/// Base64 of `client_id:client_secret`.
pub fn basic_credentials(credentials: &SpotifyCredentials) -> String {
    STANDARD.encode(format!(
        "{}:{}",
        credentials.client_id, credentials.client_secret
    ))
}

//! Identity-store authentication.
//!
//! Exchanges OAuth client credentials for a bearer token. The token is
//! requested once per invocation and never refreshed.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::IdentityError;

/// Bearer token used for API requests.
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// The token value.
    pub token: SecretString,
    /// Lifetime in seconds as reported by the store, if any.
    pub expires_in: Option<i64>,
}

/// Request body for the client-credentials grant.
#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
}

/// Response from the token endpoint.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Request a bearer token with the client-credentials grant.
///
/// # Errors
///
/// Returns `IdentityError::AuthenticationFailed` if the credentials are
/// rejected or the endpoint does not return a token.
#[instrument(skip(client, client_secret), fields(token_url = %token_url))]
pub async fn request_access_token(
    client: &reqwest::Client,
    token_url: &str,
    client_id: &str,
    client_secret: &SecretString,
) -> Result<AccessToken, IdentityError> {
    let response = client
        .post(token_url)
        .basic_auth(client_id, Some(client_secret.expose_secret()))
        .json(&TokenRequest {
            grant_type: "client_credentials",
        })
        .send()
        .await?;

    let status = response.status();

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        return Err(IdentityError::AuthenticationFailed(format!(
            "HTTP {status}: {error_text}"
        )));
    }

    let body: TokenResponse = response
        .json()
        .await
        .map_err(|e| IdentityError::AuthenticationFailed(e.to_string()))?;

    if body.access_token.is_empty() {
        return Err(IdentityError::AuthenticationFailed(
            "token endpoint returned an empty access token".to_string(),
        ));
    }

    tracing::debug!(expires_in = ?body.expires_in, "Obtained identity-store access token");

    Ok(AccessToken {
        token: SecretString::from(body.access_token),
        expires_in: body.expires_in,
    })
}

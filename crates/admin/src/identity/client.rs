//! Identity-store REST client.

use std::collections::HashMap;

use opsdesk_core::{AttributeCatalog, Email, IdentityUserId};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::auth::request_access_token;
use super::types::{DataEnvelope, IdentityUser, UpdateUserRequest, catalog_from_entry};
use super::{IdentityError, IdentityStore};
use crate::config::IdentityConfig;

/// Request timeout for every identity-store call.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Identity-store API client.
///
/// Built once per invocation with a bearer token; every request reuses it.
#[derive(Clone)]
pub struct IdentityClient {
    /// HTTP client with auth and JSON headers preset.
    client: Client,
    /// API base URL without a trailing slash.
    base_url: String,
}

impl std::fmt::Debug for IdentityClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityClient")
            .field("base_url", &self.base_url)
            .field("access_token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl IdentityClient {
    /// Create a client for `base_url` that authenticates with `access_token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not a valid header value or the HTTP
    /// client cannot be created.
    pub fn new(base_url: &str, access_token: &SecretString) -> Result<Self, IdentityError> {
        // The v1 API expects `bearer:<token>` rather than `Bearer <token>`.
        let mut auth = HeaderValue::from_str(&format!("bearer:{}", access_token.expose_secret()))
            .map_err(|_| {
                IdentityError::AuthenticationFailed(
                    "access token is not a valid header value".to_string(),
                )
            })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Obtain an access token with the configured client credentials and
    /// build a client around it.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::AuthenticationFailed` if no token is issued.
    #[instrument(skip(config), fields(api_url = %config.api_url))]
    pub async fn connect(config: &IdentityConfig) -> Result<Self, IdentityError> {
        let token = request_access_token(
            &Client::new(),
            &config.token_url,
            &config.client_id,
            &config.client_secret,
        )
        .await?;

        Self::new(&config.api_url, &token.token)
    }

    /// The API base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the custom-attribute catalog.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or a
    /// payload without a catalog entry.
    #[instrument(skip(self))]
    pub async fn custom_attribute_names(&self) -> Result<AttributeCatalog, IdentityError> {
        const OPERATION: &str = "custom attributes";

        let response = self
            .client
            .get(format!("{}/users/custom_attributes", self.base_url))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(IdentityError::Status {
                operation: OPERATION,
                status: status.as_u16(),
            });
        }

        let envelope: DataEnvelope<Value> =
            response.json().await.map_err(|e| IdentityError::Malformed {
                operation: OPERATION,
                reason: e.to_string(),
            })?;

        let entry = envelope.data.first().ok_or_else(|| IdentityError::Malformed {
            operation: OPERATION,
            reason: "response has no data".to_string(),
        })?;

        let catalog = catalog_from_entry(entry).map_err(|reason| IdentityError::Malformed {
            operation: OPERATION,
            reason,
        })?;

        debug!(count = catalog.names().len(), "Fetched custom attribute catalog");

        Ok(catalog)
    }

    /// Look up a user by email.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a status other than 200, or an
    /// unparseable payload.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn find_user_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<IdentityUser>, IdentityError> {
        const OPERATION: &str = "user lookup";

        let response = self
            .client
            .get(format!("{}/users", self.base_url))
            .query(&[("email", email.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(IdentityError::Status {
                operation: OPERATION,
                status: status.as_u16(),
            });
        }

        let envelope: DataEnvelope<IdentityUser> =
            response.json().await.map_err(|e| IdentityError::Malformed {
                operation: OPERATION,
                reason: e.to_string(),
            })?;

        if envelope.data.len() > 1 {
            warn!(
                matches = envelope.data.len(),
                "Email matched more than one user, using the first"
            );
        }

        Ok(envelope.data.into_iter().next())
    }

    /// Overwrite one custom attribute of a user.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Status` for any status other than 200.
    #[instrument(skip(self, value), fields(user_id = %user_id, attribute = %attribute))]
    pub async fn update_custom_attribute(
        &self,
        user_id: &IdentityUserId,
        attribute: &str,
        value: &str,
    ) -> Result<(), IdentityError> {
        let body = UpdateUserRequest {
            custom_attributes: HashMap::from([(attribute, value)]),
        };

        let response = self
            .client
            .put(format!("{}/users/{user_id}", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(IdentityError::Status {
                operation: "user update",
                status: status.as_u16(),
            });
        }

        debug!("Custom attribute updated");

        Ok(())
    }
}

impl IdentityStore for IdentityClient {
    async fn custom_attribute_names(&self) -> Result<AttributeCatalog, IdentityError> {
        Self::custom_attribute_names(self).await
    }

    async fn find_user_by_email(&self, email: &Email) -> Result<Option<IdentityUser>, IdentityError> {
        Self::find_user_by_email(self, email).await
    }

    async fn update_custom_attribute(
        &self,
        user_id: &IdentityUserId,
        attribute: &str,
        value: &str,
    ) -> Result<(), IdentityError> {
        Self::update_custom_attribute(self, user_id, attribute, value).await
    }
}

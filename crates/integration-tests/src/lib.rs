//! Integration tests for opsdesk.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p opsdesk-integration-tests
//! ```
//!
//! Every test runs the attribute workflow against a local mock of the
//! identity-store API, so no credentials or network access are needed.
//!
//! # Test Categories
//!
//! - `remove_attribute` - Token acquisition, lookup and update end to end

use opsdesk_admin::config::IdentityConfig;
use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Access token issued by [`mount_token_endpoint`].
pub const TEST_ACCESS_TOKEN: &str = "integration-token";

/// Identity settings pointing both the API and the token endpoint at `server`.
#[must_use]
pub fn identity_config(server: &MockServer) -> IdentityConfig {
    IdentityConfig {
        api_url: format!("{}/api/1", server.uri()),
        token_url: format!("{}/auth/oauth2/v2/token", server.uri()),
        client_id: "client-id".to_string(),
        client_secret: SecretString::from("client-secret"),
    }
}

/// Serve a client-credentials token at `/auth/oauth2/v2/token`.
pub async fn mount_token_endpoint(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/oauth2/v2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": TEST_ACCESS_TOKEN,
            "expires_in": 36_000,
            "token_type": "bearer"
        })))
        .mount(server)
        .await;
}

/// Serve a catalog containing `names`.
pub async fn mount_catalog(server: &MockServer, names: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/api/1/users/custom_attributes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [names] })))
        .mount(server)
        .await;
}

/// Serve a single user with `attribute` set to `value`.
///
/// `id` is sent as given, so both numeric and string ids can be served.
pub async fn mount_user(
    server: &MockServer,
    id: impl Into<Value>,
    attribute: &str,
    value: &str,
) {
    let id = id.into();
    Mock::given(method("GET"))
        .and(path("/api/1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "id": id, "custom_attributes": { attribute: value } }]
        })))
        .mount(server)
        .await;
}

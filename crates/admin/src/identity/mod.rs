//! Identity-store REST API client.
//!
//! Provides the three calls the attribute tools need:
//! - the custom-attribute catalog (`GET /users/custom_attributes`)
//! - a user lookup by email (`GET /users?email=...`)
//! - a custom-attribute overwrite (`PUT /users/<id>`)
//!
//! # Architecture
//!
//! - Two-step authentication: client credentials → bearer token → API
//! - One [`IdentityClient`] per invocation, holding the token for every call
//! - [`IdentityStore`] is the seam the attribute workflow talks to, so the
//!   workflow can run against an in-memory store in tests

pub mod auth;
pub mod client;
pub mod types;

use std::future::Future;

use opsdesk_core::{AttributeCatalog, Email, IdentityUserId};
use thiserror::Error;

pub use auth::{AccessToken, request_access_token};
pub use client::IdentityClient;
pub use types::IdentityUser;

/// Errors that can occur when talking to the identity store.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// HTTP request failed before a response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with an unexpected status code.
    #[error("Unexpected status {status} from {operation}")]
    Status {
        /// Which call failed.
        operation: &'static str,
        /// HTTP status code.
        status: u16,
    },

    /// The response body did not have the expected shape.
    #[error("Malformed response from {operation}: {reason}")]
    Malformed {
        /// Which call failed.
        operation: &'static str,
        /// What was wrong.
        reason: String,
    },

    /// Client credentials were rejected or no token was issued.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),
}

/// Operations the attribute workflow needs from an identity store.
pub trait IdentityStore {
    /// Fetch the names of all custom attributes defined in the store.
    fn custom_attribute_names(
        &self,
    ) -> impl Future<Output = Result<AttributeCatalog, IdentityError>> + Send;

    /// Look up a user by email.
    ///
    /// Resolves to `Ok(None)` when the store answers but has no such user.
    fn find_user_by_email(
        &self,
        email: &Email,
    ) -> impl Future<Output = Result<Option<IdentityUser>, IdentityError>> + Send;

    /// Overwrite one custom attribute of a user.
    fn update_custom_attribute(
        &self,
        user_id: &IdentityUserId,
        attribute: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), IdentityError>> + Send;
}

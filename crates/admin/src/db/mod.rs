//! Database access for the attachment report.
//!
//! # Database: Confluence (`MySQL`, read-only)
//!
//! ## Tables
//!
//! - `CONTENT` - pages, attachments and other content (self-joined for the parent page)
//! - `user_mapping` - maps creator keys to usernames
//! - `CONTENTPROPERTIES` - per-content properties; `LONGVAL` holds the file size
//!
//! The report only reads; it never writes to the Confluence schema.

pub mod attachments;

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::MySqlPool;
use sqlx::mysql::MySqlPoolOptions;

pub use attachments::{AttachmentRow, list_attachments};

/// Create a small `MySQL` pool for a one-shot report run.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> Result<MySqlPool, sqlx::Error> {
    MySqlPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

//! opsdesk admin library.
//!
//! The two administrative tools behind the `opsdesk` binary, as a library so
//! they can be tested and reused:
//!
//! - **remove-attribute**: removes one or all tokens from a user's
//!   `;`-delimited custom attribute in the identity store
//! - **attachment-report**: emails a CSV of Confluence attachment metadata
//!
//! # Security
//!
//! The identity client holds a token that can rewrite any user's profile.
//! Credentials are read from the environment and kept in `SecretString`.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod identity;
pub mod services;

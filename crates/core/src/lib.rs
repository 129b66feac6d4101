//! opsdesk core - shared types.
//!
//! The types here are used by both tools in the workspace:
//! - `admin` - identity-store client, attribute mutator and attachment report
//! - `cli` - the `opsdesk` command-line binary
//!
//! # Architecture
//!
//! This crate holds only types and pure logic - no I/O, no HTTP clients, no
//! database access. Everything in it can be tested without a network.
//!
//! # Modules
//!
//! - [`types`] - newtypes for emails and ids, the delimited [`TokenList`] and
//!   the [`AttributeCatalog`] used to resolve attribute names

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

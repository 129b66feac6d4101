//! Core types for opsdesk.
//!
//! This module provides type-safe wrappers for the identity-store concepts the
//! tools work with.

pub mod catalog;
pub mod email;
pub mod id;
pub mod token_list;

pub use catalog::AttributeCatalog;
pub use email::{Email, EmailError};
pub use id::IdentityUserId;
pub use token_list::{DELIMITER, TokenList, TokenListError};

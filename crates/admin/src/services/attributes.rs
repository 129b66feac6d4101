//! Custom-attribute list maintenance.
//!
//! Removes one token, or every token, from a user's `;`-delimited custom
//! attribute in the identity store.
//!
//! # Flow
//!
//! 1. Resolve the caller's attribute name against the store's catalog
//! 2. Look the user up by email and read the attribute's current value
//! 3. Compute the new value (drop one token, or clear the list)
//! 4. Overwrite the attribute with a single update call
//!
//! Every step returns a typed [`AttributeError`]; deciding whether a failure
//! ends the process is left to the caller. No step is retried and nothing
//! guards against a concurrent writer between steps 2 and 4.

use core::fmt;

use opsdesk_core::{AttributeCatalog, Email, IdentityUserId, TokenList, TokenListError};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::identity::{IdentityError, IdentityStore};

/// Errors from the attribute removal workflow.
#[derive(Debug, Error)]
pub enum AttributeError {
    /// The attribute catalog could not be fetched or parsed.
    #[error("Something went wrong looking for '{name}': {source}")]
    CatalogUnavailable {
        /// Attribute name the caller asked for.
        name: String,
        /// Underlying client error.
        #[source]
        source: IdentityError,
    },

    /// No catalog entry matches the requested name.
    #[error("Couldn't find '{name}' in {available}.")]
    AttributeNotFound {
        /// Attribute name the caller asked for.
        name: String,
        /// The catalog that was searched.
        available: AttributeCatalog,
    },

    /// The store has no user with this email, or refused the lookup.
    #[error("Couldn't find user with email address: {email}")]
    UserNotFound {
        /// Email that was looked up.
        email: Email,
        /// HTTP status of the lookup, if it failed with one.
        status: Option<u16>,
    },

    /// The user exists but has no value for the attribute.
    #[error("User {email} has no value for attribute '{attribute}'.")]
    AttributeMissing {
        /// The user's email.
        email: Email,
        /// Canonical attribute name.
        attribute: String,
    },

    /// The token to remove is not in the user's list. Nothing was written.
    #[error("Can't find '{token}' in user {email} custom '{attribute}' to remove.")]
    TokenNotFound {
        /// Token the caller asked to remove.
        token: String,
        /// The user's email.
        email: Email,
        /// Canonical attribute name.
        attribute: String,
    },

    /// The token can never appear in a delimited list.
    #[error("Invalid token: {0}")]
    InvalidToken(#[from] TokenListError),

    /// The store rejected the update.
    #[error("Error Code: {status} Couldn't update user account: {email}")]
    PersistFailed {
        /// The user's email.
        email: Email,
        /// HTTP status returned by the store.
        status: u16,
    },

    /// Any other failure talking to the store.
    #[error("Unexpected error: {0}")]
    Unexpected(#[source] IdentityError),
}

impl AttributeError {
    /// Returns `false` for outcomes that leave the store untouched but are not
    /// failures of the tool itself.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::TokenNotFound { .. })
    }

    /// Returns `true` for the catch-all variant, whose details are worth
    /// printing in full.
    #[must_use]
    pub const fn is_unexpected(&self) -> bool {
        matches!(self, Self::Unexpected(_))
    }
}

/// What to remove from the attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    /// Remove the first entry equal to this token.
    Token(String),
    /// Clear the attribute.
    All,
}

/// Result of a successful removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalReport {
    /// The user's email.
    pub email: Email,
    /// The user's store id.
    pub user_id: IdentityUserId,
    /// Canonical attribute name.
    pub attribute: String,
    /// What was removed: the token, or the full previous value.
    pub removed: String,
    /// Attribute value before the update.
    pub previous_value: String,
    /// Attribute value written to the store.
    pub new_value: String,
}

impl fmt::Display for RemovalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Removed '{}' from attribute '{}' for {}.",
            self.removed, self.attribute, self.email
        )
    }
}

/// Remove the first occurrence of `token` from a delimited value.
///
/// Returns `None` when the value holds no entry equal to `token`.
#[must_use]
pub fn remove_token(current_value: &str, token: &str) -> Option<String> {
    let mut tokens = TokenList::parse(current_value);
    tokens.remove_first(token).then(|| tokens.to_string())
}

/// Value written when every token is removed.
#[must_use]
pub const fn remove_all(_current_value: &str) -> String {
    String::new()
}

/// Runs the removal workflow against an [`IdentityStore`].
#[derive(Debug, Clone)]
pub struct AttributeMutator<S> {
    store: S,
}

impl<S: IdentityStore> AttributeMutator<S> {
    /// Create a mutator backed by `store`.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Resolve a caller-supplied attribute name to its canonical spelling.
    ///
    /// # Errors
    ///
    /// Returns `CatalogUnavailable` if the catalog cannot be fetched and
    /// `AttributeNotFound` if no entry matches.
    #[instrument(skip(self))]
    pub async fn resolve_attribute(&self, name: &str) -> Result<String, AttributeError> {
        let catalog = self
            .store
            .custom_attribute_names()
            .await
            .map_err(|source| AttributeError::CatalogUnavailable {
                name: name.to_string(),
                source,
            })?;

        match catalog.resolve(name) {
            Some(canonical) => Ok(canonical.to_string()),
            None => Err(AttributeError::AttributeNotFound {
                name: name.to_string(),
                available: catalog,
            }),
        }
    }

    /// Find the user and read the current value of `attribute`.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` if the lookup fails with a status, returns a
    /// malformed payload or matches no one, `AttributeMissing` if the user has
    /// no value, and `Unexpected` for transport failures.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn resolve_user(
        &self,
        email: &Email,
        attribute: &str,
    ) -> Result<(IdentityUserId, String), AttributeError> {
        let user = match self.store.find_user_by_email(email).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                return Err(AttributeError::UserNotFound {
                    email: email.clone(),
                    status: None,
                });
            }
            Err(IdentityError::Status { status, .. }) => {
                return Err(AttributeError::UserNotFound {
                    email: email.clone(),
                    status: Some(status),
                });
            }
            Err(IdentityError::Malformed { reason, .. }) => {
                warn!(%reason, "User lookup returned a malformed payload");
                return Err(AttributeError::UserNotFound {
                    email: email.clone(),
                    status: None,
                });
            }
            Err(other) => return Err(AttributeError::Unexpected(other)),
        };

        let value =
            user.custom_attribute(attribute)
                .ok_or_else(|| AttributeError::AttributeMissing {
                    email: email.clone(),
                    attribute: attribute.to_string(),
                })?;

        Ok((user.id, value))
    }

    /// Overwrite the attribute with `new_value`.
    ///
    /// # Errors
    ///
    /// Returns `PersistFailed` for any status other than 200 and `Unexpected`
    /// if the request could not be made.
    #[instrument(skip(self, new_value), fields(user_id = %user_id))]
    pub async fn persist(
        &self,
        user_id: &IdentityUserId,
        email: &Email,
        attribute: &str,
        new_value: &str,
    ) -> Result<(), AttributeError> {
        self.store
            .update_custom_attribute(user_id, attribute, new_value)
            .await
            .map_err(|err| match err {
                IdentityError::Status { status, .. } => AttributeError::PersistFailed {
                    email: email.clone(),
                    status,
                },
                other => AttributeError::Unexpected(other),
            })
    }

    /// Run the whole workflow.
    ///
    /// A token that is not present yields `TokenNotFound` without any update
    /// call being made.
    ///
    /// # Errors
    ///
    /// Returns the first [`AttributeError`] any step produces.
    #[instrument(skip(self, removal), fields(email = %email, attribute = %attribute))]
    pub async fn remove(
        &self,
        email: &Email,
        attribute: &str,
        removal: &Removal,
    ) -> Result<RemovalReport, AttributeError> {
        if let Removal::Token(token) = removal {
            TokenList::validate_token(token)?;
        }

        let canonical = self.resolve_attribute(attribute).await?;
        let (user_id, previous_value) = self.resolve_user(email, &canonical).await?;

        let (removed, new_value) = match removal {
            Removal::All => (previous_value.clone(), remove_all(&previous_value)),
            Removal::Token(token) => {
                let new_value = remove_token(&previous_value, token).ok_or_else(|| {
                    AttributeError::TokenNotFound {
                        token: token.clone(),
                        email: email.clone(),
                        attribute: canonical.clone(),
                    }
                })?;
                (token.clone(), new_value)
            }
        };

        self.persist(&user_id, email, &canonical, &new_value).await?;

        info!(user_id = %user_id, attribute = %canonical, "Custom attribute updated");

        Ok(RemovalReport {
            email: email.clone(),
            user_id,
            attribute: canonical,
            removed,
            previous_value,
            new_value,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use serde_json::{Value, json};

    use super::*;
    use crate::identity::IdentityUser;

    /// In-memory store recording every update.
    #[derive(Default)]
    struct FakeStore {
        catalog: Option<Vec<String>>,
        user: Option<IdentityUser>,
        lookup_status: Option<u16>,
        lookup_malformed: bool,
        update_status: Option<u16>,
        updates: Mutex<Vec<(IdentityUserId, String, String)>>,
    }

    impl FakeStore {
        fn with_user(value: Option<&str>) -> Self {
            let mut attributes = HashMap::new();
            attributes.insert(
                "custom_attribute".to_string(),
                value.map_or(Value::Null, |v| json!(v)),
            );
            Self {
                catalog: Some(vec!["custom_attribute".to_string()]),
                user: Some(IdentityUser {
                    id: IdentityUserId::new("42"),
                    custom_attributes: Some(attributes),
                }),
                ..Self::default()
            }
        }

        fn updates(&self) -> Vec<(IdentityUserId, String, String)> {
            self.updates.lock().unwrap().clone()
        }
    }

    impl IdentityStore for FakeStore {
        async fn custom_attribute_names(&self) -> Result<AttributeCatalog, IdentityError> {
            self.catalog
                .clone()
                .map(AttributeCatalog::new)
                .ok_or(IdentityError::Status {
                    operation: "custom attributes",
                    status: 500,
                })
        }

        async fn find_user_by_email(
            &self,
            _email: &Email,
        ) -> Result<Option<IdentityUser>, IdentityError> {
            if self.lookup_malformed {
                return Err(IdentityError::Malformed {
                    operation: "user lookup",
                    reason: "expected value at line 1 column 1".to_string(),
                });
            }
            match self.lookup_status {
                Some(status) => Err(IdentityError::Status {
                    operation: "user lookup",
                    status,
                }),
                None => Ok(self.user.clone()),
            }
        }

        async fn update_custom_attribute(
            &self,
            user_id: &IdentityUserId,
            attribute: &str,
            value: &str,
        ) -> Result<(), IdentityError> {
            if let Some(status) = self.update_status {
                return Err(IdentityError::Status {
                    operation: "user update",
                    status,
                });
            }
            self.updates
                .lock()
                .unwrap()
                .push((user_id.clone(), attribute.to_string(), value.to_string()));
            Ok(())
        }
    }

    fn alice() -> Email {
        Email::parse("alice@example.com").unwrap()
    }

    #[test]
    fn test_remove_token_pure() {
        assert_eq!(remove_token("a;b;c;", "b").as_deref(), Some("a;c;"));
        assert_eq!(remove_token("a;b;c;", "x"), None);
        assert_eq!(remove_token("ab;b;", "b").as_deref(), Some("ab;"));
    }

    #[test]
    fn test_remove_token_hand_edited_values() {
        assert_eq!(remove_token("a; b; c;", "b").as_deref(), Some("a; c;"));
        assert_eq!(remove_token("a;b", "b"), None);
        assert_eq!(remove_token("a;;b;", "a").as_deref(), Some(";b;"));
    }

    #[test]
    fn test_remove_all_pure() {
        assert_eq!(remove_all("a;b;c;"), "");
        assert_eq!(remove_all(""), "");
    }

    #[test]
    fn test_token_not_found_is_not_fatal() {
        let err = AttributeError::TokenNotFound {
            token: "x".to_string(),
            email: alice(),
            attribute: "custom_attribute".to_string(),
        };
        assert!(!err.is_fatal());
        assert_eq!(
            err.to_string(),
            "Can't find 'x' in user alice@example.com custom 'custom_attribute' to remove."
        );
    }

    #[tokio::test]
    async fn test_remove_single_token() {
        let mutator = AttributeMutator::new(FakeStore::with_user(Some("a;b;c;")));

        let report = mutator
            .remove(&alice(), "custom_attribute", &Removal::Token("b".to_string()))
            .await
            .unwrap();

        assert_eq!(report.new_value, "a;c;");
        assert_eq!(report.removed, "b");
        assert_eq!(
            report.to_string(),
            "Removed 'b' from attribute 'custom_attribute' for alice@example.com."
        );
        assert_eq!(
            mutator.store().updates(),
            vec![(
                IdentityUserId::new("42"),
                "custom_attribute".to_string(),
                "a;c;".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_remove_all_reports_previous_value() {
        let mutator = AttributeMutator::new(FakeStore::with_user(Some("a;b;c;")));

        let report = mutator
            .remove(&alice(), "custom_attribute", &Removal::All)
            .await
            .unwrap();

        assert_eq!(report.new_value, "");
        assert_eq!(report.removed, "a;b;c;");
        assert_eq!(mutator.store().updates().len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_attribute_space_form() {
        let mutator = AttributeMutator::new(FakeStore::with_user(Some("a;")));
        let canonical = mutator.resolve_attribute("Custom Attribute").await.unwrap();
        assert_eq!(canonical, "custom_attribute");
    }

    #[tokio::test]
    async fn test_resolve_attribute_not_found() {
        let mutator = AttributeMutator::new(FakeStore::with_user(Some("a;")));
        let err = mutator.resolve_attribute("cost center").await.unwrap_err();
        assert!(matches!(err, AttributeError::AttributeNotFound { .. }));
        assert_eq!(
            err.to_string(),
            "Couldn't find 'cost center' in [custom_attribute]."
        );
    }

    #[tokio::test]
    async fn test_catalog_unavailable() {
        let store = FakeStore {
            catalog: None,
            ..FakeStore::with_user(Some("a;"))
        };
        let err = AttributeMutator::new(store)
            .resolve_attribute("custom_attribute")
            .await
            .unwrap_err();
        assert!(matches!(err, AttributeError::CatalogUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_token_not_found_skips_update() {
        let mutator = AttributeMutator::new(FakeStore::with_user(Some("a;b;c;")));

        let err = mutator
            .remove(&alice(), "custom_attribute", &Removal::Token("x".to_string()))
            .await
            .unwrap_err();

        assert!(matches!(err, AttributeError::TokenNotFound { .. }));
        assert!(mutator.store().updates().is_empty());
    }

    #[tokio::test]
    async fn test_user_not_found() {
        let store = FakeStore {
            user: None,
            ..FakeStore::with_user(None)
        };
        let err = AttributeMutator::new(store)
            .remove(&alice(), "custom_attribute", &Removal::All)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AttributeError::UserNotFound { status: None, .. }
        ));
    }

    #[tokio::test]
    async fn test_malformed_lookup_is_user_not_found() {
        let store = FakeStore {
            lookup_malformed: true,
            ..FakeStore::with_user(Some("a;b;c;"))
        };
        let mutator = AttributeMutator::new(store);

        let err = mutator
            .remove(&alice(), "custom_attribute", &Removal::Token("b".to_string()))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AttributeError::UserNotFound { status: None, .. }
        ));
        assert!(!err.is_unexpected());
        assert!(mutator.store().updates().is_empty());
    }

    #[tokio::test]
    async fn test_user_lookup_error_status() {
        let store = FakeStore {
            lookup_status: Some(404),
            ..FakeStore::with_user(Some("a;"))
        };
        let err = AttributeMutator::new(store)
            .resolve_user(&alice(), "custom_attribute")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AttributeError::UserNotFound {
                status: Some(404),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_attribute_missing() {
        let mutator = AttributeMutator::new(FakeStore::with_user(None));
        let err = mutator
            .remove(&alice(), "custom_attribute", &Removal::All)
            .await
            .unwrap_err();
        assert!(matches!(err, AttributeError::AttributeMissing { .. }));
        assert!(mutator.store().updates().is_empty());
    }

    #[tokio::test]
    async fn test_persist_failed() {
        let store = FakeStore {
            update_status: Some(400),
            ..FakeStore::with_user(Some("a;b;"))
        };
        let err = AttributeMutator::new(store)
            .remove(&alice(), "custom_attribute", &Removal::Token("a".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AttributeError::PersistFailed { status: 400, .. }));
        assert_eq!(
            err.to_string(),
            "Error Code: 400 Couldn't update user account: alice@example.com"
        );
    }

    #[tokio::test]
    async fn test_invalid_token_rejected_before_lookup() {
        let store = FakeStore {
            catalog: None,
            ..FakeStore::default()
        };
        let err = AttributeMutator::new(store)
            .remove(&alice(), "custom_attribute", &Removal::Token("a;b".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AttributeError::InvalidToken(_)));
    }
}

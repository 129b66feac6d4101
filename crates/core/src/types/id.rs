//! Identity-store user id.

use core::fmt;

use serde::Deserialize;

/// Opaque id the identity store assigns to a user.
///
/// Stores hand these out as JSON numbers (`31416592`) or strings
/// (`"00u1abcd"`); both deserialize, and [`Display`](fmt::Display) renders the
/// id exactly as it appears in request paths.
///
/// ```
/// use opsdesk_core::IdentityUserId;
///
/// let id: IdentityUserId = serde_json::from_str("42").unwrap();
/// assert_eq!(id.to_string(), "42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "RawUserId")]
pub struct IdentityUserId(String);

impl IdentityUserId {
    /// Create an id from its textual form.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for IdentityUserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawUserId {
    Number(i64),
    Text(String),
}

impl From<RawUserId> for IdentityUserId {
    fn from(raw: RawUserId) -> Self {
        match raw {
            RawUserId::Number(n) => Self(n.to_string()),
            RawUserId::Text(s) => Self(s),
        }
    }
}

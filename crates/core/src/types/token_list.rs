//! Delimited token lists stored inside a single custom-attribute string.
//!
//! The identity store has no list type for custom attributes, so lists are
//! kept as `;`-terminated tokens in one string (`"a;b;c;"`). [`TokenList`]
//! parses that string into an ordered sequence so membership and removal work
//! on whole tokens rather than substrings.

use core::fmt;

/// Separator between tokens in an attribute value.
pub const DELIMITER: char = ';';

/// Errors for tokens supplied by a caller.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenListError {
    /// The token is empty (after trimming whitespace).
    #[error("token cannot be empty")]
    Empty,
    /// The token contains the list delimiter and could never be stored as one entry.
    #[error("token '{0}' contains the '{DELIMITER}' delimiter")]
    ContainsDelimiter(String),
}

/// An ordered list of tokens parsed from an attribute value.
///
/// The value is kept as its raw segments, so rendering reproduces the stored
/// string byte for byte and a removal only drops the matched segment and its
/// delimiter. A token is a delimiter-terminated segment compared after
/// trimming whitespace; text after the last delimiter is kept but never
/// matches.
///
/// ```
/// use opsdesk_core::TokenList;
///
/// let mut list = TokenList::parse("a; b; c;");
/// assert!(list.remove_first("b"));
/// assert_eq!(list.to_string(), "a; c;");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenList {
    /// Text before each delimiter, in order.
    terminated: Vec<String>,
    /// Text after the last delimiter.
    tail: String,
}

impl TokenList {
    /// Parse a raw attribute value.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut segments: Vec<String> = raw.split(DELIMITER).map(str::to_owned).collect();
        let tail = segments.pop().unwrap_or_default();

        Self {
            terminated: segments,
            tail,
        }
    }

    /// Check that `token` can be stored as a single list entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is blank or contains the delimiter.
    pub fn validate_token(token: &str) -> Result<(), TokenListError> {
        if token.trim().is_empty() {
            return Err(TokenListError::Empty);
        }
        if token.contains(DELIMITER) {
            return Err(TokenListError::ContainsDelimiter(token.to_owned()));
        }
        Ok(())
    }

    /// Remove the first entry equal to `token`, ignoring surrounding whitespace.
    ///
    /// Returns `false` (leaving the list untouched) when no entry matches or
    /// `token` is blank. Later duplicates are kept.
    pub fn remove_first(&mut self, token: &str) -> bool {
        let token = token.trim();
        if token.is_empty() {
            return false;
        }
        match self.terminated.iter().position(|s| s.trim() == token) {
            Some(index) => {
                self.terminated.remove(index);
                true
            }
            None => false,
        }
    }
}

impl fmt::Display for TokenList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.terminated {
            write!(f, "{segment}{DELIMITER}")?;
        }
        f.write_str(&self.tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unterminated_tail_is_not_a_token() {
        let mut list = TokenList::parse("a;b");
        assert!(!list.remove_first("b"));
        assert_eq!(list.to_string(), "a;b");
        assert!(list.remove_first("a"));
        assert_eq!(list.to_string(), "b");
    }

    #[test]
    fn test_empty_segments_never_match() {
        let mut list = TokenList::parse(";a;;b;");
        assert!(!list.remove_first(""));
        assert_eq!(list.to_string(), ";a;;b;");
    }

    #[test]
    fn test_render_preserves_raw_value() {
        for raw in ["", "a;b;c;", ";a;;b;", "a; b ;c", " x ;"] {
            assert_eq!(TokenList::parse(raw).to_string(), raw);
        }
    }

    #[test]
    fn test_remove_middle_token() {
        let mut list = TokenList::parse("a;b;c;");
        assert!(list.remove_first("b"));
        assert_eq!(list.to_string(), "a;c;");
        assert!(!list.remove_first("b"));
    }

    #[test]
    fn test_remove_matches_spaced_token() {
        let mut list = TokenList::parse("a; b; c;");
        assert!(list.remove_first("b"));
        assert_eq!(list.to_string(), "a; c;");

        let mut list = TokenList::parse(" b ;a;");
        assert!(list.remove_first("b"));
        assert_eq!(list.to_string(), "a;");
    }

    #[test]
    fn test_remove_keeps_other_segments_untouched() {
        let mut list = TokenList::parse("a;;b;");
        assert!(list.remove_first("a"));
        assert_eq!(list.to_string(), ";b;");
    }

    #[test]
    fn test_remove_does_not_match_suffix() {
        let mut list = TokenList::parse("ab;b;");
        assert!(list.remove_first("b"));
        assert_eq!(list.to_string(), "ab;");
    }

    #[test]
    fn test_remove_does_not_match_prefix() {
        let mut list = TokenList::parse("new-one;other;");
        assert!(!list.remove_first("new"));
        assert_eq!(list.to_string(), "new-one;other;");
    }

    #[test]
    fn test_remove_only_first_duplicate() {
        let mut list = TokenList::parse("a;b;a;");
        assert!(list.remove_first("a"));
        assert_eq!(list.to_string(), "b;a;");
        assert!(list.remove_first("a"));
        assert_eq!(list.to_string(), "b;");
    }

    #[test]
    fn test_remove_missing_token_leaves_list() {
        let mut list = TokenList::parse("a;b;c;");
        assert!(!list.remove_first("x"));
        assert_eq!(list.to_string(), "a;b;c;");
    }

    #[test]
    fn test_remove_last_token_yields_empty_value() {
        let mut list = TokenList::parse("only;");
        assert!(list.remove_first("only"));
        assert_eq!(list.to_string(), "");
    }

    #[test]
    fn test_validate_token() {
        assert!(TokenList::validate_token("b").is_ok());
        assert_eq!(TokenList::validate_token(" "), Err(TokenListError::Empty));
        assert_eq!(
            TokenList::validate_token("a;b"),
            Err(TokenListError::ContainsDelimiter("a;b".to_string()))
        );
    }
}

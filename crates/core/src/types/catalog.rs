//! Custom-attribute catalog and name resolution.

use core::fmt;

/// The custom-attribute names defined in the identity store.
///
/// Callers type attribute names by hand (`"Custom Attribute"`), while the store
/// only accepts its own spelling (`custom_attribute`). [`AttributeCatalog::resolve`]
/// maps the former onto the latter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeCatalog {
    names: Vec<String>,
}

impl AttributeCatalog {
    /// Create a catalog from the store's attribute names, preserving order.
    #[must_use]
    pub const fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Resolve a caller-supplied name to the catalog's canonical spelling.
    ///
    /// An exact match wins. Otherwise both sides are lowercased with
    /// underscores read as spaces, and the first catalog entry that compares
    /// equal is returned.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&str> {
        if let Some(exact) = self.names.iter().find(|n| *n == name) {
            return Some(exact);
        }

        let wanted = normalize(name);
        self.names
            .iter()
            .find(|n| normalize(n) == wanted)
            .map(String::as_str)
    }

    /// The attribute names, in store order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl fmt::Display for AttributeCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.names.join(", "))
    }
}

fn normalize(name: &str) -> String {
    name.trim().replace('_', " ").to_lowercase()
}

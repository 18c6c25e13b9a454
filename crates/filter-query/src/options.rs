//! Extraction options.
//!
//! The only knob is the field whitelist. Options can be built fluently or
//! deserialized from configuration:
//!
//! ```
//! use filter_query::ExtractOptions;
//!
//! let options = ExtractOptions::new().allow_keys(["isbn13", "marking"]);
//! assert!(options.allowed_keys.allows("isbn13"));
//! assert!(!options.allowed_keys.allows("price"));
//! ```

use std::collections::BTreeSet;

use serde::Deserialize;

/// The wildcard whitelist entry.
pub const WILDCARD: &str = "*";

/// Which field names a query may reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "AllowedKeysRepr")]
pub enum AllowedKeys {
    /// Any field name is accepted (`"*"`).
    #[default]
    Any,
    /// Only the listed field names are accepted.
    Only(BTreeSet<String>),
}

impl AllowedKeys {
    /// Builds a whitelist from names. A `"*"` entry makes it the wildcard.
    pub fn only<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: BTreeSet<String> = keys.into_iter().map(Into::into).collect();
        if keys.contains(WILDCARD) {
            AllowedKeys::Any
        } else {
            AllowedKeys::Only(keys)
        }
    }

    /// Returns `true` if `field` may be used in a query.
    pub fn allows(&self, field: &str) -> bool {
        match self {
            AllowedKeys::Any => true,
            AllowedKeys::Only(keys) => keys.contains(field),
        }
    }

    /// Returns `true` for the wildcard.
    pub fn is_any(&self) -> bool {
        matches!(self, AllowedKeys::Any)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AllowedKeysRepr {
    Single(String),
    List(Vec<String>),
}

impl TryFrom<AllowedKeysRepr> for AllowedKeys {
    type Error = String;

    fn try_from(repr: AllowedKeysRepr) -> Result<Self, Self::Error> {
        match repr {
            AllowedKeysRepr::Single(key) if key == WILDCARD => Ok(AllowedKeys::Any),
            AllowedKeysRepr::Single(key) => Err(format!(
                "allowed keys must be \"{WILDCARD}\" or a list of field names, got \"{key}\""
            )),
            AllowedKeysRepr::List(keys) => Ok(AllowedKeys::only(keys)),
        }
    }
}

/// Configuration for [`extract`](crate::extract).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtractOptions {
    /// Field whitelist; defaults to the wildcard.
    pub allowed_keys: AllowedKeys,
}

impl ExtractOptions {
    /// Creates options that accept any field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts queries to the given field names.
    pub fn allow_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_keys = AllowedKeys::only(keys);
        self
    }

    /// Accepts any field name again.
    pub fn allow_any_key(mut self) -> Self {
        self.allowed_keys = AllowedKeys::Any;
        self
    }
}

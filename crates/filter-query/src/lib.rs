//! Filter Query - Parse compact, URL-safe filter strings into typed filters.
//!
//! A query string is a list of clauses, each of the form
//! `type:field:operator:value`, separated by `,` or `|`:
//!
//! ```text
//! s:isbn13:=:9783111108346,s:marking:!=:[pencil,stickers]
//! ```
//!
//! [`extract`] turns such a string into an ordered list of [`FilterQuery`]
//! values, one per clause, or fails on the first malformed clause.
//!
//! # Quick Start
//!
//! ```rust
//! use filter_query::{extract, ExtractOptions, GroupDelimiter, Op};
//!
//! let filters = extract(
//!     "s:isbn13:=:9783111108346,s:marking:!=:[pencil,stickers]",
//!     &ExtractOptions::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(filters.len(), 2);
//! assert_eq!(filters[0].field(), "isbn13");
//! assert!(!filters[0].is_multi());
//!
//! assert_eq!(filters[1].op(), Op::Ne);
//! assert_eq!(filters[1].group_delimiter(), Some(GroupDelimiter::Comma));
//! assert_eq!(
//!     filters[1].as_strings().unwrap().values(),
//!     &["pencil".to_string(), "stickers".to_string()]
//! );
//! ```
//!
//! # Syntax
//!
//! | Type | Token | Operators |
//! |------|-------|-----------|
//! | String | `s` | `=` `!=` `<>` `<!>` `~` `!~` |
//! | Boolean | `b` | `=` `!=` |
//! | Number | `n` | `=` `!=` `>` `>=` `<` `<=` `<>` `<!>` `><` `>!<` |
//! | Date | `d` | same as number |
//! | Void | `v` | `!!` `!` |
//!
//! A value is plain text, a `[a,b]` group (elements combined with AND), or a
//! `(a|b)` group (elements combined with OR). Range operators (`><`, `>!<`)
//! take exactly two values. Structural characters inside values are escaped
//! with a backslash, e.g. `\:`.
//!
//! # Evaluating filters
//!
//! A [`Matcher`] compiles a filter list and evaluates it against in-memory
//! records through an accessor function or the [`Filterable`] trait.

mod coerce;
mod declared_type;
mod error;
mod filter;
mod matcher;
mod op;
mod options;
mod predicate;
mod tokenizer;
mod traits;
mod value;

use tracing::debug;

// Re-export public API
pub use coerce::transform;
pub use declared_type::DeclaredType;
pub use error::{ErrorKind, FilterError, Result};
pub use filter::{Clause, FilterQuery, GroupDelimiter, Join, Operand};
pub use matcher::Matcher;
pub use op::Op;
pub use options::{AllowedKeys, ExtractOptions, WILDCARD};
pub use predicate::Predicate;
pub use tokenizer::{tokenize, RawDescriptor, RawValue, Tokenizer};
pub use traits::Filterable;
pub use value::Value;

/// Parses a query string into typed filters, in input order.
///
/// Each clause is coerced as soon as the tokenizer finishes it, so the
/// first failure, structural or type-related, aborts the call.
pub fn extract(input: &str, options: &ExtractOptions) -> Result<Vec<FilterQuery>> {
    let filters = Tokenizer::new(input, options)
        .map(|raw| raw.and_then(transform))
        .collect::<Result<Vec<_>>>()?;
    debug!(clauses = filters.len(), "query extracted");
    Ok(filters)
}

/// A reusable parser bound to one configuration.
///
/// An `Extractor` holds only its options; every call builds its own
/// tokenizer state, so a shared `Extractor` can be used from many threads.
///
/// ```
/// use filter_query::{ExtractOptions, Extractor};
///
/// let extractor = Extractor::new(ExtractOptions::new().allow_keys(["isbn13"]));
/// assert!(extractor.extract("s:isbn13:=:9783111108346").is_ok());
/// assert!(extractor.extract("s:marking:=:pencil").unwrap_err().is_unknown_token());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    options: ExtractOptions,
}

impl Extractor {
    /// Creates an extractor with the given options.
    pub fn new(options: ExtractOptions) -> Self {
        Extractor { options }
    }

    /// Returns the options this extractor applies.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Parses a query string into typed filters.
    pub fn extract(&self, input: &str) -> Result<Vec<FilterQuery>> {
        extract(input, &self.options)
    }

    /// Parses a query string without value coercion.
    pub fn tokenize(&self, input: &str) -> Result<Vec<RawDescriptor>> {
        tokenize(input, &self.options)
    }

    /// Parses and compiles a query string for in-memory evaluation.
    pub fn matcher(&self, input: &str) -> Result<Matcher> {
        Matcher::parse(input, &self.options)
    }
}

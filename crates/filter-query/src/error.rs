//! Error types for the filter-query crate.

use thiserror::Error;

/// Broad class of a [`FilterError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Structural violation of the query grammar.
    Grammar,
    /// A declared type, operator, or field that is not recognized or not allowed.
    UnknownToken,
    /// A value or operator that does not fit the clause's declared type.
    TypeMismatch,
    /// A `~`/`!~` pattern that failed to compile.
    Pattern,
}

/// Errors that can occur when extracting or evaluating filter queries.
///
/// Every error aborts the whole call that produced it. Positions are
/// zero-based character offsets into the input string.
#[derive(Debug, Error)]
pub enum FilterError {
    /// A colon arrived after type, field and operator were all set.
    #[error("unexpected character '{ch}' at position {position}")]
    UnexpectedCharacter { ch: char, position: usize },

    /// A colon appeared inside an open group.
    #[error("unbalanced parenthesis or brackets: ':' inside a group at position {position}")]
    ColonInGroup { position: usize },

    /// A group was opened while another was still open.
    #[error("unbalanced parenthesis or brackets: nested group at position {position}")]
    NestedGroup { position: usize },

    /// A group was closed without having been opened.
    #[error("unbalanced parenthesis or brackets: '{ch}' at position {position} closes nothing")]
    UnopenedGroup { ch: char, position: usize },

    /// The input ended with a group still open.
    #[error("unbalanced parenthesis or brackets: group opened at position {position} is never closed")]
    UnclosedGroup { position: usize },

    /// An escape that is not allowed at this point.
    #[error("character '{ch}' at position {position} cannot be escaped here")]
    InvalidEscape { ch: char, position: usize },

    /// The input ended right after a backslash.
    #[error("dangling escape at end of input")]
    DanglingEscape,

    /// A clause ended before its header was complete.
    #[error("missing {part} in clause ending at position {position}")]
    MissingHeader { part: &'static str, position: usize },

    /// The field segment of a clause was empty.
    #[error("empty field name at position {position}")]
    EmptyField { position: usize },

    /// Declared type token not in the type registry.
    #[error("unknown type '{0}'")]
    UnknownType(String),

    /// Operator token not in the operator registry.
    #[error("unknown operator '{0}'")]
    UnknownOperator(String),

    /// Field not present in a non-wildcard whitelist.
    #[error("unknown field '{0}'")]
    UnknownField(String),

    /// Operator is not valid for the clause's declared type.
    #[error("operator '{op}' is not valid for {value_type} field '{field}'")]
    InvalidOperatorForType {
        field: String,
        op: &'static str,
        value_type: &'static str,
    },

    /// Value text does not parse as the declared type.
    #[error("invalid {expected} value '{value}' for field '{field}'")]
    InvalidValue {
        field: String,
        value: String,
        expected: &'static str,
    },

    /// Wrong number of values for the operator.
    #[error("operator '{op}' on field '{field}' expects {expected} values, got {actual}")]
    ArityMismatch {
        field: String,
        op: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A group was given to a type that only takes one value.
    #[error("{value_type} field '{field}' does not accept a group of values")]
    GroupNotAllowed {
        field: String,
        value_type: &'static str,
    },

    /// Invalid regular expression pattern.
    #[error("invalid regex pattern: {0}")]
    InvalidRegex(#[from] regex::Error),
}

impl FilterError {
    /// Returns the broad class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FilterError::UnexpectedCharacter { .. }
            | FilterError::ColonInGroup { .. }
            | FilterError::NestedGroup { .. }
            | FilterError::UnopenedGroup { .. }
            | FilterError::UnclosedGroup { .. }
            | FilterError::InvalidEscape { .. }
            | FilterError::DanglingEscape
            | FilterError::MissingHeader { .. }
            | FilterError::EmptyField { .. } => ErrorKind::Grammar,
            FilterError::UnknownType(_)
            | FilterError::UnknownOperator(_)
            | FilterError::UnknownField(_) => ErrorKind::UnknownToken,
            FilterError::InvalidOperatorForType { .. }
            | FilterError::InvalidValue { .. }
            | FilterError::ArityMismatch { .. }
            | FilterError::GroupNotAllowed { .. } => ErrorKind::TypeMismatch,
            FilterError::InvalidRegex(_) => ErrorKind::Pattern,
        }
    }

    /// Returns `true` for structural grammar violations.
    pub fn is_grammar(&self) -> bool {
        self.kind() == ErrorKind::Grammar
    }

    /// Returns `true` for unrecognized or disallowed tokens.
    pub fn is_unknown_token(&self) -> bool {
        self.kind() == ErrorKind::UnknownToken
    }

    /// Returns `true` for value/operator/type disagreements.
    pub fn is_type_mismatch(&self) -> bool {
        self.kind() == ErrorKind::TypeMismatch
    }
}

/// Result type for filter-query operations.
pub type Result<T> = std::result::Result<T, FilterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(
            FilterError::UnexpectedCharacter { ch: ':', position: 7 }.kind(),
            ErrorKind::Grammar
        );
        assert_eq!(FilterError::DanglingEscape.kind(), ErrorKind::Grammar);
        assert!(FilterError::UnknownType("z".into()).is_unknown_token());
        assert!(FilterError::UnknownField("marking".into()).is_unknown_token());
        assert!(FilterError::ArityMismatch {
            field: "price".into(),
            op: "><",
            expected: 2,
            actual: 3,
        }
        .is_type_mismatch());
    }

    #[test]
    fn messages_carry_context() {
        let err = FilterError::ArityMismatch {
            field: "price".into(),
            op: "><",
            expected: 2,
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "operator '><' on field 'price' expects 2 values, got 3"
        );
        assert_eq!(
            FilterError::UnknownType("z".into()).to_string(),
            "unknown type 'z'"
        );
    }
}

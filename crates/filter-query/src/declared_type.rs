//! Declared types for filter clauses.

use crate::op::Op;

/// The leading type tag of a clause.
///
/// The declared type decides how the value text is coerced and which
/// operators are legal.
///
/// | Token | Type | Operators |
/// |-------|------|-----------|
/// | `s` | String | `=` `!=` `<>` `<!>` `~` `!~` |
/// | `b` | Boolean | `=` `!=` |
/// | `n` | Number | `=` `!=` `>` `>=` `<` `<=` `<>` `<!>` `><` `>!<` |
/// | `d` | Date | same as number |
/// | `v` | Void | `!!` `!` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclaredType {
    String,
    Boolean,
    Number,
    Date,
    Void,
}

impl DeclaredType {
    /// Every registered declared type.
    pub const ALL: [DeclaredType; 5] = [
        DeclaredType::String,
        DeclaredType::Boolean,
        DeclaredType::Number,
        DeclaredType::Date,
        DeclaredType::Void,
    ];

    /// Looks up a declared type by its one-letter token.
    pub fn from_token(token: &str) -> Option<DeclaredType> {
        DeclaredType::ALL
            .into_iter()
            .find(|declared| declared.token() == token)
    }

    /// Returns the one-letter token used in query strings.
    pub fn token(self) -> &'static str {
        match self {
            DeclaredType::String => "s",
            DeclaredType::Boolean => "b",
            DeclaredType::Number => "n",
            DeclaredType::Date => "d",
            DeclaredType::Void => "v",
        }
    }

    /// Returns the long name used in messages and serialized output.
    pub fn name(self) -> &'static str {
        match self {
            DeclaredType::String => "string",
            DeclaredType::Boolean => "boolean",
            DeclaredType::Number => "number",
            DeclaredType::Date => "date",
            DeclaredType::Void => "null",
        }
    }

    /// Returns `true` if `op` is legal for this type.
    pub fn allows(self, op: Op) -> bool {
        match self {
            DeclaredType::String => op.is_string_op(),
            DeclaredType::Boolean => op.is_bool_op(),
            DeclaredType::Number => op.is_number_op(),
            DeclaredType::Date => op.is_date_op(),
            DeclaredType::Void => op.is_void_op(),
        }
    }

    /// Returns the operators legal for this type, in registry order.
    pub fn operators(self) -> Vec<Op> {
        Op::ALL.into_iter().filter(|op| self.allows(*op)).collect()
    }
}

impl std::fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_resolve() {
        assert_eq!(DeclaredType::from_token("s"), Some(DeclaredType::String));
        assert_eq!(DeclaredType::from_token("v"), Some(DeclaredType::Void));
        assert_eq!(DeclaredType::from_token("z"), None);
        assert_eq!(DeclaredType::from_token("S"), None);
        assert_eq!(DeclaredType::from_token(""), None);
    }

    #[test]
    fn operator_tables() {
        assert_eq!(DeclaredType::Boolean.operators(), vec![Op::Eq, Op::Ne]);
        assert_eq!(DeclaredType::Void.operators(), vec![Op::Is, Op::IsNot]);
        assert_eq!(DeclaredType::Number.operators().len(), 10);
        assert_eq!(DeclaredType::Date.operators(), DeclaredType::Number.operators());
        assert!(DeclaredType::String.allows(Op::Matches));
        assert!(!DeclaredType::String.allows(Op::Range));
    }
}

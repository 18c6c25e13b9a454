//! Comparison operators for filter clauses.
//!
//! The [`Op`] enum is the operator registry: every literal token the query
//! syntax accepts, and which declared types each one is legal for.

use std::cmp::Ordering;

/// Comparison operator for a filter clause.
///
/// Operators are grouped by the types they support:
/// - **Equality**: `Eq`, `Ne` - string, boolean, number, date
/// - **Ordering**: `Gt`, `Gte`, `Lt`, `Lte` - number, date
/// - **Range**: `Range`, `NotRange` - number, date; exactly two values
/// - **Membership**: `In`, `NotIn` - string, number, date
/// - **Pattern**: `Matches`, `NotMatches` - string
/// - **Null checks**: `Is`, `IsNot` - void
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `><` - strictly between two bounds.
    Range,
    /// `>!<` - outside two bounds.
    NotRange,
    /// `<>` - one of a set.
    In,
    /// `<!>` - none of a set.
    NotIn,
    /// `~` - matches a pattern.
    Matches,
    /// `!~` - does not match a pattern.
    NotMatches,
    /// `!!` - is null.
    Is,
    /// `!` - is not null.
    IsNot,
}

impl Op {
    /// Every registered operator.
    pub const ALL: [Op; 14] = [
        Op::Eq,
        Op::Ne,
        Op::Gt,
        Op::Gte,
        Op::Lt,
        Op::Lte,
        Op::Range,
        Op::NotRange,
        Op::In,
        Op::NotIn,
        Op::Matches,
        Op::NotMatches,
        Op::Is,
        Op::IsNot,
    ];

    /// Looks up an operator by its literal token.
    pub fn from_token(token: &str) -> Option<Op> {
        Op::ALL.into_iter().find(|op| op.as_str() == token)
    }

    /// Returns the literal token of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "!=",
            Op::Gt => ">",
            Op::Gte => ">=",
            Op::Lt => "<",
            Op::Lte => "<=",
            Op::Range => "><",
            Op::NotRange => ">!<",
            Op::In => "<>",
            Op::NotIn => "<!>",
            Op::Matches => "~",
            Op::NotMatches => "!~",
            Op::Is => "!!",
            Op::IsNot => "!",
        }
    }

    /// Returns a descriptive name, e.g. for documentation or logs.
    pub fn name(self) -> &'static str {
        match self {
            Op::Eq => "equal",
            Op::Ne => "not-equal",
            Op::Gt => "greater",
            Op::Gte => "greater-equal",
            Op::Lt => "less",
            Op::Lte => "less-equal",
            Op::Range => "range",
            Op::NotRange => "not-range",
            Op::In => "membership",
            Op::NotIn => "not-membership",
            Op::Matches => "matches",
            Op::NotMatches => "not-matches",
            Op::Is => "is",
            Op::IsNot => "is-not",
        }
    }

    /// Returns `true` if this operator is valid for string clauses.
    pub fn is_string_op(self) -> bool {
        matches!(
            self,
            Op::Eq | Op::Ne | Op::In | Op::NotIn | Op::Matches | Op::NotMatches
        )
    }

    /// Returns `true` if this operator is valid for boolean clauses.
    pub fn is_bool_op(self) -> bool {
        matches!(self, Op::Eq | Op::Ne)
    }

    /// Returns `true` if this operator is valid for number clauses.
    pub fn is_number_op(self) -> bool {
        matches!(
            self,
            Op::Eq
                | Op::Ne
                | Op::Gt
                | Op::Gte
                | Op::Lt
                | Op::Lte
                | Op::In
                | Op::NotIn
                | Op::Range
                | Op::NotRange
        )
    }

    /// Returns `true` if this operator is valid for date clauses.
    ///
    /// Dates share the number operator set.
    pub fn is_date_op(self) -> bool {
        self.is_number_op()
    }

    /// Returns `true` if this operator is valid for void (null) clauses.
    pub fn is_void_op(self) -> bool {
        matches!(self, Op::Is | Op::IsNot)
    }

    /// Returns `true` for the two-bound operators.
    pub fn is_range(self) -> bool {
        matches!(self, Op::Range | Op::NotRange)
    }

    /// Evaluates an element-wise comparison given an ordering result.
    ///
    /// Only equality and ordering operators compare element-wise; the rest
    /// return `false`.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            Op::Eq => ordering == Ordering::Equal,
            Op::Ne => ordering != Ordering::Equal,
            Op::Gt => ordering == Ordering::Greater,
            Op::Gte => ordering != Ordering::Less,
            Op::Lt => ordering == Ordering::Less,
            Op::Lte => ordering != Ordering::Greater,
            _ => false,
        }
    }

    /// Returns `true` for the negated forms (`!=`, `>!<`, `<!>`, `!~`, `!`).
    pub fn is_negated(self) -> bool {
        matches!(
            self,
            Op::Ne | Op::NotRange | Op::NotIn | Op::NotMatches | Op::IsNot
        )
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl serde::Serialize for Op {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

//! Typed filter descriptors.
//!
//! A [`FilterQuery`] is the accepted form of one clause of a query string.
//! There is one variant per declared type, and each variant can only be
//! built through a checked constructor, so an operator that is illegal for
//! the type, or a range without exactly two bounds, cannot be represented.

use chrono::{DateTime, Utc};
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

use crate::declared_type::DeclaredType;
use crate::error::{FilterError, Result};
use crate::op::Op;

/// How the elements of a group combine, decided by the closing bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupDelimiter {
    /// `[a,b]` - elements joined by `,`, combined with AND.
    Comma,
    /// `(a|b)` - elements joined by `|`, combined with OR.
    Pipe,
}

/// Combination semantics for per-element results of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Join {
    /// Every element must hold.
    All,
    /// At least one element must hold.
    Any,
}

impl GroupDelimiter {
    /// Maps a closing bracket to its delimiter.
    pub fn from_closing(ch: char) -> Option<GroupDelimiter> {
        match ch {
            ']' => Some(GroupDelimiter::Comma),
            ')' => Some(GroupDelimiter::Pipe),
            _ => None,
        }
    }

    /// Returns the separator character.
    pub fn as_char(self) -> char {
        match self {
            GroupDelimiter::Comma => ',',
            GroupDelimiter::Pipe => '|',
        }
    }

    /// Returns the join semantics implied by this delimiter.
    pub fn join(self) -> Join {
        match self {
            GroupDelimiter::Comma => Join::All,
            GroupDelimiter::Pipe => Join::Any,
        }
    }
}

impl Serialize for GroupDelimiter {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_char(self.as_char())
    }
}

/// A clause value: one scalar, or an ordered group from a bracketed section.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand<T> {
    /// Plain value text.
    Single(T),
    /// Bracketed value section.
    Group {
        values: Vec<T>,
        delimiter: GroupDelimiter,
    },
}

impl<T> Operand<T> {
    /// Returns `true` when the value came from a bracketed group.
    pub fn is_multi(&self) -> bool {
        matches!(self, Operand::Group { .. })
    }

    /// Returns the group delimiter, present exactly when [`is_multi`](Self::is_multi).
    pub fn group_delimiter(&self) -> Option<GroupDelimiter> {
        match self {
            Operand::Single(_) => None,
            Operand::Group { delimiter, .. } => Some(*delimiter),
        }
    }

    /// Returns all values in input order; a scalar is a one-element slice.
    pub fn values(&self) -> &[T] {
        match self {
            Operand::Single(value) => std::slice::from_ref(value),
            Operand::Group { values, .. } => values,
        }
    }

    /// Returns the number of values.
    pub fn len(&self) -> usize {
        self.values().len()
    }

    /// Returns `true` for an empty group.
    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }

    /// Returns the scalar value, if this is not a group.
    pub fn as_single(&self) -> Option<&T> {
        match self {
            Operand::Single(value) => Some(value),
            Operand::Group { .. } => None,
        }
    }

    /// Converts every value, keeping the shape and delimiter.
    pub fn try_map<U, E, F>(self, mut f: F) -> std::result::Result<Operand<U>, E>
    where
        F: FnMut(T) -> std::result::Result<U, E>,
    {
        match self {
            Operand::Single(value) => f(value).map(Operand::Single),
            Operand::Group { values, delimiter } => {
                let values = values.into_iter().map(f).collect::<std::result::Result<_, _>>()?;
                Ok(Operand::Group { values, delimiter })
            }
        }
    }
}

impl<T: Serialize> Serialize for Operand<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Operand::Single(value) => value.serialize(serializer),
            Operand::Group { values, .. } => values.serialize(serializer),
        }
    }
}

/// Field, operator and value of an accepted clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause<V> {
    field: String,
    op: Op,
    value: V,
}

impl<V> Clause<V> {
    /// The field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The operator.
    pub fn op(&self) -> Op {
        self.op
    }

    /// The coerced value.
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Consumes the clause, returning its value.
    pub fn into_value(self) -> V {
        self.value
    }
}

/// A validated, typed filter descriptor.
///
/// # Example
///
/// ```
/// use filter_query::{FilterQuery, Op, Operand};
///
/// let query = FilterQuery::string("isbn13", Op::Eq, Operand::Single("9783111108346".into()))
///     .unwrap();
/// assert_eq!(query.field(), "isbn13");
/// assert!(!query.is_multi());
///
/// // Strings have no ordering operators
/// assert!(FilterQuery::string("isbn13", Op::Gt, Operand::Single("1".into())).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum FilterQuery {
    String(Clause<Operand<String>>),
    Boolean(Clause<bool>),
    Number(Clause<Operand<f64>>),
    Date(Clause<Operand<DateTime<Utc>>>),
    Void(Clause<()>),
}

impl FilterQuery {
    /// Builds a string clause.
    pub fn string(field: impl Into<String>, op: Op, value: Operand<String>) -> Result<Self> {
        let field = field.into();
        check_op(&field, op, DeclaredType::String)?;
        Ok(FilterQuery::String(Clause { field, op, value }))
    }

    /// Builds a boolean clause.
    pub fn boolean(field: impl Into<String>, op: Op, value: bool) -> Result<Self> {
        let field = field.into();
        check_op(&field, op, DeclaredType::Boolean)?;
        Ok(FilterQuery::Boolean(Clause { field, op, value }))
    }

    /// Builds a number clause. Values must be finite; range operators take
    /// exactly two.
    pub fn number(field: impl Into<String>, op: Op, value: Operand<f64>) -> Result<Self> {
        let field = field.into();
        check_op(&field, op, DeclaredType::Number)?;
        check_arity(&field, op, value.len())?;
        if let Some(bad) = value.values().iter().find(|n| !n.is_finite()) {
            return Err(FilterError::InvalidValue {
                field,
                value: bad.to_string(),
                expected: DeclaredType::Number.name(),
            });
        }
        Ok(FilterQuery::Number(Clause { field, op, value }))
    }

    /// Builds a date clause. Range operators take exactly two instants.
    pub fn date(field: impl Into<String>, op: Op, value: Operand<DateTime<Utc>>) -> Result<Self> {
        let field = field.into();
        check_op(&field, op, DeclaredType::Date)?;
        check_arity(&field, op, value.len())?;
        Ok(FilterQuery::Date(Clause { field, op, value }))
    }

    /// Builds a null check.
    pub fn void(field: impl Into<String>, op: Op) -> Result<Self> {
        let field = field.into();
        check_op(&field, op, DeclaredType::Void)?;
        Ok(FilterQuery::Void(Clause {
            field,
            op,
            value: (),
        }))
    }

    /// Returns the declared type of this clause.
    pub fn declared_type(&self) -> DeclaredType {
        match self {
            FilterQuery::String(_) => DeclaredType::String,
            FilterQuery::Boolean(_) => DeclaredType::Boolean,
            FilterQuery::Number(_) => DeclaredType::Number,
            FilterQuery::Date(_) => DeclaredType::Date,
            FilterQuery::Void(_) => DeclaredType::Void,
        }
    }

    /// Returns the field name.
    pub fn field(&self) -> &str {
        match self {
            FilterQuery::String(c) => c.field(),
            FilterQuery::Boolean(c) => c.field(),
            FilterQuery::Number(c) => c.field(),
            FilterQuery::Date(c) => c.field(),
            FilterQuery::Void(c) => c.field(),
        }
    }

    /// Returns the operator.
    pub fn op(&self) -> Op {
        match self {
            FilterQuery::String(c) => c.op(),
            FilterQuery::Boolean(c) => c.op(),
            FilterQuery::Number(c) => c.op(),
            FilterQuery::Date(c) => c.op(),
            FilterQuery::Void(c) => c.op(),
        }
    }

    /// Returns the group delimiter, present exactly when the source used a group.
    pub fn group_delimiter(&self) -> Option<GroupDelimiter> {
        match self {
            FilterQuery::String(c) => c.value().group_delimiter(),
            FilterQuery::Number(c) => c.value().group_delimiter(),
            FilterQuery::Date(c) => c.value().group_delimiter(),
            FilterQuery::Boolean(_) | FilterQuery::Void(_) => None,
        }
    }

    /// Returns `true` when the source used a bracketed group.
    pub fn is_multi(&self) -> bool {
        self.group_delimiter().is_some()
    }

    /// Returns the string operand, if this is a string clause.
    pub fn as_strings(&self) -> Option<&Operand<String>> {
        match self {
            FilterQuery::String(c) => Some(c.value()),
            _ => None,
        }
    }

    /// Returns the boolean value, if this is a boolean clause.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FilterQuery::Boolean(c) => Some(*c.value()),
            _ => None,
        }
    }

    /// Returns the number operand, if this is a number clause.
    pub fn as_numbers(&self) -> Option<&Operand<f64>> {
        match self {
            FilterQuery::Number(c) => Some(c.value()),
            _ => None,
        }
    }

    /// Returns the date operand, if this is a date clause.
    pub fn as_dates(&self) -> Option<&Operand<DateTime<Utc>>> {
        match self {
            FilterQuery::Date(c) => Some(c.value()),
            _ => None,
        }
    }
}

pub(crate) fn check_op(field: &str, op: Op, declared: DeclaredType) -> Result<()> {
    if declared.allows(op) {
        Ok(())
    } else {
        Err(FilterError::InvalidOperatorForType {
            field: field.to_string(),
            op: op.as_str(),
            value_type: declared.name(),
        })
    }
}

fn check_arity(field: &str, op: Op, actual: usize) -> Result<()> {
    if op.is_range() && actual != 2 {
        return Err(FilterError::ArityMismatch {
            field: field.to_string(),
            op: op.as_str(),
            expected: 2,
            actual,
        });
    }
    Ok(())
}

impl Serialize for FilterQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let delimiter = self.group_delimiter();
        let len = if delimiter.is_some() { 6 } else { 5 };
        let mut state = serializer.serialize_struct("FilterQuery", len)?;
        state.serialize_field("type", self.declared_type().name())?;
        state.serialize_field("field", self.field())?;
        state.serialize_field("operator", &self.op())?;
        state.serialize_field("isMulti", &delimiter.is_some())?;
        match delimiter {
            Some(delimiter) => state.serialize_field("groupDelimiter", &delimiter)?,
            None => state.skip_field("groupDelimiter")?,
        }
        match self {
            FilterQuery::String(c) => state.serialize_field("value", c.value())?,
            FilterQuery::Boolean(c) => state.serialize_field("value", c.value())?,
            FilterQuery::Number(c) => state.serialize_field("value", c.value())?,
            FilterQuery::Date(c) => state.serialize_field("value", c.value())?,
            FilterQuery::Void(c) => state.serialize_field("value", c.value())?,
        }
        state.end()
    }
}

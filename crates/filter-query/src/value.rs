//! Runtime field values for evaluating filters in memory.
//!
//! The [`Value`] enum is what an accessor returns for a field of a record.
//! It mirrors the declared types: strings, numbers, dates, booleans, and null.

use chrono::{DateTime, Utc};

/// Runtime value for comparison, borrowed from the source record.
///
/// # Example
///
/// ```
/// use filter_query::Value;
///
/// struct Book {
///     isbn13: String,
///     pages: u32,
///     subtitle: Option<String>,
/// }
///
/// fn accessor<'a>(book: &'a Book, field: &str) -> Value<'a> {
///     match field {
///         "isbn13" => Value::String(&book.isbn13),
///         "pages" => book.pages.into(),
///         "subtitle" => book.subtitle.as_deref().into(),
///         _ => Value::Null,
///     }
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    /// String value (borrowed).
    String(&'a str),
    /// Numeric value.
    Number(f64),
    /// Instant in UTC.
    Date(DateTime<Utc>),
    /// Boolean value.
    Bool(bool),
    /// Field missing or null.
    Null,
}

impl<'a> Value<'a> {
    /// Returns `true` if this is a `Null` value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Extracts the string value, if present.
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Value::String(s) => Some(*s),
            _ => None,
        }
    }

    /// Extracts the number value, if present.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Extracts the date value, if present.
    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Extracts the boolean value, if present.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(s: &'a str) -> Self {
        Value::String(s)
    }
}

impl<'a> From<&'a String> for Value<'a> {
    fn from(s: &'a String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value<'_> {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<DateTime<Utc>> for Value<'_> {
    fn from(d: DateTime<Utc>) -> Self {
        Value::Date(d)
    }
}

macro_rules! number_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value<'_> {
                fn from(n: $ty) -> Self {
                    Value::Number(n as f64)
                }
            }
        )*
    };
}

number_from!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl<'a, T: Into<Value<'a>>> From<Option<T>> for Value<'a> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn value_extractors() {
        assert_eq!(Value::String("hello").as_str(), Some("hello"));
        assert_eq!(Value::Number(42.0).as_number(), Some(42.0));
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert!(Value::Null.is_null());

        // Wrong type returns None
        assert_eq!(Value::String("test").as_number(), None);
        assert_eq!(Value::Number(1.0).as_str(), None);
        assert_eq!(Value::Null.as_date(), None);
    }

    #[test]
    fn conversions() {
        assert_eq!(Value::from(7u8), Value::Number(7.0));
        assert_eq!(Value::from(-3i64), Value::Number(-3.0));
        assert_eq!(Value::from(1.5f32), Value::Number(1.5));
        assert_eq!(Value::from("x"), Value::String("x"));
        assert_eq!(Value::from(None::<bool>), Value::Null);
        assert_eq!(Value::from(Some(false)), Value::Bool(false));

        let day = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        assert_eq!(Value::from(day).as_date(), Some(day));
    }
}

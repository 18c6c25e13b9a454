//! Value coercion and validation.
//!
//! [`transform`] turns a [`RawDescriptor`] into a [`FilterQuery`], parsing
//! value text according to the declared type. Operator legality and range
//! arity are enforced by the [`FilterQuery`] constructors.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::declared_type::DeclaredType;
use crate::error::{FilterError, Result};
use crate::filter::{check_op, FilterQuery, Operand};
use crate::tokenizer::{RawDescriptor, RawValue};

/// Coerces a raw descriptor into a typed filter.
pub fn transform(raw: RawDescriptor) -> Result<FilterQuery> {
    let RawDescriptor {
        declared_type,
        field,
        op,
        value,
    } = raw;

    match declared_type {
        DeclaredType::String => FilterQuery::string(field, op, operand(value)),
        DeclaredType::Boolean => {
            check_op(&field, op, declared_type)?;
            let text = single_text(&field, declared_type, value)?;
            let flag = match text.as_str() {
                "true" => true,
                "false" => false,
                _ => return Err(invalid(field, text, declared_type)),
            };
            FilterQuery::boolean(field, op, flag)
        }
        DeclaredType::Number => {
            let numbers = operand(value).try_map(|token| {
                parse_number(&token).ok_or_else(|| invalid(field.clone(), token, declared_type))
            })?;
            FilterQuery::number(field, op, numbers)
        }
        DeclaredType::Date => {
            let dates = operand(value).try_map(|token| {
                parse_date(&token).ok_or_else(|| invalid(field.clone(), token, declared_type))
            })?;
            FilterQuery::date(field, op, dates)
        }
        DeclaredType::Void => {
            check_op(&field, op, declared_type)?;
            let text = single_text(&field, declared_type, value)?;
            match text.as_str() {
                "null" | "undefined" => FilterQuery::void(field, op),
                _ => Err(invalid(field, text, declared_type)),
            }
        }
    }
}

fn operand(value: RawValue) -> Operand<String> {
    match value {
        RawValue::Scalar(text) => Operand::Single(text),
        RawValue::Group {
            elements,
            delimiter,
        } => Operand::Group {
            values: elements,
            delimiter,
        },
    }
}

fn single_text(field: &str, declared_type: DeclaredType, value: RawValue) -> Result<String> {
    match value {
        RawValue::Scalar(text) => Ok(text),
        RawValue::Group { .. } => Err(FilterError::GroupNotAllowed {
            field: field.to_string(),
            value_type: declared_type.name(),
        }),
    }
}

fn invalid(field: String, value: String, declared_type: DeclaredType) -> FilterError {
    FilterError::InvalidValue {
        field,
        value,
        expected: declared_type.name(),
    }
}

/// Parses a finite floating-point number. No whitespace is trimmed.
pub(crate) fn parse_number(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parses a calendar date or instant.
///
/// Accepts RFC 3339 (`2024-04-01T10:00:00+02:00`), a naive date-time taken
/// as UTC (`2024-04-01T10:00:00`, optional fraction, `T` or space), and a
/// plain date at midnight UTC (`2024-04-01`).
pub(crate) fn parse_date(token: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(token) {
        return Some(instant.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(token, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(token, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::GroupDelimiter;
    use crate::op::Op;
    use chrono::TimeZone;

    fn descriptor(declared_type: DeclaredType, op: Op, value: RawValue) -> RawDescriptor {
        RawDescriptor {
            declared_type,
            field: "f".into(),
            op,
            value,
        }
    }

    fn scalar(text: &str) -> RawValue {
        RawValue::Scalar(text.into())
    }

    fn comma(elements: &[&str]) -> RawValue {
        RawValue::Group {
            elements: elements.iter().map(|e| e.to_string()).collect(),
            delimiter: GroupDelimiter::Comma,
        }
    }

    #[test]
    fn strings_are_untouched() {
        let query = transform(descriptor(DeclaredType::String, Op::Eq, scalar(" a b "))).unwrap();
        assert_eq!(query.as_strings(), Some(&Operand::Single(" a b ".to_string())));

        let query =
            transform(descriptor(DeclaredType::String, Op::In, comma(&["x", " y"]))).unwrap();
        assert_eq!(
            query.as_strings().map(Operand::values),
            Some(&["x".to_string(), " y".to_string()][..])
        );
    }

    #[test]
    fn string_operator_legality() {
        for op in [Op::Gt, Op::Range, Op::Is] {
            let err = transform(descriptor(DeclaredType::String, op, scalar("x"))).unwrap_err();
            assert!(err.is_type_mismatch(), "{op} should be rejected");
        }
        assert!(transform(descriptor(DeclaredType::String, Op::NotMatches, scalar("^a"))).is_ok());
    }

    #[test]
    fn booleans_are_exact_literals() {
        let query = transform(descriptor(DeclaredType::Boolean, Op::Eq, scalar("true"))).unwrap();
        assert_eq!(query.as_bool(), Some(true));
        let query = transform(descriptor(DeclaredType::Boolean, Op::Ne, scalar("false"))).unwrap();
        assert_eq!(query.as_bool(), Some(false));

        for text in ["yes", "True", "1", ""] {
            let err = transform(descriptor(DeclaredType::Boolean, Op::Eq, scalar(text))).unwrap_err();
            assert!(err.is_type_mismatch());
        }
        let err = transform(descriptor(DeclaredType::Boolean, Op::Gt, scalar("true"))).unwrap_err();
        assert!(matches!(err, FilterError::InvalidOperatorForType { .. }));
        let err =
            transform(descriptor(DeclaredType::Boolean, Op::Eq, comma(&["true"]))).unwrap_err();
        assert!(matches!(err, FilterError::GroupNotAllowed { .. }));
    }

    #[test]
    fn numbers_parse_per_element() {
        let query = transform(descriptor(DeclaredType::Number, Op::Gte, scalar("-2.5"))).unwrap();
        assert_eq!(query.as_numbers(), Some(&Operand::Single(-2.5)));

        let query =
            transform(descriptor(DeclaredType::Number, Op::In, comma(&["1", "2", "3e2"]))).unwrap();
        assert_eq!(
            query.as_numbers().map(Operand::values),
            Some(&[1.0, 2.0, 300.0][..])
        );

        for text in ["abc", "", " 1", "NaN", "inf"] {
            let err = transform(descriptor(DeclaredType::Number, Op::Eq, scalar(text))).unwrap_err();
            assert!(err.is_type_mismatch(), "'{text}' should be rejected");
        }
    }

    #[test]
    fn number_range_arity() {
        assert!(transform(descriptor(DeclaredType::Number, Op::Range, comma(&["1", "5"]))).is_ok());
        let err = transform(descriptor(DeclaredType::Number, Op::NotRange, comma(&["1"])))
            .unwrap_err();
        assert!(matches!(
            err,
            FilterError::ArityMismatch {
                expected: 2,
                actual: 1,
                ..
            }
        ));
        let err = transform(descriptor(DeclaredType::Number, Op::Matches, scalar("1"))).unwrap_err();
        assert!(matches!(err, FilterError::InvalidOperatorForType { .. }));
    }

    #[test]
    fn dates_keep_order() {
        let query = transform(descriptor(
            DeclaredType::Date,
            Op::Range,
            comma(&["2024-04-30", "2024-04-01"]),
        ))
        .unwrap();
        let dates = query.as_dates().unwrap().values();
        assert_eq!(dates[0], Utc.with_ymd_and_hms(2024, 4, 30, 0, 0, 0).unwrap());
        assert_eq!(dates[1], Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap());

        let err = transform(descriptor(DeclaredType::Date, Op::Eq, scalar("april"))).unwrap_err();
        assert!(err.is_type_mismatch());
    }

    #[test]
    fn date_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 4, 1, 8, 30, 0).unwrap();
        assert_eq!(parse_date("2024-04-01T10:30:00+02:00"), Some(expected));
        assert_eq!(parse_date("2024-04-01T08:30:00Z"), Some(expected));
        assert_eq!(parse_date("2024-04-01T08:30:00"), Some(expected));
        assert_eq!(parse_date("2024-04-01 08:30:00"), Some(expected));
        assert_eq!(parse_date("2024-02-30"), None);
        assert_eq!(parse_date("01/04/2024"), None);
    }

    #[test]
    fn void_literals() {
        for text in ["null", "undefined"] {
            let query = transform(descriptor(DeclaredType::Void, Op::Is, scalar(text))).unwrap();
            assert_eq!(query, FilterQuery::void("f", Op::Is).unwrap());
        }
        let err = transform(descriptor(DeclaredType::Void, Op::IsNot, scalar("nil"))).unwrap_err();
        assert!(err.is_type_mismatch());
        let err = transform(descriptor(DeclaredType::Void, Op::Eq, scalar("null"))).unwrap_err();
        assert!(matches!(err, FilterError::InvalidOperatorForType { .. }));
    }
}

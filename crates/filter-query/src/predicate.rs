//! Compiled predicates for in-memory evaluation.
//!
//! A [`Predicate`] wraps a [`FilterQuery`] with whatever it needs at match
//! time (compiled patterns for `~` and `!~`) and decides whether a single
//! field [`Value`] satisfies it.
//!
//! Group semantics follow the closing bracket: per-element results are
//! combined with AND for `[a,b]` and with OR for `(a|b)`. Set and range
//! operators use the group as a whole.

use std::cmp::Ordering;

use regex::Regex;

use crate::error::Result;
use crate::filter::{Clause, FilterQuery, Join, Operand};
use crate::op::Op;
use crate::value::Value;

/// A filter ready to be evaluated against field values.
#[derive(Debug, Clone)]
pub struct Predicate {
    query: FilterQuery,
    patterns: Vec<Regex>,
}

impl Predicate {
    /// Compiles a filter. Fails only on an invalid `~`/`!~` pattern.
    pub fn compile(query: FilterQuery) -> Result<Self> {
        let patterns = match &query {
            FilterQuery::String(clause) if matches!(clause.op(), Op::Matches | Op::NotMatches) => {
                clause
                    .value()
                    .values()
                    .iter()
                    .map(|pattern| Regex::new(pattern))
                    .collect::<std::result::Result<Vec<_>, _>>()?
            }
            _ => Vec::new(),
        };
        Ok(Predicate { query, patterns })
    }

    /// The underlying filter.
    pub fn query(&self) -> &FilterQuery {
        &self.query
    }

    /// The field this predicate reads.
    pub fn field(&self) -> &str {
        self.query.field()
    }

    /// Evaluates this predicate against a field value.
    ///
    /// A null value only satisfies `!!`, and a value of the wrong type never
    /// matches.
    pub fn matches(&self, value: &Value<'_>) -> bool {
        match (&self.query, value) {
            (FilterQuery::Void(clause), value) => match clause.op() {
                op @ (Op::Is | Op::IsNot) => value.is_null() != op.is_negated(),
                _ => false,
            },
            (FilterQuery::String(clause), Value::String(s)) => self.match_string(clause, s),
            (FilterQuery::Boolean(clause), Value::Bool(b)) => match clause.op() {
                op @ (Op::Eq | Op::Ne) => (b == clause.value()) != op.is_negated(),
                _ => false,
            },
            (FilterQuery::Number(clause), Value::Number(n)) => {
                compare(clause.op(), clause.value(), |bound| n.partial_cmp(bound))
            }
            (FilterQuery::Date(clause), Value::Date(d)) => {
                compare(clause.op(), clause.value(), |bound| Some(d.cmp(bound)))
            }
            // Null or type mismatch
            _ => false,
        }
    }

    fn match_string(&self, clause: &Clause<Operand<String>>, field: &str) -> bool {
        let operand = clause.value();
        let negated = clause.op().is_negated();
        match clause.op() {
            Op::Eq | Op::Ne => combine(operand, |v| (field == v) != negated),
            Op::In | Op::NotIn => operand.values().iter().any(|v| v == field) != negated,
            Op::Matches | Op::NotMatches => {
                combine_all(join(operand), &self.patterns, |re| re.is_match(field) != negated)
            }
            _ => false,
        }
    }
}

fn join<T>(operand: &Operand<T>) -> Join {
    operand
        .group_delimiter()
        .map_or(Join::All, |delimiter| delimiter.join())
}

fn combine_all<T>(join: Join, items: &[T], test: impl Fn(&T) -> bool) -> bool {
    match join {
        Join::All => items.iter().all(test),
        Join::Any => items.iter().any(test),
    }
}

fn combine<T>(operand: &Operand<T>, test: impl Fn(&T) -> bool) -> bool {
    combine_all(join(operand), operand.values(), test)
}

/// Evaluates an ordered comparison. `cmp` compares the field value against
/// a clause value; `None` (NaN) never matches.
fn compare<T>(op: Op, operand: &Operand<T>, cmp: impl Fn(&T) -> Option<Ordering>) -> bool {
    let values = operand.values();
    match op {
        Op::Range => match values {
            [lower, upper] => {
                cmp(lower) == Some(Ordering::Greater) && cmp(upper) == Some(Ordering::Less)
            }
            _ => false,
        },
        Op::NotRange => match values {
            [lower, upper] => {
                cmp(lower) == Some(Ordering::Less) || cmp(upper) == Some(Ordering::Greater)
            }
            _ => false,
        },
        Op::In => values.iter().any(|v| cmp(v) == Some(Ordering::Equal)),
        Op::NotIn => values
            .iter()
            .all(|v| matches!(cmp(v), Some(ordering) if ordering != Ordering::Equal)),
        _ => combine(operand, |v| cmp(v).is_some_and(|ordering| op.eval_ordering(ordering))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::GroupDelimiter;
    use chrono::{TimeZone, Utc};

    fn group<T>(values: Vec<T>, delimiter: GroupDelimiter) -> Operand<T> {
        Operand::Group { values, delimiter }
    }

    fn strings(values: &[&str], delimiter: GroupDelimiter) -> Operand<String> {
        group(values.iter().map(|v| v.to_string()).collect(), delimiter)
    }

    fn predicate(query: Result<FilterQuery>) -> Predicate {
        Predicate::compile(query.unwrap()).unwrap()
    }

    #[test]
    fn string_equality() {
        let p = predicate(FilterQuery::string("name", Op::Eq, Operand::Single("hello".into())));
        assert!(p.matches(&Value::String("hello")));
        assert!(!p.matches(&Value::String("Hello"))); // case sensitive

        let p = predicate(FilterQuery::string("name", Op::Ne, Operand::Single("hello".into())));
        assert!(p.matches(&Value::String("world")));
        assert!(!p.matches(&Value::String("hello")));
    }

    #[test]
    fn group_delimiter_decides_join() {
        // Comma: field must differ from every element
        let p = predicate(FilterQuery::string(
            "marking",
            Op::Ne,
            strings(&["pencil", "stickers"], GroupDelimiter::Comma),
        ));
        assert!(p.matches(&Value::String("clean")));
        assert!(!p.matches(&Value::String("pencil")));

        // Pipe: one matching element is enough
        let p = predicate(FilterQuery::string(
            "marking",
            Op::Eq,
            strings(&["pencil", "stickers"], GroupDelimiter::Pipe),
        ));
        assert!(p.matches(&Value::String("stickers")));
        assert!(!p.matches(&Value::String("clean")));
    }

    #[test]
    fn string_membership() {
        let p = predicate(FilterQuery::string(
            "tag",
            Op::In,
            strings(&["a", "b"], GroupDelimiter::Comma),
        ));
        assert!(p.matches(&Value::String("b")));
        assert!(!p.matches(&Value::String("c")));

        let p = predicate(FilterQuery::string(
            "tag",
            Op::NotIn,
            strings(&["a", "b"], GroupDelimiter::Comma),
        ));
        assert!(p.matches(&Value::String("c")));
        assert!(!p.matches(&Value::String("a")));
    }

    #[test]
    fn string_patterns() {
        let p = predicate(FilterQuery::string(
            "isbn",
            Op::Matches,
            Operand::Single(r"^978\d+$".into()),
        ));
        assert!(p.matches(&Value::String("9783111108346")));
        assert!(!p.matches(&Value::String("0-306-40615-2")));

        let p = predicate(FilterQuery::string(
            "title",
            Op::NotMatches,
            strings(&["^The", "draft"], GroupDelimiter::Comma),
        ));
        assert!(p.matches(&Value::String("A Tale")));
        assert!(!p.matches(&Value::String("The Tale")));
    }

    #[test]
    fn invalid_pattern_fails_compile() {
        let query = FilterQuery::string("title", Op::Matches, Operand::Single("(".into())).unwrap();
        let err = Predicate::compile(query).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Pattern);
    }

    #[test]
    fn number_comparisons() {
        let p = predicate(FilterQuery::number("count", Op::Gt, Operand::Single(10.0)));
        assert!(p.matches(&Value::Number(11.0)));
        assert!(!p.matches(&Value::Number(10.0)));

        let p = predicate(FilterQuery::number("count", Op::Lte, Operand::Single(10.0)));
        assert!(p.matches(&Value::Number(10.0)));
        assert!(!p.matches(&Value::Number(10.5)));
        assert!(!p.matches(&Value::Number(f64::NAN)));
    }

    #[test]
    fn range_bounds_are_exclusive() {
        let p = predicate(FilterQuery::number(
            "price",
            Op::Range,
            group(vec![10.0, 20.0], GroupDelimiter::Comma),
        ));
        assert!(p.matches(&Value::Number(15.0)));
        assert!(!p.matches(&Value::Number(10.0)));
        assert!(!p.matches(&Value::Number(20.0)));

        let p = predicate(FilterQuery::number(
            "price",
            Op::NotRange,
            group(vec![10.0, 20.0], GroupDelimiter::Comma),
        ));
        assert!(p.matches(&Value::Number(5.0)));
        assert!(p.matches(&Value::Number(25.0)));
        assert!(!p.matches(&Value::Number(10.0)));
        assert!(!p.matches(&Value::Number(15.0)));
    }

    #[test]
    fn number_membership() {
        let p = predicate(FilterQuery::number(
            "id",
            Op::NotIn,
            group(vec![1.0, 2.0], GroupDelimiter::Pipe),
        ));
        assert!(p.matches(&Value::Number(3.0)));
        assert!(!p.matches(&Value::Number(2.0)));
    }

    #[test]
    fn date_range() {
        let day = |d| Utc.with_ymd_and_hms(2024, 4, d, 0, 0, 0).unwrap();
        let p = predicate(FilterQuery::date(
            "posted",
            Op::Range,
            group(vec![day(1), day(30)], GroupDelimiter::Comma),
        ));
        assert!(p.matches(&Value::Date(day(15))));
        assert!(!p.matches(&Value::Date(day(30))));
    }

    #[test]
    fn booleans() {
        let p = predicate(FilterQuery::boolean("admin", Op::Eq, true));
        assert!(p.matches(&Value::Bool(true)));
        assert!(!p.matches(&Value::Bool(false)));

        let p = predicate(FilterQuery::boolean("admin", Op::Ne, true));
        assert!(p.matches(&Value::Bool(false)));
    }

    #[test]
    fn null_checks() {
        let p = predicate(FilterQuery::void("deleted", Op::Is));
        assert!(p.matches(&Value::Null));
        assert!(!p.matches(&Value::Bool(false)));

        let p = predicate(FilterQuery::void("deleted", Op::IsNot));
        assert!(p.matches(&Value::String("")));
        assert!(!p.matches(&Value::Null));
    }

    #[test]
    fn null_and_mismatch_never_match() {
        let p = predicate(FilterQuery::string("name", Op::Ne, Operand::Single("x".into())));
        assert!(!p.matches(&Value::Null));
        assert!(!p.matches(&Value::Number(1.0)));

        let p = predicate(FilterQuery::number("count", Op::NotIn, Operand::Single(1.0)));
        assert!(!p.matches(&Value::Null));
    }
}

//! Field access for records evaluated by a [`Matcher`](crate::Matcher).

use crate::value::Value;

/// Trait for types whose fields can be read by name for filtering.
///
/// # Example
///
/// ```
/// use filter_query::{Filterable, ExtractOptions, Matcher, Value};
///
/// struct User {
///     name: String,
///     admin: bool,
/// }
///
/// impl Filterable for User {
///     fn filter_value(&self, field: &str) -> Value<'_> {
///         match field {
///             "name" => Value::String(&self.name),
///             "admin" => Value::Bool(self.admin),
///             _ => Value::Null,
///         }
///     }
/// }
///
/// let users = vec![
///     User { name: "ada".into(), admin: true },
///     User { name: "bob".into(), admin: false },
/// ];
/// let admins = Matcher::parse("b:admin:=:true", &ExtractOptions::default()).unwrap();
/// assert_eq!(admins.count(&users, User::accessor), 1);
/// ```
pub trait Filterable {
    /// Returns the value of a field, or [`Value::Null`] if the field does
    /// not exist.
    fn filter_value(&self, field: &str) -> Value<'_>;

    /// Returns an accessor function suitable for [`Matcher`](crate::Matcher) methods.
    fn accessor<'a>(item: &'a Self, field: &str) -> Value<'a>
    where
        Self: Sized,
    {
        item.filter_value(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Item {
        label: String,
        count: i32,
    }

    impl Filterable for Item {
        fn filter_value(&self, field: &str) -> Value<'_> {
            match field {
                "label" => Value::String(&self.label),
                "count" => self.count.into(),
                _ => Value::Null,
            }
        }
    }

    #[test]
    fn manual_impl() {
        let item = Item {
            label: "test".to_string(),
            count: 42,
        };

        assert_eq!(item.filter_value("label"), Value::String("test"));
        assert_eq!(item.filter_value("count"), Value::Number(42.0));
        assert_eq!(item.filter_value("unknown"), Value::Null);
        assert_eq!(Item::accessor(&item, "label"), Value::String("test"));
    }
}

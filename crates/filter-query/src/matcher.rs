//! Evaluating a parsed filter list against collections.

use crate::error::Result;
use crate::filter::FilterQuery;
use crate::options::ExtractOptions;
use crate::predicate::Predicate;
use crate::value::Value;

/// A list of compiled predicates that must all hold.
///
/// Built from the output of [`extract`](crate::extract), or straight from a
/// query string with [`Matcher::parse`]. An empty matcher matches everything.
///
/// # Example
///
/// ```
/// use filter_query::{ExtractOptions, Matcher, Value};
///
/// struct Book {
///     isbn13: &'static str,
///     price: f64,
/// }
///
/// fn accessor<'a>(book: &'a Book, field: &str) -> Value<'a> {
///     match field {
///         "isbn13" => Value::String(book.isbn13),
///         "price" => Value::Number(book.price),
///         _ => Value::Null,
///     }
/// }
///
/// let books = vec![
///     Book { isbn13: "9783111108346", price: 12.5 },
///     Book { isbn13: "9780306406157", price: 40.0 },
/// ];
///
/// let matcher = Matcher::parse("n:price:><:[10,20]", &ExtractOptions::default()).unwrap();
/// let cheap = matcher.filter(&books, accessor);
/// assert_eq!(cheap.len(), 1);
/// assert_eq!(cheap[0].isbn13, "9783111108346");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    predicates: Vec<Predicate>,
}

impl Matcher {
    /// Compiles a list of filters.
    pub fn new<I>(queries: I) -> Result<Self>
    where
        I: IntoIterator<Item = FilterQuery>,
    {
        let predicates = queries
            .into_iter()
            .map(Predicate::compile)
            .collect::<Result<Vec<_>>>()?;
        Ok(Matcher { predicates })
    }

    /// Extracts and compiles a query string.
    pub fn parse(input: &str, options: &ExtractOptions) -> Result<Self> {
        Matcher::new(crate::extract(input, options)?)
    }

    /// Returns the compiled predicates in input order.
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Returns `true` if there are no predicates (matches everything).
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Tests if a single item matches every predicate.
    ///
    /// The accessor function extracts field values from the item.
    pub fn matches<T, F>(&self, item: &T, accessor: F) -> bool
    where
        for<'a> F: Fn(&'a T, &str) -> Value<'a>,
    {
        self.predicates
            .iter()
            .all(|predicate| predicate.matches(&accessor(item, predicate.field())))
    }

    /// Filters a slice, returning references to matching items in order.
    pub fn filter<'a, T, F>(&self, items: &'a [T], accessor: F) -> Vec<&'a T>
    where
        for<'b> F: Fn(&'b T, &str) -> Value<'b>,
    {
        items
            .iter()
            .filter(|item| self.matches(*item, &accessor))
            .collect()
    }

    /// Filters and clones matching items.
    pub fn filter_cloned<T, F>(&self, items: &[T], accessor: F) -> Vec<T>
    where
        T: Clone,
        for<'a> F: Fn(&'a T, &str) -> Value<'a>,
    {
        self.filter(items, accessor).into_iter().cloned().collect()
    }

    /// Filters a vector in place, keeping only matching items.
    pub fn filter_mut<T, F>(&self, items: &mut Vec<T>, accessor: F)
    where
        for<'a> F: Fn(&'a T, &str) -> Value<'a>,
    {
        items.retain(|item| self.matches(item, &accessor));
    }

    /// Counts the number of matching items.
    pub fn count<T, F>(&self, items: &[T], accessor: F) -> usize
    where
        for<'a> F: Fn(&'a T, &str) -> Value<'a>,
    {
        items
            .iter()
            .filter(|item| self.matches(*item, &accessor))
            .count()
    }

    /// Returns `true` if any item matches.
    pub fn any<T, F>(&self, items: &[T], accessor: F) -> bool
    where
        for<'a> F: Fn(&'a T, &str) -> Value<'a>,
    {
        items.iter().any(|item| self.matches(item, &accessor))
    }

    /// Returns `true` if all items match.
    pub fn all<T, F>(&self, items: &[T], accessor: F) -> bool
    where
        for<'a> F: Fn(&'a T, &str) -> Value<'a>,
    {
        items.iter().all(|item| self.matches(item, &accessor))
    }

    /// Finds the first matching item.
    pub fn find<'a, T, F>(&self, items: &'a [T], accessor: F) -> Option<&'a T>
    where
        for<'b> F: Fn(&'b T, &str) -> Value<'b>,
    {
        items.iter().find(|item| self.matches(*item, &accessor))
    }

    /// Finds the first matching item and returns its index.
    pub fn position<T, F>(&self, items: &[T], accessor: F) -> Option<usize>
    where
        for<'a> F: Fn(&'a T, &str) -> Value<'a>,
    {
        items.iter().position(|item| self.matches(item, &accessor))
    }
}

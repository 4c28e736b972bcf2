//! Search sessions.
//!
//! A [`Session`] is opened over a source with [`search`], [`search_all`] or
//! [`search_translated`]. Fluent calls consume the session and return the
//! updated one; nothing is evaluated until one of the consuming methods
//! ([`iter`](Session::iter), [`to_vec`](Session::to_vec),
//! [`count`](Session::count), [`any`](Session::any),
//! [`first`](Session::first)) or a projection runs.
//!
//! # Example
//!
//! ```
//! use standout_search::prelude::*;
//! use standout_search::{Number, Value};
//!
//! struct City {
//!     name: String,
//!     population: u64,
//! }
//!
//! impl City {
//!     const NAME: Field<City> = Field::new("name", FieldKind::String);
//!     const POPULATION: Field<City> = Field::new("population", FieldKind::Number);
//! }
//!
//! impl Searchable for City {
//!     fn field_value(&self, field: &str) -> Value<'_> {
//!         match field {
//!             "name" => Value::String(&self.name),
//!             "population" => Value::Number(Number::from(self.population)),
//!             _ => Value::None,
//!         }
//!     }
//!
//!     fn fields() -> Vec<Field<Self>> {
//!         vec![City::NAME, City::POPULATION]
//!     }
//! }
//!
//! let cities = vec![
//!     City { name: "Lisbon".into(), population: 545_000 },
//!     City { name: "Lyon".into(), population: 522_000 },
//!     City { name: "Porto".into(), population: 232_000 },
//! ];
//!
//! let found = search(&cities, &[City::NAME, City::POPULATION])?
//!     .starting_with(["l"])
//!     .greater_than(530_000)
//!     .to_vec()?;
//! assert_eq!(found.len(), 1);
//! assert_eq!(found[0].name, "Lisbon");
//! # Ok::<(), standout_search::SearchError>(())
//! ```

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::binding::Binding;
use crate::compile::CompiledPredicate;
use crate::criteria::{Criteria, Filter};
use crate::distance::DistanceRequest;
use crate::error::{Result, SearchError};
use crate::field::{fields_of_kind, validate_fields, Field, FieldKind};
use crate::options::SearchOptions;
use crate::ordering::{compare_by_orderings, Dir, OrderBy};
use crate::predicate::Predicate;
use crate::ranked::{rank, Ranked};
use crate::source::{Evaluator, Matches, Translator};
use crate::traits::Searchable;

/// Opens a session over an in-memory slice, searching `fields`.
pub fn search<'s, T: Searchable>(source: &'s [T], fields: &[Field<T>]) -> Result<Session<'s, T>> {
    Session::new(Evaluator::InMemory(source), fields)
}

/// Opens a session over an in-memory slice, searching every registered
/// field of `kind`.
pub fn search_all<'s, T: Searchable>(source: &'s [T], kind: FieldKind) -> Result<Session<'s, T>> {
    Session::new(Evaluator::InMemory(source), &fields_of_kind::<T>(kind))
}

/// Opens a session whose predicate is executed by `translator`.
pub fn search_translated<'s, T: Searchable>(
    translator: &'s dyn Translator<T>,
    fields: &[Field<T>],
) -> Result<Session<'s, T>> {
    Session::new(Evaluator::Translated(translator), fields)
}

/// A lazily evaluated search over records of type `T`.
pub struct Session<'s, T> {
    evaluator: Evaluator<'s, T>,
    criteria: Criteria<T>,
    orderings: Vec<OrderBy>,
    limit: Option<usize>,
    offset: Option<usize>,
    compiled: OnceCell<Arc<CompiledPredicate>>,
}

impl<'s, T: Searchable> Session<'s, T> {
    /// Opens a session over any evaluator.
    ///
    /// Fails when a field is not registered on `T`. With no fields every
    /// filter call is a no-op.
    pub fn new(evaluator: Evaluator<'s, T>, fields: &[Field<T>]) -> Result<Self> {
        let mut criteria = Criteria::detached(Binding::ROOT, SearchOptions::default());
        criteria.select(fields)?;
        Ok(Session {
            evaluator,
            criteria,
            orderings: Vec::new(),
            limit: None,
            offset: None,
            compiled: OnceCell::new(),
        })
    }

    /// Replaces the options applied to subsequent filter calls.
    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.criteria.set_options(options);
        self
    }

    /// Returns the accumulated predicate.
    pub fn predicate(&self) -> &Predicate {
        self.criteria.predicate()
    }

    /// Adds a sort key. Earlier keys take precedence.
    pub fn order_by(mut self, field: &Field<T>, dir: Dir) -> Result<Self> {
        validate_fields(std::slice::from_ref(field))?;
        self.orderings.push(OrderBy::new(field.name(), dir));
        Ok(self)
    }

    /// Caps the number of results.
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Skips the first `n` results.
    pub fn offset(mut self, n: usize) -> Self {
        self.offset = Some(n);
        self
    }

    /// Iterates the matching records.
    ///
    /// Without sort keys, in-memory matches are produced lazily in source
    /// order. With sort keys the matches are collected and stably sorted
    /// first. Offset and limit apply last.
    pub fn iter(&self) -> Result<Matches<'s, T>> {
        let matches = self.evaluator.run(self.criteria.predicate(), &self.compiled)?;
        let matches: Matches<'s, T> = if self.orderings.is_empty() {
            matches
        } else {
            let mut sorted: Vec<&'s T> = matches.collect();
            sorted.sort_by(|a, b| compare_by_orderings(*a, *b, &self.orderings));
            Box::new(sorted.into_iter())
        };
        let matches = matches.skip(self.offset.unwrap_or(0));
        Ok(match self.limit {
            Some(n) => Box::new(matches.take(n)),
            None => Box::new(matches),
        })
    }

    /// Collects the matching records.
    pub fn to_vec(&self) -> Result<Vec<&'s T>> {
        Ok(self.iter()?.collect())
    }

    /// Counts the matching records.
    pub fn count(&self) -> Result<usize> {
        Ok(self.iter()?.count())
    }

    /// Returns `true` if any record matches.
    pub fn any(&self) -> Result<bool> {
        Ok(self.iter()?.next().is_some())
    }

    /// Returns the first matching record.
    pub fn first(&self) -> Result<Option<&'s T>> {
        Ok(self.iter()?.next())
    }

    /// Scores every match by how often the literal text terms of this
    /// session occur in the fields they were searched in. Each term counts
    /// under the case mode of the call that searched for it.
    ///
    /// Fails with [`SearchError::IncompleteRequest`] when no literal text
    /// filter has been applied.
    pub fn to_ranked(&self) -> Result<Vec<Ranked<'s, T>>> {
        let history = self.criteria.history();
        if history.is_empty() {
            return Err(SearchError::IncompleteRequest(
                "ranking needs at least one text search term",
            ));
        }
        Ok(rank(self.iter()?, history))
    }

    /// Starts an edit-distance projection of `field` over the matches.
    ///
    /// Fails when `field` is not a registered string field.
    pub fn levenshtein_distance_of(self, field: &Field<T>) -> Result<DistanceRequest<'s, T>> {
        DistanceRequest::new(self, field)
    }
}

impl<'s, T: Searchable> Filter for Session<'s, T> {
    type Record = T;

    fn criteria(&self) -> &Criteria<T> {
        &self.criteria
    }

    fn criteria_mut(&mut self) -> &mut Criteria<T> {
        self.compiled = OnceCell::new();
        &mut self.criteria
    }
}

impl<T> Clone for Session<'_, T> {
    fn clone(&self) -> Self {
        Session {
            evaluator: self.evaluator,
            criteria: self.criteria.clone(),
            orderings: self.orderings.clone(),
            limit: self.limit,
            offset: self.offset,
            compiled: self.compiled.clone(),
        }
    }
}

impl<T> fmt::Debug for Session<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("evaluator", &self.evaluator)
            .field("criteria", &self.criteria)
            .field("orderings", &self.orderings)
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CaseSensitivity;
    use crate::value::{Number, Value};

    #[derive(Debug, PartialEq)]
    struct Book {
        title: &'static str,
        pages: u32,
    }

    impl Book {
        const TITLE: Field<Book> = Field::new("title", FieldKind::String);
        const PAGES: Field<Book> = Field::new("pages", FieldKind::Number);
    }

    impl Searchable for Book {
        fn field_value(&self, field: &str) -> Value<'_> {
            match field {
                "title" => Value::String(self.title),
                "pages" => Value::Number(Number::from(self.pages)),
                _ => Value::None,
            }
        }

        fn fields() -> Vec<Field<Self>> {
            vec![Book::TITLE, Book::PAGES]
        }
    }

    fn shelf() -> Vec<Book> {
        vec![
            Book {
                title: "Dune",
                pages: 412,
            },
            Book {
                title: "Dune Messiah",
                pages: 256,
            },
            Book {
                title: "Emma",
                pages: 474,
            },
            Book {
                title: "Beloved",
                pages: 324,
            },
        ]
    }

    #[test]
    fn empty_session_matches_everything() {
        let books = shelf();
        assert_eq!(search(&books, &[Book::TITLE]).unwrap().count().unwrap(), 4);
    }

    #[test]
    fn building_does_not_touch_the_source() {
        let books = shelf();
        let session = search(&books, &[Book::TITLE]).unwrap().containing(["dune"]);
        assert_eq!(books.len(), 4);
        assert_eq!(session.count().unwrap(), 2);
    }

    #[test]
    fn order_limit_offset() {
        let books = shelf();
        let titles: Vec<_> = search(&books, &[Book::PAGES])
            .unwrap()
            .greater_than(300)
            .order_by(&Book::PAGES, Dir::Desc)
            .unwrap()
            .offset(1)
            .limit(1)
            .iter()
            .unwrap()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, vec!["Dune"]);
    }

    #[test]
    fn order_by_rejects_unknown_field() {
        let books = shelf();
        let bogus: Field<Book> = Field::new("author", FieldKind::String);
        assert!(matches!(
            search(&books, &[]).unwrap().order_by(&bogus, Dir::Asc),
            Err(SearchError::InvalidArgument(_))
        ));
    }

    #[test]
    fn compiled_form_is_reused_and_reset() {
        let books = shelf();
        let session = search(&books, &[Book::TITLE]).unwrap().containing(["e"]);
        assert_eq!(session.count().unwrap(), 4);
        assert!(session.compiled.get().is_some());
        let first = Arc::clone(session.compiled.get().unwrap());
        assert_eq!(session.count().unwrap(), 4);
        assert!(Arc::ptr_eq(&first, session.compiled.get().unwrap()));

        let narrowed = session.ending_with(["a"]);
        assert!(narrowed.compiled.get().is_none());
        assert_eq!(narrowed.count().unwrap(), 1);
    }

    #[test]
    fn clones_branch_independently() {
        let books = shelf();
        let base = search(&books, &[Book::TITLE]).unwrap().starting_with(["d"]);
        let long = base.clone().containing(["messiah"]);
        assert_eq!(base.count().unwrap(), 2);
        assert_eq!(long.count().unwrap(), 1);
    }

    #[test]
    fn first_and_any() {
        let books = shelf();
        let session = search(&books, &[Book::TITLE])
            .unwrap()
            .set_comparison_mode(CaseSensitivity::Sensitive)
            .containing(["Be"]);
        assert_eq!(session.first().unwrap().map(|b| b.title), Some("Beloved"));
        assert!(!search(&books, &[Book::TITLE])
            .unwrap()
            .equal_to(["Ulysses"])
            .any()
            .unwrap());
    }

    #[test]
    fn search_all_selects_registered_kind() {
        let books = shelf();
        let session = search_all(&books, FieldKind::Number).unwrap().less_than(300);
        assert_eq!(session.to_vec().unwrap(), vec![&books[1]]);
    }

    #[test]
    fn ranking_requires_text_terms() {
        let books = shelf();
        let session = search(&books, &[Book::PAGES]).unwrap().greater_than(1);
        assert!(matches!(
            session.to_ranked(),
            Err(SearchError::IncompleteRequest(_))
        ));
    }
}

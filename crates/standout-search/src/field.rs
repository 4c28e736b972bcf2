//! Field selectors and relations.
//!
//! A [`Field<T>`] names one searchable field of record type `T` together
//! with its [`FieldKind`]. The value itself is produced by the record's
//! [`Searchable`] implementation, so a selector carries an identity that can
//! be compared, serialized and rebound onto a binding slot.

use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};
use crate::traits::Searchable;

/// The kind of value a field produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Text, searchable with the string operators.
    String,
    /// Numeric value, ordered.
    Number,
    /// Point in time, ordered.
    Timestamp,
    /// Enum discriminant, opaque.
    Enum,
    /// Boolean, opaque.
    Bool,
}

impl FieldKind {
    /// Returns `true` for kinds with a meaningful ordering (numbers and timestamps).
    pub fn is_ordered(self) -> bool {
        matches!(self, FieldKind::Number | FieldKind::Timestamp)
    }

    /// Returns the display name of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Timestamp => "timestamp",
            FieldKind::Enum => "enum",
            FieldKind::Bool => "bool",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed selector for one field of record type `T`.
///
/// Usually generated as an associated constant by `#[derive(Searchable)]`
/// (`Person::NAME`), but can be built by hand for manual implementations:
///
/// ```
/// use standout_search::{Field, FieldKind};
///
/// struct Person;
///
/// const NAME: Field<Person> = Field::new("name", FieldKind::String);
/// assert_eq!(NAME.name(), "name");
/// ```
pub struct Field<T> {
    name: Cow<'static, str>,
    kind: FieldKind,
    _record: PhantomData<fn(&T)>,
}

impl<T> Field<T> {
    /// Creates a selector for a statically named field.
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Field {
            name: Cow::Borrowed(name),
            kind,
            _record: PhantomData,
        }
    }

    /// Creates a selector with a computed name.
    pub fn named(name: impl Into<String>, kind: FieldKind) -> Self {
        Field {
            name: Cow::Owned(name.into()),
            kind,
            _record: PhantomData,
        }
    }

    /// Returns the field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the kind of value this field produces.
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Reads this field from a record.
    pub fn value_of<'a>(&self, record: &'a T) -> crate::Value<'a>
    where
        T: Searchable,
    {
        record.field_value(&self.name)
    }

    /// Re-targets this selector at a projection of `T` under `prefix`.
    pub(crate) fn prefixed<U>(&self, prefix: &str) -> Field<U> {
        Field::named(format!("{prefix}{}", self.name), self.kind)
    }
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        Field {
            name: self.name.clone(),
            kind: self.kind,
            _record: PhantomData,
        }
    }
}

impl<T> PartialEq for Field<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.kind == other.kind
    }
}

impl<T> Eq for Field<T> {}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

/// A named one-to-many relation from parent type `P` to child type `C`.
pub struct Relation<P, C> {
    name: Cow<'static, str>,
    _types: PhantomData<fn(&P) -> &C>,
}

impl<P, C> Relation<P, C> {
    /// Creates a relation handle for a statically named relation.
    pub const fn new(name: &'static str) -> Self {
        Relation {
            name: Cow::Borrowed(name),
            _types: PhantomData,
        }
    }

    /// Creates a relation handle with a computed name.
    pub fn named(name: impl Into<String>) -> Self {
        Relation {
            name: Cow::Owned(name.into()),
            _types: PhantomData,
        }
    }

    /// Returns the relation name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<P, C> Clone for Relation<P, C> {
    fn clone(&self) -> Self {
        Relation {
            name: self.name.clone(),
            _types: PhantomData,
        }
    }
}

impl<P, C> fmt::Debug for Relation<P, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Relation").field(&self.name).finish()
    }
}

/// Returns every registered field of `T` with the given kind.
///
/// This is the registration-based replacement for "search all string
/// fields": the list comes from [`Searchable::fields`].
pub fn fields_of_kind<T: Searchable>(kind: FieldKind) -> Vec<Field<T>> {
    T::fields().into_iter().filter(|f| f.kind == kind).collect()
}

/// Checks that every selector is registered on `T` with the same kind.
pub(crate) fn validate_fields<T: Searchable>(fields: &[Field<T>]) -> Result<()> {
    if fields.is_empty() {
        return Ok(());
    }
    let registered = T::fields();
    for field in fields {
        match registered.iter().find(|r| r.name == field.name) {
            Some(r) if r.kind == field.kind => {}
            Some(r) => {
                return Err(SearchError::InvalidArgument(format!(
                    "field `{}` is registered as {}, not {}",
                    field.name, r.kind, field.kind
                )))
            }
            None => {
                return Err(SearchError::InvalidArgument(format!(
                    "field `{}` is not searchable",
                    field.name
                )))
            }
        }
    }
    Ok(())
}

/// Checks that every relation is registered on `P`.
pub(crate) fn validate_relations<P: Searchable, C>(relations: &[Relation<P, C>]) -> Result<()> {
    if relations.is_empty() {
        return Err(SearchError::InvalidArgument(
            "at least one relation is required".to_string(),
        ));
    }
    let registered = P::relation_names();
    for relation in relations {
        if !registered.iter().any(|r| *r == relation.name) {
            return Err(SearchError::InvalidArgument(format!(
                "relation `{}` is not searchable",
                relation.name
            )));
        }
    }
    Ok(())
}

//! Traits implemented by searchable records.
//!
//! [`Searchable`] is implemented by `#[derive(Searchable)]` (feature
//! `derive`), but can also be written by hand.

use std::borrow::Cow;

use crate::field::Field;
use crate::value::{Timestamp, Value};

/// Iterator over the children of a record along one relation.
pub type Children<'a> = Box<dyn Iterator<Item = &'a dyn Searchable> + 'a>;

/// Trait for records that can be searched.
///
/// The object-safe part ([`field_value`](Searchable::field_value) and
/// [`children`](Searchable::children)) is what a compiled predicate calls
/// at evaluation time. The registry part ([`fields`](Searchable::fields) and
/// [`relation_names`](Searchable::relation_names)) is consulted when a
/// selector is handed to a search, so an unknown selector fails at the call
/// that receives it.
///
/// # Manual Implementation
///
/// ```
/// use standout_search::{Field, FieldKind, Number, Searchable, Value};
///
/// struct Task {
///     name: String,
///     priority: u8,
/// }
///
/// impl Task {
///     const NAME: Field<Task> = Field::new("name", FieldKind::String);
///     const PRIORITY: Field<Task> = Field::new("priority", FieldKind::Number);
/// }
///
/// impl Searchable for Task {
///     fn field_value(&self, field: &str) -> Value<'_> {
///         match field {
///             "name" => Value::String(&self.name),
///             "priority" => Value::Number(Number::from(self.priority)),
///             _ => Value::None,
///         }
///     }
///
///     fn fields() -> Vec<Field<Self>> {
///         vec![Task::NAME, Task::PRIORITY]
///     }
/// }
/// ```
pub trait Searchable {
    /// Returns the value of a field, or [`Value::None`] for an unknown or
    /// null field.
    fn field_value(&self, field: &str) -> Value<'_>;

    /// Returns the children of this record along `relation`, if the relation exists.
    fn children(&self, _relation: &str) -> Option<Children<'_>> {
        None
    }

    /// Returns every searchable field of this record type.
    fn fields() -> Vec<Field<Self>>
    where
        Self: Sized;

    /// Returns the names of every child relation of this record type.
    fn relation_names() -> Vec<Cow<'static, str>>
    where
        Self: Sized,
    {
        Vec::new()
    }
}

/// Adapts a slice of child records into a [`Children`] iterator.
pub fn children<C: Searchable>(items: &[C]) -> Children<'_> {
    Box::new(items.iter().map(|c| c as &dyn Searchable))
}

/// Conversion of text-like field types into a [`Value`].
///
/// Used by `#[search(String)]`; optional text maps `None` to a null value.
pub trait SearchText {
    /// Returns the text as a [`Value::String`], or [`Value::None`].
    fn search_text(&self) -> Value<'_>;
}

impl SearchText for String {
    fn search_text(&self) -> Value<'_> {
        Value::String(self)
    }
}

impl SearchText for str {
    fn search_text(&self) -> Value<'_> {
        Value::String(self)
    }
}

impl SearchText for &str {
    fn search_text(&self) -> Value<'_> {
        Value::String(self)
    }
}

impl SearchText for Cow<'_, str> {
    fn search_text(&self) -> Value<'_> {
        Value::String(self)
    }
}

impl<T: SearchText> SearchText for Option<T> {
    fn search_text(&self) -> Value<'_> {
        match self {
            Some(text) => text.search_text(),
            None => Value::None,
        }
    }
}

/// Helper trait for converting enum types to stable discriminants.
///
/// Used by `#[search(Enum)]`.
///
/// ```
/// use standout_search::SearchEnum;
///
/// enum Status {
///     Open,
///     Closed,
/// }
///
/// impl SearchEnum for Status {
///     fn search_discriminant(&self) -> u32 {
///         match self {
///             Status::Open => 0,
///             Status::Closed => 1,
///         }
///     }
/// }
/// ```
pub trait SearchEnum {
    /// Returns the discriminant value for this enum variant.
    fn search_discriminant(&self) -> u32;
}

/// Helper trait for converting datetime types to a [`Timestamp`].
///
/// Used by `#[search(Timestamp)]`.
pub trait SearchTimestamp {
    /// Converts this value to a [`Timestamp`] for comparison.
    fn search_timestamp(&self) -> Timestamp;
}

impl SearchTimestamp for i64 {
    fn search_timestamp(&self) -> Timestamp {
        Timestamp::from_millis(*self)
    }
}

impl SearchTimestamp for u64 {
    fn search_timestamp(&self) -> Timestamp {
        Timestamp::from_millis(*self as i64)
    }
}

impl SearchTimestamp for Timestamp {
    fn search_timestamp(&self) -> Timestamp {
        *self
    }
}

impl SearchTimestamp for std::time::SystemTime {
    fn search_timestamp(&self) -> Timestamp {
        match self.duration_since(std::time::UNIX_EPOCH) {
            Ok(since) => Timestamp::from_millis(since.as_millis() as i64),
            Err(before) => Timestamp::from_millis(-(before.duration().as_millis() as i64)),
        }
    }
}

//! Hit-count ranking.
//!
//! [`Session::to_ranked`](crate::Session::to_ranked) scores each match by
//! how many times the session's text terms occur in the fields they were
//! searched in, each under the case mode of the call that searched it. The
//! result is itself [`Searchable`], so it can be filtered
//! and ordered by [`Ranked::HITS`] or by item fields through
//! [`Ranked::item`].

use std::borrow::Cow;

use crate::criteria::TermUse;
use crate::field::{Field, FieldKind, Relation};
use crate::traits::{Children, Searchable};
use crate::value::{Number, Value};

const ITEM: &str = "item.";

/// A matched record with its hit count.
#[derive(Debug)]
pub struct Ranked<'s, T> {
    /// The matched record.
    pub item: &'s T,
    /// Occurrences of the session's terms in the record.
    pub hits: usize,
}

impl<'s, T> Ranked<'s, T> {
    /// The hit count, as a searchable number field.
    pub const HITS: Field<Self> = Field::new("hits", FieldKind::Number);

    /// Re-targets a field of the ranked record at the projection.
    pub fn item(field: &Field<T>) -> Field<Self> {
        field.prefixed(ITEM)
    }

    /// Re-targets a relation of the ranked record at the projection.
    pub fn item_relation<C>(relation: &Relation<T, C>) -> Relation<Self, C> {
        Relation::named(format!("{ITEM}{}", relation.name()))
    }
}

impl<T> Clone for Ranked<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Ranked<'_, T> {}

impl<T: Searchable> Searchable for Ranked<'_, T> {
    fn field_value(&self, field: &str) -> Value<'_> {
        match field {
            "hits" => Value::Number(Number::from(self.hits)),
            _ => item_value(self.item, field),
        }
    }

    fn children(&self, relation: &str) -> Option<Children<'_>> {
        item_children(self.item, relation)
    }

    fn fields() -> Vec<Field<Self>> {
        let mut fields = vec![Self::HITS];
        fields.extend(item_fields::<T, Self>());
        fields
    }

    fn relation_names() -> Vec<Cow<'static, str>> {
        item_relation_names::<T>()
    }
}

/// Reads an `item.`-prefixed field of a projection from its record.
pub(crate) fn item_value<'a, T: Searchable>(item: &'a T, field: &str) -> Value<'a> {
    match field.strip_prefix(ITEM) {
        Some(name) => item.field_value(name),
        None => Value::None,
    }
}

pub(crate) fn item_children<'a, T: Searchable>(
    item: &'a T,
    relation: &str,
) -> Option<Children<'a>> {
    item.children(relation.strip_prefix(ITEM)?)
}

pub(crate) fn item_fields<T: Searchable, P>() -> impl Iterator<Item = Field<P>> {
    T::fields().into_iter().map(|f| f.prefixed(ITEM))
}

pub(crate) fn item_relation_names<T: Searchable>() -> Vec<Cow<'static, str>> {
    T::relation_names()
        .into_iter()
        .map(|name| Cow::Owned(format!("{ITEM}{name}")))
        .collect()
}

/// Counts non-overlapping occurrences of `term` in `text`.
pub(crate) fn count_occurrences(text: &str, term: &str, case_sensitive: bool) -> usize {
    if term.is_empty() {
        return 0;
    }
    if case_sensitive {
        text.matches(term).count()
    } else {
        text.to_lowercase().matches(&term.to_lowercase()).count()
    }
}

pub(crate) fn rank<'s, T: Searchable + 's>(
    matches: impl Iterator<Item = &'s T>,
    history: &[TermUse],
) -> Vec<Ranked<'s, T>> {
    matches
        .map(|item| {
            let hits = history
                .iter()
                .map(|used| match item.field_value(&used.field) {
                    Value::String(text) => {
                        count_occurrences(text, &used.term, used.case_sensitive)
                    }
                    _ => 0,
                })
                .sum();
            Ranked { item, hits }
        })
        .collect()
}

//! Levenshtein edit distance and the edit-distance projection.
//!
//! [`Session::levenshtein_distance_of`](crate::Session::levenshtein_distance_of)
//! opens a [`DistanceRequest`]; once at least one target is given, each
//! match is projected into an [`EditDistance`] holding one distance per
//! target. Projections are [`Searchable`], so they can be searched again by
//! [`EditDistance::MINIMUM_DISTANCE`] and [`EditDistance::MAXIMUM_DISTANCE`].

use std::borrow::Cow;

use crate::error::{Result, SearchError};
use crate::field::{validate_fields, Field, FieldKind, Relation};
use crate::ranked::{item_children, item_fields, item_relation_names, item_value};
use crate::session::Session;
use crate::traits::{Children, Searchable};
use crate::value::{Number, Value};

/// Returns the number of single-character insertions, deletions and
/// substitutions needed to turn `a` into `b`.
///
/// Characters compare case-insensitively. Uses two rows sized by the shorter
/// input.
///
/// ```
/// use standout_search::levenshtein;
///
/// assert_eq!(levenshtein("house", "use"), 2);
/// assert_eq!(levenshtein("test", "TEST"), 0);
/// ```
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    if short.is_empty() {
        return long.len();
    }

    let mut previous: Vec<usize> = (0..=short.len()).collect();
    let mut current = vec![0; short.len() + 1];
    for (i, &l) in long.iter().enumerate() {
        current[0] = i + 1;
        for (j, &s) in short.iter().enumerate() {
            let substitution = previous[j] + usize::from(!same_letter(l, s));
            let deletion = previous[j + 1] + 1;
            let insertion = current[j] + 1;
            current[j + 1] = substitution.min(deletion).min(insertion);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[short.len()]
}

/// Distance between two possibly absent strings; absent reads as empty.
pub fn levenshtein_opt(a: Option<&str>, b: Option<&str>) -> usize {
    levenshtein(a.unwrap_or_default(), b.unwrap_or_default())
}

fn same_letter(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

#[derive(Debug, Clone)]
enum Target {
    Term(String),
    Field(String),
}

/// An edit-distance projection being configured.
///
/// ```ignore
/// let close = session
///     .levenshtein_distance_of(&Word::TEXT)?
///     .compared_to("kitten")
///     .to_vec()?;
/// ```
#[derive(Debug)]
pub struct DistanceRequest<'s, T> {
    session: Session<'s, T>,
    subject: String,
    targets: Vec<Target>,
}

impl<'s, T: Searchable> DistanceRequest<'s, T> {
    pub(crate) fn new(session: Session<'s, T>, field: &Field<T>) -> Result<Self> {
        string_field(field)?;
        Ok(DistanceRequest {
            session,
            subject: field.name().to_string(),
            targets: Vec::new(),
        })
    }

    /// Adds a literal target.
    pub fn compared_to(mut self, term: impl Into<String>) -> Self {
        self.targets.push(Target::Term(term.into()));
        self
    }

    /// Adds several literal targets.
    pub fn compared_to_all<I>(mut self, terms: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.targets
            .extend(terms.into_iter().map(|t| Target::Term(t.into())));
        self
    }

    /// Adds another string field of the same record as a target.
    pub fn compared_to_field(mut self, field: &Field<T>) -> Result<Self> {
        string_field(field)?;
        self.targets.push(Target::Field(field.name().to_string()));
        Ok(self)
    }

    /// Projects every match of the session.
    ///
    /// Fails with [`SearchError::IncompleteRequest`] when no target was given.
    pub fn to_vec(&self) -> Result<Vec<EditDistance<'s, T>>> {
        if self.targets.is_empty() {
            return Err(SearchError::IncompleteRequest(
                "edit distance needs at least one target",
            ));
        }
        Ok(self
            .session
            .iter()?
            .map(|item| {
                let subject = item.field_value(&self.subject).as_str();
                let distances = self
                    .targets
                    .iter()
                    .map(|target| match target {
                        Target::Term(term) => levenshtein_opt(subject, Some(term.as_str())),
                        Target::Field(other) => {
                            levenshtein_opt(subject, item.field_value(other).as_str())
                        }
                    })
                    .collect();
                EditDistance { item, distances }
            })
            .collect())
    }
}

fn string_field<T: Searchable>(field: &Field<T>) -> Result<()> {
    validate_fields(std::slice::from_ref(field))?;
    if field.kind() != FieldKind::String {
        return Err(SearchError::InvalidArgument(format!(
            "edit distance needs a string field, `{}` is {}",
            field.name(),
            field.kind()
        )));
    }
    Ok(())
}

/// A matched record with its distance to each target.
#[derive(Debug)]
pub struct EditDistance<'s, T> {
    /// The matched record.
    pub item: &'s T,
    /// Distance to each target, in the order the targets were added.
    pub distances: Vec<usize>,
}

impl<'s, T> EditDistance<'s, T> {
    /// The smallest distance, as a searchable number field.
    pub const MINIMUM_DISTANCE: Field<Self> = Field::new("minimum_distance", FieldKind::Number);
    /// The largest distance, as a searchable number field.
    pub const MAXIMUM_DISTANCE: Field<Self> = Field::new("maximum_distance", FieldKind::Number);

    /// Re-targets a field of the projected record at the projection.
    pub fn item(field: &Field<T>) -> Field<Self> {
        field.prefixed("item.")
    }

    /// Re-targets a relation of the projected record at the projection.
    pub fn item_relation<C>(relation: &Relation<T, C>) -> Relation<Self, C> {
        Relation::named(format!("item.{}", relation.name()))
    }

    /// Returns the smallest distance.
    pub fn minimum_distance(&self) -> usize {
        self.distances.iter().copied().min().unwrap_or_default()
    }

    /// Returns the largest distance.
    pub fn maximum_distance(&self) -> usize {
        self.distances.iter().copied().max().unwrap_or_default()
    }
}

impl<T> Clone for EditDistance<'_, T> {
    fn clone(&self) -> Self {
        EditDistance {
            item: self.item,
            distances: self.distances.clone(),
        }
    }
}

impl<T: Searchable> Searchable for EditDistance<'_, T> {
    fn field_value(&self, field: &str) -> Value<'_> {
        match field {
            "minimum_distance" => Value::Number(Number::from(self.minimum_distance())),
            "maximum_distance" => Value::Number(Number::from(self.maximum_distance())),
            _ => item_value(self.item, field),
        }
    }

    fn children(&self, relation: &str) -> Option<Children<'_>> {
        item_children(self.item, relation)
    }

    fn fields() -> Vec<Field<Self>> {
        let mut fields = vec![Self::MINIMUM_DISTANCE, Self::MAXIMUM_DISTANCE];
        fields.extend(item_fields::<T, Self>());
        fields
    }

    fn relation_names() -> Vec<Cow<'static, str>> {
        item_relation_names::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_inputs() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("", "string"), 6);
        assert_eq!(levenshtein("string", ""), 6);
    }

    #[test]
    fn ignores_case() {
        assert_eq!(levenshtein("test", "TEST"), 0);
        assert_eq!(levenshtein("Straße", "STRASSE"), 2);
    }

    #[test]
    fn classic_pairs() {
        assert_eq!(levenshtein("house", "use"), 2);
        assert_eq!(levenshtein("Barry", "Lorry"), 2);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("flaw", "lawn"), 2);
    }

    #[test]
    fn symmetric() {
        assert_eq!(levenshtein("sunday", "saturday"), 3);
        assert_eq!(levenshtein("saturday", "sunday"), 3);
    }

    #[test]
    fn projection_bounds() {
        struct Word;
        let word = Word;
        let projected = EditDistance {
            item: &word,
            distances: vec![4, 1, 3],
        };
        assert_eq!(projected.minimum_distance(), 1);
        assert_eq!(projected.maximum_distance(), 4);
    }

    #[test]
    fn absent_reads_as_empty() {
        assert_eq!(levenshtein_opt(None, None), 0);
        assert_eq!(levenshtein_opt(None, Some("abc")), 3);
        assert_eq!(levenshtein_opt(Some("abc"), Some("abd")), 1);
    }
}

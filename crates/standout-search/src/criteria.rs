//! Criteria and the fluent filter operators.
//!
//! A [`Criteria`] holds the fields a search currently looks at, the
//! options in effect and the predicate accumulated so far. Every operator
//! of the [`Filter`] trait builds one fragment and conjoins it:
//!
//! ```text
//! call(terms) over fields F  =>  OR { leaf(f, t) | f in F, t in terms }
//! a.call1(..).call2(..)      =>  fragment1 AND fragment2
//! ```
//!
//! A call with no usable field (no selected field of a fitting kind) or no
//! usable term (after dropping blank ones) leaves the predicate unchanged.
//!
//! The same operators are available on a [`Session`](crate::Session), on a
//! [`ChildQuantifier`] and on a detached `Criteria`, which can be built once
//! and merged into any of them with [`Filter::satisfying`].

use std::fmt;
use std::marker::PhantomData;

use crate::binding::{Binding, BoundField, Rebinder};
use crate::children::ChildQuantifier;
use crate::error::Result;
use crate::field::{validate_fields, Field, FieldKind, Relation};
use crate::op::CompareOp;
use crate::options::{CaseSensitivity, Matching, SearchOptions};
use crate::phonetic::phonetic_code;
use crate::predicate::{Operand, Predicate};
use crate::traits::Searchable;
use crate::value::Literal;

/// Accumulated filter over records of type `T`, read through one binding slot.
pub struct Criteria<T> {
    binding: Binding,
    fields: Vec<BoundField>,
    options: SearchOptions,
    predicate: Predicate,
    history: Vec<TermUse>,
    _record: PhantomData<fn(&T)>,
}

/// One literal term a text filter searched a field for, with the case mode
/// in effect for that call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TermUse {
    pub field: String,
    pub term: String,
    pub case_sensitive: bool,
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum TextOp {
    Contains,
    StartsWith,
    EndsWith,
    Equals,
}

impl TextOp {
    fn name(self) -> &'static str {
        match self {
            TextOp::Contains => "containing",
            TextOp::StartsWith => "starting_with",
            TextOp::EndsWith => "ending_with",
            TextOp::Equals => "equal_to",
        }
    }
}

fn usable_terms<I>(terms: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    terms
        .into_iter()
        .filter(|t| !t.as_ref().trim().is_empty())
        .map(|t| t.as_ref().to_string())
        .collect()
}

impl<T> Criteria<T> {
    pub(crate) fn detached(binding: Binding, options: SearchOptions) -> Self {
        Criteria {
            binding,
            fields: Vec::new(),
            options,
            predicate: Predicate::True,
            history: Vec::new(),
            _record: PhantomData,
        }
    }

    /// Returns the accumulated predicate.
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// Consumes the criteria, returning its predicate.
    pub fn into_predicate(self) -> Predicate {
        self.predicate
    }

    /// Returns the slot the criteria's fields are bound to.
    pub fn binding(&self) -> Binding {
        self.binding
    }

    /// Returns the options applied to subsequent operators.
    pub fn options(&self) -> SearchOptions {
        self.options
    }

    /// Returns the currently selected fields.
    pub fn fields(&self) -> &[BoundField] {
        &self.fields
    }

    /// Terms of every literal text filter, in call order.
    pub(crate) fn history(&self) -> &[TermUse] {
        &self.history
    }

    pub(crate) fn set_options(&mut self, options: SearchOptions) {
        self.options = options;
    }

    /// Conjoins `fragment`, or logs the skipped call when there is none.
    pub(crate) fn and(&mut self, op: &'static str, fragment: Option<Predicate>) {
        match fragment {
            Some(fragment) => {
                self.predicate = std::mem::take(&mut self.predicate).and(fragment);
            }
            None => {
                tracing::trace!(op, binding = %self.binding, "no usable fields or terms, filter unchanged");
            }
        }
    }

    fn fields_where(&self, keep: impl Fn(FieldKind) -> bool) -> Vec<BoundField> {
        self.fields
            .iter()
            .filter(|f| keep(f.kind))
            .cloned()
            .collect()
    }

    fn text_leaf(&self, op: TextOp, subject: BoundField, target: Operand) -> Predicate {
        let case_sensitive = self.options.is_case_sensitive();
        match op {
            TextOp::Contains => Predicate::Contains {
                subject,
                target,
                whole_words: self.options.is_whole_words(),
                case_sensitive,
            },
            TextOp::StartsWith => Predicate::StartsWith {
                subject,
                target,
                case_sensitive,
            },
            TextOp::EndsWith => Predicate::EndsWith {
                subject,
                target,
                case_sensitive,
            },
            TextOp::Equals => Predicate::Equals {
                subject,
                target,
                case_sensitive,
            },
        }
    }

    fn record_term(&mut self, field: &str, term: &str) {
        self.history.push(TermUse {
            field: field.to_string(),
            term: term.to_string(),
            case_sensitive: self.options.is_case_sensitive(),
        });
    }

    fn text_fragment(&mut self, op: TextOp, terms: &[String]) -> Option<Predicate> {
        let fields = self.fields_where(|k| k == FieldKind::String);
        let mut leaves = Vec::with_capacity(fields.len() * terms.len());
        for field in &fields {
            for term in terms {
                self.record_term(&field.name, term);
                leaves.push(self.text_leaf(
                    op,
                    field.clone(),
                    Operand::Literal(Literal::String(term.clone())),
                ));
            }
        }
        Predicate::or_all(leaves)
    }

    pub(crate) fn text<I>(&mut self, op: TextOp, terms: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let terms = usable_terms(terms);
        let fragment = self.text_fragment(op, &terms);
        self.and(op.name(), fragment);
    }

    pub(crate) fn containing_all<I>(&mut self, terms: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let terms = usable_terms(terms);
        let mut per_term = Vec::with_capacity(terms.len());
        for term in &terms {
            match self.text_fragment(TextOp::Contains, std::slice::from_ref(term)) {
                Some(fragment) => per_term.push(fragment),
                None => break,
            }
        }
        let fragment = (!per_term.is_empty()).then(|| Predicate::and_all(per_term));
        self.and("containing_all", fragment);
    }

    pub(crate) fn text_field(&mut self, op: TextOp, other: BoundField) {
        let fields = match op {
            TextOp::Equals => self.fields.clone(),
            _ => self.fields_where(|k| k == FieldKind::String),
        };
        let leaves = fields
            .into_iter()
            .map(|subject| self.text_leaf(op, subject, Operand::Field(other.clone())))
            .collect::<Vec<_>>();
        self.and(op.name(), Predicate::or_all(leaves));
    }

    pub(crate) fn equal_to<I>(&mut self, values: I)
    where
        I: IntoIterator,
        I::Item: Into<Literal>,
    {
        let values: Vec<Literal> = values
            .into_iter()
            .map(Into::into)
            .filter(|v| !matches!(v, Literal::String(s) if s.trim().is_empty()))
            .collect();
        let mut leaves = Vec::new();
        for field in self.fields.clone() {
            for value in &values {
                if let (FieldKind::String, Literal::String(term)) = (field.kind, value) {
                    self.record_term(&field.name, term);
                }
                leaves.push(self.text_leaf(
                    TextOp::Equals,
                    field.clone(),
                    Operand::Literal(value.clone()),
                ));
            }
        }
        self.and("equal_to", Predicate::or_all(leaves));
    }

    pub(crate) fn compare(&mut self, op: CompareOp, bound: Literal) {
        let leaves = self
            .fields_where(FieldKind::is_ordered)
            .into_iter()
            .map(|subject| Predicate::Compare {
                subject,
                op,
                bound: Operand::Literal(bound.clone()),
            })
            .collect::<Vec<_>>();
        let name = match op {
            CompareOp::Gt => "greater_than",
            CompareOp::Lt => "less_than",
        };
        self.and(name, Predicate::or_all(leaves));
    }

    pub(crate) fn between(&mut self, min: Literal, max: Literal) {
        let leaves = self
            .fields_where(FieldKind::is_ordered)
            .into_iter()
            .map(|subject| {
                Predicate::Compare {
                    subject: subject.clone(),
                    op: CompareOp::Gt,
                    bound: Operand::Literal(min.clone()),
                }
                .and(Predicate::Compare {
                    subject,
                    op: CompareOp::Lt,
                    bound: Operand::Literal(max.clone()),
                })
            })
            .collect::<Vec<_>>();
        self.and("between", Predicate::or_all(leaves));
    }

    pub(crate) fn sounds_like<I>(&mut self, terms: I, reversed: bool)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut codes: Vec<String> = Vec::new();
        for term in usable_terms(terms) {
            let code = phonetic_code(&term, reversed).to_ascii_uppercase();
            if !code.is_empty() && !codes.contains(&code) {
                codes.push(code);
            }
        }
        let fragment = if codes.is_empty() {
            None
        } else {
            Predicate::or_all(
                self.fields_where(|k| k == FieldKind::String)
                    .into_iter()
                    .map(|subject| Predicate::SoundsLike {
                        subject,
                        codes: codes.clone(),
                        reversed,
                    }),
            )
        };
        let name = if reversed {
            "reverse_sounds_like"
        } else {
            "sounds_like"
        };
        self.and(name, fragment);
    }

    pub(crate) fn satisfying(&mut self, other: Criteria<T>) {
        let Criteria {
            binding,
            predicate,
            history,
            ..
        } = other;
        if predicate.is_true() {
            self.and("satisfying", None);
            return;
        }
        let moved = Rebinder::new(binding, self.binding).rebind(predicate);
        self.history.extend(history);
        self.and("satisfying", Some(moved));
    }
}

impl<T: Searchable> Criteria<T> {
    /// Creates a detached criteria over `fields`, bound to the root slot.
    ///
    /// Fails when a field is not registered on `T`. An empty field list is
    /// accepted; every operator on it is then a no-op.
    ///
    /// ```
    /// use standout_search::{Criteria, Field, FieldKind, Filter, Searchable, Value};
    ///
    /// struct Note {
    ///     body: String,
    /// }
    ///
    /// impl Note {
    ///     const BODY: Field<Note> = Field::new("body", FieldKind::String);
    /// }
    ///
    /// impl Searchable for Note {
    ///     fn field_value(&self, field: &str) -> Value<'_> {
    ///         match field {
    ///             "body" => Value::String(&self.body),
    ///             _ => Value::None,
    ///         }
    ///     }
    ///
    ///     fn fields() -> Vec<Field<Self>> {
    ///         vec![Note::BODY]
    ///     }
    /// }
    ///
    /// let urgent = Criteria::new(&[Note::BODY])?.containing(["urgent", "asap"]);
    /// assert_eq!(urgent.predicate().leaf_count(), 2);
    /// # Ok::<(), standout_search::SearchError>(())
    /// ```
    pub fn new(fields: &[Field<T>]) -> Result<Self> {
        let mut criteria = Criteria::detached(Binding::ROOT, SearchOptions::default());
        criteria.select(fields)?;
        Ok(criteria)
    }

    /// Replaces the selected fields.
    pub(crate) fn select(&mut self, fields: &[Field<T>]) -> Result<()> {
        validate_fields(fields)?;
        self.fields = if fields.is_empty() {
            Vec::new()
        } else {
            Rebinder::bind(self.binding, fields)?
        };
        Ok(())
    }

    /// Binds a field used as an operand.
    pub(crate) fn operand(&self, field: &Field<T>) -> Result<BoundField> {
        validate_fields(std::slice::from_ref(field))?;
        Ok(BoundField {
            binding: self.binding,
            name: field.name().to_string(),
            kind: field.kind(),
        })
    }
}

impl<T> Clone for Criteria<T> {
    fn clone(&self) -> Self {
        Criteria {
            binding: self.binding,
            fields: self.fields.clone(),
            options: self.options,
            predicate: self.predicate.clone(),
            history: self.history.clone(),
            _record: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Criteria<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Criteria")
            .field("binding", &self.binding)
            .field("fields", &self.fields)
            .field("options", &self.options)
            .field("predicate", &self.predicate)
            .finish()
    }
}

/// The fluent operators shared by sessions, child quantifiers and criteria.
///
/// Operators that take only terms or literals return `Self`. Operators that
/// take a field or relation return `Result<Self>` and fail with
/// [`SearchError::InvalidArgument`](crate::SearchError::InvalidArgument)
/// when it is not registered on the record type.
///
/// Text operators apply to the selected string fields, comparisons to the
/// selected number and timestamp fields, and `equal_to` to every selected
/// field (a literal of another kind never matches).
pub trait Filter: Sized {
    /// Record type the operators filter.
    type Record: Searchable;

    /// Returns the accumulated criteria.
    fn criteria(&self) -> &Criteria<Self::Record>;

    /// Returns the accumulated criteria for modification.
    fn criteria_mut(&mut self) -> &mut Criteria<Self::Record>;

    /// Some selected field contains some term.
    fn containing<I>(mut self, terms: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.criteria_mut().text(TextOp::Contains, terms);
        self
    }

    /// Every term is contained in some selected field.
    fn containing_all<I>(mut self, terms: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.criteria_mut().containing_all(terms);
        self
    }

    /// Some selected field starts with some term.
    fn starting_with<I>(mut self, terms: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.criteria_mut().text(TextOp::StartsWith, terms);
        self
    }

    /// Some selected field ends with some term.
    fn ending_with<I>(mut self, terms: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.criteria_mut().text(TextOp::EndsWith, terms);
        self
    }

    /// Some selected field equals some value.
    ///
    /// Blank strings are dropped. Text compares under the case mode.
    fn equal_to<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Literal>,
    {
        self.criteria_mut().equal_to(values);
        self
    }

    /// Some selected string field contains the value of `other`.
    fn containing_field(mut self, other: &Field<Self::Record>) -> Result<Self> {
        let other = self.criteria().operand(other)?;
        self.criteria_mut().text_field(TextOp::Contains, other);
        Ok(self)
    }

    /// Some selected string field starts with the value of `other`.
    fn starting_with_field(mut self, other: &Field<Self::Record>) -> Result<Self> {
        let other = self.criteria().operand(other)?;
        self.criteria_mut().text_field(TextOp::StartsWith, other);
        Ok(self)
    }

    /// Some selected string field ends with the value of `other`.
    fn ending_with_field(mut self, other: &Field<Self::Record>) -> Result<Self> {
        let other = self.criteria().operand(other)?;
        self.criteria_mut().text_field(TextOp::EndsWith, other);
        Ok(self)
    }

    /// Some selected field equals the value of `other`.
    fn equal_to_field(mut self, other: &Field<Self::Record>) -> Result<Self> {
        let other = self.criteria().operand(other)?;
        self.criteria_mut().text_field(TextOp::Equals, other);
        Ok(self)
    }

    /// Some selected ordered field is greater than `value`.
    fn greater_than(mut self, value: impl Into<Literal>) -> Self {
        self.criteria_mut().compare(CompareOp::Gt, value.into());
        self
    }

    /// Some selected ordered field is less than `value`.
    fn less_than(mut self, value: impl Into<Literal>) -> Self {
        self.criteria_mut().compare(CompareOp::Lt, value.into());
        self
    }

    /// Some selected ordered field lies strictly between `min` and `max`.
    fn between(mut self, min: impl Into<Literal>, max: impl Into<Literal>) -> Self {
        self.criteria_mut().between(min.into(), max.into());
        self
    }

    /// Some selected string field has the Soundex code of some term.
    fn sounds_like<I>(mut self, terms: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.criteria_mut().sounds_like(terms, false);
        self
    }

    /// Some selected string field has the reverse Soundex code of some term.
    fn reverse_sounds_like<I>(mut self, terms: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.criteria_mut().sounds_like(terms, true);
        self
    }

    /// Sets the case sensitivity of subsequent text operators.
    fn set_comparison_mode(mut self, case: CaseSensitivity) -> Self {
        let options = self.criteria().options().case(case);
        self.criteria_mut().set_options(options);
        self
    }

    /// Sets the matching mode of subsequent `containing` calls.
    fn matching(mut self, matching: Matching) -> Self {
        let options = self.criteria().options().matching(matching);
        self.criteria_mut().set_options(options);
        self
    }

    /// Conjoins a detached criteria, moved onto this filter's slot.
    fn satisfying(mut self, criteria: Criteria<Self::Record>) -> Self {
        self.criteria_mut().satisfying(criteria);
        self
    }

    /// Opens an existential filter over the children along `relations`.
    ///
    /// Fails when no relation is given or one is not registered.
    fn search_children<C: Searchable>(
        self,
        relations: &[Relation<Self::Record, C>],
    ) -> Result<ChildQuantifier<Self, C>> {
        ChildQuantifier::new(self, relations)
    }
}

impl<T: Searchable> Filter for Criteria<T> {
    type Record = T;

    fn criteria(&self) -> &Criteria<T> {
        self
    }

    fn criteria_mut(&mut self) -> &mut Criteria<T> {
        self
    }
}

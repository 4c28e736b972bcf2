//! Canonical binding slots and rebinding.
//!
//! Every leaf of a predicate names the record it reads through a
//! [`Binding`] slot. A session reads the "current record" through
//! [`Binding::ROOT`]; each `Exists` node introduces the next slot for the
//! "current child". Slots are levels, so a predicate is closed when every
//! slot it uses was introduced by an enclosing scope.
//!
//! Fragments built independently (a detached [`Criteria`](crate::Criteria),
//! or a child criteria opened at some depth) are aligned with the
//! [`Rebinder`], which substitutes slots structurally.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};
use crate::field::{Field, FieldKind};
use crate::predicate::{Operand, Predicate};

/// A named slot holding the record a leaf is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Binding(u32);

impl Binding {
    /// The slot of the record a session searches.
    pub const ROOT: Binding = Binding(0);

    /// Returns the slot introduced for the children of this slot.
    pub fn child(self) -> Binding {
        Binding(self.0 + 1)
    }

    /// Returns the nesting depth of this slot.
    pub fn depth(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// A field selector bound to a slot.
///
/// This is the type-erased form stored in the predicate tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundField {
    /// Slot of the record the field is read from.
    pub binding: Binding,
    /// Field name.
    pub name: String,
    /// Kind of the field.
    pub kind: FieldKind,
}

/// A relation bound to the slot of its parent record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundRelation {
    /// Slot of the parent record.
    pub binding: Binding,
    /// Relation name.
    pub name: String,
}

/// Aligns selectors and predicate fragments onto one canonical slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rebinder {
    from: Binding,
    to: Binding,
}

impl Rebinder {
    /// Creates a rebinder moving a fragment authored at `from` onto `to`.
    pub fn new(from: Binding, to: Binding) -> Self {
        Rebinder { from, to }
    }

    /// Binds independently authored selectors onto `binding`.
    ///
    /// Fails only when no selector is given, since there is nothing to
    /// establish the canonical slot from.
    pub fn bind<T>(binding: Binding, fields: &[Field<T>]) -> Result<Vec<BoundField>> {
        if fields.is_empty() {
            return Err(SearchError::InvalidArgument(
                "no field selectors to bind".to_string(),
            ));
        }
        Ok(fields
            .iter()
            .map(|field| BoundField {
                binding,
                name: field.name().to_string(),
                kind: field.kind(),
            })
            .collect())
    }

    /// Substitutes every slot of `predicate` at or below `from` so that the
    /// fragment reads from `to`.
    ///
    /// Nested slots shift by the same distance, so child scopes the fragment
    /// introduced stay distinct from the slots around its new position.
    /// Slots above `from` belong to enclosing scopes and are left alone.
    pub fn rebind(&self, predicate: Predicate) -> Predicate {
        if self.from == self.to {
            return predicate;
        }
        match predicate {
            Predicate::True => Predicate::True,
            Predicate::Contains {
                subject,
                target,
                whole_words,
                case_sensitive,
            } => Predicate::Contains {
                subject: self.field(subject),
                target: self.operand(target),
                whole_words,
                case_sensitive,
            },
            Predicate::StartsWith {
                subject,
                target,
                case_sensitive,
            } => Predicate::StartsWith {
                subject: self.field(subject),
                target: self.operand(target),
                case_sensitive,
            },
            Predicate::EndsWith {
                subject,
                target,
                case_sensitive,
            } => Predicate::EndsWith {
                subject: self.field(subject),
                target: self.operand(target),
                case_sensitive,
            },
            Predicate::Equals {
                subject,
                target,
                case_sensitive,
            } => Predicate::Equals {
                subject: self.field(subject),
                target: self.operand(target),
                case_sensitive,
            },
            Predicate::Compare { subject, op, bound } => Predicate::Compare {
                subject: self.field(subject),
                op,
                bound: self.operand(bound),
            },
            Predicate::SoundsLike {
                subject,
                codes,
                reversed,
            } => Predicate::SoundsLike {
                subject: self.field(subject),
                codes,
                reversed,
            },
            Predicate::And(left, right) => Predicate::And(
                Box::new(self.rebind(*left)),
                Box::new(self.rebind(*right)),
            ),
            Predicate::Or(left, right) => Predicate::Or(
                Box::new(self.rebind(*left)),
                Box::new(self.rebind(*right)),
            ),
            Predicate::Exists {
                relation,
                binding,
                predicate,
            } => Predicate::Exists {
                relation: BoundRelation {
                    binding: self.slot(relation.binding),
                    name: relation.name,
                },
                binding: self.slot(binding),
                predicate: Box::new(self.rebind(*predicate)),
            },
        }
    }

    fn slot(&self, binding: Binding) -> Binding {
        if binding < self.from {
            return binding;
        }
        Binding(binding.0 - self.from.0 + self.to.0)
    }

    fn field(&self, field: BoundField) -> BoundField {
        BoundField {
            binding: self.slot(field.binding),
            ..field
        }
    }

    fn operand(&self, operand: Operand) -> Operand {
        match operand {
            Operand::Field(field) => Operand::Field(self.field(field)),
            literal => literal,
        }
    }
}

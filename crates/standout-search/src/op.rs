//! Comparison operators for ordered values.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Comparison operator of a [`Predicate::Compare`](crate::Predicate::Compare) leaf.
///
/// Both are strict; `between` is a `Gt` and an `Lt` on the same field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    /// Greater than.
    Gt,
    /// Less than.
    Lt,
}

impl CompareOp {
    /// Evaluates the operator given the ordering of field value against bound.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Lt => ordering == Ordering::Less,
        }
    }

    /// Returns the symbol of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
        }
    }
}

impl std::fmt::Display for CompareOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Result ordering.
//!
//! Provides [`Dir`] for sort direction and [`OrderBy`] for field-based
//! ordering of a session's matches.

use std::cmp::Ordering;

use crate::traits::Searchable;
use crate::value::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dir {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl Dir {
    /// Applies this direction to an ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Dir::Asc => ordering,
            Dir::Desc => ordering.reverse(),
        }
    }

    /// Returns the display name of this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Dir::Asc => "asc",
            Dir::Desc => "desc",
        }
    }
}

impl std::fmt::Display for Dir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sort key: a field name and a direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// The field to sort by.
    pub field: String,
    /// The sort direction.
    pub dir: Dir,
}

impl OrderBy {
    /// Creates a new ordering with the given direction.
    pub fn new(field: impl Into<String>, dir: Dir) -> Self {
        OrderBy {
            field: field.into(),
            dir,
        }
    }

    /// Compares two values according to this ordering.
    ///
    /// Null values sort last in either direction.
    pub fn compare(&self, a: &Value<'_>, b: &Value<'_>) -> Option<Ordering> {
        match (a.is_none(), b.is_none()) {
            (false, false) => Some(self.dir.apply(compare_values(a, b)?)),
            _ => compare_values(a, b),
        }
    }
}

/// Compares two values of the same kind, with nulls after everything else.
///
/// Returns `None` on a kind mismatch or a NaN.
pub fn compare_values(a: &Value<'_>, b: &Value<'_>) -> Option<Ordering> {
    match (a, b) {
        (Value::None, Value::None) => Some(Ordering::Equal),
        (Value::None, _) => Some(Ordering::Greater),
        (_, Value::None) => Some(Ordering::Less),
        _ => a.compare(b),
    }
}

/// Compares two records by a list of sort keys.
///
/// The first key is the primary one; later keys break ties. Keys whose
/// values cannot be compared count as equal.
pub fn compare_by_orderings(
    a: &dyn Searchable,
    b: &dyn Searchable,
    orderings: &[OrderBy],
) -> Ordering {
    for order_by in orderings {
        let left = a.field_value(&order_by.field);
        let right = b.field_value(&order_by.field);
        match order_by.compare(&left, &right) {
            Some(Ordering::Equal) | None => continue,
            Some(ordering) => return ordering,
        }
    }
    Ordering::Equal
}

//! Runtime and literal value types.
//!
//! [`Value`] is what a record hands back for one of its fields: it borrows
//! from the record and is only alive while a predicate is being evaluated.
//! [`Literal`] is the owned counterpart stored inside a predicate tree, so
//! that a finished tree is self-contained and serializable.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::field::FieldKind;

/// Runtime value of a record field, borrowed from the record.
///
/// # Example
///
/// ```
/// use standout_search::{Number, Value};
///
/// struct Person {
///     name: Option<String>,
///     age: u8,
/// }
///
/// fn value_of<'a>(person: &'a Person, field: &str) -> Value<'a> {
///     match field {
///         "name" => Value::from(person.name.as_deref()),
///         "age" => Value::Number(Number::from(person.age)),
///         _ => Value::None,
///     }
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    /// String value (borrowed).
    String(&'a str),
    /// Numeric value.
    Number(Number),
    /// Timestamp value (milliseconds since Unix epoch).
    Timestamp(Timestamp),
    /// Enum discriminant value.
    Enum(u32),
    /// Boolean value.
    Bool(bool),
    /// Field absent, null, or not searchable.
    None,
}

impl<'a> Value<'a> {
    /// Returns `true` if this is a `None` value.
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Returns the kind of this value, or `None` for a null value.
    pub fn kind(&self) -> Option<FieldKind> {
        match self {
            Value::String(_) => Some(FieldKind::String),
            Value::Number(_) => Some(FieldKind::Number),
            Value::Timestamp(_) => Some(FieldKind::Timestamp),
            Value::Enum(_) => Some(FieldKind::Enum),
            Value::Bool(_) => Some(FieldKind::Bool),
            Value::None => None,
        }
    }

    /// Extracts the string value, if present.
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Compares two values of the same ordered kind.
    ///
    /// Returns `None` on a kind mismatch, a null, or a NaN.
    pub fn compare(&self, other: &Value<'_>) -> Option<Ordering> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.compare(*b),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            (Value::String(a), Value::String(b)) => Some((*a).cmp(*b)),
            (Value::Enum(a), Value::Enum(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(s: &'a str) -> Self {
        Value::String(s)
    }
}

impl<'a> From<Option<&'a str>> for Value<'a> {
    fn from(s: Option<&'a str>) -> Self {
        s.map_or(Value::None, Value::String)
    }
}

/// Numeric value supporting all common numeric types.
///
/// Comparisons between different variants convert to `f64`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

impl Number {
    /// Converts the number to f64 for comparison.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Compares two numbers, handling mixed types.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => Some(a.cmp(&b)),
            (Number::U64(a), Number::U64(b)) => Some(a.cmp(&b)),
            (Number::F64(a), Number::F64(b)) => a.partial_cmp(&b),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

macro_rules! number_from {
    ($variant:ident as $target:ty: $($source:ty),*) => {
        $(
            impl From<$source> for Number {
                fn from(n: $source) -> Self {
                    Number::$variant(n as $target)
                }
            }
        )*
    };
}

number_from!(I64 as i64: i8, i16, i32, i64, isize);
number_from!(U64 as u64: u8, u16, u32, u64, usize);
number_from!(F64 as f64: f32, f64);

/// Timestamp value represented as milliseconds since Unix epoch.
///
/// ```
/// use standout_search::Timestamp;
///
/// assert!(Timestamp::from_secs(1) < Timestamp::from_millis(1500));
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Creates a new timestamp from milliseconds since Unix epoch.
    pub fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    /// Creates a new timestamp from seconds since Unix epoch.
    pub fn from_secs(secs: i64) -> Self {
        Timestamp(secs * 1000)
    }

    /// Returns the timestamp as milliseconds since Unix epoch.
    pub fn as_millis(self) -> i64 {
        self.0
    }
}

/// Owned value stored in a predicate tree.
///
/// Unlike [`Value`], which borrows from a record, a `Literal` owns its data
/// so predicates can outlive the records they are tested against and can be
/// handed to a translator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Literal {
    /// String literal.
    String(String),
    /// Numeric literal.
    Number(Number),
    /// Timestamp literal.
    Timestamp(Timestamp),
    /// Enum discriminant literal.
    Enum(u32),
    /// Boolean literal.
    Bool(bool),
}

impl Literal {
    /// Returns the field kind this literal can be compared against.
    pub fn kind(&self) -> FieldKind {
        match self {
            Literal::String(_) => FieldKind::String,
            Literal::Number(_) => FieldKind::Number,
            Literal::Timestamp(_) => FieldKind::Timestamp,
            Literal::Enum(_) => FieldKind::Enum,
            Literal::Bool(_) => FieldKind::Bool,
        }
    }

    /// Borrows this literal as a runtime [`Value`].
    pub fn as_value(&self) -> Value<'_> {
        match self {
            Literal::String(s) => Value::String(s),
            Literal::Number(n) => Value::Number(*n),
            Literal::Timestamp(t) => Value::Timestamp(*t),
            Literal::Enum(d) => Value::Enum(*d),
            Literal::Bool(b) => Value::Bool(*b),
        }
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Literal::String(s)
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::String(s.to_string())
    }
}

impl From<Number> for Literal {
    fn from(n: Number) -> Self {
        Literal::Number(n)
    }
}

impl From<Timestamp> for Literal {
    fn from(t: Timestamp) -> Self {
        Literal::Timestamp(t)
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Bool(b)
    }
}

macro_rules! literal_from_number {
    ($($source:ty),*) => {
        $(
            impl From<$source> for Literal {
                fn from(n: $source) -> Self {
                    Literal::Number(Number::from(n))
                }
            }
        )*
    };
}

literal_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_kinds() {
        assert_eq!(Value::String("x").kind(), Some(FieldKind::String));
        assert_eq!(Value::Number(Number::I64(1)).kind(), Some(FieldKind::Number));
        assert_eq!(
            Value::Timestamp(Timestamp(0)).kind(),
            Some(FieldKind::Timestamp)
        );
        assert_eq!(Value::Enum(2).kind(), Some(FieldKind::Enum));
        assert_eq!(Value::Bool(true).kind(), Some(FieldKind::Bool));
        assert_eq!(Value::None.kind(), None);
    }

    #[test]
    fn value_from_optional_str() {
        assert_eq!(Value::from(Some("a")), Value::String("a"));
        assert_eq!(Value::from(None::<&str>), Value::None);
    }

    #[test]
    fn number_comparisons_mixed_types() {
        assert_eq!(
            Number::I64(5).compare(Number::U64(10)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Number::I64(5).compare(Number::F64(5.0)),
            Some(Ordering::Equal)
        );
        assert_eq!(Number::F64(f64::NAN).compare(Number::F64(1.0)), None);
    }

    #[test]
    fn value_compare_rejects_mismatch_and_null() {
        let n = Value::Number(Number::I64(3));
        assert_eq!(n.compare(&Value::String("3")), None);
        assert_eq!(n.compare(&Value::None), None);
        assert_eq!(
            Value::Timestamp(Timestamp(1)).compare(&Value::Timestamp(Timestamp(2))),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn literal_conversions_and_kinds() {
        assert_eq!(Literal::from("a").kind(), FieldKind::String);
        assert_eq!(Literal::from(3u8), Literal::Number(Number::U64(3)));
        assert_eq!(Literal::from(-3i32), Literal::Number(Number::I64(-3)));
        assert_eq!(Literal::from(2.5f64).kind(), FieldKind::Number);
        assert_eq!(Literal::from(Timestamp(9)).kind(), FieldKind::Timestamp);
        assert_eq!(Literal::from(true).as_value(), Value::Bool(true));
    }

    #[test]
    fn timestamp_conversions() {
        assert_eq!(Timestamp::from_secs(2).as_millis(), 2000);
    }
}

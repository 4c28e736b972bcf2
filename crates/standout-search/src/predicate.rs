//! The predicate tree.
//!
//! A [`Predicate`] is the tagged-union form of a composed boolean test. It
//! owns everything it refers to (field names, binding slots, literals), so a
//! finished tree can be evaluated in memory by
//! [`CompiledPredicate`](crate::CompiledPredicate) or serialized and handed
//! to a [`Translator`](crate::Translator).
//!
//! # Semantics
//!
//! ```text
//! True                    matches every record
//! And(a, b) / Or(a, b)    boolean combinators
//! Exists(rel, r, p)       some child c of rel, with c bound to slot r, satisfies p
//! ```

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use crate::binding::{Binding, BoundField, BoundRelation};
use crate::op::CompareOp;
use crate::value::Literal;

/// Right-hand side of a leaf: a literal or another field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    /// A literal value.
    Literal(Literal),
    /// Another field, read from its own slot.
    Field(BoundField),
}

/// A composed boolean test over bound fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Matches everything. The tree of a session without conditions.
    #[default]
    True,
    /// Subject contains the target text.
    Contains {
        subject: BoundField,
        target: Operand,
        /// Target must appear delimited by whitespace or the string ends.
        whole_words: bool,
        case_sensitive: bool,
    },
    /// Subject starts with the target text.
    StartsWith {
        subject: BoundField,
        target: Operand,
        case_sensitive: bool,
    },
    /// Subject ends with the target text.
    EndsWith {
        subject: BoundField,
        target: Operand,
        case_sensitive: bool,
    },
    /// Subject equals the target. Case sensitivity applies to text only.
    Equals {
        subject: BoundField,
        target: Operand,
        case_sensitive: bool,
    },
    /// Ordered comparison of the subject against a bound.
    Compare {
        subject: BoundField,
        op: CompareOp,
        bound: Operand,
    },
    /// Subject's phonetic code is one of `codes`.
    SoundsLike {
        subject: BoundField,
        codes: Vec<String>,
        reversed: bool,
    },
    /// Both sides match.
    And(Box<Predicate>, Box<Predicate>),
    /// Either side matches.
    Or(Box<Predicate>, Box<Predicate>),
    /// Some child along `relation`, bound to `binding`, satisfies `predicate`.
    Exists {
        relation: BoundRelation,
        binding: Binding,
        predicate: Box<Predicate>,
    },
}

impl Predicate {
    /// Returns `true` for the match-all tree.
    pub fn is_true(&self) -> bool {
        matches!(self, Predicate::True)
    }

    /// Conjunction, with `True` as identity.
    pub fn and(self, other: Predicate) -> Predicate {
        match (self, other) {
            (Predicate::True, p) | (p, Predicate::True) => p,
            (a, b) => Predicate::And(Box::new(a), Box::new(b)),
        }
    }

    /// Disjunction of every fragment, or `None` when there are none.
    pub fn or_all(fragments: impl IntoIterator<Item = Predicate>) -> Option<Predicate> {
        fragments
            .into_iter()
            .reduce(|acc, next| Predicate::Or(Box::new(acc), Box::new(next)))
    }

    /// Conjunction of every fragment; `True` when there are none.
    pub fn and_all(fragments: impl IntoIterator<Item = Predicate>) -> Predicate {
        fragments.into_iter().fold(Predicate::True, Predicate::and)
    }

    /// Number of leaves in the tree.
    pub fn leaf_count(&self) -> usize {
        match self {
            Predicate::True => 0,
            Predicate::And(a, b) | Predicate::Or(a, b) => a.leaf_count() + b.leaf_count(),
            Predicate::Exists { predicate, .. } => predicate.leaf_count(),
            _ => 1,
        }
    }

    /// Returns every slot referenced but not in scope, given that `root`
    /// is bound by the caller.
    ///
    /// A predicate is fit to hand to a translator when this is empty.
    pub fn unbound(&self, root: Binding) -> Vec<Binding> {
        let mut scope = vec![root];
        let mut unbound = BTreeSet::new();
        self.collect_unbound(&mut scope, &mut unbound);
        unbound.into_iter().collect()
    }

    fn collect_unbound(&self, scope: &mut Vec<Binding>, unbound: &mut BTreeSet<Binding>) {
        fn check(scope: &[Binding], field: &BoundField, unbound: &mut BTreeSet<Binding>) {
            if !scope.contains(&field.binding) {
                unbound.insert(field.binding);
            }
        }
        match self {
            Predicate::True => {}
            Predicate::Contains {
                subject, target, ..
            }
            | Predicate::StartsWith {
                subject, target, ..
            }
            | Predicate::EndsWith {
                subject, target, ..
            }
            | Predicate::Equals {
                subject, target, ..
            }
            | Predicate::Compare {
                subject,
                bound: target,
                ..
            } => {
                check(scope, subject, unbound);
                if let Operand::Field(field) = target {
                    check(scope, field, unbound);
                }
            }
            Predicate::SoundsLike { subject, .. } => check(scope, subject, unbound),
            Predicate::And(a, b) | Predicate::Or(a, b) => {
                a.collect_unbound(scope, unbound);
                b.collect_unbound(scope, unbound);
            }
            Predicate::Exists {
                relation,
                binding,
                predicate,
            } => {
                if !scope.contains(&relation.binding) {
                    unbound.insert(relation.binding);
                }
                scope.push(*binding);
                predicate.collect_unbound(scope, unbound);
                scope.pop();
            }
        }
    }
}

impl fmt::Display for BoundField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.binding, self.name)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Field(field) => write!(f, "{field}"),
            Operand::Literal(Literal::String(s)) => write!(f, "{s:?}"),
            Operand::Literal(Literal::Number(n)) => write!(f, "{}", n.to_f64()),
            Operand::Literal(Literal::Timestamp(t)) => write!(f, "@{}", t.as_millis()),
            Operand::Literal(Literal::Enum(d)) => write!(f, "#{d}"),
            Operand::Literal(Literal::Bool(b)) => write!(f, "{b}"),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let case = |sensitive: bool| if sensitive { "" } else { "~" };
        match self {
            Predicate::True => f.write_str("true"),
            Predicate::Contains {
                subject,
                target,
                whole_words,
                case_sensitive,
            } => {
                let op = if *whole_words { "contains-word" } else { "contains" };
                write!(f, "{subject} {op}{} {target}", case(*case_sensitive))
            }
            Predicate::StartsWith {
                subject,
                target,
                case_sensitive,
            } => write!(f, "{subject} starts-with{} {target}", case(*case_sensitive)),
            Predicate::EndsWith {
                subject,
                target,
                case_sensitive,
            } => write!(f, "{subject} ends-with{} {target}", case(*case_sensitive)),
            Predicate::Equals {
                subject,
                target,
                case_sensitive,
            } => write!(f, "{subject} ={} {target}", case(*case_sensitive)),
            Predicate::Compare { subject, op, bound } => write!(f, "{subject} {op} {bound}"),
            Predicate::SoundsLike {
                subject,
                codes,
                reversed,
            } => {
                let op = if *reversed { "sounds-like-rev" } else { "sounds-like" };
                write!(f, "{subject} {op} [{}]", codes.join(", "))
            }
            Predicate::And(a, b) => write!(f, "({a} and {b})"),
            Predicate::Or(a, b) => write!(f, "({a} or {b})"),
            Predicate::Exists {
                relation,
                binding,
                predicate,
            } => write!(
                f,
                "exists {binding} in {}.{}: {predicate}",
                relation.binding, relation.name
            ),
        }
    }
}

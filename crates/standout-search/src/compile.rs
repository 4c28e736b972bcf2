//! In-memory evaluation of a predicate tree.
//!
//! [`CompiledPredicate::compile`] walks a [`Predicate`] once and prepares
//! everything that does not depend on the record: case-folded terms,
//! whole-word matchers and phonetic codes. Evaluation then reads field
//! values through [`Searchable`] from an environment indexed by binding slot.

use std::borrow::Cow;
use std::cmp::Ordering;

use regex::{Regex, RegexBuilder};

use crate::binding::BoundField;
use crate::error::{Result, SearchError};
use crate::op::CompareOp;
use crate::phonetic::phonetic_code;
use crate::predicate::{Operand, Predicate};
use crate::traits::Searchable;
use crate::value::{Literal, Value};

/// A predicate prepared for repeated in-memory evaluation.
#[derive(Debug)]
pub struct CompiledPredicate {
    root: Node,
    slots: usize,
}

#[derive(Debug, Clone)]
struct Slot {
    depth: usize,
    name: String,
}

#[derive(Debug, Clone, Copy)]
enum TextOp {
    Contains,
    StartsWith,
    EndsWith,
}

#[derive(Debug)]
enum Text {
    /// Folded already when the comparison ignores case.
    Literal(String),
    Field(Slot),
}

#[derive(Debug)]
enum Word {
    Pattern(Regex),
    Field(Slot),
}

#[derive(Debug)]
enum Bound {
    Literal(Literal),
    Field(Slot),
}

#[derive(Debug)]
enum Node {
    True,
    Text {
        op: TextOp,
        subject: Slot,
        target: Text,
        case_sensitive: bool,
    },
    Word {
        subject: Slot,
        target: Word,
        case_sensitive: bool,
    },
    Equals {
        subject: Slot,
        target: Bound,
        case_sensitive: bool,
    },
    Compare {
        subject: Slot,
        op: CompareOp,
        bound: Bound,
    },
    SoundsLike {
        subject: Slot,
        codes: Vec<String>,
        reversed: bool,
    },
    And(Box<Node>, Box<Node>),
    Or(Box<Node>, Box<Node>),
    Exists {
        parent: usize,
        relation: String,
        slot: usize,
        node: Box<Node>,
    },
}

impl CompiledPredicate {
    /// Prepares `predicate` for evaluation against records bound to the root slot.
    pub fn compile(predicate: &Predicate) -> Result<Self> {
        let mut slots = 1;
        let root = compile_node(predicate, &mut slots)?;
        tracing::debug!(
            leaves = predicate.leaf_count(),
            slots,
            "compiled search predicate"
        );
        Ok(CompiledPredicate { root, slots })
    }

    /// Tests one record.
    pub fn matches<T: Searchable>(&self, record: &T) -> bool {
        self.matches_dyn(record)
    }

    /// Tests one type-erased record.
    pub fn matches_dyn(&self, record: &dyn Searchable) -> bool {
        let mut env: Vec<Option<&dyn Searchable>> = vec![None; self.slots];
        env[0] = Some(record);
        self.root.eval(&mut env)
    }
}

fn slot(field: &BoundField, slots: &mut usize) -> Slot {
    *slots = (*slots).max(field.binding.depth() + 1);
    Slot {
        depth: field.binding.depth(),
        name: field.name.clone(),
    }
}

fn fold(text: &str, case_sensitive: bool) -> Cow<'_, str> {
    if case_sensitive {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.to_lowercase())
    }
}

pub(crate) fn word_pattern(term: &str, case_sensitive: bool) -> Result<Regex> {
    let pattern = format!(r"(?:^|\s){}(?:\s|$)", regex::escape(term));
    Ok(RegexBuilder::new(&pattern)
        .case_insensitive(!case_sensitive)
        .build()?)
}

/// Whether `word` occurs in `text` delimited by whitespace or the ends of
/// `text`. Matches what [`word_pattern`] accepts; an empty word never matches.
fn contains_word(text: &str, word: &str) -> bool {
    if word.is_empty() {
        return false;
    }
    text.char_indices()
        .map(|(start, _)| start)
        .filter(|&start| text[start..].starts_with(word))
        .any(|start| {
            let before = text[..start].chars().next_back();
            let after = text[start + word.len()..].chars().next();
            before.map_or(true, char::is_whitespace) && after.map_or(true, char::is_whitespace)
        })
}

fn text_target(target: &Operand, case_sensitive: bool, slots: &mut usize) -> Result<Text> {
    match target {
        Operand::Literal(Literal::String(term)) => {
            Ok(Text::Literal(fold(term, case_sensitive).into_owned()))
        }
        Operand::Literal(other) => Err(SearchError::InvalidArgument(format!(
            "text operator needs a string operand, got a {} literal",
            other.kind()
        ))),
        Operand::Field(field) => Ok(Text::Field(slot(field, slots))),
    }
}

fn bound(target: &Operand, case_sensitive: bool, slots: &mut usize) -> Bound {
    match target {
        Operand::Literal(Literal::String(s)) => {
            Bound::Literal(Literal::String(fold(s, case_sensitive).into_owned()))
        }
        Operand::Literal(literal) => Bound::Literal(literal.clone()),
        Operand::Field(field) => Bound::Field(slot(field, slots)),
    }
}

fn compile_node(predicate: &Predicate, slots: &mut usize) -> Result<Node> {
    let text = |op, subject: &BoundField, target: &Operand, cs: bool, slots: &mut usize| {
        Ok::<_, SearchError>(Node::Text {
            op,
            subject: slot(subject, slots),
            target: text_target(target, cs, slots)?,
            case_sensitive: cs,
        })
    };

    Ok(match predicate {
        Predicate::True => Node::True,
        Predicate::Contains {
            subject,
            target,
            whole_words: false,
            case_sensitive,
        } => text(TextOp::Contains, subject, target, *case_sensitive, slots)?,
        Predicate::Contains {
            subject,
            target,
            whole_words: true,
            case_sensitive,
        } => {
            let target = match target {
                Operand::Literal(Literal::String(term)) => {
                    Word::Pattern(word_pattern(term, *case_sensitive)?)
                }
                Operand::Literal(other) => {
                    return Err(SearchError::InvalidArgument(format!(
                        "text operator needs a string operand, got a {} literal",
                        other.kind()
                    )))
                }
                Operand::Field(field) => Word::Field(slot(field, slots)),
            };
            Node::Word {
                subject: slot(subject, slots),
                target,
                case_sensitive: *case_sensitive,
            }
        }
        Predicate::StartsWith {
            subject,
            target,
            case_sensitive,
        } => text(TextOp::StartsWith, subject, target, *case_sensitive, slots)?,
        Predicate::EndsWith {
            subject,
            target,
            case_sensitive,
        } => text(TextOp::EndsWith, subject, target, *case_sensitive, slots)?,
        Predicate::Equals {
            subject,
            target,
            case_sensitive,
        } => Node::Equals {
            subject: slot(subject, slots),
            target: bound(target, *case_sensitive, slots),
            case_sensitive: *case_sensitive,
        },
        Predicate::Compare {
            subject,
            op,
            bound: target,
        } => Node::Compare {
            subject: slot(subject, slots),
            op: *op,
            bound: bound(target, true, slots),
        },
        Predicate::SoundsLike {
            subject,
            codes,
            reversed,
        } => Node::SoundsLike {
            subject: slot(subject, slots),
            codes: codes.iter().map(|c| c.to_ascii_uppercase()).collect(),
            reversed: *reversed,
        },
        Predicate::And(a, b) => Node::And(
            Box::new(compile_node(a, slots)?),
            Box::new(compile_node(b, slots)?),
        ),
        Predicate::Or(a, b) => Node::Or(
            Box::new(compile_node(a, slots)?),
            Box::new(compile_node(b, slots)?),
        ),
        Predicate::Exists {
            relation,
            binding,
            predicate,
        } => {
            *slots = (*slots).max(binding.depth() + 1);
            Node::Exists {
                parent: relation.binding.depth(),
                relation: relation.name.clone(),
                slot: binding.depth(),
                node: Box::new(compile_node(predicate, slots)?),
            }
        }
    })
}

fn read<'r>(env: &[Option<&'r dyn Searchable>], slot: &Slot) -> Value<'r> {
    match env.get(slot.depth).copied().flatten() {
        Some(record) => record.field_value(&slot.name),
        None => Value::None,
    }
}

fn equal_values(left: Value<'_>, right: Value<'_>, case_sensitive: bool) -> bool {
    match (left, right) {
        (Value::String(a), Value::String(b)) => fold(a, case_sensitive) == fold(b, case_sensitive),
        (a, b) => a.compare(&b) == Some(Ordering::Equal),
    }
}

impl Node {
    fn eval<'r>(&self, env: &mut Vec<Option<&'r dyn Searchable>>) -> bool {
        match self {
            Node::True => true,
            Node::Text {
                op,
                subject,
                target,
                case_sensitive,
            } => {
                let value = read(env, subject);
                let (haystack, needle) = match target {
                    Text::Literal(term) => {
                        let haystack = match value {
                            Value::String(s) => s,
                            Value::None => "",
                            _ => return false,
                        };
                        (fold(haystack, *case_sensitive), Cow::Borrowed(term.as_str()))
                    }
                    Text::Field(other) => match (value, read(env, other)) {
                        (Value::String(a), Value::String(b)) => {
                            (fold(a, *case_sensitive), fold(b, *case_sensitive))
                        }
                        _ => return false,
                    },
                };
                match op {
                    TextOp::Contains => haystack.contains(needle.as_ref()),
                    TextOp::StartsWith => haystack.starts_with(needle.as_ref()),
                    TextOp::EndsWith => haystack.ends_with(needle.as_ref()),
                }
            }
            Node::Word {
                subject,
                target,
                case_sensitive,
            } => {
                let value = read(env, subject);
                match target {
                    Word::Pattern(pattern) => pattern.is_match(value.as_str().unwrap_or_default()),
                    Word::Field(other) => match (value, read(env, other)) {
                        (Value::String(a), Value::String(b)) => contains_word(
                            &fold(a, *case_sensitive),
                            &fold(b, *case_sensitive),
                        ),
                        _ => false,
                    },
                }
            }
            Node::Equals {
                subject,
                target,
                case_sensitive,
            } => {
                let value = read(env, subject);
                match target {
                    Bound::Literal(literal) => {
                        equal_values(value, literal.as_value(), *case_sensitive)
                    }
                    Bound::Field(other) => {
                        let other = read(env, other);
                        !value.is_none()
                            && !other.is_none()
                            && equal_values(value, other, *case_sensitive)
                    }
                }
            }
            Node::Compare { subject, op, bound } => {
                let value = read(env, subject);
                let ordering = match bound {
                    Bound::Literal(literal) => value.compare(&literal.as_value()),
                    Bound::Field(other) => value.compare(&read(env, other)),
                };
                ordering.is_some_and(|o| op.eval_ordering(o))
            }
            Node::SoundsLike {
                subject,
                codes,
                reversed,
            } => match read(env, subject) {
                Value::String(s) => {
                    let code = phonetic_code(s, *reversed).to_ascii_uppercase();
                    !code.is_empty() && codes.contains(&code)
                }
                _ => false,
            },
            Node::And(a, b) => a.eval(env) && b.eval(env),
            Node::Or(a, b) => a.eval(env) || b.eval(env),
            Node::Exists {
                parent,
                relation,
                slot,
                node,
            } => {
                let Some(parent) = env.get(*parent).copied().flatten() else {
                    return false;
                };
                let Some(children) = parent.children(relation) else {
                    return false;
                };
                let saved = env[*slot];
                let mut found = false;
                for child in children {
                    env[*slot] = Some(child);
                    if node.eval(env) {
                        found = true;
                        break;
                    }
                }
                env[*slot] = saved;
                found
            }
        }
    }
}

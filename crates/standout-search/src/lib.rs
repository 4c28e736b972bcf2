//! Search - fluent predicate composition for Rust struct collections.
//!
//! Search lets callers name one or more fields of a record type and chain
//! operators over them. Each call contributes one fragment to a single
//! predicate tree, which is evaluated only when results are consumed:
//!
//! - Text operators: contains (anywhere or whole words), starts with, ends
//!   with, equals, against literals or other fields
//! - Ordered comparisons over numbers and timestamps: greater than, less
//!   than, strictly between
//! - Phonetic matching with Soundex and reverse Soundex
//! - Existential filters over child collections, nestable
//! - Hit-count ranking and Levenshtein distance projections, both searchable
//!   again
//! - Ordering, limit and offset
//!
//! # Quick Start
//!
//! ```rust
//! use standout_search::prelude::*;
//!
//! #[derive(Searchable)]
//! struct Person {
//!     #[search(String)]
//!     first_name: String,
//!     #[search(String)]
//!     last_name: Option<String>,
//!     #[search(Number)]
//!     age: u32,
//! }
//!
//! let people = vec![
//!     Person { first_name: "Ada".into(), last_name: Some("Lovelace".into()), age: 36 },
//!     Person { first_name: "Alan".into(), last_name: Some("Turing".into()), age: 41 },
//!     Person { first_name: "Grace".into(), last_name: None, age: 85 },
//! ];
//!
//! let found = search(&people, &[Person::FIRST_NAME, Person::LAST_NAME, Person::AGE])?
//!     .containing(["love", "tur"])
//!     .less_than(40)
//!     .to_vec()?;
//! assert_eq!(found.len(), 1);
//! assert_eq!(found[0].first_name, "Ada");
//! # Ok::<(), standout_search::SearchError>(())
//! ```
//!
//! # Combination Rules
//!
//! ```text
//! one call, fields F, terms T   =>  OR over every (f, t)
//! chained calls                 =>  AND of the calls
//! no usable field or term       =>  the call changes nothing
//! ```
//!
//! Blank terms are dropped. Text operators use the selected string fields,
//! comparisons the selected number and timestamp fields; `equal_to` uses
//! every selected field, and a literal of another kind never matches.
//!
//! # Field Kinds
//!
//! | Kind | Operators |
//! |------|-----------|
//! | String | `containing`, `starting_with`, `ending_with`, `equal_to`, `sounds_like`, field variants |
//! | Number | `greater_than`, `less_than`, `between`, `equal_to` |
//! | Timestamp | `greater_than`, `less_than`, `between`, `equal_to` |
//! | Enum | `equal_to` |
//! | Bool | `equal_to` |
//!
//! # Evaluation
//!
//! In memory, the predicate is compiled once per session into a
//! [`CompiledPredicate`]. A [`Translator`] instead receives the finished
//! [`Predicate`], a serde-serializable tree, and runs it against its own
//! store.

mod binding;
mod children;
mod compile;
mod criteria;
mod distance;
mod error;
mod field;
mod op;
mod options;
mod ordering;
mod phonetic;
mod predicate;
mod ranked;
mod session;
mod source;
mod traits;
mod value;

// Re-export public API
pub use binding::{Binding, BoundField, BoundRelation, Rebinder};
pub use children::ChildQuantifier;
pub use compile::CompiledPredicate;
pub use criteria::{Criteria, Filter};
pub use distance::{levenshtein, levenshtein_opt, DistanceRequest, EditDistance};
pub use error::{Result, SearchError};
pub use field::{fields_of_kind, Field, FieldKind, Relation};
pub use op::CompareOp;
pub use options::{CaseSensitivity, Matching, SearchOptions};
pub use ordering::{compare_values, Dir, OrderBy};
pub use phonetic::{phonetic_code, reverse_soundex, soundex};
pub use predicate::{Operand, Predicate};
pub use ranked::Ranked;
pub use session::{search, search_all, search_translated, Session};
pub use source::{Evaluator, Matches, Translator};
pub use traits::{children, Children, SearchEnum, SearchText, SearchTimestamp, Searchable};
pub use value::{Literal, Number, Timestamp, Value};

#[cfg(feature = "derive")]
pub use standout_search_macros::Searchable;

/// The types needed to open and refine a search.
pub mod prelude {
    pub use crate::{
        search, search_all, search_translated, CaseSensitivity, Criteria, Dir, Field, FieldKind,
        Filter, Matching, Relation, Searchable,
    };
}

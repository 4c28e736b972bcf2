//! Comparison options shared by every operator of a search.
//!
//! Options are plain data with serde support so applications can keep their
//! defaults in their own configuration files:
//!
//! ```
//! use standout_search::{CaseSensitivity, Matching, SearchOptions};
//!
//! let options = SearchOptions::default()
//!     .case(CaseSensitivity::Sensitive)
//!     .matching(Matching::WholeWords);
//! assert!(options.is_case_sensitive());
//! ```

use serde::{Deserialize, Serialize};

/// How text is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseSensitivity {
    /// Letters compare regardless of case.
    #[default]
    Insensitive,
    /// Letters must match exactly.
    Sensitive,
}

/// How `containing` matches a term inside a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Matching {
    /// The term may occur anywhere, including inside a word.
    #[default]
    AnyOccurrence,
    /// The term must occur delimited by whitespace or the ends of the value.
    WholeWords,
}

/// Options of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Case sensitivity of every text comparison and of hit counting.
    pub case: CaseSensitivity,
    /// Matching mode of `containing`.
    pub matching: Matching,
}

impl SearchOptions {
    /// Sets the case sensitivity.
    pub fn case(mut self, case: CaseSensitivity) -> Self {
        self.case = case;
        self
    }

    /// Sets the matching mode.
    pub fn matching(mut self, matching: Matching) -> Self {
        self.matching = matching;
        self
    }

    /// Returns `true` when text compares case-sensitively.
    pub fn is_case_sensitive(&self) -> bool {
        self.case == CaseSensitivity::Sensitive
    }

    /// Returns `true` when `containing` matches whole words only.
    pub fn is_whole_words(&self) -> bool {
        self.matching == Matching::WholeWords
    }
}

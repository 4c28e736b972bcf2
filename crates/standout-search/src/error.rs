//! Error types for the search crate.

use thiserror::Error;

/// Errors that can occur when building or consuming a search.
#[derive(Debug, Error)]
pub enum SearchError {
    /// A field or relation the record type does not register, or no
    /// selector where at least one is required.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A terminal result was requested before the request was complete.
    #[error("incomplete request: {0}")]
    IncompleteRequest(&'static str),

    /// A whole-word matcher could not be built for a term.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// A translating source failed to execute the predicate.
    #[error("translation failed: {0}")]
    Translation(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl SearchError {
    /// Wraps an error returned by a [`Translator`](crate::Translator).
    pub fn translation(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        SearchError::Translation(err.into())
    }
}

/// Result type for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

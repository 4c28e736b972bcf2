//! Where a session's records come from.
//!
//! A session evaluates its predicate either in memory, over a slice, or by
//! handing the finished tree to a [`Translator`] that runs it against some
//! other store (a database, a search index) and returns the matches.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::binding::Binding;
use crate::compile::CompiledPredicate;
use crate::error::{Result, SearchError};
use crate::predicate::Predicate;
use crate::traits::Searchable;

/// Iterator over the records a session matched.
pub type Matches<'s, T> = Box<dyn Iterator<Item = &'s T> + 's>;

/// Executes a predicate against a store other than an in-memory slice.
///
/// The predicate is closed: every slot it refers to is [`Binding::ROOT`]
/// (the record being tested) or introduced by an enclosing
/// [`Predicate::Exists`]. It serializes with serde, so it can also be
/// shipped to another process.
///
/// ```
/// use standout_search::{Predicate, Result, Translator};
///
/// struct Remote {
///     cached: Vec<String>,
/// }
///
/// impl Translator<String> for Remote {
///     fn fetch(&self, predicate: &Predicate) -> Result<Vec<&String>> {
///         // A real translator would render `predicate` into a query.
///         let _ = predicate.to_string();
///         Ok(self.cached.iter().collect())
///     }
/// }
/// ```
pub trait Translator<T>: Sync {
    /// Returns every record satisfying `predicate`.
    ///
    /// Errors from the store should be wrapped with
    /// [`SearchError::translation`].
    fn fetch(&self, predicate: &Predicate) -> Result<Vec<&T>>;
}

/// The evaluation strategy of a session.
pub enum Evaluator<'s, T> {
    /// Filter a slice by compiling the predicate.
    InMemory(&'s [T]),
    /// Hand the predicate to a translator.
    Translated(&'s dyn Translator<T>),
}

impl<'s, T: Searchable> Evaluator<'s, T> {
    /// Returns every record of the source matching `predicate`, in source
    /// order.
    ///
    /// In-memory evaluation compiles the predicate at most once per `cache`
    /// and filters lazily.
    pub(crate) fn run(
        &self,
        predicate: &Predicate,
        cache: &OnceCell<Arc<CompiledPredicate>>,
    ) -> Result<Matches<'s, T>> {
        match *self {
            Evaluator::InMemory(items) => {
                let compiled = cache
                    .get_or_try_init(|| CompiledPredicate::compile(predicate).map(Arc::new))?;
                let compiled = Arc::clone(compiled);
                Ok(Box::new(
                    items.iter().filter(move |item| compiled.matches(*item)),
                ))
            }
            Evaluator::Translated(translator) => {
                let unbound = predicate.unbound(Binding::ROOT);
                if !unbound.is_empty() {
                    let slots: Vec<String> = unbound.iter().map(ToString::to_string).collect();
                    return Err(SearchError::InvalidArgument(format!(
                        "predicate refers to unbound slots {}",
                        slots.join(", ")
                    )));
                }
                tracing::debug!(
                    leaves = predicate.leaf_count(),
                    predicate = %predicate,
                    "handing predicate to translator"
                );
                Ok(Box::new(translator.fetch(predicate)?.into_iter()))
            }
        }
    }
}

impl<T> Clone for Evaluator<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Evaluator<'_, T> {}

impl<T> fmt::Debug for Evaluator<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evaluator::InMemory(items) => f.debug_tuple("InMemory").field(&items.len()).finish(),
            Evaluator::Translated(_) => f.write_str("Translated"),
        }
    }
}

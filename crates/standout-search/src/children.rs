//! Existential filters over child collections.

use crate::binding::BoundRelation;
use crate::criteria::{Criteria, Filter};
use crate::error::Result;
use crate::field::{validate_relations, Field, Relation};
use crate::predicate::Predicate;
use crate::session::Session;
use crate::source::Matches;
use crate::traits::Searchable;

/// Builds a condition on the children of the records its parent filters.
///
/// Opened by [`Filter::search_children`]. Child fields are selected with
/// [`with`](Self::with), after which every [`Filter`] operator applies to
/// one child at a time. [`end`](Self::end) returns the parent with
/// "some child along one of the relations satisfies every condition"
/// conjoined.
///
/// A quantifier is itself a [`Filter`], so quantifiers nest:
///
/// ```ignore
/// let found = search(&orders, &[])?
///     .search_children(&[Order::LINES])?
///     .search_children(&[Line::TAGS])?
///     .with(&[Tag::LABEL])?
///     .equal_to(["fragile"])
///     .end()
///     .end()
///     .to_vec()?;
/// ```
pub struct ChildQuantifier<P, C> {
    parent: P,
    relations: Vec<BoundRelation>,
    criteria: Criteria<C>,
}

impl<P: Filter, C: Searchable> ChildQuantifier<P, C> {
    pub(crate) fn new(parent: P, relations: &[Relation<P::Record, C>]) -> Result<Self> {
        validate_relations(relations)?;
        let binding = parent.criteria().binding();
        let criteria = Criteria::detached(binding.child(), parent.criteria().options());
        let relations = relations
            .iter()
            .map(|relation| BoundRelation {
                binding,
                name: relation.name().to_string(),
            })
            .collect();
        Ok(ChildQuantifier {
            parent,
            relations,
            criteria,
        })
    }

    /// Selects the child fields subsequent operators apply to.
    ///
    /// May be called again to switch fields; conditions already added are kept.
    pub fn with(mut self, fields: &[Field<C>]) -> Result<Self> {
        self.criteria.select(fields)?;
        Ok(self)
    }

    /// Closes the quantifier and returns the parent.
    ///
    /// Without child conditions the parent is returned unchanged.
    pub fn end(self) -> P {
        let ChildQuantifier {
            mut parent,
            relations,
            criteria,
        } = self;
        let binding = criteria.binding();
        let predicate = criteria.into_predicate();
        let fragment = if predicate.is_true() {
            None
        } else {
            Predicate::or_all(relations.into_iter().map(|relation| Predicate::Exists {
                relation,
                binding,
                predicate: Box::new(predicate.clone()),
            }))
        };
        parent.criteria_mut().and("search_children", fragment);
        parent
    }
}

impl<P: Filter, C: Searchable> Filter for ChildQuantifier<P, C> {
    type Record = C;

    fn criteria(&self) -> &Criteria<C> {
        &self.criteria
    }

    fn criteria_mut(&mut self) -> &mut Criteria<C> {
        &mut self.criteria
    }
}

impl<'s, T: Searchable, C: Searchable> ChildQuantifier<Session<'s, T>, C> {
    /// Closes the quantifier and collects the matching parents.
    pub fn to_vec(self) -> Result<Vec<&'s T>> {
        self.end().to_vec()
    }

    /// Closes the quantifier and iterates the matching parents.
    pub fn iter(self) -> Result<Matches<'s, T>> {
        self.end().iter()
    }
}

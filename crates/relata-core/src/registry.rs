//! The relation registry.
//!
//! Whoever builds relations owns a registry and creates base relations
//! through it. Complement asks the registry for its universe: the union of
//! the extensions of every *other* registered relation of the operand's
//! arity, recomputed at each evaluation. The complement is therefore
//! open-world and relative to what is currently known, and it is empty when
//! no other relation of that arity exists.
//!
//! Derived relations are never registered, so a complement cannot end up in
//! its own universe.

use crate::binding::BoundView;
use crate::derived::{self, Combinator};
use crate::error::Result;
use crate::extension::Extension;
use crate::properties::PropertySet;
use crate::relation::{BinaryRelation, Relation};
use parking_lot::RwLock;
use std::sync::Arc;

/// A shared, clonable registry of base relations.
#[derive(Clone, Default)]
pub struct RelationRegistry {
    relations: Arc<RwLock<Vec<Relation>>>,
}

impl RelationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and register a base relation.
    pub fn new_relation(&self, name: impl Into<String>, arity: usize) -> Result<Relation> {
        let relation = Relation::new(name, arity)?;
        self.relations.write().push(relation.clone());
        Ok(relation)
    }

    /// Create and register a binary relation with declared properties.
    pub fn new_binary_relation(
        &self,
        name: impl Into<String>,
        properties: PropertySet,
    ) -> Result<BinaryRelation> {
        let relation = BinaryRelation::new(name, properties)?;
        self.relations.write().push(relation.as_relation().clone());
        Ok(relation)
    }

    /// Register every relation of `other`, in order.
    pub(crate) fn absorb(&self, other: RelationRegistry) {
        let staged = std::mem::take(&mut *other.relations.write());
        self.relations.write().extend(staged);
    }

    /// First registered relation called `name`. Names need not be unique.
    pub fn get(&self, name: &str) -> Option<Relation> {
        self.relations
            .read()
            .iter()
            .find(|r| r.name() == name)
            .cloned()
    }

    pub fn relations(&self) -> Vec<Relation> {
        self.relations.read().clone()
    }

    pub fn relations_of_arity(&self, arity: usize) -> Vec<Relation> {
        self.relations
            .read()
            .iter()
            .filter(|r| r.arity() == arity)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.relations.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.read().is_empty()
    }

    /// Union of the extensions of every registered relation with the arity
    /// of `of`, except `of` itself.
    pub fn universe(&self, of: &Relation) -> Extension {
        let mut universe = Extension::new(of.arity());
        for relation in self.relations_of_arity(of.arity()) {
            if relation.same_as(of) {
                continue;
            }
            for tuple in relation.extension().iter() {
                universe.push(tuple.clone());
            }
        }
        universe
    }

    /// Everything in the universe of `operand` that `operand` does not match.
    pub fn complement(&self, operand: impl Into<BoundView>) -> Result<Relation> {
        derived::derive(Combinator::Complement, vec![operand.into()], Some(self))
    }

    /// Build any combinator over explicit operands.
    ///
    /// This is the general entry point: it enforces the operand rules of each
    /// combinator (one operand for complement, two binary operands for
    /// composition, one for converse, at least one for union and
    /// intersection).
    pub fn derive(&self, combinator: Combinator, operands: Vec<BoundView>) -> Result<Relation> {
        derived::derive(combinator, operands, Some(self))
    }
}

impl std::fmt::Debug for RelationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelationRegistry")
            .field("relations", &self.len())
            .finish()
    }
}

//! Extensions: the set of tuples a relation currently contains.
//!
//! The tuple set sits behind an `Arc`, so taking a snapshot is O(1) and a
//! write only copies the set when a snapshot is still alive. There is no
//! index: [`Extension::values_at`] is a linear scan, O(|extension|) per call.

use crate::atom::{Atom, Tuple};
use crate::error::{RelationError, Result};
use indexmap::IndexSet;
use std::sync::Arc;

pub(crate) type TupleSet = IndexSet<Tuple, ahash::RandomState>;
pub(crate) type AtomSet = IndexSet<Atom, ahash::RandomState>;

/// An arity-homogeneous, insertion-ordered set of tuples.
#[derive(Debug, Clone)]
pub struct Extension {
    arity: usize,
    tuples: Arc<TupleSet>,
}

impl Extension {
    pub fn new(arity: usize) -> Self {
        Self {
            arity,
            tuples: Arc::new(TupleSet::default()),
        }
    }

    /// Build an extension, rejecting any tuple whose length differs from `arity`.
    pub fn from_tuples<I, T>(arity: usize, tuples: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<Tuple>,
    {
        let mut ext = Self::new(arity);
        for tuple in tuples {
            ext.insert("<extension>", tuple.into())?;
        }
        Ok(ext)
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    pub fn contains(&self, values: &[Atom]) -> bool {
        self.tuples.contains(values)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tuple> + '_ {
        self.tuples.iter()
    }

    /// Tuples whose slot at `position` equals `value`.
    pub fn values_at<'a>(
        &'a self,
        position: usize,
        value: &'a Atom,
    ) -> impl Iterator<Item = &'a Tuple> + 'a {
        self.tuples
            .iter()
            .filter(move |t| t.get(position) == Some(value))
    }

    /// Every atom occurring in some tuple, in first-seen order.
    pub fn atoms(&self) -> impl Iterator<Item = &Atom> + '_ {
        self.tuples.iter().flat_map(|t| t.iter())
    }

    /// Insert a tuple. Returns `false` if it was already present.
    pub(crate) fn insert(&mut self, relation: &str, tuple: Tuple) -> Result<bool> {
        if tuple.len() != self.arity {
            return Err(RelationError::ArityMismatch {
                relation: relation.to_string(),
                expected: self.arity,
                found: tuple.len(),
            });
        }
        if self.tuples.contains(&tuple) {
            return Ok(false);
        }
        Ok(Arc::make_mut(&mut self.tuples).insert(tuple))
    }

    /// Insert a tuple already known to have the right length.
    pub(crate) fn push(&mut self, tuple: Tuple) -> bool {
        debug_assert_eq!(tuple.len(), self.arity);
        if self.tuples.contains(&tuple) {
            return false;
        }
        Arc::make_mut(&mut self.tuples).insert(tuple)
    }

    pub(crate) fn get_index(&self, index: usize) -> Option<&Tuple> {
        self.tuples.get_index(index)
    }
}

impl PartialEq for Extension {
    /// Set equality: insertion order is irrelevant.
    fn eq(&self, other: &Self) -> bool {
        self.arity == other.arity
            && self.len() == other.len()
            && self.tuples.iter().all(|t| other.tuples.contains(t))
    }
}

impl Eq for Extension {}

impl<'a> IntoIterator for &'a Extension {
    type Item = &'a Tuple;
    type IntoIter = indexmap::set::Iter<'a, Tuple>;

    fn into_iter(self) -> Self::IntoIter {
        self.tuples.iter()
    }
}

// ============================================================================
// Lazy scans over a snapshot
// ============================================================================

/// Lazy scan over a snapshot for tuples with `value` at `position`.
///
/// Owns its snapshot, so it stays valid while the relation keeps growing.
#[derive(Debug, Clone)]
pub struct ValuesAt {
    snapshot: Extension,
    position: usize,
    value: Atom,
    next: usize,
}

impl ValuesAt {
    pub(crate) fn new(snapshot: Extension, position: usize, value: Atom) -> Self {
        Self {
            snapshot,
            position,
            value,
            next: 0,
        }
    }
}

impl Iterator for ValuesAt {
    type Item = Tuple;

    fn next(&mut self) -> Option<Tuple> {
        while let Some(tuple) = self.snapshot.get_index(self.next) {
            self.next += 1;
            if tuple.get(self.position) == Some(&self.value) {
                return Some(tuple.clone());
            }
        }
        None
    }
}

//! Relations: named, fixed-arity sets of tuples.
//!
//! [`Relation`] is a shared handle. Cloning it is cheap and every clone sees
//! the same growing extension, which is what lets derived relations built
//! early keep answering over tuples added later.
//!
//! Insertion is strict ([`Relation::add`] rejects wrong-length tuples) while
//! querying is lenient ([`Relation::is_matched_by`] answers `false` for a
//! wrong argument count). Keep that asymmetry.

use crate::atom::{Atom, Tuple};
use crate::derived::DerivedRelation;
use crate::error::{RelationError, Result};
use crate::extension::{Extension, ValuesAt};
use crate::properties::{self, PropertySet};
use parking_lot::RwLock;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

// ============================================================================
// Relation handle
// ============================================================================

#[derive(Clone)]
pub struct Relation {
    node: Arc<RelationNode>,
}

struct RelationNode {
    name: String,
    arity: usize,
    body: Body,
}

enum Body {
    Stored {
        extension: RwLock<Extension>,
        properties: PropertySet,
    },
    Derived(DerivedRelation),
}

impl Relation {
    /// A base relation with an empty extension.
    pub fn new(name: impl Into<String>, arity: usize) -> Result<Self> {
        Self::stored(name.into(), arity, PropertySet::new())
    }

    fn stored(name: String, arity: usize, properties: PropertySet) -> Result<Self> {
        if arity == 0 {
            return Err(RelationError::InvalidArity { relation: name });
        }
        tracing::debug!(relation = %name, arity, properties = %properties, "new relation");
        Ok(Self {
            node: Arc::new(RelationNode {
                name,
                arity,
                body: Body::Stored {
                    extension: RwLock::new(Extension::new(arity)),
                    properties,
                },
            }),
        })
    }

    pub(crate) fn derived(name: String, derived: DerivedRelation) -> Self {
        let arity = derived.arity();
        tracing::debug!(
            relation = %name,
            arity,
            combinator = %derived.combinator(),
            operands = derived.operands().len(),
            "new derived relation"
        );
        Self {
            node: Arc::new(RelationNode {
                name,
                arity,
                body: Body::Derived(derived),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.node.name
    }

    pub fn arity(&self) -> usize {
        self.node.arity
    }

    pub fn is_derived(&self) -> bool {
        matches!(self.node.body, Body::Derived(_))
    }

    /// Declared properties. Empty for n-ary and derived relations.
    pub fn properties(&self) -> PropertySet {
        match &self.node.body {
            Body::Stored { properties, .. } => *properties,
            Body::Derived(_) => PropertySet::new(),
        }
    }

    /// Handle identity: both handles refer to the same relation.
    pub fn same_as(&self, other: &Relation) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }

    // ========================================================================
    // Insertion
    // ========================================================================

    /// Add one tuple. Re-adding a present tuple is a no-op.
    pub fn add(&self, tuple: impl Into<Tuple>) -> Result<()> {
        self.add_all([tuple])
    }

    /// Add a batch of tuples.
    ///
    /// The batch is all-or-nothing: tuples are checked in order against the
    /// extension as it would be after the earlier ones, and the first failure
    /// discards the whole batch.
    pub fn add_all<I, T>(&self, tuples: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<Tuple>,
    {
        let Body::Stored {
            extension,
            properties,
        } = &self.node.body
        else {
            return Err(RelationError::ReadOnly {
                relation: self.name().to_string(),
            });
        };

        let mut guard = extension.write();
        let mut staged = guard.clone();
        let mut added = 0usize;
        for tuple in tuples {
            let tuple = tuple.into();
            if tuple.len() == 2 && !properties.is_empty() {
                properties.check_insert(self.name(), &tuple[0], &tuple[1], &staged)?;
            }
            if staged.insert(self.name(), tuple)? {
                added += 1;
            }
        }
        *guard = staged;
        tracing::debug!(relation = %self.name(), added, size = guard.len(), "added tuples");
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Membership test. Never fails: a wrong argument count answers `false`.
    pub fn is_matched_by(&self, values: &[Atom]) -> bool {
        if values.len() != self.arity() {
            return false;
        }
        match &self.node.body {
            Body::Stored {
                extension,
                properties,
            } => {
                let extension = extension.read();
                if extension.contains(values) {
                    return true;
                }
                values.len() == 2 && properties.induces(&values[0], &values[1], &extension)
            }
            Body::Derived(derived) => derived.is_matched_by(values),
        }
    }

    /// Row lookup without induction. For a derived relation this is its
    /// membership, which already excludes induced pairs.
    pub(crate) fn has_row(&self, values: &[Atom]) -> bool {
        match &self.node.body {
            Body::Stored { extension, .. } => extension.read().contains(values),
            Body::Derived(derived) => values.len() == self.arity() && derived.is_matched_by(values),
        }
    }

    /// [`Relation::is_matched_by`] for anything tuple-like.
    pub fn test(&self, tuple: impl Into<Tuple>) -> bool {
        self.is_matched_by(&tuple.into())
    }

    /// Lazily keep the candidates this relation matches.
    ///
    /// Candidates are bare values for unary relations and tuples otherwise.
    /// Each call starts a fresh pass over `candidates`.
    pub fn filter<'a, I>(&'a self, candidates: I) -> impl Iterator<Item = I::Item> + 'a
    where
        I: IntoIterator + 'a,
        I::Item: Clone + Into<Tuple>,
    {
        candidates
            .into_iter()
            .filter(move |candidate| self.test(candidate.clone()))
    }

    /// Lazily scan the current extension for tuples with `value` at `position`.
    pub fn values_at(&self, position: usize, value: impl Into<Atom>) -> ValuesAt {
        ValuesAt::new(self.extension(), position, value.into())
    }

    /// The current extension.
    ///
    /// For a base relation this is an O(1) snapshot of the literal tuples.
    /// For a derived relation it is a full evaluation; keep the result to
    /// avoid paying for it on every lookup.
    pub fn extension(&self) -> Extension {
        match &self.node.body {
            Body::Stored { extension, .. } => extension.read().clone(),
            Body::Derived(derived) => derived.evaluate(self.name()),
        }
    }

    pub fn len(&self) -> usize {
        self.extension().len()
    }

    pub fn is_empty(&self) -> bool {
        self.extension().is_empty()
    }
}

impl fmt::Debug for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relation")
            .field("name", &self.name())
            .field("arity", &self.arity())
            .field("derived", &self.is_derived())
            .finish()
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name(), self.arity())
    }
}

// ============================================================================
// BinaryRelation
// ============================================================================

/// A base relation of arity 2 with declared structural properties.
#[derive(Clone, Debug)]
pub struct BinaryRelation {
    relation: Relation,
}

impl BinaryRelation {
    /// Fails with `PropertyConflict` for reflexive+irreflexive or
    /// symmetric+asymmetric.
    pub fn new(name: impl Into<String>, properties: PropertySet) -> Result<Self> {
        let name = name.into();
        properties.validate(&name)?;
        Ok(Self {
            relation: Relation::stored(name, 2, properties)?,
        })
    }

    /// Check the insertion guards for `(a, b)` without inserting.
    pub fn can_add(&self, a: impl Into<Atom>, b: impl Into<Atom>) -> Result<()> {
        let extension = self.relation.extension();
        self.properties()
            .check_insert(self.name(), &a.into(), &b.into(), &extension)
    }

    /// Antisymmetry is not declared, it is checked on the current extension.
    pub fn is_antisymmetric(&self) -> bool {
        properties::is_antisymmetric(&self.relation.extension())
    }

    pub fn as_relation(&self) -> &Relation {
        &self.relation
    }

    pub fn into_relation(self) -> Relation {
        self.relation
    }
}

impl Deref for BinaryRelation {
    type Target = Relation;

    fn deref(&self) -> &Relation {
        &self.relation
    }
}

impl From<BinaryRelation> for Relation {
    fn from(value: BinaryRelation) -> Self {
        value.relation
    }
}

impl AsRef<Relation> for BinaryRelation {
    fn as_ref(&self) -> &Relation {
        &self.relation
    }
}

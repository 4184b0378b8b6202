//! Parameter bindings: calling a relation with variables, wildcards and literals.
//!
//! Calling a relation classifies each argument:
//!
//! - a **free variable** labels a slot; it becomes an output column of the
//!   derived relation and unifies with every other slot carrying the same
//!   label, across all operands of one combinator call;
//! - a **wildcard** leaves the slot unconstrained and drops it;
//! - a **literal** constrains the slot to that atom and drops it.
//!
//! [`Relation::test`] and [`Relation::bind`] are the two explicit entry points.
//! [`Relation::call`] resolves a mixed argument list once: all literals is a
//! membership test, anything else is a [`BoundView`].

use crate::atom::Atom;
use crate::error::{RelationError, Result};
use crate::relation::{BinaryRelation, Relation};
use indexmap::IndexSet;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Variables and bindings
// ============================================================================

/// A free-variable label.
///
/// `Index` variables are what unbound operands get: slot `i` is labelled
/// `Index(i)`, so plain relations passed to the same combinator unify
/// position by position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VarId {
    Named(Arc<str>),
    Index(usize),
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarId::Named(name) => f.write_str(name),
            VarId::Index(i) => write!(f, "#{i}"),
        }
    }
}

/// One argument slot of a call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Binding {
    Var(VarId),
    Wildcard,
    Literal(Atom),
}

/// A named free variable.
pub fn var(name: &str) -> Binding {
    Binding::Var(VarId::Named(Arc::from(name)))
}

/// A positional free variable.
pub fn pos(index: usize) -> Binding {
    Binding::Var(VarId::Index(index))
}

/// The wildcard.
pub fn any() -> Binding {
    Binding::Wildcard
}

/// A literal constraint.
pub fn lit(value: impl Into<Atom>) -> Binding {
    Binding::Literal(value.into())
}

impl From<Atom> for Binding {
    fn from(value: Atom) -> Self {
        Binding::Literal(value)
    }
}

impl From<VarId> for Binding {
    fn from(value: VarId) -> Self {
        Binding::Var(value)
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Var(v) => write!(f, "{v}"),
            Binding::Wildcard => f.write_str("*"),
            Binding::Literal(a) => write!(f, "'{a}'"),
        }
    }
}

// ============================================================================
// ParameterSpec
// ============================================================================

/// The bindings of one operand, one per slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterSpec(Vec<Binding>);

impl ParameterSpec {
    pub fn new(bindings: Vec<Binding>) -> Self {
        Self(bindings)
    }

    /// Slot `i` bound to `Index(i)`.
    pub fn identity(arity: usize) -> Self {
        Self((0..arity).map(pos).collect())
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Distinct free variables, in first-occurrence order.
    pub fn variables(&self) -> Vec<VarId> {
        let mut out: Vec<VarId> = Vec::new();
        for binding in &self.0 {
            if let Binding::Var(v) = binding {
                if !out.contains(v) {
                    out.push(v.clone());
                }
            }
        }
        out
    }

    pub fn is_all_literal(&self) -> bool {
        self.0.iter().all(|b| matches!(b, Binding::Literal(_)))
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity(self.len())
    }

    /// The literal values, if every slot is a literal.
    pub(crate) fn literal_values(&self) -> Option<Vec<Atom>> {
        self.0
            .iter()
            .map(|b| match b {
                Binding::Literal(a) => Some(a.clone()),
                _ => None,
            })
            .collect()
    }
}

impl fmt::Display for ParameterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|b| b.to_string()).collect();
        write!(f, "({})", parts.join(", "))
    }
}

// ============================================================================
// Bound views
// ============================================================================

/// A relation together with the bindings of one call: a combinator operand.
#[derive(Debug, Clone)]
pub struct BoundView {
    relation: Relation,
    spec: ParameterSpec,
}

impl BoundView {
    pub fn relation(&self) -> &Relation {
        &self.relation
    }

    pub fn spec(&self) -> &ParameterSpec {
        &self.spec
    }

    pub(crate) fn identity(relation: Relation) -> Self {
        let spec = ParameterSpec::identity(relation.arity());
        Self { relation, spec }
    }
}

impl fmt::Display for BoundView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.relation.name(), self.spec)
    }
}

impl From<Relation> for BoundView {
    fn from(value: Relation) -> Self {
        BoundView::identity(value)
    }
}

impl From<&Relation> for BoundView {
    fn from(value: &Relation) -> Self {
        BoundView::identity(value.clone())
    }
}

impl From<BinaryRelation> for BoundView {
    fn from(value: BinaryRelation) -> Self {
        BoundView::identity(value.into_relation())
    }
}

impl From<&BinaryRelation> for BoundView {
    fn from(value: &BinaryRelation) -> Self {
        BoundView::identity(value.as_relation().clone())
    }
}

impl From<&BoundView> for BoundView {
    fn from(value: &BoundView) -> Self {
        value.clone()
    }
}

/// Outcome of [`Relation::call`].
#[derive(Debug, Clone)]
pub enum Resolution {
    /// Every argument was a literal: the membership answer.
    Test(bool),
    /// At least one variable or wildcard: an operand for a combinator.
    View(BoundView),
}

impl Resolution {
    pub fn as_test(&self) -> Option<bool> {
        match self {
            Resolution::Test(b) => Some(*b),
            Resolution::View(_) => None,
        }
    }

    pub fn into_view(self) -> Option<BoundView> {
        match self {
            Resolution::Test(_) => None,
            Resolution::View(view) => Some(view),
        }
    }
}

impl Relation {
    /// Bind each slot of this relation. Fails with `ArityMismatch` unless
    /// exactly `arity` bindings are given.
    pub fn bind<I>(&self, args: I) -> Result<BoundView>
    where
        I: IntoIterator,
        I::Item: Into<Binding>,
    {
        let bindings: Vec<Binding> = args.into_iter().map(Into::into).collect();
        if bindings.len() != self.arity() {
            return Err(RelationError::ArityMismatch {
                relation: self.name().to_string(),
                expected: self.arity(),
                found: bindings.len(),
            });
        }
        Ok(BoundView {
            relation: self.clone(),
            spec: ParameterSpec::new(bindings),
        })
    }

    /// Resolve a mixed argument list: all literals is answered immediately,
    /// anything else becomes a bound view.
    pub fn call<I>(&self, args: I) -> Result<Resolution>
    where
        I: IntoIterator,
        I::Item: Into<Binding>,
    {
        let view = self.bind(args)?;
        match view.spec.literal_values() {
            Some(values) => Ok(Resolution::Test(self.is_matched_by(&values))),
            None => Ok(Resolution::View(view)),
        }
    }
}

// ============================================================================
// Correspondence
// ============================================================================

/// The free variables of the operands of one combinator call.
///
/// Iteration order is first occurrence, scanning operands left to right and
/// slots left to right within each operand. This is the column order of the
/// derived relation; unification itself happens during the join.
#[derive(Debug, Clone, Default)]
pub struct Correspondence {
    variables: IndexSet<VarId>,
}

impl Correspondence {
    pub fn from_views(views: &[BoundView]) -> Self {
        let variables = views
            .iter()
            .flat_map(|view| view.spec.bindings())
            .filter_map(|binding| match binding {
                Binding::Var(v) => Some(v.clone()),
                _ => None,
            })
            .collect();
        Self { variables }
    }

    pub fn variables(&self) -> impl Iterator<Item = &VarId> + '_ {
        self.variables.iter()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

//! Derived relations: union, intersection, complement, composition, converse.
//!
//! A derived relation is a view. It owns no tuples; every membership test
//! and every evaluation re-reads the current extensions of its operands, so
//! it keeps up with base relations that grow after it was built. Nothing is
//! memoised: take [`Relation::extension`] once if you need repeated lookups.
//!
//! Output columns are the free variables of the operands in first-occurrence
//! order (operands left to right, slots left to right). Wildcard and literal
//! slots never appear in the output.
//!
//! Operands contribute their enumerated rows, so membership and
//! [`Relation::extension`] always agree. Pairs a binary operand only induces
//! through its declared properties do not enter the join. Complement is the
//! exception: its predicate asks the operand's own `is_matched_by`, so a
//! universe row the operand induces is left out.

use crate::atom::Atom;
use crate::binding::{BoundView, Correspondence, VarId};
use crate::error::{RelationError, Result};
use crate::extension::{AtomSet, Extension};
use crate::join::{self, Assignment};
use crate::registry::RelationRegistry;
use crate::relation::Relation;
use std::fmt;
use std::ops::ControlFlow;

// ============================================================================
// Combinators
// ============================================================================

/// The five combinators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    Union,
    Intersection,
    Complement,
    Composition,
    Converse,
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Combinator::Union => "union",
            Combinator::Intersection => "intersection",
            Combinator::Complement => "complement",
            Combinator::Composition => "composition",
            Combinator::Converse => "converse",
        })
    }
}

/// Operator of a derived relation, with what it needs at evaluation time.
#[derive(Debug, Clone)]
pub(crate) enum Operator {
    Union,
    Intersection,
    /// The universe is recomputed from the registry on every evaluation.
    Complement(RelationRegistry),
    Composition,
    Converse,
}

impl Operator {
    fn combinator(&self) -> Combinator {
        match self {
            Operator::Union => Combinator::Union,
            Operator::Intersection => Combinator::Intersection,
            Operator::Complement(_) => Combinator::Complement,
            Operator::Composition => Combinator::Composition,
            Operator::Converse => Combinator::Converse,
        }
    }
}

// ============================================================================
// DerivedRelation
// ============================================================================

#[derive(Debug, Clone)]
pub(crate) struct DerivedRelation {
    operator: Operator,
    operands: Vec<BoundView>,
    output: Vec<VarId>,
}

impl DerivedRelation {
    pub(crate) fn arity(&self) -> usize {
        self.output.len()
    }

    pub(crate) fn combinator(&self) -> Combinator {
        self.operator.combinator()
    }

    pub(crate) fn operands(&self) -> &[BoundView] {
        &self.operands
    }

    /// Membership: the values seed the output variables, then the operator
    /// looks for a witness. Callers have already checked the arity.
    pub(crate) fn is_matched_by(&self, values: &[Atom]) -> bool {
        let Some(mut assignment) = join::seed(&self.output, values) else {
            return false;
        };
        match &self.operator {
            Operator::Union => self
                .operands
                .iter()
                .any(|view| join::exists(std::slice::from_ref(view), &mut assignment.clone())),
            Operator::Intersection | Operator::Composition | Operator::Converse => {
                join::exists(&self.operands, &mut assignment)
            }
            Operator::Complement(registry) => {
                let view = &self.operands[0];
                let universe = registry.universe(view.relation());
                let slots = join::resolve(view, &assignment);
                if slots.iter().all(Option::is_some) {
                    let row: Vec<Atom> = slots.into_iter().flatten().collect();
                    return universe.contains(&row) && !view.relation().is_matched_by(&row);
                }
                let found = universe.iter().any(|row| {
                    let Some(bound) = join::unify(view, row, &mut assignment) else {
                        return false;
                    };
                    join::undo(&mut assignment, bound);
                    !view.relation().is_matched_by(row)
                });
                found
            }
        }
    }

    /// Full evaluation into a fresh extension.
    pub(crate) fn evaluate(&self, name: &str) -> Extension {
        let mut out = Extension::new(self.arity());
        match &self.operator {
            Operator::Union => self.evaluate_union(&mut out),
            Operator::Intersection | Operator::Composition | Operator::Converse => {
                let _ = join::search(&self.operands, &mut Assignment::default(), &mut |assignment| {
                    if let Some(tuple) = join::project(assignment, &self.output) {
                        out.push(tuple);
                    }
                    ControlFlow::Continue(())
                });
            }
            Operator::Complement(registry) => {
                let view = &self.operands[0];
                let universe = registry.universe(view.relation());
                let mut assignment = Assignment::default();
                for row in universe.iter() {
                    let Some(bound) = join::unify(view, row, &mut assignment) else {
                        continue;
                    };
                    if !view.relation().is_matched_by(row) {
                        if let Some(tuple) = join::project(&assignment, &self.output) {
                            out.push(tuple);
                        }
                    }
                    join::undo(&mut assignment, bound);
                }
            }
        }
        tracing::trace!(
            relation = %name,
            combinator = %self.combinator(),
            rows = out.len(),
            "evaluated derived relation"
        );
        out
    }

    /// Each operand contributes its own rows. Output variables it does not
    /// mention range over the active domain of all operands.
    fn evaluate_union(&self, out: &mut Extension) {
        let mut domain = AtomSet::default();
        for view in &self.operands {
            domain.extend(view.relation().extension().atoms().cloned());
        }

        for view in &self.operands {
            let mentioned = view.spec().variables();
            let missing: Vec<VarId> = self
                .output
                .iter()
                .filter(|v| !mentioned.contains(v))
                .cloned()
                .collect();
            let _ = join::search(
                std::slice::from_ref(view),
                &mut Assignment::default(),
                &mut |assignment| {
                    let mut assignment = assignment.clone();
                    complete(&mut assignment, &missing, &domain, &self.output, out);
                    ControlFlow::Continue(())
                },
            );
        }
    }
}

/// Extend `assignment` over every combination of `domain` values for
/// `missing`, emitting each projection.
fn complete(
    assignment: &mut Assignment,
    missing: &[VarId],
    domain: &AtomSet,
    output: &[VarId],
    out: &mut Extension,
) {
    let Some((var, rest)) = missing.split_first() else {
        if let Some(tuple) = join::project(assignment, output) {
            out.push(tuple);
        }
        return;
    };
    for atom in domain {
        assignment.insert(var.clone(), atom.clone());
        complete(assignment, rest, domain, output, out);
    }
    assignment.remove(var);
}

// ============================================================================
// Construction
// ============================================================================

fn unsupported(combinator: Combinator, reason: impl Into<String>) -> RelationError {
    RelationError::UnsupportedCombinator {
        combinator,
        reason: reason.into(),
    }
}

fn joined_name(operands: &[BoundView], separator: &str) -> String {
    operands
        .iter()
        .map(|view| view.relation().name())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Composition and converse work on whole binary relations.
fn binary_operand(combinator: Combinator, view: &BoundView) -> Result<Relation> {
    let relation = view.relation();
    if relation.arity() != 2 {
        return Err(unsupported(
            combinator,
            format!("`{}` has arity {}, expected a binary relation", relation.name(), relation.arity()),
        ));
    }
    if !view.spec().is_identity() {
        return Err(unsupported(
            combinator,
            format!("`{view}` is bound; pass the relation itself"),
        ));
    }
    Ok(relation.clone())
}

fn rebind(relation: Relation, slots: [usize; 2]) -> Result<BoundView> {
    relation.bind(slots.map(crate::binding::pos))
}

/// Validate operands for `combinator` and build the derived relation.
///
/// Complement needs `registry`; the other combinators ignore it.
pub(crate) fn derive(
    combinator: Combinator,
    operands: Vec<BoundView>,
    registry: Option<&RelationRegistry>,
) -> Result<Relation> {
    let (operator, operands, output, name) = match combinator {
        Combinator::Union | Combinator::Intersection => {
            if operands.is_empty() {
                return Err(unsupported(combinator, "needs at least one operand"));
            }
            let output: Vec<VarId> = Correspondence::from_views(&operands).variables().cloned().collect();
            let (operator, separator) = if combinator == Combinator::Union {
                (Operator::Union, "_or_")
            } else {
                (Operator::Intersection, "_and_")
            };
            let name = joined_name(&operands, separator);
            (operator, operands, output, name)
        }
        Combinator::Complement => {
            if operands.len() != 1 {
                return Err(unsupported(
                    combinator,
                    format!("takes exactly one operand, got {}", operands.len()),
                ));
            }
            let Some(registry) = registry else {
                return Err(unsupported(combinator, "needs a relation registry for its universe"));
            };
            let output: Vec<VarId> = Correspondence::from_views(&operands).variables().cloned().collect();
            let name = format!("not_{}", operands[0].relation().name());
            (Operator::Complement(registry.clone()), operands, output, name)
        }
        Combinator::Composition => {
            let [first, second] = <[BoundView; 2]>::try_from(operands).map_err(|operands| {
                unsupported(combinator, format!("takes exactly two operands, got {}", operands.len()))
            })?;
            let first = binary_operand(combinator, &first)?;
            let second = binary_operand(combinator, &second)?;
            let name = format!("{}_then_{}", first.name(), second.name());
            // (a, b) in first, (b, c) in second; b is not projected.
            let operands = vec![rebind(first, [0, 1])?, rebind(second, [1, 2])?];
            (Operator::Composition, operands, vec![VarId::Index(0), VarId::Index(2)], name)
        }
        Combinator::Converse => {
            let [only] = <[BoundView; 1]>::try_from(operands).map_err(|operands| {
                unsupported(combinator, format!("takes exactly one operand, got {}", operands.len()))
            })?;
            let relation = binary_operand(combinator, &only)?;
            let name = format!("converse_of_{}", relation.name());
            let operands = vec![BoundView::from(relation)];
            (Operator::Converse, operands, vec![VarId::Index(1), VarId::Index(0)], name)
        }
    };

    Ok(Relation::derived(
        name,
        DerivedRelation {
            operator,
            operands,
            output,
        },
    ))
}

/// Tuples matched by at least one operand.
///
/// Operands may have different arities; plain relations unify by position.
pub fn union<I>(operands: I) -> Result<Relation>
where
    I: IntoIterator,
    I::Item: Into<BoundView>,
{
    derive(Combinator::Union, operands.into_iter().map(Into::into).collect(), None)
}

/// Tuples matched by every operand.
pub fn intersection<I>(operands: I) -> Result<Relation>
where
    I: IntoIterator,
    I::Item: Into<BoundView>,
{
    derive(Combinator::Intersection, operands.into_iter().map(Into::into).collect(), None)
}

/// `(a, c)` such that `first(a, b)` and `second(b, c)` for some `b`.
pub fn composition(first: &Relation, second: &Relation) -> Result<Relation> {
    derive(Combinator::Composition, vec![first.into(), second.into()], None)
}

/// `(b, a)` for every `(a, b)` matched by `relation`.
pub fn converse(relation: &Relation) -> Result<Relation> {
    derive(Combinator::Converse, vec![relation.into()], None)
}

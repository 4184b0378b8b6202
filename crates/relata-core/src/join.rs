//! The join engine shared by every combinator.
//!
//! Evaluating operands `[(R_0, spec_0), .., (R_n, spec_n)]`:
//!
//! 1. each operand's rows are filtered by its literal slots;
//! 2. rows are combined across operands (the cross product);
//! 3. combinations where two slots labelled by the same variable disagree
//!    are discarded;
//! 4. the operator predicate decides admission;
//! 5. admitted combinations are projected onto the output variables.
//!
//! The cross product is walked depth-first, extending one variable
//! assignment operand by operand, so a clash is discarded as soon as it
//! appears. The admitted set is the same as filtering the full product; the
//! worst case is still O(Π |R_i|). There is no index and no reordering.
//!
//! Rows are the enumerated rows of each operand: the stored tuples of a
//! base relation, the evaluated tuples of a derived one. Pairs a binary
//! relation only induces are not rows. An operand whose slots are all
//! determined by the assignment is not scanned; its row is looked up
//! directly.

use crate::atom::{Atom, Tuple};
use crate::binding::{Binding, BoundView, VarId};
use std::collections::HashMap;
use std::ops::ControlFlow;

pub(crate) type Assignment = HashMap<VarId, Atom, ahash::RandomState>;

/// Slot values of one operand under `assignment`; `None` marks an open slot.
pub(crate) fn resolve(view: &BoundView, assignment: &Assignment) -> Vec<Option<Atom>> {
    view.spec()
        .bindings()
        .iter()
        .map(|binding| match binding {
            Binding::Var(v) => assignment.get(v).cloned(),
            Binding::Wildcard => None,
            Binding::Literal(a) => Some(a.clone()),
        })
        .collect()
}

/// Unify `row` with the bindings of `view`, extending `assignment`.
///
/// Returns the variables newly bound by this row, or `None` if the row
/// violates a literal or a correspondence. On `None` the assignment is left
/// as it was.
pub(crate) fn unify(view: &BoundView, row: &[Atom], assignment: &mut Assignment) -> Option<Vec<VarId>> {
    let mut bound: Vec<VarId> = Vec::new();
    for (binding, atom) in view.spec().bindings().iter().zip(row) {
        let ok = match binding {
            Binding::Wildcard => true,
            Binding::Literal(lit) => lit == atom,
            Binding::Var(v) => match assignment.get(v) {
                Some(existing) => existing == atom,
                None => {
                    assignment.insert(v.clone(), atom.clone());
                    bound.push(v.clone());
                    true
                }
            },
        };
        if !ok {
            undo(assignment, bound);
            return None;
        }
    }
    Some(bound)
}

pub(crate) fn undo(assignment: &mut Assignment, bound: Vec<VarId>) {
    for v in bound {
        assignment.remove(&v);
    }
}

/// Walk every consistent combination of rows of `operands`, calling `visit`
/// with the completed assignment. `visit` may stop the walk early.
pub(crate) fn search<F>(operands: &[BoundView], assignment: &mut Assignment, visit: &mut F) -> ControlFlow<()>
where
    F: FnMut(&Assignment) -> ControlFlow<()>,
{
    let Some((view, rest)) = operands.split_first() else {
        return visit(assignment);
    };

    let slots = resolve(view, assignment);
    if slots.iter().all(Option::is_some) {
        let values: Vec<Atom> = slots.into_iter().flatten().collect();
        if view.relation().has_row(&values) {
            return search(rest, assignment, visit);
        }
        return ControlFlow::Continue(());
    }

    let extension = view.relation().extension();
    for row in extension.iter() {
        let Some(bound) = unify(view, row, assignment) else {
            continue;
        };
        let flow = search(rest, assignment, visit);
        undo(assignment, bound);
        if flow.is_break() {
            return flow;
        }
    }
    ControlFlow::Continue(())
}

/// True if some combination of rows is consistent with `assignment`.
pub(crate) fn exists(operands: &[BoundView], assignment: &mut Assignment) -> bool {
    search(operands, assignment, &mut |_| ControlFlow::Break(())).is_break()
}

/// Project an assignment onto `output`. `None` if an output variable is unbound.
pub(crate) fn project(assignment: &Assignment, output: &[VarId]) -> Option<Tuple> {
    output
        .iter()
        .map(|v| assignment.get(v).cloned())
        .collect::<Option<Vec<Atom>>>()
        .map(Tuple::new)
}

/// Seed an assignment from output values. `None` if a variable repeats in
/// `output` with different values.
pub(crate) fn seed(output: &[VarId], values: &[Atom]) -> Option<Assignment> {
    let mut assignment = Assignment::default();
    for (v, atom) in output.iter().zip(values) {
        if let Some(existing) = assignment.insert(v.clone(), atom.clone()) {
            if &existing != atom {
                return None;
            }
        }
    }
    Some(assignment)
}

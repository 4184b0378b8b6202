//! Structural properties of binary relations.
//!
//! A binary relation declares its properties once, at construction. Two kinds
//! exist:
//!
//! - **guards** (irreflexive, asymmetric) restrict which pairs may be added;
//! - **inducers** (reflexive, symmetric, transitive) widen membership testing
//!   beyond the literal extension.
//!
//! Inducers are evaluated independently against the *literal* extension and
//! OR'd together. In particular the transitive search never follows pairs that
//! only exist by symmetry: this keeps the search bounded by the extension and
//! rules out mutual recursion between rules.

use crate::atom::{Atom, Tuple};
use crate::error::{RelationError, Result};
use crate::extension::{AtomSet, Extension};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

// ============================================================================
// Property names
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    Reflexive,
    Irreflexive,
    Symmetric,
    Asymmetric,
    Transitive,
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Property::Reflexive => "reflexive",
            Property::Irreflexive => "irreflexive",
            Property::Symmetric => "symmetric",
            Property::Asymmetric => "asymmetric",
            Property::Transitive => "transitive",
        })
    }
}

// ============================================================================
// PropertySet
// ============================================================================

/// The declared properties of a binary relation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PropertySet {
    pub reflexive: bool,
    pub irreflexive: bool,
    pub symmetric: bool,
    pub asymmetric: bool,
    pub transitive: bool,
}

impl PropertySet {
    pub const fn new() -> Self {
        Self {
            reflexive: false,
            irreflexive: false,
            symmetric: false,
            asymmetric: false,
            transitive: false,
        }
    }

    pub const fn reflexive(mut self) -> Self {
        self.reflexive = true;
        self
    }

    pub const fn irreflexive(mut self) -> Self {
        self.irreflexive = true;
        self
    }

    pub const fn symmetric(mut self) -> Self {
        self.symmetric = true;
        self
    }

    pub const fn asymmetric(mut self) -> Self {
        self.asymmetric = true;
        self
    }

    pub const fn transitive(mut self) -> Self {
        self.transitive = true;
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::new()
    }

    pub fn contains(&self, property: Property) -> bool {
        match property {
            Property::Reflexive => self.reflexive,
            Property::Irreflexive => self.irreflexive,
            Property::Symmetric => self.symmetric,
            Property::Asymmetric => self.asymmetric,
            Property::Transitive => self.transitive,
        }
    }

    /// Declared properties, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Property> + '_ {
        [
            Property::Reflexive,
            Property::Irreflexive,
            Property::Symmetric,
            Property::Asymmetric,
            Property::Transitive,
        ]
        .into_iter()
        .filter(|p| self.contains(*p))
    }

    /// Reject mutually exclusive declarations.
    pub fn validate(&self, relation: &str) -> Result<()> {
        let conflict = |first, second| RelationError::PropertyConflict {
            relation: relation.to_string(),
            first,
            second,
        };
        if self.reflexive && self.irreflexive {
            return Err(conflict(Property::Reflexive, Property::Irreflexive));
        }
        if self.symmetric && self.asymmetric {
            return Err(conflict(Property::Symmetric, Property::Asymmetric));
        }
        Ok(())
    }

    /// Declared inducers.
    pub fn inducers(&self) -> impl Iterator<Item = Induction> + '_ {
        [
            (self.reflexive, Induction::Reflexive),
            (self.symmetric, Induction::Symmetric),
            (self.transitive, Induction::Transitive),
        ]
        .into_iter()
        .filter_map(|(on, induction)| on.then_some(induction))
    }

    /// True if any declared inducer accepts `(a, b)`.
    pub fn induces(&self, a: &Atom, b: &Atom, extension: &Extension) -> bool {
        self.inducers().any(|rule| rule.holds(a, b, extension))
    }

    /// The insertion guard: checks `(a, b)` against the declared guards,
    /// given the extension it is about to join.
    pub fn check_insert(&self, relation: &str, a: &Atom, b: &Atom, extension: &Extension) -> Result<()> {
        let violation = |property| RelationError::PropertyViolation {
            relation: relation.to_string(),
            property,
            tuple: Tuple::new(vec![a.clone(), b.clone()]),
        };
        if self.irreflexive && a == b {
            return Err(violation(Property::Irreflexive));
        }
        if self.asymmetric && extension.contains(&[b.clone(), a.clone()]) {
            return Err(violation(Property::Asymmetric));
        }
        Ok(())
    }
}

impl fmt::Display for PropertySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.iter().map(|p| p.to_string()).collect();
        if names.is_empty() {
            f.write_str("-")
        } else {
            f.write_str(&names.join(", "))
        }
    }
}

// ============================================================================
// Induction rules
// ============================================================================

/// A rule that widens membership of a binary relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Induction {
    /// `a == b`, for any atoms, seen or not.
    Reflexive,
    /// `(b, a)` is literally present.
    Symmetric,
    /// `b` is reachable from `a` over literal pairs.
    Transitive,
}

impl Induction {
    pub fn holds(self, a: &Atom, b: &Atom, extension: &Extension) -> bool {
        match self {
            Induction::Reflexive => a == b,
            Induction::Symmetric => extension.contains(&[b.clone(), a.clone()]),
            Induction::Transitive => reachable(extension, a, b),
        }
    }
}

/// Breadth-first search for `to` over the literal pairs of `extension`,
/// starting from the successors of `from`.
///
/// Terminates because every atom enters the visited set at most once.
/// Non-binary extensions have no edges.
pub(crate) fn reachable(extension: &Extension, from: &Atom, to: &Atom) -> bool {
    if extension.arity() != 2 {
        return false;
    }
    let mut visited = AtomSet::default();
    let mut frontier: VecDeque<&Atom> = VecDeque::new();

    for pair in extension.values_at(0, from) {
        if visited.insert(pair[1].clone()) {
            frontier.push_back(&pair[1]);
        }
    }

    while let Some(node) = frontier.pop_front() {
        if node == to {
            return true;
        }
        for pair in extension.values_at(0, node) {
            if visited.insert(pair[1].clone()) {
                frontier.push_back(&pair[1]);
            }
        }
    }
    false
}

/// No pair `(b, a)` is present whenever `(a, b)` is, for `a != b`.
pub(crate) fn is_antisymmetric(extension: &Extension) -> bool {
    extension.arity() == 2
        && extension
            .iter()
            .all(|pair| pair[0] == pair[1] || !extension.contains(&[pair[1].clone(), pair[0].clone()]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ext(pairs: &[(&str, &str)]) -> Extension {
        Extension::from_tuples(2, pairs.iter().copied()).unwrap()
    }

    fn atom(s: &str) -> Atom {
        Atom::from(s)
    }

    #[test]
    fn reachability_follows_chains() {
        let e = ext(&[("a", "b"), ("b", "c"), ("c", "d")]);
        assert!(reachable(&e, &atom("a"), &atom("b")));
        assert!(reachable(&e, &atom("a"), &atom("d")));
        assert!(!reachable(&e, &atom("d"), &atom("a")));
        assert!(!reachable(&e, &atom("a"), &atom("a")));
    }

    #[test]
    fn reachability_terminates_on_cycles() {
        let e = ext(&[("a", "b"), ("b", "a"), ("b", "c")]);
        assert!(reachable(&e, &atom("a"), &atom("a")));
        assert!(reachable(&e, &atom("a"), &atom("c")));
        assert!(!reachable(&e, &atom("c"), &atom("a")));
        assert!(!reachable(&e, &atom("a"), &atom("z")));
    }

    #[test]
    fn non_binary_extensions_have_no_edges() {
        let unary = Extension::from_tuples(1, ["a", "b"]).unwrap();
        assert!(!reachable(&unary, &atom("a"), &atom("b")));
        assert!(!Induction::Transitive.holds(&atom("a"), &atom("b"), &unary));
        assert!(!is_antisymmetric(&unary));
    }

    #[test]
    fn conflicting_declarations_are_rejected() {
        assert!(PropertySet::new().reflexive().symmetric().validate("r").is_ok());
        assert!(matches!(
            PropertySet::new().reflexive().irreflexive().validate("r"),
            Err(RelationError::PropertyConflict {
                first: Property::Reflexive,
                second: Property::Irreflexive,
                ..
            })
        ));
        assert!(matches!(
            PropertySet::new().symmetric().asymmetric().validate("r"),
            Err(RelationError::PropertyConflict {
                first: Property::Symmetric,
                second: Property::Asymmetric,
                ..
            })
        ));
    }

    #[test]
    fn guards_check_against_the_current_extension() {
        let e = ext(&[("a", "b")]);
        let props = PropertySet::new().irreflexive().asymmetric();
        assert!(props.check_insert("r", &atom("b"), &atom("c"), &e).is_ok());
        assert!(props.check_insert("r", &atom("c"), &atom("c"), &e).is_err());
        assert!(props.check_insert("r", &atom("b"), &atom("a"), &e).is_err());
    }

    #[test]
    fn antisymmetry_is_derived_from_the_extension() {
        assert!(is_antisymmetric(&ext(&[("a", "b"), ("a", "a")])));
        assert!(!is_antisymmetric(&ext(&[("a", "b"), ("b", "a")])));
    }

    #[test]
    fn inducers_are_listed_in_rule_order() {
        let props = PropertySet::new().transitive().reflexive().irreflexive();
        let rules: Vec<Induction> = props.inducers().collect();
        assert_eq!(rules, vec![Induction::Reflexive, Induction::Transitive]);
        assert_eq!(props.to_string(), "reflexive, irreflexive, transitive");
    }
}

//! Errors raised by the relation algebra.
//!
//! Every failure is synchronous and terminal: nothing is retried and a failed
//! insertion leaves the extension untouched. Querying never fails, see
//! [`crate::Relation::is_matched_by`].

use crate::atom::Tuple;
use crate::derived::Combinator;
use crate::properties::Property;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelationError {
    #[error("relation `{relation}` has arity {expected}, got {found} value(s)")]
    ArityMismatch {
        relation: String,
        expected: usize,
        found: usize,
    },

    #[error("relation `{relation}` cannot be both {first} and {second}")]
    PropertyConflict {
        relation: String,
        first: Property,
        second: Property,
    },

    #[error("adding {tuple} to `{relation}` would break its {property} property")]
    PropertyViolation {
        relation: String,
        property: Property,
        tuple: Tuple,
    },

    #[error("{combinator} is not applicable: {reason}")]
    UnsupportedCombinator {
        combinator: Combinator,
        reason: String,
    },

    #[error("relation `{relation}` must have a positive arity")]
    InvalidArity { relation: String },

    #[error("relation `{relation}` is derived and cannot be extended")]
    ReadOnly { relation: String },
}

pub type Result<T, E = RelationError> = std::result::Result<T, E>;

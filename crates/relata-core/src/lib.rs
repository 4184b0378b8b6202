//! Relata: an in-memory relational algebra over named relations.
//!
//! A relation is a name, a fixed arity and a growing set of tuples of atoms.
//! Relations are combined with five combinators (union, intersection,
//! complement, composition, converse) into *derived* relations, which are
//! live views: they re-read their operands on every query.
//!
//! Binary relations can declare structural properties. Guards (irreflexive,
//! asymmetric) constrain insertion; inducers (reflexive, symmetric,
//! transitive) widen membership testing without materialising anything.
//!
//! ## Module Organization
//!
//! - `atom`: atoms and tuples
//! - `extension`: insertion-ordered tuple sets with O(1) snapshots
//! - `relation`: the shared relation handle and `BinaryRelation`
//! - `properties`: property declarations, guards and induction rules
//! - `binding`: variables, wildcards and literals; bound views
//! - `derived`: the combinators
//! - `registry`: the set of base relations complement ranges over
//! - `dataset`: JSON datasets
//!
//! ```
//! use relata_core::{converse, RelationRegistry};
//!
//! let registry = RelationRegistry::new();
//! let parent = registry.new_relation("is_parent", 2)?;
//! parent.add(("teresa", "piotr"))?;
//!
//! let child = converse(&parent)?;
//! assert!(child.test(("piotr", "teresa")));
//! # Ok::<(), relata_core::RelationError>(())
//! ```

pub mod atom;
pub mod binding;
pub mod dataset;
pub mod derived;
pub mod error;
pub mod extension;
mod join;
pub mod properties;
pub mod registry;
pub mod relation;

// Re-export key types
pub use atom::{Atom, Tuple};
pub use binding::{any, lit, pos, var, Binding, BoundView, Correspondence, ParameterSpec, Resolution, VarId};
pub use dataset::{Dataset, RelationDecl, TupleDecl};
pub use derived::{composition, converse, intersection, union, Combinator};
pub use error::{RelationError, Result};
pub use extension::{Extension, ValuesAt};
pub use properties::{Induction, Property, PropertySet};
pub use registry::RelationRegistry;
pub use relation::{BinaryRelation, Relation};

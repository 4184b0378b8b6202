//! JSON datasets.
//!
//! A dataset lists base relations with their declared properties and initial
//! tuples:
//!
//! ```json
//! {
//!   "relations": [
//!     { "name": "is_female", "arity": 1, "tuples": ["ania", "teresa"] },
//!     { "name": "is_parent", "arity": 2,
//!       "properties": { "irreflexive": true, "asymmetric": true },
//!       "tuples": [["teresa", "piotr"]] }
//!   ]
//! }
//! ```
//!
//! Unary tuples may be written as bare atoms. Installing a dataset goes
//! through the ordinary insertion path, so guards apply to the initial
//! tuples too.

use crate::atom::{Atom, Tuple};
use crate::properties::PropertySet;
use crate::registry::RelationRegistry;
use crate::relation::Relation;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub relations: Vec<RelationDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDecl {
    pub name: String,
    pub arity: usize,
    #[serde(default, skip_serializing_if = "PropertySet::is_empty")]
    pub properties: PropertySet,
    #[serde(default)]
    pub tuples: Vec<TupleDecl>,
}

/// A tuple as written in a dataset: a JSON array, or a bare atom for a
/// unary relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TupleDecl {
    Row(Vec<Atom>),
    Bare(Atom),
}

impl From<TupleDecl> for Tuple {
    fn from(value: TupleDecl) -> Self {
        match value {
            TupleDecl::Row(atoms) => Tuple::new(atoms),
            TupleDecl::Bare(atom) => Tuple::from(atom),
        }
    }
}

impl Dataset {
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("failed to parse dataset JSON")
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read dataset `{}`", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("in dataset `{}`", path.display()))
    }

    /// Create every declared relation in `registry` and add its tuples.
    ///
    /// A name declared twice is merged into the first declaration (with a
    /// warning) as long as the arities agree. Returns the relations created,
    /// in declaration order.
    ///
    /// Installation is all-or-nothing: relations are built in a staging
    /// registry and only registered once every declaration has loaded.
    pub fn install(&self, registry: &RelationRegistry) -> Result<Vec<Relation>> {
        let staging = RelationRegistry::new();
        let mut created: Vec<Relation> = Vec::new();
        for decl in &self.relations {
            let relation = match created.iter().find(|r| r.name() == decl.name) {
                Some(existing) => {
                    tracing::warn!(relation = %decl.name, "relation declared twice; merging tuples");
                    if existing.arity() != decl.arity {
                        return Err(anyhow!(
                            "relation `{}` declared with arity {} and {}",
                            decl.name,
                            existing.arity(),
                            decl.arity
                        ));
                    }
                    if !decl.properties.is_empty() && decl.properties != existing.properties() {
                        return Err(anyhow!(
                            "relation `{}` redeclared with different properties",
                            decl.name
                        ));
                    }
                    existing.clone()
                }
                None => {
                    let relation = declare(&staging, decl)?;
                    created.push(relation.clone());
                    relation
                }
            };

            relation
                .add_all(decl.tuples.iter().cloned().map(Tuple::from))
                .with_context(|| format!("while loading tuples of `{}`", decl.name))?;
        }
        registry.absorb(staging);
        tracing::debug!(relations = created.len(), "installed dataset");
        Ok(created)
    }
}

fn declare(registry: &RelationRegistry, decl: &RelationDecl) -> Result<Relation> {
    if decl.properties.is_empty() {
        return registry
            .new_relation(decl.name.as_str(), decl.arity)
            .with_context(|| format!("while declaring `{}`", decl.name));
    }
    if decl.arity != 2 {
        return Err(anyhow!(
            "relation `{}` has arity {} but declares properties ({}); only binary relations can",
            decl.name,
            decl.arity,
            decl.properties
        ));
    }
    let relation = registry
        .new_binary_relation(decl.name.as_str(), decl.properties)
        .with_context(|| format!("while declaring `{}`", decl.name))?;
    Ok(relation.into_relation())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r#"{
        "relations": [
            { "name": "is_female", "arity": 1, "tuples": ["ania", ["teresa"]] },
            { "name": "is_parent", "arity": 2,
              "properties": { "irreflexive": true },
              "tuples": [["teresa", "ania"]] }
        ]
    }"#;

    #[test]
    fn bare_atoms_are_unary_tuples() {
        let dataset = Dataset::from_json_str(SMALL).unwrap();
        assert_eq!(dataset.relations[0].tuples[0], TupleDecl::Bare(Atom::text("ania")));

        let registry = RelationRegistry::new();
        let created = dataset.install(&registry).unwrap();
        assert_eq!(created.len(), 2);
        assert!(created[0].test("ania"));
        assert!(created[0].test("teresa"));
        assert!(created[1].properties().irreflexive);
    }

    #[test]
    fn properties_on_a_unary_relation_are_rejected() {
        let dataset = Dataset::from_json_str(
            r#"{ "relations": [ { "name": "u", "arity": 1, "properties": { "symmetric": true } } ] }"#,
        )
        .unwrap();
        let err = dataset.install(&RelationRegistry::new()).unwrap_err();
        assert!(err.to_string().contains("only binary relations"));
    }

    #[test]
    fn unknown_property_names_fail_to_parse() {
        let text = r#"{ "relations": [ { "name": "r", "arity": 2, "properties": { "funny": true } } ] }"#;
        assert!(Dataset::from_json_str(text).is_err());
    }

    #[test]
    fn guard_violations_surface_with_context() {
        let text = r#"{ "relations": [ { "name": "r", "arity": 2,
            "properties": { "irreflexive": true }, "tuples": [["a", "a"]] } ] }"#;
        let err = Dataset::from_json_str(text)
            .unwrap()
            .install(&RelationRegistry::new())
            .unwrap_err();
        assert!(format!("{err:#}").contains("irreflexive"));
    }

    #[test]
    fn loads_from_a_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, SMALL.as_bytes()).unwrap();
        let dataset = Dataset::from_path(file.path()).unwrap();
        assert_eq!(dataset.relations.len(), 2);
    }

    #[test]
    fn failed_install_registers_nothing() {
        let text = r#"{ "relations": [
            { "name": "is_female", "arity": 1, "tuples": ["ania"] },
            { "name": "is_parent", "arity": 2,
              "properties": { "irreflexive": true }, "tuples": [["a", "a"]] }
        ] }"#;
        let registry = RelationRegistry::new();
        registry.new_relation("is_human", 1).unwrap();

        assert!(Dataset::from_json_str(text).unwrap().install(&registry).is_err());
        assert_eq!(registry.len(), 1);
        assert!(registry.get("is_female").is_none());
        assert!(registry.get("is_parent").is_none());
    }

    #[test]
    fn repeated_declarations_merge() {
        let text = r#"{ "relations": [
            { "name": "r", "arity": 1, "tuples": ["a"] },
            { "name": "r", "arity": 1, "tuples": ["b"] }
        ] }"#;
        let registry = RelationRegistry::new();
        let created = Dataset::from_json_str(text).unwrap().install(&registry).unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].len(), 2);
        assert_eq!(registry.len(), 1);
    }
}

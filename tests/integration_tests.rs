//! Integration tests for the complete Relata pipeline
//!
//! These tests drive the engine end to end:
//! - JSON dataset → registry → base relations
//! - base relations → combinators → membership and enumeration
//! - datasets written to disk and loaded back
//!
//! Run with: cargo test --test integration_tests

use relata_core::{
    composition, converse, intersection, var, Atom, Dataset, PropertySet, Relation,
    RelationError, RelationRegistry,
};
use std::fs;
use tempfile::tempdir;

const FAMILY: &str = include_str!("../crates/relata-cli/data/family.json");

fn family() -> (RelationRegistry, Relation, Relation, Relation) {
    let registry = RelationRegistry::new();
    Dataset::from_json_str(FAMILY)
        .unwrap()
        .install(&registry)
        .unwrap();
    let human = registry.get("is_human").unwrap();
    let parent = registry.get("is_parent").unwrap();
    let female = registry.get("is_female").unwrap();
    (registry, human, parent, female)
}

fn people(human: &Relation) -> Vec<Atom> {
    human.extension().iter().map(|t| t[0].clone()).collect()
}

// ============================================================================
// Dataset loading
// ============================================================================

#[test]
fn test_family_dataset_installs_three_relations() {
    let (registry, human, parent, female) = family();
    assert_eq!(registry.len(), 3);
    assert_eq!(human.len(), 10);
    assert_eq!(parent.len(), 12);
    assert_eq!(female.len(), 4);
    assert_eq!(
        parent.properties(),
        PropertySet::new().irreflexive().asymmetric()
    );
}

#[test]
fn test_dataset_round_trips_through_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("family.json");

    let dataset = Dataset::from_json_str(FAMILY).unwrap();
    fs::write(&path, serde_json::to_string_pretty(&dataset).unwrap()).unwrap();

    let loaded = Dataset::from_path(&path).unwrap();
    assert_eq!(loaded, dataset);
}

#[test]
fn test_missing_dataset_reports_the_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nope.json");
    let err = Dataset::from_path(&path).unwrap_err();
    assert!(err.to_string().contains("nope.json"));
}

#[test]
fn test_dataset_guards_apply_to_initial_tuples() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(
        &path,
        r#"{ "relations": [ { "name": "is_parent", "arity": 2,
             "properties": { "asymmetric": true },
             "tuples": [["a", "b"], ["b", "a"]] } ] }"#,
    )
    .unwrap();

    let registry = RelationRegistry::new();
    let err = Dataset::from_path(&path).unwrap().install(&registry).unwrap_err();
    let violation = err.downcast_ref::<RelationError>().unwrap();
    assert!(matches!(violation, RelationError::PropertyViolation { .. }));
    // A failed install leaves the registry untouched.
    assert!(registry.get("is_parent").is_none());
    assert!(registry.is_empty());
}

// ============================================================================
// Family walkthrough
// ============================================================================

#[test]
fn test_male_is_the_complement_of_female() {
    let (registry, human, _, female) = family();
    let male = registry.complement(&female).unwrap();

    let males: Vec<String> = male
        .filter(people(&human))
        .map(|a| a.to_string())
        .collect();
    assert_eq!(
        males,
        vec!["piotr", "kita", "karol", "robert", "henryk", "zdzisław"]
    );
}

#[test]
fn test_child_grandparent_and_father() {
    let (registry, _, parent, female) = family();
    let male = registry.complement(&female).unwrap();
    let child = converse(&parent).unwrap();
    let grandparent = composition(&parent, &parent).unwrap();
    let father = intersection([
        parent.bind([var("A"), var("B")]).unwrap(),
        male.bind([var("A")]).unwrap(),
    ])
    .unwrap();

    assert!(parent.test(("teresa", "piotr")));
    assert!(!parent.test(("piotr", "teresa")));
    assert!(child.test(("piotr", "teresa")));

    assert!(grandparent.test(("janina", "karol")));
    assert!(grandparent.test(("lucyna", "ania")));
    assert!(!grandparent.test(("teresa", "karol")));
    // Four grandparents times four grandchildren.
    assert_eq!(grandparent.len(), 16);

    assert!(father.test(("robert", "ania")));
    assert!(!father.test(("teresa", "ania")));
    assert_eq!(father.len(), 6);
}

#[test]
fn test_views_follow_the_dataset_as_it_grows() {
    let (registry, human, parent, female) = family();
    let male = registry.complement(&female).unwrap();
    let grandparent = composition(&parent, &parent).unwrap();

    human.add("stefan").unwrap();
    parent.add(("piotr", "stefan")).unwrap();

    assert!(male.test("stefan"));
    assert!(grandparent.test(("teresa", "stefan")));
    assert!(parent.add(("stefan", "piotr")).is_err());
}

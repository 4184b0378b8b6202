use relata_core::{
    any, intersection, lit, pos, union, var, BinaryRelation, PropertySet, Relation, RelationError,
    Resolution,
};

/// Two parents, two children, and one self-parent.
fn family() -> (BinaryRelation, Relation) {
    let parent = BinaryRelation::new("is_parent", PropertySet::new()).unwrap();
    parent
        .add_all([
            ("wiktor", "stefan"),
            ("aniela", "stefan"),
            ("wiktor", "patrycja"),
            ("aniela", "patrycja"),
            ("god", "god"),
        ])
        .unwrap();
    let female = Relation::new("is_female", 1).unwrap();
    female.add_all(["aniela", "patrycja"]).unwrap();
    (parent, female)
}

fn none_match(relation: &Relation, candidates: Vec<(&str, &str)>) -> bool {
    relation.filter(candidates).next().is_none()
}

// ============================================================================
// Resolving calls
// ============================================================================

#[test]
fn all_literal_call_is_a_membership_test() {
    let (parent, _) = family();
    let answer = parent.call([lit("wiktor"), lit("stefan")]).unwrap();
    assert_eq!(answer.as_test(), Some(true));
    let answer = parent.call([lit("stefan"), lit("wiktor")]).unwrap();
    assert_eq!(answer.as_test(), Some(false));
}

#[test]
fn call_with_a_variable_is_a_view() {
    let (parent, _) = family();
    let resolution = parent.call([var("A"), lit("stefan")]).unwrap();
    assert!(matches!(resolution, Resolution::View(_)));
    let view = resolution.into_view().unwrap();
    assert_eq!(view.to_string(), "is_parent(A, 'stefan')");
}

#[test]
fn bind_requires_one_binding_per_slot() {
    let (parent, _) = family();
    assert!(matches!(
        parent.bind([var("A")]),
        Err(RelationError::ArityMismatch { expected: 2, found: 1, .. })
    ));
}

// ============================================================================
// Wildcards and literals
// ============================================================================

#[test]
fn wildcard_drops_its_slot() {
    let (parent, _) = family();
    let has_child = intersection([parent.bind([pos(0), any()]).unwrap()]).unwrap();
    assert_eq!(has_child.arity(), 1);
    assert!(has_child.test("aniela"));
    assert!(has_child.test("wiktor"));
    assert!(!has_child.test("stefan"));
    assert!(!has_child.test("patrycja"));
}

#[test]
fn literal_constrains_its_slot() {
    let (parent, _) = family();
    let parents_of_stefan = intersection([parent.bind([var("P"), lit("stefan")]).unwrap()]).unwrap();
    assert_eq!(parents_of_stefan.arity(), 1);
    assert!(parents_of_stefan.test("wiktor"));
    assert!(parents_of_stefan.test("aniela"));
    assert!(!parents_of_stefan.test("god"));
    assert_eq!(parents_of_stefan.len(), 2);
}

#[test]
fn repeated_variable_within_one_operand() {
    let (parent, _) = family();
    let own_parent = intersection([parent.bind([var("A"), var("A")]).unwrap()]).unwrap();
    assert_eq!(own_parent.arity(), 1);
    assert!(own_parent.test("god"));
    for name in ["stefan", "patrycja", "wiktor", "aniela"] {
        assert!(!own_parent.test(name));
    }
}

// ============================================================================
// Correspondence across operands
// ============================================================================

#[test]
fn correspondence_on_the_first_slot() {
    let (parent, female) = family();
    let mother = intersection([
        parent.bind([var("A"), var("B")]).unwrap(),
        female.bind([var("A")]).unwrap(),
    ])
    .unwrap();
    assert_eq!(mother.arity(), 2);
    assert!(mother.test(("aniela", "stefan")));
    assert!(mother.test(("aniela", "patrycja")));
    assert!(none_match(&mother, vec![("wiktor", "stefan"), ("wiktor", "patrycja")]));
}

#[test]
fn correspondence_on_the_second_slot() {
    let (parent, female) = family();
    let parent_of_daughter = intersection([
        parent.bind([var("A"), var("B")]).unwrap(),
        female.bind([var("B")]).unwrap(),
    ])
    .unwrap();
    assert!(parent_of_daughter.test(("wiktor", "patrycja")));
    assert!(parent_of_daughter.test(("aniela", "patrycja")));
    assert!(none_match(
        &parent_of_daughter,
        vec![("wiktor", "stefan"), ("aniela", "stefan")]
    ));
}

#[test]
fn correspondence_with_a_wildcard() {
    let (parent, female) = family();
    let mothers = intersection([
        parent.bind([var("A"), any()]).unwrap(),
        female.bind([var("A")]).unwrap(),
    ])
    .unwrap();
    assert_eq!(mothers.arity(), 1);
    assert!(mothers.test("aniela"));
    for name in ["wiktor", "patrycja", "stefan"] {
        assert!(!mothers.test(name));
    }

    let daughters = intersection([
        parent.bind([any(), var("B")]).unwrap(),
        female.bind([var("B")]).unwrap(),
    ])
    .unwrap();
    assert!(daughters.test("patrycja"));
    for name in ["wiktor", "aniela", "stefan"] {
        assert!(!daughters.test(name));
    }
}

#[test]
fn output_columns_follow_first_occurrence() {
    let (parent, female) = family();
    let mother = intersection([
        parent.bind([var("A"), var("B")]).unwrap(),
        female.bind([var("A")]).unwrap(),
    ])
    .unwrap();
    // A occurs first in both, but here A is the child.
    let daughter = intersection([
        female.bind([var("A")]).unwrap(),
        parent.bind([var("B"), var("A")]).unwrap(),
    ])
    .unwrap();
    assert!(mother.test(("aniela", "patrycja")));
    assert!(daughter.test(("patrycja", "aniela")));
    assert!(!daughter.test(("aniela", "patrycja")));
}

// ============================================================================
// Union over partially mentioned variables
// ============================================================================

#[test]
fn union_with_a_unary_operand_on_the_first_slot() {
    let (parent, female) = family();
    let either = union([
        parent.bind([pos(0), pos(1)]).unwrap(),
        female.bind([pos(0)]).unwrap(),
    ])
    .unwrap();
    assert_eq!(either.arity(), 2);
    for pair in [
        ("wiktor", "stefan"),
        ("aniela", "patrycja"),
        ("patrycja", "wiktor"),
        ("patrycja", "patrycja"),
        ("aniela", "wiktor"),
    ] {
        assert!(either.test(pair), "{pair:?} should match");
    }
    assert!(none_match(
        &either,
        vec![("wiktor", "aniela"), ("stefan", "wiktor"), ("wiktor", "wiktor"), ("stefan", "stefan")]
    ));
}

#[test]
fn union_with_a_unary_operand_on_the_second_slot() {
    let (parent, female) = family();
    let either = union([
        parent.bind([pos(0), pos(1)]).unwrap(),
        female.bind([pos(1)]).unwrap(),
    ])
    .unwrap();
    assert!(either.test(("wiktor", "aniela")));
    assert!(either.test(("stefan", "patrycja")));
    assert!(none_match(
        &either,
        vec![("patrycja", "stefan"), ("wiktor", "wiktor"), ("aniela", "wiktor")]
    ));
}

#[test]
fn union_enumeration_ranges_over_the_active_domain() {
    let (parent, female) = family();
    let either = union([
        parent.bind([pos(0), pos(1)]).unwrap(),
        female.bind([pos(0)]).unwrap(),
    ])
    .unwrap();
    let extension = either.extension();
    // Five atoms: aniela and patrycja pair with every one of them.
    assert!(extension.iter().all(|t| either.is_matched_by(t)));
    assert_eq!(extension.len(), 5 + 2 * 5 - 2);
}

#[test]
fn intersection_positional_variables() {
    let (parent, female) = family();
    let mother = intersection([
        parent.bind([pos(0), pos(1)]).unwrap(),
        female.bind([pos(0)]).unwrap(),
    ])
    .unwrap();
    assert!(mother.test(("aniela", "patrycja")));
    assert!(mother.test(("aniela", "stefan")));
    assert!(none_match(
        &mother,
        vec![("wiktor", "stefan"), ("wiktor", "patrycja"), ("patrycja", "aniela")]
    ));
}

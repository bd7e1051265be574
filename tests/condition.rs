//! Tests for property values, condition parsing, and evaluation.
mod common;
use common::conditions;
use kairo::condition::{
    BindingKind, ConditionComparison, ConditionOperator, ConditionTree, ConditionTreeLeaf,
    EvaluationContext, PropertyValue, parse_conditions,
};
use kairo::error::{ConditionError, ConditionParseError};

fn ctx(pairs: &[(&str, PropertyValue)], horizontal: bool) -> EvaluationContext {
    let mut ctx = EvaluationContext::new();
    for (name, value) in pairs {
        ctx.set_property(name.to_string(), value.clone());
    }
    ctx.set_state("horizontal", horizontal);
    ctx
}

#[test]
fn test_property_value_parse() {
    assert_eq!(PropertyValue::parse("4700"), PropertyValue::Number(4700.0));
    assert_eq!(PropertyValue::parse("true"), PropertyValue::Boolean(true));
    assert_eq!(
        PropertyValue::parse("4k7"),
        PropertyValue::String("4k7".to_string())
    );
}

#[test]
fn test_property_value_truthiness() {
    assert!(PropertyValue::Number(1.0).is_truthy());
    assert!(!PropertyValue::Number(0.0).is_truthy());
    assert!(PropertyValue::String("x".to_string()).is_truthy());
    assert!(!PropertyValue::String(String::new()).is_truthy());
    assert!(PropertyValue::Boolean(true).is_truthy());
    assert!(!PropertyValue::Boolean(false).is_truthy());
}

#[test]
fn test_parse_current_syntax() {
    let tree = conditions("$Resistance==4700");
    match tree {
        ConditionTree::Leaf(leaf) => {
            assert_eq!(leaf.kind, BindingKind::Property);
            assert_eq!(leaf.name, "Resistance");
            assert_eq!(leaf.comparison, ConditionComparison::Equal);
            assert_eq!(leaf.operand, PropertyValue::Number(4700.0));
        }
        other => panic!("expected a leaf, got {other:?}"),
    }
}

#[test]
fn test_parse_or_binds_tighter_than_and() {
    // horizontal|$flag==1 , $x[lt]5  ==  AND(OR(horizontal, flag==1), x<5)
    let tree = conditions("horizontal|$flag==1,$x[lt]5");
    let ConditionTree::Binary {
        operator: ConditionOperator::And,
        left,
        right,
    } = tree
    else {
        panic!("expected a top-level AND");
    };
    assert!(matches!(
        *left,
        ConditionTree::Binary {
            operator: ConditionOperator::Or,
            ..
        }
    ));
    assert!(matches!(*right, ConditionTree::Leaf(_)));
}

#[test]
fn test_parse_legacy_syntax() {
    let tree = conditions("horizontal,$size(gteq_2),$label(empty)");
    let ctx_match = ctx(
        &[
            ("size", PropertyValue::Number(3.0)),
            ("label", PropertyValue::String(String::new())),
        ],
        true,
    );
    assert!(tree.evaluate(&ctx_match).unwrap());

    let ctx_small = ctx(
        &[
            ("size", PropertyValue::Number(1.0)),
            ("label", PropertyValue::String(String::new())),
        ],
        true,
    );
    assert!(!tree.evaluate(&ctx_small).unwrap());
}

#[test]
fn test_parse_negated_state() {
    let tree = conditions("!horizontal");
    assert!(!tree.evaluate(&ctx(&[], true)).unwrap());
    assert!(tree.evaluate(&ctx(&[], false)).unwrap());
}

#[test]
fn test_parse_rejects_bad_names() {
    assert!(matches!(
        parse_conditions("$2size==1"),
        Err(ConditionParseError::InvalidName(_))
    ));
    assert!(matches!(
        parse_conditions("$_size==1"),
        Err(ConditionParseError::InvalidName(_))
    ));
}

#[test]
fn test_parse_rejects_unknown_comparison() {
    assert!(matches!(
        parse_conditions("$size[approx]3"),
        Err(ConditionParseError::UnknownComparison { .. })
    ));
    assert!(matches!(
        parse_conditions("$size(near_3)"),
        Err(ConditionParseError::UnknownComparison { .. })
    ));
}

#[test]
fn test_evaluate_unbound_is_an_error() {
    let tree = conditions("$missing==1");
    assert!(matches!(
        tree.evaluate(&ctx(&[], true)),
        Err(ConditionError::UnboundProperty(name)) if name == "missing"
    ));

    let tree = conditions("sideways");
    assert!(matches!(
        tree.evaluate(&ctx(&[], true)),
        Err(ConditionError::UnboundState(name)) if name == "sideways"
    ));
}

#[test]
fn test_evaluate_kind_mismatch_is_an_error() {
    let tree = conditions("$size==1");
    let bindings = ctx(&[("size", PropertyValue::String("one".to_string()))], true);
    assert!(matches!(
        tree.evaluate(&bindings),
        Err(ConditionError::TypeMismatch { .. })
    ));
}

#[test]
fn test_and_or_short_circuit_before_unbound() {
    // The left operand decides; the unbound right side is never touched.
    let tree = conditions("$size[lt]1,$missing==1");
    let bindings = ctx(&[("size", PropertyValue::Number(5.0))], true);
    assert_eq!(tree.evaluate(&bindings).unwrap(), false);

    let tree = conditions("$size[gt]1|$missing==1");
    assert_eq!(tree.evaluate(&bindings).unwrap(), true);
}

#[test]
fn test_empty_is_identity_for_both_operators() {
    let leaf = ConditionTree::Leaf(ConditionTreeLeaf::property_equals(
        "size",
        PropertyValue::Number(2.0),
    ));
    assert_eq!(
        ConditionTree::and(ConditionTree::Empty, leaf.clone()),
        leaf
    );
    assert_eq!(ConditionTree::or(leaf.clone(), ConditionTree::Empty), leaf);
}

#[test]
fn test_simplify_preserves_evaluation() {
    // Build trees with explicit Empty terms, then check simplify() agrees
    // with the original under every binding in a small grid.
    let leaf_a = ConditionTree::Leaf(ConditionTreeLeaf::property_equals(
        "a",
        PropertyValue::Number(1.0),
    ));
    let leaf_b = ConditionTree::Leaf(ConditionTreeLeaf::state("horizontal", true));
    let tree = ConditionTree::Binary {
        operator: ConditionOperator::And,
        left: Box::new(ConditionTree::Binary {
            operator: ConditionOperator::Or,
            left: Box::new(ConditionTree::Empty),
            right: Box::new(leaf_a),
        }),
        right: Box::new(ConditionTree::Binary {
            operator: ConditionOperator::And,
            left: Box::new(leaf_b),
            right: Box::new(ConditionTree::Empty),
        }),
    };
    let simplified = tree.clone().simplify();

    for a in [0.0, 1.0, 2.0] {
        for horizontal in [false, true] {
            let bindings = ctx(&[("a", PropertyValue::Number(a))], horizontal);
            assert_eq!(
                tree.evaluate(&bindings).unwrap(),
                simplified.evaluate(&bindings).unwrap(),
                "a={a} horizontal={horizontal}"
            );
        }
    }
}

#[test]
fn test_display_roundtrips_through_parser() {
    let tree = conditions("horizontal|$flag==1,$x[lt]5,$label[empty]");
    let reparsed = parse_conditions(&tree.to_string()).unwrap();
    assert_eq!(tree, reparsed);
}

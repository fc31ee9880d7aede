//! Strategy selection and cross-strategy equivalence.

use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{json, Value};
use sift_validator::prelude::*;

fn definitions(registry: &Registry, paths: &[&str]) -> Vec<FieldDefinition> {
    paths
        .iter()
        .fold(registry.schema(), |builder, path| {
            builder.v(path, |f| f.string().required().min(3))
        })
        .into_definitions()
        .unwrap()
}

#[rstest]
#[case(&[], StrategyKind::Raw)]
#[case(&["name"], StrategyKind::Single)]
#[case(&["a", "b.c"], StrategyKind::Fixed)]
#[case(&["a", "b", "c", "d"], StrategyKind::Fixed)]
#[case(&["a", "b", "c", "d", "e"], StrategyKind::General)]
#[case(&["tags[*]"], StrategyKind::General)]
#[case(&["a", "b["], StrategyKind::Raw)]
fn picks_a_strategy_from_the_shape(#[case] paths: &[&str], #[case] expected: StrategyKind) {
    let registry = Registry::with_builtins();
    let validator = ValidatorFactory::compile(definitions(&registry, paths), ValidatorOptions::default()).unwrap();
    assert_eq!(validator.strategy(), expected);
}

#[test]
fn transforms_leave_the_fast_paths() {
    let registry = Registry::with_builtins();
    let validator = registry
        .schema()
        .v("name", |f| f.string().trim())
        .build()
        .unwrap();
    assert_eq!(validator.strategy(), StrategyKind::General);
}

#[test]
fn forcing_general_rejects_bad_paths() {
    let registry = Registry::with_builtins();
    let options = ValidatorOptions::default().with_strategy(StrategyHint::General);
    let result = ValidatorFactory::compile(definitions(&registry, &["a["]), options);
    assert!(matches!(result, Err(BuildError::InvalidPath { .. })));
}

/// Inputs alternate between valid and invalid for the same field.
fn alternating(i: usize) -> Value {
    match i % 4 {
        0 => json!({"name": "Ada Lovelace"}),
        1 => json!({"name": "Al"}),
        2 => json!({"name": "Grace"}),
        _ => json!({"other": true}),
    }
}

#[test]
fn single_field_path_matches_the_general_path() {
    let registry = Registry::with_builtins();
    let fields = definitions(&registry, &["name"]);

    let single = ValidatorFactory::compile(fields.clone(), ValidatorOptions::default()).unwrap();
    let general = ValidatorFactory::compile(
        fields,
        ValidatorOptions::default().with_strategy(StrategyHint::General),
    )
    .unwrap();
    assert_eq!(single.strategy(), StrategyKind::Single);
    assert_eq!(general.strategy(), StrategyKind::General);

    let mut fast = ValidationResult::default();
    for i in 0..100_000 {
        let input = alternating(i);
        single.validate_into(&input, &mut fast);
        let slow = general.validate(&input);
        assert_eq!(fast, slow, "input #{i}");
        assert_eq!(single.is_valid(&input), slow.valid);
    }
}

#[rstest]
#[case(StrategyHint::Auto)]
#[case(StrategyHint::General)]
#[case(StrategyHint::Raw)]
fn every_strategy_reports_the_same_errors(#[case] strategy: StrategyHint) {
    let registry = Registry::with_builtins();
    let fields = definitions(&registry, &["user.name", "user.nick", "items[*].label"]);
    let reference = ValidatorFactory::compile(fields.clone(), ValidatorOptions::collect_all().with_strategy(StrategyHint::Raw))
        .unwrap();
    let validator =
        ValidatorFactory::compile(fields, ValidatorOptions::collect_all().with_strategy(strategy)).unwrap();

    let inputs = [
        json!({"user": {"name": "Ada", "nick": "ad"}, "items": [{"label": "one"}, {"label": 2}]}),
        json!({"user": null, "items": []}),
        json!({}),
        json!([1, 2, 3]),
    ];
    for input in &inputs {
        assert_eq!(validator.validate(input), reference.validate(input), "{input}");
    }
}

#[test]
fn result_buffers_are_reset_between_calls() {
    let registry = Registry::with_builtins();
    let validator = ValidatorFactory::compile(
        definitions(&registry, &["a", "b"]),
        ValidatorOptions::collect_all(),
    )
    .unwrap();

    let mut result = ValidationResult::default();
    validator.validate_into(&json!({}), &mut result);
    assert_eq!(result.errors.len(), 2);
    validator.validate_into(&json!({"a": "abc", "b": "abc"}), &mut result);
    assert!(result.valid);
    assert!(result.errors.is_empty());
}

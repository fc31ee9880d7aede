//! Property-based tests.

use std::sync::LazyLock;

use proptest::prelude::*;
use serde_json::{json, Map, Value};
use sift_validator::prelude::*;

// ============================================================================
// GENERATORS
// ============================================================================

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-20i64..20).prop_map(Value::from),
        (-20.0f64..20.0).prop_map(Value::from),
        "[a-zA-Z@. -]{0,8}".prop_map(Value::String),
    ]
}

fn json_value() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-e]|name|tags|kind|vat|x-[a-z]", inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

/// Objects over the keys the schemas below talk about, plus the odd
/// non-object root.
fn document() -> impl Strategy<Value = Value> {
    prop_oneof![
        4 => prop::collection::btree_map("a|b|c|name|tags|kind|vat|x-id", json_value(), 0..5)
            .prop_map(|map| Value::Object(map.into_iter().collect::<Map<_, _>>())),
        1 => json_value(),
    ]
}

// ============================================================================
// COMPILED VS DIRECT
// ============================================================================

fn schemas() -> Vec<Value> {
    vec![
        json!({
            "type": "object",
            "required": ["name"],
            "properties": {"name": {"type": "string", "minLength": 3, "maxLength": 6}}
        }),
        json!({
            "type": "object",
            "properties": {
                "a": {"type": "number", "minimum": 0, "exclusiveMaximum": 10, "multipleOf": 0.5},
                "b": {"type": "integer", "maximum": 5, "exclusiveMaximum": true},
                "c": {"exclusiveMinimum": -3}
            }
        }),
        json!({
            "type": "object",
            "properties": {
                "tags": {"type": "array", "minItems": 1, "uniqueItems": true, "items": {"type": "string", "pattern": "^[a-z]"}}
            }
        }),
        json!({
            "type": "object",
            "properties": {
                "kind": {"enum": ["a", "b", 1]},
                "c": {"const": null},
                "a": {"type": ["string", "null"], "minLength": 2}
            }
        }),
        json!({
            "type": "object",
            "properties": {
                "a": {"oneOf": [{"type": "string"}, {"minimum": 0}]},
                "b": {"anyOf": [{"type": "boolean"}, {"type": "array", "maxItems": 1}]},
                "c": {"not": {"type": "null"}}
            }
        }),
        json!({
            "type": "object",
            "required": ["a"],
            "properties": {
                "a": {
                    "type": "object",
                    "required": ["b"],
                    "properties": {"b": {"type": "integer"}, "c": {"type": "object", "properties": {"d": {"type": "string"}}}},
                    "additionalProperties": false
                }
            }
        }),
        json!({
            "type": "object",
            "properties": {"kind": {"type": "string"}, "vat": {}},
            "patternProperties": {"^x-": {"type": "number"}},
            "dependencies": {"vat": ["kind"], "kind": {"properties": {"vat": {"type": "string"}}}},
            "propertyNames": {"maxLength": 4},
            "if": {"properties": {"kind": {"const": "a"}}, "required": ["kind"]},
            "then": {"required": ["vat"]},
            "else": {"maxProperties": 3}
        }),
        json!({
            "type": "object",
            "definitions": {"short": {"type": "string", "maxLength": 2}},
            "properties": {
                "a": {"$ref": "#/definitions/short"},
                "tags": {"type": "array", "items": [{"type": "string"}, {"type": "number"}], "additionalItems": {"$ref": "#/definitions/short"}},
                "b": {"type": "array", "contains": {"type": "boolean"}}
            }
        }),
    ]
}

static COMPILED: LazyLock<Vec<(Value, Validator)>> = LazyLock::new(|| {
    let registry = Registry::with_builtins();
    schemas()
        .into_iter()
        .map(|schema| {
            let validator = from_json_schema(&schema, &registry, JsonSchemaOptions::default())
                .unwrap_or_else(|error| panic!("{schema}: {error}"));
            (schema, validator)
        })
        .collect()
});

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn compiled_schemas_agree_with_the_evaluator(input in document()) {
        for (schema, validator) in COMPILED.iter() {
            let direct = evaluate(&input, schema, schema);
            prop_assert_eq!(validator.is_valid(&input), direct, "schema {} input {}", schema, input);
            prop_assert_eq!(validator.validate(&input).valid, direct);
        }
    }

    #[test]
    fn detailed_errors_are_empty_exactly_when_valid(input in document()) {
        for (schema, _) in COMPILED.iter() {
            prop_assert_eq!(detailed_errors(&input, schema).is_empty(), evaluate(&input, schema, schema));
        }
    }
}

// ============================================================================
// PURITY AND IDEMPOTENCE
// ============================================================================

static BUILT: LazyLock<Validator> = LazyLock::new(|| {
    Registry::with_builtins()
        .schema()
        .v("name", |f| f.string().required().trim().to_lower_case().min(1))
        .v("tags[*]", |f| f.string().trim())
        .v("role", |f| f.string().default_value("user"))
        .options(ValidatorOptions::collect_all())
        .build()
        .unwrap()
});

proptest! {
    #[test]
    fn checks_are_pure(input in document()) {
        let first = BUILT.validate(&input);
        let second = BUILT.validate(&input);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(BUILT.is_valid(&input), first.valid);
    }

    #[test]
    fn parse_is_idempotent(
        name in " {0,2}[a-zA-Z]{1,6} {0,2}",
        tags in prop::collection::vec("[ a-z]{0,5}", 0..4),
    ) {
        let input = json!({"name": name, "tags": tags});
        if let Ok(once) = BUILT.parse(&input, ParseOptions::default()) {
            let twice = BUILT.parse(&once, ParseOptions::default());
            prop_assert_eq!(twice, Ok(once));
        }
    }

    #[test]
    fn abort_early_reports_a_prefix(input in document()) {
        let all = BUILT.validate(&input);
        let first = BUILT
            .safe_parse(&input, ParseOptions::abort_early(true))
            .errors;
        if all.valid {
            prop_assert!(first.is_empty());
        } else {
            prop_assert_eq!(first.errors().first(), all.errors.errors().first());
        }
    }
}

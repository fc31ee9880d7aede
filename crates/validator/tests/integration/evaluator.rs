//! Direct evaluation of raw schemas.

use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{json, Value};
use sift_validator::schema::{detailed_errors, evaluate, specific_errors, SchemaContext};

#[rstest]
// booleans
#[case(json!(true), json!(42), true)]
#[case(json!(false), json!(42), false)]
// type
#[case(json!({"type": "integer"}), json!(3.0), true)]
#[case(json!({"type": "integer"}), json!(3.5), false)]
#[case(json!({"type": ["string", "null"]}), json!(null), true)]
// enum / const
#[case(json!({"enum": [1, "a"]}), json!(1.0), true)]
#[case(json!({"const": {"a": [1]}}), json!({"a": [1]}), true)]
// strings
#[case(json!({"minLength": 2}), json!("é"), false)]
#[case(json!({"maxLength": 2}), json!("éé"), true)]
#[case(json!({"minLength": 3.0}), json!("xy"), false)]
#[case(json!({"pattern": "b+"}), json!("abbc"), true)]
#[case(json!({"format": "ipv4"}), json!("10.0.0.1"), true)]
#[case(json!({"format": "date"}), json!("2024-02-30"), false)]
#[case(json!({"format": "unknown-format"}), json!("anything"), true)]
// numbers
#[case(json!({"multipleOf": 0.1}), json!(0.3), true)]
#[case(json!({"maximum": 5, "exclusiveMaximum": true}), json!(5), false)]
#[case(json!({"exclusiveMinimum": 10}), json!(10.0001), true)]
// arrays
#[case(json!({"items": {"type": "number"}}), json!([1, "x"]), false)]
#[case(json!({"items": [{"type": "string"}], "additionalItems": false}), json!(["a", 1]), false)]
#[case(json!({"items": [{"type": "string"}]}), json!(["a", 1]), true)]
#[case(json!({"contains": {"const": 3}}), json!([1, 2, 3]), true)]
#[case(json!({"uniqueItems": true}), json!([1, 1.0]), false)]
#[case(json!({"maxItems": 1.0}), json!([1, 2]), false)]
// objects
#[case(json!({"propertyNames": {"maxLength": 3}}), json!({"abcd": 1}), false)]
#[case(json!({"patternProperties": {"^n": {"type": "number"}}}), json!({"n1": "x"}), false)]
#[case(json!({"dependencies": {"a": {"required": ["b"]}}}), json!({"a": 1}), false)]
#[case(json!({"minProperties": 1}), json!({}), false)]
#[case(json!({"maxProperties": 1.0}), json!({"a": 1, "b": 2}), false)]
// composition
#[case(json!({"allOf": [{"minimum": 1}, {"maximum": 3}]}), json!(2), true)]
#[case(json!({"anyOf": [{"type": "string"}, {"type": "null"}]}), json!(1), false)]
#[case(json!({"oneOf": [{"minimum": 0}, {"maximum": 10}]}), json!(5), false)]
#[case(json!({"not": {"type": "string"}}), json!(1), true)]
#[case(json!({"if": {"type": "string"}, "then": {"minLength": 2}, "else": {"minimum": 0}}), json!(-1), false)]
fn draft07_keywords(#[case] schema: Value, #[case] value: Value, #[case] expected: bool) {
    assert_eq!(evaluate(&value, &schema, &schema), expected, "{schema} against {value}");
}

#[test]
fn refs_use_the_root_document() {
    let root = json!({
        "$defs": {"name": {"type": "string", "minLength": 1}},
        "definitions": {"a~b": {"$ref": "#/$defs/name"}}
    });
    let schema = json!({"$ref": "#/definitions/a~0b"});
    assert!(evaluate(&json!("x"), &schema, &root));
    assert!(!evaluate(&json!(""), &schema, &root));
}

fn linked_list(depth: usize, last_id: Value) -> Value {
    (0..depth).fold(json!({"id": last_id}), |child, id| json!({"id": id, "child": child}))
}

#[test]
fn deep_data_under_a_recursive_schema() {
    let schema = json!({
        "definitions": {
            "node": {
                "type": "object",
                "required": ["id"],
                "properties": {"id": {"type": "integer"}, "child": {"$ref": "#/definitions/node"}}
            }
        },
        "$ref": "#/definitions/node"
    });
    let valid = linked_list(200, json!(200));
    assert!(evaluate(&valid, &schema, &schema));
    assert!(detailed_errors(&valid, &schema).is_empty());

    let invalid = linked_list(200, json!("last"));
    assert!(!evaluate(&invalid, &schema, &schema));
    let errors = detailed_errors(&invalid, &schema);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].keyword, "type");
}

#[test]
fn reference_cycles_without_progress_fail() {
    let schema = json!({
        "definitions": {"a": {"$ref": "#/definitions/b"}, "b": {"allOf": [{"$ref": "#/definitions/a"}]}},
        "$ref": "#/definitions/a"
    });
    assert!(!evaluate(&json!(1), &schema, &schema));
}

#[test]
fn detailed_errors_report_every_leaf() {
    let schema = json!({
        "type": "object",
        "required": ["id"],
        "properties": {
            "tags": {"type": "array", "items": {"type": "string"}},
            "age": {"type": "integer", "minimum": 0}
        },
        "additionalProperties": false
    });
    let value = json!({"tags": ["a", 1], "age": -2, "extra": true});
    let errors: Vec<(String, String)> = detailed_errors(&value, &schema)
        .into_iter()
        .map(|e| (e.path, e.keyword))
        .collect();
    let expected: Vec<(String, String)> = [
        ("id", "required"),
        ("tags[1]", "type"),
        ("age", "minimum"),
        ("extra", "additionalProperties"),
    ]
    .into_iter()
    .map(|(p, k)| (p.to_owned(), k.to_owned()))
    .collect();
    assert_eq!(errors, expected);
}

#[test]
fn specific_errors_narrow_to_a_field() {
    let schema = json!({
        "type": "object",
        "properties": {
            "user": {
                "type": "object",
                "required": ["name"],
                "properties": {"name": {"type": "string", "minLength": 2}}
            },
            "count": {"type": "integer"}
        }
    });
    let value = json!({"user": {"name": "A"}, "count": "many"});

    let scoped = specific_errors(&value, &schema, "user.name");
    assert_eq!(scoped.len(), 1);
    assert_eq!(scoped[0].path, "user.name");
    assert_eq!(scoped[0].keyword, "minLength");

    assert_eq!(detailed_errors(&value, &schema).len(), 2);
}

#[test]
fn context_caches_patterns_and_checks_refs() {
    let schema = json!({
        "definitions": {"code": {"type": "string", "pattern": "^[A-Z]{3}$"}},
        "type": "array",
        "items": {"$ref": "#/definitions/code"}
    });
    let context = SchemaContext::new(schema.clone());
    context.check(&schema).unwrap();
    assert!(context.is_valid(&json!(["ABC", "XYZ"]), &schema));
    let errors = context.errors(&json!(["ABC", "abc"]), &schema);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path, "[1]");

    assert!(context.check(&json!({"$ref": "#/nowhere"})).is_err());
}

//! JSON Schema compilation through `from_json_schema`.

use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{json, Value};
use sift_validator::prelude::*;
use sift_validator::schema::Constraint;

fn compile(schema: &Value) -> Validator {
    compile_with(schema, JsonSchemaOptions::default())
}

fn compile_with(schema: &Value, options: JsonSchemaOptions) -> Validator {
    let registry = Registry::with_builtins();
    from_json_schema(schema, &registry, options).unwrap()
}

fn first_error(validator: &Validator, input: &Value) -> Option<(String, String)> {
    validator
        .validate(input)
        .errors
        .errors()
        .first()
        .map(|e| (e.path.clone(), e.code.to_string()))
}

fn pair(path: &str, code: &str) -> Option<(String, String)> {
    Some((path.to_owned(), code.to_owned()))
}

#[test]
fn name_scenario() {
    let validator = compile(&json!({
        "type": "object",
        "properties": {"name": {"type": "string", "minLength": 3}},
        "required": ["name"]
    }));

    assert_eq!(first_error(&validator, &json!({"name": "Jo"})), pair("name", "minLength"));
    assert_eq!(first_error(&validator, &json!({})), pair("name", "required"));
    assert_eq!(first_error(&validator, &json!({"name": "Joe"})), None);
}

#[rstest]
#[case(json!({"minimum": 10, "exclusiveMinimum": true}))]
#[case(json!({"exclusiveMinimum": 10}))]
fn exclusive_minimum_in_both_forms(#[case] bound: Value) {
    let mut amount = json!({"type": "number"});
    amount.as_object_mut().unwrap().extend(bound.as_object().unwrap().clone());
    let validator = compile(&json!({"type": "object", "properties": {"amount": amount}}));

    assert!(validator.is_valid(&json!({"amount": 10.0001})));
    assert_eq!(
        first_error(&validator, &json!({"amount": 10})),
        pair("amount", "exclusiveMinimum")
    );
}

#[test]
fn numeric_and_inclusive_bounds_combine() {
    // A numeric exclusive bound sits beside the inclusive one; both apply.
    let validator = compile(&json!({
        "type": "object",
        "properties": {"n": {"minimum": 5, "exclusiveMaximum": 8, "maximum": 10}}
    }));
    assert!(validator.is_valid(&json!({"n": 5})));
    assert!(validator.is_valid(&json!({"n": 7.9})));
    assert!(!validator.is_valid(&json!({"n": 8})));
    assert!(!validator.is_valid(&json!({"n": 4})));
}

#[test]
fn integral_float_bounds_compile() {
    let validator = compile(&json!({
        "type": "object",
        "properties": {
            "a": {"type": "string", "minLength": 3.0},
            "tags": {"type": "array", "maxItems": 2.0},
            "meta": {"type": "object", "properties": {"k": {"type": "string", "maxLength": 1.0}}}
        }
    }));
    assert!(validator.is_valid(&json!({"a": "abc", "tags": [1, 2], "meta": {"k": "x"}})));
    assert_eq!(first_error(&validator, &json!({"a": "xy"})), pair("a", "minLength"));
    assert_eq!(first_error(&validator, &json!({"tags": [1, 2, 3]})), pair("tags", "maxItems"));
    assert_eq!(first_error(&validator, &json!({"meta": {"k": "xy"}})), pair("meta.k", "maxLength"));
}

#[test]
fn deeply_nested_valid_data_passes() {
    let validator = compile(&json!({
        "type": "object",
        "definitions": {
            "node": {"type": "object", "properties": {"child": {"$ref": "#/definitions/node"}}}
        },
        "properties": {"root": {"$ref": "#/definitions/node"}}
    }));
    let tree = (0..200).fold(json!({}), |child, _| json!({"child": child}));
    assert!(validator.is_valid(&json!({"root": tree})));
}

#[rstest]
#[case("medium", false)]
#[case("hi", true)]
#[case("0123456789x", true)]
fn one_of_scenario(#[case] code: &str, #[case] valid: bool) {
    let validator = compile(&json!({
        "type": "object",
        "properties": {"code": {"type": "string", "oneOf": [{"maxLength": 5}, {"minLength": 10}]}}
    }));
    let result = validator.validate(&json!({"code": code}));
    assert_eq!(result.valid, valid);
    if !valid {
        assert_eq!(result.errors.errors()[0].code, "oneOf");
    }
}

#[test]
fn dependencies_scenario() {
    let validator = compile(&json!({
        "type": "object",
        "properties": {"creditCard": {"type": "string"}},
        "dependencies": {"creditCard": ["cvv", "billing"]}
    }));

    let result = validator.validate(&json!({"creditCard": "4111", "billing": "x"}));
    assert!(!result.valid);
    let error = &result.errors.errors()[0];
    assert_eq!(error.code, "dependencies");
    assert_eq!(error.message, "Property `cvv` is required when `creditCard` is present");

    assert!(validator.is_valid(&json!({})));
    assert!(validator.is_valid(&json!({"cvv": 1})));
    assert!(validator.is_valid(&json!({"creditCard": "4111", "cvv": "123", "billing": "x"})));
}

#[test]
fn nested_objects_and_arrays() {
    let validator = compile_with(
        &json!({
            "type": "object",
            "properties": {
                "user": {
                    "type": "object",
                    "required": ["email"],
                    "properties": {"email": {"type": "string", "format": "email"}}
                },
                "tags": {"type": "array", "uniqueItems": true, "items": {"type": "string", "maxLength": 4}}
            }
        }),
        JsonSchemaOptions::default().with_validator(ValidatorOptions::collect_all()),
    );

    assert!(validator.is_valid(&json!({})));
    assert!(validator.is_valid(&json!({"user": {"email": "ada@example.com"}, "tags": ["a", "b"]})));

    let result = validator.validate(&json!({
        "user": {"email": "nope"},
        "tags": ["a", "toolong", "a"]
    }));
    let errors: Vec<(&str, &str)> = result
        .errors
        .errors()
        .iter()
        .map(|e| (e.path.as_str(), e.code.as_ref()))
        .collect();
    assert_eq!(
        errors,
        vec![
            ("user.email", "format"),
            ("tags", "uniqueItems"),
            ("tags[1]", "maxLength"),
        ]
    );
}

#[test]
fn nested_required_waits_for_its_parent() {
    let validator = compile(&json!({
        "type": "object",
        "properties": {
            "address": {"type": "object", "required": ["city"], "properties": {"city": {"type": "string"}}}
        }
    }));
    assert!(validator.is_valid(&json!({})));
    assert_eq!(first_error(&validator, &json!({"address": {}})), pair("address.city", "required"));
    assert_eq!(first_error(&validator, &json!({"address": 3})), pair("address", "type"));
}

#[test]
fn refs_resolve_against_the_document() {
    let validator = compile(&json!({
        "type": "object",
        "definitions": {"positive": {"type": "integer", "exclusiveMinimum": 0}},
        "properties": {"count": {"$ref": "#/definitions/positive", "maximum": 0}}
    }));
    assert!(validator.is_valid(&json!({"count": 3})));
    assert_eq!(first_error(&validator, &json!({"count": 0})), pair("count", "$ref"));
    assert_eq!(first_error(&validator, &json!({"count": 1.5})), pair("count", "$ref"));
}

#[test]
fn recursive_refs_terminate() {
    let validator = compile(&json!({
        "type": "object",
        "definitions": {
            "node": {
                "type": "object",
                "properties": {"children": {"type": "array", "items": {"$ref": "#/definitions/node"}}},
                "required": ["id"]
            }
        },
        "properties": {"tree": {"$ref": "#/definitions/node"}}
    }));
    let valid = json!({"tree": {"id": 1, "children": [{"id": 2, "children": []}]}});
    let invalid = json!({"tree": {"id": 1, "children": [{"children": []}]}});
    assert!(validator.is_valid(&valid));
    assert!(!validator.is_valid(&invalid));
}

#[rstest]
#[case(json!({"$ref": "http://example.com/schema.json"}), "external")]
#[case(json!({"$ref": "#/definitions/missing"}), "missing")]
#[case(json!({"type": "string", "pattern": "("}), "pattern")]
fn compile_time_schema_errors(#[case] property: Value, #[case] kind: &str) {
    let schema = json!({"type": "object", "properties": {"p": property}});
    let registry = Registry::with_builtins();
    let error = from_json_schema(&schema, &registry, JsonSchemaOptions::default()).unwrap_err();
    match kind {
        "external" => assert!(matches!(error, BuildError::ExternalRefUnsupported(_))),
        "missing" => assert!(matches!(error, BuildError::RefNotFound(_))),
        _ => assert!(matches!(error, BuildError::InvalidPattern { .. })),
    }
}

#[test]
fn strict_required_requires_every_property() {
    let schema = json!({"type": "object", "properties": {"a": {}, "b": {}}});
    let lax = compile(&schema);
    let strict = compile_with(&schema, JsonSchemaOptions::default().strict_required(true));
    assert!(lax.is_valid(&json!({})));
    assert_eq!(first_error(&strict, &json!({"a": 1})), pair("b", "required"));
}

#[test]
fn custom_formats_come_from_options() {
    let schema = json!({
        "type": "object",
        "properties": {
            "sku": {"type": "string", "format": "sku"},
            "note": {"type": "string", "format": "no-such-format"}
        }
    });
    let options = JsonSchemaOptions::default().with_format("sku", |s| s.starts_with("SKU-"));
    let validator = compile_with(&schema, options);

    assert!(validator.is_valid(&json!({"sku": "SKU-7", "note": "anything"})));
    let result = validator.validate(&json!({"sku": "7"}));
    assert_eq!(result.errors.errors()[0].message, "Must match format `sku`");
}

#[test]
fn conditionals_and_composition_on_the_root() {
    let validator = compile(&json!({
        "type": "object",
        "properties": {"kind": {"enum": ["person", "company"]}, "vat": {"type": "string"}},
        "if": {"properties": {"kind": {"const": "company"}}},
        "then": {"required": ["vat"]},
        "not": {"required": ["forbidden"]}
    }));

    assert!(validator.is_valid(&json!({"kind": "person"})));
    assert!(validator.is_valid(&json!({"kind": "company", "vat": "DE1"})));
    assert_eq!(first_error(&validator, &json!({"kind": "company"})), pair("", "if"));
    assert_eq!(first_error(&validator, &json!({"kind": "person", "forbidden": 1})), pair("", "not"));
    assert_eq!(first_error(&validator, &json!({"kind": "other"})), pair("kind", "enum"));
}

#[test]
fn closed_objects_and_pattern_properties() {
    let validator = compile(&json!({
        "type": "object",
        "properties": {"id": {"type": "integer"}},
        "patternProperties": {"^x-": {"type": "string"}},
        "additionalProperties": false
    }));
    assert!(validator.is_valid(&json!({"id": 1, "x-trace": "abc"})));
    assert_eq!(first_error(&validator, &json!({"id": 1, "x-trace": 5})), pair("", "patternProperties"));
    assert_eq!(first_error(&validator, &json!({"id": 1, "extra": true})), pair("", "additionalProperties"));
}

#[test]
fn defaults_fill_missing_values_in_parse() {
    let validator = compile(&json!({
        "type": "object",
        "properties": {
            "role": {"type": "string", "default": "member"},
            "settings": {
                "type": "object",
                "properties": {"theme": {"type": "string", "default": "light"}}
            }
        }
    }));
    let data = validator.parse(&json!({"settings": {}}), ParseOptions::default()).unwrap();
    assert_eq!(data, json!({"role": "member", "settings": {"theme": "light"}}));
    // validate treats defaults as annotations.
    assert!(validator.is_valid(&json!({})));
}

#[test]
fn referenced_defaults_fill_in_parse() {
    let validator = compile(&json!({
        "type": "object",
        "definitions": {"role": {"type": "string", "enum": ["member", "admin"], "default": "member"}},
        "properties": {"role": {"$ref": "#/definitions/role"}}
    }));
    let data = validator.parse(&json!({}), ParseOptions::default()).unwrap();
    assert_eq!(data, json!({"role": "member"}));
    assert_eq!(first_error(&validator, &json!({"role": "root"})), pair("role", "$ref"));
}

#[test]
fn type_unions_and_null() {
    let validator = compile(&json!({
        "type": "object",
        "properties": {"middle": {"type": ["string", "null"], "minLength": 1}}
    }));
    assert!(validator.is_valid(&json!({"middle": null})));
    assert!(validator.is_valid(&json!({"middle": "J"})));
    assert_eq!(first_error(&validator, &json!({"middle": ""})), pair("middle", "minLength"));
    assert_eq!(first_error(&validator, &json!({"middle": 1})), pair("middle", "type"));
}

#[test]
fn definitions_carry_schema_metadata() {
    let validator = compile(&json!({
        "type": "object",
        "properties": {"name": {"type": "string", "description": "Display name"}}
    }));
    let name = &validator.definitions()[1];
    assert_eq!(name.path(), "name");
    assert_eq!(name.metadata().description.as_deref(), Some("Display name"));
    assert_eq!(name.metadata().source, sift_validator::DefinitionSource::JsonSchema);
    assert_eq!(Constraint::MinLength.keyword(), "minLength");
}

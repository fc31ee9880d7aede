//! Builder surface: chains, deferred errors, skip semantics, parse.

use pretty_assertions::assert_eq;
use rstest::rstest;
use serde::Deserialize;
use serde_json::{json, Value};
use sift_validator::prelude::*;

fn registry() -> Registry {
    Registry::with_builtins()
}

fn codes(result: &ValidationResult) -> Vec<(&str, &str)> {
    result
        .errors
        .errors()
        .iter()
        .map(|e| (e.path.as_str(), e.code.as_ref()))
        .collect()
}

// ============================================================================
// CHAINS
// ============================================================================

#[test]
fn sub_paths_of_one_object_are_declared_independently() {
    let registry = registry();
    let validator = registry
        .schema()
        .v("user.name", |f| f.string().required().min(2))
        .v("user.age", |f| f.number().int().min(0))
        .options(ValidatorOptions::collect_all())
        .build()
        .unwrap();

    assert!(validator.is_valid(&json!({"user": {"name": "Ada", "age": 36}})));
    let result = validator.validate(&json!({"user": {"name": "A", "age": 1.5}}));
    assert_eq!(
        codes(&result),
        vec![("user.name", "minLength"), ("user.age", "integer")]
    );
}

#[test]
fn a_field_stops_at_its_first_failure() {
    let registry = registry();
    let validator = registry
        .schema()
        .v("code", |f| f.string().min(3).pattern("^[A-Z]+$"))
        .build()
        .unwrap();

    let result = validator.validate(&json!({"code": "a"}));
    assert_eq!(codes(&result), vec![("code", "minLength")]);
    assert_eq!(result.errors.errors()[0].message, "Must be at least 3 characters");
}

#[test]
fn abort_early_stops_after_the_first_field() {
    let registry = registry();
    let build = |options: ValidatorOptions| {
        registry
            .schema()
            .v("a", |f| f.string().required())
            .v("b", |f| f.string().required())
            .options(options)
            .build()
            .unwrap()
    };

    assert_eq!(build(ValidatorOptions::default()).validate(&json!({})).errors.len(), 1);
    assert_eq!(build(ValidatorOptions::collect_all()).validate(&json!({})).errors.len(), 2);
}

#[test]
fn message_overrides_the_last_rule() {
    let registry = registry();
    let validator = registry
        .schema()
        .v("name", |f| f.string().required().message("Name is mandatory"))
        .build()
        .unwrap();

    let result = validator.validate(&json!({}));
    assert_eq!(result.errors.errors()[0].message, "Name is mandatory");
}

// ============================================================================
// DEFERRED ERRORS
// ============================================================================

#[test]
fn disallowed_methods_fail_the_build() {
    let registry = registry();
    let error = registry
        .schema()
        .v("n", |f| f.number().email())
        .build()
        .unwrap_err();
    assert_eq!(
        error,
        BuildError::TypeNotAllowed {
            method: "email".to_owned(),
            base_type: TypeTag::Number,
        }
    );
}

#[test]
fn unknown_methods_fail_the_build() {
    let registry = registry();
    let error = registry
        .schema()
        .v("n", |f| f.any().call("doesNotExist", [1]))
        .build()
        .unwrap_err();
    assert!(matches!(error, BuildError::UnknownMethod { .. }));
}

#[test]
fn closure_errors_keep_their_message() {
    let registry = registry();
    let error = registry
        .schema()
        .try_v("n", |_f| Err::<Chain<'_>, _>("no rules for this field"))
        .build()
        .unwrap_err();
    assert_eq!(
        error,
        BuildError::FieldRuleBuild {
            path: "n".to_owned(),
            message: "no rules for this field".to_owned(),
        }
    );
}

#[test]
fn duplicate_plugin_names_are_rejected() {
    let plugin = || Plugin::new("custom.even", "even", |_params| unreachable!());
    let registry = Registry::new().with(plugin()).unwrap();
    assert_eq!(
        registry.with(plugin()).unwrap_err(),
        BuildError::DuplicateName("custom.even".to_owned())
    );
}

// ============================================================================
// SKIP SEMANTICS
// ============================================================================

#[rstest]
#[case(json!({}), true)]
#[case(json!({"nick": "ab"}), false)]
#[case(json!({"nick": "abc"}), true)]
#[case(json!({"nick": null}), false)]
fn optional_accepts_only_absence(#[case] input: Value, #[case] valid: bool) {
    let registry = registry();
    let validator = registry
        .schema()
        .v("nick", |f| f.string().min(3).optional())
        .build()
        .unwrap();
    assert_eq!(validator.is_valid(&input), valid);
}

#[rstest]
#[case(json!({"nick": null}), true)]
#[case(json!({"nick": "ab"}), false)]
#[case(json!({}), false)]
fn nullable_accepts_only_null(#[case] input: Value, #[case] valid: bool) {
    let registry = registry();
    let validator = registry
        .schema()
        .v("nick", |f| f.string().required().min(3).nullable())
        .build()
        .unwrap();
    assert_eq!(validator.is_valid(&input), valid);
}

#[test]
fn absent_values_still_run_required() {
    let registry = registry();
    let validator = registry
        .schema()
        .v("name", |f| f.string().min(3).required())
        .build()
        .unwrap();
    let result = validator.validate(&json!({}));
    assert_eq!(codes(&result), vec![("name", "required")]);
}

// ============================================================================
// ARRAYS
// ============================================================================

#[test]
fn wildcard_fields_report_concrete_indices() {
    let registry = registry();
    let validator = registry
        .schema()
        .v("items[*].sku", |f| f.string().required().starts_with("SKU-"))
        .options(ValidatorOptions::collect_all())
        .build()
        .unwrap();

    let input = json!({"items": [{"sku": "SKU-1"}, {"sku": "X"}, {}]});
    let result = validator.validate(&input);
    assert_eq!(
        codes(&result),
        vec![("items[1].sku", "startsWith"), ("items[2].sku", "required")]
    );
    assert!(validator.is_valid(&json!({})));
    assert!(validator.is_valid(&json!({"items": "not an array"})));
}

// ============================================================================
// CUSTOM RULES
// ============================================================================

sift_validator::rule! {
    /// Even integers only.
    pub Even for number;
    check(input) { input % 2.0 == 0.0 }
    message(input) { format!("{input} is odd") }
}

#[test]
fn custom_plugins_extend_the_builder() {
    let even = Plugin::new("custom.even", "even", |_params| Ok(HoistedValidator::new("even", Even)))
        .for_types(TypeSet::of(&[TypeTag::Number]));
    let registry = Registry::with_builtins().with(even).unwrap();

    let validator = registry
        .schema()
        .v("n", |f| f.number().call("even", std::iter::empty::<Param>()))
        .build()
        .unwrap();

    assert!(validator.is_valid(&json!({"n": 4})));
    let result = validator.validate(&json!({"n": 3}));
    assert_eq!(result.errors.errors()[0].message, "3 is odd");
    assert!(registry.manifest().iter().any(|d| d.name == "custom.even"));
}

#[test]
fn faults_stay_with_their_field() {
    let registry = registry();
    let validator = registry
        .schema()
        .v("a", |f| f.any().check_with(|_value, _root| Outcome::fault("lookup failed")))
        .v("b", |f| f.string().required())
        .options(ValidatorOptions::collect_all())
        .build()
        .unwrap();

    let result = validator.validate(&json!({"a": 1}));
    assert_eq!(codes(&result), vec![("a", "rule_fault"), ("b", "required")]);
    assert_eq!(result.errors.errors()[0].message, "Rule `custom` failed: lookup failed");
}

#[test]
fn refine_sees_the_root_document() {
    let registry = registry();
    let validator = registry
        .schema()
        .v("confirm", |f| {
            f.string()
                .refine(|value, root| Some(value) == root.get("password"), "Passwords must match")
        })
        .build()
        .unwrap();

    assert!(validator.is_valid(&json!({"password": "x", "confirm": "x"})));
    let result = validator.validate(&json!({"password": "x", "confirm": "y"}));
    assert_eq!(result.errors.errors()[0].message, "Passwords must match");
}

// ============================================================================
// PARSE
// ============================================================================

#[test]
fn parse_applies_transforms_after_checks() {
    let registry = registry();
    let validator = registry
        .schema()
        .v("email", |f| f.string().required().trim().to_lower_case())
        .v("role", |f| f.string().default_value("user"))
        .build()
        .unwrap();

    let data = validator
        .parse(&json!({"email": "  ADA@Example.com "}), ParseOptions::default())
        .unwrap();
    assert_eq!(data, json!({"email": "ada@example.com", "role": "user"}));

    let again = validator.parse(&data, ParseOptions::default()).unwrap();
    assert_eq!(again, data);
}

#[test]
fn parse_returns_errors_without_transforming() {
    let registry = registry();
    let validator = registry
        .schema()
        .v("email", |f| f.string().required().trim())
        .build()
        .unwrap();

    let result = validator.safe_parse(&json!({}), ParseOptions::default());
    assert!(!result.valid);
    assert_eq!(result.data, None);
    assert!(result.errors.contains_code("required"));
}

#[derive(Debug, Deserialize, PartialEq)]
struct Signup {
    email: String,
    age: u8,
}

#[test]
fn parse_as_deserializes_the_data() {
    let registry = registry();
    let validator = registry
        .schema()
        .v("email", |f| f.string().required().trim())
        .v("age", |f| f.number().required().int())
        .build()
        .unwrap();

    let signup: Signup = validator
        .parse_as(&json!({"email": " a@b.io", "age": 30}), ParseOptions::default())
        .unwrap();
    assert_eq!(
        signup,
        Signup {
            email: "a@b.io".to_owned(),
            age: 30
        }
    );

    let errors = validator
        .parse_as::<Signup>(&json!({"email": "a@b.io", "age": 300}), ParseOptions::default())
        .unwrap_err();
    assert!(errors.contains_code("deserialize"));
}

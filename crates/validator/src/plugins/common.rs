//! Type, presence and value rules usable on every base type.

use std::borrow::Cow;

use serde_json::Value;

use crate::error::codes;
use crate::plugin::{Args, Category, HoistedValidator, Outcome, Plugin, Predicate, Rule, RuleFlags};
use crate::value::{describe, is_integer, json_equal, json_type_name, TypeTag};

// ============================================================================
// TYPE RULES
// ============================================================================

/// Checks the base type a builder chain was started on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseType(pub TypeTag);

impl Rule for BaseType {
    fn check(&self, value: Option<&Value>, _root: &Value) -> Outcome {
        Outcome::from_bool(value.is_some_and(|v| self.0.matches(v)))
    }

    fn message(&self, value: Option<&Value>, _path: &str) -> Cow<'static, str> {
        match (self.0, value) {
            (TypeTag::Date, Some(Value::String(_))) => {
                Cow::Borrowed("Expected date, received an unparseable string")
            }
            (tag, value) => format!("Expected {tag}, received {}", describe(value)).into(),
        }
    }
}

/// JSON Schema `type`: one or more type names, `integer` and `null` included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonTypes(pub Vec<String>);

impl JsonTypes {
    /// Returns true if `value` has one of the types.
    #[must_use]
    pub fn admits(&self, value: &Value) -> bool {
        self.0.iter().any(|name| json_type_matches(name, value))
    }
}

/// Returns true if `value` is of the JSON Schema type `name`.
#[must_use]
pub fn json_type_matches(name: &str, value: &Value) -> bool {
    match name {
        "integer" => is_integer(value),
        "null" => value.is_null(),
        other => json_type_name(value) == other,
    }
}

impl Rule for JsonTypes {
    fn check(&self, value: Option<&Value>, _root: &Value) -> Outcome {
        Outcome::from_bool(value.is_some_and(|v| self.admits(v)))
    }

    fn message(&self, value: Option<&Value>, _path: &str) -> Cow<'static, str> {
        format!("Expected {}, received {}", self.0.join(" or "), describe(value)).into()
    }
}

// ============================================================================
// PRESENCE
// ============================================================================

/// Rejects absent values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Required;

impl Rule for Required {
    fn check(&self, value: Option<&Value>, _root: &Value) -> Outcome {
        Outcome::from_bool(value.is_some())
    }

    fn message(&self, _value: Option<&Value>, _path: &str) -> Cow<'static, str> {
        Cow::Borrowed("This field is required")
    }
}

/// Carrier for the `optional` / `nullable` flags; never fails by itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Modifier;

impl Rule for Modifier {
    fn check(&self, _value: Option<&Value>, _root: &Value) -> Outcome {
        Outcome::Valid
    }

    fn message(&self, _value: Option<&Value>, _path: &str) -> Cow<'static, str> {
        Cow::Borrowed("")
    }
}

// ============================================================================
// VALUES
// ============================================================================

crate::rule! {
    /// The value must equal a fixed value (numbers compare by value).
    pub Literal { expected: Value } for any;
    check(self, input) { json_equal(input, &self.expected) }
    message(self, input) { format!("Must equal {}", self.expected) }
}

crate::rule! {
    /// The value must equal one of a list of values.
    pub OneOf { allowed: Vec<Value> } for any;
    check(self, input) { self.allowed.iter().any(|a| json_equal(input, a)) }
    message(self, input) {
        let allowed: Vec<String> = self.allowed.iter().map(Value::to_string).collect();
        format!("Must be one of: {}", allowed.join(", "))
    }
}

/// A caller-supplied check.
#[derive(Clone)]
pub struct Refine {
    pub predicate: Predicate,
    pub message: Option<Cow<'static, str>>,
}

impl Rule for Refine {
    fn check(&self, value: Option<&Value>, root: &Value) -> Outcome {
        let Some(value) = value else {
            return Outcome::Valid;
        };
        match (self.predicate)(value, root) {
            Outcome::Invalid { message: None } => Outcome::Invalid {
                message: self.message.clone(),
            },
            outcome => outcome,
        }
    }

    fn message(&self, _value: Option<&Value>, _path: &str) -> Cow<'static, str> {
        self.message.clone().unwrap_or(Cow::Borrowed("Invalid value"))
    }
}

// ============================================================================
// PLUGINS
// ============================================================================

fn modifier(method: &'static str, flags: RuleFlags) -> Plugin {
    Plugin::new(format!("core.{method}"), method, move |params| {
        Args::new(method, params).exactly(0)?;
        Ok(HoistedValidator::new(method, Modifier).with_flags(flags))
    })
    .with_category(Category::Core)
}

pub(crate) fn plugins() -> Vec<Plugin> {
    vec![
        Plugin::new("core.required", "required", |params| {
            let args = Args::new("required", params);
            args.between(0, 1)?;
            let rule = HoistedValidator::new(codes::REQUIRED, Required);
            Ok(match args.opt_string(0)? {
                Some(message) => rule.with_message(message.to_owned()),
                None => rule,
            })
        })
        .with_category(Category::Core)
        .with_description("Value must be present"),
        modifier(
            "optional",
            RuleFlags {
                optional: true,
                ..RuleFlags::default()
            },
        )
        .with_description("An absent value passes the whole field"),
        modifier(
            "nullable",
            RuleFlags {
                nullable: true,
                ..RuleFlags::default()
            },
        )
        .with_description("A null value passes the whole field"),
        Plugin::new("core.literal", "literal", |params| {
            let args = Args::new("literal", params);
            args.exactly(1)?;
            let expected = args.value(0)?.clone();
            Ok(HoistedValidator::new(
                codes::CONST,
                Literal {
                    expected: expected.clone(),
                },
            )
            .with_params([expected])
            .skip_for_undefined())
        })
        .with_category(Category::Core)
        .with_description("Value must equal the given value"),
        Plugin::new("core.oneOf", "oneOf", |params| {
            let args = Args::new("oneOf", params);
            args.exactly(1)?;
            let allowed = args.array(0)?.to_vec();
            if allowed.is_empty() {
                return Err(args.error("the list of allowed values is empty"));
            }
            Ok(HoistedValidator::new(
                codes::ENUM,
                OneOf {
                    allowed: allowed.clone(),
                },
            )
            .with_params([Value::Array(allowed)])
            .skip_for_undefined())
        })
        .with_category(Category::Core)
        .with_description("Value must equal one of the given values"),
        Plugin::new("core.refine", "refine", |params| {
            let args = Args::new("refine", params);
            args.between(1, 3)?;
            let predicate = args.predicate(0)?;
            let message = args.opt_string(1)?.map(|m| Cow::Owned(m.to_owned()));
            let code = args
                .opt_string(2)?
                .map_or(Cow::Borrowed(codes::CUSTOM), |c| Cow::Owned(c.to_owned()));
            Ok(HoistedValidator::new(code, Refine { predicate, message }).skip_for_undefined())
        })
        .with_category(Category::Core)
        .with_description("Custom check function over the value and the root document"),
    ]
}

//! Bridge rules: JSON Schema keywords with no native rule, checked by the
//! direct evaluator.

use std::borrow::Cow;
use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::error::{codes, BuildError};
use crate::plugin::{Args, Category, HoistedValidator, Outcome, Plugin, Rule};
use crate::schema::SchemaContext;

/// Keyword families handled by a bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bridge {
    AllOf,
    AnyOf,
    OneOf,
    Not,
    /// `if` / `then` / `else`; the fragment holds all three.
    Conditional,
    Ref,
    Contains,
    /// Array-form `items` plus `additionalItems`.
    TupleItems,
    /// `additionalProperties` with the declared `properties` and
    /// `patternProperties` it is relative to.
    AdditionalProperties,
    PatternProperties,
    PropertyNames,
    Dependencies,
    /// The `false` schema.
    Never,
    /// Any other keyword, as `{ keyword: fragment }`.
    Keyword(&'static str),
}

impl Bridge {
    /// Bridges exposed as registry methods.
    pub const REGISTERED: [Bridge; 13] = [
        Bridge::AllOf,
        Bridge::AnyOf,
        Bridge::OneOf,
        Bridge::Not,
        Bridge::Conditional,
        Bridge::Ref,
        Bridge::Contains,
        Bridge::TupleItems,
        Bridge::AdditionalProperties,
        Bridge::PatternProperties,
        Bridge::PropertyNames,
        Bridge::Dependencies,
        Bridge::Never,
    ];

    /// Builder method name.
    #[must_use]
    pub const fn method(self) -> &'static str {
        match self {
            Bridge::AllOf => "allOf",
            Bridge::AnyOf => "anyOf",
            Bridge::OneOf => "exactlyOneOf",
            Bridge::Not => "not",
            Bridge::Conditional => "ifThenElse",
            Bridge::Ref => "ref",
            Bridge::Contains => "contains",
            Bridge::TupleItems => "tupleItems",
            Bridge::AdditionalProperties => "additionalProperties",
            Bridge::PatternProperties => "patternProperties",
            Bridge::PropertyNames => "propertyNames",
            Bridge::Dependencies => "dependencies",
            Bridge::Never => "never",
            Bridge::Keyword(keyword) => keyword,
        }
    }

    /// Error code reported on failure.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Bridge::AllOf => codes::ALL_OF,
            Bridge::AnyOf => codes::ANY_OF,
            Bridge::OneOf => codes::ONE_OF,
            Bridge::Not => codes::NOT,
            Bridge::Conditional => codes::IF,
            Bridge::Ref => codes::REF,
            Bridge::Contains => codes::CONTAINS,
            Bridge::TupleItems => codes::ITEMS,
            Bridge::AdditionalProperties => codes::ADDITIONAL_PROPERTIES,
            Bridge::PatternProperties => codes::PATTERN_PROPERTIES,
            Bridge::PropertyNames => codes::PROPERTY_NAMES,
            Bridge::Dependencies => codes::DEPENDENCIES,
            Bridge::Never => codes::FALSE_SCHEMA,
            Bridge::Keyword(keyword) => keyword,
        }
    }

    const fn fallback_message(self) -> &'static str {
        match self {
            Bridge::AllOf => "Must match all schemas in allOf",
            Bridge::AnyOf => "Must match at least one schema in anyOf",
            Bridge::OneOf => "Must match exactly one schema in oneOf",
            Bridge::Not => "Must not match the schema in not",
            Bridge::Conditional => "Must match the conditional schema",
            Bridge::Ref => "Must match the referenced schema",
            Bridge::Contains => "Must contain at least one matching item",
            Bridge::TupleItems => "Items do not match the tuple schema",
            Bridge::AdditionalProperties => "Contains properties that are not allowed",
            Bridge::PatternProperties => "Properties do not match their patterns",
            Bridge::PropertyNames => "Contains an invalid property name",
            Bridge::Dependencies => "Property dependencies are not satisfied",
            Bridge::Never => "No value is allowed here",
            Bridge::Keyword(_) => "Invalid value",
        }
    }

    /// The schema the evaluator checks, built from the keyword's fragment.
    fn wrap(self, fragment: &Value) -> Value {
        match self {
            Bridge::Conditional | Bridge::TupleItems | Bridge::AdditionalProperties => fragment.clone(),
            Bridge::Never => Value::Bool(false),
            Bridge::Ref => json!({ "$ref": fragment }),
            other => {
                let keyword = match other {
                    Bridge::OneOf => "oneOf",
                    other => other.method(),
                };
                let mut map = Map::new();
                map.insert(keyword.to_owned(), fragment.clone());
                Value::Object(map)
            }
        }
    }
}

/// A subschema checked by the evaluator.
#[derive(Debug, Clone)]
pub struct SchemaRule {
    bridge: Bridge,
    schema: Value,
    context: Arc<SchemaContext>,
}

impl SchemaRule {
    /// The schema checked against each value.
    #[must_use]
    pub fn schema(&self) -> &Value {
        &self.schema
    }
}

impl Rule for SchemaRule {
    fn check(&self, value: Option<&Value>, _root: &Value) -> Outcome {
        let Some(value) = value else {
            return Outcome::Valid;
        };
        if self.context.is_valid(value, &self.schema) {
            return Outcome::Valid;
        }
        let first = self.context.errors(value, &self.schema).into_iter().next();
        Outcome::Invalid {
            message: first.map(|error| Cow::Owned(error.message)),
        }
    }

    fn message(&self, _value: Option<&Value>, _path: &str) -> Cow<'static, str> {
        Cow::Borrowed(self.bridge.fallback_message())
    }
}

/// Builds the rule for one keyword fragment, evaluated within `context`.
///
/// References and patterns inside the fragment are checked here, so a
/// dangling `$ref` fails at build time rather than on every value.
pub fn bridge(
    kind: Bridge,
    fragment: &Value,
    context: Arc<SchemaContext>,
) -> Result<HoistedValidator, BuildError> {
    let schema = kind.wrap(fragment);
    context.check(&schema)?;
    let rule = SchemaRule {
        bridge: kind,
        schema,
        context,
    };
    Ok(HoistedValidator::new(kind.code(), rule)
        .with_params([fragment.clone()])
        .skip_for_undefined())
}

pub(crate) fn plugins() -> Vec<Plugin> {
    Bridge::REGISTERED
        .into_iter()
        .map(|kind| {
            let method = kind.method();
            Plugin::new(format!("schema.{method}"), method, move |params| {
                let args = Args::new(method, params);
                let (fragment, root) = if kind == Bridge::Never {
                    args.between(0, 1)?;
                    (Value::Null, args.opt_value(0))
                } else {
                    args.between(1, 2)?;
                    (args.value(0)?.clone(), args.opt_value(1))
                };
                let root = root.cloned().unwrap_or_else(|| kind.wrap(&fragment));
                bridge(kind, &fragment, Arc::new(SchemaContext::new(root)))
            })
            .with_category(Category::Composition)
            .with_description(kind.fallback_message())
        })
        .collect()
}

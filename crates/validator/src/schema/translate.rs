//! Turning [`DslEntry`] lists into field definitions.
//!
//! Keywords with a native rule for the entry's base type go through the
//! registry; everything else becomes a bridge rule checked by the evaluator.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::builder::{Chain, FieldStart};
use crate::definition::{DefinitionSource, FieldDefinition};
use crate::error::{codes, BuildError};
use crate::path::{FieldPath, Segment};
use crate::plugin::{HoistedValidator, Outcome, Param};
use crate::plugins::common::JsonTypes;
use crate::plugins::format::Format;
use crate::plugins::schema::{bridge, Bridge};
use crate::registry::Registry;
use crate::schema::dsl::{Constraint, DslEntry};
use crate::schema::SchemaContext;
use crate::value::TypeTag;

/// Base type for the declared JSON Schema types.
///
/// `integer` maps to number; `null` and type unions fall back to any, with
/// the exact check left to the `type` rule.
#[must_use]
pub fn base_type_of(types: &[&str]) -> TypeTag {
    match types {
        ["string"] => TypeTag::String,
        ["number" | "integer"] => TypeTag::Number,
        ["boolean"] => TypeTag::Boolean,
        ["array"] => TypeTag::Array,
        ["object"] => TypeTag::Object,
        _ => TypeTag::Any,
    }
}

/// The native method for a keyword and the base type it is defined on.
const fn native(constraint: Constraint) -> Option<(TypeTag, &'static str)> {
    Some(match constraint {
        Constraint::MinLength => (TypeTag::String, "min"),
        Constraint::MaxLength => (TypeTag::String, "max"),
        Constraint::Pattern => (TypeTag::String, "pattern"),
        Constraint::Minimum => (TypeTag::Number, "min"),
        Constraint::Maximum => (TypeTag::Number, "max"),
        Constraint::ExclusiveMinimum => (TypeTag::Number, "gt"),
        Constraint::ExclusiveMaximum => (TypeTag::Number, "lt"),
        Constraint::MultipleOf => (TypeTag::Number, "multipleOf"),
        Constraint::MinItems => (TypeTag::Array, "min"),
        Constraint::MaxItems => (TypeTag::Array, "max"),
        Constraint::UniqueItems => (TypeTag::Array, "unique"),
        Constraint::MinProperties => (TypeTag::Object, "min"),
        Constraint::MaxProperties => (TypeTag::Object, "max"),
        _ => return None,
    })
}

/// Bridge for the schema-only keywords.
const fn bridge_kind(constraint: Constraint) -> Option<Bridge> {
    Some(match constraint {
        Constraint::AllOf => Bridge::AllOf,
        Constraint::AnyOf => Bridge::AnyOf,
        Constraint::OneOf => Bridge::OneOf,
        Constraint::Not => Bridge::Not,
        Constraint::Conditional => Bridge::Conditional,
        Constraint::Ref => Bridge::Ref,
        Constraint::Contains => Bridge::Contains,
        Constraint::TupleItems => Bridge::TupleItems,
        Constraint::AdditionalProperties => Bridge::AdditionalProperties,
        Constraint::PatternProperties => Bridge::PatternProperties,
        Constraint::PropertyNames => Bridge::PropertyNames,
        Constraint::Dependencies => Bridge::Dependencies,
        Constraint::FalseSchema => Bridge::Never,
        _ => return None,
    })
}

/// Builds the definition for one entry.
///
/// The chain starts with the `type` rule, then `required`, then every other
/// keyword in the order the entry lists them.
pub fn dsl_to_field_definition(
    entry: &DslEntry,
    registry: &Registry,
    context: &Arc<SchemaContext>,
) -> Result<FieldDefinition, BuildError> {
    let types = entry.types();
    let base_type = base_type_of(&types);
    let type_rule = (!types.is_empty()).then(|| {
        let names = types.iter().map(|name| (*name).to_owned()).collect();
        HoistedValidator::new(codes::TYPE, JsonTypes(names)).skip_for_undefined()
    });

    let mut chain = FieldStart::new(registry, &entry.path).with_type_rule(base_type, type_rule);
    if entry.get(Constraint::Required).is_some() {
        chain = chain.required();
    }

    for (&constraint, value) in &entry.constraints {
        chain = match constraint {
            Constraint::Required => chain,
            Constraint::Description => match value.as_str() {
                Some(text) => chain.describe(text),
                None => chain,
            },
            Constraint::Default => chain.default_value(value.clone()),
            Constraint::Enum => match value.as_array() {
                Some(allowed) if !allowed.is_empty() => chain.call("oneOf", [value.clone()]),
                _ => chain.push(bridge(Bridge::Keyword("enum"), value, Arc::clone(context))?),
            },
            Constraint::Const => chain.call("literal", [value.clone()]),
            Constraint::Format => format_rule(chain, base_type, value, context)?,
            other => keyword_rule(chain, base_type, other, value, context)?,
        };
    }

    let mut definition = chain.finish()?;
    let metadata = definition.metadata_mut();
    metadata.source = DefinitionSource::JsonSchema;
    metadata.requires_parent_object = entry.nested && ends_in_key(&entry.path);
    Ok(definition)
}

fn keyword_rule<'r>(
    chain: Chain<'r>,
    base_type: TypeTag,
    constraint: Constraint,
    value: &Value,
    context: &Arc<SchemaContext>,
) -> Result<Chain<'r>, BuildError> {
    if let Some(kind) = bridge_kind(constraint) {
        return Ok(chain.push(bridge(kind, value, Arc::clone(context))?));
    }
    match native(constraint) {
        Some((tag, method)) if tag == base_type => {
            if constraint == Constraint::UniqueItems {
                Ok(chain.call(method, std::iter::empty::<Param>()))
            } else {
                Ok(chain.call(method, [value.clone()]))
            }
        }
        _ => Ok(chain.push(bridge(
            Bridge::Keyword(constraint.keyword()),
            value,
            Arc::clone(context),
        )?)),
    }
}

fn format_rule<'r>(
    chain: Chain<'r>,
    base_type: TypeTag,
    value: &Value,
    context: &Arc<SchemaContext>,
) -> Result<Chain<'r>, BuildError> {
    let Some(name) = value.as_str() else {
        return Ok(chain);
    };
    if let Some(check) = context.formats().get(name) {
        let check = Arc::clone(check);
        let predicate = Param::predicate(move |value, _root| {
            Outcome::from_bool(value.as_str().is_none_or(|s| check(s)))
        });
        return Ok(chain.call(
            "refine",
            [
                predicate,
                Param::from(format!("Must match format `{name}`")),
                Param::from(codes::FORMAT),
            ],
        ));
    }
    match Format::from_name(name) {
        Some(format) if base_type == TypeTag::String => Ok(chain.call(format.method(), std::iter::empty::<Param>())),
        Some(_) => Ok(chain.push(bridge(Bridge::Keyword("format"), value, Arc::clone(context))?)),
        None => {
            warn!(format = name, "unknown format; the keyword is ignored");
            Ok(chain)
        }
    }
}

fn ends_in_key(path: &str) -> bool {
    matches!(
        FieldPath::lenient(path).segments().last(),
        Some(Segment::Key(_))
    )
}

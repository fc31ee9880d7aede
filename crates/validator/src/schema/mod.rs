//! JSON Schema (Draft-07) support.
//!
//! Two routes share one keyword semantics:
//!
//! - [`from_json_schema`] compiles an object schema into a [`Validator`]:
//!   the schema is flattened into per-path entries ([`dsl`]), each entry is
//!   translated into a field definition ([`translate`]), and the factory
//!   picks a strategy as for builder schemas.
//! - [`evaluate`], [`detailed_errors`] and [`specific_errors`] check a value
//!   against any schema directly, with no compilation step.
//!
//! Keywords that have no native rule are bridged to the direct evaluator,
//! so both routes accept the same values.

pub mod context;
pub mod dsl;
pub mod evaluate;
pub mod refs;
pub mod report;
pub mod translate;

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::BuildError;
use crate::factory::{Validator, ValidatorFactory, ValidatorOptions};
use crate::registry::Registry;

pub use context::{CustomFormats, FormatFn, SchemaContext};
pub use dsl::{schema_to_dsl, schema_to_dsl_with, Constraint, DslEntry, DslOptions};
pub use evaluate::evaluate;
pub use refs::resolve_ref;
pub use report::{detailed_errors, specific_errors, SchemaError};
pub use translate::dsl_to_field_definition;

/// Options for [`from_json_schema`].
#[derive(Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JsonSchemaOptions {
    /// Treat every declared property as required.
    pub strict_required: bool,
    /// When false, objects with `properties` and no `additionalProperties`
    /// reject undeclared keys.
    pub allow_additional_properties: bool,
    /// Checks for `format` names beyond the built-in ones.
    #[serde(skip)]
    pub custom_formats: CustomFormats,
    /// Passed through to the factory.
    pub validator: ValidatorOptions,
}

impl Default for JsonSchemaOptions {
    fn default() -> Self {
        Self {
            strict_required: false,
            allow_additional_properties: true,
            custom_formats: CustomFormats::new(),
            validator: ValidatorOptions::default(),
        }
    }
}

impl JsonSchemaOptions {
    /// Reads options from JSON; custom formats can only be added in code.
    pub fn from_json(value: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }

    #[must_use]
    pub fn strict_required(mut self, strict: bool) -> Self {
        self.strict_required = strict;
        self
    }

    #[must_use]
    pub fn allow_additional_properties(mut self, allow: bool) -> Self {
        self.allow_additional_properties = allow;
        self
    }

    /// Registers a check for `format: name`.
    #[must_use]
    pub fn with_format<F>(mut self, name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.custom_formats.insert(name.into(), Arc::new(check));
        self
    }

    #[must_use]
    pub fn with_validator(mut self, validator: ValidatorOptions) -> Self {
        self.validator = validator;
        self
    }

    const fn dsl(&self) -> DslOptions {
        DslOptions {
            strict_required: self.strict_required,
            allow_additional_properties: self.allow_additional_properties,
        }
    }
}

impl fmt::Debug for JsonSchemaOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchemaOptions")
            .field("strict_required", &self.strict_required)
            .field("allow_additional_properties", &self.allow_additional_properties)
            .field("custom_formats", &self.custom_formats.keys().collect::<Vec<_>>())
            .field("validator", &self.validator)
            .finish()
    }
}

/// Compiles an object schema into a validator.
///
/// The root must be `{"type": "object", "properties": {...}}`. Every `$ref`
/// must resolve within the document and every pattern must compile; both
/// are checked here, before any value is seen.
///
/// ```rust
/// use serde_json::json;
/// use sift_validator::{schema::{from_json_schema, JsonSchemaOptions}, Registry};
///
/// let schema = json!({
///     "type": "object",
///     "required": ["name"],
///     "properties": {"name": {"type": "string", "minLength": 2}}
/// });
/// let registry = Registry::with_builtins();
/// let validator = from_json_schema(&schema, &registry, JsonSchemaOptions::default()).unwrap();
///
/// assert!(validator.is_valid(&json!({"name": "Ada"})));
/// let result = validator.validate(&json!({}));
/// assert_eq!(result.errors.errors()[0].code, "required");
/// ```
pub fn from_json_schema(
    schema: &Value,
    registry: &Registry,
    options: JsonSchemaOptions,
) -> Result<Validator, BuildError> {
    check_root(schema)?;

    let context = Arc::new(SchemaContext::new(schema.clone()).with_formats(options.custom_formats.clone()));
    context.check(schema)?;

    let entries = schema_to_dsl_with(schema, "", schema, options.dsl());
    let definitions = entries
        .iter()
        .map(|entry| dsl_to_field_definition(entry, registry, &context))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(
        entries = entries.len(),
        strict_required = options.strict_required,
        "translated JSON Schema"
    );

    ValidatorFactory::compile(definitions, options.validator)
}

fn check_root(schema: &Value) -> Result<(), BuildError> {
    let Some(map) = schema.as_object() else {
        return Err(BuildError::InvalidRootSchema("the root schema must be an object".into()));
    };
    if map.get("type").and_then(Value::as_str) != Some("object") {
        return Err(BuildError::InvalidRootSchema(
            "the root schema must declare `\"type\": \"object\"`".into(),
        ));
    }
    if !map.get("properties").is_some_and(Value::is_object) {
        return Err(BuildError::InvalidRootSchema(
            "the root schema must declare `properties`".into(),
        ));
    }
    Ok(())
}

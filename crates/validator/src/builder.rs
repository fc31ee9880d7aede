//! Fluent field rule composer.
//!
//! ```rust
//! use serde_json::json;
//! use sift_validator::registry::Registry;
//!
//! let registry = Registry::with_builtins();
//! let validator = registry
//!     .schema()
//!     .v("name", |b| b.string().required().min(3))
//!     .v("email", |b| b.string().optional().email())
//!     .v("tags[*]", |b| b.string().max(10))
//!     .build()
//!     .unwrap();
//!
//! assert!(validator.validate(&json!({"name": "Ada", "tags": ["x"]})).valid);
//! let result = validator.validate(&json!({"name": "Al"}));
//! assert_eq!(result.errors.errors()[0].code, "minLength");
//! ```
//!
//! Resolution errors are deferred: a chain that calls a method its base type
//! does not allow keeps the error and [`SchemaBuilder::build`] returns it.

use std::borrow::Cow;
use std::fmt::Display;

use serde_json::Value;

use crate::definition::{FieldDefinition, Transform};
use crate::error::BuildError;
use crate::factory::{Validator, ValidatorFactory, ValidatorOptions};
use crate::plugin::{HoistedValidator, Outcome, Param};
use crate::plugins::common::BaseType;
use crate::registry::Registry;
use crate::value::TypeTag;

// ============================================================================
// SCHEMA BUILDER
// ============================================================================

/// Collects field definitions for one validator.
#[derive(Debug, Clone)]
pub struct SchemaBuilder<'r> {
    registry: &'r Registry,
    definitions: Vec<FieldDefinition>,
    options: ValidatorOptions,
    error: Option<BuildError>,
}

impl<'r> SchemaBuilder<'r> {
    #[must_use]
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            definitions: Vec::new(),
            options: ValidatorOptions::default(),
            error: None,
        }
    }

    /// Declares a field.
    ///
    /// After the first failing declaration further calls are ignored and the
    /// error is returned by [`build`](Self::build).
    #[must_use]
    pub fn v<F>(mut self, path: &str, declare: F) -> Self
    where
        F: FnOnce(FieldStart<'r>) -> Chain<'r>,
    {
        if self.error.is_none() {
            let chain = declare(FieldStart::new(self.registry, path));
            self.push(chain.finish());
        }
        self
    }

    /// Declares a field with a fallible closure.
    ///
    /// An `Err` from the closure is wrapped as
    /// [`BuildError::FieldRuleBuild`], keeping its message.
    #[must_use]
    pub fn try_v<F, E>(mut self, path: &str, declare: F) -> Self
    where
        F: FnOnce(FieldStart<'r>) -> Result<Chain<'r>, E>,
        E: Display,
    {
        if self.error.is_none() {
            let result = declare(FieldStart::new(self.registry, path))
                .map_err(|e| BuildError::FieldRuleBuild {
                    path: path.to_owned(),
                    message: e.to_string(),
                })
                .and_then(Chain::finish);
            self.push(result);
        }
        self
    }

    /// Adds an already built definition.
    #[must_use]
    pub fn field(mut self, definition: FieldDefinition) -> Self {
        if self.error.is_none() {
            self.definitions.push(definition);
        }
        self
    }

    fn push(&mut self, result: Result<FieldDefinition, BuildError>) {
        match result {
            Ok(definition) => self.definitions.push(definition),
            Err(error) => self.error = Some(error),
        }
    }

    /// Sets the options of the built validator.
    #[must_use]
    pub fn options(mut self, options: ValidatorOptions) -> Self {
        self.options = options;
        self
    }

    /// Definitions declared so far.
    #[must_use]
    pub fn definitions(&self) -> &[FieldDefinition] {
        &self.definitions
    }

    /// The first declaration error, if any.
    #[must_use]
    pub fn error(&self) -> Option<&BuildError> {
        self.error.as_ref()
    }

    /// Returns the definitions, or the first declaration error.
    pub fn into_definitions(self) -> Result<Vec<FieldDefinition>, BuildError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.definitions),
        }
    }

    /// Compiles the declared fields into a validator.
    pub fn build(self) -> Result<Validator, BuildError> {
        let options = self.options.clone();
        ValidatorFactory::compile(self.into_definitions()?, options)
    }
}

// ============================================================================
// FIELD START
// ============================================================================

/// Picks the base type of a field.
#[derive(Debug, Clone)]
pub struct FieldStart<'r> {
    registry: &'r Registry,
    path: String,
}

impl<'r> FieldStart<'r> {
    /// Starts a field outside a [`SchemaBuilder`].
    #[must_use]
    pub fn new(registry: &'r Registry, path: &str) -> Self {
        Self {
            registry,
            path: path.to_owned(),
        }
    }

    /// Starts a chain on `base_type`, checking it first.
    #[must_use]
    pub fn of(self, base_type: TypeTag) -> Chain<'r> {
        let type_rule = (base_type != TypeTag::Any).then(|| {
            HoistedValidator::new(crate::error::codes::TYPE, BaseType(base_type)).skip_for_undefined()
        });
        self.with_type_rule(base_type, type_rule)
    }

    /// Starts a chain on `base_type` with a caller-supplied type rule.
    #[must_use]
    pub fn with_type_rule(self, base_type: TypeTag, type_rule: Option<HoistedValidator>) -> Chain<'r> {
        let mut definition = FieldDefinition::new(self.path, base_type);
        if let Some(rule) = type_rule {
            definition.push_rule(rule);
        }
        Chain {
            registry: self.registry,
            state: Ok(definition),
        }
    }

    #[must_use]
    pub fn string(self) -> Chain<'r> {
        self.of(TypeTag::String)
    }

    #[must_use]
    pub fn number(self) -> Chain<'r> {
        self.of(TypeTag::Number)
    }

    #[must_use]
    pub fn boolean(self) -> Chain<'r> {
        self.of(TypeTag::Boolean)
    }

    #[must_use]
    pub fn array(self) -> Chain<'r> {
        self.of(TypeTag::Array)
    }

    #[must_use]
    pub fn object(self) -> Chain<'r> {
        self.of(TypeTag::Object)
    }

    #[must_use]
    pub fn date(self) -> Chain<'r> {
        self.of(TypeTag::Date)
    }

    /// No base type check.
    #[must_use]
    pub fn any(self) -> Chain<'r> {
        self.of(TypeTag::Any)
    }
}

// ============================================================================
// CHAIN
// ============================================================================

/// An ordered rule chain under construction.
#[derive(Debug, Clone)]
pub struct Chain<'r> {
    registry: &'r Registry,
    state: Result<FieldDefinition, BuildError>,
}

impl<'r> Chain<'r> {
    /// Resolves `method` for this field's base type and appends the rule.
    #[must_use]
    pub fn call<I>(mut self, method: &str, params: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Param>,
    {
        if let Ok(definition) = &mut self.state {
            let params: Vec<Param> = params.into_iter().map(Into::into).collect();
            let built = self
                .registry
                .resolve(method, definition.base_type())
                .and_then(|plugin| plugin.invoke(&params));
            match built {
                Ok(rule) => definition.push_rule(rule),
                Err(error) => self.state = Err(error),
            }
        }
        self
    }

    /// Appends a rule without going through the registry.
    #[must_use]
    pub fn push(mut self, rule: HoistedValidator) -> Self {
        if let Ok(definition) = &mut self.state {
            definition.push_rule(rule);
        }
        self
    }

    /// The base type this chain was started on.
    #[must_use]
    pub fn base_type(&self) -> Option<TypeTag> {
        self.state.as_ref().ok().map(FieldDefinition::base_type)
    }

    /// Replaces the failure message of the last unflagged rule.
    #[must_use]
    pub fn message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        if let Ok(definition) = &mut self.state {
            definition.override_last_message(message.into());
        }
        self
    }

    /// Sets the field description.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        if let Ok(definition) = &mut self.state {
            definition.metadata_mut().description = Some(description.into());
        }
        self
    }

    // ── presence ────────────────────────────────────────────────────────

    #[must_use]
    pub fn required(self) -> Self {
        self.call("required", no_params())
    }

    #[must_use]
    pub fn optional(self) -> Self {
        self.call("optional", no_params())
    }

    #[must_use]
    pub fn nullable(self) -> Self {
        self.call("nullable", no_params())
    }

    // ── bounds ──────────────────────────────────────────────────────────

    /// Lower bound: length for strings, value for numbers, item count for
    /// arrays, property count for objects, instant for dates.
    #[must_use]
    pub fn min(self, bound: impl Into<Param>) -> Self {
        let bound: Param = bound.into();
        self.call("min", [bound])
    }

    /// Upper bound, see [`min`](Self::min).
    #[must_use]
    pub fn max(self, bound: impl Into<Param>) -> Self {
        let bound: Param = bound.into();
        self.call("max", [bound])
    }

    /// Exact length of a string or array.
    #[must_use]
    pub fn length(self, length: usize) -> Self {
        self.call("length", [length])
    }

    #[must_use]
    pub fn not_empty(self) -> Self {
        self.call("notEmpty", no_params())
    }

    /// Strictly greater than.
    #[must_use]
    pub fn gt(self, bound: f64) -> Self {
        self.call("gt", [bound])
    }

    /// Strictly less than.
    #[must_use]
    pub fn lt(self, bound: f64) -> Self {
        self.call("lt", [bound])
    }

    #[must_use]
    pub fn int(self) -> Self {
        self.call("int", no_params())
    }

    #[must_use]
    pub fn positive(self) -> Self {
        self.call("positive", no_params())
    }

    #[must_use]
    pub fn negative(self) -> Self {
        self.call("negative", no_params())
    }

    #[must_use]
    pub fn multiple_of(self, divisor: f64) -> Self {
        self.call("multipleOf", [divisor])
    }

    #[must_use]
    pub fn unique(self) -> Self {
        self.call("unique", no_params())
    }

    // ── strings ─────────────────────────────────────────────────────────

    #[must_use]
    pub fn email(self) -> Self {
        self.call("email", no_params())
    }

    #[must_use]
    pub fn url(self) -> Self {
        self.call("url", no_params())
    }

    #[must_use]
    pub fn uuid(self) -> Self {
        self.call("uuid", no_params())
    }

    /// Unanchored regular expression match.
    #[must_use]
    pub fn pattern(self, pattern: &str) -> Self {
        self.call("pattern", [pattern])
    }

    #[must_use]
    pub fn starts_with(self, prefix: &str) -> Self {
        self.call("startsWith", [prefix])
    }

    #[must_use]
    pub fn ends_with(self, suffix: &str) -> Self {
        self.call("endsWith", [suffix])
    }

    /// Substring for strings, element for arrays.
    #[must_use]
    pub fn includes(self, needle: impl Into<Param>) -> Self {
        let needle: Param = needle.into();
        self.call("includes", [needle])
    }

    // ── values ──────────────────────────────────────────────────────────

    /// The value must equal one of `values`.
    #[must_use]
    pub fn one_of<I>(self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.call("oneOf", [Value::Array(values)])
    }

    /// The value must equal `value`.
    #[must_use]
    pub fn literal(self, value: impl Into<Value>) -> Self {
        let value: Value = value.into();
        self.call("literal", [value])
    }

    /// A custom check. The predicate receives the value and the root.
    #[must_use]
    pub fn refine<F>(self, predicate: F, message: &str) -> Self
    where
        F: Fn(&Value, &Value) -> bool + Send + Sync + 'static,
    {
        self.call(
            "refine",
            [
                Param::predicate(move |value, root| Outcome::from_bool(predicate(value, root))),
                Param::from(message),
            ],
        )
    }

    /// A custom check that reports its own outcome and message.
    #[must_use]
    pub fn check_with<F>(self, check: F) -> Self
    where
        F: Fn(&Value, &Value) -> Outcome + Send + Sync + 'static,
    {
        self.call("refine", [Param::predicate(check)])
    }

    // ── transforms ──────────────────────────────────────────────────────

    /// Records a transform applied by `parse` after all checks pass.
    #[must_use]
    pub fn transform<F>(mut self, name: &'static str, apply: F) -> Self
    where
        F: Fn(Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        if let Ok(definition) = &mut self.state {
            definition.push_transform(Transform::new(name, apply));
        }
        self
    }

    #[must_use]
    pub fn trim(self) -> Self {
        self.push_transform(Transform::strings("trim", |s| s.trim().to_owned()))
    }

    #[must_use]
    pub fn to_lower_case(self) -> Self {
        self.push_transform(Transform::strings("toLowerCase", str::to_lowercase))
    }

    #[must_use]
    pub fn to_upper_case(self) -> Self {
        self.push_transform(Transform::strings("toUpperCase", str::to_uppercase))
    }

    /// Fills the field with `value` when it is absent.
    #[must_use]
    pub fn default_value(self, value: impl Into<Value>) -> Self {
        self.push_transform(Transform::default_value(value.into()))
    }

    fn push_transform(mut self, transform: Transform) -> Self {
        if let Ok(definition) = &mut self.state {
            definition.push_transform(transform);
        }
        self
    }

    /// Finishes the chain.
    pub fn finish(self) -> Result<FieldDefinition, BuildError> {
        self.state
    }
}

fn no_params() -> [Param; 0] {
    []
}

//! Validator factory: compiles field definitions into a [`Validator`].
//!
//! The factory picks one of four strategies:
//!
//! | Strategy  | Used for                                               |
//! |-----------|--------------------------------------------------------|
//! | `Single`  | exactly one field, fixed path, no transforms          |
//! | `Fixed`   | two to four such fields                                |
//! | `General` | everything else; paths merged into one accessor trie  |
//! | `Raw`     | no fields, or a path that does not parse               |
//!
//! All strategies report the same errors for the same input.

mod chain;
mod fixed;
mod general;
mod options;
mod raw;
mod result;
mod single;

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::accessor::{resolve_path, set_at};
use crate::definition::FieldDefinition;
use crate::error::{codes, BuildError, ValidationError, ValidationErrors};
use crate::path::{render_location, FieldPath};

use chain::Report;
use fixed::FixedPlan;
use general::GeneralPlan;
use single::SinglePlan;

pub use options::{ParseOptions, StrategyHint, ValidatorOptions};
pub use result::ValidationResult;

/// The execution strategy a validator was compiled to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StrategyKind {
    Single,
    Fixed,
    General,
    Raw,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StrategyKind::Single => "single",
            StrategyKind::Fixed => "fixed",
            StrategyKind::General => "general",
            StrategyKind::Raw => "raw",
        })
    }
}

#[derive(Debug, Clone)]
enum Plan {
    Single(SinglePlan),
    Fixed(FixedPlan),
    General(GeneralPlan),
    Raw,
}

/// Compiles definitions into validators.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatorFactory;

impl ValidatorFactory {
    /// Compiles `definitions`.
    ///
    /// Fails only when [`StrategyHint::General`] is forced and a path does
    /// not parse; the automatic choice falls back to the raw strategy.
    pub fn compile(
        definitions: Vec<FieldDefinition>,
        options: ValidatorOptions,
    ) -> Result<Validator, BuildError> {
        let plan = match options.strategy {
            StrategyHint::Raw => Plan::Raw,
            StrategyHint::General => Plan::General(GeneralPlan::compile(&definitions)?),
            StrategyHint::Auto => Self::choose(&definitions),
        };
        let validator = Validator {
            definitions: definitions.into(),
            plan,
            options,
        };
        debug!(
            strategy = %validator.strategy(),
            fields = validator.definitions.len(),
            abort_early = validator.options.abort_early,
            "validator compiled"
        );
        Ok(validator)
    }

    fn choose(definitions: &[FieldDefinition]) -> Plan {
        if definitions.is_empty() {
            return Plan::Raw;
        }
        if let Some(plan) = SinglePlan::compile(definitions) {
            return Plan::Single(plan);
        }
        if let Some(plan) = FixedPlan::compile(definitions) {
            return Plan::Fixed(plan);
        }
        match GeneralPlan::compile(definitions) {
            Ok(plan) => Plan::General(plan),
            Err(error) => {
                debug!(%error, "falling back to raw strategy");
                Plan::Raw
            }
        }
    }
}

/// A compiled validator.
///
/// Immutable and `Send + Sync`: one instance can serve many threads. Clones
/// share the field definitions.
///
/// ```rust
/// use serde_json::json;
/// use sift_validator::factory::{ParseOptions, StrategyKind};
/// use sift_validator::registry::Registry;
///
/// let registry = Registry::with_builtins();
/// let validator = registry
///     .schema()
///     .v("email", |b| b.string().required().trim().to_lower_case().email())
///     .build()
///     .unwrap();
///
/// assert_eq!(validator.strategy(), StrategyKind::General);
/// let data = validator
///     .parse(&json!({"email": "ada@example.com "}), ParseOptions::default());
/// assert!(data.is_err()); // checks run on the raw input
///
/// let data = validator
///     .parse(&json!({"email": "Ada@Example.com"}), ParseOptions::default())
///     .unwrap();
/// assert_eq!(data, json!({"email": "ada@example.com"}));
/// ```
#[derive(Debug, Clone)]
pub struct Validator {
    definitions: Arc<[FieldDefinition]>,
    plan: Plan,
    options: ValidatorOptions,
}

impl Validator {
    /// The strategy chosen at compile time.
    #[must_use]
    pub const fn strategy(&self) -> StrategyKind {
        match self.plan {
            Plan::Single(_) => StrategyKind::Single,
            Plan::Fixed(_) => StrategyKind::Fixed,
            Plan::General(_) => StrategyKind::General,
            Plan::Raw => StrategyKind::Raw,
        }
    }

    #[must_use]
    pub fn definitions(&self) -> &[FieldDefinition] {
        &self.definitions
    }

    #[must_use]
    pub const fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    fn run(&self, input: &Value, report: &mut Report<'_>) {
        match &self.plan {
            Plan::Single(plan) => plan.run(&self.definitions, input, report),
            Plan::Fixed(plan) => plan.run(&self.definitions, input, report),
            Plan::General(plan) => plan.run(&self.definitions, input, report),
            Plan::Raw => raw::run(&self.definitions, input, report),
        }
    }

    fn check(&self, input: &Value, abort_early: bool) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        self.run(input, &mut Report::collect(&mut errors, abort_early));
        errors
    }

    /// Checks `input`. Never fails; problems are reported in the result.
    #[must_use]
    pub fn validate(&self, input: &Value) -> ValidationResult {
        let mut result = ValidationResult::default();
        self.validate_into(input, &mut result);
        result
    }

    /// Checks `input` into a caller-owned result, reusing its error buffer.
    ///
    /// The previous contents of `result` are overwritten.
    pub fn validate_into(&self, input: &Value, result: &mut ValidationResult) {
        result.reset();
        self.run(input, &mut Report::collect(&mut result.errors, self.options.abort_early));
        result.valid = result.errors.is_empty();
    }

    /// Returns true if `input` passes every check. Builds no errors.
    #[must_use]
    pub fn is_valid(&self, input: &Value) -> bool {
        let mut report = Report::verdict();
        self.run(input, &mut report);
        !report.failed()
    }

    /// Checks `input`, then applies transforms to a copy of it.
    ///
    /// Transforms run in declaration order, and only once every check of
    /// every field has passed.
    pub fn parse(&self, input: &Value, options: ParseOptions) -> Result<Value, ValidationErrors> {
        let abort_early = options.abort_early.unwrap_or(self.options.abort_early);
        let errors = self.check(input, abort_early);
        if errors.has_errors() {
            return Err(errors);
        }
        self.apply_transforms(input, abort_early)
    }

    /// [`parse`](Self::parse) as a [`ValidationResult`] carrying the data.
    #[must_use]
    pub fn safe_parse(&self, input: &Value, options: ParseOptions) -> ValidationResult {
        self.parse(input, options).into()
    }

    /// [`parse`](Self::parse), then deserializes the data into `T`.
    ///
    /// A deserialization failure is reported as a root error with code
    /// `deserialize`.
    pub fn parse_as<T: DeserializeOwned>(
        &self,
        input: &Value,
        options: ParseOptions,
    ) -> Result<T, ValidationErrors> {
        let data = self.parse(input, options)?;
        serde_json::from_value(data).map_err(|error| {
            ValidationErrors::from(vec![ValidationError::new(
                "",
                codes::DESERIALIZE,
                error.to_string(),
            )])
        })
    }

    fn apply_transforms(&self, input: &Value, abort_early: bool) -> Result<Value, ValidationErrors> {
        let mut output = input.clone();
        let mut errors = ValidationErrors::new();

        for definition in self.definitions.iter().filter(|d| !d.transforms().is_empty()) {
            let path = FieldPath::lenient(definition.path());
            for resolved in resolve_path(input, &path) {
                if definition.metadata().requires_parent_object && !resolved.parent_is_object {
                    continue;
                }
                let mut current = resolved.value.cloned();
                let mut failed = None;
                for transform in definition.transforms() {
                    match transform.apply(current.take()) {
                        Ok(next) => current = next,
                        Err(reason) => {
                            failed = Some(format!("Transform `{}` failed: {reason}", transform.name()));
                            break;
                        }
                    }
                }

                let rendered = || render_location(&resolved.location);
                if let Some(message) = failed {
                    errors.add(ValidationError::new(rendered(), codes::TRANSFORM_FAILED, message));
                } else if let Some(value) = current {
                    if !set_at(&mut output, &resolved.location, value) {
                        let path = rendered();
                        let message = format!("Cannot write the transformed value at `{path}`");
                        errors.add(ValidationError::new(path, codes::TRANSFORM_FAILED, message));
                    }
                }
                if abort_early && errors.has_errors() {
                    return Err(errors);
                }
            }
        }

        if errors.has_errors() { Err(errors) } else { Ok(output) }
    }
}

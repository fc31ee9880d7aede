//! The plugin contract.
//!
//! A [`Plugin`] is a named factory: invoked with parameters it produces a
//! [`HoistedValidator`], the unit a field's rule chain is made of. The
//! hoisted validator pairs a [`Rule`] (the actual predicate) with a stable
//! error code and the flags the executor uses to decide whether the rule runs
//! at all.
//!
//! ```rust
//! use sift_validator::plugin::{Args, Category, HoistedValidator, Plugin};
//! use sift_validator::value::{TypeSet, TypeTag};
//! use sift_validator::rule;
//!
//! rule! {
//!     pub Even for number;
//!     check(input) { input % 2.0 == 0.0 }
//!     message(input) { "Must be even" }
//! }
//!
//! let plugin = Plugin::new("number.even", "even", |params| {
//!     Args::new("even", params).exactly(0)?;
//!     Ok(HoistedValidator::new("even", Even).skip_for_undefined())
//! })
//! .for_types(TypeSet::of(&[TypeTag::Number]))
//! .with_category(Category::Number);
//!
//! assert_eq!(plugin.method_name(), "even");
//! ```

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::SmallVec;

use crate::error::BuildError;
use crate::value::{as_count, TypeSet, TypeTag};

// ============================================================================
// OUTCOME
// ============================================================================

/// Verdict of a single rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The value satisfies the rule.
    Valid,
    /// The value violates the rule.
    ///
    /// `message` overrides [`Rule::message`] when the rule computed a
    /// message while checking.
    Invalid { message: Option<Cow<'static, str>> },
    /// The rule could not reach a verdict.
    Fault { reason: String },
}

impl Outcome {
    /// `Valid` if `ok`, otherwise `Invalid` without a message.
    #[must_use]
    pub const fn from_bool(ok: bool) -> Self {
        if ok {
            Self::Valid
        } else {
            Self::Invalid { message: None }
        }
    }

    /// `Invalid` carrying a message.
    pub fn invalid(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Invalid {
            message: Some(message.into()),
        }
    }

    /// `Fault` with a reason.
    pub fn fault(reason: impl Into<String>) -> Self {
        Self::Fault {
            reason: reason.into(),
        }
    }

    /// Returns true for `Valid`.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl From<bool> for Outcome {
    fn from(ok: bool) -> Self {
        Self::from_bool(ok)
    }
}

// ============================================================================
// RULE
// ============================================================================

/// A single check.
///
/// `value` is `None` when the field is absent. `root` is the whole input, so
/// a rule may look at sibling fields. Implementations must be pure: the same
/// inputs always give the same outcome.
pub trait Rule: Send + Sync {
    /// Checks a value.
    fn check(&self, value: Option<&Value>, root: &Value) -> Outcome;

    /// Message used when `check` fails without providing one.
    fn message(&self, value: Option<&Value>, path: &str) -> Cow<'static, str>;
}

/// A check function usable as a rule parameter, e.g. for `refine`.
///
/// Called with the field value and the root document.
pub type Predicate = Arc<dyn Fn(&Value, &Value) -> Outcome + Send + Sync>;

// ============================================================================
// HOISTED VALIDATOR
// ============================================================================

/// Flags steering how the executor treats a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RuleFlags {
    /// An absent value makes the whole field pass.
    pub optional: bool,
    /// A null value makes the whole field pass.
    pub nullable: bool,
    /// The rule is not run for absent values.
    pub skip_for_undefined: bool,
    /// The rule is not run for null values.
    pub skip_for_null: bool,
}

impl RuleFlags {
    /// True if the rule must be placed ahead of unflagged rules.
    #[must_use]
    pub const fn is_hoisted(self) -> bool {
        self.optional || self.nullable
    }
}

/// One step of a field's rule chain.
#[derive(Clone)]
pub struct HoistedValidator {
    code: Cow<'static, str>,
    rule: Arc<dyn Rule>,
    params: SmallVec<[Value; 2]>,
    flags: RuleFlags,
}

impl HoistedValidator {
    /// Wraps a rule under an error code.
    pub fn new(code: impl Into<Cow<'static, str>>, rule: impl Rule + 'static) -> Self {
        Self::from_arc(code, Arc::new(rule))
    }

    /// Wraps an already shared rule.
    pub fn from_arc(code: impl Into<Cow<'static, str>>, rule: Arc<dyn Rule>) -> Self {
        Self {
            code: code.into(),
            rule,
            params: SmallVec::new(),
            flags: RuleFlags::default(),
        }
    }

    /// Records the parameters the rule was built from.
    #[must_use]
    pub fn with_params(mut self, params: impl IntoIterator<Item = Value>) -> Self {
        self.params = params.into_iter().collect();
        self
    }

    /// Replaces the flags.
    #[must_use]
    pub const fn with_flags(mut self, flags: RuleFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Marks the rule as not applying to absent values.
    #[must_use]
    pub const fn skip_for_undefined(mut self) -> Self {
        self.flags.skip_for_undefined = true;
        self
    }

    /// Marks the rule as not applying to null values.
    #[must_use]
    pub const fn skip_for_null(mut self) -> Self {
        self.flags.skip_for_null = true;
        self
    }

    /// Replaces every failure message of the rule with `message`.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.rule = Arc::new(WithMessage {
            inner: self.rule,
            message: message.into(),
        });
        self
    }

    /// The error code reported on failure.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    pub(crate) fn code_cow(&self) -> Cow<'static, str> {
        self.code.clone()
    }

    /// Executor flags.
    #[must_use]
    pub const fn flags(&self) -> RuleFlags {
        self.flags
    }

    /// Parameters the rule was built from.
    #[must_use]
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Runs the rule.
    #[must_use]
    pub fn check(&self, value: Option<&Value>, root: &Value) -> Outcome {
        self.rule.check(value, root)
    }

    /// The rule's default failure message.
    #[must_use]
    pub fn error_message(&self, value: Option<&Value>, path: &str) -> Cow<'static, str> {
        self.rule.message(value, path)
    }
}

impl fmt::Debug for HoistedValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HoistedValidator")
            .field("code", &self.code)
            .field("params", &self.params)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

struct WithMessage {
    inner: Arc<dyn Rule>,
    message: Cow<'static, str>,
}

impl Rule for WithMessage {
    fn check(&self, value: Option<&Value>, root: &Value) -> Outcome {
        match self.inner.check(value, root) {
            Outcome::Invalid { .. } => Outcome::Invalid {
                message: Some(self.message.clone()),
            },
            other => other,
        }
    }

    fn message(&self, _value: Option<&Value>, _path: &str) -> Cow<'static, str> {
        self.message.clone()
    }
}

// ============================================================================
// PARAMETERS
// ============================================================================

/// A parameter passed to a plugin.
#[derive(Clone)]
pub enum Param {
    Value(Value),
    Predicate(Predicate),
}

impl Param {
    /// Wraps a check function.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Value, &Value) -> Outcome + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(f))
    }

    /// The JSON value, if this is a value parameter.
    #[must_use]
    pub const fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            Self::Predicate(_) => None,
        }
    }
}

impl fmt::Debug for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

macro_rules! param_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Param {
                fn from(value: $ty) -> Self {
                    Self::Value(Value::from(value))
                }
            }
        )*
    };
}

param_from!(Value, &str, String, bool, f64, i32, i64, u32, u64, usize);

/// Typed access to a plugin's parameter list.
///
/// Every accessor fails with [`BuildError::InvalidParams`] naming the method.
#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
    method: &'a str,
    params: &'a [Param],
}

impl<'a> Args<'a> {
    #[must_use]
    pub const fn new(method: &'a str, params: &'a [Param]) -> Self {
        Self { method, params }
    }

    /// Number of parameters.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.params.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Fails unless exactly `n` parameters were given.
    pub fn exactly(&self, n: usize) -> Result<(), BuildError> {
        if self.params.len() == n {
            Ok(())
        } else {
            Err(self.error(format!("expected {n} parameter(s), got {}", self.params.len())))
        }
    }

    /// Fails unless between `min` and `max` parameters were given.
    pub fn between(&self, min: usize, max: usize) -> Result<(), BuildError> {
        if (min..=max).contains(&self.params.len()) {
            Ok(())
        } else {
            Err(self.error(format!(
                "expected {min} to {max} parameters, got {}",
                self.params.len()
            )))
        }
    }

    /// The JSON value at `index`.
    pub fn value(&self, index: usize) -> Result<&'a Value, BuildError> {
        match self.params.get(index) {
            Some(Param::Value(v)) => Ok(v),
            Some(Param::Predicate(_)) => {
                Err(self.error(format!("parameter {index} must be a value, got a function")))
            }
            None => Err(self.error(format!("missing parameter {index}"))),
        }
    }

    /// An optional JSON value at `index`.
    #[must_use]
    pub fn opt_value(&self, index: usize) -> Option<&'a Value> {
        self.params.get(index).and_then(Param::as_value)
    }

    /// A finite number at `index`.
    pub fn number(&self, index: usize) -> Result<f64, BuildError> {
        self.value(index)?
            .as_f64()
            .filter(|n| n.is_finite())
            .ok_or_else(|| self.error(format!("parameter {index} must be a number")))
    }

    /// A non-negative integer at `index`.
    pub fn count(&self, index: usize) -> Result<usize, BuildError> {
        as_count(self.value(index)?)
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| self.error(format!("parameter {index} must be a non-negative integer")))
    }

    /// A string at `index`.
    pub fn string(&self, index: usize) -> Result<&'a str, BuildError> {
        self.value(index)?
            .as_str()
            .ok_or_else(|| self.error(format!("parameter {index} must be a string")))
    }

    /// An optional string at `index`, typically a custom message.
    pub fn opt_string(&self, index: usize) -> Result<Option<&'a str>, BuildError> {
        match self.opt_value(index) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(_) => Err(self.error(format!("parameter {index} must be a string"))),
        }
    }

    /// An array at `index`.
    pub fn array(&self, index: usize) -> Result<&'a [Value], BuildError> {
        self.value(index)?
            .as_array()
            .map(Vec::as_slice)
            .ok_or_else(|| self.error(format!("parameter {index} must be an array")))
    }

    /// A check function at `index`.
    pub fn predicate(&self, index: usize) -> Result<Predicate, BuildError> {
        match self.params.get(index) {
            Some(Param::Predicate(p)) => Ok(Arc::clone(p)),
            Some(Param::Value(_)) => {
                Err(self.error(format!("parameter {index} must be a function")))
            }
            None => Err(self.error(format!("missing parameter {index}"))),
        }
    }

    /// Every value parameter, for [`HoistedValidator::with_params`].
    #[must_use]
    pub fn values(&self) -> SmallVec<[Value; 2]> {
        self.params.iter().filter_map(Param::as_value).cloned().collect()
    }

    /// An `InvalidParams` error for this method.
    #[must_use]
    pub fn error(&self, reason: impl Into<String>) -> BuildError {
        BuildError::invalid_params(self.method, reason)
    }
}

// ============================================================================
// PLUGIN
// ============================================================================

/// Grouping used in the plugin manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Presence and nullability modifiers.
    Core,
    String,
    Number,
    Array,
    Object,
    Date,
    Format,
    /// Rules combining whole sub-schemas.
    Composition,
    #[default]
    Custom,
}

/// The function a plugin runs to build its hoisted validator.
pub type PluginFn = Arc<dyn Fn(&[Param]) -> Result<HoistedValidator, BuildError> + Send + Sync>;

/// A named rule factory.
#[derive(Clone)]
pub struct Plugin {
    name: Cow<'static, str>,
    method_name: Cow<'static, str>,
    allowed_types: TypeSet,
    category: Category,
    description: Cow<'static, str>,
    implementation: PluginFn,
}

impl Plugin {
    /// Creates a plugin usable on any base type.
    ///
    /// `name` must be unique within a registry; `method_name` is what
    /// builder chains call and may be shared by plugins for different types.
    pub fn new<F>(
        name: impl Into<Cow<'static, str>>,
        method_name: impl Into<Cow<'static, str>>,
        implementation: F,
    ) -> Self
    where
        F: Fn(&[Param]) -> Result<HoistedValidator, BuildError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            method_name: method_name.into(),
            allowed_types: TypeSet::ANY,
            category: Category::Custom,
            description: Cow::Borrowed(""),
            implementation: Arc::new(implementation),
        }
    }

    /// Restricts the base types the method may be chained onto.
    #[must_use]
    pub const fn for_types(mut self, types: TypeSet) -> Self {
        self.allowed_types = types;
        self
    }

    #[must_use]
    pub const fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<Cow<'static, str>>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    #[must_use]
    pub const fn allowed_types(&self) -> TypeSet {
        self.allowed_types
    }

    /// Returns true if the method may be chained onto `base_type`.
    #[must_use]
    pub const fn allows(&self, base_type: TypeTag) -> bool {
        self.allowed_types.allows(base_type)
    }

    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Builds the hoisted validator for the given parameters.
    pub fn invoke(&self, params: &[Param]) -> Result<HoistedValidator, BuildError> {
        (self.implementation)(params)
    }

    /// Serializable metadata for this plugin.
    #[must_use]
    pub fn descriptor(&self) -> PluginDescriptor {
        PluginDescriptor {
            name: self.name.to_string(),
            method: self.method_name.to_string(),
            allowed_types: self.allowed_types.iter().collect(),
            category: self.category,
            description: self.description.to_string(),
        }
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("name", &self.name)
            .field("method_name", &self.method_name)
            .field("allowed_types", &self.allowed_types)
            .field("category", &self.category)
            .finish_non_exhaustive()
    }
}

/// Machine-readable plugin metadata, as listed by `Registry::manifest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginDescriptor {
    pub name: String,
    pub method: String,
    pub allowed_types: Vec<TypeTag>,
    pub category: Category,
    pub description: String,
}

//! Error types for building and running validators
//!
//! Two families live here:
//!
//! - [`BuildError`]: raised while registering plugins, composing field
//!   rules or compiling a JSON Schema. Construction happens once, ahead of
//!   the hot path, so these are ordinary `Result` errors.
//! - [`ValidationError`] / [`ValidationErrors`]: produced while checking
//!   data. They are collected into results and never raised.
//!
//! Codes and messages use `Cow<'static, str>` so the common case of a
//! static code costs no allocation.

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;

use crate::value::TypeTag;

/// Stable error codes.
///
/// Codes mirror JSON Schema keyword names wherever a keyword exists, so a
/// field declared through the builder and the same field compiled from a
/// JSON Schema report identical codes.
pub mod codes {
    pub const REQUIRED: &str = "required";
    pub const TYPE: &str = "type";
    pub const MIN_LENGTH: &str = "minLength";
    pub const MAX_LENGTH: &str = "maxLength";
    pub const LENGTH: &str = "length";
    pub const PATTERN: &str = "pattern";
    pub const FORMAT: &str = "format";
    pub const STARTS_WITH: &str = "startsWith";
    pub const ENDS_WITH: &str = "endsWith";
    pub const INCLUDES: &str = "includes";
    pub const NOT_EMPTY: &str = "notEmpty";
    pub const MINIMUM: &str = "minimum";
    pub const MAXIMUM: &str = "maximum";
    pub const EXCLUSIVE_MINIMUM: &str = "exclusiveMinimum";
    pub const EXCLUSIVE_MAXIMUM: &str = "exclusiveMaximum";
    pub const MULTIPLE_OF: &str = "multipleOf";
    pub const INTEGER: &str = "integer";
    pub const MIN_ITEMS: &str = "minItems";
    pub const MAX_ITEMS: &str = "maxItems";
    pub const UNIQUE_ITEMS: &str = "uniqueItems";
    pub const MIN_PROPERTIES: &str = "minProperties";
    pub const MAX_PROPERTIES: &str = "maxProperties";
    pub const MIN_DATE: &str = "minDate";
    pub const MAX_DATE: &str = "maxDate";
    pub const ENUM: &str = "enum";
    pub const CONST: &str = "const";
    pub const CUSTOM: &str = "custom";
    pub const ALL_OF: &str = "allOf";
    pub const ANY_OF: &str = "anyOf";
    pub const ONE_OF: &str = "oneOf";
    pub const NOT: &str = "not";
    pub const IF: &str = "if";
    pub const REF: &str = "$ref";
    pub const ITEMS: &str = "items";
    pub const CONTAINS: &str = "contains";
    pub const ADDITIONAL_PROPERTIES: &str = "additionalProperties";
    pub const PATTERN_PROPERTIES: &str = "patternProperties";
    pub const PROPERTY_NAMES: &str = "propertyNames";
    pub const DEPENDENCIES: &str = "dependencies";
    pub const FALSE_SCHEMA: &str = "false";

    /// A rule reported a fault instead of a verdict.
    pub const RULE_FAULT: &str = "rule_fault";
    /// A `parse` transform failed or its result could not be written back.
    pub const TRANSFORM_FAILED: &str = "transform_failed";
    /// `parse_as` could not deserialize the validated data.
    pub const DESERIALIZE: &str = "deserialize";
}

// ============================================================================
// BUILD ERRORS
// ============================================================================

/// Failure while registering plugins, composing rules or compiling a schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum BuildError {
    /// A plugin method was chained onto a base type it does not allow.
    #[error("method `{method}` cannot be used on `{base_type}` fields")]
    TypeNotAllowed { method: String, base_type: TypeTag },

    /// No registered plugin exposes the method at all.
    #[error("no registered plugin provides method `{method}` (field type `{base_type}`)")]
    UnknownMethod { method: String, base_type: TypeTag },

    /// A plugin with the same name is already registered.
    #[error("plugin `{0}` is already registered")]
    DuplicateName(String),

    /// A plugin rejected the parameters it was invoked with.
    #[error("invalid parameters for `{method}`: {reason}")]
    InvalidParams { method: String, reason: String },

    /// A regular expression failed to compile.
    #[error("invalid pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A field path could not be parsed.
    #[error("invalid field path `{path}`: {reason}")]
    InvalidPath { path: String, reason: String },

    /// A field builder function failed; `message` is its original error.
    #[error("failed to build rules for field `{path}`: {message}")]
    FieldRuleBuild { path: String, message: String },

    /// The JSON Schema root is not `{ "type": "object", "properties": {...} }`.
    #[error("invalid root schema: {0}")]
    InvalidRootSchema(String),

    /// A `$ref` points outside the document.
    #[error("external reference `{0}` is not supported")]
    ExternalRefUnsupported(String),

    /// A `$ref` does not resolve inside the document.
    #[error("reference `{0}` not found")]
    RefNotFound(String),
}

impl BuildError {
    pub(crate) fn invalid_params(method: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParams {
            method: method.to_owned(),
            reason: reason.into(),
        }
    }
}

// ============================================================================
// VALIDATION ERROR
// ============================================================================

/// A single failed check on a single field.
///
/// # Examples
///
/// ```rust
/// use sift_validator::error::ValidationError;
///
/// let error = ValidationError::new("user.name", "minLength", "Must be at least 3 characters");
/// assert_eq!(error.to_string(), "[user.name] minLength: Must be at least 3 characters");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Concrete path of the failing value, e.g. `items[2].name`.
    ///
    /// Empty for errors on the root value.
    pub path: String,

    /// Stable error identifier, see [`codes`].
    pub code: Cow<'static, str>,

    /// Human-readable message in English.
    pub message: Cow<'static, str>,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(
        path: impl Into<String>,
        code: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            path: path.into(),
            code: code.into(),
            message: message.into(),
        }
    }

    /// Creates a "required" error.
    pub fn required(path: impl Into<String>) -> Self {
        Self::new(path, codes::REQUIRED, "This field is required")
    }

    /// Creates a "type" error.
    pub fn type_mismatch(path: impl Into<String>, expected: &str, actual: &str) -> Self {
        Self::new(
            path,
            codes::TYPE,
            format!("Expected {expected}, received {actual}"),
        )
    }

    /// Returns true if the error is attached to the root value.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}: {}", self.code, self.message)
        } else {
            write!(f, "[{}] {}: {}", self.path, self.code, self.message)
        }
    }
}

impl std::error::Error for ValidationError {}

// ============================================================================
// ERROR COLLECTION
// ============================================================================

/// An ordered collection of validation errors, as returned by `parse`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Creates a new empty error collection.
    #[must_use]
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Adds an error to the collection.
    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Removes every error, keeping the allocation.
    pub fn clear(&mut self) {
        self.errors.clear();
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns the number of errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns true if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns all errors.
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Returns the first error reported for `path`, if any.
    #[must_use]
    pub fn for_path(&self, path: &str) -> Option<&ValidationError> {
        self.errors.iter().find(|e| e.path == path)
    }

    /// Returns true if any error carries `code`.
    #[must_use]
    pub fn contains_code(&self, code: &str) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }

    /// Consumes the collection and returns the inner list.
    #[must_use]
    pub fn into_vec(self) -> Vec<ValidationError> {
        self.errors
    }
}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }
}

impl FromIterator<ValidationError> for ValidationErrors {
    fn from_iter<I: IntoIterator<Item = ValidationError>>(iter: I) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation failed with {} error(s):", self.errors.len())?;
        for (i, error) in self.errors.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

// ============================================================================
// TESTS
// ============================================================================

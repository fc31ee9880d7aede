//! Outcome of one validation call.

use serde::Serialize;
use serde_json::Value;

use crate::error::ValidationErrors;

/// Result of `validate` / `safe_parse`.
///
/// `validate_into` overwrites a caller-owned result in place, so a hot loop
/// can keep one result and reuse its error buffer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: ValidationErrors,
    /// Transformed data, set by `safe_parse` on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self {
            valid: true,
            errors: ValidationErrors::new(),
            data: None,
        }
    }
}

impl ValidationResult {
    /// Converts into the `parse` shape.
    pub fn into_result(self) -> Result<Option<Value>, ValidationErrors> {
        if self.valid { Ok(self.data) } else { Err(self.errors) }
    }

    pub(crate) fn reset(&mut self) {
        self.valid = true;
        self.errors.clear();
        self.data = None;
    }
}

impl From<Result<Value, ValidationErrors>> for ValidationResult {
    fn from(result: Result<Value, ValidationErrors>) -> Self {
        match result {
            Ok(data) => Self {
                valid: true,
                errors: ValidationErrors::new(),
                data: Some(data),
            },
            Err(errors) => Self {
                valid: false,
                errors,
                data: None,
            },
        }
    }
}

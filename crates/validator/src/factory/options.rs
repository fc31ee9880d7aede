//! Validator and parse options.
//!
//! Options are plain serde structs so they can be loaded from configuration
//! files. Every field has a default; missing keys fall back to it.

use serde::{Deserialize, Serialize};

/// Forces an execution strategy instead of the automatic choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StrategyHint {
    /// Pick the fastest strategy able to run the fields.
    #[default]
    Auto,
    /// Always use the accessor trie, even for one field.
    General,
    /// Walk definitions directly, without compiled accessors.
    Raw,
}

/// Options of a compiled validator.
///
/// ```rust
/// use sift_validator::factory::{StrategyHint, ValidatorOptions};
///
/// let options = ValidatorOptions::from_json(r#"{"abortEarly": false}"#).unwrap();
/// assert!(!options.abort_early);
/// assert_eq!(options.strategy, StrategyHint::Auto);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidatorOptions {
    /// Stop at the first failing field.
    pub abort_early: bool,
    pub strategy: StrategyHint,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            abort_early: true,
            strategy: StrategyHint::Auto,
        }
    }
}

impl ValidatorOptions {
    /// Reports the first error of every failing field.
    #[must_use]
    pub fn collect_all() -> Self {
        Self {
            abort_early: false,
            ..Self::default()
        }
    }

    /// Parses options from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub const fn with_abort_early(mut self, abort_early: bool) -> Self {
        self.abort_early = abort_early;
        self
    }

    #[must_use]
    pub const fn with_strategy(mut self, strategy: StrategyHint) -> Self {
        self.strategy = strategy;
        self
    }
}

/// Per-call options of `parse`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParseOptions {
    /// Overrides the validator's `abort_early` for this call.
    pub abort_early: Option<bool>,
}

impl ParseOptions {
    #[must_use]
    pub const fn abort_early(abort_early: bool) -> Self {
        Self {
            abort_early: Some(abort_early),
        }
    }

    /// Parses options from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

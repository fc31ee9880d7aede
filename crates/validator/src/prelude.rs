//! Prelude module for convenient imports.
//!
//! Provides a single `use sift_validator::prelude::*;` import that brings in
//! the registry, the builder, the factory and the JSON Schema entry points.
//!
//! # Examples
//!
//! ```rust
//! use serde_json::json;
//! use sift_validator::prelude::*;
//!
//! let registry = Registry::with_builtins();
//! let validator = registry
//!     .schema()
//!     .v("email", |f| f.string().required().email())
//!     .build()
//!     .unwrap();
//! assert_eq!(validator.strategy(), StrategyKind::Single);
//! ```

// ============================================================================
// CORE: Registry, rules, plugins
// ============================================================================

pub use crate::plugin::{Category, HoistedValidator, Outcome, Param, Plugin, Rule, RuleFlags};
pub use crate::registry::Registry;
pub use crate::value::{TypeSet, TypeTag};

// ============================================================================
// SCHEMAS: Builder and definitions
// ============================================================================

pub use crate::builder::{Chain, FieldStart, SchemaBuilder};
pub use crate::definition::{FieldDefinition, Transform};

// ============================================================================
// EXECUTION: Factory, validators, results
// ============================================================================

pub use crate::error::{codes, BuildError, ValidationError, ValidationErrors};
pub use crate::factory::{
    ParseOptions, StrategyHint, StrategyKind, ValidationResult, Validator, ValidatorFactory,
    ValidatorOptions,
};

// ============================================================================
// JSON SCHEMA
// ============================================================================

pub use crate::schema::{
    detailed_errors, evaluate, from_json_schema, specific_errors, JsonSchemaOptions, SchemaError,
};

// ============================================================================
// MACROS
// ============================================================================

pub use crate::rule;

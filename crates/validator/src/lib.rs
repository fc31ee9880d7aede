//! # sift-validator
//!
//! Schema-driven validation for JSON values.
//!
//! Rules come from plugins held in a [`Registry`]. A schema is a list of
//! [`FieldDefinition`]s, each an ordered rule chain bound to a field path.
//! Definitions are written with the fluent [`SchemaBuilder`] or compiled
//! from a JSON Schema (Draft-07), then handed to the [`ValidatorFactory`],
//! which picks the cheapest execution strategy for their shape.
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use sift_validator::prelude::*;
//!
//! let registry = Registry::with_builtins();
//! let validator = registry
//!     .schema()
//!     .v("name", |f| f.string().required().min(3))
//!     .v("age", |f| f.number().int().min(0))
//!     .build()
//!     .unwrap();
//!
//! assert!(validator.is_valid(&json!({"name": "Ada", "age": 36})));
//!
//! let result = validator.validate(&json!({"name": "Al"}));
//! assert!(!result.valid);
//! assert_eq!(result.errors.errors()[0].code, "minLength");
//! ```
//!
//! ## Writing rules
//!
//! Use the [`rule!`] macro for rules over one JSON kind, or implement
//! [`Rule`](plugin::Rule) by hand. Wrap a rule in a [`Plugin`] to expose it
//! as a builder method.
//!
//! ## JSON Schema
//!
//! [`schema::from_json_schema`] compiles an object schema into a validator;
//! [`schema::evaluate`] and [`schema::detailed_errors`] check a value
//! against any schema without compiling it.

mod macros;

pub mod accessor;
pub mod builder;
pub mod definition;
pub mod error;
pub mod factory;
pub mod path;
pub mod plugin;
pub mod plugins;
pub mod prelude;
pub mod registry;
pub mod schema;
pub mod value;

pub use builder::{Chain, FieldStart, SchemaBuilder};
pub use definition::{DefinitionSource, FieldDefinition, FieldMetadata, Transform};
pub use error::{codes, BuildError, ValidationError, ValidationErrors};
pub use factory::{
    ParseOptions, StrategyHint, StrategyKind, ValidationResult, Validator, ValidatorFactory,
    ValidatorOptions,
};
pub use path::FieldPath;
pub use plugin::{HoistedValidator, Outcome, Param, Plugin, Rule, RuleFlags};
pub use registry::Registry;
pub use value::{TypeSet, TypeTag};

#[doc(hidden)]
pub mod __private {
    pub use serde_json::Value;
    pub use std::borrow::Cow;
}

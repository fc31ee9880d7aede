//! Integration tests for sift-validator.
//!
//! One test binary; each module covers one surface.

mod builder;
mod concurrency;
mod evaluator;
mod json_schema;
mod properties;
mod strategies;

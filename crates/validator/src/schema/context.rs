//! Shared state for evaluating subschemas of one document.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use regex::Regex;
use serde_json::Value;

use crate::error::BuildError;
use crate::plugins::string::compile_pattern;
use crate::schema::evaluate::{Evaluator, Trail};
use crate::schema::refs::{resolve_ref, walk_schemas};
use crate::schema::report::SchemaError;

/// Predicate behind a caller-defined `format`.
pub type FormatFn = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Caller-defined formats, by name.
pub type CustomFormats = IndexMap<String, FormatFn>;

/// Compiled patterns, shared by every evaluation of a document.
#[derive(Default)]
pub(crate) struct RegexCache {
    compiled: Mutex<HashMap<String, Arc<Regex>>>,
}

impl RegexCache {
    pub(crate) fn get(&self, pattern: &str) -> Result<Arc<Regex>, BuildError> {
        let mut compiled = self.compiled.lock();
        if let Some(regex) = compiled.get(pattern) {
            return Ok(Arc::clone(regex));
        }
        let regex = Arc::new(compile_pattern(pattern)?);
        compiled.insert(pattern.to_owned(), Arc::clone(&regex));
        Ok(regex)
    }

    fn len(&self) -> usize {
        self.compiled.lock().len()
    }
}

/// A schema document plus the caches its subschemas are evaluated with.
///
/// Every bridge rule compiled from one document holds the same context, so
/// `$ref` targets resolve against the full document and each pattern is
/// compiled once.
pub struct SchemaContext {
    root: Arc<Value>,
    regexes: RegexCache,
    formats: CustomFormats,
}

impl SchemaContext {
    #[must_use]
    pub fn new(root: Value) -> Self {
        Self {
            root: Arc::new(root),
            regexes: RegexCache::default(),
            formats: CustomFormats::new(),
        }
    }

    #[must_use]
    pub fn with_formats(mut self, formats: CustomFormats) -> Self {
        self.formats = formats;
        self
    }

    /// The root document.
    #[must_use]
    pub fn root(&self) -> &Value {
        &self.root
    }

    #[must_use]
    pub fn formats(&self) -> &CustomFormats {
        &self.formats
    }

    /// Returns the compiled pattern, compiling it on first use.
    pub fn regex(&self, pattern: &str) -> Result<Arc<Regex>, BuildError> {
        self.regexes.get(pattern)
    }

    /// Resolves a `$ref` against the root document.
    pub fn resolve(&self, reference: &str) -> Result<&Value, BuildError> {
        resolve_ref(reference, &self.root)
    }

    /// Checks that every `$ref` in `schema` resolves and every pattern
    /// compiles.
    pub fn check(&self, schema: &Value) -> Result<(), BuildError> {
        walk_schemas(schema, &mut |sub| {
            let Value::Object(map) = sub else {
                return Ok(());
            };
            if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
                self.resolve(reference)?;
            }
            if let Some(pattern) = map.get("pattern").and_then(Value::as_str) {
                self.regex(pattern)?;
            }
            if let Some(Value::Object(patterns)) = map.get("patternProperties") {
                for pattern in patterns.keys() {
                    self.regex(pattern)?;
                }
            }
            Ok(())
        })
    }

    /// Returns true if `value` satisfies `schema`.
    #[must_use]
    pub fn is_valid(&self, value: &Value, schema: &Value) -> bool {
        self.evaluator().is_valid(value, schema)
    }

    /// Every failure of `value` against `schema`, with paths relative to
    /// `value`.
    #[must_use]
    pub fn errors(&self, value: &Value, schema: &Value) -> Vec<SchemaError> {
        let mut out = Vec::new();
        self.evaluator().collect(value, schema, &Trail::Root, &mut out);
        out
    }

    pub(crate) fn evaluator(&self) -> Evaluator<'_> {
        Evaluator::new(&self.root, &self.regexes, Some(&self.formats))
    }
}

impl fmt::Debug for SchemaContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaContext")
            .field("cached_patterns", &self.regexes.len())
            .field("formats", &self.formats.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

//! Direct Draft-07 evaluator.
//!
//! Used for keywords with no native rule (`allOf`, `if`, `$ref`, ...) and for
//! detailed error reports. One recursive walk serves both: with
//! [`Sink::Discard`] it stops at the first failure, with [`Sink::Collect`] it
//! keeps going and records every failure with its path.

use serde_json::{Map, Value};

use crate::error::codes;
use crate::path::push_key;
use crate::plugins::common::json_type_matches;
use crate::plugins::format::Format;
use crate::schema::context::{CustomFormats, RegexCache};
use crate::schema::refs::resolve_ref;
use crate::schema::report::SchemaError;
use crate::value::{all_unique, as_count, char_len, format_number, is_multiple_of, json_equal, json_type_name};

/// Schemas applied in place to one value before the walk gives up on a
/// `$ref` cycle. Descending into a child value resets the count.
const MAX_HOPS: usize = 256;

/// Evaluates `value` against `schema`; `$ref`s resolve against `root`.
///
/// Patterns are compiled on the fly. Prefer a
/// [`SchemaContext`](crate::schema::SchemaContext) when the same schema is
/// evaluated repeatedly.
#[must_use]
pub fn evaluate(value: &Value, schema: &Value, root: &Value) -> bool {
    let regexes = RegexCache::default();
    Evaluator::new(root, &regexes, None).is_valid(value, schema)
}

// ============================================================================
// PATHS AND SINKS
// ============================================================================

/// Location of the value under evaluation, rendered only on failure.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Trail<'p> {
    Root,
    /// An already-rendered location.
    Prefix(&'p str),
    Key(&'p Trail<'p>, &'p str),
    Index(&'p Trail<'p>, usize),
}

impl Trail<'_> {
    pub(crate) fn render(&self) -> String {
        let mut out = String::new();
        self.write(&mut out);
        out
    }

    fn write(&self, out: &mut String) {
        match self {
            Trail::Root => {}
            Trail::Prefix(prefix) => out.push_str(prefix),
            Trail::Key(parent, key) => {
                parent.write(out);
                push_key(out, key);
            }
            Trail::Index(parent, index) => {
                parent.write(out);
                out.push('[');
                out.push_str(&index.to_string());
                out.push(']');
            }
        }
    }
}

pub(crate) enum Sink<'o> {
    Discard,
    Collect(&'o mut Vec<SchemaError>),
}

impl Sink<'_> {
    const fn collecting(&self) -> bool {
        matches!(self, Sink::Collect(_))
    }

    fn push(&mut self, at: &Trail<'_>, keyword: &str, message: String) {
        if let Sink::Collect(out) = self {
            out.push(SchemaError {
                path: at.render(),
                keyword: keyword.to_owned(),
                message,
            });
        }
    }
}

/// Records a failure. Returns from the enclosing check unless collecting.
macro_rules! fail {
    ($sink:ident, $ok:ident, $at:expr, $keyword:expr, $message:expr) => {{
        $ok = false;
        if !$sink.collecting() {
            return false;
        }
        $sink.push($at, $keyword, $message);
    }};
}

/// Folds a nested result. Returns from the enclosing check unless collecting.
macro_rules! nested {
    ($sink:ident, $ok:ident, $result:expr) => {{
        if !$result {
            $ok = false;
            if !$sink.collecting() {
                return false;
            }
        }
    }};
}

// ============================================================================
// EVALUATOR
// ============================================================================

pub(crate) struct Evaluator<'s> {
    root: &'s Value,
    regexes: &'s RegexCache,
    formats: Option<&'s CustomFormats>,
}

impl<'s> Evaluator<'s> {
    pub(crate) const fn new(
        root: &'s Value,
        regexes: &'s RegexCache,
        formats: Option<&'s CustomFormats>,
    ) -> Self {
        Self { root, regexes, formats }
    }

    pub(crate) fn is_valid(&self, value: &Value, schema: &Value) -> bool {
        self.walk(value, schema, &Trail::Root, &mut Sink::Discard, 0)
    }

    pub(crate) fn collect(
        &self,
        value: &Value,
        schema: &Value,
        at: &Trail<'_>,
        out: &mut Vec<SchemaError>,
    ) -> bool {
        self.walk(value, schema, at, &mut Sink::Collect(out), 0)
    }

    /// Returns true if `pattern` compiles and matches `key`.
    pub(crate) fn matches_pattern(&self, pattern: &str, key: &str) -> bool {
        self.regexes.get(pattern).is_ok_and(|re| re.is_match(key))
    }

    fn walk(&self, value: &Value, schema: &Value, at: &Trail<'_>, sink: &mut Sink<'_>, hops: usize) -> bool {
        let map = match schema {
            Value::Bool(true) => return true,
            Value::Bool(false) => {
                sink.push(at, codes::FALSE_SCHEMA, "No value is allowed here".to_owned());
                return false;
            }
            Value::Object(map) => map,
            _ => return true,
        };
        if hops > MAX_HOPS {
            sink.push(at, codes::REF, "Schema references loop without reaching a value".to_owned());
            return false;
        }

        if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
            return match resolve_ref(reference, self.root) {
                Ok(target) => self.walk(value, target, at, sink, hops + 1),
                Err(_) => {
                    sink.push(at, codes::REF, format!("Unresolvable reference `{reference}`"));
                    false
                }
            };
        }

        let mut ok = true;
        nested!(sink, ok, self.check_any(value, map, at, sink));
        nested!(
            sink,
            ok,
            match value {
                Value::String(s) => self.check_string(s, map, at, sink),
                Value::Number(n) => n.as_f64().is_none_or(|n| self.check_number(n, map, at, sink)),
                Value::Array(items) => self.check_array(items, map, at, sink),
                Value::Object(object) => self.check_object(value, object, map, at, sink, hops),
                _ => true,
            }
        );
        nested!(sink, ok, self.check_composition(value, map, at, sink, hops));
        ok
    }

    fn check_any(&self, value: &Value, map: &Map<String, Value>, at: &Trail<'_>, sink: &mut Sink<'_>) -> bool {
        let mut ok = true;

        if let Some(types) = map.get("type") {
            let admitted = match types {
                Value::String(name) => json_type_matches(name, value),
                Value::Array(names) => names
                    .iter()
                    .filter_map(Value::as_str)
                    .any(|name| json_type_matches(name, value)),
                _ => true,
            };
            if !admitted {
                fail!(
                    sink,
                    ok,
                    at,
                    codes::TYPE,
                    format!("Expected {}, received {}", type_list(types), json_type_name(value))
                );
            }
        }

        if let Some(Value::Array(allowed)) = map.get("enum") {
            if !allowed.iter().any(|a| json_equal(a, value)) {
                let rendered: Vec<String> = allowed.iter().map(Value::to_string).collect();
                fail!(sink, ok, at, codes::ENUM, format!("Must be one of: {}", rendered.join(", ")));
            }
        }

        if let Some(expected) = map.get("const") {
            if !json_equal(expected, value) {
                fail!(sink, ok, at, codes::CONST, format!("Must equal {expected}"));
            }
        }

        ok
    }

    fn check_string(&self, s: &str, map: &Map<String, Value>, at: &Trail<'_>, sink: &mut Sink<'_>) -> bool {
        let mut ok = true;

        if let Some(min) = map.get("minLength").and_then(as_count) {
            if (char_len(s) as u64) < min {
                fail!(sink, ok, at, codes::MIN_LENGTH, format!("Must be at least {min} characters"));
            }
        }
        if let Some(max) = map.get("maxLength").and_then(as_count) {
            if char_len(s) as u64 > max {
                fail!(sink, ok, at, codes::MAX_LENGTH, format!("Must be at most {max} characters"));
            }
        }

        if let Some(pattern) = map.get("pattern").and_then(Value::as_str) {
            match self.regexes.get(pattern) {
                Ok(regex) if regex.is_match(s) => {}
                Ok(_) => fail!(sink, ok, at, codes::PATTERN, format!("Must match pattern `{pattern}`")),
                Err(_) => fail!(sink, ok, at, codes::PATTERN, format!("Invalid pattern `{pattern}`")),
            }
        }

        if let Some(name) = map.get("format").and_then(Value::as_str) {
            if let Some(format) = Format::from_name(name) {
                if !format.check(s) {
                    fail!(sink, ok, at, codes::FORMAT, format.message());
                }
            } else if let Some(custom) = self.formats.and_then(|formats| formats.get(name)) {
                if !custom(s) {
                    fail!(sink, ok, at, codes::FORMAT, format!("Must match format `{name}`"));
                }
            }
        }

        ok
    }

    fn check_number(&self, n: f64, map: &Map<String, Value>, at: &Trail<'_>, sink: &mut Sink<'_>) -> bool {
        let mut ok = true;

        // Draft-04 style: a boolean `exclusiveMinimum` modifies `minimum`.
        let exclusive_min = map.get("exclusiveMinimum").and_then(Value::as_bool) == Some(true);
        if let Some(min) = map.get("minimum").and_then(Value::as_f64) {
            if exclusive_min && n <= min {
                fail!(sink, ok, at, codes::EXCLUSIVE_MINIMUM, format!("Must be greater than {}", format_number(min)));
            } else if n < min {
                fail!(
                    sink,
                    ok,
                    at,
                    codes::MINIMUM,
                    format!("Must be greater than or equal to {}", format_number(min))
                );
            }
        }
        if let Some(bound) = map.get("exclusiveMinimum").and_then(Value::as_f64) {
            if n <= bound {
                fail!(sink, ok, at, codes::EXCLUSIVE_MINIMUM, format!("Must be greater than {}", format_number(bound)));
            }
        }

        let exclusive_max = map.get("exclusiveMaximum").and_then(Value::as_bool) == Some(true);
        if let Some(max) = map.get("maximum").and_then(Value::as_f64) {
            if exclusive_max && n >= max {
                fail!(sink, ok, at, codes::EXCLUSIVE_MAXIMUM, format!("Must be less than {}", format_number(max)));
            } else if n > max {
                fail!(
                    sink,
                    ok,
                    at,
                    codes::MAXIMUM,
                    format!("Must be less than or equal to {}", format_number(max))
                );
            }
        }
        if let Some(bound) = map.get("exclusiveMaximum").and_then(Value::as_f64) {
            if n >= bound {
                fail!(sink, ok, at, codes::EXCLUSIVE_MAXIMUM, format!("Must be less than {}", format_number(bound)));
            }
        }

        if let Some(divisor) = map.get("multipleOf").and_then(Value::as_f64) {
            if divisor > 0.0 && !is_multiple_of(n, divisor) {
                fail!(sink, ok, at, codes::MULTIPLE_OF, format!("Must be a multiple of {}", format_number(divisor)));
            }
        }

        ok
    }

    fn check_array(&self, items: &[Value], map: &Map<String, Value>, at: &Trail<'_>, sink: &mut Sink<'_>) -> bool {
        let mut ok = true;

        match map.get("items") {
            Some(Value::Array(tuple)) => {
                for (index, (item, schema)) in items.iter().zip(tuple).enumerate() {
                    let child = Trail::Index(at, index);
                    nested!(sink, ok, self.walk(item, schema, &child, sink, 0));
                }
                if let Some(extra) = map.get("additionalItems") {
                    for (index, item) in items.iter().enumerate().skip(tuple.len()) {
                        let child = Trail::Index(at, index);
                        nested!(sink, ok, self.walk(item, extra, &child, sink, 0));
                    }
                }
            }
            Some(schema) => {
                for (index, item) in items.iter().enumerate() {
                    let child = Trail::Index(at, index);
                    nested!(sink, ok, self.walk(item, schema, &child, sink, 0));
                }
            }
            None => {}
        }

        if let Some(min) = map.get("minItems").and_then(as_count) {
            if (items.len() as u64) < min {
                fail!(sink, ok, at, codes::MIN_ITEMS, format!("Must contain at least {min} items"));
            }
        }
        if let Some(max) = map.get("maxItems").and_then(as_count) {
            if items.len() as u64 > max {
                fail!(sink, ok, at, codes::MAX_ITEMS, format!("Must contain at most {max} items"));
            }
        }
        if map.get("uniqueItems").and_then(Value::as_bool) == Some(true) && !all_unique(items) {
            fail!(sink, ok, at, codes::UNIQUE_ITEMS, "Items must be unique".to_owned());
        }

        if let Some(schema) = map.get("contains") {
            let found = items
                .iter()
                .any(|item| self.walk(item, schema, at, &mut Sink::Discard, 0));
            if !found {
                fail!(sink, ok, at, codes::CONTAINS, "Must contain at least one matching item".to_owned());
            }
        }

        ok
    }

    fn check_object(
        &self,
        value: &Value,
        object: &Map<String, Value>,
        map: &Map<String, Value>,
        at: &Trail<'_>,
        sink: &mut Sink<'_>,
        hops: usize,
    ) -> bool {
        let mut ok = true;

        if let Some(Value::Array(required)) = map.get("required") {
            for key in required.iter().filter_map(Value::as_str) {
                if !object.contains_key(key) {
                    let child = Trail::Key(at, key);
                    fail!(sink, ok, &child, codes::REQUIRED, "This field is required".to_owned());
                }
            }
        }

        let properties = map.get("properties").and_then(Value::as_object);
        if let Some(properties) = properties {
            for (key, schema) in properties {
                if let Some(child_value) = object.get(key) {
                    let child = Trail::Key(at, key);
                    nested!(sink, ok, self.walk(child_value, schema, &child, sink, 0));
                }
            }
        }

        let patterns = map.get("patternProperties").and_then(Value::as_object);
        if let Some(patterns) = patterns {
            for (pattern, schema) in patterns {
                let Ok(regex) = self.regexes.get(pattern) else {
                    fail!(sink, ok, at, codes::PATTERN_PROPERTIES, format!("Invalid pattern `{pattern}`"));
                    continue;
                };
                for (key, child_value) in object.iter().filter(|(key, _)| regex.is_match(key)) {
                    let child = Trail::Key(at, key);
                    nested!(sink, ok, self.walk(child_value, schema, &child, sink, 0));
                }
            }
        }

        if let Some(additional) = map.get("additionalProperties") {
            for (key, child_value) in object {
                let declared = properties.is_some_and(|p| p.contains_key(key))
                    || patterns.is_some_and(|p| p.keys().any(|pattern| self.matches_pattern(pattern, key)));
                if declared {
                    continue;
                }
                let child = Trail::Key(at, key);
                if additional == &Value::Bool(false) {
                    fail!(
                        sink,
                        ok,
                        &child,
                        codes::ADDITIONAL_PROPERTIES,
                        format!("Property `{key}` is not allowed")
                    );
                } else {
                    nested!(sink, ok, self.walk(child_value, additional, &child, sink, 0));
                }
            }
        }

        if let Some(schema) = map.get("propertyNames") {
            for key in object.keys() {
                let name = Value::String(key.clone());
                if !self.walk(&name, schema, at, &mut Sink::Discard, 0) {
                    fail!(sink, ok, at, codes::PROPERTY_NAMES, format!("Property name `{key}` is invalid"));
                }
            }
        }

        if let Some(Value::Object(dependencies)) = map.get("dependencies") {
            for (key, dependency) in dependencies.iter().filter(|(key, _)| object.contains_key(*key)) {
                match dependency {
                    Value::Array(names) => {
                        for name in names.iter().filter_map(Value::as_str) {
                            if !object.contains_key(name) {
                                fail!(
                                    sink,
                                    ok,
                                    at,
                                    codes::DEPENDENCIES,
                                    format!("Property `{name}` is required when `{key}` is present")
                                );
                            }
                        }
                    }
                    schema => nested!(sink, ok, self.walk(value, schema, at, sink, hops + 1)),
                }
            }
        }

        if let Some(min) = map.get("minProperties").and_then(as_count) {
            if (object.len() as u64) < min {
                fail!(sink, ok, at, codes::MIN_PROPERTIES, format!("Must have at least {min} properties"));
            }
        }
        if let Some(max) = map.get("maxProperties").and_then(as_count) {
            if object.len() as u64 > max {
                fail!(sink, ok, at, codes::MAX_PROPERTIES, format!("Must have at most {max} properties"));
            }
        }

        ok
    }

    fn check_composition(
        &self,
        value: &Value,
        map: &Map<String, Value>,
        at: &Trail<'_>,
        sink: &mut Sink<'_>,
        hops: usize,
    ) -> bool {
        let mut ok = true;

        if let Some(Value::Array(schemas)) = map.get("allOf") {
            for schema in schemas {
                nested!(sink, ok, self.walk(value, schema, at, sink, hops + 1));
            }
        }

        if let Some(Value::Array(schemas)) = map.get("anyOf") {
            let matched = schemas
                .iter()
                .any(|schema| self.walk(value, schema, at, &mut Sink::Discard, hops + 1));
            if !matched {
                fail!(sink, ok, at, codes::ANY_OF, "Must match at least one schema in anyOf".to_owned());
            }
        }

        if let Some(Value::Array(schemas)) = map.get("oneOf") {
            let matched = schemas
                .iter()
                .filter(|schema| self.walk(value, schema, at, &mut Sink::Discard, hops + 1))
                .count();
            if matched != 1 {
                let count = if matched == 0 { "none".to_owned() } else { matched.to_string() };
                fail!(sink, ok, at, codes::ONE_OF, format!("Must match exactly one schema in oneOf, matched {count}"));
            }
        }

        if let Some(schema) = map.get("not") {
            if self.walk(value, schema, at, &mut Sink::Discard, hops + 1) {
                fail!(sink, ok, at, codes::NOT, "Must not match the schema in not".to_owned());
            }
        }

        if let Some(condition) = map.get("if") {
            let branch = if self.walk(value, condition, at, &mut Sink::Discard, hops + 1) {
                map.get("then")
            } else {
                map.get("else")
            };
            if let Some(branch) = branch {
                nested!(sink, ok, self.walk(value, branch, at, sink, hops + 1));
            }
        }

        ok
    }
}

fn type_list(types: &Value) -> String {
    match types {
        Value::String(name) => name.clone(),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" or "),
        other => other.to_string(),
    }
}

//! Detailed error reports against a raw schema.

use serde::Serialize;
use serde_json::Value;

use crate::error::codes;
use crate::path::{FieldPath, Segment};
use crate::schema::context::RegexCache;
use crate::schema::evaluate::{Evaluator, Trail};
use crate::schema::refs::resolve_ref;

/// Maximum `$ref` hops followed while narrowing a schema to a scope.
const MAX_REF_HOPS: usize = 32;

/// One failure reported by the evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaError {
    /// Concrete path of the failing value, empty for the root.
    pub path: String,
    /// The keyword that failed, e.g. `minLength`.
    pub keyword: String,
    pub message: String,
}

/// Every failure of `value` against `schema`.
///
/// # Examples
///
/// ```rust
/// use serde_json::json;
/// use sift_validator::schema::detailed_errors;
///
/// let schema = json!({
///     "type": "object",
///     "required": ["name"],
///     "properties": {"age": {"minimum": 0}}
/// });
/// let errors = detailed_errors(&json!({"age": -1}), &schema);
/// assert_eq!(errors.len(), 2);
/// assert_eq!(errors[0].path, "name");
/// assert_eq!(errors[1].keyword, "minimum");
/// ```
#[must_use]
pub fn detailed_errors(value: &Value, schema: &Value) -> Vec<SchemaError> {
    let regexes = RegexCache::default();
    let mut out = Vec::new();
    Evaluator::new(schema, &regexes, None).collect(value, schema, &Trail::Root, &mut out);
    out
}

/// Failures of the part of `value` at `scope`, for re-checking one field.
///
/// The scope is a field path (`user.address`, `items[0]`, `items[*]`). The
/// schema is narrowed through `properties`, `patternProperties`,
/// `additionalProperties` and `items`; reported paths are full paths from
/// the root. A scoped key that is missing but listed in its parent's
/// `required` is reported as `required`. An empty scope checks everything.
#[must_use]
pub fn specific_errors(value: &Value, schema: &Value, scope: &str) -> Vec<SchemaError> {
    let regexes = RegexCache::default();
    let evaluator = Evaluator::new(schema, &regexes, None);
    let path = FieldPath::lenient(scope);
    let mut out = Vec::new();
    let scope = Scope {
        evaluator: &evaluator,
        root: schema,
    };
    scope.narrow(Some(value), schema, path.segments(), String::new(), &mut out);
    out
}

struct Scope<'e, 's> {
    evaluator: &'e Evaluator<'s>,
    root: &'s Value,
}

impl<'s> Scope<'_, 's> {
    fn narrow(
        &self,
        value: Option<&Value>,
        schema: &'s Value,
        segments: &[Segment],
        location: String,
        out: &mut Vec<SchemaError>,
    ) {
        let Some(schema) = self.deref(schema) else {
            return;
        };
        let Some((segment, rest)) = segments.split_first() else {
            if let Some(value) = value {
                self.evaluator
                    .collect(value, schema, &Trail::Prefix(&location), out);
            }
            return;
        };

        match segment {
            Segment::Key(key) => {
                let mut child_location = location;
                crate::path::push_key(&mut child_location, key);
                let child = value.and_then(|v| v.get(&**key));
                if child.is_none() && rest.is_empty() && value.is_some_and(Value::is_object) {
                    if is_required(schema, key) {
                        out.push(SchemaError {
                            path: child_location,
                            keyword: codes::REQUIRED.to_owned(),
                            message: "This field is required".to_owned(),
                        });
                    }
                    return;
                }
                if let Some(sub) = self.property_schema(schema, key) {
                    self.narrow(child, sub, rest, child_location, out);
                }
            }
            Segment::Index(index) => {
                let child = value.and_then(|v| v.get(*index));
                if let Some(sub) = item_schema(schema, *index) {
                    self.narrow(child, sub, rest, format!("{location}[{index}]"), out);
                }
            }
            Segment::Wildcard => {
                let Some(items) = value.and_then(Value::as_array) else {
                    return;
                };
                for (index, item) in items.iter().enumerate() {
                    if let Some(sub) = item_schema(schema, index) {
                        self.narrow(Some(item), sub, rest, format!("{location}[{index}]"), out);
                    }
                }
            }
        }
    }

    fn deref(&self, mut schema: &'s Value) -> Option<&'s Value> {
        for _ in 0..MAX_REF_HOPS {
            match schema.get("$ref").and_then(Value::as_str) {
                Some(reference) => schema = resolve_ref(reference, self.root).ok()?,
                None => return Some(schema),
            }
        }
        None
    }

    fn property_schema(&self, schema: &'s Value, key: &str) -> Option<&'s Value> {
        if let Some(sub) = schema.get("properties").and_then(|p| p.get(key)) {
            return Some(sub);
        }
        if let Some(patterns) = schema.get("patternProperties").and_then(Value::as_object) {
            let matched = patterns
                .iter()
                .find(|(pattern, _)| self.evaluator.matches_pattern(pattern, key));
            if let Some((_, sub)) = matched {
                return Some(sub);
            }
        }
        schema.get("additionalProperties")
    }
}

fn item_schema(schema: &Value, index: usize) -> Option<&Value> {
    match schema.get("items")? {
        Value::Array(tuple) => tuple.get(index).or_else(|| schema.get("additionalItems")),
        single => Some(single),
    }
}

fn is_required(schema: &Value, key: &str) -> bool {
    schema
        .get("required")
        .and_then(Value::as_array)
        .is_some_and(|names| names.iter().any(|name| name.as_str() == Some(key)))
}

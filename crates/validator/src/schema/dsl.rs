//! Flattening a JSON Schema into per-path constraint lists.
//!
//! [`schema_to_dsl`] walks the schema depth first and emits one
//! [`DslEntry`] per node: the root, every property (dotted paths) and every
//! single-schema `items` (`path[*]`). Each entry lists the keywords that
//! apply at that path, normalized so the translator can map them one by one.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::path::{push_key, push_wildcard};
use crate::schema::refs::resolve_ref;

/// A keyword as carried by a [`DslEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Constraint {
    Required,
    Enum,
    Const,
    MinLength,
    MaxLength,
    Pattern,
    Format,
    Minimum,
    Maximum,
    ExclusiveMinimum,
    ExclusiveMaximum,
    MultipleOf,
    MinItems,
    MaxItems,
    UniqueItems,
    MinProperties,
    MaxProperties,
    Default,
    Description,
    AllOf,
    AnyOf,
    OneOf,
    Not,
    /// `if` with its `then` / `else`, as one object.
    Conditional,
    Ref,
    Contains,
    /// Array-form `items` with `additionalItems`, as one object.
    TupleItems,
    /// `additionalProperties` with the property names and patterns it is
    /// relative to, as one object.
    AdditionalProperties,
    PatternProperties,
    PropertyNames,
    Dependencies,
    /// The node is the `false` schema.
    FalseSchema,
}

impl Constraint {
    /// Keywords copied verbatim from the schema.
    const PLAIN: [(&'static str, Constraint); 20] = [
        ("enum", Constraint::Enum),
        ("const", Constraint::Const),
        ("minLength", Constraint::MinLength),
        ("maxLength", Constraint::MaxLength),
        ("pattern", Constraint::Pattern),
        ("format", Constraint::Format),
        ("multipleOf", Constraint::MultipleOf),
        ("minItems", Constraint::MinItems),
        ("maxItems", Constraint::MaxItems),
        ("minProperties", Constraint::MinProperties),
        ("maxProperties", Constraint::MaxProperties),
        ("default", Constraint::Default),
        ("description", Constraint::Description),
        ("allOf", Constraint::AllOf),
        ("anyOf", Constraint::AnyOf),
        ("oneOf", Constraint::OneOf),
        ("not", Constraint::Not),
        ("contains", Constraint::Contains),
        ("propertyNames", Constraint::PropertyNames),
        ("dependencies", Constraint::Dependencies),
    ];

    /// The JSON Schema keyword; also the code reported on failure.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Constraint::Required => "required",
            Constraint::Enum => "enum",
            Constraint::Const => "const",
            Constraint::MinLength => "minLength",
            Constraint::MaxLength => "maxLength",
            Constraint::Pattern => "pattern",
            Constraint::Format => "format",
            Constraint::Minimum => "minimum",
            Constraint::Maximum => "maximum",
            Constraint::ExclusiveMinimum => "exclusiveMinimum",
            Constraint::ExclusiveMaximum => "exclusiveMaximum",
            Constraint::MultipleOf => "multipleOf",
            Constraint::MinItems => "minItems",
            Constraint::MaxItems => "maxItems",
            Constraint::UniqueItems => "uniqueItems",
            Constraint::MinProperties => "minProperties",
            Constraint::MaxProperties => "maxProperties",
            Constraint::Default => "default",
            Constraint::Description => "description",
            Constraint::AllOf => "allOf",
            Constraint::AnyOf => "anyOf",
            Constraint::OneOf => "oneOf",
            Constraint::Not => "not",
            Constraint::Conditional => "if",
            Constraint::Ref => "$ref",
            Constraint::Contains => "contains",
            Constraint::TupleItems => "items",
            Constraint::AdditionalProperties => "additionalProperties",
            Constraint::PatternProperties => "patternProperties",
            Constraint::PropertyNames => "propertyNames",
            Constraint::Dependencies => "dependencies",
            Constraint::FalseSchema => "false",
        }
    }
}

/// Constraints at one path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DslEntry {
    /// Field path; empty for the root.
    pub path: String,
    /// The `type` keyword when it names one type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// The `type` keyword when it lists several.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_types: Option<Vec<String>>,
    pub constraints: IndexMap<Constraint, Value>,
    /// True for entries below the root.
    pub nested: bool,
}

impl DslEntry {
    fn new(path: String, nested: bool) -> Self {
        Self {
            path,
            schema_type: None,
            multiple_types: None,
            constraints: IndexMap::new(),
            nested,
        }
    }

    /// The declared type names, in order.
    #[must_use]
    pub fn types(&self) -> Vec<&str> {
        match (&self.schema_type, &self.multiple_types) {
            (Some(single), _) => vec![single.as_str()],
            (None, Some(many)) => many.iter().map(String::as_str).collect(),
            (None, None) => Vec::new(),
        }
    }

    #[must_use]
    pub fn get(&self, constraint: Constraint) -> Option<&Value> {
        self.constraints.get(&constraint)
    }
}

/// Flattening switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DslOptions {
    /// Treat every declared property as required.
    pub strict_required: bool,
    /// When false, objects with `properties` and no `additionalProperties`
    /// reject undeclared keys.
    pub allow_additional_properties: bool,
}

impl Default for DslOptions {
    fn default() -> Self {
        Self {
            strict_required: false,
            allow_additional_properties: true,
        }
    }
}

/// Flattens `schema` into entries rooted at `parent_path`.
///
/// `root` is the document `$ref`s point into. References are kept as
/// [`Constraint::Ref`] and evaluated later, so recursive schemas terminate.
/// The `description` and `default` of the schema a reference lands on are
/// copied onto the referring entry.
///
/// ```rust
/// use serde_json::json;
/// use sift_validator::schema::{schema_to_dsl, Constraint};
///
/// let schema = json!({
///     "type": "object",
///     "required": ["name"],
///     "properties": {
///         "name": {"type": "string", "minLength": 3},
///         "tags": {"type": "array", "items": {"type": "string"}}
///     }
/// });
/// let entries = schema_to_dsl(&schema, "", &schema);
/// let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
/// assert_eq!(paths, ["", "name", "tags", "tags[*]"]);
/// assert!(entries[1].get(Constraint::Required).is_some());
/// ```
#[must_use]
pub fn schema_to_dsl(schema: &Value, parent_path: &str, root: &Value) -> Vec<DslEntry> {
    schema_to_dsl_with(schema, parent_path, root, DslOptions::default())
}

/// [`schema_to_dsl`] with explicit options.
#[must_use]
pub fn schema_to_dsl_with(
    schema: &Value,
    parent_path: &str,
    root: &Value,
    options: DslOptions,
) -> Vec<DslEntry> {
    let mut out = Vec::new();
    Flattener { root, options }.walk(schema, parent_path.to_owned(), false, !parent_path.is_empty(), &mut out);
    out
}

/// Reference chains longer than this are left without annotations.
const MAX_REF_CHAIN: usize = 32;

struct Flattener<'r> {
    root: &'r Value,
    options: DslOptions,
}

impl Flattener<'_> {
    /// The schema at the end of a `$ref` chain, if it resolves.
    fn referenced(&self, reference: &str) -> Option<&Map<String, Value>> {
        let mut target = resolve_ref(reference, self.root).ok()?;
        for _ in 0..MAX_REF_CHAIN {
            match target.get("$ref").and_then(Value::as_str) {
                Some(next) => target = resolve_ref(next, self.root).ok()?,
                None => return target.as_object(),
            }
        }
        None
    }

    fn walk(&self, schema: &Value, path: String, required: bool, nested: bool, out: &mut Vec<DslEntry>) {
        let mut entry = DslEntry::new(path, nested);
        if required {
            entry.constraints.insert(Constraint::Required, Value::Bool(true));
        }

        let map = match schema {
            Value::Object(map) => map,
            Value::Bool(false) => {
                entry.constraints.insert(Constraint::FalseSchema, Value::Bool(false));
                out.push(entry);
                return;
            }
            _ => {
                out.push(entry);
                return;
            }
        };

        // `$ref` replaces every sibling keyword.
        if let Some(reference) = map.get("$ref") {
            entry.constraints.insert(Constraint::Ref, reference.clone());
            if let Some(target) = reference.as_str().and_then(|r| self.referenced(r)) {
                let annotations = [("description", Constraint::Description), ("default", Constraint::Default)];
                for (keyword, constraint) in annotations {
                    if let Some(value) = target.get(keyword) {
                        entry.constraints.insert(constraint, value.clone());
                    }
                }
            }
            out.push(entry);
            return;
        }

        match map.get("type") {
            Some(Value::String(name)) => entry.schema_type = Some(name.clone()),
            Some(Value::Array(names)) => {
                let names: Vec<String> = names.iter().filter_map(Value::as_str).map(str::to_owned).collect();
                if let [single] = names.as_slice() {
                    entry.schema_type = Some(single.clone());
                } else {
                    entry.multiple_types = Some(names);
                }
            }
            _ => {}
        }

        for (keyword, constraint) in Constraint::PLAIN {
            if let Some(value) = map.get(keyword) {
                entry.constraints.insert(constraint, value.clone());
            }
        }
        if map.get("uniqueItems") == Some(&Value::Bool(true)) {
            entry.constraints.insert(Constraint::UniqueItems, Value::Bool(true));
        }
        normalize_bounds(map, &mut entry);

        if let Some(condition) = map.get("if") {
            let mut conditional = Map::new();
            conditional.insert("if".to_owned(), condition.clone());
            for branch in ["then", "else"] {
                if let Some(schema) = map.get(branch) {
                    conditional.insert(branch.to_owned(), schema.clone());
                }
            }
            entry.constraints.insert(Constraint::Conditional, Value::Object(conditional));
        }

        let items = map.get("items");
        if let Some(Value::Array(tuple)) = items {
            let mut fragment = json!({ "items": tuple });
            if let (Some(extra), Value::Object(fragment)) = (map.get("additionalItems"), &mut fragment) {
                fragment.insert("additionalItems".to_owned(), extra.clone());
            }
            entry.constraints.insert(Constraint::TupleItems, fragment);
        }

        let properties = map.get("properties").and_then(Value::as_object);
        let patterns = map.get("patternProperties").and_then(Value::as_object);
        if let Some(patterns) = patterns {
            entry
                .constraints
                .insert(Constraint::PatternProperties, Value::Object(patterns.clone()));
        }
        let additional = match map.get("additionalProperties") {
            Some(additional) => Some(additional.clone()),
            None if properties.is_some() && !self.options.allow_additional_properties => Some(Value::Bool(false)),
            None => None,
        };
        if let Some(additional) = additional {
            let declared: Map<String, Value> = properties
                .into_iter()
                .flat_map(|p| p.keys())
                .map(|key| (key.clone(), Value::Bool(true)))
                .collect();
            let matched: Map<String, Value> = patterns
                .into_iter()
                .flat_map(|p| p.keys())
                .map(|pattern| (pattern.clone(), Value::Bool(true)))
                .collect();
            entry.constraints.insert(
                Constraint::AdditionalProperties,
                json!({
                    "properties": declared,
                    "patternProperties": matched,
                    "additionalProperties": additional,
                }),
            );
        }

        let parent = entry.path.clone();
        out.push(entry);

        if let Some(item_schema) = items.filter(|items| !items.is_array()) {
            let mut child = parent.clone();
            push_wildcard(&mut child);
            self.walk(item_schema, child, false, true, out);
        }

        let required_names: Vec<&str> = map
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        if let Some(properties) = properties {
            for (key, child_schema) in properties {
                let is_required = self.options.strict_required || required_names.contains(&key.as_str());
                self.walk(child_schema, child_path(&parent, key), is_required, true, out);
            }
        }
        // Required names without a declared schema still have to be present.
        for name in required_names {
            if !properties.is_some_and(|p| p.contains_key(name)) {
                let mut entry = DslEntry::new(child_path(&parent, name), true);
                entry.constraints.insert(Constraint::Required, Value::Bool(true));
                out.push(entry);
            }
        }
    }
}

fn child_path(parent: &str, key: &str) -> String {
    let mut path = parent.to_owned();
    push_key(&mut path, key);
    path
}

/// Draft-07 numeric exclusive bounds are kept as they are. A draft-04
/// boolean `exclusiveMinimum: true` turns the sibling `minimum` exclusive;
/// `false` leaves it inclusive. The maximum side is symmetric.
fn normalize_bounds(map: &Map<String, Value>, entry: &mut DslEntry) {
    let sides = [
        ("minimum", "exclusiveMinimum", Constraint::Minimum, Constraint::ExclusiveMinimum),
        ("maximum", "exclusiveMaximum", Constraint::Maximum, Constraint::ExclusiveMaximum),
    ];
    for (inclusive_kw, exclusive_kw, inclusive, exclusive) in sides {
        let bound = map.get(inclusive_kw).filter(|v| v.is_number());
        match map.get(exclusive_kw) {
            Some(Value::Bool(true)) => {
                if let Some(bound) = bound {
                    entry.constraints.insert(exclusive, bound.clone());
                }
            }
            Some(number @ Value::Number(_)) => {
                if let Some(bound) = bound {
                    entry.constraints.insert(inclusive, bound.clone());
                }
                entry.constraints.insert(exclusive, number.clone());
            }
            _ => {
                if let Some(bound) = bound {
                    entry.constraints.insert(inclusive, bound.clone());
                }
            }
        }
    }
}

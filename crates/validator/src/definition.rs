//! Field definitions: what the builder produces and the factory compiles.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::path::FieldPath;
use crate::plugin::HoistedValidator;
use crate::value::TypeTag;

// ============================================================================
// TRANSFORM
// ============================================================================

type MapFn = Arc<dyn Fn(Value) -> Result<Value, String> + Send + Sync>;

#[derive(Clone)]
enum TransformKind {
    Map(MapFn),
    Default(Value),
}

/// A value transform applied by `parse` after all checks pass.
#[derive(Clone)]
pub struct Transform {
    name: Cow<'static, str>,
    kind: TransformKind,
}

impl Transform {
    /// A transform of present values. Absent values are left absent.
    pub fn new<F>(name: impl Into<Cow<'static, str>>, apply: F) -> Self
    where
        F: Fn(Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            kind: TransformKind::Map(Arc::new(apply)),
        }
    }

    /// Fills an absent value with `value`; present values pass through.
    #[must_use]
    pub fn default_value(value: Value) -> Self {
        Self {
            name: Cow::Borrowed("default"),
            kind: TransformKind::Default(value),
        }
    }

    /// A transform of string values; other values pass through.
    pub fn strings(name: &'static str, apply: fn(&str) -> String) -> Self {
        Self::new(name, move |value| {
            Ok(match value {
                Value::String(s) => Value::String(apply(&s)),
                other => other,
            })
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if the transform also runs for absent values.
    #[must_use]
    pub const fn applies_to_missing(&self) -> bool {
        matches!(self.kind, TransformKind::Default(_))
    }

    /// Applies the transform. `None` stands for an absent value.
    pub fn apply(&self, value: Option<Value>) -> Result<Option<Value>, String> {
        match (&self.kind, value) {
            (TransformKind::Map(f), Some(value)) => f(value).map(Some),
            (TransformKind::Map(_), None) => Ok(None),
            (TransformKind::Default(_), Some(value)) => Ok(Some(value)),
            (TransformKind::Default(default), None) => Ok(Some(default.clone())),
        }
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform")
            .field("name", &self.name)
            .field("applies_to_missing", &self.applies_to_missing())
            .finish()
    }
}

// ============================================================================
// METADATA
// ============================================================================

/// Where a definition came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DefinitionSource {
    #[default]
    Builder,
    JsonSchema,
}

/// Descriptive data carried alongside a definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMetadata {
    pub source: DefinitionSource,
    pub description: Option<String>,
    /// Only check the field when its parent value is an object.
    pub requires_parent_object: bool,
}

/// Shape of a wildcard path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayStructure {
    /// Path of the outermost iterated array.
    pub array_path: String,
    /// Number of nested wildcards.
    pub depth: usize,
}

// ============================================================================
// FIELD DEFINITION
// ============================================================================

/// One field: a path, its base type, its ordered rule chain and transforms.
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    path: String,
    base_type: TypeTag,
    array_structure: Option<ArrayStructure>,
    rule_chain: Vec<HoistedValidator>,
    transforms: Vec<Transform>,
    metadata: FieldMetadata,
}

impl FieldDefinition {
    /// Creates a definition with an empty chain.
    pub fn new(path: impl Into<String>, base_type: TypeTag) -> Self {
        let path = path.into();
        let parsed = FieldPath::lenient(&path);
        let array_structure = parsed.wildcard_prefix().map(|array_path| ArrayStructure {
            array_path,
            depth: parsed.wildcard_count(),
        });
        Self {
            path,
            base_type,
            array_structure,
            rule_chain: Vec::new(),
            transforms: Vec::new(),
            metadata: FieldMetadata::default(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub const fn base_type(&self) -> TypeTag {
        self.base_type
    }

    /// True if the path contains a `[*]` wildcard.
    #[must_use]
    pub const fn is_array_field(&self) -> bool {
        self.array_structure.is_some()
    }

    #[must_use]
    pub const fn array_structure(&self) -> Option<&ArrayStructure> {
        self.array_structure.as_ref()
    }

    #[must_use]
    pub fn rule_chain(&self) -> &[HoistedValidator] {
        &self.rule_chain
    }

    #[must_use]
    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    #[must_use]
    pub const fn metadata(&self) -> &FieldMetadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut FieldMetadata {
        &mut self.metadata
    }

    /// Appends a rule.
    ///
    /// Optional and nullable rules go ahead of every unflagged rule, so an
    /// absent or null value is accepted before any other check can reject it.
    pub fn push_rule(&mut self, rule: HoistedValidator) {
        if rule.flags().is_hoisted() {
            let at = self
                .rule_chain
                .iter()
                .position(|r| !r.flags().is_hoisted())
                .unwrap_or(self.rule_chain.len());
            self.rule_chain.insert(at, rule);
        } else {
            self.rule_chain.push(rule);
        }
    }

    /// Replaces the failure message of the last rule in the chain.
    ///
    /// Flagged rules are hoisted to the front, so this is the most recent
    /// unflagged rule whenever the chain has one.
    pub fn override_last_message(&mut self, message: Cow<'static, str>) {
        if let Some(last) = self.rule_chain.pop() {
            self.rule_chain.push(last.with_message(message));
        }
    }

    /// Appends a transform.
    pub fn push_transform(&mut self, transform: Transform) {
        self.transforms.push(transform);
    }

    /// Returns true if any rule has the given code.
    #[must_use]
    pub fn has_code(&self, code: &str) -> bool {
        self.rule_chain.iter().any(|r| r.code() == code)
    }
}

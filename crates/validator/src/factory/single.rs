//! Fast path for a single field with a fixed path.

use std::ops::ControlFlow;

use serde_json::Value;

use crate::accessor::CompiledAccessor;
use crate::definition::FieldDefinition;
use crate::factory::chain::{run_chain, Report};
use crate::path::FieldPath;

/// A field with a compiled getter and a pre-rendered error path.
#[derive(Debug, Clone)]
pub(crate) struct FixedField {
    accessor: CompiledAccessor,
    path: String,
    index: usize,
    requires_parent_object: bool,
}

impl FixedField {
    /// Compiles the field at `index`; `None` if its path has a wildcard,
    /// fails to parse, or the field carries transforms.
    pub(crate) fn compile(definition: &FieldDefinition, index: usize) -> Option<Self> {
        if !definition.transforms().is_empty() {
            return None;
        }
        let path = FieldPath::parse(definition.path()).ok()?;
        let accessor = CompiledAccessor::compile(&path)?;
        Some(Self {
            path: path.canonical(),
            accessor,
            index,
            requires_parent_object: definition.metadata().requires_parent_object,
        })
    }

    pub(crate) fn check(
        &self,
        definitions: &[FieldDefinition],
        root: &Value,
        report: &mut Report<'_>,
    ) -> ControlFlow<()> {
        let value = if self.requires_parent_object {
            let resolved = self.accessor.resolve(root);
            if !resolved.parent_is_object {
                return ControlFlow::Continue(());
            }
            resolved.value
        } else {
            self.accessor.get(root)
        };
        match run_chain(definitions[self.index].rule_chain(), value, root) {
            Some(failure) => report.record(failure, value, || self.path.clone()),
            None => ControlFlow::Continue(()),
        }
    }
}

/// One field, checked without any loop over a field list.
#[derive(Debug, Clone)]
pub(crate) struct SinglePlan {
    field: FixedField,
}

impl SinglePlan {
    pub(crate) fn compile(definitions: &[FieldDefinition]) -> Option<Self> {
        match definitions {
            [only] => FixedField::compile(only, 0).map(|field| Self { field }),
            _ => None,
        }
    }

    pub(crate) fn run(&self, definitions: &[FieldDefinition], root: &Value, report: &mut Report<'_>) {
        let _ = self.field.check(definitions, root, report);
    }
}

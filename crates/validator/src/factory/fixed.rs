//! Inline path for a handful of fixed fields.

use std::ops::ControlFlow;

use serde_json::Value;
use smallvec::SmallVec;

use crate::definition::FieldDefinition;
use crate::factory::chain::Report;
use crate::factory::single::FixedField;

/// Most fields the fixed plan takes; more go to the general plan.
pub(crate) const MAX_FIXED_FIELDS: usize = 4;

#[derive(Debug, Clone)]
pub(crate) struct FixedPlan {
    fields: SmallVec<[FixedField; MAX_FIXED_FIELDS]>,
}

impl FixedPlan {
    /// Compiles 2 to 4 fields with fixed paths and no transforms.
    pub(crate) fn compile(definitions: &[FieldDefinition]) -> Option<Self> {
        if !(2..=MAX_FIXED_FIELDS).contains(&definitions.len()) {
            return None;
        }
        let fields = definitions
            .iter()
            .enumerate()
            .map(|(index, definition)| FixedField::compile(definition, index))
            .collect::<Option<SmallVec<_>>>()?;
        Some(Self { fields })
    }

    pub(crate) fn run(&self, definitions: &[FieldDefinition], root: &Value, report: &mut Report<'_>) {
        for field in &self.fields {
            if let ControlFlow::Break(()) = field.check(definitions, root, report) {
                return;
            }
        }
    }
}

//! General path: one accessor trie and a precomputed execution plan.

use std::ops::ControlFlow;

use serde_json::Value;

use crate::accessor::{AccessorTrie, NodeId};
use crate::definition::FieldDefinition;
use crate::error::BuildError;
use crate::factory::chain::{check_locations, Report};
use crate::path::FieldPath;

#[derive(Debug, Clone, Copy)]
struct PlanStep {
    definition: usize,
    node: NodeId,
}

/// Every field path merged into one trie; each input is walked once and
/// the steps then run in declaration order.
#[derive(Debug, Clone)]
pub(crate) struct GeneralPlan {
    trie: AccessorTrie,
    steps: Vec<PlanStep>,
}

impl GeneralPlan {
    pub(crate) fn compile(definitions: &[FieldDefinition]) -> Result<Self, BuildError> {
        let mut trie = AccessorTrie::new();
        let steps = definitions
            .iter()
            .enumerate()
            .map(|(definition, field)| {
                let path = FieldPath::parse(field.path())?;
                Ok(PlanStep {
                    definition,
                    node: trie.insert(&path),
                })
            })
            .collect::<Result<Vec<_>, BuildError>>()?;
        Ok(Self { trie, steps })
    }

    /// Number of trie nodes, root included.
    #[cfg(test)]
    pub(crate) fn node_count(&self) -> usize {
        self.trie.len()
    }

    pub(crate) fn run(&self, definitions: &[FieldDefinition], root: &Value, report: &mut Report<'_>) {
        let resolved = self.trie.resolve(root);
        for step in &self.steps {
            let flow = check_locations(&definitions[step.definition], &resolved[step.node], root, report);
            if let ControlFlow::Break(()) = flow {
                return;
            }
        }
    }
}

//! Conservative path: definitions walked directly, nothing cached.
//!
//! Paths are parsed leniently on every call, so definitions the other plans
//! reject (malformed paths) still run.

use std::ops::ControlFlow;

use serde_json::Value;

use crate::accessor::resolve_path;
use crate::definition::FieldDefinition;
use crate::factory::chain::{check_locations, Report};
use crate::path::FieldPath;

pub(crate) fn run(definitions: &[FieldDefinition], root: &Value, report: &mut Report<'_>) {
    for definition in definitions {
        let path = FieldPath::lenient(definition.path());
        let locations = resolve_path(root, &path);
        if let ControlFlow::Break(()) = check_locations(definition, &locations, root, report) {
            return;
        }
    }
}

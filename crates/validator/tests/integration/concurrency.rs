//! One compiled validator shared across threads.

use std::sync::Arc;
use std::thread;

use serde_json::json;
use sift_validator::prelude::*;

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn compiled_types_are_shareable() {
    assert_send_sync::<Validator>();
    assert_send_sync::<Registry>();
    assert_send_sync::<FieldDefinition>();
}

#[test]
fn threads_share_one_validator() {
    let schema = json!({
        "type": "object",
        "required": ["id"],
        "properties": {
            "id": {"type": "integer", "minimum": 1},
            "code": {"type": "string", "pattern": "^[A-Z]{2}-[0-9]+$"},
            "tags": {"type": "array", "items": {"anyOf": [{"type": "string"}, {"type": "integer"}]}}
        }
    });
    let registry = Registry::with_builtins();
    let validator = Arc::new(from_json_schema(&schema, &registry, JsonSchemaOptions::default()).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let validator = Arc::clone(&validator);
            thread::spawn(move || {
                let mut result = ValidationResult::default();
                let mut failures = 0;
                for i in 0..2_000 {
                    let input = if (i + worker) % 2 == 0 {
                        json!({"id": i + 1, "code": "AB-12", "tags": ["x", 1]})
                    } else {
                        json!({"id": 0, "code": "ab", "tags": [null]})
                    };
                    validator.validate_into(&input, &mut result);
                    if !result.valid {
                        failures += 1;
                    }
                }
                failures
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 1_000);
    }
}

//! `$ref` resolution and compile-time document checks.
//!
//! Only references into the same document are supported: `#`,
//! `#/definitions/...`, `#/$defs/...` and any other JSON pointer. Pointer
//! tokens are percent-decoded, then `~1` becomes `/` and `~0` becomes `~`.

use serde_json::Value;
use tracing::trace;

use crate::error::BuildError;

/// Resolves a reference against the root document.
pub fn resolve_ref<'a>(reference: &str, root: &'a Value) -> Result<&'a Value, BuildError> {
    trace!(reference, "resolving $ref");
    let Some(pointer) = reference.strip_prefix('#') else {
        return Err(BuildError::ExternalRefUnsupported(reference.to_owned()));
    };
    if pointer.is_empty() {
        return Ok(root);
    }
    let not_found = || BuildError::RefNotFound(reference.to_owned());
    let Some(tokens) = pointer.strip_prefix('/') else {
        // Plain-name fragments (`#foo`) need `$id` anchors, which are not indexed.
        return Err(not_found());
    };

    let mut current = root;
    for raw in tokens.split('/') {
        let token = decode_token(raw).ok_or_else(not_found)?;
        current = match current {
            Value::Object(map) => map.get(&token),
            Value::Array(items) => token.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
        .ok_or_else(not_found)?;
    }
    Ok(current)
}

fn decode_token(raw: &str) -> Option<String> {
    let decoded = percent_decode(raw)?;
    Some(decoded.replace("~1", "/").replace("~0", "~"))
}

fn percent_decode(raw: &str) -> Option<String> {
    if !raw.contains('%') {
        return Some(raw.to_owned());
    }
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = raw.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

/// Calls `visit` on `schema` and every subschema nested in it.
///
/// The walk is structural: references are not followed, so cyclic
/// documents terminate.
pub fn walk_schemas<F>(schema: &Value, visit: &mut F) -> Result<(), BuildError>
where
    F: FnMut(&Value) -> Result<(), BuildError>,
{
    visit(schema)?;
    let Value::Object(map) = schema else {
        return Ok(());
    };

    for keyword in [
        "additionalItems",
        "additionalProperties",
        "contains",
        "propertyNames",
        "not",
        "if",
        "then",
        "else",
    ] {
        if let Some(sub) = map.get(keyword) {
            walk_schemas(sub, visit)?;
        }
    }

    for keyword in ["allOf", "anyOf", "oneOf"] {
        if let Some(Value::Array(subs)) = map.get(keyword) {
            for sub in subs {
                walk_schemas(sub, visit)?;
            }
        }
    }

    match map.get("items") {
        Some(Value::Array(subs)) => {
            for sub in subs {
                walk_schemas(sub, visit)?;
            }
        }
        Some(sub) => walk_schemas(sub, visit)?,
        None => {}
    }

    for keyword in ["properties", "patternProperties", "definitions", "$defs", "dependencies"] {
        if let Some(Value::Object(subs)) = map.get(keyword) {
            for sub in subs.values().filter(|v| v.is_object() || v.is_boolean()) {
                walk_schemas(sub, visit)?;
            }
        }
    }

    Ok(())
}

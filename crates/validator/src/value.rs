//! Base type tags and `serde_json::Value` helpers shared by both front ends.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// TYPE TAG
// ============================================================================

/// Base type a field chain starts from.
///
/// Plugins declare the tags they may be chained onto; the registry enforces
/// that at composition time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    String,
    Number,
    Boolean,
    Array,
    Object,
    /// A string holding an RFC 3339 date-time or a `YYYY-MM-DD` date.
    Date,
    /// No base type check.
    Any,
}

impl TypeTag {
    /// Every tag, in declaration order.
    pub const ALL: [TypeTag; 7] = [
        TypeTag::String,
        TypeTag::Number,
        TypeTag::Boolean,
        TypeTag::Array,
        TypeTag::Object,
        TypeTag::Date,
        TypeTag::Any,
    ];

    /// Lower-case name, as used in messages and the plugin manifest.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TypeTag::String => "string",
            TypeTag::Number => "number",
            TypeTag::Boolean => "boolean",
            TypeTag::Array => "array",
            TypeTag::Object => "object",
            TypeTag::Date => "date",
            TypeTag::Any => "any",
        }
    }

    /// Returns true if `value` has this base type.
    #[must_use]
    pub fn matches(self, value: &Value) -> bool {
        match self {
            TypeTag::String => value.is_string(),
            TypeTag::Number => value.is_number(),
            TypeTag::Boolean => value.is_boolean(),
            TypeTag::Array => value.is_array(),
            TypeTag::Object => value.is_object(),
            TypeTag::Date => value
                .as_str()
                .is_some_and(|s| crate::plugins::format::parse_instant(s).is_some()),
            TypeTag::Any => true,
        }
    }

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// TYPE SET
// ============================================================================

/// A small set of [`TypeTag`]s.
///
/// A set containing [`TypeTag::Any`] admits every tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TypeSet(u8);

impl TypeSet {
    /// The empty set.
    pub const EMPTY: TypeSet = TypeSet(0);

    /// A set admitting every base type.
    pub const ANY: TypeSet = TypeSet(TypeTag::Any.bit());

    /// Builds a set from a list of tags.
    #[must_use]
    pub const fn of(tags: &[TypeTag]) -> Self {
        let mut bits = 0u8;
        let mut i = 0;
        while i < tags.len() {
            bits |= tags[i].bit();
            i += 1;
        }
        TypeSet(bits)
    }

    /// Returns a copy with `tag` added.
    #[must_use]
    pub const fn with(self, tag: TypeTag) -> Self {
        TypeSet(self.0 | tag.bit())
    }

    /// Returns true if `tag` may be used with this set.
    #[must_use]
    pub const fn allows(self, tag: TypeTag) -> bool {
        self.0 & (TypeTag::Any.bit() | tag.bit()) != 0
    }

    /// Iterates over the tags in the set.
    pub fn iter(self) -> impl Iterator<Item = TypeTag> {
        TypeTag::ALL
            .into_iter()
            .filter(move |tag| self.0 & tag.bit() != 0)
    }
}

impl fmt::Debug for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl Serialize for TypeSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

// ============================================================================
// JSON HELPERS
// ============================================================================

/// JSON Schema type name of a value (`integer` is reported as `number`).
#[must_use]
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Name used in "received ..." messages; distinguishes a missing value.
#[must_use]
pub fn describe(value: Option<&Value>) -> &'static str {
    value.map_or("undefined", json_type_name)
}

/// JSON Schema equality: numbers compare by value, so `1 == 1.0`.
#[must_use]
pub fn json_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| json_equal(a, b))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, v)| y.get(k).is_some_and(|other| json_equal(v, other)))
        }
        _ => a == b,
    }
}

/// Returns true if the value is a number with no fractional part.
#[must_use]
pub fn is_integer(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0),
        _ => false,
    }
}

/// Reads a non-negative integer bound. `3.0` counts as `3`.
#[must_use]
pub fn as_count(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|n| n.fract() == 0.0 && *n >= 0.0 && *n <= u64::MAX as f64)
            .map(|n| n as u64)
    })
}

/// Returns true if `value` is an integer multiple of `divisor`.
///
/// Float division is compared with a relative tolerance so `0.3` is a
/// multiple of `0.1`.
#[must_use]
pub fn is_multiple_of(value: f64, divisor: f64) -> bool {
    if divisor <= 0.0 || !divisor.is_finite() {
        return false;
    }
    let quotient = value / divisor;
    if !quotient.is_finite() {
        return false;
    }
    (quotient - quotient.round()).abs() <= 1e-9 * quotient.abs().max(1.0)
}

/// Returns true if all items are pairwise distinct under [`json_equal`].
#[must_use]
pub fn all_unique(items: &[Value]) -> bool {
    items
        .iter()
        .enumerate()
        .all(|(i, a)| items[i + 1..].iter().all(|b| !json_equal(a, b)))
}

/// Formats a bound for messages: `5` rather than `5.0`.
#[must_use]
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

/// Length in Unicode scalar values, as JSON Schema counts string length.
#[must_use]
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

//! Compiled field accessors.
//!
//! Three shapes, matching the execution strategies:
//!
//! - [`CompiledAccessor`]: a fixed path without wildcards; one walk, no
//!   allocation besides the location.
//! - [`AccessorTrie`]: every field path of a validator merged into one
//!   prefix tree. A single pass over the input resolves every node, so
//!   fields sharing a prefix (`user.name`, `user.age`) share the traversal.
//! - [`resolve_path`]: an uncached walk used by the raw strategy.
//!
//! [`set_at`] is the setter used by `parse` to write transformed values back.

use serde_json::Value;
use smallvec::SmallVec;

use crate::path::{FieldPath, Location, Segment, Step};

/// A value found at a concrete location.
#[derive(Debug, Clone)]
pub struct Resolved<'a> {
    /// Where the value lives, wildcards replaced by indices.
    pub location: Location<'a>,
    /// The value, `None` when absent.
    pub value: Option<&'a Value>,
    /// True if the value was looked up as a key of an object.
    ///
    /// Nested JSON Schema properties only apply when their parent is an
    /// object; a missing or mistyped parent skips them.
    pub parent_is_object: bool,
}

impl<'a> Resolved<'a> {
    /// The root value itself.
    #[must_use]
    pub fn root(value: &'a Value) -> Self {
        Self {
            location: Location::new(),
            value: Some(value),
            parent_is_object: true,
        }
    }
}

/// Applies one segment to a resolved value.
fn descend<'a>(parent: &Resolved<'a>, segment: &'a Segment, out: &mut impl Extend<Resolved<'a>>) {
    match segment {
        Segment::Key(key) => {
            let (value, parent_is_object) = match parent.value {
                Some(Value::Object(map)) => (map.get(&**key), true),
                Some(Value::Array(items)) => (key.parse::<usize>().ok().and_then(|i| items.get(i)), false),
                _ => (None, false),
            };
            let mut location = parent.location.clone();
            location.push(Step::Key(&**key));
            out.extend(Some(Resolved {
                location,
                value,
                parent_is_object,
            }));
        }
        Segment::Index(index) => {
            let value = parent
                .value
                .and_then(Value::as_array)
                .and_then(|items| items.get(*index));
            let mut location = parent.location.clone();
            location.push(Step::Index(*index));
            out.extend(Some(Resolved {
                location,
                value,
                parent_is_object: false,
            }));
        }
        Segment::Wildcard => {
            if let Some(Value::Array(items)) = parent.value {
                out.extend(items.iter().enumerate().map(|(index, item)| {
                    let mut location = parent.location.clone();
                    location.push(Step::Index(index));
                    Resolved {
                        location,
                        value: Some(item),
                        parent_is_object: false,
                    }
                }));
            }
        }
    }
}

// ============================================================================
// FIXED PATH ACCESSOR
// ============================================================================

/// Getter for a path without wildcards.
#[derive(Debug, Clone)]
pub struct CompiledAccessor {
    path: FieldPath,
}

impl CompiledAccessor {
    /// Compiles a path; returns `None` if it contains a wildcard.
    #[must_use]
    pub fn compile(path: &FieldPath) -> Option<Self> {
        (!path.has_wildcard()).then(|| Self { path: path.clone() })
    }

    /// The path this accessor reads.
    #[must_use]
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Reads the value, `None` if any step is missing.
    #[must_use]
    pub fn get<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        let mut current = root;
        for segment in self.path.segments() {
            current = match (segment, current) {
                (Segment::Key(key), Value::Object(map)) => map.get(&**key)?,
                (Segment::Key(key), Value::Array(items)) => items.get(key.parse::<usize>().ok()?)?,
                (Segment::Index(index), Value::Array(items)) => items.get(*index)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Reads the value together with its location.
    #[must_use]
    pub fn resolve<'a>(&'a self, root: &'a Value) -> Resolved<'a> {
        let mut current = Resolved::root(root);
        for segment in self.path.segments() {
            let mut next: SmallVec<[Resolved<'a>; 1]> = SmallVec::new();
            descend(&current, segment, &mut next);
            // Key and index segments always yield exactly one value.
            if let Some(resolved) = next.pop() {
                current = resolved;
            }
        }
        current
    }
}

// ============================================================================
// SHARED-PREFIX TRIE
// ============================================================================

/// Index of a node in an [`AccessorTrie`].
pub type NodeId = usize;

#[derive(Debug, Clone)]
struct TrieNode {
    segment: Option<Segment>,
    parent: NodeId,
    children: Vec<NodeId>,
}

/// Every field path of a validator merged into one prefix tree.
#[derive(Debug, Clone)]
pub struct AccessorTrie {
    nodes: Vec<TrieNode>,
}

impl Default for AccessorTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl AccessorTrie {
    /// The root node, addressing the whole input.
    pub const ROOT: NodeId = 0;

    /// Creates a trie holding only the root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode {
                segment: None,
                parent: Self::ROOT,
                children: Vec::new(),
            }],
        }
    }

    /// Inserts a path, reusing existing prefix nodes, and returns its node.
    pub fn insert(&mut self, path: &FieldPath) -> NodeId {
        let mut current = Self::ROOT;
        for segment in path.segments() {
            let existing = self.nodes[current]
                .children
                .iter()
                .copied()
                .find(|&child| self.nodes[child].segment.as_ref() == Some(segment));
            current = match existing {
                Some(child) => child,
                None => {
                    let id = self.nodes.len();
                    self.nodes.push(TrieNode {
                        segment: Some(segment.clone()),
                        parent: current,
                        children: Vec::new(),
                    });
                    self.nodes[current].children.push(id);
                    id
                }
            };
        }
        current
    }

    /// Number of nodes, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if only the root exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Resolves every node against `root` in one pass.
    ///
    /// Nodes are stored parent-before-child, so a forward sweep sees each
    /// parent resolved before its children.
    #[must_use]
    pub fn resolve<'a>(&'a self, root: &'a Value) -> Vec<SmallVec<[Resolved<'a>; 1]>> {
        let mut values: Vec<SmallVec<[Resolved<'a>; 1]>> = Vec::with_capacity(self.nodes.len());
        values.push(smallvec::smallvec![Resolved::root(root)]);

        for node in &self.nodes[1..] {
            let mut resolved = SmallVec::new();
            if let Some(segment) = &node.segment {
                for parent in &values[node.parent] {
                    descend(parent, segment, &mut resolved);
                }
            }
            values.push(resolved);
        }

        values
    }
}

// ============================================================================
// UNCACHED WALK
// ============================================================================

/// Resolves a path directly, expanding wildcards.
#[must_use]
pub fn resolve_path<'a>(root: &'a Value, path: &'a FieldPath) -> Vec<Resolved<'a>> {
    let mut current = vec![Resolved::root(root)];
    for segment in path.segments() {
        let mut next = Vec::with_capacity(current.len());
        for parent in &current {
            descend(parent, segment, &mut next);
        }
        current = next;
    }
    current
}

// ============================================================================
// SETTER
// ============================================================================

/// Writes `new_value` at `location`, creating objects for missing keys.
///
/// Returns false if the location cannot be written (an index out of bounds,
/// or a key step through a non-object value).
pub fn set_at(root: &mut Value, location: &[Step<'_>], new_value: Value) -> bool {
    let mut current = root;
    for step in location {
        current = match step {
            Step::Key(key) => {
                if current.is_null() {
                    *current = Value::Object(serde_json::Map::new());
                }
                match current {
                    Value::Object(map) => map.entry(*key).or_insert(Value::Null),
                    _ => return false,
                }
            }
            Step::Index(index) => match current {
                Value::Array(items) if *index < items.len() => &mut items[*index],
                _ => return false,
            },
        };
    }
    *current = new_value;
    true
}

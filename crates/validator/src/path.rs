//! Field path syntax.
//!
//! ```text
//! user.profile.tags[*].name
//! items[0].price
//! metadata["content.type"]
//! ```
//!
//! `.` separates object keys, `[n]` selects a fixed array index, `[*]` is the
//! "every element" wildcard and `["..."]` / `['...']` quotes a key that
//! contains path syntax. The empty path addresses the root value.

use std::fmt::{self, Write as _};

use smallvec::SmallVec;

use crate::error::BuildError;

/// One parsed path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(Box<str>),
    Index(usize),
    Wildcard,
}

/// One step of a concrete location: wildcards resolved to indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step<'a> {
    Key(&'a str),
    Index(usize),
}

/// A concrete location inside a document.
pub type Location<'a> = SmallVec<[Step<'a>; 4]>;

/// A parsed field path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    raw: String,
    segments: SmallVec<[Segment; 4]>,
}

impl FieldPath {
    /// Parses a path, rejecting malformed syntax.
    pub fn parse(raw: &str) -> Result<Self, BuildError> {
        let segments = parse_segments(raw).map_err(|reason| BuildError::InvalidPath {
            path: raw.to_owned(),
            reason: reason.to_owned(),
        })?;
        Ok(Self {
            raw: raw.to_owned(),
            segments,
        })
    }

    /// Parses a path without failing.
    ///
    /// Anything that does not parse is kept as a literal key, so a malformed
    /// path still addresses a (probably missing) value instead of erroring.
    #[must_use]
    pub fn lenient(raw: &str) -> Self {
        match parse_segments(raw) {
            Ok(segments) => Self {
                raw: raw.to_owned(),
                segments,
            },
            Err(_) => Self {
                raw: raw.to_owned(),
                segments: lenient_segments(raw),
            },
        }
    }

    /// The path as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Parsed segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// True for the empty (root) path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of `[*]` wildcards in the path.
    #[must_use]
    pub fn wildcard_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Wildcard))
            .count()
    }

    /// Returns true if the path has a wildcard.
    #[must_use]
    pub fn has_wildcard(&self) -> bool {
        self.wildcard_count() > 0
    }

    /// Path of the array the first wildcard iterates, e.g. `items` for
    /// `items[*].name`.
    #[must_use]
    pub fn wildcard_prefix(&self) -> Option<String> {
        let position = self
            .segments
            .iter()
            .position(|s| matches!(s, Segment::Wildcard))?;
        Some(render_segments(&self.segments[..position]))
    }

    /// The path re-rendered from its segments, e.g. `a.b[0]` for `a["b"][0]`.
    #[must_use]
    pub fn canonical(&self) -> String {
        render_segments(&self.segments)
    }

    /// The path with one more key appended.
    #[must_use]
    pub fn child_key(&self, key: &str) -> String {
        let mut out = self.raw.clone();
        push_key(&mut out, key);
        out
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Appends `key` to a path string, quoting it when it contains path syntax.
pub fn push_key(out: &mut String, key: &str) {
    let needs_quotes =
        key.is_empty() || key.contains(['.', '[', ']', '"', '\'']) || key == "*";
    if needs_quotes {
        let quote = if key.contains('"') { '\'' } else { '"' };
        let _ = write!(out, "[{quote}{key}{quote}]");
    } else {
        if !out.is_empty() {
            out.push('.');
        }
        out.push_str(key);
    }
}

/// Appends a wildcard to a path string.
pub fn push_wildcard(out: &mut String) {
    out.push_str("[*]");
}

/// Renders a concrete location, e.g. `items[2].name`.
#[must_use]
pub fn render_location(location: &[Step<'_>]) -> String {
    let mut out = String::new();
    for step in location {
        match step {
            Step::Key(key) => push_key(&mut out, key),
            Step::Index(index) => {
                let _ = write!(out, "[{index}]");
            }
        }
    }
    out
}

fn render_segments(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Key(key) => push_key(&mut out, key),
            Segment::Index(index) => {
                let _ = write!(out, "[{index}]");
            }
            Segment::Wildcard => push_wildcard(&mut out),
        }
    }
    out
}

fn parse_segments(raw: &str) -> Result<SmallVec<[Segment; 4]>, &'static str> {
    let mut segments = SmallVec::new();
    let bytes = raw.as_bytes();
    let mut i = 0;
    let mut expect_key = true;

    while i < bytes.len() {
        match bytes[i] {
            b'[' => {
                let close = raw[i..].find(']').ok_or("unclosed `[`")? + i;
                let inner = &raw[i + 1..close];
                let segment = parse_bracket(inner)?;
                // A quoted key may itself contain `]`; re-scan for the quote.
                let (segment, end) = match segment {
                    Some(segment) => (segment, close),
                    None => {
                        let quote = inner.as_bytes()[0] as char;
                        let rest = &raw[i + 2..];
                        let end_quote = rest.find(quote).ok_or("unterminated quoted key")?;
                        let after = i + 2 + end_quote + 1;
                        if raw.as_bytes().get(after) != Some(&b']') {
                            return Err("expected `]` after quoted key");
                        }
                        (
                            Segment::Key(rest[..end_quote].into()),
                            after,
                        )
                    }
                };
                segments.push(segment);
                i = end + 1;
                expect_key = false;
            }
            b'.' => {
                if expect_key {
                    return Err("empty key");
                }
                i += 1;
                expect_key = true;
                if i == bytes.len() {
                    return Err("trailing `.`");
                }
            }
            b']' => return Err("unexpected `]`"),
            _ => {
                if !expect_key {
                    return Err("missing `.` between segments");
                }
                let end = raw[i..].find(['.', '[', ']']).map_or(raw.len(), |p| p + i);
                segments.push(Segment::Key(raw[i..end].into()));
                i = end;
                expect_key = false;
            }
        }
    }

    Ok(segments)
}

/// Parses the inside of `[...]`. `Ok(None)` signals a quoted key the caller
/// must re-scan.
fn parse_bracket(inner: &str) -> Result<Option<Segment>, &'static str> {
    if inner == "*" {
        return Ok(Some(Segment::Wildcard));
    }
    if inner.starts_with('"') || inner.starts_with('\'') {
        return Ok(None);
    }
    inner
        .parse::<usize>()
        .map(|index| Some(Segment::Index(index)))
        .map_err(|_| "bracket must hold an index, `*` or a quoted key")
}

fn lenient_segments(raw: &str) -> SmallVec<[Segment; 4]> {
    raw.split('.')
        .filter(|part| !part.is_empty())
        .flat_map(|part| {
            let mut out: SmallVec<[Segment; 2]> = SmallVec::new();
            match part.find('[') {
                Some(open) if part.ends_with(']') => {
                    if open > 0 {
                        out.push(Segment::Key(part[..open].into()));
                    }
                    let inner = &part[open + 1..part.len() - 1];
                    match parse_bracket(inner) {
                        Ok(Some(segment)) => out.push(segment),
                        _ => out.push(Segment::Key(inner.into())),
                    }
                }
                _ => out.push(Segment::Key(part.into())),
            }
            out
        })
        .collect()
}

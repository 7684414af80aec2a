//! JSON Pointer path engine.
//!
//! Parses RFC 6901 paths into typed segments, reconstructs them, and
//! provides the index arithmetic the transformer needs: finding the last
//! array index in a path, shifting it, and classifying how two paths relate
//! to each other.
//!
//! Escape handling follows RFC 6901: `~1` decodes to `/` before `~0`
//! decodes to `~`, and encoding applies the replacements in the opposite
//! order.

use crate::error::SyncError;

/// One step of a parsed path: either an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Descend into an object by key (escapes already decoded).
    Object(String),
    /// Descend into an array by index.
    Array(usize),
}

/// A parsed JSON Pointer path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPath {
    /// The original path string.
    pub raw: String,
    /// The decoded segments, left to right.
    pub segments: Vec<PathSegment>,
}

/// How two paths relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRelation {
    /// Identical paths.
    Same,
    /// The first path is an ancestor of the second.
    Parent,
    /// The first path is a descendant of the second.
    Child,
    /// Both paths share the same immediate parent.
    Sibling,
    /// No structural relationship.
    Unrelated,
}

/// Parse a JSON Pointer into segments.
///
/// The empty path is rejected, as is any path without a leading slash.
/// `"/"` parses to zero segments. A segment consisting solely of decimal
/// digits becomes an array index; everything else is an object key.
pub fn parse(path: &str) -> Result<ParsedPath, SyncError> {
    if path.is_empty() {
        return Err(SyncError::transform("empty path"));
    }
    if !path.starts_with('/') {
        return Err(SyncError::transform(format!(
            "path must start with '/': {path}"
        )));
    }
    if path == "/" {
        return Ok(ParsedPath {
            raw: path.to_string(),
            segments: Vec::new(),
        });
    }

    let segments = path[1..]
        .split('/')
        .map(|raw_segment| {
            // ~1 before ~0, so that "~01" decodes to "~1" and not "/"
            let decoded = raw_segment.replace("~1", "/").replace("~0", "~");
            match parse_array_index(&decoded) {
                Some(index) => PathSegment::Array(index),
                None => PathSegment::Object(decoded),
            }
        })
        .collect();

    Ok(ParsedPath {
        raw: path.to_string(),
        segments,
    })
}

/// Rebuild a path string from segments. Inverse of [`parse`].
pub fn reconstruct(segments: &[PathSegment]) -> String {
    if segments.is_empty() {
        return "/".to_string();
    }
    let mut path = String::new();
    for segment in segments {
        path.push('/');
        match segment {
            // ~ before /, the reverse of the decode order
            PathSegment::Object(key) => path.push_str(&key.replace('~', "~0").replace('/', "~1")),
            PathSegment::Array(index) => path.push_str(&index.to_string()),
        }
    }
    path
}

/// The right-most array index in `path`, if any.
pub fn extract_last_array_index(path: &str) -> Result<Option<usize>, SyncError> {
    let parsed = parse(path)?;
    Ok(last_array_index(&parsed.segments))
}

/// The right-most array index within a segment list.
pub fn last_array_index(segments: &[PathSegment]) -> Option<usize> {
    segments.iter().rev().find_map(|segment| match segment {
        PathSegment::Array(index) => Some(*index),
        PathSegment::Object(_) => None,
    })
}

/// Shift the right-most array index equal to `target` by `delta`.
///
/// Paths without a matching index are returned unchanged. A shift that
/// would produce a negative index is an error.
pub fn adjust_array_index(path: &str, target: usize, delta: i64) -> Result<String, SyncError> {
    let parsed = parse(path)?;
    let position = parsed
        .segments
        .iter()
        .rposition(|segment| matches!(segment, PathSegment::Array(index) if *index == target));

    let Some(position) = position else {
        return Ok(path.to_string());
    };

    let shifted = target as i64 + delta;
    if shifted < 0 {
        return Err(SyncError::transform(format!(
            "array index underflow adjusting {path} by {delta}"
        )));
    }

    let mut segments = parsed.segments;
    segments[position] = PathSegment::Array(shifted as usize);
    Ok(reconstruct(&segments))
}

/// The parent of a path, or `None` for the root.
///
/// Removing the final segment of a top-level path yields `"/"`.
pub fn parent(path: &str) -> Option<String> {
    if path == "/" {
        return None;
    }
    match path.rfind('/') {
        Some(0) => Some("/".to_string()),
        Some(index) => Some(path[..index].to_string()),
        None => None,
    }
}

/// Classify the relationship between two paths.
///
/// Rules are evaluated in order: equality, prefix containment in either
/// direction, then shared parent. Two top-level paths share the parent `"/"`
/// and are therefore siblings.
pub fn compare(a: &str, b: &str) -> PathRelation {
    if a == b {
        return PathRelation::Same;
    }
    if b.starts_with(&format!("{a}/")) {
        return PathRelation::Parent;
    }
    if a.starts_with(&format!("{b}/")) {
        return PathRelation::Child;
    }
    match (parent(a), parent(b)) {
        (Some(parent_a), Some(parent_b)) if parent_a == parent_b => PathRelation::Sibling,
        _ => PathRelation::Unrelated,
    }
}

/// Whether edits at the two paths can interfere with each other.
pub fn paths_conflict(a: &str, b: &str) -> bool {
    matches!(
        compare(a, b),
        PathRelation::Same | PathRelation::Parent | PathRelation::Child
    )
}

fn parse_array_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

//! RFC 6902 patch normalization, application, and inversion.
//!
//! Patches arrive on the wire as JSON arrays of string-keyed operation
//! objects. This module converts them into the typed [`json_patch::Patch`]
//! representation, applies them with full RFC 6902 semantics, and computes
//! the reverse patch that undoes a committed change. The change log stores
//! the original wire form of the forward patch, so nothing a client sent is
//! lost in normalization.

use json_patch::Patch;
use serde_json::Value;

use crate::error::SyncError;

/// Convert a wire patch (array of `{op, path, value, from}` objects) into
/// the typed representation the applier expects.
pub fn normalize(wire_patch: &Value) -> Result<Patch, SyncError> {
    if !wire_patch.is_array() {
        return Err(SyncError::invalid_patch("patch must be an array of operations"));
    }
    serde_json::from_value(wire_patch.clone()).map_err(SyncError::invalid_patch)
}

/// Apply a patch to a document, returning the new content.
///
/// Operations are evaluated sequentially; any failure returns
/// `invalid_patch` and the caller's content is untouched (the patch runs
/// against a copy).
pub fn apply(content: &Value, patch: &Patch) -> Result<Value, SyncError> {
    let mut patched = content.clone();
    json_patch::patch(&mut patched, patch).map_err(SyncError::invalid_patch)?;
    Ok(patched)
}

/// Compute the patch that, applied to `new_content`, restores
/// `old_content`.
pub fn inverse(new_content: &Value, old_content: &Value) -> Patch {
    json_patch::diff(new_content, old_content)
}

/// Serialize a typed patch back into its wire form.
pub fn to_wire(patch: &Patch) -> Result<Value, SyncError> {
    Ok(serde_json::to_value(patch)?)
}

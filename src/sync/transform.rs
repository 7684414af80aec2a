//! Operational transformation over JSON Patch operations.
//!
//! Two clients editing the same array concurrently produce operations whose
//! indices assume the peer's edit has not happened. Transforming each side
//! against the other rewrites those indices so that applying `local` then
//! `remote'` converges with applying `remote` then `local'`.
//!
//! Operations are kept in their wire form (`serde_json::Value` objects with
//! string keys `op`, `path`, `value`, `from`) so transformed output can go
//! straight back to the client. Only add/remove pairs that target the same
//! array are reconciled; replace, test, move and copy pass through
//! untouched.

use serde_json::Value;

use crate::error::SyncError;
use crate::sync::path;

/// Transform a pair of concurrent operations against each other.
///
/// Returns `(local', remote')`. An operation nullified by the transform is
/// returned as `None`; callers drop it. A pair returned unchanged with the
/// same path is the caller's signal of a direct conflict.
pub fn transform_pair(
    local: &Value,
    remote: &Value,
) -> Result<(Option<Value>, Option<Value>), SyncError> {
    match (op_name(local), op_name(remote)) {
        ("add", "add") => transform_add_add(local, remote),
        ("remove", "remove") => transform_remove_remove(local, remote),
        ("add", "remove") => transform_add_remove(local, remote),
        ("remove", "add") => {
            // Reuse the add/remove policy with the arguments swapped, then
            // swap the result back into the caller's (local, remote) order.
            let (add, remove) = transform_add_remove(remote, local)?;
            Ok((remove, add))
        }
        _ => Ok(pass_through(local, remote)),
    }
}

/// Transform two concurrent operation lists against each other.
///
/// Each local operation is transformed against every remote operation in
/// order, threading the running result through, and vice versa. Any error
/// short-circuits the whole batch.
pub fn transform_lists(
    local_ops: &[Value],
    remote_ops: &[Value],
) -> Result<(Vec<Value>, Vec<Value>), SyncError> {
    let mut transformed_local = Vec::with_capacity(local_ops.len());
    for local in local_ops {
        let mut running = Some(local.clone());
        for remote in remote_ops {
            let Some(current) = running else { break };
            let (next, _) = transform_pair(&current, remote)?;
            running = next;
        }
        if let Some(op) = running {
            transformed_local.push(op);
        }
    }

    let mut transformed_remote = Vec::with_capacity(remote_ops.len());
    for remote in remote_ops {
        let mut running = Some(remote.clone());
        for local in local_ops {
            let Some(current) = running else { break };
            let (_, next) = transform_pair(local, &current)?;
            running = next;
        }
        if let Some(op) = running {
            transformed_remote.push(op);
        }
    }

    Ok((transformed_local, transformed_remote))
}

/// Concurrent inserts: the lower index wins its position, the other side
/// shifts up by one. Ties go to the local side.
fn transform_add_add(
    local: &Value,
    remote: &Value,
) -> Result<(Option<Value>, Option<Value>), SyncError> {
    let Some((local_index, remote_index)) = shared_array_indices(local, remote)? else {
        return Ok(pass_through(local, remote));
    };

    if local_index <= remote_index {
        let shifted = shift_index(remote, remote_index, 1)?;
        Ok((Some(local.clone()), Some(shifted)))
    } else {
        let shifted = shift_index(local, local_index, 1)?;
        Ok((Some(shifted), Some(remote.clone())))
    }
}

/// Concurrent removals: the higher index shifts down past the peer's
/// removal. Equal indices are returned unchanged, which the caller treats
/// as a conflict.
fn transform_remove_remove(
    local: &Value,
    remote: &Value,
) -> Result<(Option<Value>, Option<Value>), SyncError> {
    let Some((local_index, remote_index)) = shared_array_indices(local, remote)? else {
        return Ok(pass_through(local, remote));
    };

    if local_index < remote_index {
        let shifted = shift_index(remote, remote_index, -1)?;
        Ok((Some(local.clone()), Some(shifted)))
    } else if local_index > remote_index {
        let shifted = shift_index(local, local_index, -1)?;
        Ok((Some(shifted), Some(remote.clone())))
    } else {
        Ok(pass_through(local, remote))
    }
}

/// An insert concurrent with a removal: the insert at or below the removal
/// shifts the removal up; an insert above it shifts down past the removal.
fn transform_add_remove(
    add: &Value,
    remove: &Value,
) -> Result<(Option<Value>, Option<Value>), SyncError> {
    let Some((add_index, remove_index)) = shared_array_indices(add, remove)? else {
        return Ok(pass_through(add, remove));
    };

    if add_index <= remove_index {
        let shifted = shift_index(remove, remove_index, 1)?;
        Ok((Some(add.clone()), Some(shifted)))
    } else {
        let shifted = shift_index(add, add_index, -1)?;
        Ok((Some(shifted), Some(remove.clone())))
    }
}

/// Extract the trailing array indices of both operations when they target
/// the same array: both paths carry an array index and share a parent.
fn shared_array_indices(
    left: &Value,
    right: &Value,
) -> Result<Option<(usize, usize)>, SyncError> {
    let (Some(left_path), Some(right_path)) = (left["path"].as_str(), right["path"].as_str())
    else {
        return Ok(None);
    };

    let left_index = path::extract_last_array_index(left_path)?;
    let right_index = path::extract_last_array_index(right_path)?;

    match (left_index, right_index) {
        (Some(left_index), Some(right_index)) => {
            let left_parent = path::parent(left_path);
            if left_parent.is_some() && left_parent == path::parent(right_path) {
                Ok(Some((left_index, right_index)))
            } else {
                Ok(None)
            }
        }
        _ => Ok(None),
    }
}

fn shift_index(op: &Value, target: usize, delta: i64) -> Result<Value, SyncError> {
    let op_path = op["path"]
        .as_str()
        .ok_or_else(|| SyncError::transform("operation has no path"))?;
    let adjusted = path::adjust_array_index(op_path, target, delta)?;
    let mut shifted = op.clone();
    shifted["path"] = Value::String(adjusted);
    Ok(shifted)
}

fn pass_through(local: &Value, remote: &Value) -> (Option<Value>, Option<Value>) {
    (Some(local.clone()), Some(remote.clone()))
}

fn op_name(op: &Value) -> &str {
    op["op"].as_str().unwrap_or("")
}

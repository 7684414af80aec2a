//! Convergence properties of the transformer.
//!
//! For concurrent edits on the same array, applying `(local, remote')`
//! must produce the same document as applying `(remote, local')`.

use proptest::prelude::*;
use relaypad::sync::transform::transform_pair;
use relaypad::sync::patch;
use serde_json::{json, Value};

fn apply_ops(document: &Value, ops: &[Value]) -> Value {
    let wire = Value::Array(ops.to_vec());
    let normalized = patch::normalize(&wire).expect("generated op should normalize");
    patch::apply(document, &normalized).expect("generated op should apply")
}

/// Apply both orders of a transformed pair and return the two results.
fn both_orders(document: &Value, local: &Value, remote: &Value) -> (Value, Value) {
    let (local_out, remote_out) = transform_pair(local, remote).unwrap();
    let local_out = local_out.expect("no policy nullifies ops");
    let remote_out = remote_out.expect("no policy nullifies ops");

    let local_first = apply_ops(&apply_ops(document, &[local.clone()]), &[remote_out]);
    let remote_first = apply_ops(&apply_ops(document, &[remote.clone()]), &[local_out]);
    (local_first, remote_first)
}

proptest! {
    #[test]
    fn test_concurrent_adds_converge(
        base in prop::collection::vec(0i64..100, 0..8),
        local_seed in 0usize..16,
        remote_seed in 0usize..16,
    ) {
        let document = json!({"items": base});
        let len = document["items"].as_array().unwrap().len();
        let local_index = local_seed % (len + 1);
        let remote_index = remote_seed % (len + 1);

        let local = json!({"op": "add", "path": format!("/items/{local_index}"), "value": "L"});
        let remote = json!({"op": "add", "path": format!("/items/{remote_index}"), "value": "R"});

        let (local_first, remote_first) = both_orders(&document, &local, &remote);
        prop_assert_eq!(local_first, remote_first);
    }

    #[test]
    fn test_concurrent_removes_converge(
        base in prop::collection::vec(0i64..100, 2..8),
        local_seed in 0usize..16,
        remote_seed in 0usize..16,
    ) {
        let len = base.len();
        let local_index = local_seed % len;
        let remote_index = remote_seed % len;
        // Equal indices are a reported conflict, not a convergence case.
        prop_assume!(local_index != remote_index);

        let document = json!({"items": base});
        let local = json!({"op": "remove", "path": format!("/items/{local_index}")});
        let remote = json!({"op": "remove", "path": format!("/items/{remote_index}")});

        let (local_first, remote_first) = both_orders(&document, &local, &remote);
        prop_assert_eq!(local_first, remote_first);
    }

    #[test]
    fn test_concurrent_add_and_remove_converge(
        base in prop::collection::vec(0i64..100, 1..8),
        add_seed in 0usize..16,
        remove_seed in 0usize..16,
    ) {
        let len = base.len();
        let add_index = add_seed % (len + 1);
        let remove_index = remove_seed % len;

        let document = json!({"items": base});
        let local = json!({"op": "add", "path": format!("/items/{add_index}"), "value": "L"});
        let remote = json!({"op": "remove", "path": format!("/items/{remove_index}")});

        let (local_first, remote_first) = both_orders(&document, &local, &remote);
        prop_assert_eq!(local_first, remote_first);
    }
}

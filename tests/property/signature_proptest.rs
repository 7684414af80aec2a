//! Property-based tests for signatures and content hashing.

use proptest::prelude::*;
use relaypad::auth::signature::{create_signature, verify_signature};
use relaypad::store::documents::{compute_content_hash, verify_content_hash};
use std::collections::BTreeMap;

proptest! {
    #[test]
    fn test_signature_is_deterministic(
        secret in "[a-z0-9]{10,40}",
        email in "[a-z]{1,8}@[a-z]{1,8}\\.com",
        api_key in "[a-z0-9]{10,40}",
        timestamp in 0i64..2_000_000_000,
        body in "[ -~]{0,20}",
    ) {
        let first = create_signature(&secret, timestamp, &email, &api_key, &body);
        let second = create_signature(&secret, timestamp, &email, &api_key, &body);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.len(), 64);
        prop_assert!(first.bytes().all(|b| b.is_ascii_hexdigit()));
        prop_assert_eq!(&first, &first.to_lowercase());
    }

    #[test]
    fn test_any_input_change_alters_signature(
        secret in "[a-z0-9]{10,40}",
        email in "[a-z]{1,8}@[a-z]{1,8}\\.com",
        api_key in "[a-z0-9]{10,40}",
        timestamp in 0i64..2_000_000_000,
    ) {
        let base = create_signature(&secret, timestamp, &email, &api_key, "");
        prop_assert_ne!(
            &base,
            &create_signature(&secret, timestamp + 1, &email, &api_key, "")
        );
        prop_assert_ne!(
            &base,
            &create_signature(&secret, timestamp, &format!("x{email}"), &api_key, "")
        );
        prop_assert_ne!(
            &base,
            &create_signature(&secret, timestamp, &email, &api_key, "tampered")
        );
    }

    #[test]
    fn test_signatures_verify_round_trip(
        secret in "[a-z0-9]{10,40}",
        email in "[a-z]{1,8}@[a-z]{1,8}\\.com",
        api_key in "[a-z0-9]{10,40}",
        timestamp in 0i64..2_000_000_000,
    ) {
        let signature = create_signature(&secret, timestamp, &email, &api_key, "");
        prop_assert!(verify_signature(&secret, &signature, timestamp, &email, &api_key, ""));
        prop_assert!(!verify_signature(&secret, &signature, timestamp + 1, &email, &api_key, ""));
    }

    #[test]
    fn test_hash_verifies_for_every_object(
        entries in prop::collection::btree_map("[a-z0-9_]{0,8}", any::<i64>(), 0..6)
    ) {
        let content = serde_json::to_value(&entries).unwrap();
        let hash = compute_content_hash(&content).unwrap();
        prop_assert_eq!(hash.len(), 64);
        prop_assert!(verify_content_hash(&content, &hash));
    }

    #[test]
    fn test_hash_distinguishes_objects(
        key in "[a-z]{1,8}",
        first in any::<i64>(),
        second in any::<i64>(),
    ) {
        prop_assume!(first != second);
        let mut left = BTreeMap::new();
        left.insert(key.clone(), first);
        let mut right = BTreeMap::new();
        right.insert(key, second);
        let left = serde_json::to_value(&left).unwrap();
        let right = serde_json::to_value(&right).unwrap();
        prop_assert_ne!(compute_content_hash(&left), compute_content_hash(&right));
    }
}

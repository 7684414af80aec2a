//! Property-based tests for the path engine.

use proptest::prelude::*;
use relaypad::sync::path::{self, PathSegment};

/// Object keys mix escapable characters with ordinary ones. Digit-only
/// keys are excluded: they canonicalize to array indices, which is the
/// intended classification, not a round-trip failure worth generating.
fn segment_strategy() -> impl Strategy<Value = PathSegment> {
    prop_oneof![
        "[a-z0-9~/_.]{0,8}"
            .prop_filter("digit-only keys classify as array indices", |key| {
                key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit())
            })
            .prop_map(PathSegment::Object),
        (0usize..50).prop_map(PathSegment::Array),
    ]
}

/// Like [`segment_strategy`] but without empty keys, whose reconstruction
/// is ambiguous with the root at length one.
fn nonempty_segment_strategy() -> impl Strategy<Value = PathSegment> {
    prop_oneof![
        "[a-z0-9~/_.]{1,8}"
            .prop_filter("digit-only keys classify as array indices", |key| {
                !key.bytes().all(|b| b.is_ascii_digit())
            })
            .prop_map(PathSegment::Object),
        (0usize..50).prop_map(PathSegment::Array),
    ]
}

proptest! {
    #[test]
    fn test_reconstruct_parse_round_trip(
        segments in prop::collection::vec(segment_strategy(), 0..6)
    ) {
        let reconstructed = path::reconstruct(&segments);
        let parsed = path::parse(&reconstructed).unwrap();
        prop_assert_eq!(path::reconstruct(&parsed.segments), reconstructed);
    }

    #[test]
    fn test_array_segments_survive_round_trip(
        indices in prop::collection::vec(0usize..1000, 1..5)
    ) {
        let segments: Vec<PathSegment> =
            indices.iter().copied().map(PathSegment::Array).collect();
        let reconstructed = path::reconstruct(&segments);
        let parsed = path::parse(&reconstructed).unwrap();
        prop_assert_eq!(parsed.segments, segments);
    }

    #[test]
    fn test_adjust_then_reverse_is_identity(
        index in 0usize..100,
        delta in 0i64..50,
        prefix in "[a-z]{1,6}"
    ) {
        let original = format!("/{prefix}/{index}");
        let shifted = path::adjust_array_index(&original, index, delta).unwrap();
        let restored =
            path::adjust_array_index(&shifted, index + delta as usize, -delta).unwrap();
        prop_assert_eq!(restored, original);
    }

    #[test]
    fn test_parent_strips_exactly_one_segment(
        segments in prop::collection::vec(nonempty_segment_strategy(), 1..6)
    ) {
        let full = path::reconstruct(&segments);
        let parent = path::parent(&full).unwrap();
        prop_assert_eq!(path::parent(&parent).is_some(), segments.len() > 1);
        if segments.len() > 1 {
            prop_assert_eq!(parent, path::reconstruct(&segments[..segments.len() - 1]));
        } else {
            prop_assert_eq!(parent, "/");
        }
    }
}

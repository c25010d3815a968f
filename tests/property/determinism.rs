//! Property-based tests for determinism guarantees

use ctos::manifest::{ContentNode, Shortcuts, LINK_FIELD, STARTUP_FIELD};
use ctos::metadata::{parse_lines, MetaValue, Metadata};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn node(index: usize, field: &str, key: &str) -> ContentNode {
    let mut metadata = Metadata::new();
    metadata.insert(field, MetaValue::Text(key.to_string()));
    ContentNode::document(format!("Doc{}", index), format!("/Doc{}.html", index))
        .with_metadata(metadata)
}

/// Shortcut lists come out ordered by key whatever order entries register in
#[test]
fn test_shortcut_order_independent_of_registration_order() {
    let mut runner = proptest::test_runner::TestRunner::default();

    let keys = prop::collection::btree_set("[a-z0-9]{1,6}", 1..12);
    runner
        .run(
            &keys.prop_flat_map(|keys| {
                let keys: Vec<String> = keys.into_iter().collect();
                (Just(keys.clone()), Just(keys).prop_shuffle())
            }),
            |(sorted, shuffled)| {
                let mut shortcuts = Shortcuts::new();
                for key in &shuffled {
                    let index = sorted.iter().position(|k| k == key).unwrap();
                    shortcuts.register(&node(index, LINK_FIELD, key));
                    shortcuts.register(&node(index, STARTUP_FIELD, key));
                }

                let expected: Vec<String> =
                    (0..sorted.len()).map(|i| format!("/Doc{}", i)).collect();
                prop_assert_eq!(shortcuts.link_paths(), expected.clone());
                prop_assert_eq!(shortcuts.startup_paths(), expected);
                Ok(())
            },
        )
        .unwrap();
}

/// Merging per-directory results matches registering everything in one place
#[test]
fn test_merge_matches_flat_registration() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(prop::collection::vec("[a-c]{1,2}", 0..10), 0usize..10),
            |(keys, split)| {
                let split = split.min(keys.len());
                let nodes: Vec<ContentNode> = keys
                    .iter()
                    .enumerate()
                    .map(|(i, key)| node(i, LINK_FIELD, key))
                    .collect();

                let mut flat = Shortcuts::new();
                nodes.iter().for_each(|n| flat.register(n));

                let mut first = Shortcuts::new();
                let mut second = Shortcuts::new();
                nodes[..split].iter().for_each(|n| first.register(n));
                nodes[split..].iter().for_each(|n| second.register(n));
                first.merge(second);

                prop_assert_eq!(first.link_paths(), flat.link_paths());

                // Last writer wins per key.
                let mut last: BTreeMap<&str, usize> = BTreeMap::new();
                for (i, key) in keys.iter().enumerate() {
                    last.insert(key, i);
                }
                let expected: Vec<String> = last.values().map(|i| format!("/Doc{}", i)).collect();
                prop_assert_eq!(flat.link_paths(), expected);
                Ok(())
            },
        )
        .unwrap();
}

proptest! {
    /// Arbitrary input never panics and only ever yields a leading prefix
    #[test]
    fn test_parse_lines_total(lines in prop::collection::vec(".{0,40}", 0..8), wrapped in any::<bool>()) {
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let metadata = parse_lines(refs.iter().copied(), wrapped);
        prop_assert!(metadata.len() <= lines.len());
    }

    /// A first line that is not metadata yields nothing, whatever follows
    #[test]
    fn test_non_metadata_first_line_yields_empty(
        first in "[^:]{0,20}",
        rest in prop::collection::vec("[a-z]{1,8}: [a-z]{1,8}", 0..5),
    ) {
        let mut lines = vec![first.as_str()];
        lines.extend(rest.iter().map(String::as_str));
        prop_assert!(parse_lines(lines.iter().copied(), false).is_empty());
    }

    /// Comma-separated values always become trimmed lists
    #[test]
    fn test_comma_values_become_lists(parts in prop::collection::vec("[a-z]{1,6}", 2..6)) {
        let line = format!("tags: {}", parts.join(" , "));
        let metadata = parse_lines([line.as_str()], false);
        prop_assert_eq!(metadata.get("tags"), Some(&MetaValue::List(parts)));
    }
}

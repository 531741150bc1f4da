//! Property-based tests for the dedup pipeline.
//!
//! Random documents draw their strings and keys from small pools so that
//! repeated subtrees are common.

use af_core::{DedupOptions, Document, Node, NodeId};
use af_dedup::{deduplicate, deduplicate_in_place};
use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};

const STRINGS: [&str; 5] = [
    "alpha-shared-value",
    "bravo-shared-value-longer",
    "charlie-value-that-is-quite-long",
    "d",
    "echo",
];

const KEYS: [&str; 4] = ["name", "spec", "image", "x"];

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        4 => prop::sample::select(STRINGS.to_vec()).prop_map(|s| Value::String(s.to_string())),
        1 => (0u32..4).prop_map(|n| json!(n)),
        1 => any::<bool>().prop_map(Value::Bool),
        1 => Just(Value::Null),
    ]
}

fn document() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(4, 64, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map(
                prop::sample::select(KEYS.to_vec()).prop_map(String::from),
                inner,
                0..4,
            )
            .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

fn options() -> impl Strategy<Value = DedupOptions> {
    (1usize..4, 0usize..40, 1usize..7, 1usize..5).prop_map(|(occ, size, depth, width)| {
        DedupOptions::default()
            .with_min_occurrences(occ)
            .with_min_size(size)
            .with_max_depth(depth)
            .with_max_width(width)
    })
}

fn integrity_violation(doc: &Document) -> Option<String> {
    let reachable: HashSet<NodeId> = doc.reachable().into_iter().collect();
    let refs = doc.references();
    for &(id, target) in &refs {
        if doc.anchor(target).is_none() || !reachable.contains(&target) {
            return Some(format!("reference {id} dangles at {target}"));
        }
        if matches!(doc.node(target), Node::Reference(_)) {
            return Some(format!("reference {id} points at another reference"));
        }
    }
    for (id, name) in doc.anchors() {
        if !refs.iter().any(|&(_, t)| t == id) {
            return Some(format!("anchor {name} on {id} is unused"));
        }
    }
    None
}

fn anchored_values(doc: &Document) -> HashSet<String> {
    doc.anchors()
        .into_iter()
        .filter_map(|(id, _)| match doc.node(id) {
            Node::Scalar { value, .. } => Some(value.clone()),
            _ => None,
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Property: resolving every reference gives back the input.
    #[test]
    fn prop_logical_equivalence(value in document(), opts in options()) {
        let original = Document::from_json(&value);
        let doc = deduplicate(original.clone(), &opts);
        prop_assert!(doc.logically_eq(&original));
        prop_assert_eq!(doc.to_json(), value);
    }

    /// Property: no dangling references and no unused anchors.
    #[test]
    fn prop_anchor_integrity(value in document(), opts in options()) {
        let doc = deduplicate(Document::from_json(&value), &opts);
        prop_assert_eq!(integrity_violation(&doc), None);
    }

    /// Property: anchor names are unique within a document.
    #[test]
    fn prop_anchor_names_unique(value in document(), opts in options()) {
        let doc = deduplicate(Document::from_json(&value), &opts);
        let anchors = doc.anchors();
        let names: HashSet<&str> = anchors.iter().map(|&(_, n)| n).collect();
        prop_assert_eq!(names.len(), anchors.len());
    }

    /// Property: a second run finds nothing left to share.
    #[test]
    fn prop_second_run_adds_nothing(value in document(), opts in options()) {
        let mut doc = Document::from_json(&value);
        deduplicate_in_place(&mut doc, &opts);
        let before: Vec<(NodeId, String)> =
            doc.anchors().into_iter().map(|(id, n)| (id, n.to_string())).collect();

        let second = deduplicate_in_place(&mut doc, &opts);
        prop_assert_eq!(second.references_created, 0);
        prop_assert_eq!(second.anchors_kept(), 0);
        let after: Vec<(NodeId, String)> =
            doc.anchors().into_iter().map(|(id, n)| (id, n.to_string())).collect();
        prop_assert_eq!(before, after);
        prop_assert_eq!(doc.to_json(), value);
    }

    /// Property: in a flat list, exactly the values repeated at least
    /// `min_occurrences` times and at least `min_size` long are anchored.
    #[test]
    fn prop_threshold_law_flat(
        items in prop::collection::vec(prop::sample::select(STRINGS.to_vec()), 0..12),
        occ in 2usize..4,
        size in 1usize..30,
    ) {
        let value = json!(items);
        let opts = DedupOptions::default().with_min_occurrences(occ).with_min_size(size);
        let doc = deduplicate(Document::from_json(&value), &opts);

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for &s in &items {
            *counts.entry(s).or_default() += 1;
        }
        let expected: HashSet<String> = counts
            .into_iter()
            .filter(|&(s, n)| n >= occ && s.len() >= size)
            .map(|(s, _)| s.to_string())
            .collect();
        prop_assert_eq!(anchored_values(&doc), expected);
    }

    /// Property: narrowing the width bound never adds anchors to a flat list.
    #[test]
    fn prop_width_monotonic_flat(
        items in prop::collection::vec(prop::sample::select(STRINGS.to_vec()), 0..12),
        narrow in 1usize..12,
        extra in 0usize..6,
    ) {
        let value = json!(items);
        let base = DedupOptions::default().with_min_size(1);
        let anchors = |w: usize| {
            deduplicate(Document::from_json(&value), &base.clone().with_max_width(w))
                .anchors()
                .len()
        };
        prop_assert!(anchors(narrow) <= anchors(narrow + extra));
    }

    /// Property: narrowing the depth bound never adds anchors to a chain of
    /// levels that each hold one duplicate pair.
    #[test]
    fn prop_depth_monotonic_layered(levels in 1usize..8, shallow in 1usize..9, extra in 0usize..4) {
        let mut value = json!({});
        for level in (0..levels).rev() {
            let s = format!("level-{level}-duplicate-value");
            value = json!({"a": s, "b": s, "n": value});
        }
        let anchors = |d: usize| {
            deduplicate(Document::from_json(&value), &DedupOptions::default().with_max_depth(d))
                .anchors()
                .len()
        };
        prop_assert!(anchors(shallow) <= anchors(shallow + extra));
    }
}

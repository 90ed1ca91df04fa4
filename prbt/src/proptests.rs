//! Property-based tests covering the invariants P1, P2, P3, P4, P5, P6 and
//! P7: RB validity, BST ordering, version isolation, `insert_or_assign`
//! semantics, share-count soundness, reclamation soundness, and iterator
//! monotonicity. Lives inside the crate rather than under `tests/` because
//! P1 and P5 need to look at node internals directly (tree shape, raw
//! `share_count`) rather than inferring them from black-box behavior — the
//! same reason `tree::assert_valid_red_black_tree` itself is `pub(crate)`
//! and test-only.

#![cfg(test)]

use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;

use proptest::prelude::*;

use crate::node::Link;
use crate::{PersistentMap, VersionId};

#[derive(Debug, Clone)]
enum Op {
    Insert(i32, i32),
    InsertOrAssign(i32, i32),
    Delete(i32),
    RemoveOldest,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0i32..40, any::<i32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        (0i32..40, any::<i32>()).prop_map(|(k, v)| Op::InsertOrAssign(k, v)),
        (0i32..40).prop_map(Op::Delete),
        Just(Op::RemoveOldest),
    ]
}

/// Walks every node reachable from `root`, visiting each unique node (by
/// identity) exactly once, tallying its `share_count` and the number of
/// non-nil children it owns (its contribution to the global edge count).
fn accumulate(root: &Link<i32, i32>, seen: &mut HashSet<usize>, share_sum: &mut u64, edge_count: &mut u64) {
    if let Some(node) = root {
        let ptr = Rc::as_ptr(node) as usize;
        if seen.insert(ptr) {
            *share_sum += node.share_count() as u64;
            *edge_count += node.left.is_some() as u64 + node.right.is_some() as u64;
            accumulate(&node.left, seen, share_sum, edge_count);
            accumulate(&node.right, seen, share_sum, edge_count);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn invariants_hold_across_random_operation_sequences(ops in prop::collection::vec(op_strategy(), 1..80)) {
        let mut map: PersistentMap<i32, i32> = PersistentMap::new();
        let mut versions: Vec<VersionId> = vec![map.current()];
        let mut oracles: Vec<BTreeMap<i32, i32>> = vec![BTreeMap::new()];

        for op in ops {
            let current = *versions.last().unwrap();

            match op {
                Op::Insert(k, v) => {
                    let mut oracle = oracles.last().unwrap().clone();
                    let (new_v, inserted) = map.insert(current, k, v).unwrap();
                    let existed = oracle.contains_key(&k);
                    prop_assert_eq!(inserted, !existed, "insert's `inserted` flag disagrees with prior presence");
                    oracle.entry(k).or_insert(v);
                    versions.push(new_v);
                    oracles.push(oracle);
                }
                Op::InsertOrAssign(k, v) => {
                    let mut oracle = oracles.last().unwrap().clone();
                    let (new_v, inserted) = map.insert_or_assign(current, k, v).unwrap();
                    let existed = oracle.contains_key(&k);
                    prop_assert_eq!(inserted, !existed, "insert_or_assign's `inserted` flag disagrees with prior presence");
                    oracle.insert(k, v);
                    versions.push(new_v);
                    oracles.push(oracle);
                }
                Op::Delete(k) => {
                    let mut oracle = oracles.last().unwrap().clone();
                    let (new_v, existed) = map.delete(current, &k).unwrap();
                    prop_assert_eq!(existed, oracle.contains_key(&k), "delete's `existed` flag disagrees with prior presence");
                    oracle.remove(&k);
                    versions.push(new_v);
                    oracles.push(oracle);
                }
                Op::RemoveOldest => {
                    if let Some(oldest) = map.versions().first().copied() {
                        if oldest != current {
                            map.remove_version(oldest).unwrap();
                        }
                    }
                }
            }

            // P1 + P2: every still-live version's tree is a valid red-black
            // tree, which (per `assert_valid_red_black_tree`) also checks
            // BST ordering.
            for &v in &versions {
                if map.is_live(v) {
                    let root = map.root(v).unwrap();
                    crate::tree::assert_valid_red_black_tree(root);
                }
            }

            // P3, P4, P6: every still-live version's content matches the
            // oracle recorded for it at publish time — unaffected by later
            // mutations against other versions (P3/P4) or by removing other
            // versions (P6).
            for (v, oracle) in versions.iter().zip(oracles.iter()) {
                if map.is_live(*v) {
                    let actual: BTreeMap<i32, i32> = map.iter(*v).unwrap().map(|(k, v)| (*k, *v)).collect();
                    prop_assert_eq!(&actual, oracle);
                }
            }

            // P5: share-count soundness across the whole live node graph.
            let mut seen = HashSet::new();
            let mut share_sum = 0u64;
            let mut edge_count = 0u64;
            for v in map.versions() {
                let root = map.root(v).unwrap();
                accumulate(root, &mut seen, &mut share_sum, &mut edge_count);
            }
            prop_assert_eq!(share_sum, edge_count, "share_count sum must equal the live child-edge count");

            // P7: forward iteration ascending, backward iteration descending,
            // and they agree once one is reversed.
            let forward: Vec<i32> = map.iter(current).unwrap().map(|(k, _)| *k).collect();
            let backward: Vec<i32> = map.iter(current).unwrap().rev().map(|(k, _)| *k).collect();
            let mut sorted_forward = forward.clone();
            sorted_forward.sort_unstable();
            prop_assert_eq!(&forward, &sorted_forward, "forward iteration must be ascending");
            let mut reversed_backward = backward.clone();
            reversed_backward.reverse();
            prop_assert_eq!(&forward, &reversed_backward, "reversing backward iteration must reproduce forward order");
        }
    }
}

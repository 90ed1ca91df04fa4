//! Read-only traversal over a published (immutable) tree shape.
//!
//! Every function here takes a `&Link<K, V>` — a snapshot root — and never
//! mutates it; this is the side of the API any number of readers can share
//! concurrently without coordination (see the crate's concurrency notes).

use crate::node::{Color, Link, Node};
use std::cmp::Ordering;

pub(crate) fn search<'a, K: Ord, V>(mut link: &'a Link<K, V>, key: &K) -> Option<&'a Node<K, V>> {
    while let Some(node) = link {
        match key.cmp(&node.key) {
            Ordering::Less => link = &node.left,
            Ordering::Greater => link = &node.right,
            Ordering::Equal => return Some(node),
        }
    }
    None
}

pub(crate) fn minimum<K, V>(mut link: &Link<K, V>) -> Option<&Node<K, V>> {
    let mut last = None;
    while let Some(node) = link {
        last = Some(node.as_ref());
        link = &node.left;
    }
    last
}

pub(crate) fn maximum<K, V>(mut link: &Link<K, V>) -> Option<&Node<K, V>> {
    let mut last = None;
    while let Some(node) = link {
        last = Some(node.as_ref());
        link = &node.right;
    }
    last
}

/// The in-order successor of `key` within `root`, if one exists.
///
/// The original this crate is modeled on never finished wiring parent
/// pointers through the persistent representation, so its successor and
/// predecessor walks were left as dead, parent-pointer-chasing stubs. A
/// persistent node legitimately has no parent pointer (it may be shared by
/// many versions with different ancestors), so this instead re-derives the
/// in-order neighbor the standard way: if `key`'s node has a right subtree,
/// descend to that subtree's minimum; otherwise it's the last key smaller
/// than `key` found on the root-to-`key` descent where we turned left.
pub(crate) fn successor<'a, K: Ord, V>(root: &'a Link<K, V>, key: &K) -> Option<&'a Node<K, V>> {
    let mut link = root;
    let mut candidate: Option<&'a Node<K, V>> = None;
    while let Some(node) = link {
        match key.cmp(&node.key) {
            Ordering::Less => {
                candidate = Some(node.as_ref());
                link = &node.left;
            }
            Ordering::Greater => link = &node.right,
            Ordering::Equal => {
                return if node.right.is_some() {
                    minimum(&node.right)
                } else {
                    candidate
                };
            }
        }
    }
    None
}

/// The in-order predecessor of `key` within `root`, if one exists. Mirror
/// of [`successor`].
pub(crate) fn predecessor<'a, K: Ord, V>(root: &'a Link<K, V>, key: &K) -> Option<&'a Node<K, V>> {
    let mut link = root;
    let mut candidate: Option<&'a Node<K, V>> = None;
    while let Some(node) = link {
        match key.cmp(&node.key) {
            Ordering::Greater => {
                candidate = Some(node.as_ref());
                link = &node.right;
            }
            Ordering::Less => link = &node.left,
            Ordering::Equal => {
                return if node.left.is_some() {
                    maximum(&node.left)
                } else {
                    candidate
                };
            }
        }
    }
    None
}

/// The smallest key strictly greater than `key`, usable even when `key`
/// itself is absent from the tree (drives forward iteration).
pub(crate) fn successor_of_absent<'a, K: Ord, V>(root: &'a Link<K, V>, key: &K) -> Option<&'a Node<K, V>> {
    let mut link = root;
    let mut candidate: Option<&'a Node<K, V>> = None;
    while let Some(node) = link {
        match key.cmp(&node.key) {
            Ordering::Less => {
                candidate = Some(node.as_ref());
                link = &node.left;
            }
            _ => link = &node.right,
        }
    }
    candidate
}

/// The largest key strictly less than `key`, usable even when `key` itself
/// is absent (drives reverse iteration).
pub(crate) fn predecessor_of_absent<'a, K: Ord, V>(root: &'a Link<K, V>, key: &K) -> Option<&'a Node<K, V>> {
    let mut link = root;
    let mut candidate: Option<&'a Node<K, V>> = None;
    while let Some(node) = link {
        match key.cmp(&node.key) {
            Ordering::Greater => {
                candidate = Some(node.as_ref());
                link = &node.right;
            }
            _ => link = &node.left,
        }
    }
    candidate
}

pub(crate) fn len<K, V>(link: &Link<K, V>) -> usize {
    match link {
        None => 0,
        Some(node) => 1 + len(&node.left) + len(&node.right),
    }
}

/// Walks the whole tree checking the four red-black invariants plus the
/// binary-search-tree ordering property. Used by tests and `proptest`
/// properties, not by production code paths.
#[cfg(test)]
pub(crate) fn assert_valid_red_black_tree<K: Ord + std::fmt::Debug, V>(root: &Link<K, V>) {
    assert_eq!(crate::node::color_of(root), Color::Black, "root must be black");
    fn check<'a, K: Ord + std::fmt::Debug, V>(
        link: &'a Link<K, V>,
        lo: Option<&K>,
        hi: Option<&K>,
    ) -> usize {
        match link {
            None => 1,
            Some(node) => {
                if let Some(lo) = lo {
                    assert!(node.key > *lo, "bst ordering violated");
                }
                if let Some(hi) = hi {
                    assert!(node.key < *hi, "bst ordering violated");
                }
                if node.color == Color::Red {
                    assert!(
                        crate::node::is_black(&node.left) && crate::node::is_black(&node.right),
                        "red node {:?} has a red child",
                        node.key
                    );
                }
                let left_black_height = check(&node.left, lo, Some(&node.key));
                let right_black_height = check(&node.right, Some(&node.key), hi);
                assert_eq!(
                    left_black_height, right_black_height,
                    "black-height mismatch at {:?}",
                    node.key
                );
                left_black_height + usize::from(node.color == Color::Black)
            }
        }
    }
    check(root, None, None);
}

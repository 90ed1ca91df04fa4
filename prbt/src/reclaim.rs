//! Selective reclamation: freeing exactly the nodes a retired version
//! uniquely owned, and nothing a surviving version still needs.
//!
//! `Node`'s fields already make this memory-safe on their own — dropping
//! the last `Rc` to a node recursively drops its children the same way,
//! and `Rc::strong_count` already accounts for every incoming edge,
//! including the version-root pointers invariant I3 deliberately excludes
//! from `share_count`. So correctness here never depends on the manual
//! counter: the gate below is `Rc::strong_count(node) == 1`, which is true
//! exactly when nothing outside this walk — no sibling version's root, no
//! other parent — still needs the node. `share_count` is walked alongside
//! purely to keep the invariant the property tests check (`share_count ==
//! strong_count - 1` for every non-root node) accurate after the removal.

use std::rc::Rc;

use crate::node::Link;

/// Retires a version's root, releasing every node only that version still
/// uniquely owned.
pub(crate) fn remove_version<K, V>(root: Link<K, V>) {
    if let Some(node) = &root {
        reclaim_child(&node.left);
        reclaim_child(&node.right);
    }
    // `root`'s own Rc drops here. If nothing else referenced it — no other
    // version's root, no surviving parent edge — this is where its
    // allocation actually goes away.
}

fn reclaim_child<K, V>(link: &Link<K, V>) {
    if let Some(node) = link {
        node.release();
        if Rc::strong_count(node) == 1 {
            reclaim_child(&node.left);
            reclaim_child(&node.right);
        }
    }
}

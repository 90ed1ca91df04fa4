//! Descent, cloning and splicing shared by every mutator.
//!
//! Every mutator here walks down from a published root, cloning exactly
//! the nodes on its search path into a fresh [`Spine`] (the off-path child
//! of each cloned node keeps pointing at the original, untouched subtree),
//! then either plants a new leaf or splices an existing one out, and
//! finally hands the touched region to [`crate::fixup`] to restore the
//! red-black invariants before [`Spine::finalize`] publishes the result.

use std::cmp::Ordering;
use std::rc::Rc;

use crate::fixup::{delete_fixup, insert_fixup};
use crate::node::{self, Color, Link, Node};
use crate::spine::{Dir, Slot, SlotRef, Spine};

/// Clones `node` for a path that continues in `dir`: the child it continues
/// into is left as a placeholder, the other child keeps its existing,
/// now-additionally-shared subtree.
pub(crate) fn clone_pass_through<K: Clone, V: Clone>(spine: &mut Spine<K, V>, node: &Rc<Node<K, V>>, dir: Dir) -> usize {
    let (left, right) = match dir {
        Dir::Left => (Slot::nil(), retained_linked(&node.right)),
        Dir::Right => (retained_linked(&node.left), Slot::nil()),
    };
    spine.push(node.key.clone(), node.value.clone(), node.color, left, right)
}

/// Clones `node` as a leaf of the clone walk: both children are kept as
/// their existing, now-additionally-shared subtrees.
pub(crate) fn clone_terminal<K: Clone, V: Clone>(spine: &mut Spine<K, V>, node: &Rc<Node<K, V>>) -> usize {
    spine.push(
        node.key.clone(),
        node.value.clone(),
        node.color,
        retained_linked(&node.left),
        retained_linked(&node.right),
    )
}

/// Wraps `link` as a `Slot::Linked`, recording the extra incoming edge the
/// new version is about to give it.
pub(crate) fn retained_linked<K, V>(link: &Link<K, V>) -> Slot<K, V> {
    node::retain(link);
    Slot::Linked(link.clone())
}

fn x_slot_from(path: &[(usize, Dir)]) -> SlotRef {
    match path.last() {
        None => SlotRef::Root,
        Some(&(idx, dir)) => SlotRef::Child(idx, dir),
    }
}

/// Inserts `key` → `value` if absent. If `key` is already present, this
/// still clones a new leaf down the search path — keeping the *existing*
/// node's value, not the caller's — and publishes a new, content-identical
/// version rather than overwriting (that's `insert_or_assign`'s job).
pub(crate) fn insert<K: Ord + Clone, V: Clone>(root: &Link<K, V>, key: K, value: V) -> Link<K, V> {
    let mut spine = Spine::new();
    let mut path: Vec<(usize, Dir)> = Vec::new();
    let mut cur = root.clone();
    let mut slot_to_fill = SlotRef::Root;

    loop {
        match cur {
            None => {
                let leaf_idx = spine.push(key, value, Color::Red, Slot::nil(), Slot::nil());
                spine.write(slot_to_fill, Slot::Building(leaf_idx));
                insert_fixup(&mut spine, &path);
                force_root_black(&mut spine);
                return spine.finalize();
            }
            Some(node) => match key.cmp(&node.key) {
                Ordering::Equal => {
                    let idx = clone_terminal(&mut spine, &node);
                    spine.write(slot_to_fill, Slot::Building(idx));
                    return spine.finalize();
                }
                cmp => {
                    let dir = if cmp == Ordering::Less { Dir::Left } else { Dir::Right };
                    let idx = clone_pass_through(&mut spine, &node, dir);
                    spine.write(slot_to_fill, Slot::Building(idx));
                    path.push((idx, dir));
                    slot_to_fill = SlotRef::Child(idx, dir);
                    cur = match dir {
                        Dir::Left => node.left.clone(),
                        Dir::Right => node.right.clone(),
                    };
                }
            },
        }
    }
}

/// Inserts `key` → `value`, overwriting the existing value if `key` is
/// already present. An overwrite never touches colors or shape, so it
/// never runs fixup.
pub(crate) fn insert_or_assign<K: Ord + Clone, V: Clone>(root: &Link<K, V>, key: K, value: V) -> Link<K, V> {
    let mut spine = Spine::new();
    let mut path: Vec<(usize, Dir)> = Vec::new();
    let mut cur = root.clone();
    let mut slot_to_fill = SlotRef::Root;

    loop {
        match cur {
            None => {
                let leaf_idx = spine.push(key, value, Color::Red, Slot::nil(), Slot::nil());
                spine.write(slot_to_fill, Slot::Building(leaf_idx));
                insert_fixup(&mut spine, &path);
                force_root_black(&mut spine);
                return spine.finalize();
            }
            Some(node) => match key.cmp(&node.key) {
                Ordering::Equal => {
                    let idx = spine.push(key, value, node.color, retained_linked(&node.left), retained_linked(&node.right));
                    spine.write(slot_to_fill, Slot::Building(idx));
                    return spine.finalize();
                }
                cmp => {
                    let dir = if cmp == Ordering::Less { Dir::Left } else { Dir::Right };
                    let idx = clone_pass_through(&mut spine, &node, dir);
                    spine.write(slot_to_fill, Slot::Building(idx));
                    path.push((idx, dir));
                    slot_to_fill = SlotRef::Child(idx, dir);
                    cur = match dir {
                        Dir::Left => node.left.clone(),
                        Dir::Right => node.right.clone(),
                    };
                }
            },
        }
    }
}

/// Removes `key` if present. When `key` is absent this still produces a
/// full path-copy down to where it would have been, content-identical to
/// `root` — see the module-level discussion of why the original leaves
/// delete-not-found unspecialized.
pub(crate) fn delete<K: Ord + Clone, V: Clone>(root: &Link<K, V>, key: &K) -> Link<K, V> {
    let mut spine = Spine::new();
    let mut path: Vec<(usize, Dir)> = Vec::new();
    let mut cur = root.clone();
    let mut slot_to_fill = SlotRef::Root;

    loop {
        match cur {
            None => return spine.finalize(),
            Some(node) => match key.cmp(&node.key) {
                Ordering::Equal => {
                    delete_found(&mut spine, &mut path, slot_to_fill, &node);
                    force_root_black(&mut spine);
                    return spine.finalize();
                }
                cmp => {
                    let dir = if cmp == Ordering::Less { Dir::Left } else { Dir::Right };
                    let idx = clone_pass_through(&mut spine, &node, dir);
                    spine.write(slot_to_fill, Slot::Building(idx));
                    path.push((idx, dir));
                    slot_to_fill = SlotRef::Child(idx, dir);
                    cur = match dir {
                        Dir::Left => node.left.clone(),
                        Dir::Right => node.right.clone(),
                    };
                }
            },
        }
    }
}

fn delete_found<K: Ord + Clone, V: Clone>(
    spine: &mut Spine<K, V>,
    path: &mut Vec<(usize, Dir)>,
    slot_to_fill: SlotRef,
    z: &Rc<Node<K, V>>,
) {
    if z.left.is_none() || z.right.is_none() {
        let replacement = if z.left.is_none() {
            retained_linked(&z.right)
        } else {
            retained_linked(&z.left)
        };
        spine.write(slot_to_fill, replacement);
        finish_removal(spine, path, z.color);
        return;
    }
    delete_with_two_children(spine, path, slot_to_fill, z);
}

/// `z` has two non-nil children: splice the in-order successor (leftmost of
/// `z.right`) out of its position and move its key/value up to replace
/// `z`'s, exactly as CLRS's `RB-DELETE` does, adapted to path-copying: every
/// node on the walk down to the successor is cloned, and the successor's
/// parent link (or `z` itself, if the successor has no left-descent to
/// make) is rewritten in place.
fn delete_with_two_children<K: Ord + Clone, V: Clone>(
    spine: &mut Spine<K, V>,
    path: &mut Vec<(usize, Dir)>,
    slot_to_fill: SlotRef,
    z: &Rc<Node<K, V>>,
) {
    let mut chain: Vec<usize> = Vec::new();
    let mut cur = z.right.clone();

    let (y_idx, y_original_color, fixup_parent, fixup_dir) = loop {
        let node = cur.clone().expect("z has two children, so z.right is never nil here");
        if node.left.is_some() {
            let idx = clone_pass_through(spine, &node, Dir::Left);
            if let Some(&prev) = chain.last() {
                spine.write(SlotRef::Child(prev, Dir::Left), Slot::Building(idx));
            }
            chain.push(idx);
            cur = node.left.clone();
            continue;
        }

        let y_color = node.color;
        let y_right = retained_linked(&node.right);
        let y_idx = spine.push(
            node.key.clone(),
            node.value.clone(),
            z.color,
            retained_linked(&z.left),
            Slot::nil(),
        );
        break if let Some(&parent_in_chain) = chain.last() {
            spine.write(SlotRef::Child(parent_in_chain, Dir::Left), y_right);
            let chain_root = chain[0];
            spine.write(SlotRef::Child(y_idx, Dir::Right), Slot::Building(chain_root));
            (y_idx, y_color, parent_in_chain, Dir::Left)
        } else {
            spine.write(SlotRef::Child(y_idx, Dir::Right), y_right);
            (y_idx, y_color, y_idx, Dir::Right)
        };
    };

    spine.write(slot_to_fill, Slot::Building(y_idx));
    path.push((fixup_parent, fixup_dir));
    finish_removal(spine, path, y_original_color);
}

/// Common tail of both deletion shapes: a red node (or red successor) can
/// simply vanish; a black one leaves a "double black" deficit at the slot
/// it used to occupy, resolved by painting a red replacement black outright
/// or, if the replacement is already black (including nil), by running the
/// full rebalancing walk.
fn finish_removal<K: Clone, V: Clone>(spine: &mut Spine<K, V>, path: &mut Vec<(usize, Dir)>, original_color: Color) {
    if original_color == Color::Red {
        return;
    }
    let x_slot = x_slot_from(path);
    if spine.slot_color(x_slot) == Color::Red {
        crate::fixup::create_copy_and_plant(spine, x_slot, Some(Color::Black));
        return;
    }
    delete_fixup(spine, path);
}

fn force_root_black<K, V>(spine: &mut Spine<K, V>) {
    if let Some(idx) = spine.root_building_idx() {
        spine.set_color(idx, Color::Black);
    }
}

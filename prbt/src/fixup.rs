//! Fixup as pointer-slot rewriting.
//!
//! Both walks below operate purely on [`Spine`] indices and [`SlotRef`]s —
//! no key comparison, no allocation beyond the occasional
//! [`create_copy_and_plant`] clone of an off-path neighbor whose color must
//! change. This mirrors the iterative, stack-driven fixup the persistent
//! tree this crate is modeled on uses in place of CLRS's parent-pointer
//! walk: `path` plays the role its `std::stack<Node**>` played, one frame
//! per ancestor between the touched node and the root.

use crate::mutate::clone_terminal;
use crate::node::Color;
use crate::spine::{Dir, Slot, SlotRef, Spine};

/// The slot that currently holds a reference to `path[i].0` — i.e. the
/// slot `path[i].0` was written into by its own parent.
fn slot_at(path: &[(usize, Dir)], i: usize) -> SlotRef {
    if i == 0 {
        SlotRef::Root
    } else {
        let (idx, dir) = path[i - 1];
        SlotRef::Child(idx, dir)
    }
}

/// Ensures `slot` holds an owned (`Slot::Building`) node, cloning it from
/// the published tree if it is still `Slot::Linked`, and optionally
/// overwriting its color in the same step. Returns the resulting builder
/// index. This is the persistent analogue of mutating a node in place: any
/// off-path node whose color a fixup step needs to touch must first be
/// given its own copy, since the original may still be reachable from
/// older, already-published versions.
pub(crate) fn create_copy_and_plant<K: Clone, V: Clone>(
    spine: &mut Spine<K, V>,
    slot: SlotRef,
    color_override: Option<Color>,
) -> usize {
    match spine.read(slot).clone() {
        Slot::Building(idx) => {
            if let Some(color) = color_override {
                spine.set_color(idx, color);
            }
            idx
        }
        Slot::Linked(Some(node)) => {
            let idx = clone_terminal(spine, &node);
            if let Some(color) = color_override {
                spine.set_color(idx, color);
            }
            spine.write(slot, Slot::Building(idx));
            idx
        }
        Slot::Linked(None) => panic!("create_copy_and_plant called on the sentinel"),
    }
}

/// Restores the red property after planting a new red leaf at the bottom
/// of `path`. `path` holds every cloned ancestor from the root down to the
/// new leaf's parent, each paired with the direction taken to reach the
/// next node down.
pub(crate) fn insert_fixup<K: Clone, V: Clone>(spine: &mut Spine<K, V>, path: &[(usize, Dir)]) {
    let mut top = path.len();
    while top >= 2 {
        let (parent_idx, dir_p_to_z) = path[top - 1];
        if spine.color(parent_idx) != Color::Red {
            break;
        }
        // A red parent can't be the root, so a grandparent always exists.
        let (grand_idx, dir_g_to_p) = path[top - 2];
        let uncle_dir = dir_g_to_p.opposite();
        let uncle_slot = SlotRef::Child(grand_idx, uncle_dir);

        if spine.slot_color(uncle_slot) == Color::Red {
            spine.set_color(parent_idx, Color::Black);
            create_copy_and_plant(spine, uncle_slot, Some(Color::Black));
            spine.set_color(grand_idx, Color::Red);
            top -= 2;
            continue;
        }

        if dir_p_to_z != dir_g_to_p {
            let parent_slot = slot_at(path, top - 1);
            match dir_g_to_p {
                Dir::Left => spine.rotate_left(parent_slot),
                Dir::Right => spine.rotate_right(parent_slot),
            }
        }

        let grand_slot = slot_at(path, top - 2);
        let new_top_idx = match spine.child_slot(grand_idx, dir_g_to_p) {
            Slot::Building(idx) => *idx,
            Slot::Linked(_) => unreachable!("grandparent's near child is always owned here"),
        };
        spine.set_color(new_top_idx, Color::Black);
        spine.set_color(grand_idx, Color::Red);
        match dir_g_to_p {
            Dir::Left => spine.rotate_right(grand_slot),
            Dir::Right => spine.rotate_left(grand_slot),
        }
        break;
    }
}

/// Restores the black-height and no-red-red properties after a black node
/// (or black successor) has vanished from the slot at the bottom of `path`,
/// leaving it "doubly black". Mirrors CLRS's `RB-DELETE-FIXUP`, case for
/// case; the caller has already handled the trivial red cases.
pub(crate) fn delete_fixup<K: Clone, V: Clone>(spine: &mut Spine<K, V>, path: &mut Vec<(usize, Dir)>) {
    while let Some(&(parent_idx, dir)) = path.last() {
        let x_slot = SlotRef::Child(parent_idx, dir);
        if spine.slot_color(x_slot) == Color::Red {
            create_copy_and_plant(spine, x_slot, Some(Color::Black));
            return;
        }

        let sib_dir = dir.opposite();
        let mut sib_slot = SlotRef::Child(parent_idx, sib_dir);

        // Case 1: red sibling. Rotate it out of the way so the real,
        // black sibling underneath takes its place.
        if spine.slot_color(sib_slot) == Color::Red {
            create_copy_and_plant(spine, sib_slot, Some(Color::Black));
            spine.set_color(parent_idx, Color::Red);
            let parent_slot = slot_at(path, path.len() - 1);
            match dir {
                Dir::Left => spine.rotate_left(parent_slot),
                Dir::Right => spine.rotate_right(parent_slot),
            }
            sib_slot = SlotRef::Child(parent_idx, sib_dir);
        }

        let sib_idx = create_copy_and_plant(spine, sib_slot, None);
        let near_slot = SlotRef::Child(sib_idx, dir);
        let far_slot = SlotRef::Child(sib_idx, sib_dir);

        // Case 2: both of the sibling's children are black. Push the
        // deficit up to the parent and keep walking.
        if spine.slot_color(near_slot) == Color::Black && spine.slot_color(far_slot) == Color::Black {
            spine.set_color(sib_idx, Color::Red);
            path.pop();
            continue;
        }

        // Case 3: near nephew red, far nephew black. Rotate the sibling so
        // its red child becomes the new, far-side sibling, turning this
        // into case 4.
        if spine.slot_color(far_slot) == Color::Black {
            create_copy_and_plant(spine, near_slot, Some(Color::Black));
            spine.set_color(sib_idx, Color::Red);
            match dir {
                Dir::Left => spine.rotate_right(sib_slot),
                Dir::Right => spine.rotate_left(sib_slot),
            }
            sib_slot = SlotRef::Child(parent_idx, sib_dir);
        }

        // Case 4: far nephew red. One rotation at the parent clears the
        // deficit for good.
        let parent_color = spine.color(parent_idx);
        let sib_idx = create_copy_and_plant(spine, sib_slot, Some(parent_color));
        spine.set_color(parent_idx, Color::Black);
        create_copy_and_plant(spine, SlotRef::Child(sib_idx, sib_dir), Some(Color::Black));
        let parent_slot = slot_at(path, path.len() - 1);
        match dir {
            Dir::Left => spine.rotate_left(parent_slot),
            Dir::Right => spine.rotate_right(parent_slot),
        }
        return;
    }
}

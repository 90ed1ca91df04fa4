//! The freshly-cloned spine a single mutation builds.
//!
//! The source this crate is modeled on drives insert/delete fixup against a
//! `std::stack<Node**>` — raw pointers into the handful of nodes a single
//! mutator clones on its way down. Rust has no stable address for a field
//! until its owner is pinned, so the spine is instead a small local arena:
//! every node touched by the current mutation (cloned descent nodes, and
//! any uncle/sibling copied on demand by `create_copy_and_plant`) lives at
//! an index in `Spine::builders`, and a "pointer-slot" from the spec is
//! either `SlotRef::Root` or `SlotRef::Child(parent_index, Dir)`. Rotations
//! and fixup read and rewrite slots purely through these indices; nothing
//! is allocated or published until [`Spine::finalize`] walks the finished
//! shape bottom-up and wraps it in `Rc`s.

use crate::node::{color_of, Color, Link, Node};

/// Which child of a builder a slot denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dir {
    Left,
    Right,
}

impl Dir {
    pub(crate) fn opposite(self) -> Dir {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

/// A child reference held by a node still under construction.
pub(crate) enum Slot<K, V> {
    /// An existing, already-published subtree (or the sentinel).
    Linked(Link<K, V>),
    /// An index into this mutation's [`Spine::builders`].
    Building(usize),
}

// Written by hand rather than derived: `Link<K, V>` clones via `Rc::clone`
// and needs no bound on `K`/`V`, but `#[derive(Clone)]` would add one anyway.
impl<K, V> Clone for Slot<K, V> {
    fn clone(&self) -> Self {
        match self {
            Slot::Linked(link) => Slot::Linked(link.clone()),
            Slot::Building(idx) => Slot::Building(*idx),
        }
    }
}

impl<K, V> Slot<K, V> {
    pub(crate) fn nil() -> Self {
        Slot::Linked(None)
    }
}

/// A node this mutation has cloned or newly allocated but not yet published.
pub(crate) struct Builder<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) color: Color,
    pub(crate) left: Slot<K, V>,
    pub(crate) right: Slot<K, V>,
}

/// Where a pointer-slot lives: the eventual root of the new version, or a
/// named child field of an in-progress builder.
#[derive(Debug, Clone, Copy)]
pub(crate) enum SlotRef {
    Root,
    Child(usize, Dir),
}

/// The arena backing one mutator invocation.
pub(crate) struct Spine<K, V> {
    builders: Vec<Option<Builder<K, V>>>,
    root: Slot<K, V>,
}

impl<K, V> Spine<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            builders: Vec::new(),
            root: Slot::nil(),
        }
    }

    /// Allocates a new builder node and returns its index.
    pub(crate) fn push(&mut self, key: K, value: V, color: Color, left: Slot<K, V>, right: Slot<K, V>) -> usize {
        let idx = self.builders.len();
        self.builders.push(Some(Builder {
            key,
            value,
            color,
            left,
            right,
        }));
        idx
    }

    fn builder(&self, idx: usize) -> &Builder<K, V> {
        self.builders[idx].as_ref().expect("builder already finalized")
    }

    fn builder_mut(&mut self, idx: usize) -> &mut Builder<K, V> {
        self.builders[idx].as_mut().expect("builder already finalized")
    }

    pub(crate) fn color(&self, idx: usize) -> Color {
        self.builder(idx).color
    }

    pub(crate) fn set_color(&mut self, idx: usize, color: Color) {
        self.builder_mut(idx).color = color;
    }

    pub(crate) fn child_slot(&self, idx: usize, dir: Dir) -> &Slot<K, V> {
        match dir {
            Dir::Left => &self.builder(idx).left,
            Dir::Right => &self.builder(idx).right,
        }
    }

    fn set_child_slot(&mut self, idx: usize, dir: Dir, slot: Slot<K, V>) {
        let builder = self.builder_mut(idx);
        match dir {
            Dir::Left => builder.left = slot,
            Dir::Right => builder.right = slot,
        }
    }

    /// Reads the node currently occupying `slot`.
    pub(crate) fn read(&self, slot: SlotRef) -> &Slot<K, V> {
        match slot {
            SlotRef::Root => &self.root,
            SlotRef::Child(idx, dir) => self.child_slot(idx, dir),
        }
    }

    /// Overwrites `slot` to point at a different builder/linked subtree.
    pub(crate) fn write(&mut self, slot: SlotRef, value: Slot<K, V>) {
        match slot {
            SlotRef::Root => self.root = value,
            SlotRef::Child(idx, dir) => self.set_child_slot(idx, dir, value),
        }
    }

    /// Root-slot convenience used once descent finishes without a fixup.
    pub(crate) fn set_root_building(&mut self, idx: usize) {
        self.root = Slot::Building(idx);
    }

    pub(crate) fn set_root_linked(&mut self, link: Link<K, V>) {
        self.root = Slot::Linked(link);
    }

    /// The color of whatever currently occupies `slot`, treating the
    /// sentinel as black.
    pub(crate) fn slot_color(&self, slot: SlotRef) -> Color {
        match self.read(slot) {
            Slot::Linked(link) => color_of(link),
            Slot::Building(idx) => self.color(*idx),
        }
    }

    /// The root's builder index, if the root was touched by this mutation.
    pub(crate) fn root_building_idx(&self) -> Option<usize> {
        match &self.root {
            Slot::Building(idx) => Some(*idx),
            Slot::Linked(_) => None,
        }
    }

    /// Left-rotates the subtree currently occupying `slot`.
    ///
    /// Pure pointer-slot rewiring: no allocation, no cloning, no share-count
    /// traffic. Both nodes it touches must already be builder-owned (the
    /// caller clones an off-path neighbor with [`create_copy_and_plant`]
    /// before ever rotating through it).
    pub(crate) fn rotate_left(&mut self, slot: SlotRef) {
        let idx = match self.read(slot) {
            Slot::Building(idx) => *idx,
            Slot::Linked(_) => panic!("rotate on a non-owned node"),
        };
        let new_root_slot = self.child_slot(idx, Dir::Right).clone();
        let new_root_idx = match new_root_slot {
            Slot::Building(i) => i,
            Slot::Linked(_) => panic!("rotate_left requires an owned right child"),
        };
        let moved = self.child_slot(new_root_idx, Dir::Left).clone();
        self.set_child_slot(idx, Dir::Right, moved);
        self.set_child_slot(new_root_idx, Dir::Left, Slot::Building(idx));
        self.write(slot, Slot::Building(new_root_idx));
    }

    /// Mirror of [`Spine::rotate_left`].
    pub(crate) fn rotate_right(&mut self, slot: SlotRef) {
        let idx = match self.read(slot) {
            Slot::Building(idx) => *idx,
            Slot::Linked(_) => panic!("rotate on a non-owned node"),
        };
        let new_root_slot = self.child_slot(idx, Dir::Left).clone();
        let new_root_idx = match new_root_slot {
            Slot::Building(i) => i,
            Slot::Linked(_) => panic!("rotate_right requires an owned left child"),
        };
        let moved = self.child_slot(new_root_idx, Dir::Right).clone();
        self.set_child_slot(idx, Dir::Left, moved);
        self.set_child_slot(new_root_idx, Dir::Right, Slot::Building(idx));
        self.write(slot, Slot::Building(new_root_idx));
    }

    /// Publishes the whole spine, returning the new version's root.
    pub(crate) fn finalize(mut self) -> Link<K, V>
    where
        K: Clone,
        V: Clone,
    {
        let root = self.root.clone();
        self.finalize_slot(root)
    }

    fn finalize_slot(&mut self, slot: Slot<K, V>) -> Link<K, V>
    where
        K: Clone,
        V: Clone,
    {
        match slot {
            Slot::Linked(link) => link,
            Slot::Building(idx) => {
                let builder = self.builders[idx].take().expect("builder already finalized");
                // Linked children were already share_count-retained at the point a
                // mutator or fixup step installed them into this builder; a
                // Building child is exclusive to its freshly-created parent and
                // starts at share_count 0 (set by `Node::new`). Neither case is
                // retained again here.
                let left = self.finalize_slot(builder.left);
                let right = self.finalize_slot(builder.right);
                Some(Node::new(builder.key, builder.value, builder.color, left, right))
            }
        }
    }
}

//! A fully persistent, version-tracked ordered map.
//!
//! [`PersistentMap`] never mutates a published tree shape: every insert,
//! assignment, or delete takes one version as a starting point and
//! publishes a brand-new version as its result, sharing every subtree the
//! edit didn't touch with whichever versions are still alive. Internally
//! it is a red-black tree built from immutable, reference-counted nodes
//! (see [`node`]); mutators clone exactly the nodes on their search path
//! into a scratch arena (see [`spine`]) and splice the result back in
//! (see [`mutate`] and [`fixup`]) rather than editing anything in place.
//!
//! Old versions aren't kept forever automatically — call
//! [`PersistentMap::remove_version`] once a version is no longer needed, or
//! [`PersistentMap::clear`] to retire everything. Removal only frees nodes
//! no other live version still needs (see [`reclaim`]).
//!
//! ```
//! use prbt::PersistentMap;
//!
//! let mut map = PersistentMap::new();
//! let v0 = map.current();
//! let (v1, inserted) = map.insert(v0, "a", 1).unwrap();
//! assert!(inserted);
//! let (v2, _) = map.insert(v1, "b", 2).unwrap();
//!
//! assert_eq!(map.get(v1, &"b").unwrap(), None);
//! assert_eq!(map.get(v2, &"b").unwrap(), Some(&2));
//! assert_eq!(map.len(v1).unwrap(), 1);
//! ```

mod error;
mod fixup;
mod iter;
mod mutate;
mod node;
#[cfg(test)]
mod proptests;
mod reclaim;
mod spine;
mod tree;
mod version;

pub use error::{PrbtError, Result};
pub use iter::Iter;
pub use version::VersionId;

use node::Link;
use version::Registry;

/// A persistent, ordered `K -> V` map addressed by [`VersionId`].
///
/// Every method that resolves a `VersionId` against a retired or foreign
/// handle returns [`PrbtError::OrphanNode`] rather than panicking — version
/// handles are opaque and outlive nothing, so a caller juggling versions
/// across a longer-lived structure (a cache, an undo stack) can always
/// tell a stale handle from a live one.
pub struct PersistentMap<K, V> {
    registry: Registry<K, V>,
}

impl<K, V> PersistentMap<K, V> {
    /// Creates a map with a single empty version as `current()`.
    pub fn new() -> Self {
        Self { registry: Registry::new() }
    }

    /// The most recently published version.
    pub fn current(&self) -> VersionId {
        self.registry.current()
    }

    /// Every live version, oldest first. Does not include the implicit
    /// empty sentinel version that exists before the first insert.
    pub fn versions(&self) -> Vec<VersionId> {
        self.registry.enumerate()
    }

    pub fn is_live(&self, version: VersionId) -> bool {
        self.registry.is_live(version)
    }

    fn root(&self, version: VersionId) -> Result<&Link<K, V>> {
        self.registry.get(version).ok_or(PrbtError::OrphanNode)
    }
}

impl<K, V> Default for PersistentMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone, V: Clone> PersistentMap<K, V> {
    /// Publishes a new version with `key` -> `value` added, leaving
    /// `version` untouched. If `key` is already present in `version`, the
    /// new version is published unchanged (use [`Self::insert_or_assign`]
    /// to overwrite) and the returned flag is `false` — note that per the
    /// crate's documented duplicate-key behavior (see the design notes) this
    /// still publishes a distinct, content-identical version handle rather
    /// than returning `version` itself.
    ///
    /// Returns `(new_version, inserted)`.
    pub fn insert(&mut self, version: VersionId, key: K, value: V) -> Result<(VersionId, bool)> {
        let root = self.root(version)?;
        let existed = tree::search(root, &key).is_some();
        let new_root = mutate::insert(root, key, value);
        #[cfg(feature = "tracing")]
        tracing::debug!(from = ?version, inserted = !existed, "insert");
        Ok((self.registry.publish(new_root), !existed))
    }

    /// Publishes a new version with `key` -> `value`, overwriting any
    /// existing value for `key`.
    ///
    /// Returns `(new_version, inserted)`: `inserted` is `false` when `key`
    /// already existed in `version` (the new version reflects the updated
    /// value regardless).
    pub fn insert_or_assign(&mut self, version: VersionId, key: K, value: V) -> Result<(VersionId, bool)> {
        let root = self.root(version)?;
        let existed = tree::search(root, &key).is_some();
        let new_root = mutate::insert_or_assign(root, key, value);
        #[cfg(feature = "tracing")]
        tracing::debug!(from = ?version, inserted = !existed, "insert_or_assign");
        Ok((self.registry.publish(new_root), !existed))
    }

    /// Publishes a new version with `key` removed, if present. Removing an
    /// absent key still publishes a new, content-identical version (see
    /// the crate's design notes on why deletion never special-cases a
    /// miss).
    ///
    /// Returns `(new_version, existed)`.
    pub fn delete(&mut self, version: VersionId, key: &K) -> Result<(VersionId, bool)> {
        let root = self.root(version)?;
        let existed = tree::search(root, key).is_some();
        let new_root = mutate::delete(root, key);
        #[cfg(feature = "tracing")]
        tracing::debug!(from = ?version, existed, "delete");
        Ok((self.registry.publish(new_root), existed))
    }
}

impl<K: Ord, V> PersistentMap<K, V> {
    /// Looks up `key` in `version`. `Ok(None)` means the version resolved
    /// fine but doesn't have the key; `Err` means `version` itself doesn't
    /// resolve.
    pub fn get(&self, version: VersionId, key: &K) -> Result<Option<&V>> {
        let root = self.root(version)?;
        Ok(tree::search(root, key).map(|node| &node.value))
    }

    /// Like [`Self::get`], but reports a missing key as
    /// [`PrbtError::KeyMissing`] instead of `Ok(None)` — mirrors the
    /// original's bounds-checked element access.
    pub fn at(&self, version: VersionId, key: &K) -> Result<&V> {
        self.get(version, key)?.ok_or(PrbtError::KeyMissing)
    }

    pub fn contains_key(&self, version: VersionId, key: &K) -> Result<bool> {
        Ok(self.get(version, key)?.is_some())
    }

    pub fn len(&self, version: VersionId) -> Result<usize> {
        Ok(tree::len(self.root(version)?))
    }

    pub fn is_empty(&self, version: VersionId) -> Result<bool> {
        Ok(self.len(version)? == 0)
    }

    /// A bidirectional cursor over `version`'s entries in key order.
    pub fn iter(&self, version: VersionId) -> Result<Iter<'_, K, V>> {
        Ok(Iter::new(self.root(version)?))
    }
}

impl<K, V> PersistentMap<K, V> {
    /// Retires `version`, freeing every node only it still uniquely owned.
    /// Other live versions that shared structure with it are unaffected.
    ///
    /// Removing the sentinel (the implicit empty version that predates any
    /// insert) or a version already removed is a
    /// [`PrbtError::PreconditionViolation`] — per the crate's error design,
    /// a non-recoverable misuse of the API rather than an ordinary "not
    /// found". Any other unresolved handle (never issued by this map) is
    /// [`PrbtError::OrphanNode`].
    pub fn remove_version(&mut self, version: VersionId) -> Result<()> {
        if self.registry.is_sentinel(version) {
            return Err(PrbtError::PreconditionViolation("cannot remove the sentinel version"));
        }
        if !self.registry.is_live(version) {
            return Err(PrbtError::PreconditionViolation("version already removed"));
        }
        let root = self
            .registry
            .unlink(version)
            .expect("checked live and non-sentinel above");
        #[cfg(feature = "tracing")]
        tracing::debug!(removed = ?version, "remove_version");
        reclaim::remove_version(root);
        Ok(())
    }

    /// Retires every live version. Equivalent to calling
    /// [`Self::remove_version`] on each of [`Self::versions`], oldest
    /// first, but does it without the intermediate `Vec<VersionId>`.
    pub fn clear(&mut self) {
        while let Some(oldest) = self.registry.oldest() {
            if let Some(root) = self.registry.unlink(oldest) {
                reclaim::remove_version(root);
            }
        }
    }
}

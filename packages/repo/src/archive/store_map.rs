//! Process-wide mapping from primary stores to their archive stores.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use relic_core::StoreRef;

/// Maps each primary store to its designated archive store, if any.
///
/// A store with no entry is never archivable: its nodes are always
/// hard-deleted. Several primary stores may share one archive store, but a
/// primary store maps to at most one.
///
/// Read-mostly: consulted on every delete, mutated only by administrative
/// configuration. Reads are lock-free snapshot loads; writers swap a new
/// map in place.
#[derive(Default)]
pub struct StoreArchiveMap {
    map: ArcSwap<HashMap<StoreRef, StoreRef>>,
}

impl StoreArchiveMap {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The archive store designated for `primary`, or `None` if nodes of
    /// that store are never archived.
    #[must_use]
    pub fn archive_store(&self, primary: &StoreRef) -> Option<StoreRef> {
        self.map.load().get(primary).cloned()
    }

    /// Installs or replaces the mapping for a primary store.
    pub fn set_mapping(&self, primary: StoreRef, archive: StoreRef) {
        self.map.rcu(|current| {
            let mut next: HashMap<StoreRef, StoreRef> = HashMap::clone(current);
            next.insert(primary.clone(), archive.clone());
            next
        });
    }

    /// Removes the mapping for a primary store, making its nodes
    /// hard-delete-only from then on.
    pub fn remove_mapping(&self, primary: &StoreRef) {
        self.map.rcu(|current| {
            let mut next: HashMap<StoreRef, StoreRef> = HashMap::clone(current);
            next.remove(primary);
            next
        });
    }

    /// Snapshot of all current mappings.
    #[must_use]
    pub fn snapshot(&self) -> Arc<HashMap<StoreRef, StoreRef>> {
        self.map.load_full()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace() -> StoreRef {
        StoreRef::new("workspace", "SpacesStore")
    }

    fn archive() -> StoreRef {
        StoreRef::new("archive", "SpacesStore")
    }

    #[test]
    fn unmapped_store_has_no_archive() {
        let map = StoreArchiveMap::new();
        assert_eq!(map.archive_store(&workspace()), None);
    }

    #[test]
    fn set_and_remove_mapping() {
        let map = StoreArchiveMap::new();
        map.set_mapping(workspace(), archive());
        assert_eq!(map.archive_store(&workspace()), Some(archive()));

        map.remove_mapping(&workspace());
        assert_eq!(map.archive_store(&workspace()), None);
    }

    #[test]
    fn mapping_is_not_required_to_be_injective() {
        let map = StoreArchiveMap::new();
        let other = StoreRef::new("workspace", "OtherStore");
        map.set_mapping(workspace(), archive());
        map.set_mapping(other.clone(), archive());
        assert_eq!(map.archive_store(&workspace()), Some(archive()));
        assert_eq!(map.archive_store(&other), Some(archive()));
    }

    #[test]
    fn replacing_a_mapping_overwrites() {
        let map = StoreArchiveMap::new();
        let second = StoreRef::new("archive", "ColdStore");
        map.set_mapping(workspace(), archive());
        map.set_mapping(workspace(), second.clone());
        assert_eq!(map.archive_store(&workspace()), Some(second));
    }
}

//! Delete interception: rewrites delete semantics for archivable nodes.
//!
//! [`ArchivingNodeService`] sits in front of the storage engine's delete.
//! Non-archivable deletes pass straight through; in eager mode the engine's
//! own archival-on-delete applies; in lazy mode (the default) the node is
//! tagged with a pending-delete marker, given a collision-resistant
//! transient name, and the physical delete is deferred to the background
//! pool via the caller's transaction.
//!
//! The interceptor deliberately does not implement
//! [`NodeService`](crate::node::NodeService): its delete entry point takes
//! the transaction context explicitly, and the type prevents the
//! interceptor from ever being wired in front of itself.

use std::sync::Arc;

use relic_core::model::{
    ASPECT_PENDING_DELETE, ASPECT_TEMPORARY, PROP_NAME, PROP_PENDING_DELETE_ORIGINAL_NAME,
    PROP_PENDING_DELETE_REQUESTED_BY,
};
use relic_core::{AuthContext, NodeRef, PropertyValue};
use tracing::debug;
use uuid::Uuid;

use crate::archive::StoreArchiveMap;
use crate::config::ArchiveMode;
use crate::error::NodeError;
use crate::node::{NodeService, TypeDictionary};
use crate::txn::{DeferredDelete, Txn};

/// How a particular delete request is routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePath {
    /// Hard delete straight through the engine: the node's type is not
    /// archivable, its store has no archive mapping, or it carries
    /// `sys:temporary`.
    Direct,
    /// Delegate to the engine, which archives the node within this same
    /// delete call.
    EagerArchive,
    /// Tag, rename, and defer the physical delete past commit.
    LazyArchive,
}

/// Delete interceptor in front of a [`NodeService`].
pub struct ArchivingNodeService {
    engine: Arc<dyn NodeService>,
    dictionary: Arc<dyn TypeDictionary>,
    store_map: Arc<StoreArchiveMap>,
    mode: ArchiveMode,
}

impl ArchivingNodeService {
    /// Wires the interceptor over the real storage engine.
    #[must_use]
    pub fn new(
        engine: Arc<dyn NodeService>,
        dictionary: Arc<dyn TypeDictionary>,
        store_map: Arc<StoreArchiveMap>,
        mode: ArchiveMode,
    ) -> Self {
        Self {
            engine,
            dictionary,
            store_map,
            mode,
        }
    }

    /// Routes a delete request. Pure decision, no side effects.
    ///
    /// # Errors
    ///
    /// `NotFound` if the node disappears between existence check and
    /// inspection.
    pub fn classify(&self, node: &NodeRef) -> Result<DeletePath, NodeError> {
        if self.engine.has_aspect(node, &ASPECT_TEMPORARY)? {
            return Ok(DeletePath::Direct);
        }
        let node_type = self.engine.node_type(node)?;
        if !self.dictionary.is_archivable(&node_type)
            || self.store_map.archive_store(&node.store).is_none()
        {
            return Ok(DeletePath::Direct);
        }
        Ok(match self.mode {
            ArchiveMode::Eager => DeletePath::EagerArchive,
            ArchiveMode::Lazy => DeletePath::LazyArchive,
        })
    }

    /// Deletes a node, observing the archive configuration. Returns `true`
    /// if the node existed — on the lazy path this is a promise of eventual
    /// physical deletion, not an immediate one.
    ///
    /// # Errors
    ///
    /// Engine errors from the direct path; `AccessDenied` surfaces before
    /// any tagging happens on the lazy path.
    pub fn delete(
        &self,
        auth: &AuthContext,
        txn: &mut Txn,
        node: &NodeRef,
    ) -> Result<bool, NodeError> {
        if !self.engine.exists(node) {
            return Ok(false);
        }
        match self.classify(node)? {
            DeletePath::Direct | DeletePath::EagerArchive => self.engine.delete_node(auth, node),
            DeletePath::LazyArchive => {
                self.mark_pending_delete(auth, node)?;
                txn.defer_delete(DeferredDelete { node: node.clone() });
                Ok(true)
            }
        }
    }

    /// Tags the node with the pending-delete marker and the transient
    /// rename. A node already carrying the marker is left as is, so
    /// repeated lazy deletes in flight never scramble the recorded name.
    fn mark_pending_delete(&self, auth: &AuthContext, node: &NodeRef) -> Result<(), NodeError> {
        if self.engine.has_aspect(node, &ASPECT_PENDING_DELETE)? {
            return Ok(());
        }
        let original_name = self
            .engine
            .get_property(node, &PROP_NAME)?
            .and_then(|v| v.as_text().map(str::to_string));

        let mut marker_props = vec![(
            PROP_PENDING_DELETE_REQUESTED_BY.clone(),
            PropertyValue::Text(auth.user.clone()),
        )];
        if let Some(name) = original_name {
            marker_props.push((
                PROP_PENDING_DELETE_ORIGINAL_NAME.clone(),
                PropertyValue::Text(name),
            ));
        }
        self.engine
            .add_aspect(node, &ASPECT_PENDING_DELETE, marker_props)?;

        let transient = Uuid::new_v4().simple().to_string();
        self.engine
            .set_property(node, &PROP_NAME, PropertyValue::Text(transient))?;
        debug!(node = %node, user = %auth.user, "node tagged for deferred delete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use relic_core::model::ASSOC_CONTAINS;
    use relic_core::{QName, StoreRef};

    use super::*;
    use crate::node::MemoryNodeService;

    fn workspace() -> StoreRef {
        StoreRef::new("workspace", "SpacesStore")
    }

    fn archive_store() -> StoreRef {
        StoreRef::new("archive", "SpacesStore")
    }

    fn content_type() -> QName {
        QName::new("cm", "content")
    }

    struct Fixture {
        engine: Arc<MemoryNodeService>,
        root: NodeRef,
    }

    fn fixture() -> Fixture {
        let map = Arc::new(StoreArchiveMap::new());
        map.set_mapping(workspace(), archive_store());
        let engine = Arc::new(MemoryNodeService::new(Arc::clone(&map)));
        let root = engine.create_store(&workspace());
        engine.create_store(&archive_store());
        engine.register_archivable_type(content_type());
        Fixture { engine, root }
    }

    fn interceptor(fixture: &Fixture, mode: ArchiveMode) -> ArchivingNodeService {
        let map = Arc::new(StoreArchiveMap::new());
        map.set_mapping(workspace(), archive_store());
        ArchivingNodeService::new(
            Arc::clone(&fixture.engine) as Arc<dyn NodeService>,
            Arc::clone(&fixture.engine) as Arc<dyn TypeDictionary>,
            map,
            mode,
        )
    }

    fn create_doc(fixture: &Fixture, auth: &AuthContext, name: &str) -> NodeRef {
        fixture
            .engine
            .create_node(
                auth,
                &fixture.root,
                &ASSOC_CONTAINS,
                &QName::new("cm", name),
                &content_type(),
                vec![(PROP_NAME.clone(), PropertyValue::Text(name.to_string()))],
            )
            .unwrap()
    }

    #[test]
    fn temporary_node_routes_direct() {
        let fx = fixture();
        let alice = AuthContext::user("alice");
        let node = create_doc(&fx, &alice, "tmp");
        fx.engine
            .add_aspect(&node, &ASPECT_TEMPORARY, Vec::new())
            .unwrap();

        let svc = interceptor(&fx, ArchiveMode::Lazy);
        assert_eq!(svc.classify(&node).unwrap(), DeletePath::Direct);
    }

    #[test]
    fn unmapped_store_routes_direct() {
        let fx = fixture();
        let alice = AuthContext::user("alice");
        let node = create_doc(&fx, &alice, "doc");

        let svc = ArchivingNodeService::new(
            Arc::clone(&fx.engine) as Arc<dyn NodeService>,
            Arc::clone(&fx.engine) as Arc<dyn TypeDictionary>,
            Arc::new(StoreArchiveMap::new()),
            ArchiveMode::Lazy,
        );
        assert_eq!(svc.classify(&node).unwrap(), DeletePath::Direct);
    }

    #[test]
    fn mode_selects_between_eager_and_lazy() {
        let fx = fixture();
        let alice = AuthContext::user("alice");
        let node = create_doc(&fx, &alice, "doc");

        assert_eq!(
            interceptor(&fx, ArchiveMode::Eager).classify(&node).unwrap(),
            DeletePath::EagerArchive
        );
        assert_eq!(
            interceptor(&fx, ArchiveMode::Lazy).classify(&node).unwrap(),
            DeletePath::LazyArchive
        );
    }

    #[test]
    fn missing_node_deletes_as_false() {
        let fx = fixture();
        let svc = interceptor(&fx, ArchiveMode::Lazy);
        let ghost = NodeRef::new(workspace(), "ghost");
        let mut txn = Txn::default();
        assert!(!svc
            .delete(&AuthContext::user("alice"), &mut txn, &ghost)
            .unwrap());
        assert!(txn.deferred().is_empty());
    }

    #[test]
    fn lazy_delete_tags_renames_and_defers() {
        let fx = fixture();
        let alice = AuthContext::user("alice");
        let node = create_doc(&fx, &alice, "doc");
        let svc = interceptor(&fx, ArchiveMode::Lazy);

        let mut txn = Txn::default();
        assert!(svc.delete(&alice, &mut txn, &node).unwrap());

        // Physically still present, logically deleted.
        assert!(fx.engine.exists(&node));
        assert!(fx
            .engine
            .has_aspect(&node, &ASPECT_PENDING_DELETE)
            .unwrap());
        let name = fx
            .engine
            .get_property(&node, &PROP_NAME)
            .unwrap()
            .unwrap();
        assert_ne!(name.as_text(), Some("doc"));
        let original = fx
            .engine
            .get_property(&node, &PROP_PENDING_DELETE_ORIGINAL_NAME)
            .unwrap()
            .unwrap();
        assert_eq!(original.as_text(), Some("doc"));
        let requested_by = fx
            .engine
            .get_property(&node, &PROP_PENDING_DELETE_REQUESTED_BY)
            .unwrap()
            .unwrap();
        assert_eq!(requested_by.as_text(), Some("alice"));

        assert_eq!(txn.deferred(), &[DeferredDelete { node: node.clone() }]);
    }

    #[test]
    fn repeated_lazy_delete_keeps_the_recorded_name() {
        let fx = fixture();
        let alice = AuthContext::user("alice");
        let node = create_doc(&fx, &alice, "doc");
        let svc = interceptor(&fx, ArchiveMode::Lazy);

        let mut txn = Txn::default();
        svc.delete(&alice, &mut txn, &node).unwrap();
        let renamed = fx
            .engine
            .get_property(&node, &PROP_NAME)
            .unwrap()
            .unwrap();

        // A second request must not rename again or overwrite the marker.
        svc.delete(&AuthContext::user("bob"), &mut txn, &node).unwrap();
        let name_after = fx
            .engine
            .get_property(&node, &PROP_NAME)
            .unwrap()
            .unwrap();
        assert_eq!(name_after, renamed);
        let original = fx
            .engine
            .get_property(&node, &PROP_PENDING_DELETE_ORIGINAL_NAME)
            .unwrap()
            .unwrap();
        assert_eq!(original.as_text(), Some("doc"));
        let requested_by = fx
            .engine
            .get_property(&node, &PROP_PENDING_DELETE_REQUESTED_BY)
            .unwrap()
            .unwrap();
        assert_eq!(requested_by.as_text(), Some("alice"));

        // Still a single deferred job for the node.
        assert_eq!(txn.deferred().len(), 1);
    }

    #[test]
    fn eager_delete_archives_within_the_call() {
        let fx = fixture();
        let alice = AuthContext::user("alice");
        let node = create_doc(&fx, &alice, "doc");
        let svc = interceptor(&fx, ArchiveMode::Eager);

        let mut txn = Txn::default();
        assert!(svc.delete(&alice, &mut txn, &node).unwrap());
        assert!(txn.deferred().is_empty());
        assert!(!fx.engine.exists(&node));
        assert!(fx.engine.exists(&node.in_store(&archive_store())));
    }
}

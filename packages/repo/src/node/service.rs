//! Node storage seam: the [`NodeService`] trait.
//!
//! The innermost storage layer the archive subsystem builds on. The
//! contract is deliberately narrow: node CRUD, typed properties, aspects,
//! primary-association traversal, and the two archive-aware operations
//! (`delete_node` with archival relocation, `restore_node`).
//!
//! Wrapped in `Arc<dyn NodeService>` for sharing across task boundaries.

use relic_core::{AuthContext, ChildAssocRef, NodeRef, PropertyValue, QName, StoreRef};

use crate::error::NodeError;

/// Low-level node storage with archival-aware delete and restore.
///
/// Implementations must raise `NodeError::NotFound`, `AccessDenied` and
/// `DuplicateName` by variant; restore outcome classification depends on
/// telling them apart.
pub trait NodeService: Send + Sync + 'static {
    /// Create a node under `parent` with the given association, type and
    /// initial properties. Returns the new node's reference.
    ///
    /// # Errors
    ///
    /// `NotFound` if the parent does not exist, `AccessDenied` if the user
    /// may not write to the parent, `DuplicateName` on a `cm:name` clash.
    #[allow(clippy::too_many_arguments)]
    fn create_node(
        &self,
        auth: &AuthContext,
        parent: &NodeRef,
        assoc_type: &QName,
        assoc_name: &QName,
        node_type: &QName,
        props: Vec<(QName, PropertyValue)>,
    ) -> Result<NodeRef, NodeError>;

    /// Delete a node and its primary subtree. Returns `true` if the node
    /// existed and was removed.
    ///
    /// When the node's store has an archive mapping and the node's type is
    /// archivable (and it does not carry `sys:temporary`), the engine
    /// relocates the subtree into the archive store instead of destroying
    /// it, recording the original parent association, owner, archiver and
    /// archival time on the top node.
    ///
    /// # Errors
    ///
    /// `AccessDenied` if the user may not delete the node.
    fn delete_node(&self, auth: &AuthContext, node: &NodeRef) -> Result<bool, NodeError>;

    /// Whether a node physically exists at the reference.
    fn exists(&self, node: &NodeRef) -> bool;

    /// Read a property value.
    ///
    /// # Errors
    ///
    /// `NotFound` if the node does not exist.
    fn get_property(
        &self,
        node: &NodeRef,
        key: &QName,
    ) -> Result<Option<PropertyValue>, NodeError>;

    /// Set a property value.
    ///
    /// # Errors
    ///
    /// `NotFound` if the node does not exist.
    fn set_property(
        &self,
        node: &NodeRef,
        key: &QName,
        value: PropertyValue,
    ) -> Result<(), NodeError>;

    /// Remove a property, if present.
    ///
    /// # Errors
    ///
    /// `NotFound` if the node does not exist.
    fn remove_property(&self, node: &NodeRef, key: &QName) -> Result<(), NodeError>;

    /// Attach an aspect with optional properties.
    ///
    /// # Errors
    ///
    /// `NotFound` if the node does not exist.
    fn add_aspect(
        &self,
        node: &NodeRef,
        aspect: &QName,
        props: Vec<(QName, PropertyValue)>,
    ) -> Result<(), NodeError>;

    /// Detach an aspect. A missing aspect is a no-op.
    ///
    /// # Errors
    ///
    /// `NotFound` if the node does not exist.
    fn remove_aspect(&self, node: &NodeRef, aspect: &QName) -> Result<(), NodeError>;

    /// Whether the node carries the aspect.
    ///
    /// # Errors
    ///
    /// `NotFound` if the node does not exist.
    fn has_aspect(&self, node: &NodeRef, aspect: &QName) -> Result<bool, NodeError>;

    /// Child associations of the node, optionally restricted to primary
    /// associations.
    ///
    /// # Errors
    ///
    /// `NotFound` if the node does not exist.
    fn get_child_assocs(
        &self,
        node: &NodeRef,
        primary_only: bool,
    ) -> Result<Vec<ChildAssocRef>, NodeError>;

    /// The node's primary parent association.
    ///
    /// # Errors
    ///
    /// `NotFound` if the node does not exist; `IntegrityViolation` for a
    /// root node (roots have no parent).
    fn get_primary_parent(&self, node: &NodeRef) -> Result<ChildAssocRef, NodeError>;

    /// Re-materialize an archived node into a primary store.
    ///
    /// With no explicit destination, the node returns to the parent
    /// association recorded at archival time. Returns the restored node's
    /// live reference.
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing archived node or destination parent (the
    /// offending reference is carried in the variant), `AccessDenied` if
    /// the user may not write to the destination, `DuplicateName` on a name
    /// clash at the destination, `IntegrityViolation` if the node is not an
    /// archived top-level node.
    fn restore_node(
        &self,
        auth: &AuthContext,
        archived: &NodeRef,
        dest_parent: Option<&NodeRef>,
        assoc_type: Option<&QName>,
        assoc_name: Option<&QName>,
    ) -> Result<NodeRef, NodeError>;

    /// Root node of a store.
    ///
    /// # Errors
    ///
    /// `InvalidStore` if the store does not exist.
    fn get_root_node(&self, store: &StoreRef) -> Result<NodeRef, NodeError>;

    /// The node's type.
    ///
    /// # Errors
    ///
    /// `NotFound` if the node does not exist.
    fn node_type(&self, node: &NodeRef) -> Result<QName, NodeError>;
}

/// Type-dictionary seam: whether a node type participates in archival.
///
/// Separate from [`NodeService`] because the delete interceptor consults it
/// before deciding whether deletion routes through the archive at all.
pub trait TypeDictionary: Send + Sync + 'static {
    /// Whether nodes of this type are archived on delete. Unknown types are
    /// not archivable.
    fn is_archivable(&self, node_type: &QName) -> bool;
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    /// Verifies `Arc<dyn NodeService>` compiles (object safety).
    #[test]
    fn node_service_is_object_safe() {
        fn _assert_object_safe(_: &Arc<dyn NodeService>) {}
    }

    /// Verifies `Arc<dyn TypeDictionary>` compiles (object safety).
    #[test]
    fn type_dictionary_is_object_safe() {
        fn _assert_object_safe(_: &Arc<dyn TypeDictionary>) {}
    }
}

//! In-memory [`NodeService`] implementation.
//!
//! Backed by a single table of node entries keyed by [`NodeRef`], guarded
//! by a `parking_lot::RwLock` so that multi-node structural mutations
//! (subtree moves, reparenting) are atomic with respect to readers.
//! Suitable for development and testing; the archival behavior matches
//! what a production engine performs inside one delete call.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::RwLock;
use relic_core::model::{
    ASPECT_ARCHIVED, ASPECT_TEMPORARY, ASSOC_CHILDREN, ASSOC_NAME_ARCHIVED_ITEM, PROP_ARCHIVED_BY,
    PROP_ARCHIVED_DATE, PROP_ARCHIVED_ORIGINAL_OWNER, PROP_ARCHIVED_ORIGINAL_PARENT_ASSOC,
    PROP_CREATOR, PROP_NAME, PROP_OWNER,
};
use relic_core::{AuthContext, ChildAssocRef, NodeRef, PropertyValue, QName, StoreRef};
use tracing::warn;
use uuid::Uuid;

use crate::archive::StoreArchiveMap;
use crate::error::NodeError;
use crate::node::service::{NodeService, TypeDictionary};

/// A stored node: type, aspects, typed properties, and its primary place in
/// the tree.
#[derive(Debug, Clone)]
struct NodeEntry {
    node_type: QName,
    aspects: HashSet<QName>,
    props: HashMap<QName, PropertyValue>,
    /// Primary parent association; `None` only for store roots.
    parent_assoc: Option<ChildAssocRef>,
    /// Child associations where this node is the parent.
    children: Vec<ChildAssocRef>,
}

/// Node and root tables, mutated together under one lock.
#[derive(Debug, Default)]
struct Tables {
    nodes: HashMap<NodeRef, NodeEntry>,
    roots: HashMap<StoreRef, NodeRef>,
}

/// In-memory node storage with archival-on-delete.
///
/// Deleting a node whose type is archivable, whose store has an archive
/// mapping, and which does not carry `sys:temporary`, relocates its primary
/// subtree into the archive store under the same node ids, recording the
/// original parent association, owner, archiver and archival time. A stale
/// archive entry under a reused id is displaced, not an error.
pub struct MemoryNodeService {
    tables: RwLock<Tables>,
    /// Node types registered archivable. Unknown types are not archivable.
    archivable_types: RwLock<HashSet<QName>>,
    /// Per-user write denials, enough to exercise permission outcomes.
    denied_writes: RwLock<HashSet<(String, NodeRef)>>,
    store_map: Arc<StoreArchiveMap>,
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

impl MemoryNodeService {
    /// Creates an empty engine consulting the given store-archive map.
    #[must_use]
    pub fn new(store_map: Arc<StoreArchiveMap>) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            archivable_types: RwLock::new(HashSet::new()),
            denied_writes: RwLock::new(HashSet::new()),
            store_map,
        }
    }

    /// Creates a store and its root node, returning the root reference.
    /// Creating an existing store returns its current root.
    pub fn create_store(&self, store: &StoreRef) -> NodeRef {
        let mut tables = self.tables.write();
        if let Some(root) = tables.roots.get(store) {
            return root.clone();
        }
        let root = NodeRef::new(store.clone(), Uuid::new_v4().simple().to_string());
        tables.nodes.insert(
            root.clone(),
            NodeEntry {
                node_type: QName::new("sys", "storeRoot"),
                aspects: HashSet::new(),
                props: HashMap::new(),
                parent_assoc: None,
                children: Vec::new(),
            },
        );
        tables.roots.insert(store.clone(), root.clone());
        root
    }

    /// Registers a node type as archivable.
    pub fn register_archivable_type(&self, node_type: QName) {
        self.archivable_types.write().insert(node_type);
    }

    /// Denies a user write access to a node.
    pub fn deny_write(&self, user: impl Into<String>, node: NodeRef) {
        self.denied_writes.write().insert((user.into(), node));
    }

    /// Creates a node under an explicit, caller-chosen id. Used by import
    /// tooling that must preserve identifiers; ordinary creation goes
    /// through [`NodeService::create_node`].
    ///
    /// # Errors
    ///
    /// Same contract as [`NodeService::create_node`], plus
    /// `IntegrityViolation` if the id is already taken in the store.
    #[allow(clippy::too_many_arguments)]
    pub fn create_node_with_id(
        &self,
        auth: &AuthContext,
        parent: &NodeRef,
        assoc_type: &QName,
        assoc_name: &QName,
        node_type: &QName,
        id: &str,
        props: Vec<(QName, PropertyValue)>,
    ) -> Result<NodeRef, NodeError> {
        self.check_write(auth, parent)?;
        let mut tables = self.tables.write();
        if !tables.nodes.contains_key(parent) {
            return Err(NodeError::NotFound(parent.clone()));
        }
        let node = NodeRef::new(parent.store.clone(), id);
        if tables.nodes.contains_key(&node) {
            return Err(NodeError::IntegrityViolation(format!(
                "node id already in use: {node}"
            )));
        }
        let props: HashMap<QName, PropertyValue> = props.into_iter().collect();
        let name = props.get(&PROP_NAME).and_then(|v| v.as_text());
        Self::check_duplicate_name(&tables, parent, name)?;
        Self::insert_child(&mut tables, auth, parent, assoc_type, assoc_name, node_type, node, props)
    }

    #[allow(clippy::too_many_arguments)]
    fn insert_child(
        tables: &mut Tables,
        auth: &AuthContext,
        parent: &NodeRef,
        assoc_type: &QName,
        assoc_name: &QName,
        node_type: &QName,
        node: NodeRef,
        mut props: HashMap<QName, PropertyValue>,
    ) -> Result<NodeRef, NodeError> {
        let assoc = ChildAssocRef {
            assoc_type: assoc_type.clone(),
            parent: parent.clone(),
            assoc_name: assoc_name.clone(),
            child: node.clone(),
            is_primary: true,
        };
        props
            .entry(PROP_CREATOR.clone())
            .or_insert_with(|| PropertyValue::Text(auth.user.clone()));
        tables.nodes.insert(
            node.clone(),
            NodeEntry {
                node_type: node_type.clone(),
                aspects: HashSet::new(),
                props,
                parent_assoc: Some(assoc.clone()),
                children: Vec::new(),
            },
        );
        if let Some(parent_entry) = tables.nodes.get_mut(parent) {
            parent_entry.children.push(assoc);
        }
        Ok(node)
    }

    fn check_write(&self, auth: &AuthContext, node: &NodeRef) -> Result<(), NodeError> {
        if auth.is_system {
            return Ok(());
        }
        let denied = self.denied_writes.read();
        if denied.contains(&(auth.user.clone(), node.clone())) {
            return Err(NodeError::AccessDenied {
                user: auth.user.clone(),
                node: node.clone(),
            });
        }
        Ok(())
    }

    fn entry_name(entry: &NodeEntry) -> Option<String> {
        entry
            .props
            .get(&PROP_NAME)
            .and_then(|v| v.as_text().map(str::to_string))
    }

    fn check_duplicate_name(
        tables: &Tables,
        parent: &NodeRef,
        name: Option<&str>,
    ) -> Result<(), NodeError> {
        let Some(name) = name else { return Ok(()) };
        let Some(parent_entry) = tables.nodes.get(parent) else {
            return Ok(());
        };
        for assoc in &parent_entry.children {
            if let Some(child_entry) = tables.nodes.get(&assoc.child) {
                if Self::entry_name(child_entry).as_deref() == Some(name) {
                    return Err(NodeError::DuplicateName {
                        parent: parent.clone(),
                        name: name.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Collects the primary subtree rooted at `top`, parents before
    /// children. Cycles are broken by the visited set.
    fn primary_subtree(tables: &Tables, top: &NodeRef) -> Vec<NodeRef> {
        let mut ordered = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![top.clone()];
        while let Some(node) = stack.pop() {
            if !visited.insert(node.clone()) {
                warn!(node = %node, "circular primary hierarchy");
                continue;
            }
            if let Some(entry) = tables.nodes.get(&node) {
                for assoc in &entry.children {
                    if assoc.is_primary {
                        stack.push(assoc.child.clone());
                    }
                }
            }
            ordered.push(node);
        }
        ordered
    }

    /// Removes the primary subtree rooted at `top` from the tables,
    /// detaching the top node from its parent.
    fn hard_delete_subtree(tables: &mut Tables, top: &NodeRef) {
        Self::detach_from_parent(tables, top);
        for node in Self::primary_subtree(tables, top) {
            tables.nodes.remove(&node);
        }
    }

    fn detach_from_parent(tables: &mut Tables, node: &NodeRef) {
        let parent = tables
            .nodes
            .get(node)
            .and_then(|e| e.parent_assoc.as_ref())
            .map(|a| a.parent.clone());
        if let Some(parent) = parent {
            if let Some(parent_entry) = tables.nodes.get_mut(&parent) {
                parent_entry.children.retain(|a| a.child != *node);
            }
        }
    }

    /// Re-keys the primary subtree rooted at `top` into `target_store`,
    /// keeping node ids. Any node already present at a target reference is
    /// displaced along with its subtree. Returns the top node's new
    /// reference. The caller attaches the top node to its new parent.
    fn move_subtree(tables: &mut Tables, top: &NodeRef, target_store: &StoreRef) -> NodeRef {
        let members = Self::primary_subtree(tables, top);
        let member_set: HashSet<NodeRef> = members.iter().cloned().collect();

        for node in &members {
            let target = node.in_store(target_store);
            if tables.nodes.contains_key(&target) {
                warn!(node = %target, "displacing stale entry for reused node id");
                Self::hard_delete_subtree(tables, &target);
            }
        }

        for node in &members {
            let target = node.in_store(target_store);
            let Some(mut entry) = tables.nodes.remove(node) else {
                continue;
            };
            // Rewrite intra-subtree references to the target store.
            if let Some(assoc) = entry.parent_assoc.as_mut() {
                assoc.child = assoc.child.in_store(target_store);
                if member_set.contains(&assoc.parent) {
                    assoc.parent = assoc.parent.in_store(target_store);
                }
            }
            for assoc in &mut entry.children {
                assoc.parent = assoc.parent.in_store(target_store);
                if member_set.contains(&assoc.child) {
                    assoc.child = assoc.child.in_store(target_store);
                }
            }
            tables.nodes.insert(target, entry);
        }

        top.in_store(target_store)
    }

    /// Archival half of [`NodeService::delete_node`]: records provenance
    /// on the top node and parks its subtree under the archive store root.
    fn archive_node(
        tables: &mut Tables,
        auth: &AuthContext,
        node: &NodeRef,
        archive_store: &StoreRef,
    ) -> Result<(), NodeError> {
        let archive_root = tables
            .roots
            .get(archive_store)
            .cloned()
            .ok_or_else(|| NodeError::InvalidStore(archive_store.clone()))?;

        let entry = tables
            .nodes
            .get_mut(node)
            .ok_or_else(|| NodeError::NotFound(node.clone()))?;
        let parent_assoc = entry.parent_assoc.clone().ok_or_else(|| {
            NodeError::IntegrityViolation(format!("store root cannot be archived: {node}"))
        })?;

        entry.aspects.insert(ASPECT_ARCHIVED.clone());
        entry
            .props
            .insert(PROP_ARCHIVED_BY.clone(), PropertyValue::Text(auth.user.clone()));
        entry
            .props
            .insert(PROP_ARCHIVED_DATE.clone(), PropertyValue::Timestamp(now_ms()));
        entry.props.insert(
            PROP_ARCHIVED_ORIGINAL_PARENT_ASSOC.clone(),
            PropertyValue::ChildAssoc(parent_assoc),
        );
        let original_owner = entry
            .props
            .get(&PROP_OWNER)
            .or_else(|| entry.props.get(&PROP_CREATOR))
            .cloned();
        if let Some(owner) = original_owner {
            entry
                .props
                .insert(PROP_ARCHIVED_ORIGINAL_OWNER.clone(), owner);
        }
        entry
            .props
            .insert(PROP_OWNER.clone(), PropertyValue::Text(auth.user.clone()));

        Self::detach_from_parent(tables, node);
        let archived = Self::move_subtree(tables, node, archive_store);

        let assoc = ChildAssocRef {
            assoc_type: ASSOC_CHILDREN.clone(),
            parent: archive_root.clone(),
            assoc_name: ASSOC_NAME_ARCHIVED_ITEM.clone(),
            child: archived.clone(),
            is_primary: true,
        };
        if let Some(archived_entry) = tables.nodes.get_mut(&archived) {
            archived_entry.parent_assoc = Some(assoc.clone());
        }
        if let Some(root_entry) = tables.nodes.get_mut(&archive_root) {
            root_entry.children.push(assoc);
        }
        Ok(())
    }

    fn should_archive(&self, tables: &Tables, node: &NodeRef) -> Option<StoreRef> {
        let entry = tables.nodes.get(node)?;
        if entry.aspects.contains(&ASPECT_TEMPORARY) {
            return None;
        }
        if !self.archivable_types.read().contains(&entry.node_type) {
            return None;
        }
        self.store_map.archive_store(&node.store)
    }
}

impl NodeService for MemoryNodeService {
    fn create_node(
        &self,
        auth: &AuthContext,
        parent: &NodeRef,
        assoc_type: &QName,
        assoc_name: &QName,
        node_type: &QName,
        props: Vec<(QName, PropertyValue)>,
    ) -> Result<NodeRef, NodeError> {
        self.check_write(auth, parent)?;
        let mut tables = self.tables.write();
        if !tables.nodes.contains_key(parent) {
            return Err(NodeError::NotFound(parent.clone()));
        }
        let props: HashMap<QName, PropertyValue> = props.into_iter().collect();
        let name = props.get(&PROP_NAME).and_then(|v| v.as_text());
        Self::check_duplicate_name(&tables, parent, name)?;

        let node = NodeRef::new(parent.store.clone(), Uuid::new_v4().simple().to_string());
        Self::insert_child(&mut tables, auth, parent, assoc_type, assoc_name, node_type, node, props)
    }

    fn delete_node(&self, auth: &AuthContext, node: &NodeRef) -> Result<bool, NodeError> {
        self.check_write(auth, node)?;
        let mut tables = self.tables.write();
        if !tables.nodes.contains_key(node) {
            return Ok(false);
        }
        match self.should_archive(&tables, node) {
            Some(archive_store) => {
                Self::archive_node(&mut tables, auth, node, &archive_store)?;
            }
            None => {
                Self::hard_delete_subtree(&mut tables, node);
            }
        }
        Ok(true)
    }

    fn exists(&self, node: &NodeRef) -> bool {
        self.tables.read().nodes.contains_key(node)
    }

    fn get_property(
        &self,
        node: &NodeRef,
        key: &QName,
    ) -> Result<Option<PropertyValue>, NodeError> {
        let tables = self.tables.read();
        let entry = tables
            .nodes
            .get(node)
            .ok_or_else(|| NodeError::NotFound(node.clone()))?;
        Ok(entry.props.get(key).cloned())
    }

    fn set_property(
        &self,
        node: &NodeRef,
        key: &QName,
        value: PropertyValue,
    ) -> Result<(), NodeError> {
        let mut tables = self.tables.write();
        let entry = tables
            .nodes
            .get_mut(node)
            .ok_or_else(|| NodeError::NotFound(node.clone()))?;
        entry.props.insert(key.clone(), value);
        Ok(())
    }

    fn remove_property(&self, node: &NodeRef, key: &QName) -> Result<(), NodeError> {
        let mut tables = self.tables.write();
        let entry = tables
            .nodes
            .get_mut(node)
            .ok_or_else(|| NodeError::NotFound(node.clone()))?;
        entry.props.remove(key);
        Ok(())
    }

    fn add_aspect(
        &self,
        node: &NodeRef,
        aspect: &QName,
        props: Vec<(QName, PropertyValue)>,
    ) -> Result<(), NodeError> {
        let mut tables = self.tables.write();
        let entry = tables
            .nodes
            .get_mut(node)
            .ok_or_else(|| NodeError::NotFound(node.clone()))?;
        entry.aspects.insert(aspect.clone());
        entry.props.extend(props);
        Ok(())
    }

    fn remove_aspect(&self, node: &NodeRef, aspect: &QName) -> Result<(), NodeError> {
        let mut tables = self.tables.write();
        let entry = tables
            .nodes
            .get_mut(node)
            .ok_or_else(|| NodeError::NotFound(node.clone()))?;
        entry.aspects.remove(aspect);
        Ok(())
    }

    fn has_aspect(&self, node: &NodeRef, aspect: &QName) -> Result<bool, NodeError> {
        let tables = self.tables.read();
        let entry = tables
            .nodes
            .get(node)
            .ok_or_else(|| NodeError::NotFound(node.clone()))?;
        Ok(entry.aspects.contains(aspect))
    }

    fn get_child_assocs(
        &self,
        node: &NodeRef,
        primary_only: bool,
    ) -> Result<Vec<ChildAssocRef>, NodeError> {
        let tables = self.tables.read();
        let entry = tables
            .nodes
            .get(node)
            .ok_or_else(|| NodeError::NotFound(node.clone()))?;
        Ok(entry
            .children
            .iter()
            .filter(|a| !primary_only || a.is_primary)
            .cloned()
            .collect())
    }

    fn get_primary_parent(&self, node: &NodeRef) -> Result<ChildAssocRef, NodeError> {
        let tables = self.tables.read();
        let entry = tables
            .nodes
            .get(node)
            .ok_or_else(|| NodeError::NotFound(node.clone()))?;
        entry.parent_assoc.clone().ok_or_else(|| {
            NodeError::IntegrityViolation(format!("store root has no parent: {node}"))
        })
    }

    fn restore_node(
        &self,
        auth: &AuthContext,
        archived: &NodeRef,
        dest_parent: Option<&NodeRef>,
        assoc_type: Option<&QName>,
        assoc_name: Option<&QName>,
    ) -> Result<NodeRef, NodeError> {
        let mut tables = self.tables.write();
        let entry = tables
            .nodes
            .get(archived)
            .ok_or_else(|| NodeError::NotFound(archived.clone()))?;
        if !entry.aspects.contains(&ASPECT_ARCHIVED) {
            return Err(NodeError::IntegrityViolation(format!(
                "not a top-level archived node: {archived}"
            )));
        }
        let original = entry
            .props
            .get(&PROP_ARCHIVED_ORIGINAL_PARENT_ASSOC)
            .and_then(PropertyValue::as_child_assoc)
            .cloned()
            .ok_or_else(|| {
                NodeError::IntegrityViolation(format!(
                    "archived node has no recorded original parent: {archived}"
                ))
            })?;
        let name = Self::entry_name(entry);

        let target_parent = dest_parent.cloned().unwrap_or_else(|| original.parent.clone());
        if !tables.nodes.contains_key(&target_parent) {
            return Err(NodeError::NotFound(target_parent));
        }
        self.check_write(auth, &target_parent)?;
        Self::check_duplicate_name(&tables, &target_parent, name.as_deref())?;

        // Strip the archival record and restore ownership.
        let entry = tables
            .nodes
            .get_mut(archived)
            .ok_or_else(|| NodeError::NotFound(archived.clone()))?;
        entry.aspects.remove(&ASPECT_ARCHIVED);
        entry.props.remove(&PROP_ARCHIVED_BY);
        entry.props.remove(&PROP_ARCHIVED_DATE);
        entry.props.remove(&PROP_ARCHIVED_ORIGINAL_PARENT_ASSOC);
        if let Some(owner) = entry.props.remove(&PROP_ARCHIVED_ORIGINAL_OWNER) {
            entry.props.insert(PROP_OWNER.clone(), owner);
        }

        Self::detach_from_parent(&mut tables, archived);
        let restored = Self::move_subtree(&mut tables, archived, &target_parent.store);

        let assoc = ChildAssocRef {
            assoc_type: assoc_type.cloned().unwrap_or(original.assoc_type),
            parent: target_parent.clone(),
            assoc_name: assoc_name.cloned().unwrap_or(original.assoc_name),
            child: restored.clone(),
            is_primary: true,
        };
        if let Some(restored_entry) = tables.nodes.get_mut(&restored) {
            restored_entry.parent_assoc = Some(assoc.clone());
        }
        if let Some(parent_entry) = tables.nodes.get_mut(&target_parent) {
            parent_entry.children.push(assoc);
        }
        Ok(restored)
    }

    fn get_root_node(&self, store: &StoreRef) -> Result<NodeRef, NodeError> {
        self.tables
            .read()
            .roots
            .get(store)
            .cloned()
            .ok_or_else(|| NodeError::InvalidStore(store.clone()))
    }

    fn node_type(&self, node: &NodeRef) -> Result<QName, NodeError> {
        let tables = self.tables.read();
        let entry = tables
            .nodes
            .get(node)
            .ok_or_else(|| NodeError::NotFound(node.clone()))?;
        Ok(entry.node_type.clone())
    }
}

impl TypeDictionary for MemoryNodeService {
    fn is_archivable(&self, node_type: &QName) -> bool {
        self.archivable_types.read().contains(node_type)
    }
}

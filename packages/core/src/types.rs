use std::fmt;

use serde::{Deserialize, Serialize};

/// Reference to a node store: a protocol plus an identifier, e.g.
/// `workspace://SpacesStore` or `archive://SpacesStore`.
///
/// Stores partition the node space; archival moves a node between stores
/// while keeping its identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StoreRef {
    /// Store protocol, e.g. `workspace` or `archive`.
    pub protocol: String,
    /// Store identifier within the protocol, e.g. `SpacesStore`.
    pub identifier: String,
}

impl StoreRef {
    /// Creates a store reference from protocol and identifier.
    #[must_use]
    pub fn new(protocol: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
            identifier: identifier.into(),
        }
    }
}

impl fmt::Display for StoreRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.protocol, self.identifier)
    }
}

/// Opaque reference to a node: a store plus a node identifier.
///
/// Two `NodeRef`s with the same store and id are interchangeable, even
/// across process restarts. Archival preserves the id and swaps the store,
/// so a node's archived counterpart differs only in `store`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeRef {
    /// The store containing the node.
    pub store: StoreRef,
    /// Store-unique node identifier.
    pub id: String,
}

impl NodeRef {
    /// Creates a node reference.
    #[must_use]
    pub fn new(store: StoreRef, id: impl Into<String>) -> Self {
        Self {
            store,
            id: id.into(),
        }
    }

    /// Returns the same node id relocated to another store.
    #[must_use]
    pub fn in_store(&self, store: &StoreRef) -> Self {
        Self {
            store: store.clone(),
            id: self.id.clone(),
        }
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.store, self.id)
    }
}

/// Namespace-qualified name for node types, aspects, properties and
/// association names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QName {
    /// Namespace prefix, e.g. `sys` or `cm`.
    pub namespace: String,
    /// Local name within the namespace.
    pub local: String,
}

impl QName {
    /// Creates a qualified name.
    #[must_use]
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local: local.into(),
        }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.local)
    }
}

/// Typed property value attached to a node.
///
/// Covers the value kinds the archive subsystem reads and writes; node and
/// child-association values carry the structured references needed to
/// record a node's original location at archival time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    /// UTF-8 text.
    Text(String),
    /// Boolean flag.
    Bool(bool),
    /// Signed 64-bit integer.
    Int(i64),
    /// Milliseconds since the Unix epoch.
    Timestamp(i64),
    /// Reference to another node.
    Node(NodeRef),
    /// A child-association reference (used for the recorded original
    /// parent association of an archived node).
    ChildAssoc(ChildAssocRef),
}

impl PropertyValue {
    /// Returns the text payload, or `None` for non-text values.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the child-association payload, or `None` otherwise.
    #[must_use]
    pub fn as_child_assoc(&self) -> Option<&ChildAssocRef> {
        match self {
            Self::ChildAssoc(assoc) => Some(assoc),
            _ => None,
        }
    }
}

/// A parent-child association between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChildAssocRef {
    /// Association type, e.g. `cm:contains`.
    pub assoc_type: QName,
    /// The parent node.
    pub parent: NodeRef,
    /// Qualified name of this particular association.
    pub assoc_name: QName,
    /// The child node.
    pub child: NodeRef,
    /// Whether this is the child's primary (defining) association.
    pub is_primary: bool,
}

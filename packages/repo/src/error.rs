//! Error taxonomies for the repository and archive subsystem.
//!
//! Three layers, matching how failures are consumed:
//! - [`NodeError`]: storage-engine outcomes, variant-distinguishable so the
//!   restore path can classify them into report statuses.
//! - [`LockError`]: lease contention and loss, surfaced as fail-fast signals.
//! - [`ArchiveError`]: the archive service's caller-facing errors.

use relic_core::{NodeRef, StoreRef};

/// Errors raised by a [`NodeService`](crate::node::NodeService)
/// implementation.
///
/// Variants are part of the storage contract: `NotFound`, `AccessDenied`
/// and `DuplicateName` must stay distinguishable because restore outcome
/// classification dispatches on them.
#[derive(Debug, Clone, thiserror::Error)]
pub enum NodeError {
    /// The referenced node does not exist.
    #[error("node not found: {0}")]
    NotFound(NodeRef),

    /// The user lacks the required access to the node.
    #[error("access denied for user '{user}' on {node}")]
    AccessDenied {
        /// User whose access was denied.
        user: String,
        /// Node the access applied to.
        node: NodeRef,
    },

    /// A sibling with the same name already exists under the parent.
    #[error("duplicate child name '{name}' under {parent}")]
    DuplicateName {
        /// Parent node of the collision.
        parent: NodeRef,
        /// The colliding name.
        name: String,
    },

    /// The referenced store does not exist.
    #[error("invalid store: {0}")]
    InvalidStore(StoreRef),

    /// A structural or consistency check failed.
    #[error("integrity violation: {0}")]
    IntegrityViolation(String),

    /// A transient conflict that the transaction retry policy may resolve.
    #[error("transient conflict: {0}")]
    TransientConflict(String),
}

impl NodeError {
    /// Whether the transaction runner should retry the whole unit of work.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientConflict(_))
    }
}

/// Errors from the lock lease manager.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LockError {
    /// The resource is already leased to another holder.
    #[error("lock busy: {resource}")]
    Busy {
        /// Name of the contested resource.
        resource: String,
    },

    /// The caller's lease no longer exists or is held by someone else.
    #[error("lock lost: {resource}")]
    Lost {
        /// Name of the resource the lease was for.
        resource: String,
    },
}

/// Caller-facing errors of the archive service and its bulk operations.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// Another bulk archive operation is already in progress.
    #[error("bulk archive operation already in progress for '{resource}'")]
    Busy {
        /// The contested lock resource.
        resource: String,
    },

    /// A storage-engine failure that is not captured in a restore report.
    #[error(transparent)]
    Node(#[from] NodeError),

    /// The store has no archive mapping, so the operation cannot apply.
    #[error("store has no archive mapping: {0}")]
    NotArchivable(StoreRef),

    /// Background machinery failure (worker pool stopped, task join).
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use relic_core::StoreRef;

    use super::*;

    fn node(id: &str) -> NodeRef {
        NodeRef::new(StoreRef::new("workspace", "SpacesStore"), id)
    }

    #[test]
    fn only_transient_conflict_is_retryable() {
        assert!(NodeError::TransientConflict("write skew".into()).is_retryable());
        assert!(!NodeError::NotFound(node("a")).is_retryable());
        assert!(!NodeError::AccessDenied {
            user: "alice".into(),
            node: node("a"),
        }
        .is_retryable());
    }

    #[test]
    fn display_carries_the_reference() {
        let err = NodeError::NotFound(node("n-1"));
        assert!(err.to_string().contains("workspace://SpacesStore/n-1"));
    }

    #[test]
    fn archive_error_wraps_node_error() {
        let err: ArchiveError = NodeError::NotFound(node("x")).into();
        assert!(matches!(err, ArchiveError::Node(NodeError::NotFound(_))));
    }
}

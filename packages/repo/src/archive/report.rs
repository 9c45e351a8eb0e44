//! Per-attempt restore outcome reporting.

use relic_core::NodeRef;
use serde::Serialize;

use crate::error::NodeError;

/// Outcome of one restore attempt.
///
/// Everything except `FailureOther` is an expected business outcome;
/// `FailureOther` marks a programming or environmental fault and is the
/// only status logged at error severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RestoreStatus {
    /// The node was restored; the report carries its live reference.
    Success,
    /// The archived node itself does not exist.
    FailureInvalidArchiveNode,
    /// The explicit or recorded destination parent does not exist.
    FailureInvalidParent,
    /// The caller lacks write access to the destination.
    FailurePermission,
    /// A post-restore structural or consistency check failed.
    FailureIntegrity,
    /// Any other, unclassified failure.
    FailureOther,
}

impl RestoreStatus {
    /// Whether the attempt restored the node.
    #[must_use]
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

/// Record of one restore attempt: what was asked, what happened.
///
/// Created at the start of the attempt, mutated only by the attempt
/// itself, and handed to the caller as an immutable record.
#[derive(Debug, Clone, Serialize)]
pub struct RestoreReport {
    /// The archived node the restore was requested for.
    pub archived_node: NodeRef,
    /// Explicit destination parent, if one was supplied.
    pub target_parent: Option<NodeRef>,
    /// The restored node's live reference, set on success.
    pub restored_node: Option<NodeRef>,
    /// Outcome classification.
    pub status: RestoreStatus,
    /// The captured failure, for every non-success status.
    #[serde(skip)]
    pub cause: Option<NodeError>,
}

impl RestoreReport {
    /// Starts a report for an attempt on `archived_node`.
    #[must_use]
    pub fn new(archived_node: NodeRef, target_parent: Option<NodeRef>) -> Self {
        Self {
            archived_node,
            target_parent,
            restored_node: None,
            status: RestoreStatus::FailureOther,
            cause: None,
        }
    }

    /// Marks the attempt successful.
    #[must_use]
    pub fn succeeded(mut self, restored: NodeRef) -> Self {
        self.restored_node = Some(restored);
        self.status = RestoreStatus::Success;
        self.cause = None;
        self
    }

    /// Marks the attempt failed with a classified status and its cause.
    #[must_use]
    pub fn failed(mut self, status: RestoreStatus, cause: NodeError) -> Self {
        self.restored_node = None;
        self.status = status;
        self.cause = Some(cause);
        self
    }
}

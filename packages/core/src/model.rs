//! Content-model constants used by the archive subsystem.
//!
//! Qualified names for the aspects, properties and association types that
//! drive archival: the `sys:archived` state recorded on an archived node,
//! the transient `sys:pendingDelete` marker carried between a lazy delete
//! request and its background completion, and the `sys:temporary` opt-out.

use std::sync::LazyLock;

use crate::types::QName;

/// Marks a node that has been moved into an archive store.
pub static ASPECT_ARCHIVED: LazyLock<QName> = LazyLock::new(|| QName::new("sys", "archived"));

/// Transient marker carried by a node between a lazy delete request and the
/// background worker completing (or compensating) the real delete.
pub static ASPECT_PENDING_DELETE: LazyLock<QName> =
    LazyLock::new(|| QName::new("sys", "pendingDelete"));

/// Opt-out: nodes with this aspect are never archived, always hard-deleted.
pub static ASPECT_TEMPORARY: LazyLock<QName> = LazyLock::new(|| QName::new("sys", "temporary"));

/// User that requested the archival.
pub static PROP_ARCHIVED_BY: LazyLock<QName> = LazyLock::new(|| QName::new("sys", "archivedBy"));

/// Time of archival, epoch milliseconds.
pub static PROP_ARCHIVED_DATE: LazyLock<QName> =
    LazyLock::new(|| QName::new("sys", "archivedDate"));

/// The primary parent association the node held before archival; consulted
/// when restoring with no explicit destination.
pub static PROP_ARCHIVED_ORIGINAL_PARENT_ASSOC: LazyLock<QName> =
    LazyLock::new(|| QName::new("sys", "archivedOriginalParentAssoc"));

/// The owner (or creator, if unowned) the node had before archival.
pub static PROP_ARCHIVED_ORIGINAL_OWNER: LazyLock<QName> =
    LazyLock::new(|| QName::new("sys", "archivedOriginalOwner"));

/// Original `cm:name`, preserved while the node carries its transient
/// collision-avoiding rename.
pub static PROP_PENDING_DELETE_ORIGINAL_NAME: LazyLock<QName> =
    LazyLock::new(|| QName::new("sys", "pendingDeleteOriginalName"));

/// User that requested the lazy delete; the background worker re-runs the
/// real delete as this user.
pub static PROP_PENDING_DELETE_REQUESTED_BY: LazyLock<QName> =
    LazyLock::new(|| QName::new("sys", "pendingDeleteRequestedBy"));

/// Visible node name.
pub static PROP_NAME: LazyLock<QName> = LazyLock::new(|| QName::new("cm", "name"));

/// Current node owner.
pub static PROP_OWNER: LazyLock<QName> = LazyLock::new(|| QName::new("cm", "owner"));

/// Node creator, used as the fallback original owner at archival time.
pub static PROP_CREATOR: LazyLock<QName> = LazyLock::new(|| QName::new("cm", "creator"));

/// Root-level child association type.
pub static ASSOC_CHILDREN: LazyLock<QName> = LazyLock::new(|| QName::new("sys", "children"));

/// Ordinary containment association type.
pub static ASSOC_CONTAINS: LazyLock<QName> = LazyLock::new(|| QName::new("cm", "contains"));

/// Association name given to a node parked under the archive store root.
pub static ASSOC_NAME_ARCHIVED_ITEM: LazyLock<QName> =
    LazyLock::new(|| QName::new("sys", "archivedItem"));

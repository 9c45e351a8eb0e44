//! User-facing operations over archived nodes: locate, restore, purge.
//!
//! Every per-node operation runs in its own transaction via the
//! [`TransactionRunner`], and every per-node failure is classified into a
//! [`RestoreReport`] instead of aborting the caller's loop. Bulk variants
//! run under a lock lease so at most one bulk operation per store is in
//! flight at a time.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use relic_core::model::{
    ASPECT_ARCHIVED, ASSOC_NAME_ARCHIVED_ITEM, PROP_ARCHIVED_ORIGINAL_PARENT_ASSOC,
};
use relic_core::{AuthContext, NodeRef, QName, StoreRef};
use tracing::{debug, error, info, warn};

use crate::archive::batch::{
    ArchivedNodesWorkProvider, BatchProcessor, BatchResult, BatchWorker, WorkProvider,
};
use crate::archive::lock::LockLeaseManager;
use crate::archive::report::{RestoreReport, RestoreStatus};
use crate::archive::store_map::StoreArchiveMap;
use crate::config::ArchiveConfig;
use crate::error::{ArchiveError, LockError, NodeError};
use crate::node::NodeService;
use crate::txn::TransactionRunner;

/// Operations over a store's archive: location, restore, purge.
pub struct NodeArchiveService {
    engine: Arc<dyn NodeService>,
    runner: Arc<TransactionRunner>,
    store_map: Arc<StoreArchiveMap>,
    locks: Arc<LockLeaseManager>,
    batch_size: usize,
    batch_concurrency: usize,
    bulk_lock_ttl: Duration,
}

impl NodeArchiveService {
    /// Wires the service over an engine, its transaction runner, and the
    /// store-to-archive mapping.
    #[must_use]
    pub fn new(
        engine: Arc<dyn NodeService>,
        runner: Arc<TransactionRunner>,
        store_map: Arc<StoreArchiveMap>,
        locks: Arc<LockLeaseManager>,
        config: &ArchiveConfig,
    ) -> Self {
        Self {
            engine,
            runner,
            store_map,
            locks,
            batch_size: config.batch_size,
            batch_concurrency: config.batch_concurrency,
            bulk_lock_ttl: Duration::from_millis(config.bulk_lock_ttl_ms),
        }
    }

    /// Root node of the archive store mapped to `store`.
    ///
    /// # Errors
    ///
    /// `NotArchivable` if the store has no archive mapping, `Node` if the
    /// mapped archive store does not exist.
    pub fn get_archive_location(&self, store: &StoreRef) -> Result<NodeRef, ArchiveError> {
        let archive = self
            .store_map
            .archive_store(store)
            .ok_or_else(|| ArchiveError::NotArchivable(store.clone()))?;
        Ok(self.engine.get_root_node(&archive)?)
    }

    /// The archived counterpart of a live node reference, if one exists.
    ///
    /// Only same-id nodes carrying the archival record count; a node that
    /// merely reuses the id in the archive store is not a counterpart.
    #[must_use]
    pub fn get_archived_counterpart(&self, live: &NodeRef) -> Option<NodeRef> {
        let archive = self.store_map.archive_store(&live.store)?;
        let archived = live.in_store(&archive);
        match self.engine.has_aspect(&archived, &ASPECT_ARCHIVED) {
            Ok(true) => Some(archived),
            _ => None,
        }
    }

    /// Attempts to restore one archived node, into `dest_parent` if given,
    /// otherwise back to the parent recorded at archival time.
    ///
    /// Never returns an error: every outcome, including unexpected ones, is
    /// classified into the report.
    pub async fn restore_one(
        &self,
        auth: &AuthContext,
        archived: &NodeRef,
        dest_parent: Option<&NodeRef>,
        assoc_type: Option<&QName>,
        assoc_name: Option<&QName>,
    ) -> RestoreReport {
        attempt_restore(
            &self.engine,
            &self.runner,
            auth,
            archived,
            dest_parent,
            assoc_type,
            assoc_name,
        )
        .await
    }

    /// Restores a set of archived nodes, one transaction each.
    ///
    /// A failed item never stops the rest; the caller gets one report per
    /// requested node, in request order.
    pub async fn restore_many(
        &self,
        auth: &AuthContext,
        archived: &[NodeRef],
        dest_parent: Option<&NodeRef>,
    ) -> Vec<RestoreReport> {
        let mut reports = Vec::with_capacity(archived.len());
        for node in archived {
            reports.push(
                self.restore_one(auth, node, dest_parent, None, None)
                    .await,
            );
        }
        reports
    }

    /// Restores everything archived from `store`, sequentially.
    ///
    /// # Errors
    ///
    /// `NotArchivable` if the store has no archive mapping; enumeration
    /// failures surface as `Node`. Per-item failures land in the reports.
    pub async fn restore_all(
        &self,
        auth: &AuthContext,
        store: &StoreRef,
    ) -> Result<Vec<RestoreReport>, ArchiveError> {
        let items = self.archived_top_level(store)?;
        info!(store = %store, count = items.len(), "restoring all archived nodes");
        Ok(self.restore_many(auth, &items, None).await)
    }

    /// Permanently deletes one archived node. A node that is already gone
    /// counts as purged.
    ///
    /// # Errors
    ///
    /// `Node` for engine failures other than the node being absent.
    pub async fn purge_one(&self, auth: &AuthContext, archived: &NodeRef) -> Result<(), ArchiveError> {
        let engine = Arc::clone(&self.engine);
        let auth = auth.clone();
        let node = archived.clone();
        self.runner
            .run(move |_txn| purge_item(&engine, &auth, &node))
            .await?;
        Ok(())
    }

    /// Permanently deletes a set of archived nodes, one transaction each.
    /// Per-item failures are collected; the loop never aborts.
    pub async fn purge_many(&self, auth: &AuthContext, archived: &[NodeRef]) -> BatchResult {
        let mut result = BatchResult::default();
        for node in archived {
            match self.purge_one(auth, node).await {
                Ok(()) => result.succeeded += 1,
                Err(ArchiveError::Node(err)) => {
                    warn!(node = %node, error = %err, "purge failed");
                    result.failures.push((node.clone(), err));
                }
                Err(err) => {
                    warn!(node = %node, error = %err, "purge failed");
                    result
                        .failures
                        .push((node.clone(), NodeError::IntegrityViolation(err.to_string())));
                }
            }
        }
        result
    }

    /// Purges everything archived from `store`, concurrently and under the
    /// store's bulk lock.
    ///
    /// # Errors
    ///
    /// `Busy` if another bulk operation holds the store's lock,
    /// `NotArchivable` if the store has no archive mapping.
    pub async fn purge_all(
        &self,
        auth: &AuthContext,
        store: &StoreRef,
    ) -> Result<BatchResult, ArchiveError> {
        let worker = Arc::new(PurgeBatchWorker {
            engine: Arc::clone(&self.engine),
            runner: Arc::clone(&self.runner),
            auth: auth.clone(),
        });
        self.run_bulk(store, worker, "purging archive store").await
    }

    /// Restores everything archived from `store`, concurrently and under
    /// the store's bulk lock.
    ///
    /// Unlike [`restore_all`](Self::restore_all) this pages the archive and
    /// fans items out across workers; failures are summarized rather than
    /// reported per node.
    ///
    /// # Errors
    ///
    /// `Busy` if another bulk operation holds the store's lock,
    /// `NotArchivable` if the store has no archive mapping.
    pub async fn restore_all_bulk(
        &self,
        auth: &AuthContext,
        store: &StoreRef,
    ) -> Result<BatchResult, ArchiveError> {
        let worker = Arc::new(RestoreBatchWorker {
            engine: Arc::clone(&self.engine),
            runner: Arc::clone(&self.runner),
            auth: auth.clone(),
        });
        self.run_bulk(store, worker, "bulk-restoring archive store").await
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    async fn run_bulk(
        &self,
        store: &StoreRef,
        worker: Arc<dyn BatchWorker>,
        action: &str,
    ) -> Result<BatchResult, ArchiveError> {
        let archive_root = self.get_archive_location(store)?;
        let resource = bulk_resource(store);
        let token = match self.locks.acquire(&resource, self.bulk_lock_ttl) {
            Ok(token) => token,
            Err(LockError::Busy { resource } | LockError::Lost { resource }) => {
                return Err(ArchiveError::Busy { resource });
            }
        };

        let provider = match ArchivedNodesWorkProvider::new(
            &self.engine,
            &archive_root,
            Arc::clone(&self.locks),
            token.clone(),
            resource.clone(),
            self.bulk_lock_ttl,
            self.batch_size,
        ) {
            Ok(provider) => Arc::new(provider),
            Err(err) => {
                self.locks.release(&token, &resource);
                return Err(err.into());
            }
        };

        info!(store = %store, "{action}");
        let result = BatchProcessor::new(self.batch_concurrency)
            .process(provider as Arc<dyn WorkProvider>, worker)
            .await;
        info!(
            store = %store,
            succeeded = result.succeeded,
            failed = result.failures.len(),
            "bulk operation finished"
        );

        // Best effort: an expired or stolen lease just logs.
        self.locks.release(&token, &resource);
        Ok(result)
    }

    /// Top-level archived nodes for `store`, snapshotted now.
    fn archived_top_level(&self, store: &StoreRef) -> Result<Vec<NodeRef>, ArchiveError> {
        let archive_root = self.get_archive_location(store)?;
        let items = self
            .engine
            .get_child_assocs(&archive_root, true)?
            .into_iter()
            .filter(|assoc| assoc.assoc_name == *ASSOC_NAME_ARCHIVED_ITEM)
            .map(|assoc| assoc.child)
            .collect();
        Ok(items)
    }
}

/// Lock resource name guarding bulk operations on one store's archive.
fn bulk_resource(store: &StoreRef) -> String {
    format!("archive-bulk-op:{store}")
}

/// One restore attempt in its own transaction, classified into a report.
async fn attempt_restore(
    engine: &Arc<dyn NodeService>,
    runner: &TransactionRunner,
    auth: &AuthContext,
    archived: &NodeRef,
    dest_parent: Option<&NodeRef>,
    assoc_type: Option<&QName>,
    assoc_name: Option<&QName>,
) -> RestoreReport {
    let report = RestoreReport::new(archived.clone(), dest_parent.cloned());

    // Snapshot the recorded original parent up front so a NotFound raised
    // mid-restore can be attributed to the destination rather than lumped
    // into FailureOther.
    let recorded_parent = engine
        .get_property(archived, &PROP_ARCHIVED_ORIGINAL_PARENT_ASSOC)
        .ok()
        .flatten()
        .and_then(|value| value.as_child_assoc().map(|assoc| assoc.parent.clone()));

    let outcome = {
        let engine = Arc::clone(engine);
        let auth = auth.clone();
        let archived = archived.clone();
        let dest_parent = dest_parent.cloned();
        let assoc_type = assoc_type.cloned();
        let assoc_name = assoc_name.cloned();
        runner
            .run(move |_txn| {
                engine.restore_node(
                    &auth,
                    &archived,
                    dest_parent.as_ref(),
                    assoc_type.as_ref(),
                    assoc_name.as_ref(),
                )
            })
            .await
    };

    match outcome {
        Ok(restored) => {
            info!(archived = %archived, restored = %restored, "restored archived node");
            report.succeeded(restored)
        }
        Err(err) => {
            let status = classify_restore_failure(archived, dest_parent, recorded_parent.as_ref(), &err);
            if status == RestoreStatus::FailureOther {
                error!(archived = %archived, error = %err, "restore failed unexpectedly");
            } else {
                debug!(archived = %archived, status = ?status, error = %err, "restore failed");
            }
            report.failed(status, err)
        }
    }
}

/// Maps an engine error onto a restore status.
///
/// A `NotFound` is ambiguous on its own: it names either the archived node
/// itself, the destination parent, or some unrelated reference touched
/// mid-restore. The carried reference disambiguates.
fn classify_restore_failure(
    archived: &NodeRef,
    dest_parent: Option<&NodeRef>,
    recorded_parent: Option<&NodeRef>,
    err: &NodeError,
) -> RestoreStatus {
    match err {
        NodeError::NotFound(missing) if missing == archived => {
            RestoreStatus::FailureInvalidArchiveNode
        }
        NodeError::NotFound(missing)
            if dest_parent == Some(missing) || recorded_parent == Some(missing) =>
        {
            RestoreStatus::FailureInvalidParent
        }
        NodeError::AccessDenied { .. } => RestoreStatus::FailurePermission,
        NodeError::DuplicateName { .. } | NodeError::IntegrityViolation(_) => {
            RestoreStatus::FailureIntegrity
        }
        NodeError::NotFound(_) | NodeError::InvalidStore(_) | NodeError::TransientConflict(_) => {
            RestoreStatus::FailureOther
        }
    }
}

/// Deletes one archived node inside a transaction; absence is success.
fn purge_item(
    engine: &Arc<dyn NodeService>,
    auth: &AuthContext,
    node: &NodeRef,
) -> Result<(), NodeError> {
    if !engine.exists(node) {
        debug!(node = %node, "purge target already gone");
        return Ok(());
    }
    engine.delete_node(auth, node)?;
    Ok(())
}

struct PurgeBatchWorker {
    engine: Arc<dyn NodeService>,
    runner: Arc<TransactionRunner>,
    auth: AuthContext,
}

#[async_trait]
impl BatchWorker for PurgeBatchWorker {
    async fn process(&self, node: NodeRef) -> Result<(), NodeError> {
        let engine = Arc::clone(&self.engine);
        let auth = self.auth.clone();
        self.runner
            .run(move |_txn| purge_item(&engine, &auth, &node))
            .await
    }
}

struct RestoreBatchWorker {
    engine: Arc<dyn NodeService>,
    runner: Arc<TransactionRunner>,
    auth: AuthContext,
}

#[async_trait]
impl BatchWorker for RestoreBatchWorker {
    async fn process(&self, node: NodeRef) -> Result<(), NodeError> {
        let report =
            attempt_restore(&self.engine, &self.runner, &self.auth, &node, None, None, None).await;
        match report.status {
            RestoreStatus::Success => Ok(()),
            _ => Err(report
                .cause
                .unwrap_or_else(|| NodeError::IntegrityViolation("restore failed".into()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use relic_core::model::{ASSOC_CONTAINS, PROP_NAME};
    use relic_core::PropertyValue;

    use crate::node::MemoryNodeService;

    use super::*;

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
        service: NodeArchiveService,
        locks: Arc<LockLeaseManager>,
        root: NodeRef,
    }

    fn fixture() -> Fixture {
        let store_map = Arc::new(StoreArchiveMap::new());
        store_map.set_mapping(workspace(), archive_store());
        let engine = Arc::new(MemoryNodeService::new(Arc::clone(&store_map)));
        let root = engine.create_store(&workspace());
        engine.create_store(&archive_store());
        engine.register_archivable_type(content_type());
        let runner = Arc::new(TransactionRunner::new(2, Duration::from_millis(1)));
        let locks = Arc::new(LockLeaseManager::new());
        let service = NodeArchiveService::new(
            Arc::clone(&engine) as Arc<dyn NodeService>,
            runner,
            store_map,
            Arc::clone(&locks),
            &ArchiveConfig::default(),
        );
        Fixture {
            engine,
            service,
            locks,
            root,
        }
    }

    /// Creates a document under the workspace root and deletes it, which
    /// archives it (the store is mapped and the type archivable).
    fn archived_doc(fx: &Fixture, auth: &AuthContext, name: &str) -> NodeRef {
        let node = fx
            .engine
            .create_node(
                auth,
                &fx.root,
                &ASSOC_CONTAINS,
                &QName::new("cm", name),
                &content_type(),
                vec![(PROP_NAME.clone(), PropertyValue::Text(name.to_string()))],
            )
            .unwrap();
        assert!(fx.engine.delete_node(auth, &node).unwrap());
        node.in_store(&archive_store())
    }

    #[test]
    fn archive_location_is_the_archive_root() {
        let fx = fixture();
        let location = fx.service.get_archive_location(&workspace()).unwrap();
        assert_eq!(location.store, archive_store());

        let unmapped = StoreRef::new("workspace", "Other");
        assert!(matches!(
            fx.service.get_archive_location(&unmapped),
            Err(ArchiveError::NotArchivable(_))
        ));
    }

    #[test]
    fn counterpart_requires_the_archival_record() {
        let fx = fixture();
        let auth = AuthContext::user("alice");
        let archived = archived_doc(&fx, &auth, "report");
        let live = archived.in_store(&workspace());

        assert_eq!(fx.service.get_archived_counterpart(&live), Some(archived));

        let never_deleted = fx
            .engine
            .create_node(
                &auth,
                &fx.root,
                &ASSOC_CONTAINS,
                &QName::new("cm", "kept"),
                &content_type(),
                vec![],
            )
            .unwrap();
        assert_eq!(fx.service.get_archived_counterpart(&never_deleted), None);
    }

    #[tokio::test]
    async fn restore_one_round_trips() {
        let fx = fixture();
        let auth = AuthContext::user("alice");
        let archived = archived_doc(&fx, &auth, "report");

        let report = fx.service.restore_one(&auth, &archived, None, None, None).await;

        assert!(report.status.is_success());
        let restored = report.restored_node.unwrap();
        assert_eq!(restored.store, workspace());
        assert!(fx.engine.exists(&restored));
        assert!(!fx.engine.exists(&archived));
        assert_eq!(
            fx.engine.get_primary_parent(&restored).unwrap().parent,
            fx.root
        );
    }

    #[tokio::test]
    async fn restoring_a_missing_node_reports_invalid_archive_node() {
        let fx = fixture();
        let auth = AuthContext::user("alice");
        let ghost = NodeRef::new(archive_store(), "no-such-node");

        let report = fx.service.restore_one(&auth, &ghost, None, None, None).await;

        assert_eq!(report.status, RestoreStatus::FailureInvalidArchiveNode);
        assert!(report.restored_node.is_none());
    }

    #[tokio::test]
    async fn restoring_to_a_missing_parent_reports_invalid_parent() {
        let fx = fixture();
        let auth = AuthContext::user("alice");
        let archived = archived_doc(&fx, &auth, "report");
        let missing_parent = NodeRef::new(workspace(), "gone-folder");

        let report = fx
            .service
            .restore_one(&auth, &archived, Some(&missing_parent), None, None)
            .await;

        assert_eq!(report.status, RestoreStatus::FailureInvalidParent);
        assert_eq!(report.target_parent, Some(missing_parent));
        // The archived node is untouched by the failed attempt.
        assert!(fx.engine.exists(&archived));
    }

    #[tokio::test]
    async fn restore_with_archived_original_parent_reports_invalid_parent() {
        let fx = fixture();
        let auth = AuthContext::user("alice");
        let folder = fx
            .engine
            .create_node(
                &auth,
                &fx.root,
                &ASSOC_CONTAINS,
                &QName::new("cm", "folder"),
                &content_type(),
                vec![(PROP_NAME.clone(), PropertyValue::Text("folder".into()))],
            )
            .unwrap();
        let doc = fx
            .engine
            .create_node(
                &auth,
                &folder,
                &ASSOC_CONTAINS,
                &QName::new("cm", "doc"),
                &content_type(),
                vec![(PROP_NAME.clone(), PropertyValue::Text("doc".into()))],
            )
            .unwrap();

        // Archive the document, then its former parent: the recorded
        // original parent no longer exists as a live node.
        assert!(fx.engine.delete_node(&auth, &doc).unwrap());
        assert!(fx.engine.delete_node(&auth, &folder).unwrap());

        let report = fx
            .service
            .restore_one(&auth, &doc.in_store(&archive_store()), None, None, None)
            .await;

        assert_eq!(report.status, RestoreStatus::FailureInvalidParent);
        assert!(fx.engine.exists(&doc.in_store(&archive_store())));
    }

    #[tokio::test]
    async fn restore_without_destination_access_reports_permission() {
        let fx = fixture();
        let auth = AuthContext::user("alice");
        let archived = archived_doc(&fx, &auth, "report");
        fx.engine.deny_write("alice", fx.root.clone());

        let report = fx.service.restore_one(&auth, &archived, None, None, None).await;

        assert_eq!(report.status, RestoreStatus::FailurePermission);
        assert!(fx.engine.exists(&archived));
    }

    #[tokio::test]
    async fn restore_many_continues_past_failures() {
        let fx = fixture();
        let auth = AuthContext::user("alice");
        let ghost = NodeRef::new(archive_store(), "no-such-node");
        let real = archived_doc(&fx, &auth, "survivor");

        let reports = fx
            .service
            .restore_many(&auth, &[ghost, real.clone()], None)
            .await;

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].status, RestoreStatus::FailureInvalidArchiveNode);
        assert!(reports[1].status.is_success());
        assert!(!fx.engine.exists(&real));
    }

    #[tokio::test]
    async fn restore_all_empties_the_archive() {
        let fx = fixture();
        let auth = AuthContext::user("alice");
        let a = archived_doc(&fx, &auth, "a");
        let b = archived_doc(&fx, &auth, "b");

        let reports = fx.service.restore_all(&auth, &workspace()).await.unwrap();

        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| r.status.is_success()));
        assert!(!fx.engine.exists(&a));
        assert!(!fx.engine.exists(&b));
        assert!(fx
            .service
            .archived_top_level(&workspace())
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn purge_one_is_idempotent() {
        let fx = fixture();
        let auth = AuthContext::user("alice");
        let archived = archived_doc(&fx, &auth, "doomed");

        fx.service.purge_one(&auth, &archived).await.unwrap();
        assert!(!fx.engine.exists(&archived));
        // Already gone: still success.
        fx.service.purge_one(&auth, &archived).await.unwrap();
    }

    #[tokio::test]
    async fn purged_nodes_do_not_come_back() {
        let fx = fixture();
        let auth = AuthContext::user("alice");
        let archived = archived_doc(&fx, &auth, "doomed");
        let live = archived.in_store(&workspace());

        fx.service.purge_one(&auth, &archived).await.unwrap();

        // A purge is final: neither the archive entry nor the live node
        // exists, and there is nothing left to restore.
        assert!(!fx.engine.exists(&archived));
        assert!(!fx.engine.exists(&live));
        let report = fx.service.restore_one(&auth, &archived, None, None, None).await;
        assert_eq!(report.status, RestoreStatus::FailureInvalidArchiveNode);
    }

    #[tokio::test]
    async fn purge_all_drains_the_archive() {
        let fx = fixture();
        let auth = AuthContext::user("alice");
        let a = archived_doc(&fx, &auth, "a");
        let b = archived_doc(&fx, &auth, "b");
        let c = archived_doc(&fx, &auth, "c");

        let result = fx.service.purge_all(&auth, &workspace()).await.unwrap();

        assert_eq!(result.succeeded, 3);
        assert!(result.failures.is_empty());
        for node in [a, b, c] {
            assert!(!fx.engine.exists(&node));
        }
    }

    #[tokio::test]
    async fn bulk_operations_are_single_flight_per_store() {
        let fx = fixture();
        let auth = AuthContext::user("alice");
        let archived = archived_doc(&fx, &auth, "held");

        // Another holder owns the store's bulk lock.
        let _held = fx
            .locks
            .acquire(&bulk_resource(&workspace()), Duration::from_secs(30))
            .unwrap();

        let err = fx.service.purge_all(&auth, &workspace()).await.unwrap_err();
        assert!(matches!(err, ArchiveError::Busy { .. }));
        // Nothing was purged.
        assert!(fx.engine.exists(&archived));

        let err = fx
            .service
            .restore_all_bulk(&auth, &workspace())
            .await
            .unwrap_err();
        assert!(matches!(err, ArchiveError::Busy { .. }));
    }

    #[tokio::test]
    async fn restore_all_bulk_restores_everything() {
        let fx = fixture();
        let auth = AuthContext::user("alice");
        let a = archived_doc(&fx, &auth, "a");
        let b = archived_doc(&fx, &auth, "b");

        let result = fx
            .service
            .restore_all_bulk(&auth, &workspace())
            .await
            .unwrap();

        assert_eq!(result.succeeded, 2);
        assert!(result.failures.is_empty());
        assert!(fx.engine.exists(&a.in_store(&workspace())));
        assert!(fx.engine.exists(&b.in_store(&workspace())));
    }
}

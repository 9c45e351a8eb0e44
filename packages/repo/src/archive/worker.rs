//! Background execution of deferred deletes.
//!
//! [`DeferredDeletePool`] owns a bounded job channel and a fixed set of
//! worker tasks. Each job runs in its own transaction: a guard check as the
//! system identity makes re-submission idempotent, the real delete runs as
//! the user who requested it, and a successful archival is followed by a
//! marker-cleanup pass over the archived subtree. Failures trigger a
//! best-effort compensating transaction that returns the node to a normal,
//! visible state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use relic_core::model::{
    ASPECT_PENDING_DELETE, PROP_NAME, PROP_PENDING_DELETE_ORIGINAL_NAME,
    PROP_PENDING_DELETE_REQUESTED_BY,
};
use relic_core::{AuthContext, NodeRef, PropertyValue};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::archive::StoreArchiveMap;
use crate::config::ArchiveConfig;
use crate::error::NodeError;
use crate::node::NodeService;
use crate::txn::{DeferredDelete, DeferredSink, TransactionRunner};

/// Worker pool executing deferred deletes after their transactions commit.
///
/// The channel is bounded: under a delete storm, submission waits for
/// capacity instead of queueing without limit.
pub struct DeferredDeletePool {
    tx: Mutex<Option<mpsc::Sender<DeferredDelete>>>,
    handles: Mutex<Vec<JoinHandle<()>>>,
    shutting_down: Arc<AtomicBool>,
}

/// Shared per-job execution state for the workers.
struct JobContext {
    engine: Arc<dyn NodeService>,
    runner: Arc<TransactionRunner>,
    store_map: Arc<StoreArchiveMap>,
    shutting_down: Arc<AtomicBool>,
}

impl DeferredDeletePool {
    /// Starts the pool with the configured worker count and queue capacity.
    #[must_use]
    pub fn start(
        engine: Arc<dyn NodeService>,
        runner: Arc<TransactionRunner>,
        store_map: Arc<StoreArchiveMap>,
        config: &ArchiveConfig,
    ) -> Arc<Self> {
        let (tx, rx) = mpsc::channel::<DeferredDelete>(config.delete_queue_capacity.max(1));
        let rx = Arc::new(tokio::sync::Mutex::new(rx));
        let shutting_down = Arc::new(AtomicBool::new(false));
        let ctx = Arc::new(JobContext {
            engine,
            runner,
            store_map,
            shutting_down: Arc::clone(&shutting_down),
        });

        let mut handles = Vec::with_capacity(config.delete_pool_workers.max(1));
        for _ in 0..config.delete_pool_workers.max(1) {
            let rx = Arc::clone(&rx);
            let ctx = Arc::clone(&ctx);
            handles.push(tokio::spawn(async move {
                loop {
                    let job = { rx.lock().await.recv().await };
                    match job {
                        Some(job) => ctx.process(job).await,
                        None => break, // Channel closed.
                    }
                }
            }));
        }

        Arc::new(Self {
            tx: Mutex::new(Some(tx)),
            handles: Mutex::new(handles),
            shutting_down,
        })
    }

    /// Stops the pool: in-flight jobs finish, queued jobs are abandoned
    /// silently, and worker tasks are joined.
    pub async fn shutdown(&self) {
        self.shutting_down.store(true, Ordering::SeqCst);
        // Dropping the sender closes the channel and ends the worker loops.
        self.tx.lock().take();
        let handles: Vec<JoinHandle<()>> = std::mem::take(&mut *self.handles.lock());
        for handle in handles {
            let _ = handle.await;
        }
    }
}

#[async_trait]
impl DeferredSink for DeferredDeletePool {
    async fn submit(&self, job: DeferredDelete) -> anyhow::Result<()> {
        let tx = self.tx.lock().clone();
        match tx {
            Some(tx) => tx
                .send(job)
                .await
                .map_err(|_| anyhow::anyhow!("delete pool channel closed")),
            None => Err(anyhow::anyhow!("delete pool stopped")),
        }
    }
}

impl JobContext {
    async fn process(&self, job: DeferredDelete) {
        let node = job.node;
        if let Err(err) = self.execute(&node).await {
            if self.shutting_down.load(Ordering::SeqCst) {
                debug!(node = %node, error = %err, "deferred delete abandoned at shutdown");
                return;
            }
            // Best effort: bring the node back to a normal, visible state
            // rather than leaving it renamed and logically invisible.
            if let Err(comp_err) = self.runner.run(|_txn| self.compensate(&node)).await {
                warn!(node = %node, error = %comp_err, "pending-delete compensation failed");
            }
            error!(node = %node, error = %err, "deferred delete failed");
        }
    }

    /// One deferred delete, in its own transaction.
    async fn execute(&self, node: &NodeRef) -> Result<(), NodeError> {
        self.runner
            .run(|_txn| {
                // Guard check as the system identity: a node already
                // processed (or compensated) is simply skipped, which makes
                // redelivery of the same job safe.
                if !self.engine.exists(node) {
                    return Ok(());
                }
                if !self.engine.has_aspect(node, &ASPECT_PENDING_DELETE)? {
                    return Ok(());
                }
                let requested_by = self
                    .engine
                    .get_property(node, &PROP_PENDING_DELETE_REQUESTED_BY)?
                    .and_then(|v| v.as_text().map(str::to_string))
                    .ok_or_else(|| {
                        NodeError::IntegrityViolation(format!(
                            "pending-delete marker has no requesting user: {node}"
                        ))
                    })?;

                let requester = AuthContext::user(requested_by);
                self.engine.delete_node(&requester, node)?;

                // If the delete landed in an archive store, the marker and
                // the transient rename rode along; clear both across the
                // archived subtree.
                if let Some(archive) = self.store_map.archive_store(&node.store) {
                    let archived = node.in_store(&archive);
                    if self.engine.exists(&archived) {
                        self.clear_markers(&archived)?;
                    }
                }
                Ok(())
            })
            .await
    }

    /// Restores the original name and removes the marker from `node` and
    /// every primary descendant still carrying it.
    fn clear_markers(&self, node: &NodeRef) -> Result<(), NodeError> {
        if self.engine.has_aspect(node, &ASPECT_PENDING_DELETE)? {
            self.unmark(node)?;
        }
        for assoc in self.engine.get_child_assocs(node, true)? {
            self.clear_markers(&assoc.child)?;
        }
        Ok(())
    }

    fn unmark(&self, node: &NodeRef) -> Result<(), NodeError> {
        if let Some(original) = self
            .engine
            .get_property(node, &PROP_PENDING_DELETE_ORIGINAL_NAME)?
            .and_then(|v| v.as_text().map(str::to_string))
        {
            self.engine
                .set_property(node, &PROP_NAME, PropertyValue::Text(original))?;
        }
        self.engine.remove_aspect(node, &ASPECT_PENDING_DELETE)?;
        self.engine
            .remove_property(node, &PROP_PENDING_DELETE_ORIGINAL_NAME)?;
        self.engine
            .remove_property(node, &PROP_PENDING_DELETE_REQUESTED_BY)?;
        Ok(())
    }

    /// Compensating half of a failed delete: the node reverts to being a
    /// normal, visible, undeleted node.
    fn compensate(&self, node: &NodeRef) -> Result<(), NodeError> {
        if !self.engine.exists(node) {
            return Ok(());
        }
        if self.engine.has_aspect(node, &ASPECT_PENDING_DELETE)? {
            self.unmark(node)?;
        }
        Ok(())
    }
}

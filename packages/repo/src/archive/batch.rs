//! Bulk execution over server-computed sets of archived nodes.
//!
//! A [`WorkProvider`] hands out bounded pages of node references,
//! re-validating its lock lease before each page; the [`BatchProcessor`]
//! drains the provider through a semaphore-bounded set of worker tasks,
//! isolating per-item failures so one bad node never aborts the batch.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use relic_core::model::ASSOC_NAME_ARCHIVED_ITEM;
use relic_core::NodeRef;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::archive::lock::{LockLeaseManager, LockToken};
use crate::error::NodeError;
use crate::node::NodeService;

/// Per-item operation applied by the batch processor.
#[async_trait]
pub trait BatchWorker: Send + Sync + 'static {
    /// Process one node. Runs in its own transaction; errors are recorded
    /// against the item, never propagated to abort the batch.
    async fn process(&self, node: NodeRef) -> Result<(), NodeError>;
}

/// Source of bounded pages of work.
///
/// An empty page means "stop": either the work is exhausted or the
/// provider can no longer prove it holds the operation's lock.
pub trait WorkProvider: Send + Sync + 'static {
    /// The next page of node references.
    fn next_page(&self) -> Vec<NodeRef>;
}

/// Pages over the nodes parked under an archive store root, renewing the
/// bulk operation's lock lease before every page.
///
/// The item set is snapshotted at construction; nodes archived after the
/// bulk operation started belong to the next invocation.
pub struct ArchivedNodesWorkProvider {
    items: Mutex<VecDeque<NodeRef>>,
    locks: Arc<LockLeaseManager>,
    token: LockToken,
    resource: String,
    ttl: Duration,
    page_size: usize,
}

impl ArchivedNodesWorkProvider {
    /// Snapshots the archived nodes under `archive_root` and binds the
    /// provider to the caller's lease.
    ///
    /// # Errors
    ///
    /// `NotFound` if the archive root does not exist.
    pub fn new(
        engine: &Arc<dyn NodeService>,
        archive_root: &NodeRef,
        locks: Arc<LockLeaseManager>,
        token: LockToken,
        resource: impl Into<String>,
        ttl: Duration,
        page_size: usize,
    ) -> Result<Self, NodeError> {
        let items = engine
            .get_child_assocs(archive_root, true)?
            .into_iter()
            .filter(|assoc| assoc.assoc_name == *ASSOC_NAME_ARCHIVED_ITEM)
            .map(|assoc| assoc.child)
            .collect();
        Ok(Self {
            items: Mutex::new(items),
            locks,
            token,
            resource: resource.into(),
            ttl,
            page_size: page_size.max(1),
        })
    }
}

impl WorkProvider for ArchivedNodesWorkProvider {
    fn next_page(&self) -> Vec<NodeRef> {
        // Prove the lease is still ours before handing out more work; a
        // lost lease stops the batch cleanly instead of racing the next
        // holder.
        if let Err(err) = self.locks.renew(&self.token, &self.resource, self.ttl) {
            warn!(resource = %self.resource, error = %err, "stopping bulk operation: lease lost");
            return Vec::new();
        }
        let mut items = self.items.lock();
        let take = self.page_size.min(items.len());
        items.drain(..take).collect()
    }
}

/// Summary of one batch invocation.
#[derive(Debug, Default)]
pub struct BatchResult {
    /// Items that completed successfully.
    pub succeeded: usize,
    /// Items that failed, with their captured errors.
    pub failures: Vec<(NodeRef, NodeError)>,
}

impl BatchResult {
    /// Total items attempted.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failures.len()
    }
}

/// Drives a [`WorkProvider`] through a bounded set of concurrent workers.
pub struct BatchProcessor {
    concurrency: usize,
}

impl BatchProcessor {
    /// Creates a processor dispatching at most `concurrency` items at once.
    #[must_use]
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    /// Drains the provider, applying `worker` to every item.
    ///
    /// Each item is attempted at least once within this invocation; no
    /// ordering is promised across pages or within a page. Per-item errors
    /// are collected into the result.
    pub async fn process(
        &self,
        provider: Arc<dyn WorkProvider>,
        worker: Arc<dyn BatchWorker>,
    ) -> BatchResult {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks: JoinSet<(NodeRef, Result<(), NodeError>)> = JoinSet::new();

        loop {
            let page = provider.next_page();
            if page.is_empty() {
                break;
            }
            debug!(items = page.len(), "dispatching bulk page");
            for node in page {
                let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                    break;
                };
                let worker = Arc::clone(&worker);
                tasks.spawn(async move {
                    let outcome = worker.process(node.clone()).await;
                    drop(permit);
                    (node, outcome)
                });
            }
        }

        let mut result = BatchResult::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(()))) => result.succeeded += 1,
                Ok((node, Err(err))) => {
                    warn!(node = %node, error = %err, "bulk item failed");
                    result.failures.push((node, err));
                }
                Err(join_err) => {
                    warn!(error = %join_err, "bulk worker task failed to complete");
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use relic_core::StoreRef;

    use super::*;

    fn node(id: &str) -> NodeRef {
        NodeRef::new(StoreRef::new("archive", "SpacesStore"), id)
    }

    /// Provider serving a fixed list in pages of two, no lock involved.
    struct ListProvider {
        items: Mutex<VecDeque<NodeRef>>,
    }

    impl ListProvider {
        fn new(items: Vec<NodeRef>) -> Arc<Self> {
            Arc::new(Self {
                items: Mutex::new(items.into()),
            })
        }
    }

    impl WorkProvider for ListProvider {
        fn next_page(&self) -> Vec<NodeRef> {
            let mut items = self.items.lock();
            let take = 2.min(items.len());
            items.drain(..take).collect()
        }
    }

    struct CountingWorker {
        processed: AtomicUsize,
        fail_for: Option<NodeRef>,
    }

    #[async_trait]
    impl BatchWorker for CountingWorker {
        async fn process(&self, node: NodeRef) -> Result<(), NodeError> {
            self.processed.fetch_add(1, Ordering::SeqCst);
            if self.fail_for.as_ref() == Some(&node) {
                return Err(NodeError::IntegrityViolation("bad item".into()));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn drains_all_pages() {
        let provider = ListProvider::new(vec![node("a"), node("b"), node("c"), node("d"), node("e")]);
        let worker = Arc::new(CountingWorker {
            processed: AtomicUsize::new(0),
            fail_for: None,
        });

        let result = BatchProcessor::new(3)
            .process(provider, Arc::clone(&worker) as Arc<dyn BatchWorker>)
            .await;

        assert_eq!(result.succeeded, 5);
        assert!(result.failures.is_empty());
        assert_eq!(worker.processed.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn one_failure_does_not_abort_the_batch() {
        let bad = node("b");
        let provider = ListProvider::new(vec![node("a"), bad.clone(), node("c")]);
        let worker = Arc::new(CountingWorker {
            processed: AtomicUsize::new(0),
            fail_for: Some(bad.clone()),
        });

        let result = BatchProcessor::new(2)
            .process(provider, Arc::clone(&worker) as Arc<dyn BatchWorker>)
            .await;

        assert_eq!(result.succeeded, 2);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].0, bad);
        assert_eq!(result.attempted(), 3);
        // Every item was still attempted.
        assert_eq!(worker.processed.load(Ordering::SeqCst), 3);
    }

    /// Worker that records the peak number of concurrently running items.
    struct PeakWorker {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl BatchWorker for PeakWorker {
        async fn process(&self, _node: NodeRef) -> Result<(), NodeError> {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(current, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn concurrency_is_bounded() {
        let items: Vec<NodeRef> = (0..10).map(|i| node(&format!("n{i}"))).collect();
        let provider = ListProvider::new(items);
        let worker = Arc::new(PeakWorker {
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });

        let result = BatchProcessor::new(2)
            .process(provider, Arc::clone(&worker) as Arc<dyn BatchWorker>)
            .await;

        assert_eq!(result.succeeded, 10);
        assert!(worker.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn lost_lease_stops_the_provider() {
        let locks = Arc::new(LockLeaseManager::new());
        // A lease that is already expired: the first renewal fails.
        let token = locks.acquire("bulk", Duration::from_millis(0)).unwrap();

        let provider = ArchivedNodesStub::with_items(
            vec![node("a"), node("b")],
            Arc::clone(&locks),
            token,
        );
        let worker = Arc::new(CountingWorker {
            processed: AtomicUsize::new(0),
            fail_for: None,
        });

        let result = BatchProcessor::new(2)
            .process(provider, Arc::clone(&worker) as Arc<dyn BatchWorker>)
            .await;

        assert_eq!(result.attempted(), 0);
        assert_eq!(worker.processed.load(Ordering::SeqCst), 0);
    }

    /// Lease-checking provider over a fixed list, bypassing the engine.
    struct ArchivedNodesStub;

    impl ArchivedNodesStub {
        fn with_items(
            items: Vec<NodeRef>,
            locks: Arc<LockLeaseManager>,
            token: LockToken,
        ) -> Arc<ArchivedNodesWorkProvider> {
            Arc::new(ArchivedNodesWorkProvider {
                items: Mutex::new(items.into()),
                locks,
                token,
                resource: "bulk".to_string(),
                ttl: Duration::from_secs(30),
                page_size: 2,
            })
        }
    }
}

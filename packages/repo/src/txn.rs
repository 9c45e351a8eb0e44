//! Transaction execution: bounded retry and deferred-work flush.
//!
//! [`TransactionRunner::run`] executes a unit of work against a typed,
//! transaction-lifetime [`Txn`] context. Deferred background deletes
//! registered during the work are handed to the attached sink exactly once,
//! after the closure returns `Ok` (the commit point); a failed closure
//! drops the whole context, so rolled-back work never reaches the pool.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use relic_core::NodeRef;
use tracing::{debug, warn};

use crate::config::ArchiveConfig;
use crate::error::NodeError;

/// A delete whose physical execution is deferred to the background pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredDelete {
    /// The node to delete; the requesting user is read back from the
    /// node's pending-delete marker at execution time.
    pub node: NodeRef,
}

/// Receiver of committed deferred deletes (the background delete pool).
#[async_trait]
pub trait DeferredSink: Send + Sync {
    /// Accept a job for background execution. Waits for queue capacity.
    async fn submit(&self, job: DeferredDelete) -> anyhow::Result<()>;
}

/// Transaction-lifetime context. Owned by one unit of work; dropped (with
/// everything it holds) when that work rolls back.
#[derive(Debug, Default)]
pub struct Txn {
    deferred: Vec<DeferredDelete>,
}

impl Txn {
    fn new() -> Self {
        Self::default()
    }

    /// Registers a background delete to run after this transaction commits.
    pub fn defer_delete(&mut self, job: DeferredDelete) {
        // The same node queued twice in one transaction runs once; the
        // worker's guard makes a duplicate harmless anyway.
        if !self.deferred.contains(&job) {
            self.deferred.push(job);
        }
    }

    /// Jobs currently queued for after-commit submission.
    #[must_use]
    pub fn deferred(&self) -> &[DeferredDelete] {
        &self.deferred
    }
}

/// Runs units of work as individual transactions, retrying transient
/// conflicts with linear backoff, and flushing deferred work on commit.
pub struct TransactionRunner {
    max_retries: u32,
    retry_backoff: Duration,
    sink: RwLock<Option<Arc<dyn DeferredSink>>>,
}

impl TransactionRunner {
    /// Creates a runner with the given retry policy and no sink attached.
    #[must_use]
    pub fn new(max_retries: u32, retry_backoff: Duration) -> Self {
        Self {
            max_retries,
            retry_backoff,
            sink: RwLock::new(None),
        }
    }

    /// Creates a runner from the subsystem configuration.
    #[must_use]
    pub fn from_config(config: &ArchiveConfig) -> Self {
        Self::new(
            config.txn_max_retries,
            Duration::from_millis(config.txn_retry_backoff_ms),
        )
    }

    /// Attaches the deferred-work sink. Wiring-time only; jobs queued while
    /// no sink is attached are dropped with a warning.
    pub fn attach_sink(&self, sink: Arc<dyn DeferredSink>) {
        *self.sink.write() = Some(sink);
    }

    /// Executes `work` in its own transaction.
    ///
    /// The closure may run more than once: transient conflicts are retried
    /// up to the configured limit with linear backoff, each attempt against
    /// a fresh [`Txn`]. On `Ok`, queued deferred deletes are submitted to
    /// the sink; on `Err`, they are discarded with the context.
    ///
    /// # Errors
    ///
    /// The closure's error, once retries are exhausted or for any
    /// non-retryable failure.
    pub async fn run<T, F>(&self, mut work: F) -> Result<T, NodeError>
    where
        F: FnMut(&mut Txn) -> Result<T, NodeError>,
    {
        let mut attempt: u32 = 0;
        loop {
            let mut txn = Txn::new();
            match work(&mut txn) {
                Ok(value) => {
                    self.flush(txn).await;
                    return Ok(value);
                }
                Err(err) if err.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    debug!(attempt, error = %err, "retrying transaction after transient conflict");
                    tokio::time::sleep(self.retry_backoff * attempt).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Submits the committed transaction's deferred work. Submission
    /// failures mean the pool is stopping; the jobs are abandoned, which is
    /// the defined shutdown outcome for queued-but-unstarted work.
    async fn flush(&self, txn: Txn) {
        if txn.deferred.is_empty() {
            return;
        }
        let sink = self.sink.read().clone();
        let Some(sink) = sink else {
            warn!(
                jobs = txn.deferred.len(),
                "deferred deletes dropped: no sink attached"
            );
            return;
        };
        for job in txn.deferred {
            let node = job.node.clone();
            if let Err(err) = sink.submit(job).await {
                debug!(node = %node, error = %err, "deferred delete abandoned at submission");
            }
        }
    }
}

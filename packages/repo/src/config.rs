//! Archive subsystem configuration.

/// How deletes of archivable nodes are turned into archivals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveMode {
    /// Archive synchronously within the caller's transaction; the storage
    /// engine relocates the node as part of the delete call.
    Eager,
    /// Tag the node and defer the real delete to a background worker after
    /// the caller's transaction commits.
    Lazy,
}

/// Configuration for the archive subsystem.
///
/// Controls the delete worker pool, bulk batch sizing, lease timing, and
/// the transaction retry policy.
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    /// Eager or lazy archival of deleted nodes.
    pub mode: ArchiveMode,
    /// Number of background delete workers.
    pub delete_pool_workers: usize,
    /// Bounded capacity of the deferred-delete queue; submission waits for
    /// space rather than growing without limit under delete storms.
    pub delete_queue_capacity: usize,
    /// Number of work items per bulk batch page.
    pub batch_size: usize,
    /// Maximum concurrent in-flight items within a bulk batch.
    pub batch_concurrency: usize,
    /// Time-to-live of the bulk-operation lock lease in milliseconds.
    pub bulk_lock_ttl_ms: u64,
    /// Maximum retries for a transaction hitting transient conflicts.
    pub txn_max_retries: u32,
    /// Backoff between transaction retries in milliseconds (linear).
    pub txn_retry_backoff_ms: u64,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            mode: ArchiveMode::Lazy,
            delete_pool_workers: 4,
            delete_queue_capacity: 256,
            batch_size: 100,
            batch_concurrency: 8,
            bulk_lock_ttl_ms: 30_000,
            txn_max_retries: 10,
            txn_retry_backoff_ms: 20,
        }
    }
}

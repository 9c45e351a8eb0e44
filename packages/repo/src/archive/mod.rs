//! Soft-delete, archival, and restore.
//!
//! Deleting a node in a mapped store parks it under the archive store's
//! root instead of destroying it. The pieces:
//!
//! - [`store_map`]: which primary store archives into which archive store.
//! - [`interceptor`]: classifies each delete into a direct, eager-archive,
//!   or lazy path.
//! - [`worker`]: the background pool that completes lazy deletes.
//! - [`service`]: restore and purge operations over archived nodes.
//! - [`lock`] and [`batch`]: single-flighting and fan-out for the bulk
//!   variants.

pub mod batch;
pub mod interceptor;
pub mod lock;
pub mod report;
pub mod service;
pub mod store_map;
pub mod worker;

pub use batch::{ArchivedNodesWorkProvider, BatchProcessor, BatchResult, BatchWorker, WorkProvider};
pub use interceptor::{ArchivingNodeService, DeletePath};
pub use lock::{LockLeaseManager, LockToken};
pub use report::{RestoreReport, RestoreStatus};
pub use service::NodeArchiveService;
pub use store_map::StoreArchiveMap;
pub use worker::DeferredDeletePool;

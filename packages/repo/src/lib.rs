//! Relic repository: node storage with archival soft-delete.
//!
//! The [`node`] module defines the storage seam ([`node::NodeService`]) and
//! an in-memory engine. The [`archive`] module layers soft-delete on top:
//! deletes in mapped stores park nodes under an archive store, from which
//! they can be restored or purged. [`txn`] provides the retrying
//! transaction runner that every mutating operation goes through.

pub mod archive;
pub mod config;
pub mod error;
pub mod node;
pub mod txn;

pub use archive::{
    ArchivingNodeService, BatchResult, DeferredDeletePool, LockLeaseManager, NodeArchiveService,
    RestoreReport, RestoreStatus, StoreArchiveMap,
};
pub use config::{ArchiveConfig, ArchiveMode};
pub use error::{ArchiveError, LockError, NodeError};
pub use node::{MemoryNodeService, NodeService, TypeDictionary};
pub use txn::{DeferredDelete, DeferredSink, TransactionRunner, Txn};

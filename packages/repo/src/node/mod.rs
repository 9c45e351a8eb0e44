//! Node storage: the [`NodeService`] seam and the in-memory engine.

pub mod memory;
pub mod service;

pub use memory::MemoryNodeService;
pub use service::{NodeService, TypeDictionary};

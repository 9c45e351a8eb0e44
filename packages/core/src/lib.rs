//! Relic Core — node references, qualified names, content model, identity context.

pub mod context;
pub mod model;
pub mod types;

pub use context::{AuthContext, SYSTEM_USER};
pub use types::{ChildAssocRef, NodeRef, PropertyValue, QName, StoreRef};

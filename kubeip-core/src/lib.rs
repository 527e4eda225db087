//! kubeip Core Library
//!
//! Node identity for the kubeip agent: the node descriptor model and the
//! explorer that resolves which node the agent runs on.

pub mod explorer;
pub mod node;

// Re-export common types
pub use explorer::{Explorer, ExplorerError, NodeLookup};
pub use node::{CloudProvider, NodeDescriptor};

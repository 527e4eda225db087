//! Node Explorer
//!
//! Resolves which node the agent is running on and describes it.
//!
//! The node name comes from, in order:
//! - the explicit `--node-name` override
//! - the `NODE_NAME` environment variable (downward API)
//! - the machine host name

use anyhow::Result;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Node;
use thiserror::Error;
use tracing::{debug, warn};

use crate::node::{CloudProvider, NodeDescriptor};

/// Environment variable populated from `spec.nodeName` via the downward API
pub const NODE_NAME_ENV: &str = "NODE_NAME";

/// Source of `Node` objects
#[async_trait]
pub trait NodeLookup: Send + Sync {
    /// Fetch a node by name
    async fn get_node(&self, name: &str) -> Result<Node>;
}

/// Node explorer errors
#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("unable to determine node name: no override, no NODE_NAME and no host name")]
    NoNodeName,

    #[error("failed to look up node {name}")]
    Lookup {
        name: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Resolves the descriptor of the current node
pub struct Explorer<L: NodeLookup> {
    lookup: L,
    node_name: Option<String>,
}

impl<L: NodeLookup> Explorer<L> {
    /// Create a new explorer
    pub fn new(lookup: L, node_name: Option<String>) -> Self {
        Self { lookup, node_name }
    }

    /// Resolve the current node and build its descriptor
    pub async fn get_node(&self) -> Result<NodeDescriptor, ExplorerError> {
        let name = resolve_node_name(self.node_name.as_deref())?;
        debug!(node = %name, "Looking up node");

        let node = self
            .lookup
            .get_node(&name)
            .await
            .map_err(|source| ExplorerError::Lookup {
                name: name.clone(),
                source,
            })?;

        let descriptor = NodeDescriptor::from_node(&name, &node);

        if descriptor.cloud == CloudProvider::Unknown {
            warn!(
                node = %descriptor.name,
                provider_id = ?descriptor.provider_id,
                "Node runs on an unrecognized cloud provider"
            );
        }

        Ok(descriptor)
    }
}

/// Determine the node name from the override, the environment or the host name
pub fn resolve_node_name(node_name: Option<&str>) -> Result<String, ExplorerError> {
    let env = std::env::var(NODE_NAME_ENV).ok();
    let host = hostname::get()
        .ok()
        .map(|h| h.to_string_lossy().into_owned());

    pick_node_name(node_name, env.as_deref(), host.as_deref())
}

fn pick_node_name(
    node_name: Option<&str>,
    env: Option<&str>,
    host: Option<&str>,
) -> Result<String, ExplorerError> {
    [node_name, env, host]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or(ExplorerError::NoNodeName)
}

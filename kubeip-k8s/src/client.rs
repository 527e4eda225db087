//! Kubernetes Client wrapper
//!
//! Provides a simplified interface to the Kubernetes API.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Node;
use kube::api::Api;
use kube::{Client, Config};
use tracing::info;

use kubeip_core::NodeLookup;

use crate::kubeconfig::resolve_config;

/// Kubernetes client wrapper
#[derive(Clone)]
pub struct K8sClient {
    client: Client,
}

impl K8sClient {
    /// Resolve credentials (kubeconfig path, else in-cluster) and connect
    pub async fn connect(kubeconfig: Option<&Path>) -> Result<Self> {
        let config = resolve_config(kubeconfig)
            .await
            .context("retrieving kube config")?;

        Self::from_config(config)
    }

    /// Create a new K8s client with custom config
    pub fn from_config(config: Config) -> Result<Self> {
        let cluster_url = config.cluster_url.to_string();
        let client = Client::try_from(config).context("initializing kubernetes client")?;

        info!(cluster = %cluster_url, "Kubernetes client initialized");
        Ok(Self { client })
    }

    /// Get node API
    pub fn nodes(&self) -> Api<Node> {
        Api::all(self.client.clone())
    }

    /// Get a node by name
    pub async fn get_node(&self, name: &str) -> Result<Node> {
        self.nodes()
            .get(name)
            .await
            .with_context(|| format!("Failed to get node: {}", name))
    }
}

#[async_trait]
impl NodeLookup for K8sClient {
    async fn get_node(&self, name: &str) -> Result<Node> {
        K8sClient::get_node(self, name).await
    }
}

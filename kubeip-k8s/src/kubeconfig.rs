//! Credential resolution
//!
//! The agent talks to the API server with credentials from exactly one source:
//! a kubeconfig file when a path is given, otherwise the in-cluster service
//! account.

use std::path::{Path, PathBuf};

use kube::config::{InClusterError, KubeConfigOptions, Kubeconfig, KubeconfigError};
use kube::Config;
use thiserror::Error;
use tracing::debug;

/// Credential resolution errors
#[derive(Debug, Error)]
pub enum KubeConfigError {
    #[error("reading kubeconfig at {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Decoding the file or building a client config from it failed
    #[error("building client config from kubeconfig at {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: KubeconfigError,
    },

    #[error("retrieving in-cluster config")]
    InCluster(#[source] InClusterError),
}

impl KubeConfigError {
    /// Name of the resolution stage that failed
    pub fn stage(&self) -> &'static str {
        match self {
            KubeConfigError::Read { .. } => "read",
            KubeConfigError::Parse { .. } => "parse",
            KubeConfigError::InCluster(_) => "in-cluster",
        }
    }
}

/// Where credentials come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Out-of-cluster kubeconfig file
    Kubeconfig(PathBuf),
    /// Mounted service-account token
    InCluster,
}

impl CredentialSource {
    /// Pick the source for an optional kubeconfig path; empty paths mean in-cluster
    pub fn select(path: Option<&Path>) -> Self {
        match path {
            Some(p) if !p.as_os_str().is_empty() => CredentialSource::Kubeconfig(p.to_path_buf()),
            _ => CredentialSource::InCluster,
        }
    }
}

/// Resolve a client config from the kubeconfig path or in-cluster discovery
pub async fn resolve_config(path: Option<&Path>) -> Result<Config, KubeConfigError> {
    match CredentialSource::select(path) {
        CredentialSource::Kubeconfig(path) => {
            let config = config_from_path(&path).await?;
            debug!(path = ?path, "Using kubeconfig from path");
            Ok(config)
        }
        CredentialSource::InCluster => {
            let config = Config::incluster().map_err(KubeConfigError::InCluster)?;
            debug!("Using in-cluster config");
            Ok(config)
        }
    }
}

/// Load a client config from the current context of a kubeconfig file
pub async fn config_from_path(path: &Path) -> Result<Config, KubeConfigError> {
    let data = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| KubeConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let kubeconfig = Kubeconfig::from_yaml(&data).map_err(|source| KubeConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .map_err(|source| KubeConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

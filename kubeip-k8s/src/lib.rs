//! kubeip Kubernetes Integration
//!
//! Credential resolution and the API client used by the kubeip agent.

pub mod client;
pub mod kubeconfig;

pub use client::K8sClient;
pub use kubeconfig::{resolve_config, CredentialSource, KubeConfigError};

//! Node descriptor
//!
//! The agent's view of the Kubernetes `Node` it runs on: identity, cloud
//! placement and addresses.

use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::Node;
use serde::Serialize;

const REGION_LABEL: &str = "topology.kubernetes.io/region";
const ZONE_LABEL: &str = "topology.kubernetes.io/zone";
const LEGACY_REGION_LABEL: &str = "failure-domain.beta.kubernetes.io/region";
const LEGACY_ZONE_LABEL: &str = "failure-domain.beta.kubernetes.io/zone";

/// Labels carrying the node pool name, in lookup order
const POOL_LABELS: &[&str] = &[
    "cloud.google.com/gke-nodepool",
    "eks.amazonaws.com/nodegroup",
    "alpha.eksctl.io/nodegroup-name",
    "kubernetes.azure.com/agentpool",
];

/// Cloud provider hosting the node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CloudProvider {
    /// Google Cloud (provider ID scheme `gce://`)
    Gcp,
    /// Amazon Web Services (provider ID scheme `aws://`)
    Aws,
    /// Microsoft Azure (provider ID scheme `azure://`)
    Azure,
    /// No provider ID, or a scheme the agent does not know
    #[default]
    Unknown,
}

impl CloudProvider {
    /// Derive the provider from a `spec.providerID` value
    pub fn from_provider_id(provider_id: &str) -> Self {
        let scheme = provider_id
            .split_once("://")
            .map(|(scheme, _)| scheme)
            .unwrap_or_default();

        match scheme.to_ascii_lowercase().as_str() {
            "gce" => CloudProvider::Gcp,
            "aws" => CloudProvider::Aws,
            "azure" => CloudProvider::Azure,
            _ => CloudProvider::Unknown,
        }
    }
}

impl fmt::Display for CloudProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloudProvider::Gcp => write!(f, "gcp"),
            CloudProvider::Aws => write!(f, "aws"),
            CloudProvider::Azure => write!(f, "azure"),
            CloudProvider::Unknown => write!(f, "unknown"),
        }
    }
}

/// Descriptor of the node the agent runs on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeDescriptor {
    /// Node object name
    pub name: String,
    /// Cloud instance name or ID (last segment of the provider ID)
    pub instance: Option<String>,
    /// Raw `spec.providerID`
    pub provider_id: Option<String>,
    /// Hosting cloud provider
    pub cloud: CloudProvider,
    /// Cloud region
    pub region: Option<String>,
    /// Cloud availability zone
    pub zone: Option<String>,
    /// Node pool / node group
    pub pool: Option<String>,
    /// Addresses of type `ExternalIP`
    pub external_ips: Vec<IpAddr>,
    /// Addresses of type `InternalIP`
    pub internal_ips: Vec<IpAddr>,
    /// Node creation time
    pub created_at: Option<DateTime<Utc>>,
}

impl NodeDescriptor {
    /// Build a descriptor from the API object.
    ///
    /// `name` is the name the node was looked up by; it is used when the
    /// object carries no name of its own.
    pub fn from_node(name: &str, node: &Node) -> Self {
        let empty = BTreeMap::new();
        let labels = node.metadata.labels.as_ref().unwrap_or(&empty);

        let provider_id = node
            .spec
            .as_ref()
            .and_then(|s| s.provider_id.clone())
            .filter(|id| !id.is_empty());

        let cloud = provider_id
            .as_deref()
            .map(CloudProvider::from_provider_id)
            .unwrap_or_default();

        let instance = provider_id.as_deref().and_then(instance_from_provider_id);

        let (external_ips, internal_ips) = node_addresses(node);

        Self {
            name: node.metadata.name.clone().unwrap_or_else(|| name.to_string()),
            instance,
            provider_id,
            cloud,
            region: label(labels, &[REGION_LABEL, LEGACY_REGION_LABEL]),
            zone: label(labels, &[ZONE_LABEL, LEGACY_ZONE_LABEL]),
            pool: label(labels, POOL_LABELS),
            external_ips,
            internal_ips,
            created_at: node.metadata.creation_timestamp.as_ref().map(|t| t.0),
        }
    }
}

/// Last non-empty path segment of a provider ID
fn instance_from_provider_id(provider_id: &str) -> Option<String> {
    let path = provider_id
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(provider_id);

    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .map(str::to_string)
}

/// First non-empty value among the given label keys
fn label(labels: &BTreeMap<String, String>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| labels.get(*key))
        .find(|value| !value.is_empty())
        .cloned()
}

/// Split node status addresses into (external, internal) IPs
fn node_addresses(node: &Node) -> (Vec<IpAddr>, Vec<IpAddr>) {
    let mut external = Vec::new();
    let mut internal = Vec::new();

    let addresses = node
        .status
        .as_ref()
        .and_then(|s| s.addresses.as_ref());

    for address in addresses.into_iter().flatten() {
        let Ok(ip) = address.address.parse::<IpAddr>() else {
            continue;
        };
        match address.type_.as_str() {
            "ExternalIP" => external.push(ip),
            "InternalIP" => internal.push(ip),
            _ => {}
        }
    }

    (external, internal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::{NodeAddress, NodeSpec, NodeStatus};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn address(type_: &str, address: &str) -> NodeAddress {
        NodeAddress {
            type_: type_.to_string(),
            address: address.to_string(),
        }
    }

    fn gke_node() -> Node {
        let labels = BTreeMap::from([
            (REGION_LABEL.to_string(), "us-central1".to_string()),
            (ZONE_LABEL.to_string(), "us-central1-a".to_string()),
            (
                "cloud.google.com/gke-nodepool".to_string(),
                "public-pool".to_string(),
            ),
        ]);

        Node {
            metadata: ObjectMeta {
                name: Some("gke-node-1".to_string()),
                labels: Some(labels),
                ..Default::default()
            },
            spec: Some(NodeSpec {
                provider_id: Some("gce://my-project/us-central1-a/gke-node-1".to_string()),
                ..Default::default()
            }),
            status: Some(NodeStatus {
                addresses: Some(vec![
                    address("InternalIP", "10.128.0.7"),
                    address("ExternalIP", "34.122.10.1"),
                    address("Hostname", "gke-node-1"),
                ]),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn test_cloud_provider_from_provider_id() {
        assert_eq!(
            CloudProvider::from_provider_id("gce://proj/zone/vm"),
            CloudProvider::Gcp
        );
        assert_eq!(
            CloudProvider::from_provider_id("aws:///us-east-1a/i-0abc"),
            CloudProvider::Aws
        );
        assert_eq!(
            CloudProvider::from_provider_id("azure:///subscriptions/x/virtualMachines/vm"),
            CloudProvider::Azure
        );
        assert_eq!(
            CloudProvider::from_provider_id("kind://docker/kind/kind-control-plane"),
            CloudProvider::Unknown
        );
        assert_eq!(CloudProvider::from_provider_id(""), CloudProvider::Unknown);
    }

    #[test]
    fn test_instance_from_provider_id() {
        assert_eq!(
            instance_from_provider_id("gce://proj/us-central1-a/vm-1").as_deref(),
            Some("vm-1")
        );
        assert_eq!(
            instance_from_provider_id("aws:///us-east-1a/i-0abc").as_deref(),
            Some("i-0abc")
        );
        assert_eq!(instance_from_provider_id("aws:///"), None);
    }

    #[test]
    fn test_descriptor_from_gke_node() {
        let node = gke_node();
        let descriptor = NodeDescriptor::from_node("gke-node-1", &node);

        assert_eq!(descriptor.name, "gke-node-1");
        assert_eq!(descriptor.cloud, CloudProvider::Gcp);
        assert_eq!(descriptor.instance.as_deref(), Some("gke-node-1"));
        assert_eq!(descriptor.region.as_deref(), Some("us-central1"));
        assert_eq!(descriptor.zone.as_deref(), Some("us-central1-a"));
        assert_eq!(descriptor.pool.as_deref(), Some("public-pool"));
        assert_eq!(descriptor.external_ips, vec!["34.122.10.1".parse::<IpAddr>().unwrap()]);
        assert_eq!(descriptor.internal_ips, vec!["10.128.0.7".parse::<IpAddr>().unwrap()]);
    }

    #[test]
    fn test_descriptor_legacy_labels() {
        let mut node = gke_node();
        node.metadata.labels = Some(BTreeMap::from([
            (LEGACY_REGION_LABEL.to_string(), "eu-west-1".to_string()),
            (LEGACY_ZONE_LABEL.to_string(), "eu-west-1b".to_string()),
            (
                "eks.amazonaws.com/nodegroup".to_string(),
                "ng-public".to_string(),
            ),
        ]));

        let descriptor = NodeDescriptor::from_node("gke-node-1", &node);
        assert_eq!(descriptor.region.as_deref(), Some("eu-west-1"));
        assert_eq!(descriptor.zone.as_deref(), Some("eu-west-1b"));
        assert_eq!(descriptor.pool.as_deref(), Some("ng-public"));
    }

    #[test]
    fn test_descriptor_bare_node() {
        let node = Node::default();
        let descriptor = NodeDescriptor::from_node("worker-0", &node);

        assert_eq!(descriptor.name, "worker-0");
        assert_eq!(descriptor.cloud, CloudProvider::Unknown);
        assert!(descriptor.instance.is_none());
        assert!(descriptor.region.is_none());
        assert!(descriptor.pool.is_none());
        assert!(descriptor.external_ips.is_empty());
    }

    #[test]
    fn test_descriptor_skips_unparsable_addresses() {
        let mut node = gke_node();
        node.status = Some(NodeStatus {
            addresses: Some(vec![
                address("ExternalIP", "not-an-ip"),
                address("ExternalIP", "2600:1900::1"),
            ]),
            ..Default::default()
        });

        let descriptor = NodeDescriptor::from_node("gke-node-1", &node);
        assert_eq!(descriptor.external_ips.len(), 1);
        assert!(descriptor.external_ips[0].is_ipv6());
        assert!(descriptor.internal_ips.is_empty());
    }

    #[test]
    fn test_descriptor_serializes_cloud_lowercase() {
        let descriptor = NodeDescriptor::from_node("gke-node-1", &gke_node());
        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json["cloud"], "gcp");
        assert_eq!(json["pool"], "public-pool");
    }
}

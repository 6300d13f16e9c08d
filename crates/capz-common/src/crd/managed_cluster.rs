//! AzureManagedCluster Custom Resource Definition
//!
//! The AzureManagedCluster is the infrastructure half of an AKS-backed
//! Cluster API cluster. Its control plane endpoint is written back by the
//! managed control plane reconciler after AKS provisioning completes.

use std::collections::BTreeMap;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::ApiEndpoint;
use crate::CUSTOM_HEADER_ANNOTATION_PREFIX;

/// Kind name of the AzureManagedCluster resource
pub const MANAGED_CLUSTER_KIND: &str = "AzureManagedCluster";

/// Specification for an AzureManagedCluster
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "infrastructure.cluster.x-k8s.io",
    version = "v1beta1",
    kind = "AzureManagedCluster",
    plural = "azuremanagedclusters",
    shortname = "amc",
    status = "AzureManagedClusterStatus",
    namespaced,
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.ready"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct AzureManagedClusterSpec {
    /// Endpoint used to communicate with the control plane
    ///
    /// Immutable in spirit but populated asynchronously: it may be set at
    /// create time (clusterctl move) or filled in by the reconciler later.
    #[serde(default)]
    pub control_plane_endpoint: ApiEndpoint,
}

/// Status for an AzureManagedCluster
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AzureManagedClusterStatus {
    /// True when the infrastructure is ready for the control plane
    #[serde(default)]
    pub ready: bool,
}

/// Returns true if the annotation key belongs to the custom-header namespace
pub fn is_custom_header_annotation(key: &str) -> bool {
    key.starts_with(CUSTOM_HEADER_ANNOTATION_PREFIX)
}

impl AzureManagedCluster {
    /// The custom-header annotations of this object, keyed by full annotation key
    pub fn custom_header_annotations(&self) -> BTreeMap<&str, &str> {
        self.metadata
            .annotations
            .iter()
            .flatten()
            .filter(|(key, _)| is_custom_header_annotation(key))
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect()
    }

    /// Object name, or the empty string when unset
    pub fn name_or_empty(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or_default()
    }
}

//! Custom Resource Definitions for the Azure infrastructure provider
//!
//! Only the fields consulted by admission policy are modeled in detail.

mod managed_cluster;
mod types;

pub use managed_cluster::{
    is_custom_header_annotation, AzureManagedCluster, AzureManagedClusterSpec,
    AzureManagedClusterStatus, MANAGED_CLUSTER_KIND,
};
pub use types::ApiEndpoint;

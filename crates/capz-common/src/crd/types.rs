//! Shared types used across provider CRDs

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Network endpoint of a cluster's API server
///
/// Both fields are filled in by the control plane reconciler once the
/// managed control plane is provisioned, so absent values decode as an
/// empty host and port zero.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiEndpoint {
    /// Hostname on which the API server is serving
    #[serde(default)]
    pub host: String,

    /// Port on which the API server is serving
    #[serde(default)]
    pub port: i32,
}

impl ApiEndpoint {
    /// Create an endpoint from host and port
    pub fn new(host: impl Into<String>, port: i32) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

//! Validating Admission Webhook for AzureManagedCluster
//!
//! This module adapts `admission.k8s.io/v1` AdmissionReview requests onto the
//! policy engines in [`crate::validation`]:
//! - CREATE and UPDATE requests are decoded and handed to the validator
//! - Any other operation is admitted without inspection
//! - Rejections are relayed verbatim as the response status message

pub mod managed_cluster;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::ManagedClusterValidator;

/// Path the API server calls for AzureManagedCluster validation
pub const VALIDATE_MANAGED_CLUSTER_PATH: &str =
    "/validate-infrastructure-cluster-x-k8s-io-v1beta1-azuremanagedcluster";

/// Shared state for webhook handlers
#[derive(Clone, Debug, Default)]
pub struct WebhookState {
    /// Policy applied to AzureManagedCluster requests
    pub validator: ManagedClusterValidator,
}

impl WebhookState {
    /// Create a new webhook state with the given validator
    pub fn new(validator: ManagedClusterValidator) -> Self {
        Self { validator }
    }
}

/// Create the webhook router with all validation and health endpoints
///
/// Currently supports:
/// - POST /validate-infrastructure-cluster-x-k8s-io-v1beta1-azuremanagedcluster
/// - GET /healthz and GET /readyz
pub fn webhook_router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route(
            VALIDATE_MANAGED_CLUSTER_PATH,
            post(managed_cluster::validate_handler),
        )
        .route("/healthz", get(|| async { "ok" }))
        .route("/readyz", get(|| async { "ok" }))
        .with_state(state)
}

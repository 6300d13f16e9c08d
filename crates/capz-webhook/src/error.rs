//! Error types for admission decisions and webhook transport

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use capz_common::field::{FieldError, FieldErrorList, FieldPath};
use thiserror::Error;

/// A rejected admission request
///
/// The display string is relayed verbatim to the client that issued the
/// request, so it must be complete on its own.
#[derive(Debug, Error)]
pub enum AdmissionError {
    /// The resource kind is gated behind a disabled feature
    #[error("{field}")]
    FeatureDisabled {
        /// The gate that must be enabled
        feature: String,
        /// The forbidden field error (rooted at `spec`)
        field: FieldError,
    },

    /// One or more field validations failed
    #[error("{kind} \"{name}\" is invalid: {errors}")]
    Invalid {
        /// Group-qualified kind, e.g. `AzureManagedCluster.infrastructure.cluster.x-k8s.io`
        kind: String,
        /// Object name
        name: String,
        /// Every violation found in the request
        errors: FieldErrorList,
    },
}

impl AdmissionError {
    /// Reject because `feature` is disabled
    pub fn feature_disabled(feature: impl Into<String>) -> Self {
        let feature = feature.into();
        let field = FieldError::forbidden(
            FieldPath::new("spec"),
            None,
            format!(
                "can be set only if the Cluster API '{}' feature flag is enabled",
                feature
            ),
        );
        Self::FeatureDisabled { feature, field }
    }

    /// Reject with a list of field errors
    pub fn invalid(
        kind: impl Into<String>,
        name: impl Into<String>,
        errors: FieldErrorList,
    ) -> Self {
        Self::Invalid {
            kind: kind.into(),
            name: name.into(),
            errors,
        }
    }

    /// Returns true if this rejection was caused by a disabled feature gate
    pub fn is_feature_disabled(&self) -> bool {
        matches!(self, AdmissionError::FeatureDisabled { .. })
    }

    /// All field errors carried by this rejection
    pub fn field_errors(&self) -> Vec<&FieldError> {
        match self {
            AdmissionError::FeatureDisabled { field, .. } => vec![field],
            AdmissionError::Invalid { errors, .. } => errors.iter().collect(),
        }
    }
}

/// Error type for webhook transport failures
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The request body is not a decodable AdmissionReview
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebhookError::Serialization(_) => StatusCode::BAD_REQUEST,
        };

        (status, Json(serde_json::json!({"error": self.to_string()}))).into_response()
    }
}

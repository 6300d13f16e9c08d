//! AzureManagedCluster Validation Webhook
//!
//! Handles AdmissionReview requests for AzureManagedCluster resources by
//! decoding the new (and, on update, old) object and applying the
//! [`CustomValidator`] policy.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, Json};
use capz_common::crd::{AzureManagedCluster, MANAGED_CLUSTER_KIND};
use kube::core::{
    admission::{AdmissionRequest, AdmissionResponse, AdmissionReview, Operation},
    DynamicObject,
};
use serde_json::Value;
use tracing::{debug, error, info};

use super::WebhookState;
use crate::{CustomValidator, WebhookError};

/// Handle validating admission review for AzureManagedClusters
///
/// A body that is not JSON is a transport error (400). Everything else is
/// answered in-band with an AdmissionReview response.
pub async fn validate_handler(
    State(state): State<Arc<WebhookState>>,
    body: Bytes,
) -> Result<Json<AdmissionReview<DynamicObject>>, WebhookError> {
    let review: AdmissionReview<DynamicObject> = serde_json::from_slice(&body)?;

    let req: AdmissionRequest<DynamicObject> = match review.try_into() {
        Ok(req) => req,
        Err(e) => {
            error!(error = %e, "Failed to parse admission request");
            let response = AdmissionResponse::invalid(e.to_string());
            return Ok(Json(response.into_review()));
        }
    };

    let response = review_managed_cluster(&state.validator, &req);
    Ok(Json(response.into_review()))
}

/// Apply `validator` to a single admission request
pub fn review_managed_cluster<V>(
    validator: &V,
    request: &AdmissionRequest<DynamicObject>,
) -> AdmissionResponse
where
    V: CustomValidator<AzureManagedCluster>,
{
    let uid = request.uid.as_str();

    let result = match request.operation {
        Operation::Create => {
            let new = match decode(request.object.as_ref(), "object") {
                Ok(obj) => obj,
                Err(message) => return reject_undecodable(request, message),
            };
            validator.validate_create(&new)
        }
        Operation::Update => {
            let old = match decode(request.old_object.as_ref(), "oldObject") {
                Ok(obj) => obj,
                Err(message) => return reject_undecodable(request, message),
            };
            let new = match decode(request.object.as_ref(), "object") {
                Ok(obj) => obj,
                Err(message) => return reject_undecodable(request, message),
            };
            validator.validate_update(&old, &new)
        }
        ref operation => {
            debug!(uid = %uid, operation = ?operation, "Operation not validated, allowing");
            return AdmissionResponse::from(request);
        }
    };

    match result {
        Ok(warnings) => {
            info!(
                uid = %uid,
                operation = ?request.operation,
                name = %request.name,
                warnings = warnings.len(),
                "Admitted AzureManagedCluster"
            );
            let mut response = AdmissionResponse::from(request);
            if !warnings.is_empty() {
                response.warnings = Some(warnings);
            }
            response
        }
        Err(err) => {
            info!(
                uid = %uid,
                operation = ?request.operation,
                name = %request.name,
                reason = %err,
                "Denied AzureManagedCluster"
            );
            AdmissionResponse::from(request).deny(err.to_string())
        }
    }
}

/// Decode an embedded object into an AzureManagedCluster
///
/// Absent or null fields take their zero value, so only a field of the
/// wrong type fails to decode.
fn decode(obj: Option<&DynamicObject>, field: &str) -> Result<AzureManagedCluster, String> {
    let Some(obj) = obj else {
        return Err(format!("admission request has no {}", field));
    };
    let mut obj = obj.clone();
    fill_zero_values(&mut obj.data);

    obj.try_parse::<AzureManagedCluster>().map_err(|e| {
        let msg = format!("failed to decode {}: {}", field, e);
        capz_common::Error::serialization_for_kind(MANAGED_CLUSTER_KIND, msg).to_string()
    })
}

/// Drop null fields and default a missing `spec` to an empty object
fn fill_zero_values(data: &mut Value) {
    strip_nulls(data);
    if let Value::Object(fields) = data {
        fields
            .entry("spec")
            .or_insert_with(|| Value::Object(Default::default()));
    }
}

fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(fields) => {
            fields.retain(|_, v| !v.is_null());
            fields.values_mut().for_each(strip_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_nulls),
        _ => {}
    }
}

fn reject_undecodable(
    request: &AdmissionRequest<DynamicObject>,
    message: String,
) -> AdmissionResponse {
    error!(uid = %request.uid, error = %message, "Failed to decode AzureManagedCluster");
    AdmissionResponse::from(request).deny(message)
}

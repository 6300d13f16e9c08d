//! AzureManagedCluster admission policy
//!
//! Create is gated on the `MachinePool` feature. Update freezes the
//! custom-header annotation set: once admitted, its keys and values can be
//! neither added, removed, nor changed. Everything else, including the
//! control plane endpoint, may change so the reconciler can write back the
//! AKS API server coordinates after provisioning.

use std::collections::BTreeSet;
use std::sync::Arc;

use capz_common::crd::{AzureManagedCluster, MANAGED_CLUSTER_KIND};
use capz_common::feature::{self, FeatureGate, MACHINE_POOL};
use capz_common::field::{FieldError, FieldErrorList, FieldPath};
use capz_common::INFRASTRUCTURE_GROUP;

use super::{CustomValidator, Warnings};
use crate::AdmissionError;

/// Validator for AzureManagedCluster create and update requests
#[derive(Clone, Debug)]
pub struct ManagedClusterValidator {
    gates: Arc<FeatureGate>,
}

impl Default for ManagedClusterValidator {
    /// A validator backed by the process-wide feature gate registry
    fn default() -> Self {
        Self::new(feature::gates())
    }
}

impl ManagedClusterValidator {
    /// Create a validator that consults the given registry
    pub fn new(gates: Arc<FeatureGate>) -> Self {
        Self { gates }
    }
}

impl CustomValidator<AzureManagedCluster> for ManagedClusterValidator {
    fn validate_create(&self, _obj: &AzureManagedCluster) -> Result<Warnings, AdmissionError> {
        // The control plane endpoint may arrive pre-populated when clusterctl
        // moves the object from another management cluster.
        if !self.gates.is_enabled(MACHINE_POOL) {
            return Err(AdmissionError::feature_disabled(MACHINE_POOL));
        }
        Ok(Warnings::new())
    }

    fn validate_update(
        &self,
        old: &AzureManagedCluster,
        new: &AzureManagedCluster,
    ) -> Result<Warnings, AdmissionError> {
        let errors = validate_custom_headers(old, new);
        if errors.is_empty() {
            Ok(Warnings::new())
        } else {
            Err(AdmissionError::invalid(
                format!("{}.{}", MANAGED_CLUSTER_KIND, INFRASTRUCTURE_GROUP),
                new.name_or_empty(),
                errors,
            ))
        }
    }
}

/// Compare the custom-header annotation sets of `old` and `new`
///
/// Keys are visited in sorted order so the aggregated message is stable.
fn validate_custom_headers(old: &AzureManagedCluster, new: &AzureManagedCluster) -> FieldErrorList {
    let old_headers = old.custom_header_annotations();
    let new_headers = new.custom_header_annotations();
    let annotations = FieldPath::new("metadata").child("annotations");

    let keys: BTreeSet<&str> = old_headers
        .keys()
        .chain(new_headers.keys())
        .copied()
        .collect();

    keys.into_iter()
        .filter_map(|key| {
            let path = annotations.key(key);
            match (old_headers.get(key), new_headers.get(key)) {
                (Some(before), Some(after)) if before != after => Some(FieldError::invalid(
                    path,
                    *after,
                    format!("annotation {} is immutable", key),
                )),
                (Some(before), None) => Some(FieldError::forbidden(
                    path,
                    Some(*before),
                    format!("annotation {} cannot be removed", key),
                )),
                (None, Some(after)) => Some(FieldError::forbidden(
                    path,
                    Some(*after),
                    format!("annotation {} cannot be added", key),
                )),
                _ => None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use capz_common::crd::{ApiEndpoint, AzureManagedClusterSpec};
    use capz_common::field::FieldErrorType;
    use capz_common::CUSTOM_HEADER_ANNOTATION_PREFIX as P;
    use rstest::rstest;

    const AKS_HOST: &str = "aks-8622-h4h26c44.hcp.eastus.azmk8s.io";
    const SOME_FEATURE: &str = "infrastructure.cluster.x-k8s.io/custom-header-SomeFeature";
    const ANOTHER_FEATURE: &str = "infrastructure.cluster.x-k8s.io/custom-header-AnotherFeature";

    fn header(feature: &str) -> String {
        format!("{}{}", P, feature)
    }

    fn cluster(annotations: &[(&str, &str)], endpoint: ApiEndpoint) -> AzureManagedCluster {
        let mut amc = AzureManagedCluster::new(
            "my-cluster",
            AzureManagedClusterSpec {
                control_plane_endpoint: endpoint,
            },
        );
        amc.metadata.annotations = Some(
            annotations
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        amc
    }

    fn annotated(annotations: &[(&str, &str)]) -> AzureManagedCluster {
        cluster(annotations, ApiEndpoint::default())
    }

    fn with_endpoint(endpoint: ApiEndpoint) -> AzureManagedCluster {
        let mut amc = cluster(&[], endpoint);
        amc.metadata.annotations = None;
        amc
    }

    fn validator_with_machine_pool(enabled: bool) -> ManagedClusterValidator {
        let gates = FeatureGate::with_defaults();
        gates.set(MACHINE_POOL, enabled).unwrap();
        ManagedClusterValidator::new(Arc::new(gates))
    }

    fn empty_cluster() -> AzureManagedCluster {
        AzureManagedCluster::new("", AzureManagedClusterSpec::default())
    }

    // =========================================================================
    // Update policy
    // =========================================================================

    #[rstest]
    #[case::custom_header_value_is_immutable(
        annotated(&[(SOME_FEATURE, "true")]),
        annotated(&[(SOME_FEATURE, "false")]),
        true
    )]
    #[case::custom_header_cannot_be_removed(
        annotated(&[(SOME_FEATURE, "true")]),
        annotated(&[]),
        true
    )]
    #[case::custom_header_cannot_be_added(
        annotated(&[(SOME_FEATURE, "true")]),
        annotated(&[(SOME_FEATURE, "true"), (ANOTHER_FEATURE, "true")]),
        true
    )]
    #[case::non_custom_header_annotations_are_mutable(
        annotated(&[("annotation-a", "true"), (SOME_FEATURE, "true")]),
        annotated(&[(SOME_FEATURE, "true"), ("annotation-b", "true")]),
        false
    )]
    #[case::control_plane_port_can_be_populated(
        with_endpoint(ApiEndpoint::new(AKS_HOST, 0)),
        with_endpoint(ApiEndpoint::new(AKS_HOST, 443)),
        false
    )]
    #[case::control_plane_host_can_be_populated(
        with_endpoint(ApiEndpoint::new("", 443)),
        with_endpoint(ApiEndpoint::new(AKS_HOST, 443)),
        false
    )]
    fn test_validate_update(
        #[case] old: AzureManagedCluster,
        #[case] new: AzureManagedCluster,
        #[case] want_err: bool,
    ) {
        let validator = validator_with_machine_pool(true);
        let result = validator.validate_update(&old, &new);
        assert_eq!(result.is_err(), want_err, "unexpected result: {:?}", result);
        if let Ok(warnings) = result {
            assert!(warnings.is_empty());
        }
    }

    #[test]
    fn test_value_change_reports_invalid_value() {
        let key = SOME_FEATURE;
        let old = annotated(&[(key, "true")]);
        let new = annotated(&[(key, "false")]);

        let err = validator_with_machine_pool(true)
            .validate_update(&old, &new)
            .unwrap_err();
        let fields = err.field_errors();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].error_type, FieldErrorType::Invalid);
        assert_eq!(
            fields[0].field.as_str(),
            format!("metadata.annotations[{}]", key)
        );
        assert_eq!(fields[0].bad_value.as_deref(), Some("false"));
        assert_eq!(fields[0].detail, format!("annotation {} is immutable", key));
    }

    #[test]
    fn test_removal_and_addition_details() {
        let (some, another) = (SOME_FEATURE, ANOTHER_FEATURE);

        let err = validator_with_machine_pool(true)
            .validate_update(&annotated(&[(some, "true")]), &annotated(&[]))
            .unwrap_err();
        let removed = err.field_errors()[0];
        assert_eq!(
            removed.detail,
            format!("annotation {} cannot be removed", some)
        );
        assert_eq!(removed.error_type, FieldErrorType::Forbidden);
        assert_eq!(removed.bad_value.as_deref(), Some("true"));

        let err = validator_with_machine_pool(true)
            .validate_update(
                &annotated(&[(some, "true")]),
                &annotated(&[(some, "true"), (another, "false")]),
            )
            .unwrap_err();
        assert_eq!(err.field_errors().len(), 1);
        let added = err.field_errors()[0];
        assert_eq!(
            added.detail,
            format!("annotation {} cannot be added", another)
        );
        assert_eq!(added.error_type, FieldErrorType::Forbidden);
        assert_eq!(added.bad_value.as_deref(), Some("false"));
    }

    /// Story: an operator changes several custom headers at once and sees
    /// every violation in a single rejection
    #[test]
    fn story_all_violations_are_aggregated() {
        let a = header("A");
        let b = header("B");
        let c = header("C");
        let old = annotated(&[(a.as_str(), "1"), (b.as_str(), "1"), ("plain", "x")]);
        let new = annotated(&[(a.as_str(), "2"), (c.as_str(), "1"), ("plain", "y")]);

        let err = validator_with_machine_pool(true)
            .validate_update(&old, &new)
            .unwrap_err();

        let errors = err.field_errors();
        let details: Vec<&str> = errors.iter().map(|e| e.detail.as_str()).collect();
        assert_eq!(
            details,
            vec![
                format!("annotation {} is immutable", a),
                format!("annotation {} cannot be removed", b),
                format!("annotation {} cannot be added", c),
            ]
        );

        let msg = err.to_string();
        assert!(msg.starts_with(
            "AzureManagedCluster.infrastructure.cluster.x-k8s.io \"my-cluster\" is invalid: ["
        ));
        assert!(!msg.contains("plain"));
    }

    #[test]
    fn test_identity_update_is_accepted() {
        let amc = cluster(
            &[
                (SOME_FEATURE, "true"),
                (ANOTHER_FEATURE, "false"),
                ("annotation-a", "x"),
            ],
            ApiEndpoint::new(AKS_HOST, 443),
        );
        let validator = validator_with_machine_pool(false);
        assert!(validator.validate_update(&amc, &amc).unwrap().is_empty());
    }

    #[test]
    fn test_changes_outside_custom_headers_are_accepted() {
        let key = SOME_FEATURE;
        let old = cluster(&[(key, "true"), ("a", "1")], ApiEndpoint::default());
        let mut new = cluster(&[(key, "true"), ("b", "2")], ApiEndpoint::new("h", 6443));
        new.metadata.labels = Some([("team".to_string(), "infra".to_string())].into());

        assert!(validator_with_machine_pool(true)
            .validate_update(&old, &new)
            .is_ok());
    }

    #[test]
    fn test_missing_annotations_map_equals_empty_map() {
        let old = with_endpoint(ApiEndpoint::default());
        let new = annotated(&[]);
        assert!(validator_with_machine_pool(true)
            .validate_update(&old, &new)
            .is_ok());
        assert!(validator_with_machine_pool(true)
            .validate_update(&new, &old)
            .is_ok());
    }

    #[test]
    fn test_bare_prefix_is_a_custom_header() {
        let old = annotated(&[(P, "x")]);
        let new = annotated(&[]);
        assert!(validator_with_machine_pool(true)
            .validate_update(&old, &new)
            .is_err());
    }

    #[test]
    fn test_update_ignores_feature_gate() {
        let amc = annotated(&[(SOME_FEATURE, "true")]);
        assert!(validator_with_machine_pool(false)
            .validate_update(&amc, &amc)
            .is_ok());
    }

    // =========================================================================
    // Create policy
    // =========================================================================

    #[rstest]
    #[case::control_plane_host_set_during_move(with_endpoint(ApiEndpoint::new("my-host", 0)))]
    #[case::control_plane_port_set_during_move(with_endpoint(ApiEndpoint::new("", 4443)))]
    #[case::empty_cluster(empty_cluster())]
    fn test_validate_create_with_machine_pool(#[case] amc: AzureManagedCluster) {
        let warnings = validator_with_machine_pool(true)
            .validate_create(&amc)
            .unwrap();
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_validate_create_feature_explicitly_disabled() {
        let err = validator_with_machine_pool(false)
            .validate_create(&empty_cluster())
            .unwrap_err();
        assert!(err.is_feature_disabled());
        assert!(err.to_string().contains("'MachinePool' feature flag"));
    }

    #[test]
    fn test_validate_create_feature_implicitly_disabled() {
        let validator = ManagedClusterValidator::new(Arc::new(FeatureGate::with_defaults()));
        let err = validator.validate_create(&empty_cluster()).unwrap_err();
        assert!(matches!(
            err,
            AdmissionError::FeatureDisabled { ref feature, .. } if feature == MACHINE_POOL
        ));
    }

    /// Story: a test scope enables MachinePool; creates are admitted only
    /// while the override is in place
    #[test]
    fn story_create_follows_gate_at_call_time() {
        let gates = Arc::new(FeatureGate::with_defaults());
        let validator = ManagedClusterValidator::new(Arc::clone(&gates));
        let amc = with_endpoint(ApiEndpoint::new("my-host", 0));

        assert!(validator.validate_create(&amc).is_err());
        {
            let _guard = gates.set_during_test(MACHINE_POOL, true).unwrap();
            assert!(validator.validate_create(&amc).is_ok());
        }
        assert!(validator.validate_create(&amc).is_err());
    }

    #[test]
    fn test_default_validator_uses_process_registry() {
        // The global registry is never mutated by this crate's unit tests
        let validator = ManagedClusterValidator::default();
        assert!(validator.validate_create(&empty_cluster()).is_err());
    }
}

//! Common types for the Azure cluster API provider: CRDs, feature gates,
//! field errors, and telemetry

#![deny(missing_docs)]

pub mod crd;
pub mod error;
pub mod feature;
pub mod field;
pub mod telemetry;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// API group for infrastructure provider resources
pub const INFRASTRUCTURE_GROUP: &str = "infrastructure.cluster.x-k8s.io";

/// Reserved annotation prefix for provider custom headers
///
/// Any annotation key beginning with this literal prefix is a custom-header
/// annotation. The suffix names a provider capability and is opaque here.
pub const CUSTOM_HEADER_ANNOTATION_PREFIX: &str = "infrastructure.cluster.x-k8s.io/custom-header-";

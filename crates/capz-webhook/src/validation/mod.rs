//! Admission policy engines
//!
//! A validator is a pure function of its inputs and the feature gate
//! registry: it performs no I/O, does not log, and never mutates the objects
//! it is given. The [`webhook`](crate::webhook) layer owns request decoding,
//! logging, and response encoding.

mod managed_cluster;

pub use managed_cluster::ManagedClusterValidator;

use crate::AdmissionError;

/// Non-fatal messages returned to the client alongside an admission decision
pub type Warnings = Vec<String>;

/// Create/update admission policy for a resource kind `K`
pub trait CustomValidator<K>: Send + Sync {
    /// Decide whether `obj` may be created
    fn validate_create(&self, obj: &K) -> Result<Warnings, AdmissionError>;

    /// Decide whether `old` may be replaced by `new`
    fn validate_update(&self, old: &K, new: &K) -> Result<Warnings, AdmissionError>;
}

//! Error types shared by the provider crates
//!
//! Errors carry the offending name or key so a failed startup points
//! directly at the misconfigured value.

use thiserror::Error;

/// Main error type for shared provider operations
#[derive(Debug, Error)]
pub enum Error {
    /// A feature gate name that is not registered
    #[error("unrecognized feature gate: {name}")]
    UnknownFeature {
        /// The name that was looked up
        name: String,
    },

    /// A feature gate assignment whose value is not a boolean
    #[error("invalid value of {name}={value}, err: expected true or false")]
    InvalidFeatureValue {
        /// Feature gate name
        name: String,
        /// The value that failed to parse
        value: String,
    },

    /// A feature gate entry that is not of the form `name=value`
    #[error("missing bool value for feature gate entry '{entry}'")]
    MalformedFeatureSpec {
        /// The raw entry
        entry: String,
    },

    /// Invalid process configuration
    #[error("configuration error for {key}: {message}")]
    Config {
        /// Configuration key (environment variable name)
        key: String,
        /// Description of what's invalid
        message: String,
    },

    /// Serialization/deserialization error
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of what failed
        message: String,
        /// The resource kind being serialized (if known)
        kind: Option<String>,
    },
}

impl Error {
    /// Create an unknown feature error
    pub fn unknown_feature(name: impl Into<String>) -> Self {
        Self::UnknownFeature { name: name.into() }
    }

    /// Create a configuration error for the given key
    pub fn config(key: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Config {
            key: key.into(),
            message: msg.into(),
        }
    }

    /// Create a serialization error with resource kind context
    pub fn serialization_for_kind(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: Some(kind.into()),
        }
    }

    /// Returns true if this error was caused by feature gate configuration
    pub fn is_feature_gate_error(&self) -> bool {
        matches!(
            self,
            Error::UnknownFeature { .. }
                | Error::InvalidFeatureValue { .. }
                | Error::MalformedFeatureSpec { .. }
        )
    }
}

//! Validating admission webhook for AzureManagedCluster resources
//!
//! # Modules
//!
//! - [`validation`] - Admission policy engines (create/update rules)
//! - [`webhook`] - HTTP adapter from `AdmissionReview` onto the validators
//! - [`server`] - TLS server hosting the webhook router
//! - [`config`] - Environment configuration for the server binary
//! - [`error`] - Admission and transport error types

#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod server;
pub mod validation;
pub mod webhook;

pub use error::{AdmissionError, WebhookError};
pub use validation::{CustomValidator, ManagedClusterValidator, Warnings};

/// Default port for the webhook HTTPS server
pub const DEFAULT_WEBHOOK_PORT: u16 = 9443;

/// Default directory holding the serving certificate and key
pub const DEFAULT_CERT_DIR: &str = "/tmp/k8s-webhook-server/serving-certs";

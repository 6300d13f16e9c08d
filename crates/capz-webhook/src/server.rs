//! HTTPS server hosting the webhook router
//!
//! The API server only calls webhooks over TLS; the serving certificate is
//! mounted into the pod (typically by cert-manager) at the configured paths.

use std::sync::Arc;

use axum_server::tls_rustls::RustlsConfig;
use thiserror::Error;
use tracing::{error, info};

use crate::config::WebhookConfig;
use crate::webhook::{webhook_router, WebhookState};
use crate::ManagedClusterValidator;

/// Errors that can occur while running the webhook server
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to load the serving certificate or key
    #[error("Failed to configure TLS from {path}: {message}")]
    TlsConfig {
        /// Certificate path that was loaded
        path: String,
        /// Underlying failure
        message: String,
    },
    /// The listener failed
    #[error("Webhook server error: {0}")]
    Io(#[from] std::io::Error),
}

/// The webhook HTTPS server
pub struct WebhookServer {
    config: WebhookConfig,
    state: Arc<WebhookState>,
}

impl WebhookServer {
    /// Create a server that applies `validator` to incoming reviews
    pub fn new(config: WebhookConfig, validator: ManagedClusterValidator) -> Self {
        Self {
            config,
            state: Arc::new(WebhookState::new(validator)),
        }
    }

    /// Load the serving certificate
    pub async fn tls_config(&self) -> Result<RustlsConfig, ServerError> {
        let cert_path = self.config.cert_path();
        RustlsConfig::from_pem_file(&cert_path, self.config.key_path())
            .await
            .map_err(|e| ServerError::TlsConfig {
                path: cert_path.display().to_string(),
                message: e.to_string(),
            })
    }

    /// Serve until the listener fails
    pub async fn run(self) -> Result<(), ServerError> {
        let tls_config = self.tls_config().await?;
        let addr = self.config.addr;
        let app = webhook_router(Arc::clone(&self.state));

        info!(addr = %addr, "Starting webhook HTTPS server");
        axum_server::bind_rustls(addr, tls_config)
            .serve(app.into_make_service())
            .await
            .map_err(|e| {
                error!(error = %e, "Webhook server error");
                ServerError::Io(e)
            })
    }
}

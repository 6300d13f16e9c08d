//! AzureManagedCluster validating admission webhook server

use anyhow::Context;
use capz_common::feature;
use capz_common::telemetry::{init_telemetry, TelemetryConfig};
use tracing::info;

use capz_webhook::config::WebhookConfig;
use capz_webhook::server::WebhookServer;
use capz_webhook::ManagedClusterValidator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = rustls::crypto::aws_lc_rs::default_provider().install_default() {
        eprintln!("CRITICAL: Failed to install crypto provider: {:?}", e);
        std::process::exit(1);
    }

    init_telemetry(TelemetryConfig {
        service_name: "capz-webhook".to_string(),
        ..Default::default()
    })?;

    let config = WebhookConfig::from_env().context("loading webhook configuration")?;

    let gates = feature::gates();
    if let Some(spec) = &config.feature_gates {
        gates
            .set_from_spec(spec)
            .with_context(|| format!("applying feature gates '{}'", spec))?;
    }
    for line in gates.known_features() {
        info!(feature = %line, "Known feature gate");
    }
    info!(
        machine_pool = gates.is_enabled(feature::MACHINE_POOL),
        "Feature gates configured"
    );

    let server = WebhookServer::new(config, ManagedClusterValidator::new(gates));
    server.run().await?;
    Ok(())
}

//! Webhook server configuration
//!
//! Read from environment variables so the same image runs unchanged under
//! any manifest. Defaults follow the controller-runtime webhook layout.

use std::net::SocketAddr;
use std::path::PathBuf;

use capz_common::{Error, Result};

use crate::{DEFAULT_CERT_DIR, DEFAULT_WEBHOOK_PORT};

/// Listen address (`host:port`)
pub const ENV_ADDR: &str = "CAPZ_WEBHOOK_ADDR";
/// Directory holding the serving certificate and key
pub const ENV_CERT_DIR: &str = "CAPZ_WEBHOOK_CERT_DIR";
/// File name of the serving certificate inside the cert dir
pub const ENV_CERT_NAME: &str = "CAPZ_WEBHOOK_CERT_NAME";
/// File name of the serving key inside the cert dir
pub const ENV_KEY_NAME: &str = "CAPZ_WEBHOOK_KEY_NAME";
/// Feature gate overrides, e.g. `MachinePool=true,EdgeZone=false`
pub const ENV_FEATURE_GATES: &str = "FEATURE_GATES";

/// Configuration for the webhook server binary
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebhookConfig {
    /// Address to bind the HTTPS listener to
    pub addr: SocketAddr,
    /// Directory holding the serving certificate and key
    pub cert_dir: PathBuf,
    /// Certificate file name inside `cert_dir`
    pub cert_name: String,
    /// Key file name inside `cert_dir`
    pub key_name: String,
    /// Feature gate overrides to apply at startup
    pub feature_gates: Option<String>,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_WEBHOOK_PORT)),
            cert_dir: PathBuf::from(DEFAULT_CERT_DIR),
            cert_name: "tls.crt".to_string(),
            key_name: "tls.key".to_string(),
            feature_gates: None,
        }
    }
}

impl WebhookConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(addr) = get(ENV_ADDR) {
            config.addr = match addr.trim().parse() {
                Ok(parsed) => parsed,
                Err(e) => {
                    let msg = format!("invalid socket address '{}': {}", addr, e);
                    return Err(Error::config(ENV_ADDR, msg));
                }
            };
        }
        if let Some(dir) = get(ENV_CERT_DIR) {
            config.cert_dir = PathBuf::from(dir);
        }
        if let Some(name) = get(ENV_CERT_NAME) {
            config.cert_name = name;
        }
        if let Some(name) = get(ENV_KEY_NAME) {
            config.key_name = name;
        }
        config.feature_gates = get(ENV_FEATURE_GATES);

        Ok(config)
    }

    /// Full path of the serving certificate
    pub fn cert_path(&self) -> PathBuf {
        self.cert_dir.join(&self.cert_name)
    }

    /// Full path of the serving key
    pub fn key_path(&self) -> PathBuf {
        self.cert_dir.join(&self.key_name)
    }
}

use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Top-level configuration shared by the server, the CLI and every feature slice.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfigInner {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub payment: PaymentConfig,
    pub relay: RelayConfig,
    pub contract: ContractConfig,
    pub logging: LoggingConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(flatten, default)]
    inner: Arc<ApiConfigInner>,
}

impl Deref for ApiConfig {
    type Target = ApiConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ApiConfig {
    fn deref_mut(&mut self) -> &mut ApiConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

impl ApiConfig {
    /// Names of the settings that must be filled before the server may start.
    #[must_use]
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.payment.secret_key.trim().is_empty() {
            missing.push("payment.secret_key");
        }
        if self.relay.webhook_url.trim().is_empty() {
            missing.push("relay.webhook_url");
        }
        missing
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub ssl: Option<SslConfig>,
}

/// TLS certificate/key paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Cross-origin access for the browser wizard.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origin: String,
}

/// Stripe Checkout credentials and endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaymentConfig {
    pub secret_key: String,
    pub api_base: String,
    /// Price used when a checkout request does not name one.
    pub default_price_id: Option<String>,
    pub timeout_secs: u64,
}

/// Delivery of accepted submissions to the automation webhook.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub webhook_url: String,
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub backoff_factor: u32,
    pub max_delay_ms: u64,
    pub timeout_secs: u64,
    pub failed_dir: PathBuf,
}

#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Image drawn in the BRITE signature box (PNG or JPEG).
    pub counter_signature: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Filter directives overriding `level` and `RUST_LOG`.
    pub filter: Option<String>,
    pub directory: Option<PathBuf>,
    pub json: bool,
    pub max_files: usize,
}

impl PaymentConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl RelayConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub const fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    #[must_use]
    pub const fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: 3000, ssl: None }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("cert.pem"), key: PathBuf::from("key.pem") }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self { allowed_origin: "http://localhost:5173".to_owned() }
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            api_base: "https://api.stripe.com".to_owned(),
            default_price_id: None,
            timeout_secs: 15,
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            max_attempts: 4,
            base_delay_ms: 1000,
            backoff_factor: 2,
            max_delay_ms: 30_000,
            timeout_secs: 30,
            failed_dir: PathBuf::from("logs/failed-payloads"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), filter: None, directory: None, json: false, max_files: 10 }
    }
}

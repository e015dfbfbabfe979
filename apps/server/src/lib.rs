//! # BRITE Server
//!
//! HTTP backend of the practice onboarding wizard, built on `Axum`: step validation,
//! Stripe checkout, agreement rendering and the webhook relay.
//!
//! ## Example
//! ```no_run
//! use brite_server::Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Server::builder()
//!         .port(3000)
//!         .build()
//!         .await?
//!         .run()
//!         .await
//! }
//! ```

pub mod router;

use anyhow::{Context, Result, anyhow};
use axum_server::Handle;
use brite::domain::config::{ApiConfig, LoggingConfig};
use brite::kernel::server::ApiState;
use brite::storage::Storage;
use brite_logger::{Logger, parse_level};
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

/// Installs the global logger described by `cfg`.
///
/// # Errors
/// Fails on an unknown level, an invalid filter or an unusable log directory.
pub fn init_logger(name: &str, cfg: &LoggingConfig) -> Result<Logger> {
    let builder = Logger::builder()
        .name(name)
        .level(parse_level(&cfg.level)?)
        .console_json(cfg.json)
        .env_filter(cfg.filter.clone().unwrap_or_default());

    let logger = match &cfg.directory {
        Some(directory) => builder.directory(directory).max_files(cfg.max_files).json(cfg.json).init()?,
        None => builder.init()?,
    };
    Ok(logger)
}

/// A fluent builder for configuring and initializing the [`Server`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    cfg: ApiConfig,
}

impl ServerBuilder {
    /// Set up the server's configuration.
    pub fn config(mut self, cfg: ApiConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.cfg.server.port = port;
        self
    }

    fn validate_required(&self) -> Result<()> {
        let missing = self.cfg.missing_required();
        if missing.is_empty() {
            return Ok(());
        }
        Err(anyhow!("Missing required configuration: {}", missing.join(", ")))
    }

    fn validate_ssl_config(&self) -> Result<()> {
        if let Some(ssl) = &self.cfg.server.ssl {
            if !ssl.cert.exists() {
                anyhow::bail!("SSL certificate not found at: {}", ssl.cert.display());
            }
            if !ssl.key.exists() {
                anyhow::bail!("SSL key not found at: {}", ssl.key.display());
            }

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let metadata = ssl.key.metadata()?;
                if metadata.permissions().mode() & 0o077 != 0 {
                    tracing::warn!(
                        "SECURITY: SSL Private Key {} has insecure permissions (should be 600)",
                        ssl.key.display()
                    );
                }
            }
        }
        Ok(())
    }

    /// Consumes the builder and initializes the server.
    ///
    /// # Process
    /// 1. Refuses to start without the Stripe key and the webhook URL
    /// 2. Opens the dead-letter directory
    /// 3. Initializes every feature slice
    /// 4. Constructs application state
    ///
    /// # Errors
    /// Returns an error if:
    /// * Required settings are blank
    /// * The dead-letter directory cannot be created
    /// * A slice fails to initialize (unreadable counter-signature, HTTP client setup)
    /// * SSL certificate/key files are missing
    pub async fn build(self) -> Result<Server> {
        self.validate_required()?;
        self.validate_ssl_config()?;

        let address = SocketAddr::new(self.cfg.server.address, self.cfg.server.port);
        info!(address = %address, "Initializing server");

        let failed_dir = &self.cfg.relay.failed_dir;
        let storage = Storage::builder()
            .root(failed_dir)
            .connect()
            .await
            .with_context(|| format!("Failed to open dead-letter directory {}", failed_dir.display()))?;

        let slices = brite::init(&self.cfg, storage).context("Platform bootstrap failed")?;

        let state = ApiState::builder()
            .config(self.cfg)
            .register_slices(slices)
            .build()
            .context("Failed to finalize API state registry")?;
        Ok(Server { state })
    }
}

/// A fully initialized server instance ready to run.
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct Server {
    state: ApiState,
}

impl Server {
    /// Returns a new [`ServerBuilder`] to configure the server.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Starts the server and runs until the shutdown signal is received.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind to the configured address
    /// or if SSL/TLS setup fails.
    pub async fn run(self) -> Result<()> {
        let cfg = self.state.config.clone();
        let address = SocketAddr::new(cfg.server.address, cfg.server.port);

        info!(
            address = %address,
            ssl = cfg.server.ssl.is_some(),
            origin = %cfg.cors.allowed_origin,
            "Starting server"
        );

        let app = router::init(self.state)?;

        let handle = Handle::<SocketAddr>::new();
        let shutdown_handle = handle.clone();

        tokio::spawn(async move {
            if let Err(e) = shutdown_signal().await {
                error!("Error while waiting for shutdown signal: {e}");
                return;
            }
            info!("Shutdown signal received, starting graceful shutdown...");
            shutdown_handle.graceful_shutdown(Some(std::time::Duration::from_secs(30)));
        });

        if let Some(ssl_config) = &cfg.server.ssl {
            info!("Starting HTTPS server on https://{address}");

            let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
                &ssl_config.cert,
                &ssl_config.key,
            )
            .await
            .context("Failed to load SSL/TLS certificates")?;

            axum_server::bind_rustls(address, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .context("HTTPS server failed")?;
        } else {
            info!("Starting HTTP server on http://{address}");

            axum_server::bind(address)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .context("HTTP server failed")?;
        }

        info!("Server shutdown complete");
        Ok(())
    }

    /// Returns a reference to the application state.
    #[must_use]
    pub const fn state(&self) -> &ApiState {
        &self.state
    }
}

/// Listens for shutdown signals (Ctrl+C, SIGTERM).
async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("Failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<_, anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        res = ctrl_c => {
            res.context("Ctrl+C signal received")?;
        },
        res = terminate => {
            res.context("SIGTERM signal received")?;
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn refuses_to_start_without_required_settings() {
        let err = Server::builder().build().await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("payment.secret_key"), "{message}");
        assert!(message.contains("relay.webhook_url"), "{message}");
    }
}

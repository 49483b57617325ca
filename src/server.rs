use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;

use crate::config::Config;
use crate::core_network::{self, PassivePool};
use crate::core_registry::EndpointHandlers;

/// Immutable per-process state shared by every control connection.
pub struct ServerContext {
    /// External address placed in PASV replies.
    pub internet_host_address: String,
    pub is_tls_only: bool,
    pub tls: Option<TlsAcceptor>,
    pub pool: PassivePool,
}

pub struct FtpServer {
    listen_port: u16,
    context: Arc<ServerContext>,
    registry: Arc<dyn EndpointHandlers>,
}

impl FtpServer {
    pub fn new(config: &Config, registry: Arc<dyn EndpointHandlers>) -> Result<Self> {
        let tls = match &config.tls {
            Some(tls_config) => Some(
                tls_config
                    .build_acceptor()
                    .context("Failed to build the TLS acceptor")?,
            ),
            None => None,
        };
        let pool = PassivePool::new(&config.server.passive_ports, tls.clone());
        let context = Arc::new(ServerContext {
            internet_host_address: config.server.pasv_address.clone(),
            is_tls_only: config.server.tls_only,
            tls,
            pool,
        });
        Ok(Self {
            listen_port: config.server.listen_port,
            context,
            registry,
        })
    }

    pub fn context(&self) -> Arc<ServerContext> {
        Arc::clone(&self.context)
    }

    /// Binds the configured control port and serves until the process ends.
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(("0.0.0.0", self.listen_port))
            .await
            .with_context(|| format!("Failed to bind control port {}", self.listen_port))?;
        self.serve(listener).await
    }

    /// Serves on an already-bound listener (tests bind port 0 themselves).
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        core_network::start_server(listener, self.context, self.registry).await
    }
}

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core_tls::TlsConfig;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub listen_port: u16,
    /// External address clients are told to connect to in the PASV reply.
    pub pasv_address: String,
    /// Fixed pool of ports used for passive data connections.
    pub passive_ports: Vec<u16>,
    /// When set, every command outside the connection-lifecycle tier is
    /// refused until the control channel has been upgraded with AUTH TLS.
    #[serde(default)]
    pub tls_only: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Static credentials, one `username:password` entry per line.
    pub users: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub tls: Option<TlsConfig>,
    pub auth: Option<AuthConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_port: crate::constants::DEFAULT_LISTEN_PORT,
            pasv_address: String::from("127.0.0.1"),
            passive_ports: Vec::new(),
            tls_only: false,
        }
    }
}

impl Config {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path))?;
        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse configuration file: {}", path))?;
        Ok(config)
    }
}

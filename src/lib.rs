//! Protocol-level FTP front-end.
//!
//! Terminates FTP control connections, negotiates an explicit TLS upgrade
//! (RFC 4217 / RFC 2228 `AUTH TLS`, `PBSZ`, `PROT`), authenticates sessions
//! and brokers passive-mode data connections over a fixed pool of listening
//! ports. Storage semantics (password checks, directory listings, file
//! metadata) are supplied by the embedding application through the
//! [`core_registry::EndpointHandlers`] trait.

pub mod config;
pub mod constants;
pub mod core_channel;
pub mod core_cli;
pub mod core_ftpcommand;
pub mod core_network;
pub mod core_registry;
pub mod core_tls;
pub mod server;
pub mod session;

pub use config::{AuthConfig, Config, ServerConfig};
pub use core_registry::{EndpointHandlers, FileEntry, LookupError, PasswordCheck};
pub use server::FtpServer;

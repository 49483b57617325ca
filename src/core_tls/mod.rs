// SSL/TLS support for the control and data channels (RFC 4217 explicit TLS).

pub mod error;
pub mod tls_config;

pub use error::TlsError;
pub use tls_config::TlsConfig;

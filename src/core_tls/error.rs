use thiserror::Error;

#[derive(Debug, Error)]
pub enum TlsError {
    #[error("Failed to load SSL certificate: {0}")]
    CertificateLoadError(String),

    #[error("Failed to load SSL private key: {0}")]
    PrivateKeyLoadError(String),

    #[error("TLS configuration error: {0}")]
    TlsConfigError(String),

    #[error("Unknown cipher suite requested: {0}")]
    UnknownCipherSuite(String),
}

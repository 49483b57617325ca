use std::path::PathBuf;
use std::sync::Arc;

use rustls::crypto::{ring, CryptoProvider};
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use serde::{Deserialize, Serialize};
use tokio_rustls::TlsAcceptor;

use crate::core_tls::error::TlsError;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to the PEM certificate chain.
    pub cert_file: PathBuf,

    /// Path to the PEM private key.
    pub key_file: PathBuf,

    /// Optional explicit cipher list, by rustls suite name
    /// (e.g. `TLS13_AES_256_GCM_SHA384`). The baseline provider suites are
    /// used when absent.
    pub ciphers: Option<Vec<String>>,
}

impl TlsConfig {
    /// Builds the acceptor used for both the control-channel upgrade and
    /// passive data connections.
    pub fn build_acceptor(&self) -> Result<TlsAcceptor, TlsError> {
        let cert_chain = load_certs(&self.cert_file)?;
        let private_key = load_private_key(&self.key_file)?;

        let baseline = ring::default_provider();
        let cipher_suites = match &self.ciphers {
            None => baseline.cipher_suites.clone(),
            Some(names) => select_cipher_suites(&baseline, names)?,
        };
        let provider = CryptoProvider {
            cipher_suites,
            ..baseline
        };

        let config = rustls::ServerConfig::builder_with_provider(Arc::new(provider))
            .with_safe_default_protocol_versions()
            .map_err(|e| TlsError::TlsConfigError(e.to_string()))?
            .with_no_client_auth()
            .with_single_cert(cert_chain, private_key)
            .map_err(|e| TlsError::TlsConfigError(e.to_string()))?;

        Ok(TlsAcceptor::from(Arc::new(config)))
    }
}

fn load_certs(path: &PathBuf) -> Result<Vec<CertificateDer<'static>>, TlsError> {
    let bytes =
        std::fs::read(path).map_err(|e| TlsError::CertificateLoadError(e.to_string()))?;
    let certs: Vec<CertificateDer<'static>> = rustls_pemfile::certs(&mut bytes.as_slice())
        .collect::<Result<_, _>>()
        .map_err(|e| TlsError::CertificateLoadError(e.to_string()))?;
    if certs.is_empty() {
        return Err(TlsError::CertificateLoadError(format!(
            "No certificate found in {:?}",
            path
        )));
    }
    Ok(certs)
}

fn load_private_key(path: &PathBuf) -> Result<PrivateKeyDer<'static>, TlsError> {
    let bytes = std::fs::read(path).map_err(|e| TlsError::PrivateKeyLoadError(e.to_string()))?;
    rustls_pemfile::private_key(&mut bytes.as_slice())
        .map_err(|e| TlsError::PrivateKeyLoadError(e.to_string()))?
        .ok_or_else(|| TlsError::PrivateKeyLoadError(format!("No private key found in {:?}", path)))
}

fn select_cipher_suites(
    provider: &CryptoProvider,
    names: &[String],
) -> Result<Vec<rustls::SupportedCipherSuite>, TlsError> {
    let mut selected = Vec::with_capacity(names.len());
    for name in names {
        let found = provider
            .cipher_suites
            .iter()
            .find(|s| format!("{:?}", s.suite()).eq_ignore_ascii_case(name));
        match found {
            Some(suite) => selected.push(*suite),
            None => return Err(TlsError::UnknownCipherSuite(name.clone())),
        }
    }
    Ok(selected)
}

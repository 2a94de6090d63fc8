use {
    crate::{Error, Result},
    serde::Deserialize,
    std::path::PathBuf,
};

/// PEM encoded certificate chain and private key used for HTTPS.
///
/// ```toml
/// [http.tls]
/// cert_file = "/etc/certs/server.crt"
/// key_file = "{{ TLS_KEY_FILE }}"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct HttpTlsConfig {
    /// Certificate chain, leaf first.
    pub cert_file: PathBuf,

    /// Private key (PKCS#8, PKCS#1 or SEC1).
    pub key_file: PathBuf,
}

impl HttpTlsConfig {
    pub fn new(cert_file: impl Into<PathBuf>, key_file: impl Into<PathBuf>) -> Self {
        Self {
            cert_file: cert_file.into(),
            key_file: key_file.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.cert_file.as_os_str().is_empty() {
            return Err(Error::invalid_input(
                "TLS cert_file is required. Set [http.tls] cert_file = \"server.crt\" in config.",
            ));
        }
        if self.key_file.as_os_str().is_empty() {
            return Err(Error::invalid_input(
                "TLS key_file is required. Set [http.tls] key_file = \"server.key\" in config.",
            ));
        }
        Ok(())
    }
}

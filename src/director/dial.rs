//! Backend dialing.
//!
//! # Responsibilities
//! - Turn the configured target into a tonic `Endpoint`
//! - Establish the HTTP/2 connection eagerly (blocking connect)
//! - Apply optional TLS settings, trusting native roots when no CA is given
//!
//! # Design Decisions
//! - The target is only parsed here, never at director construction
//! - A bare `host:port` target gets `http://` (or `https://` with TLS)
//! - Dialing sits behind the `Dial` trait so tests can count dials

use std::fmt;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint};

use crate::config::TlsConfig;

/// The single backend address a director forwards to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BackendTarget(String);

impl BackendTarget {
    pub fn new(target: impl Into<String>) -> Self {
        Self(target.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The URI used to dial, adding a scheme to bare `host:port` targets.
    pub fn uri(&self, tls: bool) -> String {
        if self.0.contains("://") {
            self.0.clone()
        } else if tls {
            format!("https://{}", self.0)
        } else {
            format!("http://{}", self.0)
        }
    }
}

impl fmt::Display for BackendTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BackendTarget {
    fn from(target: &str) -> Self {
        Self::new(target)
    }
}

impl From<String> for BackendTarget {
    fn from(target: String) -> Self {
        Self(target)
    }
}

/// Error type for a single dial attempt.
#[derive(Debug, Error)]
pub enum DialError {
    #[error("invalid target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },

    #[error("TLS setup failed: {0}")]
    Tls(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("transport error: {0}")]
    Transport(#[from] tonic::transport::Error),
}

impl DialError {
    /// Errors that no redial can fix: the target or TLS settings are unusable.
    pub fn is_permanent(&self) -> bool {
        matches!(self, DialError::InvalidTarget { .. } | DialError::Tls(_))
    }

    /// The error and its sources joined into one line.
    pub fn describe(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            let text = err.to_string();
            if !message.ends_with(&text) {
                message.push_str(": ");
                message.push_str(&text);
            }
            source = err.source();
        }
        message
    }
}

/// Opens connections to a backend.
pub trait Dial: Send + Sync + 'static {
    /// Connect to `target`, resolving once the connection is usable.
    fn dial(&self, target: &BackendTarget) -> impl Future<Output = Result<Channel, DialError>> + Send;
}

/// TLS settings for the backend connection.
#[derive(Debug, Clone, Default)]
pub struct TlsSettings {
    /// PEM bundle used to verify the backend. Without one the platform's
    /// native roots are trusted.
    pub ca_cert_pem: Option<Vec<u8>>,
    /// Server name to verify, when it differs from the target host.
    pub domain_name: Option<String>,
}

impl TlsSettings {
    /// Read the CA bundle named by `config` from disk.
    pub fn from_config(config: &TlsConfig) -> Result<Self, DialError> {
        let ca_cert_pem = match &config.ca_cert_path {
            Some(path) => Some(std::fs::read(path)?),
            None => None,
        };
        Ok(Self {
            ca_cert_pem,
            domain_name: config.domain_name.clone(),
        })
    }

    fn client_config(&self) -> ClientTlsConfig {
        let mut tls = ClientTlsConfig::new();
        tls = match &self.ca_cert_pem {
            Some(pem) => tls.ca_certificate(Certificate::from_pem(pem)),
            None => tls.with_native_roots(),
        };
        if let Some(domain) = &self.domain_name {
            tls = tls.domain_name(domain.clone());
        }
        tls
    }
}

/// Production dialer backed by tonic's HTTP/2 transport.
#[derive(Debug, Clone)]
pub struct TonicDialer {
    connect_timeout: Duration,
    tls: Option<TlsSettings>,
}

impl TonicDialer {
    /// Plaintext dialer.
    pub fn new(connect_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            tls: None,
        }
    }

    pub fn with_tls(mut self, tls: TlsSettings) -> Self {
        self.tls = Some(tls);
        self
    }

    /// Build the endpoint for `target` without connecting.
    pub fn endpoint(&self, target: &BackendTarget) -> Result<Endpoint, DialError> {
        let uri = target.uri(self.tls.is_some());
        let endpoint = Endpoint::from_shared(uri).map_err(|e| DialError::InvalidTarget {
            target: target.to_string(),
            reason: e.to_string(),
        })?;
        let endpoint = endpoint
            .connect_timeout(self.connect_timeout)
            .tcp_nodelay(true);

        match &self.tls {
            Some(tls) => endpoint
                .tls_config(tls.client_config())
                .map_err(|e| DialError::Tls(e.to_string())),
            None => Ok(endpoint),
        }
    }
}

impl Default for TonicDialer {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

impl Dial for TonicDialer {
    async fn dial(&self, target: &BackendTarget) -> Result<Channel, DialError> {
        let endpoint = self.endpoint(target)?;
        Ok(endpoint.connect().await?)
    }
}

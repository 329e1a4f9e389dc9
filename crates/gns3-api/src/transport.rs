// Transport capability
//
// The single "issue one request" capability every resource holds. The
// resources only ever see `Arc<dyn Transport>`; `HttpTransport` is the
// reqwest-backed implementation bound to one server's `/v2` base URL.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::Error;
use crate::response::{ApiResponse, Method, Payload};

/// Port the GNS3 server listens on unless told otherwise.
pub const DEFAULT_PORT: u16 = 3080;

/// Path prefix of the v2 REST API.
pub const API_PREFIX: &str = "v2";

/// Issue one request against the server and hand back the decoded response.
///
/// `endpoint` is relative to the API base (e.g. `projects/{id}/nodes`).
/// Implementations must not turn an undecodable body into an `Err`; it comes
/// back as [`Payload::Undecodable`]. Errors are reserved for requests that
/// never produced a response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn call(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<ApiResponse, Error>;
}

// ── Server address ───────────────────────────────────────────────────

/// Where the GNS3 server lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAddress {
    pub host: String,
    pub port: u16,
    pub use_tls: bool,
}

impl ServerAddress {
    pub fn new(host: impl Into<String>, port: u16, use_tls: bool) -> Self {
        Self {
            host: host.into(),
            port,
            use_tls,
        }
    }

    pub fn scheme(&self) -> &'static str {
        if self.use_tls { "https" } else { "http" }
    }

    /// `{http|https}://{host}:{port}/v2`, port always spelled out.
    ///
    /// IPv6 literals are wrapped in brackets unless the host already is.
    pub fn base_url(&self) -> String {
        let host = if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        format!("{}://{host}:{}/{API_PREFIX}", self.scheme(), self.port)
    }
}

impl Default for ServerAddress {
    fn default() -> Self {
        Self::new("localhost", DEFAULT_PORT, false)
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base_url())
    }
}

// ── Transport configuration ──────────────────────────────────────────

/// TLS verification mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsMode {
    /// Use the system certificate store.
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (self-signed lab servers).
    DangerAcceptInvalid,
}

/// Settings for building the underlying `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("gns3-api/", env!("CARGO_PKG_VERSION")));

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

/// Everything needed to connect a [`Gns3Client`](crate::Gns3Client).
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub address: ServerAddress,
    pub transport: TransportConfig,
}

// ── HTTP transport ───────────────────────────────────────────────────

/// reqwest-backed [`Transport`] bound to one server.
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a transport for `address` using `config` for TLS and timeouts.
    pub fn new(address: &ServerAddress, config: &TransportConfig) -> Result<Self, Error> {
        let http = config.build_client()?;
        Ok(Self::with_client(http, address.base_url()))
    }

    /// Wrap a pre-built `reqwest::Client`. `base_url` is the API root, e.g.
    /// `http://localhost:3080/v2`.
    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { http, base_url }
    }

    /// Wrap this transport for sharing between resources.
    pub fn into_shared(self) -> Arc<dyn Transport> {
        Arc::new(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base_url}/{endpoint}`
    pub(crate) fn url(&self, endpoint: &str) -> Result<Url, Error> {
        let full = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));
        Ok(Url::parse(&full)?)
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<ApiResponse, Error> {
        let url = self.url(endpoint)?;
        debug!("{} {}", method, url);

        let mut request = self.http.request(method.into(), url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let resp = request.send().await.map_err(Error::Transport)?;
        let status = resp.status().as_u16();
        let text = resp.text().await.map_err(Error::Transport)?;

        let payload = Payload::from_body(text);
        if let Payload::Undecodable(ref raw) = payload {
            warn!(%method, endpoint, status, body = %raw, "response body is not JSON");
        }

        Ok(ApiResponse::new(status, payload))
    }
}

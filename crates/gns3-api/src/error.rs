use thiserror::Error;

/// Top-level error type for the `gns3-api` crate.
///
/// Covers every failure mode of the object model: transport, URL
/// construction, TLS setup, and the three ways a response can fail to turn
/// into a typed resource (not JSON, wrong JSON shape, missing fields).
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake, certificate, or client builder error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Server ──────────────────────────────────────────────────────
    /// Non-2xx answer to a request whose body was needed to build resources.
    #[error("GNS3 API error on '{endpoint}' (HTTP {status}): {message}")]
    Api {
        endpoint: String,
        status: u16,
        message: String,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// The server answered with a body that is not JSON, but the operation
    /// needed JSON to build resources from it.
    #[error("Response from '{endpoint}' is not JSON")]
    Undecodable { endpoint: String, body: String },

    /// JSON was decoded but has the wrong top-level shape.
    #[error("Unexpected JSON shape: expected {expected}, found {found}")]
    UnexpectedShape {
        expected: &'static str,
        found: &'static str,
    },

    /// A JSON object could not be read into a typed record.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    ///
    /// Nothing in this crate retries; the predicate exists for callers that do.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Returns `true` if the server reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if the server was reached but its payload could not be
    /// turned into the requested resource.
    pub fn is_decode_failure(&self) -> bool {
        matches!(
            self,
            Self::Undecodable { .. } | Self::UnexpectedShape { .. } | Self::Deserialization { .. }
        )
    }
}

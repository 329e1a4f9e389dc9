// Request methods and raw responses
//
// The server's answer is handed back as-is: status plus whatever the body
// decoded to. A body that is not JSON is kept as text in its own variant so
// callers can tell it apart from any JSON value.

use std::fmt;

use serde_json::Value;

use crate::error::Error;

/// HTTP methods used by the GNS3 v2 API surface modelled here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Delete => Self::DELETE,
        }
    }
}

/// Decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// The body parsed as JSON.
    Json(Value),
    /// The body was empty (e.g. `204 No Content` after a DELETE).
    Empty,
    /// The body was not JSON. Holds the raw text for diagnostics.
    Undecodable(String),
}

impl Payload {
    /// Decode a raw body: empty, JSON, or undecodable text.
    pub fn from_body(body: String) -> Self {
        if body.trim().is_empty() {
            return Self::Empty;
        }
        match serde_json::from_str(&body) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Undecodable(body),
        }
    }
}

/// One response from the server.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub payload: Payload,
}

impl ApiResponse {
    pub fn new(status: u16, payload: Payload) -> Self {
        Self { status, payload }
    }

    /// Shorthand for a `200` response carrying JSON.
    pub fn ok(value: Value) -> Self {
        Self::new(200, Payload::Json(value))
    }

    /// `true` for any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The JSON body, if there is one.
    pub fn json(&self) -> Option<&Value> {
        match &self.payload {
            Payload::Json(value) => Some(value),
            Payload::Empty | Payload::Undecodable(_) => None,
        }
    }

    /// Take the JSON body, or fail with `Error::Undecodable` naming the
    /// endpoint that produced it.
    pub fn into_json(self, endpoint: &str) -> Result<Value, Error> {
        match self.payload {
            Payload::Json(value) => Ok(value),
            Payload::Empty => Err(Error::Undecodable {
                endpoint: endpoint.to_owned(),
                body: String::new(),
            }),
            Payload::Undecodable(body) => Err(Error::Undecodable {
                endpoint: endpoint.to_owned(),
                body,
            }),
        }
    }

    /// Like [`into_json`](Self::into_json), but a non-2xx status becomes
    /// `Error::Api` carrying the server's `message` when it sent one.
    pub fn into_success_json(self, endpoint: &str) -> Result<Value, Error> {
        if self.is_success() {
            return self.into_json(endpoint);
        }
        let message = match &self.payload {
            Payload::Json(value) => value
                .get("message")
                .and_then(Value::as_str)
                .map_or_else(|| value.to_string(), str::to_owned),
            Payload::Undecodable(text) => text.clone(),
            Payload::Empty => String::new(),
        };
        Err(Error::Api {
            endpoint: endpoint.to_owned(),
            status: self.status,
            message,
        })
    }
}

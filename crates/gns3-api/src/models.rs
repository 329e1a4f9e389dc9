// GNS3 v2 API payload types
//
// Records mirror what the server returns for projects, nodes and links.
// Fields are stored verbatim: only the identity fields are required, the rest
// use `#[serde(default)]` because field presence varies across server
// versions and node types. Anything not modelled lands in `extra`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Error;

/// Compute used when a node is created without naming one.
pub const DEFAULT_COMPUTE_ID: &str = "local";

// ── Project ──────────────────────────────────────────────────────────

/// Project object from `GET /projects`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub name: String,
    pub project_id: String,
    #[serde(default)]
    pub auto_close: Option<bool>,
    #[serde(default)]
    pub auto_open: Option<bool>,
    #[serde(default)]
    pub auto_start: Option<bool>,
    #[serde(default)]
    pub drawing_grid_size: Option<i64>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub grid_size: Option<i64>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub scene_height: Option<i64>,
    #[serde(default)]
    pub scene_width: Option<i64>,
    #[serde(default)]
    pub show_grid: Option<bool>,
    #[serde(default)]
    pub show_interface_labels: Option<bool>,
    #[serde(default)]
    pub show_layers: Option<bool>,
    #[serde(default)]
    pub snap_to_grid: Option<bool>,
    /// `"opened"` or `"closed"`.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub supplier: Option<Value>,
    #[serde(default)]
    pub variables: Option<Value>,
    #[serde(default)]
    pub zoom: Option<i64>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Node ─────────────────────────────────────────────────────────────

/// Node object from `GET /projects/{id}/nodes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub name: String,
    pub node_id: String,
    #[serde(default)]
    pub command_line: Option<String>,
    #[serde(default)]
    pub compute_id: Option<String>,
    /// Console TCP port on the compute.
    #[serde(default)]
    pub console: Option<i64>,
    #[serde(default)]
    pub console_auto_start: Option<bool>,
    #[serde(default)]
    pub console_host: Option<String>,
    #[serde(default)]
    pub console_type: Option<String>,
    #[serde(default)]
    pub custom_adapters: Option<Value>,
    #[serde(default)]
    pub first_port_name: Option<String>,
    #[serde(default)]
    pub height: Option<i64>,
    #[serde(default)]
    pub label: Option<Value>,
    #[serde(default)]
    pub locked: Option<bool>,
    #[serde(default)]
    pub node_directory: Option<String>,
    #[serde(default)]
    pub node_type: Option<String>,
    #[serde(default)]
    pub port_name_format: Option<String>,
    #[serde(default)]
    pub port_segment_size: Option<i64>,
    #[serde(default)]
    pub ports: Vec<Value>,
    #[serde(default)]
    pub project_id: Option<String>,
    /// Emulator-specific settings; shape depends on `node_type`.
    #[serde(default)]
    pub properties: Map<String, Value>,
    /// `"started"`, `"stopped"` or `"suspended"`.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub template_id: Option<String>,
    #[serde(default)]
    pub width: Option<i64>,
    #[serde(default)]
    pub x: Option<i64>,
    #[serde(default)]
    pub y: Option<i64>,
    #[serde(default)]
    pub z: Option<i64>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Link ─────────────────────────────────────────────────────────────

/// One side of a link: a port on a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkEndpoint {
    pub adapter_number: u32,
    pub node_id: String,
    pub port_number: u32,
    /// Server-side extras such as `label`; never sent on create.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LinkEndpoint {
    pub fn new(node_id: impl Into<String>, adapter_number: u32, port_number: u32) -> Self {
        Self {
            adapter_number,
            node_id: node_id.into(),
            port_number,
            extra: Map::new(),
        }
    }
}

/// Link object from `GET /projects/{id}/links`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkInfo {
    pub link_id: String,
    #[serde(default)]
    pub capture_compute_id: Option<String>,
    #[serde(default)]
    pub capture_file_name: Option<String>,
    #[serde(default)]
    pub capture_file_path: Option<String>,
    #[serde(default)]
    pub capturing: Option<bool>,
    #[serde(default)]
    pub filters: Option<Value>,
    #[serde(default)]
    pub link_style: Option<Value>,
    #[serde(default)]
    pub link_type: Option<String>,
    #[serde(default)]
    pub nodes: Vec<LinkEndpoint>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub suspend: Option<bool>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Decoding ─────────────────────────────────────────────────────────

/// Name of a JSON value's top-level kind, for shape errors.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Decode a single JSON object into a typed record.
pub(crate) fn decode_record<T: DeserializeOwned>(value: &Value) -> Result<T, Error> {
    if !value.is_object() {
        return Err(Error::UnexpectedShape {
            expected: "object",
            found: json_kind(value),
        });
    }
    T::deserialize(value).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: value.to_string(),
    })
}

/// Unwrap a JSON array into its elements.
pub(crate) fn expect_array(value: Value) -> Result<Vec<Value>, Error> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(Error::UnexpectedShape {
            expected: "array",
            found: json_kind(&other),
        }),
    }
}

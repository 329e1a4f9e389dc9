// In-memory transport for unit tests.
//
// Canned responses keyed by (method, endpoint); every call is recorded so
// tests can assert on request order and bodies. Unknown endpoints answer 404.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::error::Error;
use crate::response::{ApiResponse, Method, Payload};
use crate::transport::Transport;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedCall {
    pub method: Method,
    pub endpoint: String,
    pub body: Option<Value>,
}

#[derive(Default)]
pub(crate) struct MockTransport {
    responses: Mutex<HashMap<(Method, String), ApiResponse>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, method: Method, endpoint: &str, response: ApiResponse) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((method, endpoint.to_owned()), response);
    }

    pub fn respond_json(&self, method: Method, endpoint: &str, value: Value) {
        self.respond(method, endpoint, ApiResponse::ok(value));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn endpoints(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.endpoint).collect()
    }

    pub fn last_call(&self) -> RecordedCall {
        self.calls().pop().expect("no calls recorded")
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn call(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<ApiResponse, Error> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCall {
                method,
                endpoint: endpoint.to_owned(),
                body: body.cloned(),
            });

        let canned = self
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(method, endpoint.to_owned()))
            .cloned();

        Ok(canned.unwrap_or_else(|| {
            ApiResponse::new(
                404,
                Payload::Json(json!({ "message": format!("no mock for {method} {endpoint}") })),
            )
        }))
    }
}

/// Minimal project record.
pub(crate) fn project_json(name: &str, id: &str) -> Value {
    json!({
        "name": name,
        "project_id": id,
        "status": "opened",
        "auto_close": true,
        "auto_open": false,
        "auto_start": false,
        "grid_size": 75,
        "drawing_grid_size": 25,
        "scene_height": 1000,
        "scene_width": 2000,
        "zoom": 100,
        "variables": null,
        "supplier": null
    })
}

/// Minimal node record.
pub(crate) fn node_json(name: &str, id: &str, project_id: &str) -> Value {
    json!({
        "name": name,
        "node_id": id,
        "project_id": project_id,
        "compute_id": "local",
        "node_type": "vpcs",
        "status": "stopped",
        "console": 5000,
        "console_type": "telnet",
        "ports": [],
        "properties": {},
        "x": 0,
        "y": 0,
        "z": 1
    })
}

// Device node resource
//
// A single virtual device inside a project. Building a node never touches
// the network; its link map exists for callers to fill and starts empty.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Value, json};
use tracing::debug;

use crate::error::Error;
use crate::link::Link;
use crate::models::{LinkEndpoint, NodeInfo, decode_record, expect_array};
use crate::response::{ApiResponse, Method};
use crate::transport::Transport;

#[derive(Clone)]
pub struct Node {
    api: Arc<dyn Transport>,
    info: NodeInfo,
    links: HashMap<String, Link>,
}

impl Node {
    pub fn new(api: Arc<dyn Transport>, info: NodeInfo) -> Self {
        Self {
            api,
            info,
            links: HashMap::new(),
        }
    }

    /// Build one node from a single JSON object.
    pub fn from_json(api: Arc<dyn Transport>, value: &Value) -> Result<Self, Error> {
        Ok(Self::new(api, decode_record(value)?))
    }

    /// Build one node per element of a JSON array, in server order.
    pub fn from_json_list(api: &Arc<dyn Transport>, value: Value) -> Result<Vec<Self>, Error> {
        expect_array(value)?
            .iter()
            .map(|item| Self::from_json(Arc::clone(api), item))
            .collect()
    }

    pub fn info(&self) -> &NodeInfo {
        &self.info
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn id(&self) -> &str {
        &self.info.node_id
    }

    pub fn links(&self) -> &HashMap<String, Link> {
        &self.links
    }

    pub fn link(&self, link_id: &str) -> Option<&Link> {
        self.links.get(link_id)
    }

    /// Insert a link keyed by its id, replacing any previous entry.
    pub fn add_link(&mut self, link: Link) {
        self.links.insert(link.id().to_owned(), link);
    }

    pub fn api(&self) -> &Arc<dyn Transport> {
        &self.api
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Start a node.
    ///
    /// `POST /projects/{project_id}/{node_id}/start`. Both ids are explicit,
    /// so this can target any node, not only `self`.
    pub async fn start_node(&self, project_id: &str, node_id: &str) -> Result<ApiResponse, Error> {
        debug!(project_id, node_id, "starting node");
        let endpoint = format!("projects/{project_id}/{node_id}/start");
        self.api.call(Method::Post, &endpoint, None).await
    }

    /// Stop a node.
    ///
    /// `POST /projects/{project_id}/{node_id}/stop`
    pub async fn stop_node(&self, project_id: &str, node_id: &str) -> Result<ApiResponse, Error> {
        debug!(project_id, node_id, "stopping node");
        let endpoint = format!("projects/{project_id}/{node_id}/stop");
        self.api.call(Method::Post, &endpoint, None).await
    }

    // ── Links ────────────────────────────────────────────────────────

    /// Connect two ports.
    ///
    /// `POST /projects/{project_id}/links`. The body lists `node1` then
    /// `node2`. The local link map is not updated.
    pub async fn create_link(
        &self,
        project_id: &str,
        node1: LinkEndpoint,
        node2: LinkEndpoint,
    ) -> Result<ApiResponse, Error> {
        debug!(project_id, node1 = %node1.node_id, node2 = %node2.node_id, "creating link");
        let body = json!({ "nodes": [node1, node2] });
        let endpoint = format!("projects/{project_id}/links");
        self.api.call(Method::Post, &endpoint, Some(&body)).await
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.info.name)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("info", &self.info)
            .field("links", &self.links)
            .finish_non_exhaustive()
    }
}

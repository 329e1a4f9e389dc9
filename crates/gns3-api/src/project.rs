// Project resource
//
// A saved topology on the server. Loading a project fetches its node list
// once; the node map is a snapshot of that moment and is only rebuilt by an
// explicit `refresh_nodes`. Mutating calls return the raw server answer and
// leave cached state alone.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Value, json};
use tracing::debug;

use crate::error::Error;
use crate::models::{DEFAULT_COMPUTE_ID, ProjectInfo, decode_record, expect_array};
use crate::node::Node;
use crate::response::{ApiResponse, Method};
use crate::transport::Transport;

#[derive(Clone)]
pub struct Project {
    api: Arc<dyn Transport>,
    info: ProjectInfo,
    nodes: HashMap<String, Node>,
}

impl Project {
    /// Wrap `info` and fetch the project's nodes.
    ///
    /// Fails if the node list cannot be fetched or decoded; there is no
    /// partially loaded project.
    pub async fn load(api: Arc<dyn Transport>, info: ProjectInfo) -> Result<Self, Error> {
        let mut project = Self {
            api,
            info,
            nodes: HashMap::new(),
        };
        project.refresh_nodes().await?;
        Ok(project)
    }

    /// Build and load one project from a single JSON object.
    pub async fn from_json(api: Arc<dyn Transport>, value: &Value) -> Result<Self, Error> {
        let info = decode_record(value)?;
        Self::load(api, info).await
    }

    /// Build and load one project per element of a JSON array.
    ///
    /// Projects load one after another in server order.
    pub async fn from_json_list(
        api: &Arc<dyn Transport>,
        value: Value,
    ) -> Result<Vec<Self>, Error> {
        let items = expect_array(value)?;
        let mut projects = Vec::with_capacity(items.len());
        for item in &items {
            projects.push(Self::from_json(Arc::clone(api), item).await?);
        }
        Ok(projects)
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn info(&self) -> &ProjectInfo {
        &self.info
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn id(&self) -> &str {
        &self.info.project_id
    }

    pub fn nodes(&self) -> &HashMap<String, Node> {
        &self.nodes
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.get(name)
    }

    pub fn api(&self) -> &Arc<dyn Transport> {
        &self.api
    }

    /// Insert a node keyed by name. A node with the same name is replaced.
    pub fn add_node(&mut self, node: Node) {
        self.nodes.insert(node.name().to_owned(), node);
    }

    // ── Node snapshot ────────────────────────────────────────────────

    /// Re-fetch the node list and replace the node map.
    ///
    /// The map is swapped only once the whole list decoded; on error the
    /// previous snapshot is kept.
    pub async fn refresh_nodes(&mut self) -> Result<(), Error> {
        let endpoint = self.nodes_endpoint();
        let value = self.get_nodes().await?.into_success_json(&endpoint)?;
        let fetched = self.nodes_from_json(value)?;

        let mut nodes = HashMap::with_capacity(fetched.len());
        for node in fetched {
            nodes.insert(node.name().to_owned(), node);
        }
        debug!(project = %self.info.name, count = nodes.len(), "loaded nodes");
        self.nodes = nodes;
        Ok(())
    }

    /// Build a node sharing this project's transport from one JSON object.
    pub fn node_from_json(&self, value: &Value) -> Result<Node, Error> {
        Node::from_json(Arc::clone(&self.api), value)
    }

    /// Build nodes sharing this project's transport from a JSON array.
    pub fn nodes_from_json(&self, value: Value) -> Result<Vec<Node>, Error> {
        Node::from_json_list(&self.api, value)
    }

    fn nodes_endpoint(&self) -> String {
        format!("projects/{}/nodes", self.info.project_id)
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Open this project.
    ///
    /// `POST /projects/{id}/open`. The cached `status` is not updated.
    pub async fn open(&self) -> Result<ApiResponse, Error> {
        debug!(project = %self.info.name, "opening project");
        let endpoint = format!("projects/{}/open", self.info.project_id);
        self.api.call(Method::Post, &endpoint, None).await
    }

    /// Close this project.
    ///
    /// `POST /projects/{id}/close`. The cached `status` is not updated.
    pub async fn close(&self) -> Result<ApiResponse, Error> {
        debug!(project = %self.info.name, "closing project");
        let endpoint = format!("projects/{}/close", self.info.project_id);
        self.api.call(Method::Post, &endpoint, None).await
    }

    /// Start every node in a project.
    ///
    /// `POST /projects/{project_id}/start`. The id is explicit and need not
    /// be this project's.
    pub async fn start_nodes(&self, project_id: &str) -> Result<ApiResponse, Error> {
        debug!(project_id, "starting all nodes");
        let endpoint = format!("projects/{project_id}/start");
        self.api.call(Method::Post, &endpoint, None).await
    }

    /// Stop every node in a project.
    ///
    /// `POST /projects/{project_id}/stop`
    pub async fn stop_nodes(&self, project_id: &str) -> Result<ApiResponse, Error> {
        debug!(project_id, "stopping all nodes");
        let endpoint = format!("projects/{project_id}/stop");
        self.api.call(Method::Post, &endpoint, None).await
    }

    // ── Links ────────────────────────────────────────────────────────

    /// List a project's links as raw JSON.
    ///
    /// `GET /projects/{project_id}/links`
    pub async fn get_links(&self, project_id: &str) -> Result<ApiResponse, Error> {
        let endpoint = format!("projects/{project_id}/links");
        self.api.call(Method::Get, &endpoint, None).await
    }

    // ── Nodes ────────────────────────────────────────────────────────

    /// Create a node.
    ///
    /// `POST /projects/{project_id}/nodes`. `compute_id` falls back to
    /// `"local"`. The node map is not updated.
    pub async fn create_node(
        &self,
        project_id: &str,
        name: &str,
        node_type: &str,
        template_id: &str,
        compute_id: Option<&str>,
    ) -> Result<ApiResponse, Error> {
        let compute_id = compute_id.unwrap_or(DEFAULT_COMPUTE_ID);
        debug!(project_id, name, node_type, compute_id, "creating node");
        let body = json!({
            "name": name,
            "node_type": node_type,
            "template_id": template_id,
            "compute_id": compute_id,
        });
        let endpoint = format!("projects/{project_id}/nodes");
        self.api.call(Method::Post, &endpoint, Some(&body)).await
    }

    /// Instantiate a template at canvas position (`x`, `y`).
    ///
    /// `POST /projects/{project_id}/templates/{template_id}`
    pub async fn create_template_node(
        &self,
        project_id: &str,
        template_id: &str,
        x: i64,
        y: i64,
    ) -> Result<ApiResponse, Error> {
        debug!(project_id, template_id, x, y, "creating node from template");
        let body = json!({ "x": x, "y": y });
        let endpoint = format!("projects/{project_id}/templates/{template_id}");
        self.api.call(Method::Post, &endpoint, Some(&body)).await
    }

    /// Delete a node. The node map keeps its entry until the next refresh.
    ///
    /// `DELETE /projects/{project_id}/nodes/{node_id}`
    pub async fn delete_node(&self, project_id: &str, node_id: &str) -> Result<ApiResponse, Error> {
        debug!(project_id, node_id, "deleting node");
        let endpoint = format!("projects/{project_id}/nodes/{node_id}");
        self.api.call(Method::Delete, &endpoint, None).await
    }

    /// Fetch one node of this project.
    ///
    /// `GET /projects/{self.id}/nodes/{node_id}`
    pub async fn get_node(&self, node_id: &str) -> Result<ApiResponse, Error> {
        let endpoint = format!("projects/{}/nodes/{node_id}", self.info.project_id);
        self.api.call(Method::Get, &endpoint, None).await
    }

    /// List this project's nodes as raw JSON.
    ///
    /// `GET /projects/{self.id}/nodes`
    pub async fn get_nodes(&self) -> Result<ApiResponse, Error> {
        let endpoint = self.nodes_endpoint();
        self.api.call(Method::Get, &endpoint, None).await
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.info.name)
    }
}

impl fmt::Debug for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Project")
            .field("info", &self.info)
            .field("nodes", &self.nodes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::response::Payload;
    use crate::testing::{MockTransport, node_json, project_json};

    async fn load(mock: &Arc<MockTransport>, name: &str, id: &str) -> Result<Project, Error> {
        let api: Arc<dyn Transport> = mock.clone();
        Project::from_json(api, &project_json(name, id)).await
    }

    #[tokio::test]
    async fn load_fetches_nodes_for_own_id() {
        let mock = MockTransport::new();
        mock.respond_json(
            Method::Get,
            "projects/p1/nodes",
            json!([node_json("R1", "n1", "p1"), node_json("R2", "n2", "p1")]),
        );

        let project = load(&mock, "P1", "p1").await.unwrap();

        assert_eq!(mock.endpoints(), ["projects/p1/nodes"]);
        assert_eq!(project.nodes().len(), 2);
        assert_eq!(project.node("R1").unwrap().id(), "n1");
        assert_eq!(project.node("R2").unwrap().id(), "n2");
        assert_eq!(project.info().zoom, Some(100));
        assert_eq!(project.to_string(), "P1");
    }

    #[tokio::test]
    async fn duplicate_node_names_keep_last() {
        let mock = MockTransport::new();
        mock.respond_json(
            Method::Get,
            "projects/p1/nodes",
            json!([node_json("R1", "n1", "p1"), node_json("R1", "n2", "p1")]),
        );

        let project = load(&mock, "P1", "p1").await.unwrap();

        assert_eq!(project.nodes().len(), 1);
        assert_eq!(project.node("R1").unwrap().id(), "n2");
    }

    #[tokio::test]
    async fn empty_node_list() {
        let mock = MockTransport::new();
        mock.respond_json(Method::Get, "projects/p1/nodes", json!([]));

        let project = load(&mock, "P1", "p1").await.unwrap();
        assert!(project.nodes().is_empty());
    }

    #[tokio::test]
    async fn node_list_failure_fails_load() {
        let mock = MockTransport::new();
        let err = load(&mock, "P1", "p1").await.unwrap_err();
        assert!(matches!(err, Error::Api { status: 404, .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn non_json_node_list_fails_load() {
        let mock = MockTransport::new();
        mock.respond(
            Method::Get,
            "projects/p1/nodes",
            ApiResponse::new(200, Payload::Undecodable("<html>".into())),
        );
        let err = load(&mock, "P1", "p1").await.unwrap_err();
        assert!(matches!(err, Error::Undecodable { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn object_node_list_is_shape_error() {
        let mock = MockTransport::new();
        mock.respond_json(
            Method::Get,
            "projects/p1/nodes",
            node_json("R1", "n1", "p1"),
        );
        let err = load(&mock, "P1", "p1").await.unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedShape {
                expected: "array",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn lifecycle_calls_use_own_id_and_leave_status() {
        let mock = MockTransport::new();
        mock.respond_json(Method::Get, "projects/p1/nodes", json!([]));
        mock.respond_json(
            Method::Post,
            "projects/p1/close",
            json!({ "status": "closed" }),
        );
        let project = load(&mock, "P1", "p1").await.unwrap();

        project.open().await.unwrap();
        let resp = project.close().await.unwrap();

        assert_eq!(resp.json().unwrap()["status"], "closed");
        assert_eq!(project.info().status.as_deref(), Some("opened"));
        assert_eq!(
            mock.endpoints(),
            ["projects/p1/nodes", "projects/p1/open", "projects/p1/close"]
        );
    }

    #[tokio::test]
    async fn explicit_id_operations_target_given_project() {
        let mock = MockTransport::new();
        mock.respond_json(
            Method::Get,
            "projects/p1/nodes",
            json!([node_json("R1", "n1", "p1")]),
        );
        let project = load(&mock, "P1", "p1").await.unwrap();

        project.start_nodes("p2").await.unwrap();
        project.stop_nodes("p2").await.unwrap();
        project.get_links("p2").await.unwrap();
        project.delete_node("p2", "n9").await.unwrap();
        project.get_node("n1").await.unwrap();

        assert_eq!(project.nodes().len(), 1);

        let calls = mock.calls();
        let seen: Vec<(Method, &str)> = calls
            .iter()
            .skip(1)
            .map(|c| (c.method, c.endpoint.as_str()))
            .collect();
        assert_eq!(
            seen,
            [
                (Method::Post, "projects/p2/start"),
                (Method::Post, "projects/p2/stop"),
                (Method::Get, "projects/p2/links"),
                (Method::Delete, "projects/p2/nodes/n9"),
                (Method::Get, "projects/p1/nodes/n1"),
            ]
        );
    }

    #[tokio::test]
    async fn delete_node_keeps_cached_entry() {
        let mock = MockTransport::new();
        mock.respond_json(
            Method::Get,
            "projects/p1/nodes",
            json!([node_json("R1", "n1", "p1"), node_json("R2", "n2", "p1")]),
        );
        mock.respond(
            Method::Delete,
            "projects/p1/nodes/n1",
            ApiResponse::new(204, Payload::Empty),
        );
        let project = load(&mock, "P1", "p1").await.unwrap();

        let resp = project.delete_node("p1", "n1").await.unwrap();

        assert_eq!(resp.status, 204);
        assert_eq!(mock.last_call().method, Method::Delete);
        assert_eq!(project.nodes().len(), 2);
        assert_eq!(project.node("R1").unwrap().id(), "n1");
    }

    #[tokio::test]
    async fn create_node_defaults_compute_to_local() {
        let mock = MockTransport::new();
        mock.respond_json(Method::Get, "projects/p1/nodes", json!([]));
        let project = load(&mock, "P1", "p1").await.unwrap();

        project
            .create_node("p1", "PC1", "vpcs", "tmpl-1", None)
            .await
            .unwrap();

        let call = mock.last_call();
        assert_eq!(call.endpoint, "projects/p1/nodes");
        assert_eq!(
            call.body,
            Some(json!({
                "name": "PC1",
                "node_type": "vpcs",
                "template_id": "tmpl-1",
                "compute_id": "local"
            }))
        );
        assert!(project.nodes().is_empty());
    }

    #[tokio::test]
    async fn create_node_with_explicit_compute() {
        let mock = MockTransport::new();
        mock.respond_json(Method::Get, "projects/p1/nodes", json!([]));
        let project = load(&mock, "P1", "p1").await.unwrap();

        project
            .create_node("p1", "R1", "dynamips", "tmpl-2", Some("vm"))
            .await
            .unwrap();

        assert_eq!(mock.last_call().body.unwrap()["compute_id"], "vm");
    }

    #[tokio::test]
    async fn create_template_node_sends_position() {
        let mock = MockTransport::new();
        mock.respond_json(Method::Get, "projects/p1/nodes", json!([]));
        let project = load(&mock, "P1", "p1").await.unwrap();

        project
            .create_template_node("p1", "tmpl-1", -150, 40)
            .await
            .unwrap();

        let call = mock.last_call();
        assert_eq!(call.method, Method::Post);
        assert_eq!(call.endpoint, "projects/p1/templates/tmpl-1");
        assert_eq!(call.body, Some(json!({ "x": -150, "y": 40 })));
    }

    #[tokio::test]
    async fn refresh_replaces_snapshot() {
        let mock = MockTransport::new();
        mock.respond_json(
            Method::Get,
            "projects/p1/nodes",
            json!([node_json("R1", "n1", "p1")]),
        );
        let mut project = load(&mock, "P1", "p1").await.unwrap();

        mock.respond_json(
            Method::Get,
            "projects/p1/nodes",
            json!([node_json("R2", "n2", "p1")]),
        );
        project.refresh_nodes().await.unwrap();

        assert!(project.node("R1").is_none());
        assert_eq!(project.node("R2").unwrap().id(), "n2");
    }

    #[tokio::test]
    async fn failed_refresh_keeps_snapshot() {
        let mock = MockTransport::new();
        mock.respond_json(
            Method::Get,
            "projects/p1/nodes",
            json!([node_json("R1", "n1", "p1")]),
        );
        let mut project = load(&mock, "P1", "p1").await.unwrap();

        mock.respond_json(
            Method::Get,
            "projects/p1/nodes",
            json!([{ "node_id": "nameless" }]),
        );
        let err = project.refresh_nodes().await.unwrap_err();

        assert!(matches!(err, Error::Deserialization { .. }));
        assert_eq!(project.node("R1").unwrap().id(), "n1");
    }

    #[tokio::test]
    async fn node_from_json_shares_transport() {
        let mock = MockTransport::new();
        mock.respond_json(Method::Get, "projects/p1/nodes", json!([]));
        let mut project = load(&mock, "P1", "p1").await.unwrap();

        let payload = node_json("R9", "n9", "p1");
        let node = project.node_from_json(&payload).unwrap();
        node.start_node("p1", "n9").await.unwrap();
        project.add_node(node);

        assert_eq!(mock.last_call().endpoint, "projects/p1/n9/start");
        assert!(project.node("R9").is_some());
    }
}

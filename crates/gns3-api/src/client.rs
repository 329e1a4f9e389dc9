// GNS3 root client
//
// Entry point of the object model. Connecting lists every project and loads
// each one (which lists its nodes), strictly one request at a time. The
// resulting map is a snapshot; pass-through calls such as `create_project`
// never touch it, only `refresh` rebuilds it.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Value, json};
use tracing::debug;

use crate::error::Error;
use crate::project::Project;
use crate::response::{ApiResponse, Method};
use crate::transport::{ClientConfig, HttpTransport, ServerAddress, Transport, TransportConfig};

const PROJECTS: &str = "projects";

pub struct Gns3Client {
    address: ServerAddress,
    api: Arc<dyn Transport>,
    projects: HashMap<String, Project>,
}

impl Gns3Client {
    /// Connect to `{http|https}://{host}:{port}/v2` with default transport
    /// settings and load every project.
    pub async fn connect(host: &str, port: u16, use_tls: bool) -> Result<Self, Error> {
        Self::connect_with(ClientConfig {
            address: ServerAddress::new(host, port, use_tls),
            transport: TransportConfig::default(),
        })
        .await
    }

    /// Connect using explicit address and transport settings.
    pub async fn connect_with(config: ClientConfig) -> Result<Self, Error> {
        let transport = HttpTransport::new(&config.address, &config.transport)?;
        Self::with_transport(config.address, transport.into_shared()).await
    }

    /// Build a client over an existing transport and load every project.
    ///
    /// Any failure while listing projects or loading one of them fails the
    /// whole construction.
    pub async fn with_transport(
        address: ServerAddress,
        api: Arc<dyn Transport>,
    ) -> Result<Self, Error> {
        let mut client = Self {
            address,
            api,
            projects: HashMap::new(),
        };
        client.refresh().await?;
        Ok(client)
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn host(&self) -> &str {
        &self.address.host
    }

    pub fn port(&self) -> u16 {
        self.address.port
    }

    pub fn use_tls(&self) -> bool {
        self.address.use_tls
    }

    pub fn address(&self) -> &ServerAddress {
        &self.address
    }

    /// `{http|https}://{host}:{port}/v2`
    pub fn base_url(&self) -> String {
        self.address.base_url()
    }

    pub fn projects(&self) -> &HashMap<String, Project> {
        &self.projects
    }

    pub fn project(&self, name: &str) -> Option<&Project> {
        self.projects.get(name)
    }

    pub fn project_mut(&mut self, name: &str) -> Option<&mut Project> {
        self.projects.get_mut(name)
    }

    pub fn api(&self) -> &Arc<dyn Transport> {
        &self.api
    }

    /// Insert a project keyed by name. A project with the same name is replaced.
    pub fn add_project(&mut self, project: Project) {
        self.projects.insert(project.name().to_owned(), project);
    }

    // ── Project snapshot ─────────────────────────────────────────────

    /// Re-list projects, reload each one, and replace the project map.
    ///
    /// The map is swapped only after every project loaded; on error the
    /// previous snapshot is kept.
    pub async fn refresh(&mut self) -> Result<(), Error> {
        let value = self.get_projects().await?.into_success_json(PROJECTS)?;
        let loaded = self.projects_from_json(value).await?;

        let mut projects = HashMap::with_capacity(loaded.len());
        for project in loaded {
            projects.insert(project.name().to_owned(), project);
        }
        debug!(server = %self.address, count = projects.len(), "loaded projects");
        self.projects = projects;
        Ok(())
    }

    /// Build and load one project sharing this client's transport.
    pub async fn project_from_json(&self, value: &Value) -> Result<Project, Error> {
        Project::from_json(Arc::clone(&self.api), value).await
    }

    /// Build and load one project per element of a JSON array, in order.
    pub async fn projects_from_json(&self, value: Value) -> Result<Vec<Project>, Error> {
        Project::from_json_list(&self.api, value).await
    }

    // ── Projects ─────────────────────────────────────────────────────

    /// Create a project. The project map is not updated.
    ///
    /// `POST /projects` with `{"name": ...}`
    pub async fn create_project(&self, name: &str) -> Result<ApiResponse, Error> {
        debug!(name, "creating project");
        let body = json!({ "name": name });
        self.api.call(Method::Post, PROJECTS, Some(&body)).await
    }

    /// Delete a project. Its map entry stays until the next refresh.
    ///
    /// `DELETE /projects/{project_id}`
    pub async fn delete_project(&self, project_id: &str) -> Result<ApiResponse, Error> {
        debug!(project_id, "deleting project");
        self.api
            .call(Method::Delete, &format!("{PROJECTS}/{project_id}"), None)
            .await
    }

    /// `GET /projects/{project_id}`
    pub async fn get_project(&self, project_id: &str) -> Result<ApiResponse, Error> {
        self.api
            .call(Method::Get, &format!("{PROJECTS}/{project_id}"), None)
            .await
    }

    /// `GET /projects`
    pub async fn get_projects(&self) -> Result<ApiResponse, Error> {
        self.api.call(Method::Get, PROJECTS, None).await
    }

    // ── Server ───────────────────────────────────────────────────────

    /// `GET /computes`
    pub async fn get_computes(&self) -> Result<ApiResponse, Error> {
        self.api.call(Method::Get, "computes", None).await
    }

    /// `GET /version`
    pub async fn get_version(&self) -> Result<ApiResponse, Error> {
        self.api.call(Method::Get, "version", None).await
    }

    // ── Templates ────────────────────────────────────────────────────

    /// `GET /templates/{template_id}`
    pub async fn get_template(&self, template_id: &str) -> Result<ApiResponse, Error> {
        self.api
            .call(Method::Get, &format!("templates/{template_id}"), None)
            .await
    }

    /// `GET /templates`
    pub async fn get_templates(&self) -> Result<ApiResponse, Error> {
        self.api.call(Method::Get, "templates", None).await
    }
}

impl fmt::Debug for Gns3Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gns3Client")
            .field("address", &self.address)
            .field("projects", &self.projects)
            .finish_non_exhaustive()
    }
}

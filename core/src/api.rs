//! Async project API: `ProjectClient` bound to a `Transport`.
//!
//! Each operation is one build, one round-trip, one parse. No retries, no
//! caching, no timeout beyond what the transport enforces.

use crate::client::ProjectClient;
use crate::config::Config;
use crate::error::ApiError;
use crate::http::{ReqwestTransport, Transport};
use crate::types::Project;

#[derive(Debug, Clone)]
pub struct ProjectApi<T> {
    client: ProjectClient,
    transport: T,
}

impl ProjectApi<ReqwestTransport> {
    /// Production API client for the configured base URL.
    pub fn from_config(config: &Config) -> Self {
        Self::new(ProjectClient::new(&config.api_base), ReqwestTransport::new())
    }
}

impl<T: Transport> ProjectApi<T> {
    pub fn new(client: ProjectClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &ProjectClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn list_all(&self) -> Result<Vec<Project>, ApiError> {
        let response = self.transport.execute(self.client.build_list_projects()).await?;
        self.client.parse_list_projects(response)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Project, ApiError> {
        let response = self.transport.execute(self.client.build_get_project(id)).await?;
        self.client.parse_get_project(response)
    }

    pub async fn create(&self, project: &Project) -> Result<Project, ApiError> {
        let request = self.client.build_create_project(project)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_create_project(response)
    }

    pub async fn update(&self, id: i64, project: &Project) -> Result<Project, ApiError> {
        let request = self.client.build_update_project(id, project)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_update_project(response)
    }

    pub async fn remove(&self, id: i64) -> Result<(), ApiError> {
        let response = self.transport.execute(self.client.build_delete_project(id)).await?;
        self.client.parse_delete_project(response)
    }
}

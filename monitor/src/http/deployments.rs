//! Deployment API client

use std::sync::Arc;

use async_trait::async_trait;
use platform_api::models::DeploymentListResponse;
use tracing::debug;

use crate::errors::FetchError;
use crate::http::client::HttpClient;
use crate::models::deployment::{Deployment, Snapshot};

/// Source of deployment snapshots, abstracted for testability
#[async_trait]
pub trait DeploymentSource: Send + Sync {
    /// Fetch the `limit` most recent deployments of a project
    async fn fetch_snapshot(&self, project: &str, limit: u32) -> Result<Snapshot, FetchError>;
}

#[async_trait]
impl<T: DeploymentSource + ?Sized> DeploymentSource for Arc<T> {
    async fn fetch_snapshot(&self, project: &str, limit: u32) -> Result<Snapshot, FetchError> {
        (**self).fetch_snapshot(project, limit).await
    }
}

#[async_trait]
impl DeploymentSource for HttpClient {
    async fn fetch_snapshot(&self, project: &str, limit: u32) -> Result<Snapshot, FetchError> {
        let query = [
            ("projectId", project.to_string()),
            ("limit", limit.to_string()),
        ];
        let response: DeploymentListResponse = self.get("/v6/deployments", &query).await?;
        debug!("Fetched {} deployments", response.deployments.len());

        Ok(response
            .deployments
            .into_iter()
            .map(Deployment::from)
            .collect())
    }
}

//! Deployment models

use std::fmt;

use chrono::{DateTime, Utc};
use platform_api::models::RawDeployment;
use serde::{Deserialize, Serialize};

pub const NO_COMMIT_MESSAGE: &str = "No commit message";
pub const UNKNOWN_BRANCH: &str = "unknown branch";

/// Build state reported by the platform
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeploymentState {
    Queued,
    Initializing,
    Building,
    Ready,
    Error,
    Canceled,
    /// A state this build does not know about, kept verbatim
    Unknown(String),
}

impl DeploymentState {
    pub fn as_str(&self) -> &str {
        match self {
            DeploymentState::Queued => "QUEUED",
            DeploymentState::Initializing => "INITIALIZING",
            DeploymentState::Building => "BUILDING",
            DeploymentState::Ready => "READY",
            DeploymentState::Error => "ERROR",
            DeploymentState::Canceled => "CANCELED",
            DeploymentState::Unknown(raw) => raw,
        }
    }
}

impl From<&str> for DeploymentState {
    fn from(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "QUEUED" => DeploymentState::Queued,
            "INITIALIZING" => DeploymentState::Initializing,
            "BUILDING" => DeploymentState::Building,
            "READY" => DeploymentState::Ready,
            "ERROR" => DeploymentState::Error,
            "CANCELED" => DeploymentState::Canceled,
            _ => DeploymentState::Unknown(raw.to_string()),
        }
    }
}

impl From<String> for DeploymentState {
    fn from(raw: String) -> Self {
        DeploymentState::from(raw.as_str())
    }
}

impl From<DeploymentState> for String {
    fn from(state: DeploymentState) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for DeploymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A deployment as seen by one poll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    /// Unique deployment ID, stable across polls
    pub id: String,

    /// Current build state
    pub state: DeploymentState,

    /// When the deployment was created
    pub created_at: DateTime<Utc>,

    /// Host name the deployment is served on
    pub url: String,

    /// Head commit message, or a placeholder
    pub commit_message: String,

    /// Branch or ref the deployment was built from, or a placeholder
    pub commit_ref: String,
}

impl Deployment {
    /// Public address, only meaningful once the deployment is ready
    pub fn public_url(&self) -> Option<String> {
        if self.state == DeploymentState::Ready && !self.url.is_empty() {
            Some(format!("https://{}", self.url))
        } else {
            None
        }
    }
}

/// The ordered deployments returned by one poll
pub type Snapshot = Vec<Deployment>;

impl From<RawDeployment> for Deployment {
    fn from(raw: RawDeployment) -> Self {
        let state = raw
            .state
            .or(raw.ready_state)
            .map(DeploymentState::from)
            .unwrap_or_else(|| DeploymentState::Unknown("UNKNOWN".to_string()));

        let created_at = raw
            .created
            .or(raw.created_at)
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .unwrap_or_default();

        let meta = raw.meta.unwrap_or_default();

        Self {
            id: raw.uid,
            state,
            created_at,
            url: raw.url.unwrap_or_default(),
            commit_message: non_empty_or(meta.github_commit_message, NO_COMMIT_MESSAGE),
            commit_ref: non_empty_or(meta.github_commit_ref, UNKNOWN_BRANCH),
        }
    }
}

fn non_empty_or(value: Option<String>, placeholder: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => placeholder.to_string(),
    }
}

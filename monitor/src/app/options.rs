//! Validated runtime options

use std::num::NonZeroU32;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::errors::MonitorError;
use crate::logs::LogOptions;
use crate::render::RenderMode;
use crate::storage::settings::{Settings, ENV_PROJECT_ID, ENV_TOKEN};
use crate::workers::poller;

/// Main application options
#[derive(Debug, Clone)]
pub struct MonitorOptions {
    /// Platform API base URL
    pub api_base_url: String,

    /// Bearer token for the API
    pub token: SecretString,

    /// Team scope, if the project belongs to a team
    pub team_id: Option<String>,

    /// Project to watch
    pub project_id: String,

    /// Delay between polls
    pub polling_interval: Duration,

    /// Number of deployments fetched per poll
    pub deployments_to_show: NonZeroU32,

    /// Render policy
    pub mode: RenderMode,

    /// Logging options
    pub logging: LogOptions,
}

impl MonitorOptions {
    /// Poller worker options derived from these options
    pub fn poller(&self) -> poller::Options {
        poller::Options {
            project: self.project_id.clone(),
            interval: self.polling_interval,
            deployments_to_show: self.deployments_to_show.get(),
            mode: self.mode,
        }
    }
}

impl TryFrom<Settings> for MonitorOptions {
    type Error = MonitorError;

    fn try_from(settings: Settings) -> Result<Self, Self::Error> {
        let token = settings
            .api
            .token
            .filter(|t| !t.expose_secret().trim().is_empty())
            .ok_or_else(|| {
                MonitorError::MissingSetting(format!(
                    "API token (set {} or pass --token)",
                    ENV_TOKEN
                ))
            })?;

        let project_id = settings
            .project_id
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| {
                MonitorError::MissingSetting(format!(
                    "project id (set {} or pass --project)",
                    ENV_PROJECT_ID
                ))
            })?;

        if settings.polling_interval_secs == 0 {
            return Err(MonitorError::ConfigError(
                "polling interval must be at least 1 second".to_string(),
            ));
        }

        let deployments_to_show = NonZeroU32::new(settings.deployments_to_show).ok_or_else(|| {
            MonitorError::ConfigError("number of deployments to show must be at least 1".to_string())
        })?;

        Ok(Self {
            api_base_url: settings.api.base_url,
            token,
            team_id: settings.api.team_id,
            project_id,
            polling_interval: Duration::from_secs(settings.polling_interval_secs),
            deployments_to_show,
            mode: RenderMode::from_verbose(settings.verbose),
            logging: LogOptions {
                log_level: settings.log_level,
                log_file: settings.log_file,
                json_format: settings.json_logs,
            },
        })
    }
}

//! Settings: defaults, optional JSON file, environment, command line

use std::collections::HashMap;
use std::path::PathBuf;

use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

use crate::errors::MonitorError;
use crate::http::client::DEFAULT_BASE_URL;
use crate::logs::LogLevel;

pub const ENV_TOKEN: &str = "VERCEL_TOKEN";
pub const ENV_PROJECT_ID: &str = "VERCEL_PROJECT_ID";
pub const ENV_TEAM_ID: &str = "VERCEL_TEAM_ID";
pub const ENV_INTERVAL: &str = "DEPLOYWATCH_INTERVAL";
pub const ENV_LIMIT: &str = "DEPLOYWATCH_LIMIT";
pub const ENV_VERBOSE: &str = "DEPLOYWATCH_VERBOSE";
pub const ENV_LOG_LEVEL: &str = "DEPLOYWATCH_LOG_LEVEL";
pub const ENV_API_URL: &str = "DEPLOYWATCH_API_URL";

/// Monitor settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Log file; logs go to stderr when unset
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Emit JSON log lines
    #[serde(default)]
    pub json_logs: bool,

    /// Platform API configuration
    #[serde(default)]
    pub api: ApiSettings,

    /// Project to watch
    #[serde(default)]
    pub project_id: Option<String>,

    /// Polling interval in seconds
    #[serde(default = "default_polling_interval")]
    pub polling_interval_secs: u64,

    /// Number of recent deployments to fetch and show
    #[serde(default = "default_deployments_to_show")]
    pub deployments_to_show: u32,

    /// Render every cycle instead of only on change
    #[serde(default)]
    pub verbose: bool,
}

fn default_polling_interval() -> u64 {
    15
}

fn default_deployments_to_show() -> u32 {
    5
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            log_file: None,
            json_logs: false,
            api: ApiSettings::default(),
            project_id: None,
            polling_interval_secs: default_polling_interval(),
            deployments_to_show: default_deployments_to_show(),
            verbose: false,
        }
    }
}

/// Platform API settings
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    /// Base URL for the API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token
    #[serde(default, deserialize_with = "deserialize_secret")]
    pub token: Option<SecretString>,

    /// Team scope for team-owned projects
    #[serde(default)]
    pub team_id: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            team_id: None,
        }
    }
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()).map(SecretString::from))
}

impl Settings {
    /// Overlay environment variables. `lookup` is `std::env::var` in
    /// production.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), MonitorError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get(ENV_TOKEN) {
            self.api.token = Some(SecretString::from(token));
        }
        if let Some(project) = get(ENV_PROJECT_ID) {
            self.project_id = Some(project);
        }
        if let Some(team) = get(ENV_TEAM_ID) {
            self.api.team_id = Some(team);
        }
        if let Some(url) = get(ENV_API_URL) {
            self.api.base_url = url;
        }
        if let Some(interval) = get(ENV_INTERVAL) {
            self.polling_interval_secs = parse_number(ENV_INTERVAL, &interval)?;
        }
        if let Some(limit) = get(ENV_LIMIT) {
            self.deployments_to_show = parse_number(ENV_LIMIT, &limit)?;
        }
        if let Some(verbose) = get(ENV_VERBOSE) {
            self.verbose = parse_flag(ENV_VERBOSE, &verbose)?;
        }
        if let Some(level) = get(ENV_LOG_LEVEL) {
            self.log_level = level.parse().map_err(MonitorError::ConfigError)?;
        }

        Ok(())
    }

    /// Overlay parsed command line arguments (keys without leading dashes)
    pub fn apply_args(&mut self, args: &HashMap<String, String>) -> Result<(), MonitorError> {
        let get = |key: &str| args.get(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get("token") {
            self.api.token = Some(SecretString::from(token.clone()));
        }
        if let Some(project) = get("project") {
            self.project_id = Some(project.clone());
        }
        if let Some(team) = get("team") {
            self.api.team_id = Some(team.clone());
        }
        if let Some(url) = args.get("api-url") {
            self.api.base_url = url.clone();
        }
        if let Some(interval) = args.get("interval") {
            self.polling_interval_secs = parse_number("--interval", interval)?;
        }
        if let Some(limit) = args.get("limit") {
            self.deployments_to_show = parse_number("--limit", limit)?;
        }
        if let Some(verbose) = args.get("verbose").or_else(|| args.get("v")) {
            self.verbose = parse_flag("--verbose", verbose)?;
        }
        if let Some(level) = args.get("log-level") {
            self.log_level = level.parse().map_err(MonitorError::ConfigError)?;
        }
        if let Some(path) = args.get("log-file") {
            self.log_file = Some(PathBuf::from(path));
        }
        if args.contains_key("json-logs") {
            self.json_logs = true;
        }

        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, MonitorError> {
    value
        .trim()
        .parse()
        .map_err(|_| MonitorError::ConfigError(format!("{} must be a positive integer, got '{}'", name, value)))
}

fn parse_flag(name: &str, value: &str) -> Result<bool, MonitorError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(MonitorError::ConfigError(format!(
            "{} must be true or false, got '{}'",
            name, value
        ))),
    }
}

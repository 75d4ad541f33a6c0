//! Colored terminal renderer

use std::fmt::Write as _;
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use colored::{ColoredString, Colorize};
use platform_api::models::ApiErrorResponse;

use crate::errors::FetchError;
use crate::models::deployment::{Deployment, DeploymentState};
use crate::render::format::{format_age, short_id, truncate};
use crate::render::{RenderMode, Renderer};
use crate::watch::ChangeSet;

const CLEAR_SCREEN: &str = "\x1B[2J\x1B[1;1H";
const COMMIT_WIDTH: usize = 60;
const BODY_WIDTH: usize = 200;

/// Writes snapshots, notices and errors to stdout
#[derive(Debug, Clone)]
pub struct TerminalRenderer {
    project: String,
    interval: Duration,
}

impl TerminalRenderer {
    pub fn new(project: impl Into<String>, interval: Duration) -> Self {
        Self {
            project: project.into(),
            interval,
        }
    }

    /// Startup banner
    pub fn banner(&self, mode: RenderMode) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} {}",
            "deploywatch".bold().cyan(),
            concat!("v", env!("CARGO_PKG_VERSION")).dimmed()
        );
        let _ = writeln!(out, "  project:  {}", self.project.bold());
        let _ = writeln!(out, "  interval: {}s", self.interval.as_secs());
        let _ = writeln!(
            out,
            "  mode:     {}",
            if mode.is_verbose() { "verbose" } else { "quiet (changes only)" }
        );
        out
    }

    pub fn print_banner(&self, mode: RenderMode) {
        println!("{}", self.banner(mode));
    }

    /// Full listing of a snapshot as of `now`
    pub fn snapshot_text(&self, snapshot: &[Deployment], now: DateTime<Utc>) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} {}  {}",
            "Deployments for".bold(),
            self.project.bold().cyan(),
            format!("Last updated: {}", now.with_timezone(&Local).format("%H:%M:%S")).dimmed()
        );
        let _ = writeln!(out);

        if snapshot.is_empty() {
            let _ = writeln!(out, "  {}", "No deployments found".dimmed());
        }

        for deployment in snapshot {
            let _ = writeln!(
                out,
                "  {} {}  {}",
                state_badge(&deployment.state),
                short_id(&deployment.id).bold(),
                format_age(deployment.created_at, now).dimmed()
            );
            let _ = writeln!(
                out,
                "    {} {}",
                truncate(&deployment.commit_message, COMMIT_WIDTH),
                format!("({})", deployment.commit_ref).dimmed()
            );
            if let Some(url) = deployment.public_url() {
                let _ = writeln!(out, "    {}", url.underline().blue());
            }
        }

        let _ = writeln!(out);
        let _ = write!(
            out,
            "{}",
            format!("Next check in {} seconds", self.interval.as_secs()).dimmed()
        );
        out
    }

    /// Abbreviated listing of what changed
    pub fn change_notice_text(changes: &ChangeSet) -> String {
        let mut out = String::new();

        if !changes.new_deployments.is_empty() {
            let _ = writeln!(out, "{}", "New deployments:".bold().green());
            for deployment in &changes.new_deployments {
                let _ = writeln!(
                    out,
                    "  + {} {} {}",
                    short_id(&deployment.id),
                    truncate(&deployment.commit_message, COMMIT_WIDTH),
                    state_badge(&deployment.state)
                );
            }
        }

        if !changes.transitions.is_empty() {
            let _ = writeln!(out, "{}", "Status changes:".bold().yellow());
            for transition in &changes.transitions {
                let _ = writeln!(
                    out,
                    "  {} {}: {} → {}",
                    short_id(&transition.deployment.id),
                    truncate(&transition.deployment.commit_message, COMMIT_WIDTH),
                    state_badge(&transition.previous_state),
                    state_badge(&transition.deployment.state)
                );
            }
        }

        out
    }

    /// Error block for a failed fetch
    pub fn error_text(error: &FetchError, retry_in: Duration) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", "Error fetching deployments".bold().red());

        match error {
            FetchError::RemoteRejected { status, body } => {
                let _ = writeln!(out, "  status: {}", status.to_string().red());
                let detail = ApiErrorResponse::parse(body)
                    .map(|envelope| envelope.error.message)
                    .unwrap_or_else(|| truncate(body, BODY_WIDTH));
                if !detail.is_empty() {
                    let _ = writeln!(out, "  {}", detail);
                }
            }
            FetchError::Unreachable(reason) => {
                let _ = writeln!(out, "  No response received from the API");
                let _ = writeln!(out, "  {}", reason.dimmed());
            }
            FetchError::MalformedOrLocal { message } => {
                let _ = writeln!(out, "  {}", message);
            }
        }

        let _ = write!(
            out,
            "{}",
            format!("Retrying in {} seconds...", retry_in.as_secs()).yellow()
        );
        out
    }
}

impl Renderer for TerminalRenderer {
    fn render(&self, snapshot: &[Deployment], mode: RenderMode) {
        if mode.is_verbose() {
            print!("{}", CLEAR_SCREEN);
        }
        println!("{}", self.snapshot_text(snapshot, Utc::now()));
    }

    fn render_change_notice(&self, changes: &ChangeSet) {
        println!("{}", Self::change_notice_text(changes));
    }

    fn render_error(&self, error: &FetchError, retry_in: Duration) {
        eprintln!("{}", Self::error_text(error, retry_in));
    }
}

/// Colored state label with a status glyph
pub fn state_badge(state: &DeploymentState) -> ColoredString {
    let label = state.as_str();
    match state {
        DeploymentState::Ready => format!("● {}", label).green(),
        DeploymentState::Building => format!("◐ {}", label).yellow(),
        DeploymentState::Queued | DeploymentState::Initializing => format!("○ {}", label).cyan(),
        DeploymentState::Error => format!("✖ {}", label).red(),
        DeploymentState::Canceled => format!("⊘ {}", label).dimmed(),
        DeploymentState::Unknown(_) => format!("? {}", label).normal(),
    }
}

//! Operator-facing output

pub mod format;
pub mod terminal;

use std::time::Duration;

use crate::errors::FetchError;
use crate::models::deployment::Deployment;
use crate::watch::ChangeSet;

/// How eagerly snapshots are rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Render only when something changed
    #[default]
    Quiet,

    /// Render every cycle
    Verbose,
}

impl RenderMode {
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            RenderMode::Verbose
        } else {
            RenderMode::Quiet
        }
    }

    pub fn is_verbose(&self) -> bool {
        matches!(self, RenderMode::Verbose)
    }
}

/// Sink for everything the poller shows the operator
pub trait Renderer: Send + Sync {
    /// Show a full snapshot
    fn render(&self, snapshot: &[Deployment], mode: RenderMode);

    /// Show the short "what changed" notice
    fn render_change_notice(&self, changes: &ChangeSet);

    /// Show a failed fetch and when the next attempt happens
    fn render_error(&self, error: &FetchError, retry_in: Duration);
}

//! Polling worker: fetch, compare, render, store

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::http::deployments::DeploymentSource;
use crate::models::deployment::Snapshot;
use crate::render::{RenderMode, Renderer};
use crate::watch::diff;

/// Poller worker options
#[derive(Debug, Clone)]
pub struct Options {
    /// Project whose deployments are watched
    pub project: String,

    /// Delay between the end of one cycle and the start of the next
    pub interval: Duration,

    /// How many recent deployments each fetch asks for
    pub deployments_to_show: u32,

    /// Render policy
    pub mode: RenderMode,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            project: String::new(),
            interval: Duration::from_secs(15),
            deployments_to_show: 5,
            mode: RenderMode::Quiet,
        }
    }
}

/// What a single cycle ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// First successful fetch
    Bootstrapped,

    /// Something new appeared or changed state
    Changed,

    /// Same deployments in the same states
    Unchanged,

    /// Fetch failed, stored snapshot left as it was
    Failed,
}

/// Owns the last successful snapshot and drives the cycle against it
pub struct Poller<S, R> {
    options: Options,
    source: S,
    renderer: R,
    previous: Option<Snapshot>,
}

impl<S, R> Poller<S, R>
where
    S: DeploymentSource,
    R: Renderer,
{
    pub fn new(options: Options, source: S, renderer: R) -> Self {
        Self {
            options,
            source,
            renderer,
            previous: None,
        }
    }

    /// Snapshot from the last successful fetch, `None` before the first one
    pub fn previous(&self) -> Option<&Snapshot> {
        self.previous.as_ref()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Run one fetch/compare/render/store cycle
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        debug!("Fetching deployments for {}...", self.options.project);

        let current = match self
            .source
            .fetch_snapshot(&self.options.project, self.options.deployments_to_show)
            .await
        {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Fetching deployments failed: {}", e);
                self.renderer.render_error(&e, self.options.interval);
                return CycleOutcome::Failed;
            }
        };

        let is_bootstrap = self.previous.is_none();
        let previous = self.previous.as_deref().unwrap_or_default();
        let changes = diff(previous, &current);

        if !previous.is_empty() && current.is_empty() {
            info!(
                "No deployments returned for {} (previously {})",
                self.options.project,
                previous.len()
            );
        }

        let outcome = if is_bootstrap {
            CycleOutcome::Bootstrapped
        } else if changes.has_changes {
            CycleOutcome::Changed
        } else {
            CycleOutcome::Unchanged
        };

        match self.options.mode {
            RenderMode::Verbose => self.renderer.render(&current, RenderMode::Verbose),
            RenderMode::Quiet if changes.has_changes => {
                self.renderer.render(&current, RenderMode::Quiet);
                if !is_bootstrap && !changes.is_empty() {
                    info!(
                        "{} new deployments, {} status changes",
                        changes.new_deployments.len(),
                        changes.transitions.len()
                    );
                    self.renderer.render_change_notice(&changes);
                }
            }
            RenderMode::Quiet => {
                debug!("No changes");
            }
        }

        self.previous = Some(current);
        outcome
    }

    /// Run cycles until the shutdown signal fires. The next sleep is armed only
    /// after the current cycle has finished, so cycles never overlap.
    pub async fn run<Sl, F>(
        &mut self,
        sleep_fn: Sl,
        mut shutdown_signal: Pin<Box<dyn Future<Output = ()> + Send>>,
    ) where
        Sl: Fn(Duration) -> F,
        F: Future<Output = ()>,
    {
        info!(
            "Poller starting for {} every {:?}...",
            self.options.project, self.options.interval
        );

        loop {
            tokio::select! {
                _ = &mut shutdown_signal => {
                    info!("Poller shutting down...");
                    return;
                }
                outcome = self.run_cycle() => {
                    debug!("Cycle finished: {:?}", outcome);
                }
            }

            tokio::select! {
                _ = &mut shutdown_signal => {
                    info!("Poller shutting down...");
                    return;
                }
                _ = sleep_fn(self.options.interval) => {}
            }
        }
    }
}

//! Poller unit tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use deploywatch::errors::FetchError;
use deploywatch::http::deployments::DeploymentSource;
use deploywatch::models::deployment::{Deployment, DeploymentState, Snapshot};
use deploywatch::render::{RenderMode, Renderer};
use deploywatch::watch::ChangeSet;
use deploywatch::workers::poller::{CycleOutcome, Options, Poller};

const INTERVAL: Duration = Duration::from_secs(15);

/// Replays a fixed list of fetch results, then keeps returning the last
/// successful snapshot
#[derive(Default)]
struct ScriptedSource {
    script: Mutex<VecDeque<Result<Snapshot, FetchError>>>,
    last: Mutex<Snapshot>,
    calls: Mutex<Vec<(String, u32)>>,
    in_flight: AtomicBool,
    overlapped: AtomicBool,
}

impl ScriptedSource {
    fn new(script: Vec<Result<Snapshot, FetchError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<(String, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeploymentSource for ScriptedSource {
    async fn fetch_snapshot(&self, project: &str, limit: u32) -> Result<Snapshot, FetchError> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            self.overlapped.store(true, Ordering::SeqCst);
        }
        self.calls.lock().unwrap().push((project.to_string(), limit));
        tokio::task::yield_now().await;

        let next = self.script.lock().unwrap().pop_front();
        let result = match next {
            Some(Ok(snapshot)) => {
                *self.last.lock().unwrap() = snapshot.clone();
                Ok(snapshot)
            }
            Some(Err(e)) => Err(e),
            None => Ok(self.last.lock().unwrap().clone()),
        };

        self.in_flight.store(false, Ordering::SeqCst);
        result
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Rendered {
    Snapshot(Vec<String>, RenderMode),
    Notice(ChangeSet),
    Error(FetchError, Duration),
}

#[derive(Default)]
struct RecordingRenderer {
    events: Mutex<Vec<Rendered>>,
}

impl RecordingRenderer {
    fn events(&self) -> Vec<Rendered> {
        self.events.lock().unwrap().clone()
    }

    fn snapshot_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Rendered::Snapshot(..)))
            .count()
    }

    fn notices(&self) -> Vec<ChangeSet> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Rendered::Notice(changes) => Some(changes),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn render(&self, snapshot: &[Deployment], mode: RenderMode) {
        let ids = snapshot.iter().map(|d| d.id.clone()).collect();
        self.events.lock().unwrap().push(Rendered::Snapshot(ids, mode));
    }

    fn render_change_notice(&self, changes: &ChangeSet) {
        self.events.lock().unwrap().push(Rendered::Notice(changes.clone()));
    }

    fn render_error(&self, error: &FetchError, retry_in: Duration) {
        self.events
            .lock()
            .unwrap()
            .push(Rendered::Error(error.clone(), retry_in));
    }
}

fn deployment(id: &str, state: DeploymentState) -> Deployment {
    Deployment {
        id: id.to_string(),
        state,
        created_at: Utc::now(),
        url: format!("{}.vercel.app", id),
        commit_message: "test commit".to_string(),
        commit_ref: "main".to_string(),
    }
}

fn options(mode: RenderMode) -> Options {
    Options {
        project: "prj_test".to_string(),
        interval: INTERVAL,
        deployments_to_show: 3,
        mode,
    }
}

fn poller(
    mode: RenderMode,
    script: Vec<Result<Snapshot, FetchError>>,
) -> (Poller<Arc<ScriptedSource>, RecordingRenderer>, Arc<ScriptedSource>) {
    let source = Arc::new(ScriptedSource::new(script));
    let poller = Poller::new(options(mode), source.clone(), RecordingRenderer::default());
    (poller, source)
}

#[test]
fn test_quiet_mode_suppresses_unchanged_cycles() {
    let snapshot = vec![deployment("1", DeploymentState::Ready)];
    let (mut poller, _source) = poller(
        RenderMode::Quiet,
        vec![Ok(snapshot.clone()), Ok(snapshot.clone())],
    );

    let first = tokio_test::block_on(poller.run_cycle());
    let second = tokio_test::block_on(poller.run_cycle());

    assert_eq!(first, CycleOutcome::Bootstrapped);
    assert_eq!(second, CycleOutcome::Unchanged);
    assert_eq!(poller.renderer().snapshot_count(), 1);
    assert!(poller.renderer().notices().is_empty());
}

#[tokio::test]
async fn test_fetch_uses_project_and_limit() {
    let (mut poller, source) = poller(RenderMode::Quiet, vec![Ok(vec![])]);

    poller.run_cycle().await;
    assert_eq!(source.calls(), vec![("prj_test".to_string(), 3)]);
}

#[tokio::test]
async fn test_quiet_mode_change_renders_with_notice() {
    let (mut poller, _source) = poller(
        RenderMode::Quiet,
        vec![
            Ok(vec![deployment("1", DeploymentState::Building)]),
            Ok(vec![
                deployment("2", DeploymentState::Queued),
                deployment("1", DeploymentState::Ready),
            ]),
        ],
    );

    assert_eq!(poller.run_cycle().await, CycleOutcome::Bootstrapped);
    assert_eq!(poller.run_cycle().await, CycleOutcome::Changed);

    let events = poller.renderer().events();
    assert_eq!(
        events[0],
        Rendered::Snapshot(vec!["1".to_string()], RenderMode::Quiet)
    );
    assert_eq!(
        events[1],
        Rendered::Snapshot(vec!["2".to_string(), "1".to_string()], RenderMode::Quiet)
    );

    // Bootstrap never gets a notice; the change does
    let notices = poller.renderer().notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].new_deployments[0].id, "2");
    assert_eq!(notices[0].transitions[0].previous_state, DeploymentState::Building);
    assert_eq!(notices[0].transitions[0].deployment.state, DeploymentState::Ready);
}

#[tokio::test]
async fn test_verbose_mode_renders_every_cycle() {
    let snapshot = vec![deployment("1", DeploymentState::Ready)];
    let (mut poller, _source) = poller(
        RenderMode::Verbose,
        vec![
            Ok(snapshot.clone()),
            Ok(snapshot.clone()),
            Ok(vec![deployment("1", DeploymentState::Error)]),
        ],
    );

    poller.run_cycle().await;
    assert_eq!(poller.run_cycle().await, CycleOutcome::Unchanged);
    assert_eq!(poller.run_cycle().await, CycleOutcome::Changed);

    assert_eq!(poller.renderer().snapshot_count(), 3);
    assert!(poller.renderer().notices().is_empty());
    assert!(poller
        .renderer()
        .events()
        .iter()
        .all(|e| matches!(e, Rendered::Snapshot(_, RenderMode::Verbose))));
}

#[tokio::test]
async fn test_failure_leaves_previous_snapshot_untouched() {
    let first = vec![deployment("1", DeploymentState::Building)];
    let (mut poller, _source) = poller(
        RenderMode::Quiet,
        vec![
            Ok(first.clone()),
            Err(FetchError::Unreachable("connection refused".to_string())),
            Ok(vec![deployment("1", DeploymentState::Ready)]),
        ],
    );

    poller.run_cycle().await;
    assert_eq!(poller.previous(), Some(&first));

    assert_eq!(poller.run_cycle().await, CycleOutcome::Failed);
    assert_eq!(poller.previous(), Some(&first));

    // The next cycle compares against the snapshot from before the failure
    assert_eq!(poller.run_cycle().await, CycleOutcome::Changed);
    let notices = poller.renderer().notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].transitions[0].previous_state, DeploymentState::Building);
}

#[tokio::test]
async fn test_failure_before_first_success() {
    let (mut poller, _source) = poller(
        RenderMode::Quiet,
        vec![
            Err(FetchError::malformed("unexpected response body")),
            Ok(vec![deployment("1", DeploymentState::Ready)]),
        ],
    );

    assert_eq!(poller.run_cycle().await, CycleOutcome::Failed);
    assert!(poller.previous().is_none());

    assert_eq!(poller.run_cycle().await, CycleOutcome::Bootstrapped);
    assert_eq!(poller.renderer().snapshot_count(), 1);
    assert!(poller.renderer().notices().is_empty());
}

#[tokio::test]
async fn test_each_failure_class_is_reported() {
    let errors = vec![
        FetchError::RemoteRejected {
            status: 429,
            body: "rate limited".to_string(),
        },
        FetchError::Unreachable("timed out".to_string()),
        FetchError::malformed("invalid request URL"),
    ];
    let (mut poller, _source) = poller(
        RenderMode::Verbose,
        errors.iter().cloned().map(Err).collect(),
    );

    for _ in 0..errors.len() {
        assert_eq!(poller.run_cycle().await, CycleOutcome::Failed);
    }

    let expected: Vec<Rendered> = errors
        .into_iter()
        .map(|e| Rendered::Error(e, INTERVAL))
        .collect();
    assert_eq!(poller.renderer().events(), expected);
    assert!(poller.previous().is_none());
}

#[tokio::test]
async fn test_snapshot_replaced_not_merged() {
    let (mut poller, _source) = poller(
        RenderMode::Quiet,
        vec![
            Ok(vec![
                deployment("1", DeploymentState::Ready),
                deployment("2", DeploymentState::Ready),
            ]),
            Ok(vec![deployment("2", DeploymentState::Ready)]),
        ],
    );

    poller.run_cycle().await;
    assert_eq!(poller.run_cycle().await, CycleOutcome::Unchanged);

    let stored: Vec<&str> = poller
        .previous()
        .unwrap()
        .iter()
        .map(|d| d.id.as_str())
        .collect();
    assert_eq!(stored, ["2"]);
}

#[tokio::test]
async fn test_empty_project_keeps_rendering_in_quiet_mode() {
    let (mut poller, _source) = poller(RenderMode::Quiet, vec![Ok(vec![]), Ok(vec![])]);

    assert_eq!(poller.run_cycle().await, CycleOutcome::Bootstrapped);
    assert_eq!(poller.run_cycle().await, CycleOutcome::Changed);

    assert_eq!(poller.renderer().snapshot_count(), 2);
    assert!(poller.renderer().notices().is_empty());
}

#[tokio::test]
async fn test_run_loop_sleeps_between_cycles_until_shutdown() {
    let snapshot = vec![deployment("1", DeploymentState::Ready)];
    let (mut poller, source) = poller(RenderMode::Quiet, vec![Ok(snapshot)]);

    let sleeps = Arc::new(AtomicUsize::new(0));
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let shutdown_tx = Arc::new(Mutex::new(Some(shutdown_tx)));

    let sleep_fn = {
        let sleeps = sleeps.clone();
        let shutdown_tx = shutdown_tx.clone();
        move |interval: Duration| {
            assert_eq!(interval, INTERVAL);
            if sleeps.fetch_add(1, Ordering::SeqCst) + 1 == 3 {
                if let Some(tx) = shutdown_tx.lock().unwrap().take() {
                    let _ = tx.send(());
                }
                return futures::future::Either::Left(futures::future::pending::<()>());
            }
            futures::future::Either::Right(futures::future::ready(()))
        }
    };

    poller
        .run(
            sleep_fn,
            Box::pin(async move {
                let _ = shutdown_rx.await;
            }),
        )
        .await;

    assert_eq!(sleeps.load(Ordering::SeqCst), 3);
    assert_eq!(source.calls().len(), 3);
    assert!(!source.overlapped.load(Ordering::SeqCst));
    assert_eq!(poller.renderer().snapshot_count(), 1);
}

#[tokio::test]
async fn test_run_loop_stops_on_immediate_shutdown() {
    let (mut poller, source) = poller(RenderMode::Quiet, vec![]);

    poller
        .run(
            |_| futures::future::pending::<()>(),
            Box::pin(futures::future::ready(())),
        )
        .await;

    assert!(source.calls().len() <= 1);
}

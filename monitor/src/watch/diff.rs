//! Snapshot differ

use std::collections::HashMap;

use crate::models::deployment::{Deployment, DeploymentState};

/// A deployment seen in both snapshots whose state moved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// The deployment as it is now
    pub deployment: Deployment,

    /// The state it had in the previous snapshot
    pub previous_state: DeploymentState,
}

/// What changed between two snapshots
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub has_changes: bool,
    pub new_deployments: Vec<Deployment>,
    pub transitions: Vec<Transition>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.new_deployments.is_empty() && self.transitions.is_empty()
    }
}

/// Compare two snapshots by deployment id.
///
/// A deployment is new when its id is absent from `previous`, and a
/// transition when the id is present with a different state. Deployments that
/// drop out of `current` are not reported. An empty `previous` always counts
/// as a change so the first poll gets rendered. Output order follows
/// `current`.
pub fn diff(previous: &[Deployment], current: &[Deployment]) -> ChangeSet {
    let by_id: HashMap<&str, &Deployment> =
        previous.iter().map(|d| (d.id.as_str(), d)).collect();

    let mut new_deployments = Vec::new();
    let mut transitions = Vec::new();

    for deployment in current {
        match by_id.get(deployment.id.as_str()) {
            None => new_deployments.push(deployment.clone()),
            Some(before) if before.state != deployment.state => transitions.push(Transition {
                deployment: deployment.clone(),
                previous_state: before.state.clone(),
            }),
            Some(_) => {}
        }
    }

    let has_changes =
        previous.is_empty() || !new_deployments.is_empty() || !transitions.is_empty();

    ChangeSet {
        has_changes,
        new_deployments,
        transitions,
    }
}

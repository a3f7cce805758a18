//! Pausing and unpausing the workload of a cluster node
//!
//! Pausing disables and stops the node agent before freezing the running
//! containers, so the agent cannot restart what was just paused. Unpausing
//! thaws the containers first and only then brings the agent back. Neither
//! operation retries or rolls back; a failure reports how far it got.
use std::fmt::{self, Display};

use serde::Serialize;

use crate::agent::NodeAgent;
use crate::command::CommandRunner;
use crate::observer::{Event, Observer, TracingObserver};
use crate::runtime::{ContainerState, ListOptions, RuntimeManager};

type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    AgentDisableFailed,
    AgentStopFailed,
    AgentEnableFailed,
    AgentStartFailed,
    AgentStatusFailed,
    ContainerListFailed,
    ContainerPauseFailed,
    ContainerUnpauseFailed,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let print = match *self {
            Self::AgentDisableFailed => "failed to disable the node agent",
            Self::AgentStopFailed => "failed to stop the node agent",
            Self::AgentEnableFailed => "failed to enable the node agent",
            Self::AgentStartFailed => "failed to start the node agent",
            Self::AgentStatusFailed => "failed to query the node agent",
            Self::ContainerListFailed => "failed to list containers",
            Self::ContainerPauseFailed => "failed to pause containers",
            Self::ContainerUnpauseFailed => "failed to unpause containers",
        };

        write!(f, "{print}")
    }
}

/// Failure of a cluster operation. Carries the ids of the containers the
/// operation had listed before failing, empty if it failed before listing.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct ClusterError {
    kind: ErrorKind,
    ids: Vec<String>,
    #[source]
    source: BoxedError,
}

impl ClusterError {
    fn new<E: Into<BoxedError>>(kind: ErrorKind, ids: Vec<String>, source: E) -> Self {
        Self {
            kind,
            ids,
            source: source.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Containers the failed operation attempted to transition
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn into_ids(self) -> Vec<String> {
        self.ids
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterStatus {
    pub agent_active: bool,
    pub running: Vec<String>,
    pub paused: Vec<String>,
}

impl ClusterStatus {
    pub fn is_paused(&self) -> bool {
        !self.agent_active && self.running.is_empty() && !self.paused.is_empty()
    }
}

static TRACING_OBSERVER: TracingObserver = TracingObserver;

/// The collaborators of a node needed to pause and unpause its workload
pub struct Cluster<'a> {
    runtime: &'a dyn RuntimeManager,
    agent: &'a dyn NodeAgent,
    runner: &'a dyn CommandRunner,
    observer: &'a dyn Observer,
}

impl<'a> Cluster<'a> {
    pub fn new(
        runtime: &'a dyn RuntimeManager,
        agent: &'a dyn NodeAgent,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self {
            runtime,
            agent,
            runner,
            observer: &TRACING_OBSERVER,
        }
    }

    pub fn with_observer(mut self, observer: &'a dyn Observer) -> Self {
        self.observer = observer;
        self
    }

    /// Pauses all running containers in the namespaces, all namespaces if
    /// empty, and returns their ids
    pub fn pause(&self, namespaces: &[String]) -> Result<Vec<String>, ClusterError> {
        // the agent would restart paused pods otherwise
        self.agent
            .disable(self.runner)
            .map_err(|err| ClusterError::new(ErrorKind::AgentDisableFailed, Vec::new(), err))?;
        self.agent
            .stop(self.runner)
            .map_err(|err| ClusterError::new(ErrorKind::AgentStopFailed, Vec::new(), err))?;
        self.observer.observe(&Event::AgentStopped {
            unit: self.agent.unit().to_owned(),
        });

        let ids = self.list(ContainerState::Running, namespaces)?;
        if ids.is_empty() {
            self.observer.observe(&Event::NoRunningContainers {
                namespaces: namespaces.to_vec(),
            });
            return Ok(ids);
        }

        if let Err(err) = self.runtime.pause_containers(&ids) {
            return Err(ClusterError::new(ErrorKind::ContainerPauseFailed, ids, err));
        }
        self.observer
            .observe(&Event::ContainersPaused { count: ids.len() });

        Ok(ids)
    }

    /// Unpauses all paused containers in the namespaces and brings the node
    /// agent back. The agent stays down if the containers cannot be unpaused.
    pub fn unpause(&self, namespaces: &[String]) -> Result<Vec<String>, ClusterError> {
        let ids = self.list(ContainerState::Paused, namespaces)?;

        if ids.is_empty() {
            self.observer.observe(&Event::NoPausedContainers {
                namespaces: namespaces.to_vec(),
            });
        } else if let Err(err) = self.runtime.unpause_containers(&ids) {
            return Err(ClusterError::new(ErrorKind::ContainerUnpauseFailed, ids, err));
        } else {
            self.observer
                .observe(&Event::ContainersUnpaused { count: ids.len() });
        }

        if let Err(err) = self.agent.enable(self.runner) {
            return Err(ClusterError::new(ErrorKind::AgentEnableFailed, ids, err));
        }
        if let Err(err) = self.agent.start(self.runner) {
            return Err(ClusterError::new(ErrorKind::AgentStartFailed, ids, err));
        }
        self.observer.observe(&Event::AgentStarted {
            unit: self.agent.unit().to_owned(),
        });

        Ok(ids)
    }

    pub fn status(&self, namespaces: &[String]) -> Result<ClusterStatus, ClusterError> {
        let agent_active = self
            .agent
            .is_active(self.runner)
            .map_err(|err| ClusterError::new(ErrorKind::AgentStatusFailed, Vec::new(), err))?;
        let running = self.list(ContainerState::Running, namespaces)?;
        let paused = self.list(ContainerState::Paused, namespaces)?;

        Ok(ClusterStatus {
            agent_active,
            running,
            paused,
        })
    }

    fn list(
        &self,
        state: ContainerState,
        namespaces: &[String],
    ) -> Result<Vec<String>, ClusterError> {
        let ids = self
            .runtime
            .list_containers(&ListOptions::new(state, namespaces))
            .map_err(|err| ClusterError::new(ErrorKind::ContainerListFailed, Vec::new(), err))?;
        self.observer.observe(&Event::ContainersListed {
            state,
            count: ids.len(),
        });
        Ok(ids)
    }
}

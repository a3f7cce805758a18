//! Observability hooks of the pause/unpause orchestration. The orchestrator
//! reports through an injected [`Observer`] instead of logging directly, so
//! embedders can route its events wherever they like.
use std::fmt::{self, Display};

use tracing::Level;

use crate::runtime::ContainerState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    NoRunningContainers { namespaces: Vec<String> },
    NoPausedContainers { namespaces: Vec<String> },
    AgentStopped { unit: String },
    AgentStarted { unit: String },
    ContainersListed { state: ContainerState, count: usize },
    ContainersPaused { count: usize },
    ContainersUnpaused { count: usize },
}

impl Event {
    pub fn level(&self) -> Level {
        match self {
            Self::NoRunningContainers { .. } | Self::NoPausedContainers { .. } => Level::WARN,
            _ => Level::DEBUG,
        }
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRunningContainers { .. } => write!(f, "no running containers to pause"),
            Self::NoPausedContainers { .. } => write!(f, "no paused containers found"),
            Self::AgentStopped { unit } => write!(f, "node agent {unit} disabled and stopped"),
            Self::AgentStarted { unit } => write!(f, "node agent {unit} enabled and started"),
            Self::ContainersListed { state, count } => {
                write!(f, "found {count} {state} containers")
            }
            Self::ContainersPaused { count } => write!(f, "paused {count} containers"),
            Self::ContainersUnpaused { count } => write!(f, "unpaused {count} containers"),
        }
    }
}

pub trait Observer {
    fn observe(&self, event: &Event);
}

/// Forwards events to the `tracing` subscriber of the process
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn observe(&self, event: &Event) {
        match event {
            Event::NoRunningContainers { namespaces }
            | Event::NoPausedContainers { namespaces } => {
                tracing::warn!(?namespaces, "{}", event)
            }
            _ => tracing::debug!("{}", event),
        }
    }
}

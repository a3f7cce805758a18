//! Control of the node agent (kubelet), the supervisor that restarts
//! workloads on a node. It has to be kept from interfering while the
//! node's containers are paused.

pub mod systemd;

use std::fmt::{self, Display};

use crate::command::{CommandError, CommandRunner};

pub use systemd::SystemdAgent;

/// Lifecycle step of the node agent an operation failed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentStep {
    Disable,
    Stop,
    Enable,
    Start,
    Status,
}

impl AgentStep {
    /// The systemctl verb performing this step
    pub fn verb(&self) -> &'static str {
        match *self {
            Self::Disable => "disable",
            Self::Stop => "stop",
            Self::Enable => "enable",
            Self::Start => "start",
            Self::Status => "is-active",
        }
    }
}

impl Display for AgentStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let print = match *self {
            Self::Disable => "disable",
            Self::Stop => "stop",
            Self::Enable => "enable",
            Self::Start => "start",
            Self::Status => "query the status of",
        };

        write!(f, "{print}")
    }
}

#[derive(Debug, thiserror::Error)]
#[error("failed to {step} node agent {unit}")]
pub struct AgentError {
    pub step: AgentStep,
    pub unit: String,
    #[source]
    pub source: CommandError,
}

pub trait NodeAgent {
    /// Name of the agent's service unit
    fn unit(&self) -> &str;

    /// Keeps the agent from being started on boot
    fn disable(&self, runner: &dyn CommandRunner) -> Result<(), AgentError>;

    fn stop(&self, runner: &dyn CommandRunner) -> Result<(), AgentError>;

    fn enable(&self, runner: &dyn CommandRunner) -> Result<(), AgentError>;

    fn start(&self, runner: &dyn CommandRunner) -> Result<(), AgentError>;

    fn is_active(&self, runner: &dyn CommandRunner) -> Result<bool, AgentError>;
}

//! Abstraction over the container engine of a node
use std::fmt::{self, Display};
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;

use crate::command::{CommandError, CommandRunner};

pub mod cri;
pub mod docker;

pub use cri::CriRuntime;
pub use docker::DockerRuntime;

/// Run state a container listing is filtered by
#[derive(Serialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ContainerState {
    Running,
    Paused,
}

impl Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let print = match *self {
            Self::Running => "running",
            Self::Paused => "paused",
        };

        write!(f, "{print}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    pub state: ContainerState,
    /// Restricts the listing to these namespaces, all namespaces if empty
    pub namespaces: Vec<String>,
}

impl ListOptions {
    pub fn new(state: ContainerState, namespaces: &[String]) -> Self {
        Self {
            state,
            namespaces: namespaces.to_vec(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("failed to parse container states reported by {binary}")]
    ParseState {
        binary: String,
        source: serde_json::Error,
    },
    #[error("failed to {action} container {id} ({done} containers done before it)")]
    PartialTransition {
        action: &'static str,
        id: String,
        done: usize,
        source: CommandError,
    },
    #[error("unknown container runtime: {0}")]
    UnknownRuntime(String),
}

/// List and freeze primitives of a container engine
pub trait RuntimeManager {
    fn name(&self) -> &str;

    /// Lists the ids of the containers matching the options
    fn list_containers(&self, opts: &ListOptions) -> Result<Vec<String>, RuntimeError>;

    fn pause_containers(&self, ids: &[String]) -> Result<(), RuntimeError>;

    fn unpause_containers(&self, ids: &[String]) -> Result<(), RuntimeError>;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RuntimeKind {
    Docker,
    Containerd,
    CriO,
}

impl FromStr for RuntimeKind {
    type Err = RuntimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "docker" => Ok(Self::Docker),
            "containerd" => Ok(Self::Containerd),
            "cri-o" | "crio" => Ok(Self::CriO),
            _ => Err(RuntimeError::UnknownRuntime(s.to_owned())),
        }
    }
}

impl Display for RuntimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let print = match *self {
            Self::Docker => "docker",
            Self::Containerd => "containerd",
            Self::CriO => "cri-o",
        };

        write!(f, "{print}")
    }
}

/// Overrides for the low level runtime used by CRI engines
#[derive(Debug, Clone, Default)]
pub struct RuntimeOptions {
    pub runc_binary: Option<String>,
    pub runc_root: Option<PathBuf>,
}

pub fn create_runtime_manager<'a>(
    kind: RuntimeKind,
    runner: &'a dyn CommandRunner,
    opts: &RuntimeOptions,
) -> Box<dyn RuntimeManager + 'a> {
    match kind {
        RuntimeKind::Docker => Box::new(DockerRuntime::new(runner)),
        RuntimeKind::Containerd | RuntimeKind::CriO => {
            // each engine keeps the runc state of its containers in its own root
            let (name, default_root) = if kind == RuntimeKind::Containerd {
                ("containerd", cri::CONTAINERD_RUNC_ROOT)
            } else {
                ("cri-o", cri::CRIO_RUNC_ROOT)
            };
            let binary = opts
                .runc_binary
                .clone()
                .unwrap_or_else(|| cri::DEFAULT_RUNC_BINARY.to_owned());
            let root = opts
                .runc_root
                .clone()
                .unwrap_or_else(|| PathBuf::from(default_root));
            Box::new(CriRuntime::new(name, runner, binary, root))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::test::TestRunner;

    #[test]
    fn test_parse_runtime_kind() {
        assert_eq!("docker".parse::<RuntimeKind>().unwrap(), RuntimeKind::Docker);
        assert_eq!(
            "containerd".parse::<RuntimeKind>().unwrap(),
            RuntimeKind::Containerd
        );
        assert_eq!("CRI-O".parse::<RuntimeKind>().unwrap(), RuntimeKind::CriO);
        assert_eq!("crio".parse::<RuntimeKind>().unwrap(), RuntimeKind::CriO);
        assert!(matches!(
            "rkt".parse::<RuntimeKind>(),
            Err(RuntimeError::UnknownRuntime(name)) if name == "rkt"
        ));
    }

    #[test]
    fn test_create_runtime_manager() -> anyhow::Result<()> {
        let runner = TestRunner::new()
            .on("crictl ps", "c1\n")
            .on(
                "runc --root /run/containerd/runc/k8s.io list",
                r#"[{"id":"c1","status":"running"}]"#,
            );
        let manager =
            create_runtime_manager(RuntimeKind::Containerd, &runner, &RuntimeOptions::default());
        assert_eq!(manager.name(), "containerd");
        assert_eq!(
            manager.list_containers(&ListOptions::new(ContainerState::Running, &[]))?,
            vec!["c1"]
        );

        let opts = RuntimeOptions {
            runc_binary: Some("youki".to_owned()),
            runc_root: Some(PathBuf::from("/run/youki")),
        };
        let runner = TestRunner::new();
        let manager = create_runtime_manager(RuntimeKind::CriO, &runner, &opts);
        assert_eq!(manager.name(), "cri-o");
        manager.pause_containers(&["c2".to_owned()])?;
        assert_eq!(runner.calls(), vec!["youki --root /run/youki pause c2"]);

        let runner = TestRunner::new();
        let manager = create_runtime_manager(RuntimeKind::Docker, &runner, &opts);
        assert_eq!(manager.name(), "docker");
        Ok(())
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ContainerState::Running.to_string(), "running");
        assert_eq!(ContainerState::Paused.to_string(), "paused");
    }
}

//! Container engines speaking CRI (containerd, CRI-O)
//!
//! CRI itself has no notion of a paused container, so the candidate
//! containers are taken from crictl and their run state, as well as the
//! freeze itself, from the low level OCI runtime (runc or a compatible
//! binary such as youki).
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use serde::Deserialize;

use super::{ContainerState, ListOptions, RuntimeError, RuntimeManager};
use crate::command::{Command, CommandRunner};

pub const NAMESPACE_LABEL: &str = "io.kubernetes.pod.namespace";
pub const DEFAULT_RUNC_BINARY: &str = "runc";
pub const CONTAINERD_RUNC_ROOT: &str = "/run/containerd/runc/k8s.io";
pub const CRIO_RUNC_ROOT: &str = "/run/runc";

/// One entry of `runc list -f json`
#[derive(Debug, Deserialize)]
struct RuncContainer {
    id: String,
    status: String,
}

pub struct CriRuntime<'a> {
    name: &'static str,
    runner: &'a dyn CommandRunner,
    runc_binary: String,
    runc_root: PathBuf,
}

impl<'a> CriRuntime<'a> {
    pub fn new<S: Into<String>, P: Into<PathBuf>>(
        name: &'static str,
        runner: &'a dyn CommandRunner,
        runc_binary: S,
        runc_root: P,
    ) -> Self {
        Self {
            name,
            runner,
            runc_binary: runc_binary.into(),
            runc_root: runc_root.into(),
        }
    }

    fn runc(&self) -> Command {
        Command::new(self.runc_binary.as_str())
            .arg("--root")
            .arg(self.runc_root.to_string_lossy())
    }

    /// Ids known to CRI in the given namespaces, in crictl order
    fn candidates(&self, namespaces: &[String]) -> Result<Vec<String>, RuntimeError> {
        let base = Command::new("crictl").args(["ps", "-a", "--quiet"]);
        let commands: Vec<Command> = if namespaces.is_empty() {
            vec![base]
        } else {
            // crictl only accepts a single value per label filter
            namespaces
                .iter()
                .map(|ns| {
                    base.clone()
                        .arg("--label")
                        .arg(format!("{NAMESPACE_LABEL}={ns}"))
                })
                .collect()
        };

        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        for cmd in &commands {
            let output = self.runner.run(cmd)?;
            for id in output.lines() {
                if seen.insert(id.to_owned()) {
                    ids.push(id.to_owned());
                }
            }
        }
        Ok(ids)
    }

    fn runc_states(&self) -> Result<HashMap<String, String>, RuntimeError> {
        let output = self.runner.run(&self.runc().args(["list", "-f", "json"]))?;
        let stdout = output.stdout.trim();
        if stdout.is_empty() {
            return Ok(HashMap::new());
        }

        // runc prints `null` when it knows no containers
        let containers: Option<Vec<RuncContainer>> =
            serde_json::from_str(stdout).map_err(|source| RuntimeError::ParseState {
                binary: self.runc_binary.clone(),
                source,
            })?;
        Ok(containers
            .unwrap_or_default()
            .into_iter()
            .map(|c| (c.id, c.status))
            .collect())
    }

    fn transition(&self, action: &'static str, ids: &[String]) -> Result<(), RuntimeError> {
        for (done, id) in ids.iter().enumerate() {
            self.runner
                .run(&self.runc().arg(action).arg(id.as_str()))
                .map_err(|source| RuntimeError::PartialTransition {
                    action,
                    id: id.clone(),
                    done,
                    source,
                })?;
            tracing::debug!(runtime = self.name, "{} container {}", action, id);
        }
        Ok(())
    }
}

impl RuntimeManager for CriRuntime<'_> {
    fn name(&self) -> &str {
        self.name
    }

    fn list_containers(&self, opts: &ListOptions) -> Result<Vec<String>, RuntimeError> {
        let candidates = self.candidates(&opts.namespaces)?;
        if candidates.is_empty() {
            return Ok(candidates);
        }

        let states = self.runc_states()?;
        let wanted = opts.state.to_string();
        let ids = candidates
            .into_iter()
            .filter(|id| states.get(id).map(|s| s == &wanted).unwrap_or(false))
            .collect();
        Ok(ids)
    }

    fn pause_containers(&self, ids: &[String]) -> Result<(), RuntimeError> {
        self.transition("pause", ids)
    }

    fn unpause_containers(&self, ids: &[String]) -> Result<(), RuntimeError> {
        self.transition("resume", ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::test::TestRunner;
    use crate::command::CommandError;
    use anyhow::Result;

    const RUNC_LIST: &str = r#"[
        {"ociVersion":"1.0.2","id":"c1","pid":101,"status":"running","bundle":"/b/c1"},
        {"ociVersion":"1.0.2","id":"c2","pid":102,"status":"paused","bundle":"/b/c2"},
        {"ociVersion":"1.0.2","id":"c3","pid":103,"status":"running","bundle":"/b/c3"},
        {"ociVersion":"1.0.2","id":"c4","pid":0,"status":"stopped","bundle":"/b/c4"}
    ]"#;

    fn runtime(runner: &TestRunner) -> CriRuntime<'_> {
        CriRuntime::new("containerd", runner, DEFAULT_RUNC_BINARY, CONTAINERD_RUNC_ROOT)
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_list_running_all_namespaces() -> Result<()> {
        let runner = TestRunner::new()
            .on("crictl ps -a --quiet", "c3\nc1\nc2\nc4\n")
            .on("runc --root", RUNC_LIST);
        let ids = runtime(&runner)
            .list_containers(&ListOptions::new(ContainerState::Running, &[]))?;

        assert_eq!(ids, vec!["c3", "c1"]);
        assert_eq!(
            runner.calls(),
            vec![
                "crictl ps -a --quiet",
                "runc --root /run/containerd/runc/k8s.io list -f json",
            ]
        );
        Ok(())
    }

    #[test]
    fn test_list_paused_per_namespace() -> Result<()> {
        let runner = TestRunner::new()
            .on("crictl ps -a --quiet --label io.kubernetes.pod.namespace=kube-system", "c1\nc2")
            .on("crictl ps -a --quiet --label io.kubernetes.pod.namespace=default", "c2\nc3")
            .on("runc", RUNC_LIST);
        let ids = runtime(&runner).list_containers(&ListOptions::new(
            ContainerState::Paused,
            &strings(&["kube-system", "default"]),
        ))?;

        assert_eq!(ids, vec!["c2"]);
        assert_eq!(runner.calls().len(), 3);
        Ok(())
    }

    #[test]
    fn test_list_without_candidates_skips_runc() -> Result<()> {
        let runner = TestRunner::new().on("crictl", "\n");
        let ids = runtime(&runner)
            .list_containers(&ListOptions::new(ContainerState::Running, &[]))?;

        assert!(ids.is_empty());
        assert!(!runner.called("runc"));
        Ok(())
    }

    #[test]
    fn test_runc_null_list() -> Result<()> {
        let runner = TestRunner::new().on("crictl", "c1").on("runc", "null\n");
        let ids = runtime(&runner)
            .list_containers(&ListOptions::new(ContainerState::Running, &[]))?;
        assert!(ids.is_empty());
        Ok(())
    }

    #[test]
    fn test_runc_garbage_is_parse_error() {
        let runner = TestRunner::new().on("crictl", "c1").on("runc", "{not json");
        let err = runtime(&runner)
            .list_containers(&ListOptions::new(ContainerState::Running, &[]))
            .unwrap_err();
        assert!(matches!(err, RuntimeError::ParseState { binary, .. } if binary == "runc"));
    }

    #[test]
    fn test_crictl_failure() {
        let runner = TestRunner::new().fail_on("crictl", "connection refused");
        let err = runtime(&runner)
            .list_containers(&ListOptions::new(ContainerState::Running, &[]))
            .unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Command(CommandError::NonZeroExit { ref stderr, .. })
                if stderr == "connection refused"
        ));
    }

    #[test]
    fn test_pause_and_resume_each_container() -> Result<()> {
        let runner = TestRunner::new();
        let cri = runtime(&runner);
        cri.pause_containers(&strings(&["c1", "c2"]))?;
        cri.unpause_containers(&strings(&["c2"]))?;

        assert_eq!(
            runner.calls(),
            vec![
                "runc --root /run/containerd/runc/k8s.io pause c1",
                "runc --root /run/containerd/runc/k8s.io pause c2",
                "runc --root /run/containerd/runc/k8s.io resume c2",
            ]
        );
        Ok(())
    }

    #[test]
    fn test_pause_stops_at_first_failure() {
        let runner = TestRunner::new().fail_on(
            "runc --root /run/containerd/runc/k8s.io pause c2",
            "no such container",
        );
        let err = runtime(&runner)
            .pause_containers(&strings(&["c1", "c2", "c3"]))
            .unwrap_err();

        match err {
            RuntimeError::PartialTransition { action, id, done, .. } => {
                assert_eq!(action, "pause");
                assert_eq!(id, "c2");
                assert_eq!(done, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!runner.called("runc --root /run/containerd/runc/k8s.io pause c3"));
    }
}

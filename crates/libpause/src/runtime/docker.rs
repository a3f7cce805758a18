use super::{ListOptions, RuntimeError, RuntimeManager};
use crate::command::{Command, CommandRunner};

/// Docker with the kubelet's dockershim naming scheme,
/// `k8s_<container>_<pod>_<namespace>_<uid>_<attempt>`
pub struct DockerRuntime<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> DockerRuntime<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    fn transition(&self, action: &str, ids: &[String]) -> Result<(), RuntimeError> {
        if ids.is_empty() {
            return Ok(());
        }
        self.runner
            .run(&Command::new("docker").arg(action).args(ids.iter().cloned()))?;
        Ok(())
    }
}

impl RuntimeManager for DockerRuntime<'_> {
    fn name(&self) -> &str {
        "docker"
    }

    fn list_containers(&self, opts: &ListOptions) -> Result<Vec<String>, RuntimeError> {
        let mut cmd = Command::new("docker")
            .args(["ps", "-a", "--filter"])
            .arg(format!("status={}", opts.state));
        if !opts.namespaces.is_empty() {
            cmd = cmd
                .arg("--filter")
                .arg(format!("name=k8s_.*_({})_", opts.namespaces.join("|")));
        }
        let cmd = cmd.arg("--format={{.ID}}");

        let output = self.runner.run(&cmd)?;
        Ok(output.lines().map(str::to_owned).collect())
    }

    fn pause_containers(&self, ids: &[String]) -> Result<(), RuntimeError> {
        self.transition("pause", ids)
    }

    fn unpause_containers(&self, ids: &[String]) -> Result<(), RuntimeError> {
        self.transition("unpause", ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::test::TestRunner;
    use crate::runtime::ContainerState;
    use anyhow::Result;

    #[test]
    fn test_list_with_namespaces() -> Result<()> {
        let runner = TestRunner::new().on("docker ps", "0a1b2c\n3d4e5f\n");
        let docker = DockerRuntime::new(&runner);
        let ids = docker.list_containers(&ListOptions::new(
            ContainerState::Running,
            &["kube-system".to_owned(), "default".to_owned()],
        ))?;

        assert_eq!(ids, vec!["0a1b2c", "3d4e5f"]);
        assert_eq!(
            runner.calls(),
            vec![concat!(
                "docker ps -a --filter status=running ",
                "--filter name=k8s_.*_(kube-system|default)_ --format={{.ID}}"
            )]
        );
        Ok(())
    }

    #[test]
    fn test_list_all_namespaces() -> Result<()> {
        let runner = TestRunner::new();
        let ids = DockerRuntime::new(&runner)
            .list_containers(&ListOptions::new(ContainerState::Paused, &[]))?;

        assert!(ids.is_empty());
        assert_eq!(
            runner.calls(),
            vec!["docker ps -a --filter status=paused --format={{.ID}}"]
        );
        Ok(())
    }

    #[test]
    fn test_pause_in_one_call() -> Result<()> {
        let runner = TestRunner::new();
        let docker = DockerRuntime::new(&runner);
        docker.pause_containers(&["a".to_owned(), "b".to_owned()])?;
        docker.unpause_containers(&["a".to_owned()])?;
        docker.pause_containers(&[])?;

        assert_eq!(runner.calls(), vec!["docker pause a b", "docker unpause a"]);
        Ok(())
    }
}

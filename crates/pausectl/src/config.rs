//! Resolves the global options into the collaborators of a node
use std::time::Duration;

use anyhow::{bail, Context, Result};
use libpause::agent::SystemdAgent;
use libpause::command::ExecRunner;
use libpause::runtime::{RuntimeKind, RuntimeOptions};
use libpause_cli::GlobalOpts;

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub runtime: RuntimeKind,
    pub runtime_options: RuntimeOptions,
    pub agent_unit: String,
    pub command_timeout: Option<Duration>,
    pub no_sudo: bool,
}

impl TryFrom<&GlobalOpts> for NodeConfig {
    type Error = anyhow::Error;

    fn try_from(opts: &GlobalOpts) -> Result<Self> {
        let runtime = opts
            .container_runtime
            .parse::<RuntimeKind>()
            .with_context(|| "invalid --container-runtime")?;

        if runtime == RuntimeKind::Docker && opts.runc_root.is_some() {
            tracing::warn!("--runc-root has no effect with the docker runtime");
        }

        if opts.agent_unit.is_empty() {
            bail!("--agent-unit must not be empty");
        }

        let command_timeout = match opts.command_timeout {
            Some(0) => bail!("--command-timeout must be at least one second"),
            Some(secs) => Some(Duration::from_secs(secs)),
            None => None,
        };

        Ok(Self {
            runtime,
            runtime_options: RuntimeOptions {
                runc_binary: opts.runc_binary.clone(),
                runc_root: opts.runc_root.clone(),
            },
            agent_unit: opts.agent_unit.clone(),
            command_timeout,
            no_sudo: opts.no_sudo,
        })
    }
}

impl NodeConfig {
    pub fn runner(&self) -> ExecRunner {
        let runner = ExecRunner::new().with_timeout(self.command_timeout);
        if self.no_sudo {
            runner.with_sudo(false)
        } else {
            runner
        }
    }

    pub fn agent(&self) -> SystemdAgent {
        SystemdAgent::new(self.agent_unit.as_str())
    }
}

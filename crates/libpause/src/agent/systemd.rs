use super::{AgentError, AgentStep, NodeAgent};
use crate::command::{Command, CommandError, CommandRunner};

pub const DEFAULT_UNIT: &str = "kubelet";

/// A node agent managed as a systemd service
#[derive(Debug, Clone)]
pub struct SystemdAgent {
    unit: String,
}

impl Default for SystemdAgent {
    fn default() -> Self {
        Self::new(DEFAULT_UNIT)
    }
}

impl SystemdAgent {
    pub fn new<S: Into<String>>(unit: S) -> Self {
        Self { unit: unit.into() }
    }

    fn systemctl(&self, runner: &dyn CommandRunner, step: AgentStep) -> Result<(), AgentError> {
        let verb = step.verb();
        let cmd = Command::new("systemctl").arg(verb).arg(&self.unit);
        runner.run(&cmd).map_err(|source| self.error(step, source))?;

        tracing::debug!(unit = %self.unit, "systemctl {} succeeded", verb);
        Ok(())
    }

    fn error(&self, step: AgentStep, source: CommandError) -> AgentError {
        AgentError {
            step,
            unit: self.unit.clone(),
            source,
        }
    }
}

impl NodeAgent for SystemdAgent {
    fn unit(&self) -> &str {
        &self.unit
    }

    fn disable(&self, runner: &dyn CommandRunner) -> Result<(), AgentError> {
        self.systemctl(runner, AgentStep::Disable)
    }

    fn stop(&self, runner: &dyn CommandRunner) -> Result<(), AgentError> {
        self.systemctl(runner, AgentStep::Stop)
    }

    fn enable(&self, runner: &dyn CommandRunner) -> Result<(), AgentError> {
        self.systemctl(runner, AgentStep::Enable)
    }

    fn start(&self, runner: &dyn CommandRunner) -> Result<(), AgentError> {
        self.systemctl(runner, AgentStep::Start)
    }

    fn is_active(&self, runner: &dyn CommandRunner) -> Result<bool, AgentError> {
        let cmd = Command::new("systemctl")
            .arg("is-active")
            .arg("--quiet")
            .arg(&self.unit);
        match runner.run(&cmd) {
            Ok(_) => Ok(true),
            // is-active reports an inactive unit through its exit code
            Err(CommandError::NonZeroExit { .. }) => Ok(false),
            Err(source) => Err(self.error(AgentStep::Status, source)),
        }
    }
}

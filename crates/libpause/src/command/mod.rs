//! Contains a wrapper for running commands on the node
//! This provides a uniform interface for the rest of libpause
//! to call the node's tooling (systemctl, crictl, runc, docker)

pub mod exec;

use std::fmt::{self, Display};
use std::time::Duration;

pub use exec::ExecRunner;

/// A command line to be run on the node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    program: String,
    args: Vec<String>,
}

impl Command {
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` if the process was terminated by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Non-empty, trimmed lines of stdout
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("failed to spawn `{command}`")]
    Spawn {
        command: String,
        source: std::io::Error,
    },
    #[error("failed to wait for `{command}`")]
    Wait {
        command: String,
        source: std::io::Error,
    },
    #[error("`{command}` timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },
    #[error("`{command}` failed with {status}: {stderr}")]
    NonZeroExit {
        command: String,
        status: String,
        stdout: String,
        stderr: String,
    },
}

/// Runs commands on the node a cluster is deployed to
pub trait CommandRunner {
    /// Runs the command to completion. A non-zero exit is reported as
    /// [`CommandError::NonZeroExit`].
    fn run(&self, cmd: &Command) -> Result<CommandOutput, CommandError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_display() {
        let cmd = Command::new("systemctl").arg("stop").arg("kubelet");
        assert_eq!(cmd.to_string(), "systemctl stop kubelet");
        assert_eq!(cmd.program(), "systemctl");
        assert_eq!(cmd.get_args(), &["stop".to_owned(), "kubelet".to_owned()]);
    }

    #[test]
    fn test_output_lines_skip_blank() {
        let output = CommandOutput {
            status: Some(0),
            stdout: "c1\n\n  c2  \n".to_owned(),
            stderr: String::new(),
        };
        assert!(output.success());
        assert_eq!(output.lines().collect::<Vec<_>>(), vec!["c1", "c2"]);
    }

    #[test]
    fn test_signal_terminated_is_not_success() {
        let output = CommandOutput {
            status: None,
            ..Default::default()
        };
        assert!(!output.success());
    }
}

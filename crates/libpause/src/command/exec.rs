//! Implements CommandRunner by executing processes on the local host
use std::io;
use std::os::unix::process::CommandExt;
use std::process::{self, Output, Stdio};
use std::thread;
use std::time::Duration;

use nix::sys::signal;
use nix::unistd::Pid;

use super::{Command, CommandError, CommandOutput, CommandRunner};

/// Time a timed out command gets to exit on SIGTERM before it is killed
const KILL_GRACE: Duration = Duration::from_secs(2);

/// Runs commands as local child processes. Privileged node tooling is
/// prefixed with `sudo` unless the runner already has root privileges.
#[derive(Debug, Clone)]
pub struct ExecRunner {
    use_sudo: bool,
    timeout: Option<Duration>,
}

impl Default for ExecRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecRunner {
    pub fn new() -> Self {
        Self {
            use_sudo: !nix::unistd::geteuid().is_root(),
            timeout: None,
        }
    }

    pub fn with_sudo(mut self, use_sudo: bool) -> Self {
        self.use_sudo = use_sudo;
        self
    }

    /// Kill commands that do not finish within the timeout
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn build(&self, cmd: &Command) -> process::Command {
        let mut command = if self.use_sudo {
            let mut command = process::Command::new("sudo");
            command.arg(cmd.program());
            command
        } else {
            process::Command::new(cmd.program())
        };
        command
            .args(cmd.get_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if self.timeout.is_some() {
            // Own process group, so a timeout reaches whatever sudo or a
            // wrapper script forked, not only the direct child.
            command.process_group(0);
        }
        command
    }

    /// SIGTERM the whole group first: sudo runs the command as root, so only
    /// a signal sudo relays can reach it from an unprivileged caller.
    fn terminate_group(pgid: Pid, done: &crossbeam_channel::Receiver<io::Result<Output>>) {
        if let Err(err) = signal::killpg(pgid, signal::Signal::SIGTERM) {
            tracing::warn!(?err, %pgid, "failed to terminate timed out command");
        }
        if done.recv_timeout(KILL_GRACE).is_ok() {
            return;
        }
        if let Err(err) = signal::killpg(pgid, signal::Signal::SIGKILL) {
            tracing::warn!(?err, %pgid, "failed to kill timed out command");
        }
    }

    fn wait_with_timeout(
        child: process::Child,
        timeout: Duration,
        cmd: &Command,
    ) -> Result<Output, CommandError> {
        // The child leads its own process group and is moved into the wait
        // thread, so the group id is the only handle left to kill it with.
        let pgid = Pid::from_raw(child.id() as i32);
        let (s, r) = crossbeam_channel::bounded(1);
        thread::spawn(move || {
            let res = child.wait_with_output();
            let _ = s.send(res);
        });

        match r.recv_timeout(timeout) {
            Ok(res) => res.map_err(|source| CommandError::Wait {
                command: cmd.to_string(),
                source,
            }),
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                Self::terminate_group(pgid, &r);
                Err(CommandError::Timeout {
                    command: cmd.to_string(),
                    timeout,
                })
            }
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => Err(CommandError::Wait {
                command: cmd.to_string(),
                source: io::Error::new(io::ErrorKind::Other, "wait thread exited"),
            }),
        }
    }
}

impl CommandRunner for ExecRunner {
    #[tracing::instrument(level = "debug", skip_all, fields(command = %cmd))]
    fn run(&self, cmd: &Command) -> Result<CommandOutput, CommandError> {
        let child = self
            .build(cmd)
            .spawn()
            .map_err(|source| CommandError::Spawn {
                command: cmd.to_string(),
                source,
            })?;

        let output = match self.timeout {
            Some(timeout) => Self::wait_with_timeout(child, timeout, cmd)?,
            None => child
                .wait_with_output()
                .map_err(|source| CommandError::Wait {
                    command: cmd.to_string(),
                    source,
                })?,
        };

        let result = CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        tracing::debug!(status = ?result.status, "command finished");

        if !output.status.success() {
            return Err(CommandError::NonZeroExit {
                command: cmd.to_string(),
                status: output.status.to_string(),
                stdout: result.stdout,
                stderr: result.stderr.trim().to_owned(),
            });
        }

        Ok(result)
    }
}

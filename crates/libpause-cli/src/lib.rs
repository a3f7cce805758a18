use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod pause;
mod scope;
mod status;
mod unpause;

pub use pause::Pause;
pub use scope::{Scope, DEFAULT_NAMESPACES};
pub use status::Status;
pub use unpause::Unpause;

// Subcommands acting on the workload of a node
#[derive(Subcommand, Debug)]
pub enum NodeCmd {
    Pause(Pause),
    Unpause(Unpause),
    Status(Status),
}

// Options shared by all subcommands
#[derive(Parser, Debug)]
pub struct GlobalOpts {
    /// set the log file to write logs to (default is '/dev/stderr')
    #[clap(short, long, overrides_with("log"))]
    pub log: Option<PathBuf>,
    /// change log level to debug, but the `log-level` flag takes precedence
    #[clap(long)]
    pub debug: bool,
    /// set the log format ('text' (default), or 'json') (default: "text")
    #[clap(long)]
    pub log_format: Option<String>,
    /// set the log level (default is 'error')
    #[clap(long)]
    pub log_level: Option<String>,
    /// also send logs to the systemd journal
    #[clap(long)]
    pub systemd_log: bool,
    /// container runtime of the node: docker, containerd or cri-o
    #[clap(long, default_value = "containerd")]
    pub container_runtime: String,
    /// low level OCI runtime used by CRI runtimes (default: "runc")
    #[clap(long)]
    pub runc_binary: Option<String>,
    /// state directory of the low level OCI runtime
    #[clap(long)]
    pub runc_root: Option<PathBuf>,
    /// systemd unit of the node agent
    #[clap(long, default_value = "kubelet")]
    pub agent_unit: String,
    /// kill node commands running longer than this many seconds
    #[clap(long)]
    pub command_timeout: Option<u64>,
    /// never prefix node commands with sudo
    #[clap(long)]
    pub no_sudo: bool,
}

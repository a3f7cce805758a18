//! # pausectl
//! Pauses and unpauses the workload of a Kubernetes node. The node agent is
//! disabled while the node's containers are frozen through its container
//! runtime, and brought back once they are thawed.
mod commands;
mod config;
mod observability;

use anyhow::Result;
use clap::{crate_version, CommandFactory, Parser};

use libpause_cli::{GlobalOpts, NodeCmd};

use crate::config::NodeConfig;

#[derive(Parser, Debug)]
#[clap(version = pausectl_version!(), author = env!("CARGO_PKG_AUTHORS"))]
struct Opts {
    #[clap(flatten)]
    global: GlobalOpts,

    #[clap(subcommand)]
    subcmd: SubCommand,
}

#[derive(Parser, Debug)]
enum SubCommand {
    // Node operations handled by the libpause_cli crate
    #[clap(flatten)]
    Node(NodeCmd),

    Completion(commands::completion::Completion),
}

/// output pausectl version along with the commit it was built from
#[macro_export]
macro_rules! pausectl_version {
    () => {
        concat!(
            "version ",
            crate_version!(),
            "\ncommit: ",
            env!("VERGEN_GIT_SHA")
        )
    };
}

fn main() -> Result<()> {
    let opts = Opts::parse();
    let mut app = Opts::command();

    if let Err(e) = observability::init(&opts) {
        eprintln!("log init failed: {:?}", e);
    }

    tracing::debug!(
        "started by user {} with {:?}",
        nix::unistd::geteuid(),
        std::env::args_os()
    );

    match opts.subcmd {
        SubCommand::Node(cmd) => {
            let config = NodeConfig::try_from(&opts.global)?;
            match cmd {
                NodeCmd::Pause(pause) => commands::pause::pause(pause, &config),
                NodeCmd::Unpause(unpause) => commands::unpause::unpause(unpause, &config),
                NodeCmd::Status(status) => commands::status::status(status, &config),
            }
        }
        SubCommand::Completion(completion) => {
            commands::completion::completion(completion, &mut app)
        }
    }
}

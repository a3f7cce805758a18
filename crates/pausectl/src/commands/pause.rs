//! Contains functionality of the pause command
use anyhow::{Context, Result};
use libpause::cluster::Cluster;
use libpause::runtime::create_runtime_manager;
use libpause_cli::Pause;

use super::{render_transition, report_failure, OutputFormat};
use crate::config::NodeConfig;

// Pausing stops and disables the node agent first, so it cannot restart the
// containers that are frozen afterwards.
pub fn pause(args: Pause, config: &NodeConfig) -> Result<()> {
    let format: OutputFormat = args.scope.output.parse()?;
    let namespaces = args.scope.namespaces();
    tracing::debug!(?namespaces, runtime = %config.runtime, "start pausing the node");

    let runner = config.runner();
    let runtime = create_runtime_manager(config.runtime, &runner, &config.runtime_options);
    let agent = config.agent();

    let ids = Cluster::new(runtime.as_ref(), &agent, &runner)
        .pause(&namespaces)
        .map_err(|err| {
            report_failure(&err);
            err
        })
        .context("failed to pause the node")?;

    println!(
        "{}",
        render_transition("Paused", format, &namespaces, &ids)?
    );
    Ok(())
}

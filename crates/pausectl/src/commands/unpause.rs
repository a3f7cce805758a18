//! Contains functionality of the unpause command
use anyhow::{Context, Result};
use libpause::cluster::Cluster;
use libpause::runtime::create_runtime_manager;
use libpause_cli::Unpause;

use super::{render_transition, report_failure, OutputFormat};
use crate::config::NodeConfig;

// The node agent is only brought back once every paused container is
// thawed; if unpausing fails it is left disabled.
pub fn unpause(args: Unpause, config: &NodeConfig) -> Result<()> {
    let format: OutputFormat = args.scope.output.parse()?;
    let namespaces = args.scope.namespaces();
    tracing::debug!(?namespaces, runtime = %config.runtime, "start unpausing the node");

    let runner = config.runner();
    let runtime = create_runtime_manager(config.runtime, &runner, &config.runtime_options);
    let agent = config.agent();

    let ids = Cluster::new(runtime.as_ref(), &agent, &runner)
        .unpause(&namespaces)
        .map_err(|err| {
            report_failure(&err);
            err
        })
        .context("failed to unpause the node")?;

    println!(
        "{}",
        render_transition("Unpaused", format, &namespaces, &ids)?
    );
    Ok(())
}

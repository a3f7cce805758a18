//! Contains functionality of the status command
use std::fmt::Write as _;

use anyhow::{Context, Result};
use libpause::cluster::{Cluster, ClusterStatus};
use libpause::runtime::create_runtime_manager;
use libpause_cli::Status;

use super::{report_failure, OutputFormat};
use crate::config::NodeConfig;

pub fn status(args: Status, config: &NodeConfig) -> Result<()> {
    let format: OutputFormat = args.scope.output.parse()?;
    let namespaces = args.scope.namespaces();

    let runner = config.runner();
    let runtime = create_runtime_manager(config.runtime, &runner, &config.runtime_options);
    let agent = config.agent();

    let status = Cluster::new(runtime.as_ref(), &agent, &runner)
        .status(&namespaces)
        .map_err(|err| {
            report_failure(&err);
            err
        })
        .context("failed to query the node")?;

    match format {
        OutputFormat::Text => print!("{}", render_text(&status, &config.agent_unit)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&status)?),
    }
    Ok(())
}

fn render_text(status: &ClusterStatus, unit: &str) -> String {
    let agent = if status.agent_active {
        "active"
    } else {
        "inactive"
    };
    let state = if status.is_paused() {
        "Paused"
    } else {
        "Running"
    };

    let mut content = String::new();
    let _ = writeln!(content, "{:<18}{}", "State", state);
    let _ = writeln!(content, "{:<18}{}", unit, agent);
    let _ = writeln!(content, "{:<18}{}", "Running", status.running.len());
    let _ = writeln!(content, "{:<18}{}", "Paused", status.paused.len());
    content
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_paused_node() {
        let status = ClusterStatus {
            agent_active: false,
            running: vec![],
            paused: vec!["c1".to_owned(), "c2".to_owned()],
        };
        let text = render_text(&status, "kubelet");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "State             Paused",
                "kubelet           inactive",
                "Running           0",
                "Paused            2",
            ]
        );
    }

    #[test]
    fn test_render_running_node() {
        let status = ClusterStatus {
            agent_active: true,
            running: vec!["c1".to_owned()],
            paused: vec![],
        };
        assert!(render_text(&status, "kubelet").starts_with("State             Running\n"));
    }
}

use std::str::FromStr;

use anyhow::{bail, Result};
use libpause::cluster::ClusterError;
use serde::Serialize;

pub mod completion;
pub mod pause;
pub mod status;
pub mod unpause;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            unknown => bail!("unknown output format: {}", unknown),
        }
    }
}

#[derive(Serialize)]
struct Transition<'a> {
    namespaces: &'a [String],
    ids: &'a [String],
}

fn describe_namespaces(namespaces: &[String]) -> String {
    if namespaces.is_empty() {
        "all namespaces".to_owned()
    } else {
        namespaces.join(", ")
    }
}

/// Renders the outcome of a pause or unpause, `verb` being e.g. "Paused"
fn render_transition(
    verb: &str,
    format: OutputFormat,
    namespaces: &[String],
    ids: &[String],
) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => format!(
            "{} {} containers in: {}",
            verb,
            ids.len(),
            describe_namespaces(namespaces)
        ),
        OutputFormat::Json => serde_json::to_string(&Transition { namespaces, ids })?,
    })
}

/// Logs which containers a failed operation had attempted before giving up
fn report_failure(err: &ClusterError) {
    tracing::error!(kind = ?err.kind(), ids = ?err.ids(), "{}", err);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(s: &[&str]) -> Vec<String> {
        s.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_output_format() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_render_text() -> Result<()> {
        let out = render_transition(
            "Paused",
            OutputFormat::Text,
            &strings(&["kube-system", "default"]),
            &strings(&["c1", "c2"]),
        )?;
        assert_eq!(out, "Paused 2 containers in: kube-system, default");

        let out = render_transition("Unpaused", OutputFormat::Text, &[], &[])?;
        assert_eq!(out, "Unpaused 0 containers in: all namespaces");
        Ok(())
    }

    #[test]
    fn test_render_json() -> Result<()> {
        let out = render_transition(
            "Paused",
            OutputFormat::Json,
            &strings(&["kube-system"]),
            &strings(&["c1"]),
        )?;
        let value: serde_json::Value = serde_json::from_str(&out)?;
        assert_eq!(value["namespaces"], serde_json::json!(["kube-system"]));
        assert_eq!(value["ids"], serde_json::json!(["c1"]));
        Ok(())
    }
}

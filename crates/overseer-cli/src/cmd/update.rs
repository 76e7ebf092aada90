use super::{finish, open_store};
use crate::output::{print_json, print_list};
use anyhow::Context;
use overseer_core::config::Config;
use overseer_core::orchestrator::{self, Modification};
use std::path::Path;

pub fn run(
    config: &Config,
    project: &str,
    inline: Option<&str>,
    file: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    let text = match (inline, file) {
        (Some(text), _) => text.to_string(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, None) => anyhow::bail!("pass modifications as JSON or with --file"),
    };
    let modifications = parse_modifications(&text)?;

    let store = open_store(config, project)?;
    let report = orchestrator::update(&store, &modifications)
        .with_context(|| format!("failed to update phases of '{project}'"))?;

    if json {
        print_json(&report)?;
    } else {
        println!("{}", report.message);
        let c = &report.changes_applied;
        print_list("Added", &c.added);
        print_list("Updated", &c.updated);
        print_list("Removed", &c.removed);
        print_list("Written", &report.files_written);
        print_list("Errors", &report.errors);
    }
    finish(report.success, &report.message)
}

/// Accepts a list of modifications or a single modification object.
pub fn parse_modifications(text: &str) -> anyhow::Result<Vec<Modification>> {
    let value: serde_json::Value =
        serde_json::from_str(text).context("modifications are not valid JSON")?;
    let list = if value.is_array() {
        value
    } else if let Some(inner) = value.get("modifications") {
        inner.clone()
    } else {
        serde_json::Value::Array(vec![value])
    };
    serde_json::from_value(list).context("invalid modification")
}

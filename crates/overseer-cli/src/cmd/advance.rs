use super::{finish, open_store};
use crate::output::{print_json, print_list, print_table};
use anyhow::Context;
use overseer_core::config::Config;
use overseer_core::orchestrator::{self, AdvanceStatus};

pub fn run(config: &Config, project: &str, phase: &str, json: bool) -> anyhow::Result<()> {
    let store = open_store(config, project)?;
    let report = orchestrator::advance(&store, phase)
        .with_context(|| format!("failed to advance phase {phase} of '{project}'"))?;

    if json {
        print_json(&report)?;
    } else {
        println!("{}", report.message);
        if !report.missing_items.is_empty() {
            let rows = report
                .missing_items
                .iter()
                .map(|m| vec![m.kind.to_string(), m.item.clone(), m.reason.clone()])
                .collect();
            print_table(&["KIND", "ITEM", "REASON"], rows);
        }
        print_list("Changed", &report.changes_applied);
    }

    // An incomplete gate is a normal answer, but scripts need to see it.
    finish(
        report.success && report.status == AdvanceStatus::Advanced,
        &report.message,
    )
}

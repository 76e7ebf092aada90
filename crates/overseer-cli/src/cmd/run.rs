use super::{finish, open_store};
use crate::output::{print_json, print_list, print_table};
use anyhow::Context;
use overseer_core::config::Config;
use overseer_core::orchestrator::{self, ExecuteStatus};
use overseer_core::types::Aggression;

pub fn run(
    config: &Config,
    project: &str,
    phase: &str,
    aggression: Aggression,
    json: bool,
) -> anyhow::Result<()> {
    let store = open_store(config, project)?;
    let report = orchestrator::execute(&store, phase, aggression)
        .with_context(|| format!("failed to run phase {phase} of '{project}'"))?;

    if json {
        print_json(&report)?;
        return finish(report.success, &report.message);
    }

    println!("{}", report.message);
    if !report.success {
        return finish(false, &report.message);
    }

    let mut rows: Vec<Vec<String>> = report
        .completed_items
        .iter()
        .map(|c| vec!["done".to_string(), c.kind.to_string(), c.item.clone(), c.evidence.clone()])
        .collect();
    rows.extend(report.pending_items.iter().map(|p| {
        vec![
            "pending".to_string(),
            p.kind.to_string(),
            p.item.clone(),
            p.action_taken.clone(),
        ]
    }));
    if !rows.is_empty() {
        print_table(&["STATE", "KIND", "ITEM", "DETAIL"], rows);
    }
    print_list("Changed", &report.changed_files);
    if report.status == ExecuteStatus::PotentiallyComplete {
        println!("All items complete. Run `overseer advance {project} {phase}` to lock the phase.");
    }
    Ok(())
}

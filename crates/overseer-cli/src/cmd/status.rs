use super::{finish, open_store};
use crate::output::{print_json, print_table};
use anyhow::Context;
use overseer_core::config::Config;
use overseer_core::orchestrator;
use overseer_core::timestamp;

pub fn run(config: &Config, project: &str, json: bool) -> anyhow::Result<()> {
    let store = open_store(config, project)?;
    let report = orchestrator::status(&store)
        .with_context(|| format!("failed to read status of '{project}'"))?;

    if json {
        print_json(&report)?;
        return finish(report.success, &report.message);
    }
    if !report.success {
        return finish(false, &report.message);
    }

    println!("Project: {}", report.project_name);
    if report.phases.is_empty() {
        println!("No phases.");
        return Ok(());
    }

    let current = report.current_phase.as_deref();
    let rows = report
        .phases
        .iter()
        .map(|p| {
            let marker = if Some(p.id.as_str()) == current { "*" } else { "" };
            vec![
                marker.to_string(),
                p.id.clone(),
                p.name.clone(),
                p.status.to_string(),
                p.started_at.as_ref().map(timestamp::format).unwrap_or_default(),
                p.completed_at.as_ref().map(timestamp::format).unwrap_or_default(),
            ]
        })
        .collect();
    print_table(&["", "ID", "NAME", "STATUS", "STARTED", "COMPLETED"], rows);

    let s = &report.summary;
    println!();
    println!(
        "{} phases: {} pending, {} in progress, {} completed, {} locked, {} blocked",
        s.total, s.pending, s.in_progress, s.completed, s.locked, s.blocked
    );
    match current {
        Some(id) => println!("Current phase: {id}"),
        None => println!("All phases finished."),
    }
    Ok(())
}

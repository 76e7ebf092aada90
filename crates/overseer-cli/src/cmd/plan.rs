use super::{finish, open_store};
use crate::output::{print_json, print_list, print_table};
use anyhow::Context;
use overseer_core::config::Config;
use overseer_core::orchestrator;

pub fn run(config: &Config, project: &str, phases: &[String], json: bool) -> anyhow::Result<()> {
    let store = open_store(config, project)?;
    let report = orchestrator::plan(&store, config, phases)
        .with_context(|| format!("failed to plan '{project}'"))?;

    if json {
        print_json(&report)?;
    } else {
        println!("{}", report.message);
        if !report.phases_created.is_empty() {
            let rows = report
                .phases_created
                .iter()
                .map(|p| vec![p.id.clone(), p.name.clone(), p.status.to_string()])
                .collect();
            print_table(&["ID", "NAME", "STATUS"], rows);
        }
        print_list("Skipped (already planned)", &report.phases_skipped);
        print_list("Created", &report.files_created);
        print_list("Updated", &report.files_updated);
        print_list("Errors", &report.errors);
    }

    // Re-planning existing phases is not a failure on the command line.
    let ok = report.success || (report.errors.is_empty() && !report.phases_skipped.is_empty());
    finish(ok, &report.message)
}

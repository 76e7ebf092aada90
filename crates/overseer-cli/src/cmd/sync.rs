use super::{finish, open_store};
use crate::output::{print_json, print_list, print_table};
use anyhow::Context;
use overseer_core::config::Config;
use overseer_core::orchestrator::{self, ChangeKind};

pub fn run(config: &Config, project: &str, dry_run: bool, json: bool) -> anyhow::Result<()> {
    let store = open_store(config, project)?;
    let report = orchestrator::sync(&store, dry_run)
        .with_context(|| format!("failed to sync documents of '{project}'"))?;

    if json {
        print_json(&report)?;
        return finish(report.success, &report.message);
    }

    println!("{}", report.message);
    if !report.changes.is_empty() {
        let rows = report
            .changes
            .iter()
            .map(|c| {
                let kind = match c.change_type {
                    ChangeKind::Created => "create",
                    ChangeKind::Updated => "update",
                };
                vec![c.file.clone(), kind.to_string(), c.description.clone()]
            })
            .collect();
        print_table(&["FILE", "CHANGE", "DETAIL"], rows);
    }
    print_list("Created", &report.files_created);
    print_list("Updated", &report.files_updated);
    finish(report.success, &report.message)
}

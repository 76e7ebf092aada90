use crate::output::{print_json, print_table};
use overseer_core::config::Config;

pub fn run(config: &Config, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(&config.phase_templates);
    }

    if config.phase_templates.is_empty() {
        println!("No phase templates configured.");
        return Ok(());
    }

    let rows = config
        .phase_templates
        .iter()
        .map(|(key, t)| {
            vec![
                key.clone(),
                t.description.clone(),
                t.artifacts.len().to_string(),
                t.steps.len().to_string(),
            ]
        })
        .collect();
    print_table(&["TEMPLATE", "DESCRIPTION", "DELIVERABLES", "CRITERIA"], rows);
    Ok(())
}

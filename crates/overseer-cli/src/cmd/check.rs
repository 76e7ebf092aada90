use super::{finish, open_store};
use crate::output::{print_json, print_table};
use anyhow::Context;
use overseer_core::config::Config;
use overseer_core::orchestrator;

pub fn run(
    config: &Config,
    project: &str,
    phase: Option<&str>,
    strict: bool,
    json: bool,
) -> anyhow::Result<()> {
    let store = open_store(config, project)?;
    let report = orchestrator::check_compliance(&store, phase)
        .with_context(|| format!("failed to check '{project}'"))?;

    if json {
        print_json(&report)?;
    } else {
        println!("{}", report.message);
        let rows = report
            .checks
            .iter()
            .map(|c| {
                let mark = if c.passed { "ok" } else { "FAIL" };
                vec![mark.to_string(), c.message.clone()]
            })
            .collect();
        print_table(&["RESULT", "CHECK"], rows);
        let s = &report.summary;
        println!();
        println!("{} checks: {} passed, {} failed", s.total_checks, s.passed, s.failed);
    }

    if strict && report.success && !report.compliant {
        anyhow::bail!("{} compliance check(s) failed", report.summary.failed);
    }
    finish(report.success, &report.message)
}

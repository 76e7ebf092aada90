use super::{finish, open_store};
use crate::output::{print_json, print_list};
use anyhow::Context;
use overseer_core::config::Config;
use overseer_core::orchestrator::{self, TransitionReport};

pub fn step(config: &Config, project: &str, phase: &str, json: bool) -> anyhow::Result<()> {
    let store = open_store(config, project)?;
    let report = orchestrator::step(&store, phase)
        .with_context(|| format!("failed to step phase {phase} of '{project}'"))?;
    show(&report, json)
}

pub fn block(
    config: &Config,
    project: &str,
    phase: &str,
    reason: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let store = open_store(config, project)?;
    let report = orchestrator::block(&store, phase, reason)
        .with_context(|| format!("failed to block phase {phase} of '{project}'"))?;
    show(&report, json)
}

pub fn unblock(config: &Config, project: &str, phase: &str, json: bool) -> anyhow::Result<()> {
    let store = open_store(config, project)?;
    let report = orchestrator::unblock(&store, phase)
        .with_context(|| format!("failed to unblock phase {phase} of '{project}'"))?;
    show(&report, json)
}

fn show(report: &TransitionReport, json: bool) -> anyhow::Result<()> {
    if json {
        print_json(report)?;
    } else {
        println!("{}", report.message);
        print_list("Changed", &report.changed_files);
    }
    finish(report.success, &report.message)
}

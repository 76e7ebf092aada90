pub mod advance;
pub mod check;
pub mod config;
pub mod mcp;
pub mod plan;
pub mod run;
pub mod status;
pub mod sync;
pub mod templates;
pub mod transition;
pub mod update;

use anyhow::Context;
use overseer_core::config::Config;
use overseer_core::store::PhaseStore;

pub(crate) fn open_store(config: &Config, project: &str) -> anyhow::Result<PhaseStore> {
    PhaseStore::open(config, project).with_context(|| format!("cannot open project '{project}'"))
}

/// Turn an unsuccessful report into a non-zero exit after it was printed.
pub(crate) fn finish(success: bool, message: &str) -> anyhow::Result<()> {
    if success {
        Ok(())
    } else {
        anyhow::bail!("{message}")
    }
}

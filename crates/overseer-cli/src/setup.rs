use anyhow::Context;
use overseer_core::config::Config;
use std::path::{Path, PathBuf};

/// Resolve the effective configuration.
///
/// Priority:
/// 1. `--config` flag / `OVERSEER_CONFIG` env var (passed in as `explicit`)
/// 2. `overseer.yaml` in the working directory
/// 3. Built-in defaults
///
/// `--base-dir` / `OVERSEER_BASE_PATH` then overrides the base directory.
pub fn load_config(explicit: Option<&Path>, base_dir: Option<&Path>) -> anyhow::Result<Config> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    load_config_in(&cwd, explicit, base_dir)
}

fn load_config_in(
    dir: &Path,
    explicit: Option<&Path>,
    base_dir: Option<&Path>,
) -> anyhow::Result<Config> {
    let mut config = Config::discover(explicit, dir).context("failed to load config")?;
    if let Some(base) = base_dir {
        config.base_dir = base.to_string_lossy().into_owned();
    }
    tracing::debug!(base_dir = %config.base_dir, "resolved config");
    Ok(config)
}

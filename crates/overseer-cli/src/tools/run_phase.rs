use super::{open_store, project_property, required_str, to_value, OverseerTool};
use overseer_core::config::Config;
use overseer_core::orchestrator;
use overseer_core::types::Aggression;
use serde_json::Value;

pub struct RunPhaseTool;

impl OverseerTool for RunPhaseTool {
    fn name(&self) -> &str {
        "overseer_run_phase"
    }

    fn description(&self) -> &str {
        "Check a phase's deliverables and done criteria against the project, sync the checklist, and start the phase"
    }

    fn schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "project": project_property(),
                "phase_id": {
                    "type": "string",
                    "description": "Phase id (e.g. 01)"
                },
                "aggression_level": {
                    "type": "string",
                    "enum": ["conservative", "normal", "bossmode"],
                    "description": "How much may be created: nothing, placeholder files, or placeholder files and directories"
                }
            },
            "required": ["project", "phase_id"]
        })
    }

    fn call(&self, args: Value, config: &Config) -> Result<Value, String> {
        let phase_id = required_str(&args, "phase_id")?;
        let aggression = match args["aggression_level"].as_str() {
            Some(level) => level.parse::<Aggression>()?,
            None => Aggression::default(),
        };
        let store = open_store(&args, config)?;
        let report =
            orchestrator::execute(&store, phase_id, aggression).map_err(|e| e.to_string())?;
        to_value(&report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::fixtures;
    use overseer_core::store::PhaseStore;
    use tempfile::TempDir;

    #[test]
    fn runs_planned_phase() {
        let dir = TempDir::new().unwrap();
        let config = fixtures::config(&dir);
        let store = PhaseStore::open(&config, "demo").unwrap();
        orchestrator::plan(&store, &config, &["foundation".to_string()]).unwrap();

        let result = RunPhaseTool
            .call(
                serde_json::json!({"project": "demo", "phase_id": "1", "aggression_level": "conservative"}),
                &config,
            )
            .unwrap();
        assert_eq!(result["success"], true);
        assert_eq!(result["status"], "in_progress");
        assert_eq!(result["phase"]["status"], "in_progress");
        assert!(!dir.path().join("demo/README.md").exists());
    }

    #[test]
    fn bad_aggression_is_an_error() {
        let dir = TempDir::new().unwrap();
        let config = fixtures::config(&dir);
        let err = RunPhaseTool
            .call(
                serde_json::json!({"project": "demo", "phase_id": "01", "aggression_level": "reckless"}),
                &config,
            )
            .unwrap_err();
        assert!(err.contains("reckless"));
    }

    #[test]
    fn unknown_project_is_a_failed_report() {
        let dir = TempDir::new().unwrap();
        let config = fixtures::config(&dir);
        let result = RunPhaseTool
            .call(serde_json::json!({"project": "ghost", "phase_id": "01"}), &config)
            .unwrap();
        assert_eq!(result["success"], false);
    }
}

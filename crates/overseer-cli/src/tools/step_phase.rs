use super::{open_store, project_property, required_str, to_value, OverseerTool};
use overseer_core::config::Config;
use overseer_core::orchestrator;
use serde_json::Value;

pub struct StepPhaseTool;

impl OverseerTool for StepPhaseTool {
    fn name(&self) -> &str {
        "overseer_step_phase"
    }

    fn description(&self) -> &str {
        "Move a phase one step along pending, in_progress, completed without checking its deliverables"
    }

    fn schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "project": project_property(),
                "phase_id": { "type": "string", "description": "Phase id (e.g. 01)" }
            },
            "required": ["project", "phase_id"]
        })
    }

    fn call(&self, args: Value, config: &Config) -> Result<Value, String> {
        let phase_id = required_str(&args, "phase_id")?;
        let store = open_store(&args, config)?;
        let report = orchestrator::step(&store, phase_id).map_err(|e| e.to_string())?;
        to_value(&report)
    }
}

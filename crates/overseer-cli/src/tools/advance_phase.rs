use super::{open_store, project_property, required_str, to_value, OverseerTool};
use overseer_core::config::Config;
use overseer_core::orchestrator;
use serde_json::Value;

pub struct AdvancePhaseTool;

impl OverseerTool for AdvancePhaseTool {
    fn name(&self) -> &str {
        "overseer_advance_phase"
    }

    fn description(&self) -> &str {
        "Complete the current phase if every deliverable and done criterion is verified, and start the next one"
    }

    fn schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "project": project_property(),
                "expected_current_phase": {
                    "type": "string",
                    "description": "Id of the phase the caller believes is current"
                }
            },
            "required": ["project", "expected_current_phase"]
        })
    }

    fn call(&self, args: Value, config: &Config) -> Result<Value, String> {
        let expected = required_str(&args, "expected_current_phase")
            .or_else(|_| required_str(&args, "phase_id"))?;
        let store = open_store(&args, config)?;
        let report = orchestrator::advance(&store, expected).map_err(|e| e.to_string())?;
        to_value(&report)
    }
}

use super::{open_store, project_property, to_value, OverseerTool};
use overseer_core::config::Config;
use overseer_core::orchestrator;
use serde_json::Value;

pub struct CheckComplianceTool;

impl OverseerTool for CheckComplianceTool {
    fn name(&self) -> &str {
        "overseer_check_compliance"
    }

    fn description(&self) -> &str {
        "Check that the phase index exists and every phase document has its required sections"
    }

    fn schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "project": project_property(),
                "phase_id": {
                    "type": "string",
                    "description": "Only check this phase"
                }
            },
            "required": ["project"]
        })
    }

    fn call(&self, args: Value, config: &Config) -> Result<Value, String> {
        let phase_id = args["phase_id"].as_str().map(str::trim).filter(|s| !s.is_empty());
        let store = open_store(&args, config)?;
        let report =
            orchestrator::check_compliance(&store, phase_id).map_err(|e| e.to_string())?;
        to_value(&report)
    }
}

use super::{open_store, project_property, to_value, OverseerTool};
use overseer_core::config::Config;
use overseer_core::orchestrator;
use serde_json::Value;

pub struct StatusTool;

impl OverseerTool for StatusTool {
    fn name(&self) -> &str {
        "overseer_status"
    }

    fn description(&self) -> &str {
        "Report every phase of a project with its status, the current phase, and per-status counts"
    }

    fn schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "project": project_property()
            },
            "required": ["project"]
        })
    }

    fn call(&self, args: Value, config: &Config) -> Result<Value, String> {
        let store = open_store(&args, config)?;
        let report = orchestrator::status(&store).map_err(|e| e.to_string())?;
        to_value(&report)
    }
}

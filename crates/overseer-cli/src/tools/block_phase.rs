use super::{open_store, project_property, required_str, to_value, OverseerTool};
use overseer_core::config::Config;
use overseer_core::orchestrator;
use serde_json::Value;

pub struct BlockPhaseTool;

impl OverseerTool for BlockPhaseTool {
    fn name(&self) -> &str {
        "overseer_block_phase"
    }

    fn description(&self) -> &str {
        "Block a phase with an optional reason, or unblock it when unblock is true"
    }

    fn schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "project": project_property(),
                "phase_id": { "type": "string", "description": "Phase id (e.g. 01)" },
                "reason": { "type": "string", "description": "Why the phase is blocked" },
                "unblock": { "type": "boolean", "description": "Release the block instead of setting it" }
            },
            "required": ["project", "phase_id"]
        })
    }

    fn call(&self, args: Value, config: &Config) -> Result<Value, String> {
        let phase_id = required_str(&args, "phase_id")?;
        let store = open_store(&args, config)?;
        let report = if args["unblock"].as_bool().unwrap_or(false) {
            orchestrator::unblock(&store, phase_id)
        } else {
            orchestrator::block(&store, phase_id, args["reason"].as_str())
        }
        .map_err(|e| e.to_string())?;
        to_value(&report)
    }
}

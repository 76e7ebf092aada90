use super::{open_store, project_property, to_value, OverseerTool};
use overseer_core::config::Config;
use overseer_core::orchestrator::{self, Modification};
use serde_json::Value;

pub struct UpdatePhasesTool;

impl OverseerTool for UpdatePhasesTool {
    fn name(&self) -> &str {
        "overseer_update_phases"
    }

    fn description(&self) -> &str {
        "Add, update, or remove phases in a project's PHASES.md"
    }

    fn schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "project": project_property(),
                "modifications": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "operation": { "type": "string", "enum": ["add", "update", "remove"] },
                            "phase_id": { "type": "string" },
                            "phase": {
                                "type": "object",
                                "properties": {
                                    "id": { "type": "string" },
                                    "name": { "type": "string" },
                                    "description": { "type": "string" },
                                    "deliverables": { "type": "array", "items": { "type": "string" } },
                                    "done_criteria": { "type": "array", "items": { "type": "string" } }
                                }
                            }
                        },
                        "required": ["operation"]
                    }
                }
            },
            "required": ["project", "modifications"]
        })
    }

    fn call(&self, args: Value, config: &Config) -> Result<Value, String> {
        let raw = args
            .get("modifications")
            .cloned()
            .ok_or_else(|| "missing required argument: modifications".to_string())?;
        let modifications: Vec<Modification> =
            serde_json::from_value(raw).map_err(|e| format!("invalid modifications: {e}"))?;
        let store = open_store(&args, config)?;
        let report = orchestrator::update(&store, &modifications).map_err(|e| e.to_string())?;
        to_value(&report)
    }
}

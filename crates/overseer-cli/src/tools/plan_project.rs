use super::{open_store, project_property, to_value, OverseerTool};
use overseer_core::config::Config;
use overseer_core::orchestrator;
use serde_json::Value;

pub struct PlanProjectTool;

impl OverseerTool for PlanProjectTool {
    fn name(&self) -> &str {
        "overseer_plan_project"
    }

    fn description(&self) -> &str {
        "Create PHASES.md and one PHASE-<id>.md per phase template for a project"
    }

    fn schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "project": project_property(),
                "phases": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Template names in phase order (e.g. foundation, implementation)"
                }
            },
            "required": ["project", "phases"]
        })
    }

    fn call(&self, args: Value, config: &Config) -> Result<Value, String> {
        let phases: Vec<String> = args["phases"]
            .as_array()
            .ok_or_else(|| "missing required argument: phases".to_string())?
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect();
        let store = open_store(&args, config)?;
        let report = orchestrator::plan(&store, config, &phases).map_err(|e| e.to_string())?;
        to_value(&report)
    }
}

use super::{open_store, project_property, to_value, OverseerTool};
use overseer_core::config::Config;
use overseer_core::orchestrator;
use serde_json::Value;

pub struct SyncDocsTool;

impl OverseerTool for SyncDocsTool {
    fn name(&self) -> &str {
        "overseer_sync_docs"
    }

    fn description(&self) -> &str {
        "Regenerate missing phase documents and restore missing sections and headings from the index"
    }

    fn schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "project": project_property(),
                "dry_run": {
                    "type": "boolean",
                    "description": "Report what would change without writing"
                }
            },
            "required": ["project"]
        })
    }

    fn call(&self, args: Value, config: &Config) -> Result<Value, String> {
        // `options.dry_run` is the older spelling.
        let dry_run = args["dry_run"]
            .as_bool()
            .or_else(|| args["options"]["dry_run"].as_bool())
            .unwrap_or(false);
        let store = open_store(&args, config)?;
        let report = orchestrator::sync(&store, dry_run).map_err(|e| e.to_string())?;
        to_value(&report)
    }
}

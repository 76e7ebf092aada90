use overseer_core::config::Config;
use overseer_core::store::PhaseStore;
use serde::Serialize;
use serde_json::Value;

pub mod advance_phase;
pub mod block_phase;
pub mod check_compliance;
pub mod plan_project;
pub mod run_phase;
pub mod status;
pub mod step_phase;
pub mod sync_docs;
pub mod update_phases;

pub trait OverseerTool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn schema(&self) -> Value;
    fn call(&self, args: Value, config: &Config) -> Result<Value, String>;
}

pub fn all_tools() -> Vec<Box<dyn OverseerTool>> {
    vec![
        Box::new(plan_project::PlanProjectTool),
        Box::new(run_phase::RunPhaseTool),
        Box::new(advance_phase::AdvancePhaseTool),
        Box::new(status::StatusTool),
        Box::new(update_phases::UpdatePhasesTool),
        Box::new(step_phase::StepPhaseTool),
        Box::new(block_phase::BlockPhaseTool),
        Box::new(sync_docs::SyncDocsTool),
        Box::new(check_compliance::CheckComplianceTool),
    ]
}

// ---------------------------------------------------------------------------
// Argument helpers
// ---------------------------------------------------------------------------

/// Schema fragment shared by every tool: the project to act on.
pub(crate) fn project_property() -> Value {
    serde_json::json!({
        "type": "string",
        "description": "Project name under the base directory, or an absolute path"
    })
}

pub(crate) fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, String> {
    args[key]
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("missing required argument: {key}"))
}

/// Open the store named by `project`, or by the older `repo_root` spelling.
pub(crate) fn open_store(args: &Value, config: &Config) -> Result<PhaseStore, String> {
    let project = required_str(args, "project")
        .or_else(|_| required_str(args, "repo_root"))
        .map_err(|_| "missing required argument: project".to_string())?;
    PhaseStore::open(config, project).map_err(|e| e.to_string())
}

pub(crate) fn to_value<T: Serialize>(report: &T) -> Result<Value, String> {
    serde_json::to_value(report).map_err(|e| e.to_string())
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn tool_names_are_unique() {
        let tools = all_tools();
        let mut names: Vec<&str> = tools.iter().map(|t| t.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), tools.len());
    }

    #[test]
    fn schemas_require_project() {
        for tool in all_tools() {
            let schema = tool.schema();
            let required = schema["required"].as_array().unwrap();
            assert!(
                required.iter().any(|r| r == "project"),
                "{} does not require project",
                tool.name()
            );
        }
    }

    #[test]
    fn repo_root_is_accepted() {
        let dir = TempDir::new().unwrap();
        let config = fixtures::config(&dir);
        let store = open_store(&serde_json::json!({"repo_root": "demo"}), &config).unwrap();
        assert_eq!(store.root(), dir.path().join("demo"));
        assert!(open_store(&serde_json::json!({}), &config).is_err());
        assert!(open_store(&serde_json::json!({"project": ""}), &config).is_err());
    }
}

use super::PhaseSummary;
use crate::config::Config;
use crate::error::{OverseerError, Result};
use crate::index::{PhaseRecord, ProjectPhases};
use crate::phase_doc::PhaseDocument;
use crate::store::PhaseStore;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanReport {
    pub success: bool,
    pub message: String,
    pub project_root: String,
    pub phases_created: Vec<PhaseSummary>,
    /// Requested names that already exist in the index.
    pub phases_skipped: Vec<String>,
    pub errors: Vec<String>,
    pub files_created: Vec<String>,
    pub files_updated: Vec<String>,
}

/// Create the index (if needed) and one pending phase per new template name.
pub fn plan(store: &PhaseStore, config: &Config, names: &[String]) -> Result<PlanReport> {
    let mut report = PlanReport {
        success: false,
        message: String::new(),
        project_root: store.root().display().to_string(),
        phases_created: Vec::new(),
        phases_skipped: Vec::new(),
        errors: Vec::new(),
        files_created: Vec::new(),
        files_updated: Vec::new(),
    };

    let names: Vec<&str> = names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()).collect();
    if names.is_empty() {
        report.message = "No phases requested".to_string();
        return Ok(report);
    }

    store.ensure_project_dir()?;
    let existing = store.read_index()?;
    let index_existed = existing.is_some();
    let mut phases = existing.unwrap_or_else(|| ProjectPhases::new(store.project_name()));
    let project_name = phases.project_name.clone();

    for name in names {
        if phases.find_by_name(name).is_some() {
            tracing::debug!(phase = name, "phase already planned");
            report.phases_skipped.push(name.to_string());
            continue;
        }
        let Some(template) = config.template(name) else {
            let err = OverseerError::UnknownTemplate {
                name: name.to_string(),
                available: config.template_names().join(", "),
            };
            report.errors.push(err.to_string());
            continue;
        };

        let mut record = PhaseRecord::new(phases.next_id(), name);
        record.description = Some(template.description.clone()).filter(|d| !d.trim().is_empty());
        record.deliverables = template.artifacts.clone();
        record.done_criteria = template.steps.clone();

        let doc = PhaseDocument::render_new(&project_name, &record);
        if let Some(path) = store.create_phase_document(&record, &doc)? {
            report.files_created.push(store.relative(&path));
        }
        tracing::info!(phase = %record.id, name = %record.name, "planned phase");
        report.phases_created.push(PhaseSummary::from(&record));
        phases.phases.push(record);
    }

    if !report.phases_created.is_empty() {
        store.write_index(&mut phases)?;
        let index = store.relative(&store.index_path());
        if index_existed {
            report.files_updated.push(index);
        } else {
            report.files_created.insert(0, index);
        }
    }

    report.success = report.errors.is_empty() && !report.phases_created.is_empty();
    report.message = match (report.phases_created.len(), report.errors.len()) {
        (0, 0) => format!("All requested phases already exist for {project_name}"),
        (0, _) => format!("No phases created for {project_name}"),
        (n, 0) => format!("Planned {n} phase(s) for {project_name}"),
        (n, e) => format!("Planned {n} phase(s) for {project_name} with {e} error(s)"),
    };
    Ok(report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

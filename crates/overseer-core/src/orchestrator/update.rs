use super::project_missing;
use crate::error::Result;
use crate::index::{PhaseRecord, ProjectPhases};
use crate::paths;
use crate::phase_doc::PhaseDocument;
use crate::store::PhaseStore;
use crate::types::ItemKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Add,
    Update,
    Remove,
}

/// Fields of a phase to add or change. For `update`, absent fields keep
/// their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseChange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deliverables: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done_criteria: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modification {
    pub operation: Operation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<PhaseChange>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Changes {
    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub removed: Vec<String>,
}

impl Changes {
    fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateReport {
    pub success: bool,
    pub message: String,
    pub changes_applied: Changes,
    pub files_written: Vec<String>,
    pub errors: Vec<String>,
}

/// Apply a batch of add/update/remove modifications to the index. Invalid
/// modifications are collected as errors; the rest still apply.
pub fn update(store: &PhaseStore, modifications: &[Modification]) -> Result<UpdateReport> {
    let mut report = UpdateReport {
        success: false,
        message: String::new(),
        changes_applied: Changes::default(),
        files_written: Vec::new(),
        errors: Vec::new(),
    };
    let Some(mut phases) = store.read_index()? else {
        report.message = project_missing(store);
        return Ok(report);
    };

    for (n, modification) in modifications.iter().enumerate() {
        let applied = match modification.operation {
            Operation::Add => add(store, &mut phases, modification, &mut report),
            Operation::Update => change(store, &mut phases, modification, &mut report),
            Operation::Remove => remove(&mut phases, modification, &mut report),
        };
        if let Err(reason) = applied? {
            report
                .errors
                .push(format!("modification {}: {reason}", n + 1));
        }
    }

    if !report.changes_applied.is_empty() {
        store.write_index(&mut phases)?;
        report
            .files_written
            .push(store.relative(&store.index_path()));
    }

    let c = &report.changes_applied;
    report.message = format!(
        "{} added, {} updated, {} removed",
        c.added.len(),
        c.updated.len(),
        c.removed.len()
    );
    if !report.errors.is_empty() {
        report.message.push_str(&format!(", {} error(s)", report.errors.len()));
    }
    report.success = report.errors.is_empty();
    Ok(report)
}

/// Outer `Err` aborts the batch (I/O); inner `Err` rejects one modification.
type Applied = Result<std::result::Result<(), String>>;

fn required<'a>(value: &'a Option<String>, what: &str) -> std::result::Result<&'a str, String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| format!("{what} is required"))
}

fn add(
    store: &PhaseStore,
    phases: &mut ProjectPhases,
    modification: &Modification,
    report: &mut UpdateReport,
) -> Applied {
    let Some(phase) = &modification.phase else {
        return Ok(Err("add requires phase".to_string()));
    };
    let fields = required(&phase.id, "phase.id").and_then(|id| {
        let name = required(&phase.name, "phase.name")?;
        let description = required(&phase.description, "phase.description")?;
        Ok((id, name, description))
    });
    let (id, name, description) = match fields {
        Ok(f) => f,
        Err(reason) => return Ok(Err(reason)),
    };
    if !id.chars().all(|c| c.is_ascii_digit()) {
        return Ok(Err(format!("phase.id must be a number, got '{id}'")));
    }
    if phases.find(id).is_some() {
        return Ok(Err(format!("phase {} already exists", paths::pad_id(id))));
    }

    let mut record = PhaseRecord::new(id, name);
    record.description = Some(description.to_string());
    record.deliverables = phase.deliverables.clone().unwrap_or_default();
    record.done_criteria = phase.done_criteria.clone().unwrap_or_default();

    let doc = PhaseDocument::render_new(&phases.project_name, &record);
    if let Some(path) = store.create_phase_document(&record, &doc)? {
        report.files_written.push(store.relative(&path));
    }
    tracing::info!(phase = %record.id, name = %record.name, "added phase");
    report.changes_applied.added.push(record.id.clone());
    phases.phases.push(record);
    Ok(Ok(()))
}

fn change(
    store: &PhaseStore,
    phases: &mut ProjectPhases,
    modification: &Modification,
    report: &mut UpdateReport,
) -> Applied {
    let id = match required(&modification.phase_id, "phase_id") {
        Ok(id) => id,
        Err(reason) => return Ok(Err(reason)),
    };
    let Some(phase) = &modification.phase else {
        return Ok(Err("update requires phase".to_string()));
    };
    let Some(record) = phases.find_mut(id) else {
        return Ok(Err(format!("phase {} not found", paths::pad_id(id))));
    };
    let before = record.clone();

    if let Some(name) = phase.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        record.name = name.to_string();
    }
    if let Some(description) = &phase.description {
        record.description = Some(description.clone()).filter(|d| !d.trim().is_empty());
    }
    if let Some(items) = &phase.deliverables {
        record.deliverables = items.clone();
    }
    if let Some(items) = &phase.done_criteria {
        record.done_criteria = items.clone();
    }

    // A rename can move the document when the file pattern uses {name}.
    if let Some(mut doc) = store.read_phase_document(&before)? {
        doc.title = format!("Phase {}: {}", record.id, record.name);
        if phase.description.is_some() {
            let text = record.description.as_deref().unwrap_or("*No description provided.*");
            doc.set_description(text);
        }
        if phase.deliverables.is_some() {
            doc.sync_items(ItemKind::Deliverable, &record.deliverables);
        }
        if phase.done_criteria.is_some() {
            doc.sync_items(ItemKind::DoneCriterion, &record.done_criteria);
        }
        let path = store.write_phase_document(record, &doc)?;
        report.files_written.push(store.relative(&path));
        if store.phase_doc_path(&before) != path {
            store.remove_phase_document(&before)?;
        }
    }

    tracing::info!(phase = %record.id, "updated phase");
    report.changes_applied.updated.push(record.id.clone());
    Ok(Ok(()))
}

fn remove(
    phases: &mut ProjectPhases,
    modification: &Modification,
    report: &mut UpdateReport,
) -> Applied {
    let id = match required(&modification.phase_id, "phase_id") {
        Ok(id) => id,
        Err(reason) => return Ok(Err(reason)),
    };
    let Some(pos) = phases.position(id) else {
        return Ok(Err(format!("phase {} not found", paths::pad_id(id))));
    };
    let record = phases.phases.remove(pos);
    tracing::info!(phase = %record.id, "removed phase");
    report.changes_applied.removed.push(record.id);
    Ok(Ok(()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

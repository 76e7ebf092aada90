use super::{phase_missing, project_missing, PhaseSummary};
use crate::checklist::{self, Finding};
use crate::error::Result;
use crate::phase_doc::PROGRESS_STARTED;
use crate::store::PhaseStore;
use crate::types::{Aggression, ItemKind, PhaseStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecuteStatus {
    PotentiallyComplete,
    InProgress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedItem {
    pub item: String,
    pub kind: ItemKind,
    pub evidence: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingItem {
    pub item: String,
    pub kind: ItemKind,
    pub action_taken: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteReport {
    pub success: bool,
    pub message: String,
    pub phase_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<PhaseSummary>,
    pub aggression: Aggression,
    pub completed_items: Vec<CompletedItem>,
    pub pending_items: Vec<PendingItem>,
    pub changed_files: Vec<String>,
    pub status: ExecuteStatus,
}

impl ExecuteReport {
    fn failed(phase_id: &str, aggression: Aggression, message: String) -> Self {
        Self {
            success: false,
            message,
            phase_id: phase_id.to_string(),
            phase: None,
            aggression,
            completed_items: Vec::new(),
            pending_items: Vec::new(),
            changed_files: Vec::new(),
            status: ExecuteStatus::InProgress,
        }
    }
}

/// Verify a phase's checklist against the project root, sync the checked
/// marks to what was found, and move a pending phase to in progress.
pub fn execute(
    store: &PhaseStore,
    phase_id: &str,
    aggression: Aggression,
) -> Result<ExecuteReport> {
    let Some(mut phases) = store.read_index()? else {
        return Ok(ExecuteReport::failed(phase_id, aggression, project_missing(store)));
    };
    let Some(pos) = phases.position(phase_id) else {
        return Ok(ExecuteReport::failed(phase_id, aggression, phase_missing(phase_id)));
    };
    let record = &phases.phases[pos];
    let id = record.id.clone();
    let mut report = ExecuteReport::failed(&id, aggression, String::new());
    report.phase = Some(PhaseSummary::from(record));

    if record.status == PhaseStatus::Blocked || record.status.is_terminal() {
        report.message = format!("Phase {id} is {} and cannot run", record.status);
        return Ok(report);
    }
    let doc_path = store.phase_doc_path(record);
    let Some(mut doc) = store.read_phase_document(record)? else {
        report.message = format!("Phase file {} not found", store.relative(&doc_path));
        return Ok(report);
    };

    let root = store.root();
    let mut changed = Vec::new();
    for kind in [ItemKind::Deliverable, ItemKind::DoneCriterion] {
        for item in doc.items(kind).to_vec() {
            let finding = checklist::verify(root, &item.text);
            let complete = finding.resolve(item.checked);
            doc.set_checked(kind, &item.text, complete);

            if complete {
                let evidence = match &finding {
                    Finding::Verified { evidence } => evidence.clone(),
                    _ => "checked off in phase document".to_string(),
                };
                report.completed_items.push(CompletedItem {
                    item: item.text,
                    kind,
                    evidence,
                });
                continue;
            }

            let action_taken = match &finding {
                Finding::MissingFiles { files } => {
                    let mut actions = Vec::new();
                    for file in files {
                        if !aggression.writes_placeholders() {
                            actions.push(format!("{file} not found; needs to be created"));
                        } else if let Some(path) =
                            checklist::write_placeholder(root, file, &item.text)?
                        {
                            actions.push(format!("created placeholder {file}"));
                            changed.push(store.relative(&path));
                        } else {
                            actions.push(format!("{file} not found and its path is taken"));
                        }
                    }
                    actions.join("; ")
                }
                Finding::MissingDirectory { dir } => {
                    if !aggression.creates_directories() {
                        format!("directory {dir}/ not found; needs to be created")
                    } else {
                        match checklist::create_directory(root, dir)? {
                            Some(path) => {
                                changed.push(format!("{}/", store.relative(&path)));
                                format!("created directory {dir}/")
                            }
                            None => format!("directory {dir}/ not found"),
                        }
                    }
                }
                Finding::Unverifiable | Finding::Verified { .. } => {
                    "needs manual verification".to_string()
                }
            };
            report.pending_items.push(PendingItem {
                item: item.text,
                kind,
                action_taken,
            });
        }
    }

    let record = &mut phases.phases[pos];
    let started = record.status == PhaseStatus::Pending;
    if started {
        record.start()?;
    }
    let record = &phases.phases[pos];
    doc.set_status(record.status);
    doc.mark_progress(PROGRESS_STARTED);
    let written = store.write_phase_document(record, &doc)?;
    report.phase = Some(PhaseSummary::from(record));
    changed.push(store.relative(&written));

    if started {
        store.write_index(&mut phases)?;
        changed.push(store.relative(&store.index_path()));
    }

    report.changed_files = changed;
    report.status = if report.pending_items.is_empty() {
        ExecuteStatus::PotentiallyComplete
    } else {
        ExecuteStatus::InProgress
    };
    report.success = true;
    report.message = format!(
        "Phase {id} executed: {} item(s) complete, {} pending",
        report.completed_items.len(),
        report.pending_items.len()
    );
    Ok(report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

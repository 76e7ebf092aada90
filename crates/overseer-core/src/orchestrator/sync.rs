use super::compliance::missing_sections;
use super::project_missing;
use crate::error::Result;
use crate::grammar;
use crate::index::{self, PhaseRecord};
use crate::io;
use crate::phase_doc::{PhaseDocument, DESCRIPTION, NO_DESCRIPTION, PROGRESS};
use crate::store::PhaseStore;
use crate::types::ItemKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Created,
    Updated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocChange {
    pub file: String,
    pub change_type: ChangeKind,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    pub success: bool,
    pub message: String,
    pub dry_run: bool,
    /// Files actually written; empty on a dry run.
    pub files_created: Vec<String>,
    pub files_updated: Vec<String>,
    /// Every change found, applied or not.
    pub changes: Vec<DocChange>,
}

/// Bring the index and phase documents back to the standard layout.
///
/// Missing phase documents are regenerated from the index. Existing ones
/// get any missing required section and a `Phase NN: name` title. Section
/// content already present is never touched. With `dry_run` nothing is
/// written.
pub fn sync(store: &PhaseStore, dry_run: bool) -> Result<SyncReport> {
    let mut report = SyncReport {
        success: false,
        message: String::new(),
        dry_run,
        files_created: Vec::new(),
        files_updated: Vec::new(),
        changes: Vec::new(),
    };

    let Some(mut phases) = store.read_index()? else {
        report.message = project_missing(store);
        return Ok(report);
    };

    let index_path = store.index_path();
    let index_text = io::read_optional(&index_path)?.unwrap_or_default();
    let gaps = index::missing_layout(&index_text);
    if !gaps.is_empty() {
        let file = store.relative(&index_path);
        if !dry_run {
            store.write_index(&mut phases)?;
            report.files_updated.push(file.clone());
        }
        report.changes.push(DocChange {
            file,
            change_type: ChangeKind::Updated,
            description: format!("Restored {}", gaps.join(" and ")),
        });
    }

    for record in &phases.phases {
        let file = store.relative(&store.phase_doc_path(record));
        let Some(mut doc) = store.read_phase_document(record)? else {
            if !dry_run {
                let doc = PhaseDocument::render_new(&phases.project_name, record);
                if let Some(path) = store.create_phase_document(record, &doc)? {
                    report.files_created.push(store.relative(&path));
                }
            }
            report.changes.push(DocChange {
                file,
                change_type: ChangeKind::Created,
                description: "Phase document was missing".to_string(),
            });
            continue;
        };

        let fixes = repair(&mut doc, record);
        if fixes.is_empty() {
            continue;
        }
        if !dry_run {
            store.write_phase_document(record, &doc)?;
            report.files_updated.push(file.clone());
        }
        tracing::info!(
            phase = %record.id,
            fixes = fixes.len(),
            dry_run,
            "phase document out of sync"
        );
        report.changes.push(DocChange {
            file,
            change_type: ChangeKind::Updated,
            description: fixes.join("; "),
        });
    }

    report.success = true;
    let project = &phases.project_name;
    report.message = match (report.changes.len(), dry_run) {
        (0, _) => format!("Documents for {project} are in sync"),
        (n, true) => format!("{n} change(s) needed for {project}"),
        (n, false) => format!("Applied {n} change(s) for {project}"),
    };
    Ok(report)
}

/// Add missing required sections and fix the title. Returns one line per fix.
fn repair(doc: &mut PhaseDocument, record: &PhaseRecord) -> Vec<String> {
    let mut fixes = Vec::new();
    for heading in missing_sections(record, doc) {
        if heading == DESCRIPTION {
            let text = record
                .description
                .as_deref()
                .filter(|d| !d.trim().is_empty())
                .unwrap_or(NO_DESCRIPTION);
            doc.set_description(text);
        } else if heading == PROGRESS {
            doc.ensure_progress();
        } else if heading == ItemKind::Deliverable.heading() {
            doc.sync_items(ItemKind::Deliverable, &record.deliverables);
        } else {
            doc.sync_items(ItemKind::DoneCriterion, &record.done_criteria);
        }
        fixes.push(format!("Added {heading} section"));
    }

    if !grammar::is_phase_title(&doc.title) {
        doc.title = format!("Phase {}: {}", record.id, record.name);
        fixes.push("Fixed phase heading".to_string());
    }
    fixes
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

use super::{mirror_status, phase_missing, project_missing, PhaseSummary};
use crate::error::{OverseerError, Result};
use crate::index::PhaseRecord;
use crate::phase_doc::{PhaseDocument, PROGRESS_COMPLETED, PROGRESS_STARTED};
use crate::store::PhaseStore;
use crate::types::PhaseStatus;
use serde::{Deserialize, Serialize};

const BLOCKED_FIELD: &str = "Blocked";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionReport {
    pub success: bool,
    pub message: String,
    pub phase: Option<PhaseSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_status: Option<PhaseStatus>,
    pub changed_files: Vec<String>,
}

impl TransitionReport {
    fn failed(message: String, phase: Option<PhaseSummary>) -> Self {
        Self {
            success: false,
            message,
            phase,
            previous_status: None,
            changed_files: Vec::new(),
        }
    }
}

/// Apply `apply` to one phase, persist the index, and mirror the new
/// status into the phase document. Illegal transitions are reported, not
/// raised.
fn transition(
    store: &PhaseStore,
    phase_id: &str,
    apply: impl FnOnce(&mut PhaseRecord) -> Result<()>,
    edit_doc: impl FnOnce(&PhaseRecord, &mut PhaseDocument),
) -> Result<TransitionReport> {
    let Some(mut phases) = store.read_index()? else {
        return Ok(TransitionReport::failed(project_missing(store), None));
    };
    let Some(record) = phases.find_mut(phase_id) else {
        return Ok(TransitionReport::failed(phase_missing(phase_id), None));
    };

    let previous = record.status;
    match apply(record) {
        Ok(()) => {}
        Err(e @ OverseerError::InvalidTransition { .. }) => {
            return Ok(TransitionReport::failed(
                format!("Phase {} unchanged: {e}", record.id),
                Some(PhaseSummary::from(&*record)),
            ));
        }
        Err(e) => return Err(e),
    }

    let summary = PhaseSummary::from(&*record);
    let mut changed = Vec::new();
    let snapshot = record.clone();
    if let Some(path) = mirror_status(store, &snapshot, |doc| edit_doc(&snapshot, doc))? {
        changed.push(path);
    }
    store.write_index(&mut phases)?;
    changed.push(store.relative(&store.index_path()));

    Ok(TransitionReport {
        success: true,
        message: format!("Phase {} moved from {previous} to {}", summary.id, summary.status),
        phase: Some(summary),
        previous_status: Some(previous),
        changed_files: changed,
    })
}

/// The direct, unvalidated step: `pending → in_progress → completed`.
pub fn step(store: &PhaseStore, phase_id: &str) -> Result<TransitionReport> {
    transition(
        store,
        phase_id,
        |record| record.step().map(|_| ()),
        |record, doc| match record.status {
            PhaseStatus::InProgress => {
                doc.mark_progress(PROGRESS_STARTED);
            }
            PhaseStatus::Completed => {
                doc.mark_progress(PROGRESS_COMPLETED);
            }
            _ => {}
        },
    )
}

/// Block a non-terminal phase, noting the reason in its phase document.
pub fn block(store: &PhaseStore, phase_id: &str, reason: Option<&str>) -> Result<TransitionReport> {
    let reason = reason
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or("no reason given");
    transition(
        store,
        phase_id,
        |record| record.block(),
        |_, doc| doc.set_field(BLOCKED_FIELD, reason),
    )
}

/// Release a blocked phase back to where it was.
pub fn unblock(store: &PhaseStore, phase_id: &str) -> Result<TransitionReport> {
    transition(
        store,
        phase_id,
        |record| record.unblock(),
        |_, doc| doc.remove_field(BLOCKED_FIELD),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::fixtures;
    use tempfile::TempDir;

    #[test]
    fn step_walks_to_completed() {
        let dir = TempDir::new().unwrap();
        let (_, store) = fixtures::planned(&dir, &["foundation"]);

        let report = step(&store, "1").unwrap();
        assert!(report.success, "{report:?}");
        assert_eq!(report.previous_status, Some(PhaseStatus::Pending));
        assert_eq!(report.phase.as_ref().unwrap().status, PhaseStatus::InProgress);
        assert_eq!(report.changed_files, vec!["PHASE-01.md", "PHASES.md"]);

        let report = step(&store, "01").unwrap();
        assert_eq!(report.phase.unwrap().status, PhaseStatus::Completed);

        let index = store.read_index().unwrap().unwrap();
        assert_eq!(index.phases[0].status, PhaseStatus::Completed);
        let doc = store.read_phase_document(&index.phases[0]).unwrap().unwrap();
        assert_eq!(doc.status(), Some(PhaseStatus::Completed));
        assert!(doc.progress()[0].checked);
        assert!(doc.progress()[3].checked);
    }

    #[test]
    fn step_on_finished_phase_is_reported() {
        let dir = TempDir::new().unwrap();
        let (_, store) = fixtures::planned(&dir, &["foundation"]);
        step(&store, "01").unwrap();
        step(&store, "01").unwrap();
        let before = fixtures::read(&store, "PHASES.md");

        let report = step(&store, "01").unwrap();
        assert!(!report.success);
        assert!(report.message.contains("already finished"));
        assert_eq!(report.phase.unwrap().status, PhaseStatus::Completed);
        assert_eq!(fixtures::read(&store, "PHASES.md"), before);
    }

    #[test]
    fn block_and_unblock() {
        let dir = TempDir::new().unwrap();
        let (_, store) = fixtures::planned(&dir, &["foundation"]);
        step(&store, "01").unwrap();

        let report = block(&store, "01", Some("waiting on credentials")).unwrap();
        assert!(report.success);
        assert_eq!(report.phase.unwrap().status, PhaseStatus::Blocked);
        let doc = fixtures::read(&store, "PHASE-01.md");
        assert!(doc.contains("**Blocked**: waiting on credentials"));
        assert!(doc.contains("**Status**: blocked"));

        assert!(!step(&store, "01").unwrap().success);

        let report = unblock(&store, "01").unwrap();
        assert_eq!(report.phase.unwrap().status, PhaseStatus::InProgress);
        let doc = fixtures::read(&store, "PHASE-01.md");
        assert!(!doc.contains("**Blocked**"));
    }

    #[test]
    fn block_without_reason() {
        let dir = TempDir::new().unwrap();
        let (_, store) = fixtures::planned(&dir, &["foundation"]);
        block(&store, "01", None).unwrap();
        assert!(fixtures::read(&store, "PHASE-01.md").contains("**Blocked**: no reason given"));
        let report = unblock(&store, "01").unwrap();
        assert_eq!(report.phase.unwrap().status, PhaseStatus::Pending);
    }

    #[test]
    fn unblock_requires_blocked() {
        let dir = TempDir::new().unwrap();
        let (_, store) = fixtures::planned(&dir, &["foundation"]);
        let report = unblock(&store, "01").unwrap();
        assert!(!report.success);
        assert!(report.message.contains("not blocked"));
    }

    #[test]
    fn missing_targets() {
        let dir = TempDir::new().unwrap();
        let (_, store) = fixtures::store(&dir);
        assert!(!step(&store, "01").unwrap().success);
        let (_, store) = fixtures::planned(&dir, &["foundation"]);
        let report = block(&store, "04", None).unwrap();
        assert_eq!(report.message, "Phase 04 not found");
    }

    #[test]
    fn transition_without_document_still_updates_index() {
        let dir = TempDir::new().unwrap();
        let (_, store) = fixtures::planned(&dir, &["foundation"]);
        std::fs::remove_file(store.root().join("PHASE-01.md")).unwrap();
        let report = step(&store, "01").unwrap();
        assert!(report.success);
        assert_eq!(report.changed_files, vec!["PHASES.md"]);
    }
}

use super::{mirror_status, phase_missing, project_missing, PhaseSummary};
use crate::checklist;
use crate::error::Result;
use crate::phase_doc::{self, PROGRESS_STARTED};
use crate::store::PhaseStore;
use crate::types::{ItemKind, PhaseStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvanceStatus {
    Advanced,
    Incomplete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingItem {
    pub kind: ItemKind,
    pub item: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvanceReport {
    pub success: bool,
    pub message: String,
    pub status: AdvanceStatus,
    pub current_phase: Option<PhaseSummary>,
    pub next_phase: Option<PhaseSummary>,
    pub missing_items: Vec<MissingItem>,
    pub changes_applied: Vec<String>,
}

impl AdvanceReport {
    fn incomplete(success: bool, message: String, current: Option<PhaseSummary>) -> Self {
        Self {
            success,
            message,
            status: AdvanceStatus::Incomplete,
            current_phase: current,
            next_phase: None,
            missing_items: Vec::new(),
            changes_applied: Vec::new(),
        }
    }
}

/// Lock `expected_phase` if every checklist item is checked and backed by
/// evidence, then start the next phase. Nothing is written unless the gate
/// passes.
pub fn advance(store: &PhaseStore, expected_phase: &str) -> Result<AdvanceReport> {
    let Some(mut phases) = store.read_index()? else {
        return Ok(AdvanceReport::incomplete(false, project_missing(store), None));
    };
    let Some(pos) = phases.position(expected_phase) else {
        return Ok(AdvanceReport::incomplete(
            false,
            phase_missing(expected_phase),
            None,
        ));
    };

    let record = &phases.phases[pos];
    let current = PhaseSummary::from(record);
    if record.status != PhaseStatus::InProgress {
        return Ok(AdvanceReport::incomplete(
            false,
            format!(
                "Phase {} is not in progress (status: {})",
                record.id, record.status
            ),
            Some(current),
        ));
    }

    let doc_file = store.relative(&store.phase_doc_path(record));
    let Some(mut doc) = store.read_phase_document(record)? else {
        let mut report = AdvanceReport::incomplete(
            false,
            format!("Phase file {doc_file} not found"),
            Some(current),
        );
        report.missing_items.push(MissingItem {
            kind: ItemKind::Deliverable,
            item: "Phase file".to_string(),
            reason: format!("{doc_file} missing"),
        });
        return Ok(report);
    };

    // Gate: every item checked, and checked items must not contradict the
    // filesystem. Checked items with nothing to verify are trusted.
    let mut missing = Vec::new();
    for kind in [ItemKind::Deliverable, ItemKind::DoneCriterion] {
        for item in doc.items(kind) {
            let reason = if !item.checked {
                Some("not marked complete".to_string())
            } else {
                checklist::verify(store.root(), &item.text).reason()
            };
            if let Some(reason) = reason {
                missing.push(MissingItem {
                    kind,
                    item: item.text.clone(),
                    reason,
                });
            }
        }
    }

    if !missing.is_empty() {
        let id = &current.id;
        let mut report = AdvanceReport::incomplete(
            true,
            format!("Phase {id} is incomplete: {} item(s) missing", missing.len()),
            Some(current),
        );
        report.missing_items = missing;
        return Ok(report);
    }

    let mut changes = Vec::new();
    let record = &mut phases.phases[pos];
    record.lock()?;
    let record = &phases.phases[pos];
    doc.set_status(record.status);
    doc.mark_all_progress();
    doc.set_completion_summary(&phase_doc::completion_summary_text(record));
    let written = store.write_phase_document(record, &doc)?;
    changes.push(store.relative(&written));
    let current = PhaseSummary::from(record);

    let mut next = None;
    if let Some(next_record) = phases.phases.get_mut(pos + 1) {
        if next_record.status == PhaseStatus::Pending {
            next_record.start()?;
            if let Some(path) = mirror_status(store, next_record, |doc| {
                doc.mark_progress(PROGRESS_STARTED);
            })? {
                changes.push(path);
            }
        }
        next = Some(PhaseSummary::from(&*next_record));
    }

    store.write_index(&mut phases)?;
    changes.push(store.relative(&store.index_path()));

    let message = match &next {
        Some(n) if n.status == PhaseStatus::InProgress => {
            format!("Phase {} locked. Phase {} started.", current.id, n.id)
        }
        Some(n) => format!("Phase {} locked. Phase {} is {}.", current.id, n.id, n.status),
        None => format!("Phase {} locked. No more phases.", current.id),
    };
    Ok(AdvanceReport {
        success: true,
        message,
        status: AdvanceStatus::Advanced,
        current_phase: Some(current),
        next_phase: next,
        missing_items: Vec::new(),
        changes_applied: changes,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::{execute, fixtures};
    use crate::store::PhaseStore;
    use crate::types::Aggression;
    use tempfile::TempDir;

    fn check_all(store: &PhaseStore, file: &str) {
        let text = fixtures::read(store, file).replace("- [ ] ", "- [x] ");
        fixtures::write(store, file, &text);
    }

    /// `demo` with foundation and testing, foundation started and every
    /// foundation reference present on disk.
    fn ready(dir: &TempDir) -> PhaseStore {
        let (_, store) = fixtures::planned(dir, &["foundation", "testing"]);
        fixtures::write(&store, "README.md", "# demo\n");
        std::fs::create_dir_all(store.root().join("src")).unwrap();
        execute(&store, "01", Aggression::Conservative).unwrap();
        check_all(&store, "PHASE-01.md");
        store
    }

    #[test]
    fn unchecked_deliverable_blocks_and_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let (_, store) = fixtures::planned(&dir, &["foundation"]);
        execute(&store, "01", Aggression::Conservative).unwrap();
        let index_before = fixtures::read(&store, "PHASES.md");
        let doc_before = fixtures::read(&store, "PHASE-01.md");

        let report = advance(&store, "01").unwrap();
        assert!(report.success);
        assert_eq!(report.status, AdvanceStatus::Incomplete);
        let readme = report
            .missing_items
            .iter()
            .find(|m| m.item == "README.md")
            .unwrap();
        assert_eq!(readme.kind, ItemKind::Deliverable);
        assert_eq!(readme.reason, "not marked complete");
        assert!(report.changes_applied.is_empty());

        assert_eq!(fixtures::read(&store, "PHASES.md"), index_before);
        assert_eq!(fixtures::read(&store, "PHASE-01.md"), doc_before);
    }

    #[test]
    fn checked_but_missing_reference_blocks() {
        let dir = TempDir::new().unwrap();
        let store = ready(&dir);
        std::fs::remove_dir(store.root().join("src")).unwrap();

        let report = advance(&store, "01").unwrap();
        assert_eq!(report.status, AdvanceStatus::Incomplete);
        assert_eq!(report.missing_items.len(), 1);
        assert_eq!(report.missing_items[0].item, "src/ directory structure");
        assert!(report.missing_items[0].reason.contains("directory missing"));
    }

    #[test]
    fn pending_phase_cannot_advance() {
        let dir = TempDir::new().unwrap();
        let (_, store) = fixtures::planned(&dir, &["foundation"]);
        let report = advance(&store, "01").unwrap();
        assert!(!report.success);
        assert_eq!(report.status, AdvanceStatus::Incomplete);
        assert!(report.message.contains("pending"));
        assert_eq!(
            report.current_phase.unwrap().status,
            PhaseStatus::Pending
        );
    }

    #[test]
    fn missing_phase_document() {
        let dir = TempDir::new().unwrap();
        let store = ready(&dir);
        std::fs::remove_file(store.root().join("PHASE-01.md")).unwrap();
        let report = advance(&store, "01").unwrap();
        assert!(!report.success);
        assert_eq!(report.missing_items.len(), 1);
        assert_eq!(report.missing_items[0].item, "Phase file");
    }

    #[test]
    fn unknown_project_and_phase() {
        let dir = TempDir::new().unwrap();
        let (_, store) = fixtures::store(&dir);
        assert!(!advance(&store, "01").unwrap().success);

        let store = ready(&dir);
        let report = advance(&store, "09").unwrap();
        assert!(!report.success);
        assert_eq!(report.message, "Phase 09 not found");
    }

    #[test]
    fn gate_passes_and_moves_exactly_two_phases() {
        let dir = TempDir::new().unwrap();
        let (_, store) = fixtures::planned(&dir, &["foundation", "testing", "documentation"]);
        fixtures::write(&store, "README.md", "# demo\n");
        std::fs::create_dir_all(store.root().join("src")).unwrap();
        execute(&store, "01", Aggression::Conservative).unwrap();
        check_all(&store, "PHASE-01.md");

        let report = advance(&store, "1").unwrap();
        assert!(report.success, "{report:?}");
        assert_eq!(report.status, AdvanceStatus::Advanced);
        assert_eq!(report.current_phase.as_ref().unwrap().status, PhaseStatus::Locked);
        assert_eq!(report.next_phase.as_ref().unwrap().id, "02");
        assert_eq!(
            report.changes_applied,
            vec!["PHASE-01.md", "PHASE-02.md", "PHASES.md"]
        );

        let index = store.read_index().unwrap().unwrap();
        let statuses: Vec<PhaseStatus> = index.phases.iter().map(|p| p.status).collect();
        assert_eq!(
            statuses,
            vec![PhaseStatus::Locked, PhaseStatus::InProgress, PhaseStatus::Pending]
        );
        assert!(index.phases[0].completed_at.is_some());
        assert!(index.phases[1].started_at.is_some());
        assert!(index.phases[2].started_at.is_none());

        let locked = store.read_phase_document(&index.phases[0]).unwrap().unwrap();
        assert_eq!(locked.status(), Some(PhaseStatus::Locked));
        assert!(locked.progress().iter().all(|i| i.checked));
        assert!(locked
            .completion_summary()
            .unwrap()
            .contains("Phase is now locked"));

        let next = store.read_phase_document(&index.phases[1]).unwrap().unwrap();
        assert_eq!(next.status(), Some(PhaseStatus::InProgress));
        assert!(next.progress()[0].checked);
    }

    #[test]
    fn last_phase_advances_alone() {
        let dir = TempDir::new().unwrap();
        let (_, store) = fixtures::planned(&dir, &["foundation"]);
        fixtures::write(&store, "README.md", "# demo\n");
        std::fs::create_dir_all(store.root().join("src")).unwrap();
        execute(&store, "01", Aggression::Conservative).unwrap();
        check_all(&store, "PHASE-01.md");

        let report = advance(&store, "01").unwrap();
        assert_eq!(report.status, AdvanceStatus::Advanced);
        assert!(report.next_phase.is_none());
        assert!(report.message.contains("No more phases"));
    }

    #[test]
    fn blocked_next_phase_is_left_alone() {
        let dir = TempDir::new().unwrap();
        let store = ready(&dir);
        crate::orchestrator::block(&store, "02", Some("waiting on infra")).unwrap();

        let report = advance(&store, "01").unwrap();
        assert_eq!(report.status, AdvanceStatus::Advanced);
        assert_eq!(report.next_phase.unwrap().status, PhaseStatus::Blocked);
        assert_eq!(report.changes_applied, vec!["PHASE-01.md", "PHASES.md"]);
    }

    #[test]
    fn prechecked_unverifiable_items_are_accepted() {
        let dir = TempDir::new().unwrap();
        let store = ready(&dir);
        let doc = fixtures::read(&store, "PHASE-01.md");
        assert!(doc.contains("- [x] Project structure is in place"));

        let report = advance(&store, "01").unwrap();
        assert_eq!(report.status, AdvanceStatus::Advanced, "{report:?}");
    }

    #[test]
    fn locked_phase_cannot_advance_twice() {
        let dir = TempDir::new().unwrap();
        let store = ready(&dir);
        advance(&store, "01").unwrap();
        let report = advance(&store, "01").unwrap();
        assert!(!report.success);
        assert!(report.message.contains("locked"));
    }
}

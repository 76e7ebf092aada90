use super::{phase_missing, project_missing};
use crate::error::Result;
use crate::index::PhaseRecord;
use crate::paths;
use crate::phase_doc::{PhaseDocument, DESCRIPTION, PROGRESS};
use crate::store::PhaseStore;
use crate::types::ItemKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    File,
    PhaseStructure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceCheck {
    pub check_type: CheckKind,
    pub passed: bool,
    pub message: String,
}

impl ComplianceCheck {
    fn new(check_type: CheckKind, passed: bool, message: String) -> Self {
        Self {
            check_type,
            passed,
            message,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceSummary {
    pub total_checks: usize,
    pub passed: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub success: bool,
    pub message: String,
    /// True when every check passed.
    pub compliant: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase_id: Option<String>,
    pub checks: Vec<ComplianceCheck>,
    pub summary: ComplianceSummary,
}

/// Sections every phase document carries. Deliverables and Done Criteria
/// are required only when the index lists items for them.
pub(crate) fn required_sections(record: &PhaseRecord) -> Vec<&'static str> {
    let mut sections = vec![DESCRIPTION];
    if !record.deliverables.is_empty() {
        sections.push(ItemKind::Deliverable.heading());
    }
    if !record.done_criteria.is_empty() {
        sections.push(ItemKind::DoneCriterion.heading());
    }
    sections.push(PROGRESS);
    sections
}

/// Required sections absent from `doc`.
pub(crate) fn missing_sections(record: &PhaseRecord, doc: &PhaseDocument) -> Vec<&'static str> {
    required_sections(record)
        .into_iter()
        .filter(|heading| doc.section(heading).is_none())
        .collect()
}

/// Check the index and the phase documents for the required layout. With
/// `phase_id`, only that phase's document is checked. Never writes.
pub fn check_compliance(store: &PhaseStore, phase_id: Option<&str>) -> Result<ComplianceReport> {
    let phase_id = phase_id.map(paths::pad_id);
    let mut checks = Vec::new();

    let index_file = store.relative(&store.index_path());
    let Some(phases) = store.read_index()? else {
        checks.push(ComplianceCheck::new(
            CheckKind::File,
            false,
            format!("{index_file} is missing"),
        ));
        return Ok(finish(false, project_missing(store), phase_id, checks));
    };
    checks.push(ComplianceCheck::new(
        CheckKind::File,
        true,
        format!("{index_file} exists"),
    ));

    let records: Vec<&PhaseRecord> = match &phase_id {
        Some(id) => match phases.find(id) {
            Some(record) => vec![record],
            None => return Ok(finish(false, phase_missing(id), phase_id.clone(), checks)),
        },
        None => phases.phases.iter().collect(),
    };

    for record in records {
        let file = store.relative(&store.phase_doc_path(record));
        let Some(doc) = store.read_phase_document(record)? else {
            checks.push(ComplianceCheck::new(
                CheckKind::PhaseStructure,
                false,
                format!("{file} is missing"),
            ));
            continue;
        };
        for heading in required_sections(record) {
            let present = doc.section(heading).is_some();
            let message = if present {
                format!("{file} has {heading} section")
            } else {
                format!("{file} missing {heading} section")
            };
            checks.push(ComplianceCheck::new(CheckKind::PhaseStructure, present, message));
        }
    }

    let message = format!("Compliance checked for {}", phases.project_name);
    Ok(finish(true, message, phase_id, checks))
}

fn finish(
    success: bool,
    message: String,
    phase_id: Option<String>,
    checks: Vec<ComplianceCheck>,
) -> ComplianceReport {
    let passed = checks.iter().filter(|c| c.passed).count();
    let summary = ComplianceSummary {
        total_checks: checks.len(),
        passed,
        failed: checks.len() - passed,
    };
    ComplianceReport {
        success,
        message,
        compliant: success && summary.failed == 0,
        phase_id,
        checks,
        summary,
    }
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
    fn planned_project_is_compliant() {
        let dir = TempDir::new().unwrap();
        let (_, store) = fixtures::planned(&dir, &["foundation", "testing"]);
        let report = check_compliance(&store, None).unwrap();
        assert!(report.success);
        assert!(report.compliant, "{report:?}");
        // Index plus four sections per phase.
        assert_eq!(report.summary.total_checks, 9);
        assert_eq!(report.summary.failed, 0);
    }

    #[test]
    fn missing_section_and_document_fail() {
        let dir = TempDir::new().unwrap();
        let (_, store) = fixtures::planned(&dir, &["foundation", "testing"]);
        let doc = fixtures::read(&store, "PHASE-01.md");
        let cut = doc.find("## Progress").unwrap();
        fixtures::write(&store, "PHASE-01.md", &doc[..cut]);
        std::fs::remove_file(store.root().join("PHASE-02.md")).unwrap();

        let report = check_compliance(&store, None).unwrap();
        assert!(report.success);
        assert!(!report.compliant);
        let failed: Vec<&str> = report
            .checks
            .iter()
            .filter(|c| !c.passed)
            .map(|c| c.message.as_str())
            .collect();
        assert_eq!(
            failed,
            vec!["PHASE-01.md missing Progress section", "PHASE-02.md is missing"]
        );
        assert_eq!(report.summary.failed, 2);
    }

    #[test]
    fn single_phase_is_checked_alone() {
        let dir = TempDir::new().unwrap();
        let (_, store) = fixtures::planned(&dir, &["foundation", "testing"]);
        std::fs::remove_file(store.root().join("PHASE-02.md")).unwrap();

        let report = check_compliance(&store, Some("1")).unwrap();
        assert!(report.compliant);
        assert_eq!(report.phase_id.as_deref(), Some("01"));
        assert!(report.checks.iter().all(|c| !c.message.contains("PHASE-02")));

        let report = check_compliance(&store, Some("07")).unwrap();
        assert!(!report.success);
        assert_eq!(report.message, "Phase 07 not found");
    }

    #[test]
    fn missing_index_fails() {
        let dir = TempDir::new().unwrap();
        let (_, store) = fixtures::store(&dir);
        let report = check_compliance(&store, None).unwrap();
        assert!(!report.success);
        assert!(!report.compliant);
        assert_eq!(report.checks[0].message, "PHASES.md is missing");
        assert_eq!(report.summary.failed, 1);
    }

    #[test]
    fn empty_lists_need_no_section() {
        let record = PhaseRecord::new("01", "bare");
        assert_eq!(required_sections(&record), vec![DESCRIPTION, PROGRESS]);
    }
}

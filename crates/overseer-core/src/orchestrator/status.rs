use super::project_missing;
use crate::error::{OverseerError, Result};
use crate::index::PhaseRecord;
use crate::lifecycle;
use crate::store::PhaseStore;
use crate::types::PhaseStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseEntry {
    pub id: String,
    pub name: String,
    /// Reported status: the phase document's marker when it says more than
    /// `pending`, else the index status.
    pub status: PhaseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub locked: usize,
    pub blocked: usize,
}

impl StatusSummary {
    fn count(&mut self, status: PhaseStatus) {
        self.total += 1;
        match status {
            PhaseStatus::Pending => self.pending += 1,
            PhaseStatus::InProgress => self.in_progress += 1,
            PhaseStatus::Completed => self.completed += 1,
            PhaseStatus::Locked => self.locked += 1,
            PhaseStatus::Blocked => self.blocked += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    pub success: bool,
    pub message: String,
    pub project_name: String,
    pub current_phase: Option<String>,
    pub phases: Vec<PhaseEntry>,
    pub summary: StatusSummary,
}

/// Read-only view of a project's phases. Never writes.
pub fn status(store: &PhaseStore) -> Result<StatusReport> {
    let Some(phases) = store.read_index()? else {
        return Ok(StatusReport {
            success: false,
            message: project_missing(store),
            project_name: store.project_name(),
            current_phase: None,
            phases: Vec::new(),
            summary: StatusSummary::default(),
        });
    };

    let mut entries = Vec::with_capacity(phases.phases.len());
    let mut summary = StatusSummary::default();
    for record in &phases.phases {
        let status = reported_status(store, record)?;
        summary.count(status);
        entries.push(PhaseEntry {
            id: record.id.clone(),
            name: record.name.clone(),
            status,
            description: record.description.clone(),
            started_at: record.started_at,
            completed_at: record.completed_at,
        });
    }

    Ok(StatusReport {
        success: true,
        message: format!("Status for project {}", phases.project_name),
        project_name: phases.project_name.clone(),
        current_phase: lifecycle::current_phase(&phases.phases).map(|p| p.id.clone()),
        phases: entries,
        summary,
    })
}

fn reported_status(store: &PhaseStore, record: &PhaseRecord) -> Result<PhaseStatus> {
    let doc = match store.read_phase_document(record) {
        Ok(doc) => doc,
        // A damaged phase document only loses its override here.
        Err(OverseerError::Malformed { path, reason }) => {
            tracing::warn!(path = %path.display(), %reason, "ignoring malformed phase document");
            None
        }
        Err(e) => return Err(e),
    };
    Ok(match doc.and_then(|d| d.status()) {
        Some(marker) if marker != PhaseStatus::Pending => marker,
        _ => record.status,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

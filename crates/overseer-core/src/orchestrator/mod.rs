//! Phase operations over a [`PhaseStore`].
//!
//! Every operation re-reads the index and phase documents, returns a
//! serializable report, and reports not-found and gate failures as data.
//! Only I/O and malformed-document failures come back as `Err`.

pub mod advance;
pub mod compliance;
pub mod execute;
pub mod plan;
pub mod status;
pub mod step;
pub mod sync;
pub mod update;

pub use advance::{advance, AdvanceReport, AdvanceStatus, MissingItem};
pub use compliance::{
    check_compliance, CheckKind, ComplianceCheck, ComplianceReport, ComplianceSummary,
};
pub use execute::{execute, CompletedItem, ExecuteReport, ExecuteStatus, PendingItem};
pub use plan::{plan, PlanReport};
pub use status::{status, PhaseEntry, StatusReport, StatusSummary};
pub use step::{block, step, unblock, TransitionReport};
pub use sync::{sync, ChangeKind, DocChange, SyncReport};
pub use update::{update, Changes, Modification, Operation, PhaseChange, UpdateReport};

use crate::error::Result;
use crate::index::PhaseRecord;
use crate::phase_doc::PhaseDocument;
use crate::store::PhaseStore;
use crate::types::PhaseStatus;
use serde::{Deserialize, Serialize};

/// Id, name and status of one phase, as reported by operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseSummary {
    pub id: String,
    pub name: String,
    pub status: PhaseStatus,
}

impl From<&PhaseRecord> for PhaseSummary {
    fn from(record: &PhaseRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            status: record.status,
        }
    }
}

pub(crate) fn project_missing(store: &PhaseStore) -> String {
    format!(
        "Project {} not found at {}. Run plan first.",
        store.project_name(),
        store.root().display()
    )
}

pub(crate) fn phase_missing(id: &str) -> String {
    format!("Phase {id} not found")
}

/// Mirror the record's status into its phase document, if the document
/// exists, optionally ticking a progress item. Returns the written path
/// relative to the project root.
pub(crate) fn mirror_status(
    store: &PhaseStore,
    record: &PhaseRecord,
    edit: impl FnOnce(&mut PhaseDocument),
) -> Result<Option<String>> {
    let Some(mut doc) = store.read_phase_document(record)? else {
        return Ok(None);
    };
    doc.set_status(record.status);
    edit(&mut doc);
    let path = store.write_phase_document(record, &doc)?;
    Ok(Some(store.relative(&path)))
}

// ---------------------------------------------------------------------------
// Test fixtures
// ---------------------------------------------------------------------------

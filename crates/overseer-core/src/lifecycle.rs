use crate::error::{OverseerError, Result};
use crate::index::PhaseRecord;
use crate::timestamp;
use crate::types::PhaseStatus;

// ---------------------------------------------------------------------------
// Phase transitions
// ---------------------------------------------------------------------------

impl PhaseRecord {
    fn invalid(&self, to: PhaseStatus, reason: impl Into<String>) -> OverseerError {
        OverseerError::InvalidTransition {
            from: self.status.to_string(),
            to: to.to_string(),
            reason: reason.into(),
        }
    }

    fn set_status(&mut self, to: PhaseStatus) {
        tracing::info!(
            phase = %self.id,
            name = %self.name,
            from = %self.status,
            to = %to,
            "phase transition"
        );
        self.status = to;
    }

    /// `pending → in_progress`.
    pub fn start(&mut self) -> Result<()> {
        if self.status != PhaseStatus::Pending {
            return Err(self.invalid(PhaseStatus::InProgress, "only pending phases can start"));
        }
        self.started_at.get_or_insert_with(timestamp::now);
        self.set_status(PhaseStatus::InProgress);
        Ok(())
    }

    /// `in_progress → locked`, the outcome of a validated advance.
    pub fn lock(&mut self) -> Result<()> {
        self.finish(PhaseStatus::Locked)
    }

    /// `in_progress → completed`, the direct step with no validation.
    pub fn complete(&mut self) -> Result<()> {
        self.finish(PhaseStatus::Completed)
    }

    fn finish(&mut self, to: PhaseStatus) -> Result<()> {
        if self.status != PhaseStatus::InProgress {
            return Err(self.invalid(to, "only in-progress phases can finish"));
        }
        self.completed_at = Some(timestamp::now());
        self.set_status(to);
        Ok(())
    }

    /// Any non-terminal phase can be blocked.
    pub fn block(&mut self) -> Result<()> {
        match self.status {
            PhaseStatus::Blocked => {
                Err(self.invalid(PhaseStatus::Blocked, "phase is already blocked"))
            }
            s if s.is_terminal() => Err(self.invalid(PhaseStatus::Blocked, "phase is finished")),
            _ => {
                self.set_status(PhaseStatus::Blocked);
                Ok(())
            }
        }
    }

    /// `blocked → in_progress` when the phase had started, else `→ pending`.
    pub fn unblock(&mut self) -> Result<()> {
        let to = if self.started_at.is_some() {
            PhaseStatus::InProgress
        } else {
            PhaseStatus::Pending
        };
        if self.status != PhaseStatus::Blocked {
            return Err(self.invalid(to, "phase is not blocked"));
        }
        self.set_status(to);
        Ok(())
    }

    /// One unvalidated step forward: `pending → in_progress` or
    /// `in_progress → completed`.
    pub fn step(&mut self) -> Result<PhaseStatus> {
        match self.status {
            PhaseStatus::Pending => self.start()?,
            PhaseStatus::InProgress => self.complete()?,
            PhaseStatus::Blocked => {
                return Err(self.invalid(PhaseStatus::InProgress, "phase is blocked"))
            }
            PhaseStatus::Completed | PhaseStatus::Locked => {
                return Err(self.invalid(self.status, "phase is already finished"))
            }
        }
        Ok(self.status)
    }
}

/// The first phase, in sequence order, that is not finished.
pub fn current_phase(phases: &[PhaseRecord]) -> Option<&PhaseRecord> {
    phases.iter().find(|p| !p.status.is_terminal())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: PhaseStatus) -> PhaseRecord {
        let mut r = PhaseRecord::new("1", "foundation");
        r.status = status;
        r
    }

    #[test]
    fn start_sets_started_at() {
        let mut r = record(PhaseStatus::Pending);
        r.start().unwrap();
        assert_eq!(r.status, PhaseStatus::InProgress);
        assert!(r.started_at.is_some());
        assert!(r.start().is_err());
    }

    #[test]
    fn start_keeps_existing_timestamp() {
        let mut r = record(PhaseStatus::Pending);
        let earlier = timestamp::parse("2024-01-01T00:00:00Z").unwrap();
        r.started_at = Some(earlier);
        r.start().unwrap();
        assert_eq!(r.started_at, Some(earlier));
    }

    #[test]
    fn lock_and_complete_require_in_progress() {
        let mut r = record(PhaseStatus::Pending);
        let err = r.lock().unwrap_err();
        assert!(matches!(err, OverseerError::InvalidTransition { .. }));
        assert!(r.complete().is_err());

        let mut r = record(PhaseStatus::InProgress);
        r.lock().unwrap();
        assert_eq!(r.status, PhaseStatus::Locked);
        assert!(r.completed_at.is_some());

        let mut r = record(PhaseStatus::InProgress);
        r.complete().unwrap();
        assert_eq!(r.status, PhaseStatus::Completed);
    }

    #[test]
    fn finishing_replaces_stale_completed_at() {
        let stale = timestamp::parse("2020-01-01T00:00:00Z").unwrap();
        let mut r = record(PhaseStatus::InProgress);
        r.completed_at = Some(stale);
        r.lock().unwrap();
        assert!(r.completed_at.unwrap() > stale);

        let mut r = record(PhaseStatus::InProgress);
        r.completed_at = Some(stale);
        r.complete().unwrap();
        assert!(r.completed_at.unwrap() > stale);
    }

    #[test]
    fn block_from_non_terminal_only() {
        for status in [PhaseStatus::Pending, PhaseStatus::InProgress] {
            let mut r = record(status);
            r.block().unwrap();
            assert_eq!(r.status, PhaseStatus::Blocked);
        }
        for status in [PhaseStatus::Completed, PhaseStatus::Locked, PhaseStatus::Blocked] {
            assert!(record(status).block().is_err());
        }
    }

    #[test]
    fn unblock_returns_to_prior_stage() {
        let mut r = record(PhaseStatus::Pending);
        r.block().unwrap();
        r.unblock().unwrap();
        assert_eq!(r.status, PhaseStatus::Pending);

        let mut r = record(PhaseStatus::Pending);
        r.start().unwrap();
        r.block().unwrap();
        r.unblock().unwrap();
        assert_eq!(r.status, PhaseStatus::InProgress);

        assert!(record(PhaseStatus::Pending).unblock().is_err());
    }

    #[test]
    fn step_walks_forward() {
        let mut r = record(PhaseStatus::Pending);
        assert_eq!(r.step().unwrap(), PhaseStatus::InProgress);
        assert_eq!(r.step().unwrap(), PhaseStatus::Completed);
        assert!(r.step().is_err());
        assert!(record(PhaseStatus::Blocked).step().is_err());
        assert!(record(PhaseStatus::Locked).step().is_err());
    }

    #[test]
    fn no_transition_clears_timestamps() {
        let mut r = record(PhaseStatus::Pending);
        r.start().unwrap();
        r.block().unwrap();
        r.unblock().unwrap();
        r.lock().unwrap();
        assert!(r.started_at.is_some());
        assert!(r.completed_at.is_some());
    }

    #[test]
    fn current_phase_is_first_unfinished() {
        let mut a = record(PhaseStatus::Completed);
        a.id = "01".to_string();
        let mut b = record(PhaseStatus::Pending);
        b.id = "02".to_string();
        let mut c = record(PhaseStatus::InProgress);
        c.id = "03".to_string();
        let phases = vec![a, b, c];
        assert_eq!(current_phase(&phases).unwrap().id, "02");

        let done = vec![record(PhaseStatus::Locked), record(PhaseStatus::Completed)];
        assert!(current_phase(&done).is_none());
        assert!(current_phase(&[]).is_none());
    }

    #[test]
    fn blocked_phase_is_current() {
        let phases = vec![record(PhaseStatus::Locked), record(PhaseStatus::Blocked)];
        assert_eq!(current_phase(&phases).unwrap().status, PhaseStatus::Blocked);
    }
}

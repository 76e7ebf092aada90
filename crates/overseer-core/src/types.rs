use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// PhaseStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a phase record.
///
/// `active` is an older spelling of `in_progress`; it is accepted wherever a
/// status is parsed and never written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    #[default]
    Pending,
    #[serde(alias = "active")]
    InProgress,
    Completed,
    Locked,
    Blocked,
}

impl PhaseStatus {
    pub fn all() -> &'static [PhaseStatus] {
        &[
            PhaseStatus::Pending,
            PhaseStatus::InProgress,
            PhaseStatus::Completed,
            PhaseStatus::Locked,
            PhaseStatus::Blocked,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PhaseStatus::Pending => "pending",
            PhaseStatus::InProgress => "in_progress",
            PhaseStatus::Completed => "completed",
            PhaseStatus::Locked => "locked",
            PhaseStatus::Blocked => "blocked",
        }
    }

    /// `completed` and `locked` end a phase's lifecycle.
    pub fn is_terminal(self) -> bool {
        matches!(self, PhaseStatus::Completed | PhaseStatus::Locked)
    }

    pub fn is_executing(self) -> bool {
        self == PhaseStatus::InProgress
    }
}

impl fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PhaseStatus {
    type Err = crate::error::OverseerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "pending" => Ok(PhaseStatus::Pending),
            "active" | "in_progress" => Ok(PhaseStatus::InProgress),
            "completed" => Ok(PhaseStatus::Completed),
            "locked" => Ok(PhaseStatus::Locked),
            "blocked" => Ok(PhaseStatus::Blocked),
            _ => Err(crate::error::OverseerError::InvalidStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// ItemKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Deliverable,
    DoneCriterion,
}

impl ItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::Deliverable => "deliverable",
            ItemKind::DoneCriterion => "done_criterion",
        }
    }

    /// Section heading used for this kind in phase documents.
    pub fn heading(self) -> &'static str {
        match self {
            ItemKind::Deliverable => "Deliverables",
            ItemKind::DoneCriterion => "Done Criteria",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Aggression
// ---------------------------------------------------------------------------

/// How much a phase run may write beyond its own documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggression {
    Conservative,
    #[default]
    Normal,
    Bossmode,
}

impl Aggression {
    pub fn as_str(self) -> &'static str {
        match self {
            Aggression::Conservative => "conservative",
            Aggression::Normal => "normal",
            Aggression::Bossmode => "bossmode",
        }
    }

    pub fn writes_placeholders(self) -> bool {
        self != Aggression::Conservative
    }

    pub fn creates_directories(self) -> bool {
        self == Aggression::Bossmode
    }
}

impl fmt::Display for Aggression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Aggression {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "conservative" => Ok(Aggression::Conservative),
            "normal" => Ok(Aggression::Normal),
            "bossmode" => Ok(Aggression::Bossmode),
            other => Err(format!(
                "unknown aggression level '{other}' (expected conservative, normal or bossmode)"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

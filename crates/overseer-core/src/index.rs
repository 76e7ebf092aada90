use crate::error::{OverseerError, Result};
use crate::grammar;
use crate::paths;
use crate::timestamp;
use crate::types::PhaseStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

const INDEX_TITLE_PREFIX: &str = "Project Phases:";
const INDEX_FOOTER: &str = "*This file is automatically managed by Overseer.*";

// ---------------------------------------------------------------------------
// PhaseRecord
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: PhaseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deliverables: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub done_criteria: Vec<String>,
}

impl PhaseRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: paths::pad_id(&id.into()),
            name: name.into(),
            status: PhaseStatus::Pending,
            description: None,
            started_at: None,
            completed_at: None,
            deliverables: Vec::new(),
            done_criteria: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// ProjectPhases
// ---------------------------------------------------------------------------

/// The phase index of one project. Sequence order is progression order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectPhases {
    pub project_name: String,
    #[serde(default)]
    pub phases: Vec<PhaseRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectPhases {
    pub fn new(project_name: impl Into<String>) -> Self {
        let now = timestamp::now();
        Self {
            project_name: project_name.into(),
            phases: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn find(&self, id: &str) -> Option<&PhaseRecord> {
        let id = paths::pad_id(id);
        self.phases.iter().find(|p| p.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut PhaseRecord> {
        let id = paths::pad_id(id);
        self.phases.iter_mut().find(|p| p.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        let id = paths::pad_id(id);
        self.phases.iter().position(|p| p.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&PhaseRecord> {
        self.phases.iter().find(|p| p.name == name)
    }

    /// Next free ordinal id: one past the highest numeric id, zero-padded.
    pub fn next_id(&self) -> String {
        let max = self
            .phases
            .iter()
            .filter_map(|p| p.id.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        paths::pad_id(&(max + 1).to_string())
    }

    fn check_unique_ids(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for phase in &self.phases {
            if !seen.insert(phase.id.as_str()) {
                return Err(OverseerError::Parse(format!(
                    "duplicate phase id {}",
                    phase.id
                )));
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Decode
    // -----------------------------------------------------------------------

    /// Parse an index document. A document whose first non-blank character is
    /// `{` is the legacy JSON form; anything else is markdown.
    pub fn decode(text: &str) -> Result<Self> {
        let mut phases = if text.trim_start().starts_with('{') {
            let mut phases: ProjectPhases = serde_json::from_str(text)?;
            for record in &mut phases.phases {
                record.id = paths::pad_id(&record.id);
            }
            phases
        } else {
            decode_markdown(text)?
        };
        phases.phases.iter_mut().for_each(|p| p.name = p.name.trim().to_string());
        phases.check_unique_ids()?;
        Ok(phases)
    }

    // -----------------------------------------------------------------------
    // Encode
    // -----------------------------------------------------------------------

    /// Render the markdown index, refreshing `updated_at` first.
    pub fn encode(&mut self) -> String {
        self.updated_at = timestamp::now();
        self.render()
    }

    fn render(&self) -> String {
        let mut out = Vec::new();
        out.push(format!(
            "# {INDEX_TITLE_PREFIX} {}",
            grammar::one_line(&self.project_name)
        ));
        out.push(String::new());
        out.push("This document tracks the phases of the project.".to_string());
        out.push(String::new());
        out.push("## Metadata".to_string());
        out.push(String::new());
        out.push(format!("- **Created**: {}", timestamp::format(&self.created_at)));
        out.push(format!("- **Updated**: {}", timestamp::format(&self.updated_at)));
        out.push(format!("- **Total Phases**: {}", self.phases.len()));
        out.push(String::new());
        out.push("## Phases".to_string());
        out.push(String::new());

        if self.phases.is_empty() {
            out.push("No phases defined yet.".to_string());
            out.push(String::new());
        }

        for phase in &self.phases {
            out.push(format!("### {}. {}", phase.id, grammar::one_line(&phase.name)));
            out.push(String::new());
            out.push(format!("**Status**: {}", phase.status));
            if let Some(desc) = &phase.description {
                let line = format!("**Description**: {}", grammar::one_line(desc));
                out.push(line.trim_end().to_string());
            }
            if let Some(ts) = &phase.started_at {
                out.push(format!("**Started**: {}", timestamp::format(ts)));
            }
            if let Some(ts) = &phase.completed_at {
                out.push(format!("**Completed**: {}", timestamp::format(ts)));
            }
            out.push(String::new());

            if !phase.deliverables.is_empty() {
                out.push("**Deliverables**:".to_string());
                out.push(String::new());
                for item in &phase.deliverables {
                    out.push(format!("- {}", grammar::one_line(item)));
                }
                out.push(String::new());
            }

            if !phase.done_criteria.is_empty() {
                out.push("**Done Criteria**:".to_string());
                out.push(String::new());
                for item in &phase.done_criteria {
                    out.push(format!("- [ ] {}", grammar::one_line(item)));
                }
                out.push(String::new());
            }
        }

        out.push("---".to_string());
        out.push(String::new());
        out.push(INDEX_FOOTER.to_string());
        out.push(String::new());
        out.join("\n")
    }
}

/// Parts of the canonical index layout that `text` lacks: the
/// `# Project Phases:` title and the `## Metadata` section.
pub fn missing_layout(text: &str) -> Vec<&'static str> {
    let mut missing = Vec::new();
    let titled = text
        .lines()
        .find_map(grammar::title)
        .map(|t| t.starts_with(INDEX_TITLE_PREFIX))
        .unwrap_or(false);
    if !titled {
        missing.push("main heading");
    }
    let has_metadata = text
        .lines()
        .filter_map(grammar::h2)
        .any(|h| h.eq_ignore_ascii_case("Metadata"));
    if !has_metadata {
        missing.push("Metadata section");
    }
    missing
}

// ---------------------------------------------------------------------------
// Markdown decoding
// ---------------------------------------------------------------------------

fn decode_markdown(text: &str) -> Result<ProjectPhases> {
    let lines: Vec<&str> = text.lines().collect();
    let first_phase = lines
        .iter()
        .position(|l| grammar::phase_heading(l).is_some())
        .unwrap_or(lines.len());

    let mut project_name = String::new();
    let mut created_at = None;
    let mut updated_at = None;
    for line in &lines[..first_phase] {
        if project_name.is_empty() {
            if let Some(title) = grammar::title(line) {
                project_name = title
                    .strip_prefix(INDEX_TITLE_PREFIX)
                    .unwrap_or(title)
                    .trim()
                    .to_string();
            }
        }
        if let Some(field) = grammar::field(line) {
            if field.is("created") && created_at.is_none() {
                created_at = meta_timestamp("Created", field.value);
            } else if field.is("updated") && updated_at.is_none() {
                updated_at = meta_timestamp("Updated", field.value);
            }
        }
    }

    let mut phases = Vec::new();
    let mut i = first_phase;
    while i < lines.len() {
        let Some((number, name)) = grammar::phase_heading(lines[i]) else {
            if grammar::is_h3(lines[i]) {
                tracing::warn!(heading = lines[i], "skipping heading without a numeric phase id");
            }
            i += 1;
            continue;
        };
        let end = lines[i + 1..]
            .iter()
            .position(|l| grammar::is_h3(l) || grammar::h2(l).is_some())
            .map(|p| i + 1 + p)
            .unwrap_or(lines.len());
        phases.push(decode_phase_section(number, name, &lines[i + 1..end])?);
        i = end;
    }

    let now = timestamp::now();
    Ok(ProjectPhases {
        project_name,
        phases,
        created_at: created_at.unwrap_or(now),
        updated_at: updated_at.unwrap_or(now),
    })
}

fn decode_phase_section(number: &str, name: &str, body: &[&str]) -> Result<PhaseRecord> {
    let mut record = PhaseRecord::new(number, name.trim());
    let mut bulleted_status = None;
    let mut bare_status = None;

    let mut j = 0;
    while j < body.len() {
        let line = body[j];
        j += 1;
        let Some(field) = grammar::field(line) else {
            continue;
        };
        let value = field.value.trim();

        if field.is("status") {
            // `- **Status**:` outranks a bare `**Status**:` anywhere in the section
            let slot = if grammar::bullet(line).is_some() {
                &mut bulleted_status
            } else {
                &mut bare_status
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        } else if field.is("description") {
            if record.description.is_none() {
                record.description = Some(value.to_string());
            }
        } else if field.is("started") {
            if record.started_at.is_none() {
                record.started_at = meta_timestamp("Started", value);
            }
        } else if field.is("completed") {
            if record.completed_at.is_none() {
                record.completed_at = meta_timestamp("Completed", value);
            }
        } else if field.is("deliverables") {
            let (items, next) = collect_items(body, j, false);
            record.deliverables = items;
            j = next;
        } else if field.is("done criteria") {
            let (items, next) = collect_items(body, j, true);
            record.done_criteria = items;
            j = next;
        }
    }

    record.status = match bulleted_status.or(bare_status) {
        Some(value) => parse_status(value)?,
        None => PhaseStatus::default(),
    };
    Ok(record)
}

fn is_list_label(line: &str) -> bool {
    grammar::field(line).is_some_and(|f| f.is("deliverables") || f.is("done criteria"))
}

/// Bullets following a list label, after optional blank lines. Every bullet
/// is an item, field-shaped or not; the list ends at a non-bullet line or the
/// next list label. Deliverables keep their text verbatim, done criteria
/// lose one leading checkbox.
fn collect_items(body: &[&str], start: usize, strip_checkbox: bool) -> (Vec<String>, usize) {
    let mut j = start;
    while j < body.len() && body[j].trim().is_empty() {
        j += 1;
    }
    let mut items = Vec::new();
    while j < body.len() && !is_list_label(body[j]) {
        let text = if strip_checkbox {
            grammar::item_text(body[j])
        } else {
            grammar::bullet(body[j])
        };
        match text {
            Some(text) => items.push(text.to_string()),
            None => break,
        }
        j += 1;
    }
    (items, j)
}

fn parse_status(value: &str) -> Result<PhaseStatus> {
    value.parse::<PhaseStatus>().or_else(|err| {
        grammar::first_word(value)
            .ok_or(err)
            .and_then(|word| word.parse::<PhaseStatus>())
            .map_err(|_| OverseerError::InvalidStatus(value.to_string()))
    })
}

fn meta_timestamp(label: &str, value: &str) -> Option<DateTime<Utc>> {
    let parsed = timestamp::parse(value);
    if parsed.is_none() && !value.trim().is_empty() {
        tracing::warn!(field = label, value, "ignoring unparseable timestamp");
    }
    parsed
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> ProjectPhases {
        let mut phases = ProjectPhases::new("demo");
        let mut foundation = PhaseRecord::new("1", "foundation");
        foundation.status = PhaseStatus::Locked;
        foundation.description = Some("Project foundation and setup".to_string());
        foundation.started_at = Some(Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap());
        foundation.completed_at = Some(Utc.with_ymd_and_hms(2025, 1, 3, 3, 4, 5).unwrap());
        foundation.deliverables = vec!["README.md".to_string(), "src/ layout".to_string()];
        foundation.done_criteria = vec!["README.md exists".to_string()];
        phases.phases.push(foundation);

        let mut build = PhaseRecord::new("02", "implementation");
        build.status = PhaseStatus::InProgress;
        phases.phases.push(build);

        phases.phases.push(PhaseRecord::new("3", "testing"));
        phases
    }

    #[test]
    fn encode_decode_roundtrip() {
        let mut original = sample();
        let text = original.encode();
        let decoded = ProjectPhases::decode(&text).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn roundtrip_with_no_phases() {
        let mut original = ProjectPhases::new("empty");
        let text = original.encode();
        assert!(text.contains("No phases defined yet."));
        let decoded = ProjectPhases::decode(&text).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn encode_is_idempotent_through_decode() {
        let mut first = ProjectPhases::decode(&sample().encode()).unwrap();
        let text = first.encode();
        let mut second = ProjectPhases::decode(&text).unwrap();
        second.updated_at = first.updated_at;
        assert_eq!(second, first);
    }

    #[test]
    fn encode_refreshes_updated_at() {
        let mut phases = sample();
        let stale = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        phases.updated_at = stale;
        let text = phases.encode();
        assert!(phases.updated_at > stale);
        assert!(!text.contains("2000-01-01"));
    }

    #[test]
    fn decodes_legacy_phase_heading_and_status_spelling() {
        let text = "\
# Project Phases: legacy

## Phases

### Phase 01: foundation
- **Status:** active
- **Description**: Set things up

### Phase 2: polish
- **Status**: Completed
";
        let phases = ProjectPhases::decode(text).unwrap();
        assert_eq!(phases.project_name, "legacy");
        assert_eq!(phases.phases.len(), 2);
        assert_eq!(phases.phases[0].id, "01");
        assert_eq!(phases.phases[0].status, PhaseStatus::InProgress);
        assert_eq!(
            phases.phases[0].description.as_deref(),
            Some("Set things up")
        );
        assert_eq!(phases.phases[1].id, "02");
        assert_eq!(phases.phases[1].status, PhaseStatus::Completed);
    }

    #[test]
    fn bulleted_status_wins_and_missing_status_is_pending() {
        let text = "\
### 1. alpha

**Status**: locked
- **Status**: pending

### 2. beta

Nothing here.
";
        let phases = ProjectPhases::decode(text).unwrap();
        assert_eq!(phases.phases[0].status, PhaseStatus::Pending);
        assert_eq!(phases.phases[1].status, PhaseStatus::Pending);
        assert!(phases.phases[1].description.is_none());
        assert!(phases.phases[1].deliverables.is_empty());
    }

    #[test]
    fn lists_stop_at_first_non_item() {
        let text = "\
### 1. alpha

**Status**: in_progress

**Deliverables**:

- README.md
- [x] docs/ folder
Some prose that is not an item.
- stray bullet

**Done Criteria**:
- [ ] Tests pass
- [x] README.md exists
";
        let phases = ProjectPhases::decode(text).unwrap();
        let alpha = &phases.phases[0];
        assert_eq!(alpha.deliverables, vec!["README.md", "[x] docs/ folder"]);
        assert_eq!(alpha.done_criteria, vec!["Tests pass", "README.md exists"]);
    }

    #[test]
    fn bare_status_used_when_no_bulleted_one() {
        let text = "### 1. alpha\n\n**Status**: locked\n**Status**: pending\n";
        let phases = ProjectPhases::decode(text).unwrap();
        assert_eq!(phases.phases[0].status, PhaseStatus::Locked);
    }

    #[test]
    fn awkward_item_texts_roundtrip() {
        let mut original = ProjectPhases::new("awkward");
        let mut phase = PhaseRecord::new("1", "foundation");
        phase.description = Some(String::new());
        phase.deliverables = vec![
            "[x] shipped".to_string(),
            "**Note**: README.md".to_string(),
            "- nested dash".to_string(),
            "after".to_string(),
        ];
        phase.done_criteria = vec![
            "[ ] looks unchecked".to_string(),
            "**Owner**: qa".to_string(),
            "last".to_string(),
        ];
        original.phases.push(phase);
        original.phases.push(PhaseRecord::new("2", "next"));

        let text = original.encode();
        let decoded = ProjectPhases::decode(&text).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn list_ends_at_next_list_label() {
        let text = "\
### 1. alpha

- **Deliverables**:
- README.md
- **Done Criteria**:
- [ ] docs written
";
        let phases = ProjectPhases::decode(text).unwrap();
        assert_eq!(phases.phases[0].deliverables, vec!["README.md"]);
        assert_eq!(phases.phases[0].done_criteria, vec!["docs written"]);
    }

    #[test]
    fn metadata_defaults_when_absent() {
        let phases = ProjectPhases::decode("### 1. only\n").unwrap();
        assert_eq!(phases.project_name, "");
        assert!(phases.created_at <= timestamp::now());
    }

    #[test]
    fn metadata_parsed() {
        let text = "\
# Project Phases: meta

- **Created**: 2024-05-06T07:08:09Z
- **Updated**: 2024-05-07

### 1. only
";
        let phases = ProjectPhases::decode(text).unwrap();
        assert_eq!(
            phases.created_at,
            Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap()
        );
        assert_eq!(
            phases.updated_at,
            Utc.with_ymd_and_hms(2024, 5, 7, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn decodes_json_literal() {
        let text = r#"{
  "project_name": "old",
  "phases": [
    {"id": "1", "name": "foundation", "status": "active",
     "started_at": "2025-01-01T00:00:00.000Z",
     "deliverables": ["README.md"]},
    {"id": "02", "name": "build", "status": "pending"}
  ],
  "created_at": "2025-01-01T00:00:00.000Z",
  "updated_at": "2025-01-02T00:00:00.000Z"
}"#;
        let phases = ProjectPhases::decode(text).unwrap();
        assert_eq!(phases.project_name, "old");
        assert_eq!(phases.phases[0].id, "01");
        assert_eq!(phases.phases[0].status, PhaseStatus::InProgress);
        assert_eq!(phases.phases[0].deliverables, vec!["README.md"]);
        assert_eq!(phases.phases[1].status, PhaseStatus::Pending);
    }

    #[test]
    fn malformed_json_is_error() {
        assert!(ProjectPhases::decode("{ not json").is_err());
    }

    #[test]
    fn unknown_status_is_error() {
        let err = ProjectPhases::decode("### 1. x\n**Status**: ???\n").unwrap_err();
        assert!(matches!(err, OverseerError::InvalidStatus(_)));
    }

    #[test]
    fn status_with_trailing_prose() {
        let phases =
            ProjectPhases::decode("### 1. x\n**Status**: locked (signed off by QA)\n").unwrap();
        assert_eq!(phases.phases[0].status, PhaseStatus::Locked);
    }

    #[test]
    fn duplicate_ids_rejected() {
        let err = ProjectPhases::decode("### 1. a\n### 01. b\n").unwrap_err();
        assert!(err.to_string().contains("duplicate phase id 01"));
    }

    #[test]
    fn next_id_follows_highest() {
        let phases = sample();
        assert_eq!(phases.next_id(), "04");
        assert_eq!(ProjectPhases::new("x").next_id(), "01");
    }

    #[test]
    fn find_pads_ids() {
        let phases = sample();
        assert_eq!(phases.find("2").unwrap().name, "implementation");
        assert_eq!(phases.position("03"), Some(2));
        assert!(phases.find("9").is_none());
    }

    #[test]
    fn layout_of_encoded_index_is_complete() {
        let mut phases = sample();
        assert!(missing_layout(&phases.encode()).is_empty());
        assert_eq!(
            missing_layout("# Roadmap\n\n### 1. a\n**Status**: pending\n"),
            vec!["main heading", "Metadata section"]
        );
    }
}

use crate::error::{OverseerError, Result};
use crate::grammar;
use crate::index::PhaseRecord;
use crate::timestamp;
use crate::types::{ItemKind, PhaseStatus};
use serde::{Deserialize, Serialize};

pub const DESCRIPTION: &str = "Description";
pub const PROGRESS: &str = "Progress";
pub const COMPLETION_SUMMARY: &str = "Completion Summary";
pub const NO_DESCRIPTION: &str = "*No description provided.*";

pub const PROGRESS_STARTED: &str = "Phase started";
pub const PROGRESS_DELIVERABLES: &str = "Deliverables completed";
pub const PROGRESS_CRITERIA: &str = "Done criteria met";
pub const PROGRESS_COMPLETED: &str = "Phase completed";

const DOC_FOOTER: &str = "*This phase file is managed by Overseer.*";

// ---------------------------------------------------------------------------
// Document model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub text: String,
    pub checked: bool,
}

impl ChecklistItem {
    pub fn new(text: impl Into<String>, checked: bool) -> Self {
        Self {
            text: text.into(),
            checked,
        }
    }
}

/// A `**Label**: value` line from the document header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaField {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionBody {
    /// Free-form markdown, kept verbatim.
    Text(String),
    /// Checkbox items plus any non-item lines found among them.
    Checklist {
        items: Vec<ChecklistItem>,
        notes: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub heading: String,
    pub body: SectionBody,
}

impl Section {
    fn checklist(heading: &str, items: Vec<ChecklistItem>) -> Self {
        Self {
            heading: heading.to_string(),
            body: SectionBody::Checklist {
                items,
                notes: Vec::new(),
            },
        }
    }

    fn text(heading: &str, text: impl Into<String>) -> Self {
        Self {
            heading: heading.to_string(),
            body: SectionBody::Text(text.into()),
        }
    }

    fn is(&self, heading: &str) -> bool {
        self.heading.eq_ignore_ascii_case(heading)
    }
}

fn is_checklist_heading(heading: &str) -> bool {
    [
        ItemKind::Deliverable.heading(),
        ItemKind::DoneCriterion.heading(),
        PROGRESS,
    ]
    .iter()
    .any(|h| heading.eq_ignore_ascii_case(h))
}

/// The long-form markdown document of one phase.
///
/// Layout: `# title`, header fields, `---`, `## ` sections, and an optional
/// footer after a trailing `---`. The `Status` header field mirrors the
/// index record; the record stays authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseDocument {
    pub title: String,
    pub fields: Vec<MetaField>,
    /// Non-field header lines, kept in order.
    pub preamble: Vec<String>,
    pub sections: Vec<Section>,
    pub footer: Option<String>,
}

impl PhaseDocument {
    // -----------------------------------------------------------------------
    // Rendering a new document
    // -----------------------------------------------------------------------

    /// Initial document for a freshly planned phase.
    pub fn render_new(project_name: &str, record: &PhaseRecord) -> Self {
        let mut doc = PhaseDocument {
            title: format!("Phase {}: {}", record.id, record.name),
            fields: Vec::new(),
            preamble: Vec::new(),
            sections: Vec::new(),
            footer: Some(DOC_FOOTER.to_string()),
        };
        doc.set_field("Project", project_name);
        doc.set_field("Phase ID", &record.id);
        doc.set_status(record.status);
        doc.set_field("Created", &timestamp::format(&timestamp::now()));

        let description = record
            .description
            .clone()
            .unwrap_or_else(|| NO_DESCRIPTION.to_string());
        doc.sections.push(Section::text(DESCRIPTION, description));

        let unchecked = |items: &[String]| {
            items
                .iter()
                .map(|t| ChecklistItem::new(t.clone(), false))
                .collect::<Vec<_>>()
        };
        if !record.deliverables.is_empty() {
            doc.sections.push(Section::checklist(
                ItemKind::Deliverable.heading(),
                unchecked(&record.deliverables),
            ));
        }
        if !record.done_criteria.is_empty() {
            doc.sections.push(Section::checklist(
                ItemKind::DoneCriterion.heading(),
                unchecked(&record.done_criteria),
            ));
        }
        doc.sections.push(progress_section());
        doc
    }

    // -----------------------------------------------------------------------
    // Decode
    // -----------------------------------------------------------------------

    pub fn decode(text: &str) -> Result<Self> {
        let lines: Vec<&str> = text.lines().collect();

        let title_at = lines.iter().position(|l| grammar::title(l).is_some());
        let first_h2 = lines.iter().position(|l| grammar::h2(l).is_some());
        if title_at.is_none() && first_h2.is_none() {
            return Err(OverseerError::Parse(
                "no title or sections found; not a phase document".to_string(),
            ));
        }

        let title = title_at
            .filter(|&t| first_h2.map(|h| t < h).unwrap_or(true))
            .and_then(|t| grammar::title(lines[t]))
            .unwrap_or_default()
            .to_string();

        let header_start = title_at
            .filter(|&t| first_h2.map(|h| t < h).unwrap_or(true))
            .map(|t| t + 1)
            .unwrap_or(0);
        let header_end = first_h2.unwrap_or(lines.len());

        let mut fields = Vec::new();
        let mut preamble = Vec::new();
        for line in &lines[header_start..header_end] {
            if line.trim().is_empty() || grammar::is_separator(line) {
                continue;
            }
            match grammar::field(line) {
                Some(f) => fields.push(MetaField {
                    label: f.label.to_string(),
                    value: f.value.trim().to_string(),
                }),
                None => preamble.push(line.trim_end().to_string()),
            }
        }

        // The footer starts after the last separator that follows the last
        // section heading.
        let (body_end, footer) = match first_h2 {
            Some(_) => {
                let last_h2 = lines
                    .iter()
                    .rposition(|l| grammar::h2(l).is_some())
                    .unwrap_or(0);
                match lines[last_h2..]
                    .iter()
                    .rposition(|l| grammar::is_separator(l))
                    .map(|p| last_h2 + p)
                {
                    Some(sep) => (sep, Some(lines[sep + 1..].join("\n").trim().to_string())),
                    None => (lines.len(), None),
                }
            }
            None => (lines.len(), None),
        };

        let mut sections = Vec::new();
        if let Some(start) = first_h2 {
            let mut i = start;
            while i < body_end {
                let heading = grammar::h2(lines[i]).unwrap_or_default().to_string();
                let end = lines[i + 1..body_end]
                    .iter()
                    .position(|l| grammar::h2(l).is_some())
                    .map(|p| i + 1 + p)
                    .unwrap_or(body_end);
                sections.push(decode_section(heading, &lines[i + 1..end]));
                i = end;
            }
        }

        Ok(PhaseDocument {
            title,
            fields,
            preamble,
            sections,
            footer,
        })
    }

    // -----------------------------------------------------------------------
    // Encode
    // -----------------------------------------------------------------------

    pub fn encode(&self) -> String {
        let mut out = Vec::new();
        out.push(format!("# {}", grammar::one_line(&self.title)));
        out.push(String::new());
        for field in &self.fields {
            out.push(format!("**{}**: {}", field.label, grammar::one_line(&field.value)));
        }
        out.extend(self.preamble.iter().cloned());
        out.push(String::new());
        out.push("---".to_string());
        out.push(String::new());

        for section in &self.sections {
            out.push(format!("## {}", section.heading));
            out.push(String::new());
            match &section.body {
                SectionBody::Text(text) => {
                    if !text.is_empty() {
                        out.push(text.clone());
                        out.push(String::new());
                    }
                }
                SectionBody::Checklist { items, notes } => {
                    for item in items {
                        let mark = if item.checked { "x" } else { " " };
                        out.push(format!("- [{mark}] {}", grammar::one_line(&item.text)));
                    }
                    out.extend(notes.iter().cloned());
                    if !items.is_empty() || !notes.is_empty() {
                        out.push(String::new());
                    }
                }
            }
        }

        if let Some(footer) = &self.footer {
            out.push("---".to_string());
            out.push(String::new());
            if !footer.is_empty() {
                out.push(footer.clone());
                out.push(String::new());
            }
        }

        let mut text = out.join("\n");
        if !text.ends_with('\n') {
            text.push('\n');
        }
        text
    }

    // -----------------------------------------------------------------------
    // Header fields
    // -----------------------------------------------------------------------

    pub fn field(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.label.eq_ignore_ascii_case(label))
            .map(|f| f.value.as_str())
    }

    /// Replace the first field with `label`, or append a new one.
    pub fn set_field(&mut self, label: &str, value: &str) {
        match self
            .fields
            .iter_mut()
            .find(|f| f.label.eq_ignore_ascii_case(label))
        {
            Some(f) => f.value = value.to_string(),
            None => self.fields.push(MetaField {
                label: label.to_string(),
                value: value.to_string(),
            }),
        }
    }

    pub fn remove_field(&mut self, label: &str) {
        self.fields.retain(|f| !f.label.eq_ignore_ascii_case(label));
    }

    /// The document's status marker, if it names a known status.
    pub fn status(&self) -> Option<PhaseStatus> {
        let raw = self.field("Status")?;
        raw.parse::<PhaseStatus>()
            .ok()
            .or_else(|| grammar::first_word(raw).and_then(|w| w.parse().ok()))
    }

    pub fn set_status(&mut self, status: PhaseStatus) {
        self.set_field("Status", status.as_str());
    }

    // -----------------------------------------------------------------------
    // Sections
    // -----------------------------------------------------------------------

    pub fn section(&self, heading: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.is(heading))
    }

    pub fn description(&self) -> Option<&str> {
        match &self.section(DESCRIPTION)?.body {
            SectionBody::Text(text) => Some(text.as_str()),
            SectionBody::Checklist { .. } => None,
        }
    }

    pub fn set_description(&mut self, text: &str) {
        match self.sections.iter_mut().find(|s| s.is(DESCRIPTION)) {
            Some(section) => section.body = SectionBody::Text(text.to_string()),
            None => self.sections.insert(0, Section::text(DESCRIPTION, text)),
        }
    }

    fn checklist(&self, heading: &str) -> &[ChecklistItem] {
        match self.section(heading).map(|s| &s.body) {
            Some(SectionBody::Checklist { items, .. }) => items.as_slice(),
            _ => &[],
        }
    }

    fn checklist_mut(&mut self, heading: &str) -> Option<&mut Vec<ChecklistItem>> {
        match self.sections.iter_mut().find(|s| s.is(heading)).map(|s| &mut s.body) {
            Some(SectionBody::Checklist { items, .. }) => Some(items),
            _ => None,
        }
    }

    pub fn items(&self, kind: ItemKind) -> &[ChecklistItem] {
        self.checklist(kind.heading())
    }

    pub fn progress(&self) -> &[ChecklistItem] {
        self.checklist(PROGRESS)
    }

    /// Set the checked mark of every item of `kind` whose text is `text`.
    /// Returns whether any item matched.
    pub fn set_checked(&mut self, kind: ItemKind, text: &str, checked: bool) -> bool {
        let Some(items) = self.checklist_mut(kind.heading()) else {
            return false;
        };
        let mut found = false;
        for item in items.iter_mut().filter(|i| i.text == text) {
            item.checked = checked;
            found = true;
        }
        found
    }

    /// Replace the items of `kind`, keeping the checked mark of any item
    /// whose text is unchanged. An empty list removes the section.
    pub fn sync_items(&mut self, kind: ItemKind, texts: &[String]) {
        let heading = kind.heading();
        if texts.is_empty() {
            self.sections.retain(|s| !s.is(heading));
            return;
        }

        let previous = self.checklist(heading).to_vec();
        let items: Vec<ChecklistItem> = texts
            .iter()
            .map(|text| {
                let checked = previous.iter().any(|p| &p.text == text && p.checked);
                ChecklistItem::new(text.clone(), checked)
            })
            .collect();

        if let Some(existing) = self.checklist_mut(heading) {
            *existing = items;
            return;
        }

        // New checklist goes after the description and any earlier checklist
        // of the same family, ahead of Progress and the completion summary.
        let insert_at = self
            .sections
            .iter()
            .position(|s| {
                s.is(PROGRESS)
                    || s.is(COMPLETION_SUMMARY)
                    || (kind == ItemKind::Deliverable && s.is(ItemKind::DoneCriterion.heading()))
            })
            .unwrap_or(self.sections.len());
        self.sections
            .insert(insert_at, Section::checklist(heading, items));
    }

    /// Check a Progress item by label. Returns whether it exists.
    pub fn mark_progress(&mut self, label: &str) -> bool {
        let Some(items) = self.checklist_mut(PROGRESS) else {
            return false;
        };
        let mut found = false;
        for item in items
            .iter_mut()
            .filter(|i| i.text.eq_ignore_ascii_case(label))
        {
            item.checked = true;
            found = true;
        }
        found
    }

    /// Add the standard unchecked Progress checklist when the document has
    /// none. It goes ahead of the completion summary. Returns whether the
    /// section was added.
    pub fn ensure_progress(&mut self) -> bool {
        if self.section(PROGRESS).is_some() {
            return false;
        }
        let insert_at = self
            .sections
            .iter()
            .position(|s| s.is(COMPLETION_SUMMARY))
            .unwrap_or(self.sections.len());
        self.sections.insert(insert_at, progress_section());
        true
    }

    pub fn mark_all_progress(&mut self) {
        if let Some(items) = self.checklist_mut(PROGRESS) {
            items.iter_mut().for_each(|i| i.checked = true);
        }
    }

    pub fn completion_summary(&self) -> Option<&str> {
        match &self.section(COMPLETION_SUMMARY)?.body {
            SectionBody::Text(text) => Some(text.as_str()),
            SectionBody::Checklist { .. } => None,
        }
    }

    /// Set the completion summary. It is always the last section, so it is
    /// written just before the trailing separator when one exists.
    pub fn set_completion_summary(&mut self, text: &str) {
        self.sections.retain(|s| !s.is(COMPLETION_SUMMARY));
        self.sections.push(Section::text(COMPLETION_SUMMARY, text));
    }
}

fn progress_section() -> Section {
    Section::checklist(
        PROGRESS,
        [
            PROGRESS_STARTED,
            PROGRESS_DELIVERABLES,
            PROGRESS_CRITERIA,
            PROGRESS_COMPLETED,
        ]
        .iter()
        .map(|l| ChecklistItem::new(*l, false))
        .collect(),
    )
}

fn decode_section(heading: String, body: &[&str]) -> Section {
    if is_checklist_heading(&heading) {
        let mut items = Vec::new();
        let mut notes = Vec::new();
        for line in body {
            if line.trim().is_empty() || grammar::is_separator(line) {
                continue;
            }
            if let Some((checked, text)) = grammar::checkbox(line) {
                items.push(ChecklistItem::new(text, checked));
            } else if let Some(text) = grammar::bullet(line) {
                items.push(ChecklistItem::new(text, false));
            } else {
                notes.push(line.trim_end().to_string());
            }
        }
        return Section {
            heading,
            body: SectionBody::Checklist { items, notes },
        };
    }

    // Trim surrounding blank lines and stray separators, keep the rest verbatim.
    let mut start = 0;
    let mut end = body.len();
    while start < end && body[start].trim().is_empty() {
        start += 1;
    }
    while end > start && (body[end - 1].trim().is_empty() || grammar::is_separator(body[end - 1])) {
        end -= 1;
    }
    let text = body[start..end]
        .iter()
        .map(|l| l.trim_end())
        .collect::<Vec<_>>()
        .join("\n");
    Section {
        heading,
        body: SectionBody::Text(text),
    }
}

/// Summary text appended when a phase is locked.
pub fn completion_summary_text(record: &PhaseRecord) -> String {
    let completed = record.completed_at.unwrap_or_else(timestamp::now);
    format!(
        "**Completed**: {}\n**Phase**: {}\n\nAll deliverables and done criteria have been met. Phase is now locked.",
        timestamp::format(&completed),
        record.name
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

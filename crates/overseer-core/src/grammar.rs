//! Line-level token patterns shared by the index and phase document codecs.
//!
//! Every markdown shape the codecs recognize is defined here; a change to
//! the document format starts in this file.

use regex::Regex;
use std::sync::OnceLock;

static TITLE_RE: OnceLock<Regex> = OnceLock::new();
static H2_RE: OnceLock<Regex> = OnceLock::new();
static H3_RE: OnceLock<Regex> = OnceLock::new();
static PHASE_HEADING_RE: OnceLock<Regex> = OnceLock::new();
static FIELD_RE: OnceLock<Regex> = OnceLock::new();
static CHECKBOX_RE: OnceLock<Regex> = OnceLock::new();
static BULLET_RE: OnceLock<Regex> = OnceLock::new();
static SEPARATOR_RE: OnceLock<Regex> = OnceLock::new();
static WORD_RE: OnceLock<Regex> = OnceLock::new();
static PHASE_TITLE_RE: OnceLock<Regex> = OnceLock::new();

fn title_re() -> &'static Regex {
    TITLE_RE.get_or_init(|| Regex::new(r"^#\s+(.+?)\s*$").unwrap())
}

fn h2_re() -> &'static Regex {
    H2_RE.get_or_init(|| Regex::new(r"^##\s+(.+?)\s*$").unwrap())
}

fn h3_re() -> &'static Regex {
    H3_RE.get_or_init(|| Regex::new(r"^###\s").unwrap())
}

// `### 1. name` and `### Phase 01: name`
fn phase_heading_re() -> &'static Regex {
    PHASE_HEADING_RE.get_or_init(|| {
        Regex::new(r"^###\s+(?:[Pp]hase\s+)?(\d+)\s*[:.]\s*(.+?)\s*$").unwrap()
    })
}

// `**Label**: value`, `**Label:** value`, optionally bulleted.
fn field_re() -> &'static Regex {
    FIELD_RE.get_or_init(|| {
        Regex::new(r"^\s*(?:[-*]\s+)?\*\*([^*:]+?)(?::\*\*|\*\*\s*:)[ \t]*(.*?)\s*$").unwrap()
    })
}

fn checkbox_re() -> &'static Regex {
    CHECKBOX_RE.get_or_init(|| Regex::new(r"^\s*[-*]\s+\[([ xX])\]\s+(.+?)\s*$").unwrap())
}

fn bullet_re() -> &'static Regex {
    BULLET_RE.get_or_init(|| Regex::new(r"^\s*[-*]\s+(.+?)\s*$").unwrap())
}

fn separator_re() -> &'static Regex {
    SEPARATOR_RE.get_or_init(|| Regex::new(r"^\s*-{3,}\s*$").unwrap())
}

fn word_re() -> &'static Regex {
    WORD_RE.get_or_init(|| Regex::new(r"[A-Za-z_\-]+").unwrap())
}

fn phase_title_re() -> &'static Regex {
    PHASE_TITLE_RE.get_or_init(|| Regex::new(r"^Phase\s+\d+\s*:").unwrap())
}

// ---------------------------------------------------------------------------
// Matchers
// ---------------------------------------------------------------------------

/// `# Title` (level one only).
pub fn title(line: &str) -> Option<&str> {
    title_re()
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// `## Heading` (level two only).
pub fn h2(line: &str) -> Option<&str> {
    h2_re()
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Whether a document title has the `Phase NN: name` shape.
pub fn is_phase_title(title: &str) -> bool {
    phase_title_re().is_match(title)
}

/// Any level-three heading, phase or not.
pub fn is_h3(line: &str) -> bool {
    h3_re().is_match(line)
}

/// A phase heading in either historical spelling: `(number, name)`.
pub fn phase_heading(line: &str) -> Option<(&str, &str)> {
    let caps = phase_heading_re().captures(line)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field<'a> {
    pub label: &'a str,
    pub value: &'a str,
}

impl Field<'_> {
    pub fn is(&self, label: &str) -> bool {
        self.label.trim().eq_ignore_ascii_case(label)
    }
}

/// A bold-label field line.
pub fn field(line: &str) -> Option<Field<'_>> {
    let caps = field_re().captures(line)?;
    Some(Field {
        label: caps.get(1)?.as_str().trim(),
        value: caps.get(2).map(|m| m.as_str()).unwrap_or(""),
    })
}

/// A checkbox bullet: `(checked, text)`.
pub fn checkbox(line: &str) -> Option<(bool, &str)> {
    let caps = checkbox_re().captures(line)?;
    let checked = caps.get(1)?.as_str() != " ";
    Some((checked, caps.get(2)?.as_str()))
}

/// A plain bullet's text. Checkbox bullets also match; use [`checkbox`]
/// first when the distinction matters.
pub fn bullet(line: &str) -> Option<&str> {
    bullet_re()
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Bullet text with any leading checkbox stripped.
pub fn item_text(line: &str) -> Option<&str> {
    match checkbox(line) {
        Some((_, text)) => Some(text),
        None => bullet(line),
    }
}

/// A horizontal rule (`---`).
pub fn is_separator(line: &str) -> bool {
    separator_re().is_match(line)
}

/// First word of a field value, used when a status carries trailing prose
/// (`**Status**: locked (signed off)`).
pub fn first_word(value: &str) -> Option<&str> {
    word_re().find(value).map(|m| m.as_str())
}

/// Collapse a value onto one line so it survives a single-line field.
pub fn one_line(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_heading_spellings() {
        assert_eq!(phase_heading("### 1. foundation"), Some(("1", "foundation")));
        assert_eq!(
            phase_heading("### Phase 02: Build the thing"),
            Some(("02", "Build the thing"))
        );
        assert_eq!(phase_heading("### 3: testing  "), Some(("3", "testing")));
        assert_eq!(phase_heading("### Notes"), None);
        assert_eq!(phase_heading("## 1. foundation"), None);
        assert_eq!(phase_heading("#### 1. nested"), None);
    }

    #[test]
    fn phase_title_shape() {
        assert!(is_phase_title("Phase 01: foundation"));
        assert!(is_phase_title("Phase 3 : testing"));
        assert!(!is_phase_title("Foundation notes"));
        assert!(!is_phase_title("Phase one: foundation"));
    }

    #[test]
    fn field_spellings() {
        let f = field("**Status**: in_progress").unwrap();
        assert!(f.is("status"));
        assert_eq!(f.value, "in_progress");

        let f = field("- **Status:** locked").unwrap();
        assert!(f.is("Status"));
        assert_eq!(f.value, "locked");

        let f = field("* **Done Criteria**:").unwrap();
        assert!(f.is("done criteria"));
        assert_eq!(f.value, "");

        assert!(field("Status: pending").is_none());
        assert!(field("**bold** text").is_none());
    }

    #[test]
    fn checkbox_and_bullets() {
        assert_eq!(checkbox("- [ ] README.md"), Some((false, "README.md")));
        assert_eq!(checkbox("- [x] src/ exists"), Some((true, "src/ exists")));
        assert_eq!(checkbox("  * [X] done"), Some((true, "done")));
        assert_eq!(checkbox("- plain"), None);
        assert_eq!(bullet("- plain item "), Some("plain item"));
        assert_eq!(item_text("- [x] checked"), Some("checked"));
        assert_eq!(item_text("- plain"), Some("plain"));
        assert_eq!(item_text("plain"), None);
    }

    #[test]
    fn headings() {
        assert_eq!(title("# Project Phases: demo"), Some("Project Phases: demo"));
        assert_eq!(title("## Metadata"), None);
        assert_eq!(h2("## Done Criteria"), Some("Done Criteria"));
        assert_eq!(h2("### 1. x"), None);
        assert!(is_h3("### anything"));
        assert!(!is_h3("#### deeper"));
    }

    #[test]
    fn separators_and_words() {
        assert!(is_separator("---"));
        assert!(is_separator("  -----  "));
        assert!(!is_separator("- --"));
        assert_eq!(first_word("locked (signed off)"), Some("locked"));
        assert_eq!(first_word("in-progress"), Some("in-progress"));
        assert_eq!(one_line("a\n  b\tc"), "a b c");
    }
}

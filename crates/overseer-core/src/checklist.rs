//! Evidence checks for deliverables and done criteria.
//!
//! An item names a file, a conventional directory, or neither. Only the first
//! two can be verified against the project root; everything else relies on
//! a human check-off in the phase document.

use crate::error::Result;
use crate::io;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

static FILE_REF_RE: OnceLock<Regex> = OnceLock::new();
static DIR_REF_RE: OnceLock<Regex> = OnceLock::new();

fn file_ref_re() -> &'static Regex {
    FILE_REF_RE.get_or_init(|| {
        Regex::new(
            r"[A-Za-z0-9_\-./]+\.(?:md|ts|js|json|yml|yaml|txt|py|java|go|rs|php|rb|ex|exs|toml)\b",
        )
        .unwrap()
    })
}

fn dir_ref_re() -> &'static Regex {
    DIR_REF_RE.get_or_init(|| Regex::new(r"\b(src|app|lib|tests|docs|config|dist|build)/").unwrap())
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// What an item text points at on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// Every referenced file, in order of appearance.
    Files(Vec<String>),
    Directory(String),
    Unverifiable,
}

/// True when `file` stays inside whatever root it is joined to.
fn stays_inside(file: &str) -> bool {
    Path::new(file)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

pub fn classify(text: &str) -> Reference {
    let files: Vec<String> = file_ref_re()
        .find_iter(text)
        .map(|m| m.as_str().trim_start_matches('/').to_string())
        .filter(|f| !f.is_empty())
        .collect();
    if files.iter().any(|f| !stays_inside(f)) {
        return Reference::Unverifiable;
    }
    if !files.is_empty() {
        return Reference::Files(files);
    }
    if let Some(caps) = dir_ref_re().captures(text) {
        if let Some(dir) = caps.get(1) {
            return Reference::Directory(dir.as_str().to_string());
        }
    }
    Reference::Unverifiable
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
    Verified { evidence: String },
    MissingFiles { files: Vec<String> },
    MissingDirectory { dir: String },
    Unverifiable,
}

impl Finding {
    pub fn is_verified(&self) -> bool {
        matches!(self, Finding::Verified { .. })
    }

    /// Why the item cannot be accepted, for findings that name a reference.
    pub fn reason(&self) -> Option<String> {
        match self {
            Finding::MissingFiles { files } => Some(format!("file missing: {}", files.join(", "))),
            Finding::MissingDirectory { dir } => Some(format!("directory missing: {dir}/")),
            Finding::Verified { .. } | Finding::Unverifiable => None,
        }
    }

    /// Combine the finding with the document's checked mark. Verified items
    /// are complete, missing references are incomplete, and unverifiable
    /// items keep whatever a human marked.
    pub fn resolve(&self, checked: bool) -> bool {
        match self {
            Finding::Verified { .. } => true,
            Finding::MissingFiles { .. } | Finding::MissingDirectory { .. } => false,
            Finding::Unverifiable => checked,
        }
    }
}

pub fn verify(root: &Path, text: &str) -> Finding {
    match classify(text) {
        Reference::Files(files) => {
            let missing: Vec<String> = files
                .iter()
                .filter(|f| !root.join(f).is_file())
                .cloned()
                .collect();
            if missing.is_empty() {
                Finding::Verified {
                    evidence: format!("file exists: {}", files.join(", ")),
                }
            } else {
                Finding::MissingFiles { files: missing }
            }
        }
        Reference::Directory(dir) => {
            if root.join(&dir).is_dir() {
                Finding::Verified {
                    evidence: format!("directory exists: {dir}/"),
                }
            } else {
                Finding::MissingDirectory { dir }
            }
        }
        Reference::Unverifiable => Finding::Unverifiable,
    }
}

// ---------------------------------------------------------------------------
// Placeholders
// ---------------------------------------------------------------------------

/// Placeholder content for a missing file, shaped by its extension.
pub fn placeholder(file: &str, item: &str) -> String {
    let ext = Path::new(file)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let note = "Created by Overseer as a placeholder during phase execution.";
    match ext.as_str() {
        "md" => format!("# {item}\n\nTODO: {item}\n\n*{note}*\n"),
        "json" => format!(
            "{{\n  \"todo\": {},\n  \"created_by\": \"overseer\"\n}}\n",
            json_string(item)
        ),
        "ts" | "js" | "java" | "go" | "rs" | "php" => format!("// TODO: {item}\n// {note}\n"),
        "py" | "rb" | "ex" | "exs" | "yml" | "yaml" | "toml" => {
            format!("# TODO: {item}\n# {note}\n")
        }
        _ => format!("TODO: {item}\n\n{note}\n"),
    }
}

fn json_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

/// Write a placeholder for `file` unless something already exists there.
/// Returns the path when a file was created.
pub fn write_placeholder(root: &Path, file: &str, item: &str) -> Result<Option<PathBuf>> {
    if !stays_inside(file) {
        tracing::warn!(file, "refusing placeholder outside the project root");
        return Ok(None);
    }
    let path = root.join(file);
    if io::write_if_missing(&path, placeholder(file, item).as_bytes())? {
        tracing::info!(path = %path.display(), "created placeholder");
        Ok(Some(path))
    } else {
        Ok(None)
    }
}

/// Create a missing conventional directory. Returns the path when created.
pub fn create_directory(root: &Path, dir: &str) -> Result<Option<PathBuf>> {
    let path = root.join(dir);
    if path.is_dir() {
        return Ok(None);
    }
    io::ensure_dir(&path)?;
    tracing::info!(path = %path.display(), "created directory");
    Ok(Some(path))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

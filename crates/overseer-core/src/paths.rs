use crate::config::Conventions;
use crate::error::{OverseerError, Result};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// File naming constants
// ---------------------------------------------------------------------------

pub const DEFAULT_INDEX_FILE: &str = "PHASES.md";
pub const DEFAULT_PHASE_FILE_PATTERN: &str = "PHASE-{id}.md";

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Expand a leading `~` to the current user's home directory.
pub fn expand_home(path: &str) -> Result<PathBuf> {
    if path == "~" {
        return home::home_dir().ok_or(OverseerError::HomeNotFound);
    }
    if let Some(rest) = path.strip_prefix("~/") {
        let home = home::home_dir().ok_or(OverseerError::HomeNotFound)?;
        return Ok(home.join(rest));
    }
    Ok(PathBuf::from(path))
}

/// Resolve a project identifier to its root directory.
///
/// Absolute paths are used as-is, `~` paths are expanded, anything else is a
/// name relative to `base_dir`. Components may contain spaces.
pub fn resolve_project_root(project: &str, base_dir: &Path) -> Result<PathBuf> {
    let project = project.trim();
    if project.starts_with('~') {
        return expand_home(project);
    }
    let candidate = Path::new(project);
    if candidate.is_absolute() {
        return Ok(candidate.to_path_buf());
    }
    Ok(base_dir.join(candidate))
}

/// Display name for a project root: its final path component.
pub fn project_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Zero-pad a numeric phase id to two digits ("1" → "01"). Non-numeric ids
/// are returned trimmed and unchanged.
pub fn pad_id(id: &str) -> String {
    let id = id.trim();
    if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) {
        format!("{id:0>2}")
    } else {
        id.to_string()
    }
}

pub fn index_path(root: &Path, conventions: &Conventions) -> PathBuf {
    root.join(&conventions.index_file)
}

pub fn phase_doc_path(root: &Path, conventions: &Conventions, id: &str, name: &str) -> PathBuf {
    let file = conventions
        .phase_file_pattern
        .replace("{id}", &pad_id(id))
        .replace("{name}", name);
    root.join(file)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_project_used_as_is() {
        let root = resolve_project_root("/work/Forge Panel/app", Path::new("/base")).unwrap();
        assert_eq!(root, PathBuf::from("/work/Forge Panel/app"));
    }

    #[test]
    fn relative_project_joins_base() {
        let root = resolve_project_root("demo", Path::new("/base")).unwrap();
        assert_eq!(root, PathBuf::from("/base/demo"));
    }

    #[test]
    fn tilde_project_expands_home() {
        let home = home::home_dir().unwrap();
        let root = resolve_project_root("~/code/demo", Path::new("/base")).unwrap();
        assert_eq!(root, home.join("code/demo"));
    }

    #[test]
    fn pad_numeric_ids() {
        assert_eq!(pad_id("1"), "01");
        assert_eq!(pad_id("01"), "01");
        assert_eq!(pad_id("12"), "12");
        assert_eq!(pad_id("123"), "123");
        assert_eq!(pad_id(" 3 "), "03");
        assert_eq!(pad_id("alpha"), "alpha");
    }

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/proj");
        let conventions = Conventions::default();
        assert_eq!(
            index_path(root, &conventions),
            PathBuf::from("/tmp/proj/PHASES.md")
        );
        assert_eq!(
            phase_doc_path(root, &conventions, "1", "foundation"),
            PathBuf::from("/tmp/proj/PHASE-01.md")
        );

        let by_name = Conventions {
            index_file: "docs/PHASES.md".to_string(),
            phase_file_pattern: "docs/phases/{name}.md".to_string(),
        };
        assert_eq!(
            phase_doc_path(root, &by_name, "02", "testing"),
            PathBuf::from("/tmp/proj/docs/phases/testing.md")
        );
    }

    #[test]
    fn project_name_is_last_component() {
        assert_eq!(project_name(Path::new("/a/b/Forge Panel")), "Forge Panel");
    }
}

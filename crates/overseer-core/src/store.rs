use crate::config::{Config, Conventions};
use crate::error::{OverseerError, Result};
use crate::index::{PhaseRecord, ProjectPhases};
use crate::io;
use crate::paths;
use crate::phase_doc::PhaseDocument;
use std::path::{Path, PathBuf};

/// Persistence for one project's index and phase documents.
///
/// Holds no cached state: every read goes to disk.
#[derive(Debug, Clone)]
pub struct PhaseStore {
    root: PathBuf,
    conventions: Conventions,
}

impl PhaseStore {
    /// Resolve `project` against the configured base directory.
    pub fn open(config: &Config, project: &str) -> Result<Self> {
        if project.trim().is_empty() {
            return Err(OverseerError::ProjectNotFound(
                "project name is empty".to_string(),
            ));
        }
        let base = config.base_path()?;
        let root = paths::resolve_project_root(project, &base)?;
        Ok(Self::at(root, config.conventions.clone()))
    }

    pub fn at(root: impl Into<PathBuf>, conventions: Conventions) -> Self {
        Self {
            root: root.into(),
            conventions,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn project_name(&self) -> String {
        paths::project_name(&self.root)
    }

    pub fn index_path(&self) -> PathBuf {
        paths::index_path(&self.root, &self.conventions)
    }

    pub fn phase_doc_path(&self, record: &PhaseRecord) -> PathBuf {
        paths::phase_doc_path(&self.root, &self.conventions, &record.id, &record.name)
    }

    pub fn ensure_project_dir(&self) -> Result<()> {
        io::ensure_dir(&self.root)
    }

    // -----------------------------------------------------------------------
    // Index
    // -----------------------------------------------------------------------

    /// The project's index, or `None` when the index file does not exist.
    pub fn read_index(&self) -> Result<Option<ProjectPhases>> {
        let path = self.index_path();
        let Some(text) = io::read_optional(&path)? else {
            tracing::debug!(path = %path.display(), "no index");
            return Ok(None);
        };
        let mut phases = ProjectPhases::decode(&text).map_err(|e| malformed(&path, e))?;
        if phases.project_name.is_empty() {
            phases.project_name = self.project_name();
        }
        tracing::debug!(
            path = %path.display(),
            phases = phases.phases.len(),
            "read index"
        );
        Ok(Some(phases))
    }

    /// Like [`read_index`](Self::read_index) but a missing index is an error.
    pub fn load_index(&self) -> Result<ProjectPhases> {
        self.read_index()?.ok_or_else(|| {
            OverseerError::ProjectNotFound(format!(
                "no {} in {}",
                self.conventions.index_file,
                self.root.display()
            ))
        })
    }

    /// Encode and atomically write the index, refreshing its updated time.
    pub fn write_index(&self, phases: &mut ProjectPhases) -> Result<()> {
        let path = self.index_path();
        let text = phases.encode();
        io::atomic_write(&path, text.as_bytes())?;
        tracing::debug!(path = %path.display(), "wrote index");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Phase documents
    // -----------------------------------------------------------------------

    pub fn read_phase_document(&self, record: &PhaseRecord) -> Result<Option<PhaseDocument>> {
        let path = self.phase_doc_path(record);
        let Some(text) = io::read_optional(&path)? else {
            return Ok(None);
        };
        let doc = PhaseDocument::decode(&text).map_err(|e| malformed(&path, e))?;
        tracing::debug!(path = %path.display(), "read phase document");
        Ok(Some(doc))
    }

    pub fn write_phase_document(
        &self,
        record: &PhaseRecord,
        doc: &PhaseDocument,
    ) -> Result<PathBuf> {
        let path = self.phase_doc_path(record);
        io::atomic_write(&path, doc.encode().as_bytes())?;
        tracing::debug!(path = %path.display(), "wrote phase document");
        Ok(path)
    }

    /// Write `doc` only when no document exists yet. Returns the path when
    /// the file was created.
    pub fn create_phase_document(
        &self,
        record: &PhaseRecord,
        doc: &PhaseDocument,
    ) -> Result<Option<PathBuf>> {
        let path = self.phase_doc_path(record);
        if io::write_if_missing(&path, doc.encode().as_bytes())? {
            tracing::debug!(path = %path.display(), "created phase document");
            Ok(Some(path))
        } else {
            Ok(None)
        }
    }

    /// Delete a phase document. Returns false when there was none.
    pub fn remove_phase_document(&self, record: &PhaseRecord) -> Result<bool> {
        let path = self.phase_doc_path(record);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "removed phase document");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(OverseerError::at(&path, e)),
        }
    }

    /// Path relative to the project root, for reports.
    pub fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned()
    }
}

fn malformed(path: &Path, err: OverseerError) -> OverseerError {
    match err {
        OverseerError::Parse(reason) | OverseerError::InvalidStatus(reason) => {
            OverseerError::Malformed {
                path: path.to_path_buf(),
                reason,
            }
        }
        OverseerError::Json(e) => OverseerError::Malformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PhaseStatus;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> PhaseStore {
        PhaseStore::open(&Config::with_base_dir(dir.path()), "demo").unwrap()
    }

    #[test]
    fn open_resolves_relative_and_absolute() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::with_base_dir(dir.path());
        let s = PhaseStore::open(&cfg, "demo").unwrap();
        assert_eq!(s.root(), dir.path().join("demo"));

        let abs = dir.path().join("elsewhere/My Project");
        let s = PhaseStore::open(&cfg, abs.to_str().unwrap()).unwrap();
        assert_eq!(s.root(), abs);
        assert_eq!(s.project_name(), "My Project");
    }

    #[test]
    fn open_rejects_empty_project() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::with_base_dir(dir.path());
        assert!(matches!(
            PhaseStore::open(&cfg, "  "),
            Err(OverseerError::ProjectNotFound(_))
        ));
    }

    #[test]
    fn missing_index_is_none() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        assert!(s.read_index().unwrap().is_none());
        assert!(matches!(
            s.load_index(),
            Err(OverseerError::ProjectNotFound(_))
        ));
    }

    #[test]
    fn index_write_read() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        let mut phases = ProjectPhases::new("demo");
        phases.phases.push(PhaseRecord::new("1", "foundation"));
        s.write_index(&mut phases).unwrap();

        assert!(s.index_path().exists());
        let read = s.read_index().unwrap().unwrap();
        assert_eq!(read.project_name, "demo");
        assert_eq!(read.phases[0].id, "01");
        assert_eq!(read.phases[0].status, PhaseStatus::Pending);
    }

    #[test]
    fn untitled_index_takes_dir_name() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        std::fs::create_dir_all(s.root()).unwrap();
        std::fs::write(
            s.index_path(),
            "## Phases\n\n### 1. foundation\n**Status**: pending\n",
        )
        .unwrap();
        let read = s.read_index().unwrap().unwrap();
        assert_eq!(read.project_name, "demo");
    }

    #[test]
    fn malformed_index_names_path() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        std::fs::create_dir_all(s.root()).unwrap();
        std::fs::write(s.index_path(), "### 1. a\n**Status**: sideways\n").unwrap();
        let err = s.read_index().unwrap_err();
        assert!(matches!(err, OverseerError::Malformed { .. }));
        assert!(err.to_string().contains("PHASES.md"), "{err}");
    }

    #[test]
    fn phase_document_create_once() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        let record = PhaseRecord::new("1", "foundation");
        let doc = PhaseDocument::render_new("demo", &record);

        let created = s.create_phase_document(&record, &doc).unwrap();
        assert_eq!(created, Some(s.root().join("PHASE-01.md")));
        assert!(s.create_phase_document(&record, &doc).unwrap().is_none());

        let read = s.read_phase_document(&record).unwrap().unwrap();
        assert_eq!(read.title, "Phase 01: foundation");
    }

    #[test]
    fn ensure_project_dir_rejects_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("demo"), "not a dir").unwrap();
        assert!(matches!(
            store(&dir).ensure_project_dir(),
            Err(OverseerError::NotADirectory(_))
        ));
    }

    #[test]
    fn relative_paths() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        assert_eq!(s.relative(&s.root().join("PHASE-01.md")), "PHASE-01.md");
    }
}

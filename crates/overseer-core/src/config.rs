use crate::error::{OverseerError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "overseer.yaml";
pub const BASE_PATH_ENV: &str = "OVERSEER_BASE_PATH";

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// PhaseTemplate
// ---------------------------------------------------------------------------

/// Seed content for a phase created by `plan`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseTemplate {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub artifacts: Vec<String>,
}

impl PhaseTemplate {
    fn new(name: &str, description: &str, steps: &[&str], artifacts: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            steps: steps.iter().map(|s| s.to_string()).collect(),
            artifacts: artifacts.iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn default_phase_templates() -> BTreeMap<String, PhaseTemplate> {
    let mut m = BTreeMap::new();
    m.insert(
        "foundation".to_string(),
        PhaseTemplate::new(
            "Foundation",
            "Project foundation and setup",
            &[
                "Project structure is in place",
                "README.md describes the project",
                "Basic configuration committed",
            ],
            &["README.md", "src/ directory structure", ".gitignore"],
        ),
    );
    m.insert(
        "design".to_string(),
        PhaseTemplate::new(
            "Design",
            "Architecture and interface design",
            &[
                "Architecture documented",
                "Key interfaces agreed",
            ],
            &["docs/ARCHITECTURE.md"],
        ),
    );
    m.insert(
        "implementation".to_string(),
        PhaseTemplate::new(
            "Implementation",
            "Build the core functionality",
            &[
                "Core modules implemented",
                "Code reviewed",
            ],
            &["src/ modules"],
        ),
    );
    m.insert(
        "testing".to_string(),
        PhaseTemplate::new(
            "Testing",
            "Automated test coverage for the core",
            &[
                "Unit tests pass",
                "Integration tests pass",
            ],
            &["tests/ suite"],
        ),
    );
    m.insert(
        "deployment".to_string(),
        PhaseTemplate::new(
            "Deployment",
            "Ship to the target environment",
            &[
                "Release build produced",
                "Deployment verified",
            ],
            &["config/ for each environment", "DEPLOYMENT.md"],
        ),
    );
    m.insert(
        "documentation".to_string(),
        PhaseTemplate::new(
            "Documentation",
            "User and developer documentation",
            &["Usage guide reviewed"],
            &["docs/ directory", "CHANGELOG.md"],
        ),
    );
    m
}

// ---------------------------------------------------------------------------
// Conventions
// ---------------------------------------------------------------------------

/// File naming conventions inside a project root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conventions {
    #[serde(default = "default_index_file")]
    pub index_file: String,
    /// Supports `{id}` (zero-padded) and `{name}` placeholders.
    #[serde(default = "default_phase_file_pattern")]
    pub phase_file_pattern: String,
}

fn default_index_file() -> String {
    paths::DEFAULT_INDEX_FILE.to_string()
}

fn default_phase_file_pattern() -> String {
    paths::DEFAULT_PHASE_FILE_PATTERN.to_string()
}

impl Default for Conventions {
    fn default() -> Self {
        Self {
            index_file: default_index_file(),
            phase_file_pattern: default_phase_file_pattern(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory that relative project names are resolved against. May start
    /// with `~`.
    #[serde(default = "default_base_dir")]
    pub base_dir: String,
    #[serde(default)]
    pub conventions: Conventions,
    #[serde(default = "default_phase_templates")]
    pub phase_templates: BTreeMap<String, PhaseTemplate>,
}

fn default_base_dir() -> String {
    std::env::var(BASE_PATH_ENV).unwrap_or_else(|_| "~/dev".to_string())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            conventions: Conventions::default(),
            phase_templates: default_phase_templates(),
        }
    }
}

impl Config {
    /// Defaults with an explicit base directory.
    pub fn with_base_dir(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_string_lossy().into_owned(),
            ..Self::default()
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data =
            std::fs::read_to_string(path).map_err(|e| OverseerError::at(path, e))?;
        let cfg: Config = serde_yaml::from_str(&data).map_err(|e| OverseerError::Malformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(cfg)
    }

    /// Load `explicit` if given, else `overseer.yaml` in `dir` if present,
    /// else the built-in defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate = dir.join(CONFIG_FILE);
        if candidate.is_file() {
            return Self::load(&candidate);
        }
        Ok(Self::default())
    }

    /// Base directory with `~` expanded.
    pub fn base_path(&self) -> Result<PathBuf> {
        paths::expand_home(&self.base_dir)
    }

    pub fn template(&self, name: &str) -> Option<&PhaseTemplate> {
        self.phase_templates.get(name)
    }

    pub fn template_names(&self) -> Vec<&str> {
        self.phase_templates.keys().map(|k| k.as_str()).collect()
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.conventions.index_file.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "conventions.index_file is empty".to_string(),
            });
        }

        let pattern = &self.conventions.phase_file_pattern;
        if pattern.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "conventions.phase_file_pattern is empty".to_string(),
            });
        } else if !pattern.contains("{id}") && !pattern.contains("{name}") {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "conventions.phase_file_pattern '{pattern}' has neither {{id}} nor {{name}}; \
                     every phase would share one file"
                ),
            });
        }

        for (key, template) in &self.phase_templates {
            if template.steps.is_empty() && template.artifacts.is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "phase template '{key}' has no steps and no artifacts; \
                         its phases will advance with an empty checklist"
                    ),
                });
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

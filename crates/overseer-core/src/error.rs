use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OverseerError {
    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error("phase not found: {0}")]
    PhaseNotFound(String),

    #[error("unknown phase template '{name}' (available: {available})")]
    UnknownTemplate { name: String, available: String },

    #[error("invalid phase status '{0}'")]
    InvalidStatus(String),

    #[error("invalid transition from {from} to {to}: {reason}")]
    InvalidTransition {
        from: String,
        to: String,
        reason: String,
    },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("malformed document {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("path exists but is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("home directory not found: set HOME environment variable")]
    HomeNotFound,

    #[error("{}: {source}", path.display())]
    Path {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl OverseerError {
    /// Attach the offending path to an I/O error.
    pub fn at(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        OverseerError::Path {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, OverseerError>;

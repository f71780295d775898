use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures that abort a run before any record is collected.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    #[error("authentication failed: {0}")]
    Authentication(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("could not serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("team configuration not found: `{}`", .0.display())]
    NotFound(PathBuf),
    #[error("could not read `{}`: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid team configuration `{}`: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("no team members defined in `{}`", .0.display())]
    EmptyRoster(PathBuf),
    #[error("team member `{0}` is listed more than once")]
    DuplicateMember(String),
    #[error("required tool `{0}` was not found in PATH")]
    MissingTool(String),
}

/// One failed attempt against the remote source. Recovered by retrying and,
/// once attempts run out, by degrading the pair to an empty record.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("could not start query: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("query timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("query rejected ({status}): {stderr}")]
    Rejected { status: String, stderr: String },
    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl FetchError {
    pub fn is_rate_limited(&self) -> bool {
        match self {
            FetchError::Rejected { stderr, .. } => stderr.to_lowercase().contains("rate limit"),
            _ => false,
        }
    }
}

/// The persisted document did not read back as a well-formed collection.
#[derive(Debug, Error)]
#[error("document `{}` failed validation: {reason}", .path.display())]
pub struct IntegrityWarning {
    pub path: PathBuf,
    pub reason: String,
}

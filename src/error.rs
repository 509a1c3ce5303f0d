use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("{op} failed for {path}: {source}")]
    IoPath {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("walkdir error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("invalid pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("path does not exist: {0}")]
    NotFound(PathBuf),

    #[error("path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("path is a directory: {0}")]
    IsADirectory(PathBuf),

    #[error("destination already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("operation cancelled")]
    Cancelled,

    #[error(
        "moved {source_path} to {destination} but failed to remove the source: {source}"
    )]
    PartialFailure {
        source_path: PathBuf,
        destination: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub const CODE_IO_PATH: &'static str = "io_path";
    pub const CODE_WALKDIR: &'static str = "walkdir";
    pub const CODE_INVALID_CONFIG: &'static str = "invalid_config";
    pub const CODE_INVALID_PATH: &'static str = "invalid_path";
    pub const CODE_INVALID_PATTERN: &'static str = "invalid_pattern";
    pub const CODE_NOT_FOUND: &'static str = "not_found";
    pub const CODE_NOT_A_DIRECTORY: &'static str = "not_a_directory";
    pub const CODE_IS_A_DIRECTORY: &'static str = "is_a_directory";
    pub const CODE_ALREADY_EXISTS: &'static str = "already_exists";
    pub const CODE_CANCELLED: &'static str = "cancelled";
    pub const CODE_PARTIAL_FAILURE: &'static str = "partial_failure";

    pub(crate) fn io_path(op: &'static str, path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::IoPath {
            op,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Like [`Error::io_path`], but folds `NotFound` into [`Error::NotFound`].
    pub(crate) fn io_path_or_missing(
        op: &'static str,
        path: impl AsRef<Path>,
        source: std::io::Error,
    ) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            return Self::NotFound(path.as_ref().to_path_buf());
        }
        Self::io_path(op, path, source)
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::IoPath { .. } => Self::CODE_IO_PATH,
            Self::WalkDir(_) => Self::CODE_WALKDIR,
            Self::InvalidConfig(_) => Self::CODE_INVALID_CONFIG,
            Self::InvalidPath(_) => Self::CODE_INVALID_PATH,
            Self::InvalidPattern { .. } => Self::CODE_INVALID_PATTERN,
            Self::NotFound(_) => Self::CODE_NOT_FOUND,
            Self::NotADirectory(_) => Self::CODE_NOT_A_DIRECTORY,
            Self::IsADirectory(_) => Self::CODE_IS_A_DIRECTORY,
            Self::AlreadyExists(_) => Self::CODE_ALREADY_EXISTS,
            Self::Cancelled => Self::CODE_CANCELLED,
            Self::PartialFailure { .. } => Self::CODE_PARTIAL_FAILURE,
        }
    }

    /// Whether the error is an OS-level failure passed through without further classification.
    pub fn is_underlying(&self) -> bool {
        matches!(self, Self::IoPath { .. } | Self::WalkDir(_))
    }
}

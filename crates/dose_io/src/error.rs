//! Errors raised while reading or writing checkpoints and generation logs.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IoError {
    /// A value could not be turned into (or recovered from) its text form.
    #[error("cannot encode checkpoint data: {0}")]
    Encode(String),

    #[error("filesystem: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("gzip stream for {path:?} is broken: {source}")]
    Gzip {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Decoded fine but describes an impossible state.
    #[error("invalid checkpoint: {0}")]
    InvalidCheckpoint(String),

    #[error("no checkpoint at {0:?}")]
    MissingCheckpoint(PathBuf),

    #[error("{context}: {source}")]
    Context {
        context: String,
        source: Box<IoError>,
    },
}

pub type Result<T> = std::result::Result<T, IoError>;

impl IoError {
    #[must_use]
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    #[must_use]
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidCheckpoint(msg.into())
    }

    #[must_use]
    pub fn missing(path: &Path) -> Self {
        Self::MissingCheckpoint(path.to_path_buf())
    }

    #[must_use]
    pub fn gzip(path: &Path, source: std::io::Error) -> Self {
        Self::Gzip {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Prefixes the error with what was being attempted.
    #[must_use]
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error beneath any context layers.
    #[must_use]
    pub fn root(&self) -> &IoError {
        match self {
            Self::Context { source, .. } => source.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_checkpoint_message() {
        let err = IoError::invalid("grid has 3 cells, expected 8");
        assert_eq!(
            err.to_string(),
            "invalid checkpoint: grid has 3 cells, expected 8"
        );
    }

    #[test]
    fn test_context_layers_keep_root() {
        let err = IoError::missing(Path::new("run_pop_01_gen3.pop.gz"))
            .with_context("reviving pop_01")
            .with_context("resuming run");
        let message = err.to_string();
        assert!(message.starts_with("resuming run: reviving pop_01: "));
        assert!(matches!(err.root(), IoError::MissingCheckpoint(_)));
    }

    #[test]
    fn test_std_errors_convert() {
        let err: IoError = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "ro").into();
        assert!(matches!(err, IoError::FileSystem(_)));
        let err: IoError = serde_json::from_str::<u8>("x").unwrap_err().into();
        assert!(matches!(err, IoError::Json(_)));
    }
}

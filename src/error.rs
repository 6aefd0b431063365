//! Error types surfaced to analysis callers.
//!
//! Only input-fatal problems live here. Per-file failures (unreadable files,
//! malformed manifests) are swallowed by the collector that hit them and
//! never reach the caller.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort an analysis run.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("root path does not exist: {}", .0.display())]
    RootNotFound(PathBuf),
    #[error("root path is not a directory: {}", .0.display())]
    RootNotDirectory(PathBuf),
    #[error("analysis cancelled")]
    Cancelled,
    #[error("invalid rule catalog: {0}")]
    Catalog(#[from] CatalogError),
    #[error("accessing {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while loading or validating a rule catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("reading catalog: {0}")]
    Read(#[from] std::io::Error),
    #[error("parsing catalog: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("{0}")]
    Invalid(String),
}

pub type Result<T, E = AnalysisError> = std::result::Result<T, E>;

/// Check that `root` exists and is a directory.
pub fn ensure_root(root: &std::path::Path) -> Result<()> {
    match std::fs::metadata(root) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(AnalysisError::RootNotDirectory(root.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(AnalysisError::RootNotFound(root.to_path_buf()))
        }
        Err(e) => Err(AnalysisError::Io {
            path: root.to_path_buf(),
            source: e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_root_missing() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");
        assert!(matches!(
            ensure_root(&missing),
            Err(AnalysisError::RootNotFound(_))
        ));
    }

    #[test]
    fn test_ensure_root_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();
        assert!(matches!(
            ensure_root(&file),
            Err(AnalysisError::RootNotDirectory(_))
        ));
    }

    #[test]
    fn test_ensure_root_dir() {
        let temp = TempDir::new().unwrap();
        assert!(ensure_root(temp.path()).is_ok());
    }
}

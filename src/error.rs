//! Error types for jrxml-scanner
//!
//! This module defines the error hierarchy covering:
//! - Directory traversal errors (fatal to discovery)
//! - Per-file read and parse errors (collected, non-fatal to siblings)
//! - Configuration and CLI errors
//! - CSV export errors
//!
//! Design philosophy:
//! - Use thiserror for structured error types in library code
//! - A failed directory listing aborts the whole walk; a failed file is
//!   recorded and excluded from every table without stopping other files
//! - Preserve error chains for debugging

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the jrxml-scanner application
#[derive(Error, Debug)]
pub enum ScanError {
    /// Directory traversal failed - discovery aborted, no partial results
    #[error("Walk error: {0}")]
    Walk(#[from] WalkError),

    /// One or more files could not be read or parsed - emission suppressed
    #[error("{} file(s) failed to scan", failures.len())]
    Files { failures: Vec<FileFailure> },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// CSV export errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

/// Directory traversal errors
#[derive(Error, Debug)]
pub enum WalkError {
    /// A directory could not be listed. Fatal: the whole walk aborts and
    /// in-progress sibling results are discarded.
    #[error("Failed to read directory '{path}': {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A traversal task panicked
    #[error("Walk task panicked: {message}")]
    TaskPanicked { message: String },
}

/// Per-file errors. Recorded against the file, never fatal to siblings.
#[derive(Error, Debug)]
pub enum FileError {
    /// The file could not be read
    #[error("Failed to read file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file content is not a well-formed document
    #[error("Malformed document '{path}': {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    /// The task scanning the file panicked
    #[error("Scan task for '{path}' panicked: {message}")]
    TaskPanicked { path: PathBuf, message: String },
}

impl FileError {
    /// Path of the file this error belongs to
    pub fn path(&self) -> &PathBuf {
        match self {
            FileError::Read { path, .. } => path,
            FileError::Malformed { path, .. } => path,
            FileError::TaskPanicked { path, .. } => path,
        }
    }
}

/// A file-level failure recorded during a scan
#[derive(Debug)]
pub struct FileFailure {
    /// Surrogate id of the file record the failure belongs to
    pub file_id: u64,

    /// The error that excluded the file from the output tables
    pub error: FileError,
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Root directory missing or not a directory
    #[error("Invalid report directory '{path}': {reason}")]
    InvalidRootDir { path: PathBuf, reason: String },

    /// Invalid admission ceiling
    #[error("Invalid max concurrent reads {ceiling}: must be between 1 and {max}")]
    InvalidCeiling { ceiling: usize, max: usize },

    /// Invalid extension filter
    #[error("Invalid report extension '{extension}': {reason}")]
    InvalidExtension { extension: String, reason: String },

    /// Output path error
    #[error("Invalid output directory '{path}': {reason}")]
    InvalidOutputDir { path: PathBuf, reason: String },
}

/// CSV export errors
#[derive(Error, Debug)]
pub enum ExportError {
    /// I/O error creating the output directory or files
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias for ScanError
pub type Result<T> = std::result::Result<T, ScanError>;

/// Result type alias for WalkError
pub type WalkResult<T> = std::result::Result<T, WalkError>;

/// Result type alias for FileError
pub type FileResult<T> = std::result::Result<T, FileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let walk_err = WalkError::DirectoryRead {
            path: PathBuf::from("/missing"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        let scan_err: ScanError = walk_err.into();
        assert!(matches!(scan_err, ScanError::Walk(_)));
    }

    #[test]
    fn test_file_error_path() {
        let err = FileError::Read {
            path: PathBuf::from("/data/a.jrxml"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.path(), &PathBuf::from("/data/a.jrxml"));
    }

    #[test]
    fn test_files_error_display() {
        let err = ScanError::Files {
            failures: vec![FileFailure {
                file_id: 1,
                error: FileError::Read {
                    path: PathBuf::from("/data/a.jrxml"),
                    source: std::io::Error::new(std::io::ErrorKind::Other, "boom"),
                },
            }],
        };
        assert_eq!(err.to_string(), "1 file(s) failed to scan");
    }
}

//! Error types for drvmerge.
//!
//! This module provides the [`Error`] enum containing all fatal errors of a
//! merge run, the [`Result`] type alias, and [`ErrorCode`] for stable
//! machine-readable classification.
//!
//! # Error Categories
//!
//! | Category | Errors |
//! |----------|--------|
//! | Arguments | [`Error::WrongArgumentCount`], [`Error::InvalidSubpath`] |
//! | Conflict | [`Error::DirectoryFileConflict`], [`Error::FileConflict`], [`Error::FileDirectoryConflict`] |
//! | IO | [`Error::Io`], [`Error::TempFile`], [`Error::Persist`] |
//!
//! Missing source entries and illegal file types are not errors: they are
//! reported as [`MergeEvent`](crate::MergeEvent)s and the run continues.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for drvmerge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Check if an IO error indicates "no space left on device".
///
/// # Platform Support
///
/// | Platform | Error Detection |
/// |----------|-----------------|
/// | Unix | `ENOSPC` (errno 28) |
/// | Windows | `ERROR_DISK_FULL` (0x70) |
pub fn is_no_space_error(error: &io::Error) -> bool {
    if error.kind() == io::ErrorKind::StorageFull {
        return true;
    }

    #[cfg(unix)]
    {
        if let Some(raw_error) = error.raw_os_error() {
            const ENOSPC: i32 = 28;
            return raw_error == ENOSPC;
        }
    }

    #[cfg(windows)]
    {
        if let Some(raw_error) = error.raw_os_error() {
            const ERROR_DISK_FULL: i32 = 112;
            return raw_error == ERROR_DISK_FULL;
        }
    }

    false
}

/// Stable, machine-readable classification of an [`Error`].
///
/// The string forms are part of the JSON Lines output of the CLI and do not
/// change between releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
    /// Malformed arguments (argument count, mount subpath)
    InvalidInput,
    /// A directory collided with an existing non-directory entry
    DirectoryConflict,
    /// A file collided with an existing entry
    FileConflict,
    /// The operating system refused access
    PermissionDenied,
    /// The destination ran out of space
    NoSpace,
    /// Any other IO failure
    IoError,
    /// A failure outside the merge itself
    Internal,
}

impl ErrorCode {
    /// The stable string form of this code.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::DirectoryConflict => "directory_conflict",
            Self::FileConflict => "file_conflict",
            Self::PermissionDenied => "permission_denied",
            Self::NoSpace => "no_space",
            Self::IoError => "io_error",
            Self::Internal => "internal",
        }
    }

    /// Classify a raw IO error.
    pub fn from_io(error: &io::Error) -> Self {
        if is_no_space_error(error) {
            return Self::NoSpace;
        }
        if error.kind() == io::ErrorKind::PermissionDenied {
            return Self::PermissionDenied;
        }
        Self::IoError
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fatal errors of a merge run.
///
/// The `Display` form of the conflict variants is the conflict line printed
/// before the process exits, so it names the relative path, the label being
/// merged, and the label that already owns the destination path.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The trailing arguments do not form (label, source, subpath) triples
    #[error("Wrong number of arguments: expected groups of 3 after the destination, got {count}")]
    WrongArgumentCount {
        /// Number of trailing arguments received
        count: usize,
    },

    /// A mount subpath would escape the destination
    #[error("Invalid mount subpath for {label}: {subpath} (must not contain '..')")]
    InvalidSubpath {
        /// Label of the offending mount
        label: String,
        /// The subpath as given
        subpath: PathBuf,
    },

    /// A source directory maps onto an existing non-directory entry
    #[error("{relative} is a directory in {label} but a file in {owner}")]
    DirectoryFileConflict {
        /// Path relative to the source root
        relative: PathBuf,
        /// Label of the source being merged
        label: String,
        /// Label that created the existing entry
        owner: String,
    },

    /// A source file maps onto an existing file or other non-directory entry
    #[error("{relative} in {label} conflicts with {relative} in {owner}")]
    FileConflict {
        /// Path relative to the source root
        relative: PathBuf,
        /// Label of the source being merged
        label: String,
        /// Label that created the existing entry
        owner: String,
    },

    /// A source file maps onto an existing directory
    #[error("{relative} in {label} conflicts with {relative} in {owner}")]
    FileDirectoryConflict {
        /// Path relative to the source root
        relative: PathBuf,
        /// Label of the source being merged
        label: String,
        /// Label that created the existing directory
        owner: String,
    },

    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Failed to create temporary file
    #[error("Failed to create temporary file in {path}: {source}")]
    TempFile {
        /// Directory where temp file creation was attempted
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Failed to persist temporary file
    #[error("Failed to persist temporary file to {path}: {source}")]
    Persist {
        /// Target path
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },
}

impl Error {
    /// The stable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::WrongArgumentCount { .. } | Self::InvalidSubpath { .. } => ErrorCode::InvalidInput,
            Self::DirectoryFileConflict { .. } => ErrorCode::DirectoryConflict,
            Self::FileConflict { .. } | Self::FileDirectoryConflict { .. } => {
                ErrorCode::FileConflict
            }
            Self::Io(source) | Self::TempFile { source, .. } | Self::Persist { source, .. } => {
                ErrorCode::from_io(source)
            }
        }
    }

    /// Whether this error is one of the conflict kinds.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::DirectoryFileConflict { .. }
                | Self::FileConflict { .. }
                | Self::FileDirectoryConflict { .. }
        )
    }
}

//! Progress and diagnostic events emitted during a merge.
//!
//! Every line the merge contributes to the log is one [`MergeEvent`]. The
//! `Display` implementation renders the human-readable line; callers that
//! want structured output can match on the variants instead.
//!
//! # Example
//!
//! ```
//! use drvmerge::MergeEvent;
//! use std::path::Path;
//!
//! let event = MergeEvent::Mounting {
//!     label: "coreutils",
//!     subpath: Path::new("usr"),
//! };
//! assert_eq!(event.to_string(), "Mounting coreutils at usr");
//! ```

use crate::utils::path::relative_display;
use std::fmt;
use std::path::Path;

/// A single progress or diagnostic event.
#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
pub enum MergeEvent<'a> {
    /// A mount is about to be merged
    Mounting {
        /// Label of the mount
        label: &'a str,
        /// Mount subpath as given
        subpath: &'a Path,
    },
    /// A regular file was copied into the destination
    Copied {
        /// Label of the mount
        label: &'a str,
        /// Path relative to the source root
        relative: &'a Path,
        /// Destination root of the run
        destination: &'a Path,
        /// Mount subpath as given
        subpath: &'a Path,
        /// Number of bytes copied
        bytes: u64,
    },
    /// A path produced by the walk no longer exists or cannot be read
    Missing {
        /// The source path
        path: &'a Path,
    },
    /// A path is neither a directory nor a regular file
    IllegalFileType {
        /// The source path
        path: &'a Path,
    },
}

impl MergeEvent<'_> {
    /// Whether this event reports a skipped entry.
    pub fn is_diagnostic(&self) -> bool {
        matches!(self, Self::Missing { .. } | Self::IllegalFileType { .. })
    }
}

impl fmt::Display for MergeEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mounting { label, subpath } => {
                write!(f, "Mounting {} at {}", label, subpath.display())
            }
            Self::Copied {
                label,
                relative,
                destination,
                subpath,
                ..
            } => {
                let relative = relative_display(relative);
                write!(
                    f,
                    "{}/{} -> {}/{}/{}",
                    label,
                    relative.display(),
                    destination.display(),
                    subpath.display(),
                    relative.display()
                )
            }
            Self::Missing { path } => {
                write!(f, "{} does not exist or is not accessible", path.display())
            }
            Self::IllegalFileType { path } => {
                write!(f, "{} is an illegal file type", path.display())
            }
        }
    }
}

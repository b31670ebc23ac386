//! Merge requests: which source tree goes where.
//!
//! A merge request is an ordered list of [`Mount`]s. Order matters: the
//! first mount to reach a destination path owns it, and any later mount
//! that maps something onto the same path is reported against that owner.
//!
//! # Example
//!
//! ```
//! use drvmerge::parse_mounts;
//!
//! let mounts = parse_mounts(["coreutils", "/store/coreutils", "/usr"])?;
//! assert_eq!(mounts.len(), 1);
//! assert_eq!(mounts[0].label, "coreutils");
//! # Ok::<(), drvmerge::Error>(())
//! ```

use crate::error::{Error, Result};
use crate::utils::path::normalize_subpath;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// One source tree to merge, and where to mount it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mount {
    /// Name used in progress lines and conflict attribution
    pub label: String,
    /// Root of the source tree
    pub source: PathBuf,
    /// Where the source root lands, relative to the destination
    ///
    /// Kept exactly as given for display; see [`Mount::mount_point`] for
    /// the resolved location.
    pub subpath: PathBuf,
}

impl Mount {
    /// Create a new mount.
    pub fn new(
        label: impl Into<String>,
        source: impl Into<PathBuf>,
        subpath: impl Into<PathBuf>,
    ) -> Self {
        Self {
            label: label.into(),
            source: source.into(),
            subpath: subpath.into(),
        }
    }

    /// Resolve where this mount lands under `destination`.
    ///
    /// The subpath is always taken relative to `destination`, even when
    /// written as an absolute path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSubpath`] if the subpath contains `..`.
    pub fn mount_point(&self, destination: &Path) -> Result<PathBuf> {
        let subpath = normalize_subpath(&self.subpath).ok_or_else(|| Error::InvalidSubpath {
            label: self.label.clone(),
            subpath: self.subpath.clone(),
        })?;
        if subpath.as_os_str().is_empty() {
            return Ok(destination.to_path_buf());
        }
        Ok(destination.join(subpath))
    }
}

/// Group a flat argument list into (label, source, subpath) triples.
///
/// This is the shape of the command line after the destination argument.
///
/// # Errors
///
/// Returns [`Error::WrongArgumentCount`] if the number of arguments is not a
/// multiple of 3. Nothing is touched on disk.
pub fn parse_mounts<I, S>(args: I) -> Result<Vec<Mount>>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    if args.len() % 3 != 0 {
        return Err(Error::WrongArgumentCount { count: args.len() });
    }

    let mut mounts = Vec::with_capacity(args.len() / 3);
    let mut args = args.into_iter();
    while let (Some(label), Some(source), Some(subpath)) = (args.next(), args.next(), args.next())
    {
        mounts.push(Mount {
            label: label.to_string_lossy().into_owned(),
            source: PathBuf::from(source),
            subpath: PathBuf::from(subpath),
        });
    }
    Ok(mounts)
}
